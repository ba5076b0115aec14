//! Output formatting
//!
//! Every command prints through a [`Formatter`] so that `--json`,
//! `--no-color` and `--quiet` behave the same everywhere.

mod formatter;

pub use formatter::Formatter;

/// Output settings taken from the global flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// Strict JSON on stdout, no colors
    pub json: bool,
    pub no_color: bool,
    /// Only errors are printed
    pub quiet: bool,
}
