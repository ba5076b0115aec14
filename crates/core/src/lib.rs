//! ab-core: Core library for the airbased API client
//!
//! This crate provides the request pipeline and the data model, including:
//! - Key casing between local snake_case and the wire's camelCase
//! - Sliding-window rate limiting aligned with the server clock
//! - Status classification into typed errors
//! - Batched bulk writes and cursor pagination
//! - Bases, tables and records
//!
//! This crate is independent of any specific HTTP client. Requests leave
//! through the [`Transport`] trait, which the `ab-http` crate implements
//! with reqwest and tests implement in memory.

pub mod base;
pub mod batch;
pub mod classify;
pub mod codec;
pub mod config;
pub mod error;
pub mod paginate;
pub mod pipeline;
pub mod rate_limit;
pub mod record;
pub mod retry;
pub mod table;
pub mod transport;

#[cfg(test)]
mod testing;

pub use base::Base;
pub use batch::{MAX_BATCH_SIZE, run_batched, run_batched_max};
pub use config::{Config, ConfigManager};
pub use error::{Error, ErrorKind, Result};
pub use paginate::{Page, collect_all};
pub use pipeline::{RequestOptions, RequestPipeline, WIRE_TARGET};
pub use rate_limit::{Admission, Clock, ManualClock, RateLimiter, SystemClock};
pub use record::{Fields, Record, RecordInput, RecordSummary, UpdateOptions};
pub use retry::{RetryBuilder, RetryPolicy, with_retry};
pub use table::{Direction, ListParams, Sort, Table, TableSchema, UpsertResult};
pub use transport::{HttpRequest, HttpResponse, Method, Transport};
