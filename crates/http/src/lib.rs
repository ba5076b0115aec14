//! ab-http: reqwest transport for airbased
//!
//! This crate implements the `Transport` trait from ab-core with reqwest,
//! and offers [`connect`] to build a ready request pipeline from a `Config`.

mod client;

pub use client::{ReqwestTransport, connect, connect_shared};
