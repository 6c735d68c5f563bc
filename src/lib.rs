//! Content-negotiation contract tests for a Petstore-style HTTP API.
//!
//! The fixture table in [`collections`] expands into independent
//! [`TestCase`](domain::TestCase)s. [`engine`] sends each one through the
//! [`http`] dispatcher and judges the response with [`testing`].

pub mod cli;
pub mod collections;
pub mod domain;
pub mod engine;
pub mod environment;
pub mod error;
pub mod http;
pub mod payload;
pub mod store;
pub mod testing;
