//! # HTTP
//!
//! Request resolution and dispatch against the target server.

pub mod client;
pub mod method;
pub mod request;
pub mod response;
