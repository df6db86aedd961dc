//! HTTP API surface for this instance
//!
//! Only the health/capability document lives here; business endpoints
//! belong to the surrounding application.

mod health;

pub use health::*;
