//! Data models exchanged with the engine.
//!
//! These mirror the engine's JSON API; the request side is validated here so
//! nothing malformed ever reaches the wire.

mod api_response;
mod article;
mod search;

pub use api_response::*;
pub use article::*;
pub use search::*;
