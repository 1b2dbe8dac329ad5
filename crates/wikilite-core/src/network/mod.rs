//! Network access to the engine.
//!
//! This module provides:
//! - An HTTP client with a fixed timeout and user agent
//! - The [`EngineApi`] trait and its HTTP implementation

mod client;
mod engine;

pub use client::HttpClient;
pub use engine::{EngineApi, HttpEngineApi};
