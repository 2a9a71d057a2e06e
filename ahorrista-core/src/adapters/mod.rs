//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - reqwest HTTP client for the BackendApi port
//! - JSON file (or process memory) for the SessionStore port

pub mod http;
pub mod session_file;

#[cfg(test)]
pub mod backend_mock;

pub use http::{ApiClient, HttpBackend};
pub use session_file::{FileSessionStore, MemorySessionStore};
