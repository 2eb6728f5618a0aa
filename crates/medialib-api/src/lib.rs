//! Client for the media library backend HTTP API.

pub mod client;
pub mod error;
pub mod traits;
pub mod types;

pub use client::BackendClient;
pub use error::ApiError;
pub use traits::LibraryBackend;
