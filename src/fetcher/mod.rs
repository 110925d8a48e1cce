pub mod client;
pub mod errors;
pub mod pipeline;
pub mod types;

pub use client::{build_client, exists, fetch, fetch_bytes, parse_http_url, probe};
pub use errors::FetchError;
pub use types::PageResponse;
