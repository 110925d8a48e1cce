pub mod app;
pub mod article;
pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod feed;
pub mod fetcher;
pub mod logging;
pub mod render;
pub mod storage;

pub use error::{ReaderError, Result};
