//! Collaborators around the aggregation: where batches come from, where raw
//! transactions are kept and how the statement reaches its reader.
//!
//! Every collaborator is called at most once per batch and never retries.

pub mod event;
pub mod mail;
pub mod render;
pub mod repository;
pub mod storage;

use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("Unable to fetch `{bucket}/{key}`: {source}")]
    Fetch {
        bucket: String,
        key: String,
        source: std::io::Error,
    },
    #[error("Invalid object key `{0}`")]
    InvalidKey(String),
    #[error("Unable to persist transactions to {path:?}: {source}")]
    Persist { path: PathBuf, source: csv::Error },
    #[error("Unable to read template {path:?}: {source}")]
    ReadTemplate {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Unable to render statement: {0}")]
    Render(String),
    #[error("Unable to send statement: {0}")]
    Send(String),
    #[error("Invalid storage event: {0}")]
    Event(String),
}
