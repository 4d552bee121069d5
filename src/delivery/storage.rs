use std::{
    fs,
    path::{Component, Path, PathBuf},
};

use super::TransportError;

pub trait ObjectStore {
    /// Returns whole content of the object
    fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>, TransportError>;
}

/// Object store laid out on local disk as `<root>/<bucket>/<key>`
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, TransportError> {
        for part in [bucket, key] {
            let is_plain = !part.is_empty()
                && Path::new(part)
                    .components()
                    .all(|component| matches!(component, Component::Normal(_)));

            if !is_plain {
                return Err(TransportError::InvalidKey(part.to_string()));
            }
        }

        Ok(self.root.join(bucket).join(key))
    }
}

impl ObjectStore for LocalObjectStore {
    fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>, TransportError> {
        let path = self.object_path(bucket, key)?;

        log::debug!("Fetching {:?}", path);

        fs::read(&path).map_err(|source| TransportError::Fetch {
            bucket: bucket.to_string(),
            key: key.to_string(),
            source,
        })
    }
}
