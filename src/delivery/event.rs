use serde::Deserialize;

use super::TransportError;

/// Upload notification as published by the object storage
#[derive(Deserialize, Debug)]
pub struct StorageEvent {
    #[serde(rename = "Records", default)]
    records: Vec<EventRecord>,
}

#[derive(Deserialize, Debug)]
struct EventRecord {
    s3: S3Entity,
}

#[derive(Deserialize, Debug)]
struct S3Entity {
    bucket: Bucket,
    object: Object,
}

#[derive(Deserialize, Debug)]
struct Bucket {
    name: String,
}

#[derive(Deserialize, Debug)]
struct Object {
    key: String,
}

/// Uploaded object a batch is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}

impl StorageEvent {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TransportError> {
        let event: StorageEvent =
            serde_json::from_slice(bytes).map_err(|err| TransportError::Event(err.to_string()))?;

        if event.records.is_empty() {
            return Err(TransportError::Event("event has no records".to_string()));
        }

        Ok(event)
    }

    /// Uploaded objects in notification order, keys are url decoded
    pub fn objects(&self) -> Result<Vec<ObjectRef>, TransportError> {
        self.records
            .iter()
            .map(|record| {
                Ok(ObjectRef {
                    bucket: record.s3.bucket.name.clone(),
                    key: decode_key(&record.s3.object.key)?,
                })
            })
            .collect()
    }
}

/// Object keys arrive form encoded: `+` is a space, `%XX` a byte
fn decode_key(key: &str) -> Result<String, TransportError> {
    let invalid = || TransportError::Event(format!("malformed object key `{}`", key));

    let mut bytes = Vec::with_capacity(key.len());
    let mut input = key.bytes();

    while let Some(byte) = input.next() {
        match byte {
            b'+' => bytes.push(b' '),
            b'%' => {
                let hex = [input.next().ok_or_else(invalid)?, input.next().ok_or_else(invalid)?];
                let hex = std::str::from_utf8(&hex).map_err(|_| invalid())?;
                bytes.push(u8::from_str_radix(hex, 16).map_err(|_| invalid())?);
            }
            other => bytes.push(other),
        }
    }

    String::from_utf8(bytes).map_err(|_| invalid())
}
