//! Encoding helpers for plans and sweep reports.

use mdsweep_core::errors::{ErrorInfo, SweepError};
use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};

fn encoding_error(code: &str, err: impl ToString) -> SweepError {
    SweepError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// Encodes `value` as compact JSON with object keys in sorted order.
///
/// Going through `serde_json::Value` turns struct fields into map entries,
/// and `serde_json::Map` is ordered by key unless `preserve_order` is on.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, SweepError> {
    let tree = serde_json::to_value(value).map_err(|err| encoding_error("report.encode", err))?;
    serde_json::to_vec(&tree).map_err(|err| encoding_error("report.encode", err))
}

/// Hex SHA-256 of the canonical JSON encoding, stable across runs.
pub fn content_hash<T: Serialize>(value: &T) -> Result<String, SweepError> {
    let digest = Sha256::digest(to_canonical_json_bytes(value)?);
    Ok(digest.iter().map(|byte| format!("{byte:02x}")).collect())
}

pub fn to_yaml_string<T: Serialize>(value: &T) -> Result<String, SweepError> {
    serde_yaml::to_string(value).map_err(|err| encoding_error("plan.encode", err))
}

pub fn from_yaml_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, SweepError> {
    serde_yaml::from_slice(data).map_err(|err| encoding_error("plan.decode", err))
}
