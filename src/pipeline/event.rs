//! Storage-event records: where a report lives and whom it belongs to.

use std::sync::LazyLock;

use aws_lambda_events::event::s3::S3EventRecord;
use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// `<anything>_<digits>.pdf`, digits captured.
static PATIENT_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_(\d+)\.pdf$").unwrap());

#[derive(Error, Debug, PartialEq)]
pub enum KeyError {
    #[error("Event record has no bucket name")]
    MissingBucket,

    #[error("Event record has no object key")]
    MissingKey,

    #[error("Object key is not valid UTF-8 after percent-decoding: {0}")]
    Undecodable(String),

    #[error("Unable to extract patient id from object key: {0}")]
    NoPatientId(String),

    #[error("Patient id in object key is out of range: {0}")]
    PatientIdOverflow(String),
}

/// Bucket and decoded key of one uploaded report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportLocation {
    pub bucket: String,
    pub key: String,
}

impl ReportLocation {
    /// Read bucket and key from a notification record, decoding the key.
    pub fn from_record(record: &S3EventRecord) -> Result<Self, KeyError> {
        let bucket = record
            .s3
            .bucket
            .name
            .clone()
            .filter(|b| !b.is_empty())
            .ok_or(KeyError::MissingBucket)?;
        let raw_key = record
            .s3
            .object
            .key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(KeyError::MissingKey)?;

        Ok(Self {
            bucket,
            key: decode_object_key(raw_key)?,
        })
    }
}

/// Decode an event object key: `+` means space, then percent-decoding.
pub fn decode_object_key(raw: &str) -> Result<String, KeyError> {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| KeyError::Undecodable(raw.to_string()))
}

/// Patient identifier encoded in the report filename, e.g. `deepak_456.pdf` → 456.
pub fn patient_id_from_key(key: &str) -> Result<i64, KeyError> {
    let digits = PATIENT_ID_PATTERN
        .captures(key)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| KeyError::NoPatientId(key.to_string()))?
        .as_str();

    digits
        .parse::<i64>()
        .map_err(|_| KeyError::PatientIdOverflow(key.to_string()))
}
