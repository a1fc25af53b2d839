//! Flat JSON file persistence.
//!
//! Every input and every persisted output of a run is a single JSON file;
//! these helpers attach the offending path to any failure.

pub mod day_types;

pub use day_types::{load_calendar, load_day_types};

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CoreError, Result};

/// Read and parse a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|source| CoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize `value` with four-space indentation, overwriting `path`.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;

    fs::write(path, buf).map_err(|source| CoreError::Write {
        path: path.to_path_buf(),
        source,
    })
}
