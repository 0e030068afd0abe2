//! Seed a collection from a JSON file.
//!
//! The file holds a JSON array of objects. Each element is decoded against
//! the service's data class and posted, so elements without an id get a
//! fresh one. Elements that do not decode are skipped with a warning.

use crate::codec;
use crate::pending::Settled;
use crate::record::Record;
use crate::service::Service;
use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

const SEED_WAIT: Duration = Duration::from_secs(30);

/// Post every element of the JSON array in `path` to `service`.
///
/// Returns the number of records stored.
///
/// # Errors
///
/// Fails if the file cannot be read, is not JSON, or is not an array.
pub fn seed<S: Service>(service: &S, path: &Path) -> Result<usize> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("Seed file {} is not valid JSON", path.display()))?;
    let Value::Array(elements) = value else {
        bail!("Seed file {} must contain a JSON array", path.display());
    };
    Ok(seed_values(service, elements))
}

/// Post each of `elements` to `service`; returns the number stored.
pub fn seed_values<S: Service>(service: &S, elements: Vec<Value>) -> usize {
    let class = <S::Record as Record>::data_class().name;
    let mut stored = 0;
    for (index, element) in elements.into_iter().enumerate() {
        let record = match codec::decode_value::<S::Record>(element) {
            Ok(record) => record,
            Err(e) => {
                warn!(record = class, index, error = %e, "Skipping seed element");
                continue;
            }
        };
        match service.post(Some(record)).wait(SEED_WAIT) {
            Settled::Value(_) => stored += 1,
            Settled::Absent => warn!(record = class, index, "Seed element was not stored"),
            Settled::Failed(e) => warn!(record = class, index, error = %e, "Failed to store seed element"),
        }
    }
    debug!(record = class, stored, "Seeding finished");
    stored
}
