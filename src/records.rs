use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ServiceError;

/// Column names of the vehicle registration export that the dashboard
/// aggregates over. Anything else in the file is carried through untouched.
pub mod fields {
    pub const VIN: &str = "VIN (1-10)";
    pub const MAKE: &str = "Make";
    pub const MODEL: &str = "Model";
    pub const MODEL_YEAR: &str = "Model Year";
    pub const EV_TYPE: &str = "Electric Vehicle Type";
    pub const CITY: &str = "City";
    pub const ELECTRIC_RANGE: &str = "Electric Range";
    pub const CAFV_ELIGIBILITY: &str = "Clean Alternative Fuel Vehicle (CAFV) Eligibility";

    /// Bucket key that rows missing a categorical field are counted under.
    pub const ABSENT: &str = "unknown";
}

/// One row of the source dataset, keyed by header field. Immutable once
/// parsed; an empty cell and a missing column are both "absent".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: HashMap<String, String>,
}

/// The whole export, in file order. Owned by a single request, never cached.
pub type Dataset = Vec<Record>;

impl Record {
    pub fn from_fields<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let fields = pairs
            .into_iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// A record without a VIN is excluded from every summary.
    pub fn has_vin(&self) -> bool {
        self.field(fields::VIN).is_some()
    }
}

/// Parse raw delimited text (header row first) into field-keyed records.
///
/// Empty lines are skipped and ragged rows are tolerated: missing columns
/// become absent fields, extra columns are dropped. A row the reader cannot
/// decode at all fails the whole parse with a row-level diagnostic.
pub fn parse_records(raw: &[u8]) -> Result<Dataset, ServiceError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(raw);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ServiceError::Parse(format!("header row: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut records = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        // idx 0 is the first data row, i.e. line 2 of the file
        let row = row.map_err(|e| ServiceError::Parse(format!("row {}: {e}", idx + 2)))?;
        let mut fields = HashMap::with_capacity(headers.len());
        for (col, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            if let Some(name) = headers.get(col) {
                fields.insert(name.clone(), value.to_string());
            }
        }
        records.push(Record { fields });
    }

    debug!(rows = records.len(), "parsed dataset");
    Ok(records)
}
