//! Validation outcome

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

/// Wire path to the messages reported at that path, sorted by path
pub type ErrorMap = BTreeMap<String, Vec<String>>;

/// Outcome of validating one submission.
///
/// A valid result carries the nested data restricted to declared fields
/// and no errors. An invalid result carries errors and no data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    is_valid: bool,
    data: Map<String, Value>,
    errors: ErrorMap,
}

impl ValidationResult {
    pub(crate) fn success(data: Map<String, Value>) -> Self {
        Self {
            is_valid: true,
            data,
            errors: ErrorMap::new(),
        }
    }

    pub(crate) fn failure(errors: ErrorMap) -> Self {
        Self {
            is_valid: false,
            data: Map::new(),
            errors,
        }
    }

    /// Builds a result from collected errors: valid iff there are none.
    pub(crate) fn from_parts(data: Map<String, Value>, errors: ErrorMap) -> Self {
        if errors.is_empty() {
            Self::success(data)
        } else {
            Self::failure(errors)
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn into_data(self) -> Map<String, Value> {
        self.data
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    /// Messages for one wire path.
    pub fn error_for(&self, path: &str) -> Option<&[String]> {
        self.errors.get(path).map(Vec::as_slice)
    }

    /// First message for one wire path.
    pub fn first_error(&self, path: &str) -> Option<&str> {
        self.error_for(path)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    pub fn error_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }
}
