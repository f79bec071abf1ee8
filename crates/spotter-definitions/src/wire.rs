//! Request and response bodies of the definition service.
//!
//! Request: `{ "keywords": [..] }`. Success: `{ "definitions": { word: text } }`.
//! Failure: `{ "error": message }` with a non-2xx status.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Word to definition text.
pub type Definitions = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionRequest {
    /// Normalized keywords, in keyword-set order.
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionResponse {
    pub definitions: Definitions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceErrorBody {
    pub error: String,
}
