//! Spotter Definitions crate - definition lookup for matched keywords.
//!
//! Holds the wire contract of the definition service, the `DictionaryService`
//! seam with its HTTP and LLM-backed implementations, and the versioned
//! `DefinitionCache` that the tooltip reads from.

pub mod cache;
pub mod error;
pub mod llm;
pub mod remote;
pub mod service;
pub mod wire;

pub use cache::{CacheUpdate, DefinitionCache, DefinitionEntry, DefinitionLookup, DefinitionTicket};
pub use error::DefinitionError;
pub use llm::LlmDictionary;
pub use remote::HttpDictionaryClient;
pub use service::DictionaryService;
pub use wire::{DefinitionRequest, DefinitionResponse, Definitions, ServiceErrorBody};
