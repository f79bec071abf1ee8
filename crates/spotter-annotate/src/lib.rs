//! Spotter Annotate crate - keyword extraction and transcript annotation.
//!
//! Turns free-form context text into a normalized `KeywordSet`, tokenizes
//! final transcript fragments, classifies each token as a match or not, and
//! accumulates the annotated transcript with its running counters.

pub mod annotator;
pub mod error;
pub mod keywords;
pub mod transcript;

pub use annotator::{annotate, normalize_token, AnnotatedFragment};
pub use error::KeywordError;
pub use keywords::KeywordSet;
pub use transcript::Transcript;
