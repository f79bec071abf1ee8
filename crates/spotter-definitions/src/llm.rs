//! Definition generation through an OpenAI-compatible chat completions API.
//!
//! The model is asked to answer in a fixed `DEFINITIONS:` block, one
//! `word: definition` per line. Everything about that free-text format stays
//! in this module; callers only ever see a `Definitions` map restricted to
//! the requested keywords.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use spotter_core::config::DefinitionsConfig;

use crate::error::DefinitionError;
use crate::service::DictionaryService;
use crate::wire::Definitions;

const DEFINITIONS_MARKER: &str = "DEFINITIONS:";

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

/// Generates definitions with a chat model.
pub struct LlmDictionary {
    api_base: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    client: reqwest::Client,
}

impl LlmDictionary {
    pub fn new(
        api_base: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        temperature: f32,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            temperature,
            client,
        }
    }

    /// Build from config, reading the API key from `api_key_env`.
    pub fn from_config(config: &DefinitionsConfig) -> Self {
        let api_key = std::env::var(&config.api_key_env).ok();
        if api_key.is_none() {
            tracing::warn!(
                env = %config.api_key_env,
                "No API key set; definition generation will fail until one is provided"
            );
        }
        Self::new(
            config.api_base.clone(),
            config.model.clone(),
            api_key,
            config.temperature,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, keywords: &[String]) -> Result<String, DefinitionError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| DefinitionError::Generation("no API key configured".to_string()))?;

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt(keywords),
                },
                ChatMessage {
                    role: "user",
                    content: keywords.join(", "),
                },
            ],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DefinitionError::Generation(format!(
                "chat completion returned HTTP {}: {}",
                status.as_u16(),
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| DefinitionError::Generation(format!("unreadable completion: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| DefinitionError::Generation("completion had no content".to_string()))
    }
}

#[async_trait]
impl DictionaryService for LlmDictionary {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn define(&self, keywords: &[String]) -> Result<Definitions, DefinitionError> {
        let keywords: Vec<String> = keywords
            .iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if keywords.is_empty() {
            return Err(DefinitionError::Validation("Missing keywords".to_string()));
        }

        let content = self.complete(&keywords).await?;
        let definitions = parse_definitions(&content, &keywords);
        tracing::info!(
            model = %self.model,
            requested = keywords.len(),
            defined = definitions.len(),
            "Definitions generated"
        );
        Ok(definitions)
    }
}

/// System prompt asking for the `DEFINITIONS:` block.
pub fn system_prompt(keywords: &[String]) -> String {
    format!(
        "You are a dictionary expert. For each word in this list: [{}], \
         provide a clear, concise, and accurate definition.\n\
         Rules:\n\
         1. Focus on the most common meaning unless context suggests otherwise\n\
         2. Keep definitions clear and understandable\n\
         3. Format exactly as shown:\n\
         {}\n\
         word1: definition1\n\
         word2: definition2\n\
         Only include words from the provided list. Do not add extra words.",
        keywords.join(", "),
        DEFINITIONS_MARKER
    )
}

/// Extract `word: definition` lines following the `DEFINITIONS:` marker.
///
/// Keys are lowercased; words outside `requested` are dropped. A reply
/// without the marker yields an empty map.
pub fn parse_definitions(content: &str, requested: &[String]) -> Definitions {
    let wanted: HashSet<String> = requested.iter().map(|k| k.to_lowercase()).collect();
    let mut definitions = Definitions::new();

    let Some((_, block)) = content.split_once(DEFINITIONS_MARKER) else {
        return definitions;
    };

    for line in block.trim().lines() {
        let Some((word, definition)) = line.split_once(':') else {
            continue;
        };
        let key = word.trim().to_lowercase();
        if !wanted.contains(&key) {
            continue;
        }
        let definition = strip_part_of_speech(definition.trim());
        if !definition.is_empty() {
            definitions.insert(key, definition.to_string());
        }
    }

    definitions
}

/// Drop a leading parenthetical such as `(noun)`.
pub fn strip_part_of_speech(definition: &str) -> &str {
    if definition.starts_with('(') {
        if let Some(end) = definition.find(')') {
            return definition[end + 1..].trim();
        }
    }
    definition
}
