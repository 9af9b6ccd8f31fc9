//! Geometry-free entity extraction through a chat-completions model.

use crate::config::LlmConfig;
use crate::error::DossierError;
use crate::model::{clamp_confidence, EntityCategory};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use std::time::Duration;

/// Confidence given to entries the model returns without one.
pub const DEFAULT_TEXT_CONFIDENCE: f32 = 0.85;

/// Categories always present in a [`TextEntitySet`].
pub const TEXT_CATEGORIES: [EntityCategory; 5] = [
    EntityCategory::Persons,
    EntityCategory::Places,
    EntityCategory::Dates,
    EntityCategory::Organizations,
    EntityCategory::PhoneNumbers,
];

const SYSTEM_PROMPT: &str = "You are an entity extraction expert. Extract named entities from \
text and categorize them accurately. Always return valid JSON.";

static JSON_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").expect("valid regex"));

/// A chat-completions capable model.
pub trait ChatModel: Send + Sync {
    /// Send one system + user exchange and return the assistant's reply.
    fn complete(&self, system: &str, user: &str) -> Result<String, DossierError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextEntity {
    pub text: String,
    pub confidence: f32,
    pub source: String,
}

impl TextEntity {
    fn nlp(text: impl Into<String>, confidence: f32) -> Self {
        TextEntity {
            text: text.into(),
            confidence: clamp_confidence(confidence),
            source: "nlp".to_string(),
        }
    }
}

/// Entities found without page geometry, grouped by category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextEntitySet {
    categories: BTreeMap<EntityCategory, Vec<TextEntity>>,
}

impl Default for TextEntitySet {
    /// The five default categories, all empty.
    fn default() -> Self {
        TextEntitySet {
            categories: TEXT_CATEGORIES.iter().map(|c| (*c, Vec::new())).collect(),
        }
    }
}

impl TextEntitySet {
    /// Append unless the category already holds the same text (case-insensitive).
    pub fn insert(&mut self, category: EntityCategory, entity: TextEntity) -> bool {
        let list = self.categories.entry(category).or_default();
        let key = entity.text.to_lowercase();
        if list.iter().any(|e| e.text.to_lowercase() == key) {
            return false;
        }
        list.push(entity);
        true
    }

    pub fn get(&self, category: EntityCategory) -> &[TextEntity] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityCategory, &[TextEntity])> {
        self.categories.iter().map(|(c, v)| (*c, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn build_prompt(text: &str) -> String {
    format!(
        "Extract named entities from the following text and categorize them. Return as JSON \
with these exact categories: persons, places, dates, organizations, phoneNumbers. Each entity \
should have 'text' and 'confidence' (0-1) fields.\n\nText:\n{}\n\nReturn ONLY valid JSON, no \
additional text.",
        text
    )
}

/// Ask `model` for entities in `text`. Never fails: an empty input, a model
/// error or an unparsable reply all yield the default (empty) set.
pub fn extract_entities_from_text(text: &str, model: &dyn ChatModel) -> TextEntitySet {
    if text.trim().is_empty() {
        return TextEntitySet::default();
    }
    let reply = match model.complete(SYSTEM_PROMPT, &build_prompt(text)) {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!(error = %e, "entity model call failed; returning defaults");
            return TextEntitySet::default();
        }
    };
    match parse_entity_response(&reply) {
        Ok(set) => set,
        Err(e) => {
            tracing::warn!(error = %e, "entity model reply unusable; returning defaults");
            TextEntitySet::default()
        }
    }
}

/// Locate the JSON payload: a ```json fence, else the outermost `{...}` span,
/// else the whole reply.
fn json_payload(content: &str) -> &str {
    if let Some(m) = JSON_FENCE.captures(content).and_then(|c| c.get(1)) {
        return m.as_str();
    }
    match (content.find('{'), content.rfind('}')) {
        (Some(start), Some(end)) if start < end => &content[start..=end],
        _ => content.trim(),
    }
}

/// Parse a model reply into a [`TextEntitySet`].
pub fn parse_entity_response(content: &str) -> Result<TextEntitySet, DossierError> {
    let payload = json_payload(content);
    let value: serde_json::Value =
        serde_json::from_str(payload).map_err(|e| DossierError::LlmParse(e.to_string()))?;
    let serde_json::Value::Object(map) = value else {
        return Err(DossierError::LlmParse("expected a JSON object".to_string()));
    };

    let mut set = TextEntitySet::default();
    for (key, entries) in &map {
        let Some(category) = EntityCategory::from_str_loose(key) else {
            tracing::debug!(key = %key, "ignoring unknown entity category");
            continue;
        };
        set.categories.entry(category).or_default();
        let Some(entries) = entries.as_array() else {
            continue;
        };
        for entry in entries {
            let (text, confidence) = match entry {
                serde_json::Value::String(s) => (s.as_str(), DEFAULT_TEXT_CONFIDENCE),
                serde_json::Value::Object(obj) => {
                    let Some(text) = obj.get("text").and_then(|t| t.as_str()) else {
                        continue;
                    };
                    let confidence = obj
                        .get("confidence")
                        .and_then(|c| c.as_f64())
                        .map(|c| c as f32)
                        .unwrap_or(DEFAULT_TEXT_CONFIDENCE);
                    (text, confidence)
                }
                _ => continue,
            };
            let text = text.trim();
            if !text.is_empty() {
                set.insert(category, TextEntity::nlp(text, confidence));
            }
        }
    }
    Ok(set)
}

/// Blocking client for an OpenAI-compatible `/v1/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiCompatClient {
    client: reqwest::blocking::Client,
    config: LlmConfig,
}

enum CallError {
    ModelNotFound,
    Other(DossierError),
}

impl OpenAiCompatClient {
    pub fn new(config: LlmConfig) -> Result<Self, DossierError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| DossierError::Llm(e.to_string()))?;
        Ok(OpenAiCompatClient { client, config })
    }

    pub fn from_env() -> Result<Self, DossierError> {
        Self::new(LlmConfig::from_env()?)
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint_chat_completions(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn call(&self, model: &str, system: &str, user: &str) -> Result<String, CallError> {
        let req = ChatCompletionsRequest {
            model: model.to_string(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
            stream: Some(false),
        };

        let mut rb = self.client.post(self.endpoint_chat_completions()).json(&req);
        if let Some(key) = &self.config.api_key {
            rb = rb.bearer_auth(key);
        }
        let resp = rb
            .send()
            .map_err(|e| CallError::Other(DossierError::Llm(e.to_string())))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            if status == reqwest::StatusCode::NOT_FOUND || body.contains("model_not_found") {
                return Err(CallError::ModelNotFound);
            }
            return Err(CallError::Other(DossierError::Llm(format!(
                "chat.completions HTTP {status}"
            ))));
        }

        let parsed: ChatCompletionsResponse = resp
            .json()
            .map_err(|e| CallError::Other(DossierError::Llm(e.to_string())))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| CallError::Other(DossierError::Llm("empty completion".to_string())))
    }
}

impl ChatModel for OpenAiCompatClient {
    fn complete(&self, system: &str, user: &str) -> Result<String, DossierError> {
        match self.call(&self.config.model, system, user) {
            Ok(reply) => Ok(reply),
            Err(CallError::ModelNotFound) if self.config.model != self.config.fallback_model => {
                tracing::warn!(
                    model = %self.config.model,
                    fallback = %self.config.fallback_model,
                    "entity model unavailable; retrying with fallback"
                );
                self.call(&self.config.fallback_model, system, user)
                    .map_err(|e| match e {
                        CallError::ModelNotFound => DossierError::Llm(format!(
                            "model {} not found",
                            self.config.fallback_model
                        )),
                        CallError::Other(e) => e,
                    })
            }
            Err(CallError::ModelNotFound) => Err(DossierError::Llm(format!(
                "model {} not found",
                self.config.model
            ))),
            Err(CallError::Other(e)) => Err(e),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionsRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned(Result<&'static str, ()>);

    impl ChatModel for Canned {
        fn complete(&self, _system: &str, _user: &str) -> Result<String, DossierError> {
            self.0
                .map(str::to_string)
                .map_err(|_| DossierError::Llm("offline".into()))
        }
    }

    #[test]
    fn test_fenced_reply() {
        let reply = "Here you go:\n```json\n{\"persons\": [{\"text\": \"Ravi Kumar\", \"confidence\": 0.9}], \"places\": [\"Pune\"]}\n```";
        let set = extract_entities_from_text("Ravi Kumar went to Pune", &Canned(Ok(reply)));
        assert_eq!(set.get(EntityCategory::Persons)[0].text, "Ravi Kumar");
        assert_eq!(set.get(EntityCategory::Persons)[0].confidence, 0.9);
        assert_eq!(set.get(EntityCategory::Places)[0].confidence, DEFAULT_TEXT_CONFIDENCE);
        assert_eq!(set.get(EntityCategory::Places)[0].source, "nlp");
    }

    #[test]
    fn test_bare_object_with_prose() {
        let set = parse_entity_response(
            "Sure! {\"phone_numbers\": [\"555-123-4567\", \"555-123-4567\"], \"weather\": [\"rain\"]} hope that helps",
        )
        .unwrap();
        assert_eq!(set.get(EntityCategory::PhoneNumbers).len(), 1);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_garbage_returns_defaults() {
        let set = extract_entities_from_text("text", &Canned(Ok("I cannot help with that")));
        assert_eq!(set, TextEntitySet::default());
        assert_eq!(set.iter().count(), 5);
        assert!(set.is_empty());
    }

    #[test]
    fn test_model_failure_returns_defaults() {
        let set = extract_entities_from_text("text", &Canned(Err(())));
        assert_eq!(set, TextEntitySet::default());
    }

    #[test]
    fn test_empty_text_skips_model() {
        struct Panics;
        impl ChatModel for Panics {
            fn complete(&self, _: &str, _: &str) -> Result<String, DossierError> {
                panic!("model must not be called");
            }
        }
        assert_eq!(extract_entities_from_text("  ", &Panics), TextEntitySet::default());
    }

    #[test]
    fn test_defaults_serialize_five_keys() {
        let json = serde_json::to_value(TextEntitySet::default()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 5);
        assert!(obj.contains_key("phoneNumbers"));
    }

    #[test]
    fn test_confidence_clamped() {
        let set =
            parse_entity_response(r#"{"dates": [{"text": "May 5, 2023", "confidence": 7}]}"#)
                .unwrap();
        assert_eq!(set.get(EntityCategory::Dates)[0].confidence, 1.0);
    }
}
