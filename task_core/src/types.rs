use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{Display, EnumString};

use errors::TransportKind;

/// Upper bound on suggestions returned for one request.
pub const MAX_SUGGESTIONS: usize = 5;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum TaskStatus {
    Pending,
    Completed
}

/// A task as held by the client-side task store.
///
/// The suggestion pipeline only ever reads `title` and `description`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>
}

impl Task {
    /// Turns an accepted suggestion into a new pending task under `self`.
    ///
    /// `index` is zero-based; the title carries the one-based step number.
    pub fn subtask_from_suggestion(&self, suggestion: &str, index: usize) -> NewTask {
        NewTask {
            title: format!("{} - Step {}", self.title, index + 1),
            description: suggestion.trim().to_string(),
            status: TaskStatus::Pending,
            due_date: self.due_date
        }
    }
}

/// A task that has not been assigned an identity by the store yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>
}

impl NewTask {
    pub fn into_task(self, id: impl Into<String>, created_at: DateTime<Utc>) -> Task {
        Task {
            id: id.into(),
            title: self.title,
            description: self.description,
            status: self.status,
            due_date: self.due_date,
            created_at
        }
    }
}

/// Input of one suggestion generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionRequest {
    /// Missing and `null` both read as an empty title.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl SuggestionRequest {
    pub fn new(title: impl Into<String>, description: Option<String>) -> Self {
        Self {
            title: title.into(),
            description
        }
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }

    /// Description, if present and non-blank.
    pub fn description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

impl From<&Task> for SuggestionRequest {
    fn from(task: &Task) -> Self {
        let description = if task.description.trim().is_empty() {
            None
        } else {
            Some(task.description.clone())
        };
        Self {
            title: task.title.clone(),
            description
        }
    }
}

/// Ordered, cleaned suggestions. Never longer than [`MAX_SUGGESTIONS`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuggestionResult(Vec<String>);

impl SuggestionResult {
    pub fn new(mut suggestions: Vec<String>) -> Self {
        suggestions.truncate(MAX_SUGGESTIONS);
        Self(suggestions)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl IntoIterator for SuggestionResult {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Outcome of one (model, attempt) pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum AttemptOutcome {
    Succeeded { suggestions: usize },
    InvalidResponse,
    EmptyResult,
    Failed { kind: TransportKind }
}

impl AttemptOutcome {
    pub fn label(&self) -> String {
        match self {
            Self::Succeeded { .. } => "succeeded".to_string(),
            Self::InvalidResponse => "invalid_response".to_string(),
            Self::EmptyResult => "empty_result".to_string(),
            Self::Failed { kind } => kind.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelAttempt {
    pub model: String,
    pub attempt: u32,
    #[serde(flatten)]
    pub outcome: AttemptOutcome
}

/// Upstream `generateContent` body. Every level is optional so that a
/// missing candidate or content is reported by the parser, not by serde.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>
}

impl RawResponse {
    /// Single-candidate response carrying `text`.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(Content {
                    parts: vec![Part {
                        text: Some(text.into())
                    }],
                    role: Some("model".to_string())
                }),
                finish_reason: Some("STOP".to_string())
            }]
        }
    }
}

/// Upstream credential. Never printed, never serialized in clear, never
/// blank.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for a blank key.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            None
        } else {
            Some(Self(key.trim().to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Deserializes an optional key, treating a blank value as absent.
    ///
    /// Use with `#[serde(default, deserialize_with = "ApiKey::deserialize_optional")]`.
    pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<Self>, D::Error>
    where
        D: Deserializer<'de>
    {
        Ok(Option::<String>::deserialize(deserializer)?.and_then(Self::new))
    }
}

impl<'de> Deserialize<'de> for ApiKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).ok_or_else(|| serde::de::Error::custom("API key must not be blank"))
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey(***)")
    }
}

impl Serialize for ApiKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("***")
    }
}
