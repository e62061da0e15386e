//! Ticket and triage types, plus the result aliases used across the crate.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::TriageError;

/// The crate-wide error type.
pub type Err = anyhow::Error;
/// The crate-wide result type.
pub type Res<T> = Result<T, Err>;
/// A result with no value.
pub type Void = Res<()>;

/// Maximum length (in characters) of a single transcript message.
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// Default language hint for a ticket.
fn default_language() -> String {
    "en".to_string()
}

// Ticket input.

/// A single message in a ticket transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who wrote the message, usually `customer` or `agent`.
    pub role: String,
    /// The message body.
    pub text: String,
}

impl Message {
    /// The label used for this message's author in the rendered transcript.
    pub fn role_label(&self) -> String {
        self.role.to_uppercase()
    }
}

/// The ticket submitted for triage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketPayload {
    /// Caller-side identifier, echoed back in the result.
    pub ticket_id: String,
    /// The transcript, oldest first.
    pub messages: Vec<Message>,
    /// ISO language code, used as a tonal hint.
    #[serde(default = "default_language")]
    pub language: String,
    /// E.g. email, chat, whatsapp.
    #[serde(default)]
    pub channel: Option<String>,
    /// Support tier of the customer, if known.
    #[serde(default)]
    pub customer_tier: Option<String>,
    /// Optional knowledge base extracts used to ground the model.
    #[serde(default)]
    pub knowledge_snippets: Option<Vec<String>>,
}

impl TicketPayload {
    /// Check the field constraints that the JSON shape alone cannot express.
    pub fn validate(&self) -> Result<(), TriageError> {
        if self.ticket_id.is_empty() {
            return Err(TriageError::InvalidTicket("ticket_id cannot be empty".to_string()));
        }

        if self.messages.is_empty() {
            return Err(TriageError::InvalidTicket("messages cannot be empty".to_string()));
        }

        for (index, message) in self.messages.iter().enumerate() {
            let len = message.text.chars().count();

            if len == 0 || len > MAX_MESSAGE_CHARS {
                return Err(TriageError::InvalidTicket(format!(
                    "messages[{index}].text must be between 1 and {MAX_MESSAGE_CHARS} characters (got {len})"
                )));
            }
        }

        Ok(())
    }
}

// Triage output.

/// What the customer wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Money back for an order or charge.
    RefundRequest,
    /// Where an order is.
    OrderStatus,
    /// Something is broken.
    TechnicalIssue,
    /// Login or account lockout.
    AccountAccess,
    /// Invoices, charges, plans.
    BillingQuestion,
    /// Praise or complaints without a request.
    Feedback,
    /// Anything else.
    Other,
}

/// How the customer feels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    /// Hostile or threatening escalation.
    Angry,
    /// Annoyed but civil.
    Frustrated,
    /// Matter-of-fact.
    Neutral,
    /// Content with the service.
    Satisfied,
    /// Openly happy.
    Delighted,
}

/// How soon the ticket needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Normal queue.
    Medium,
    /// Next in line.
    High,
    /// Drop everything.
    Urgent,
}

/// The structured triage of a single ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageResult {
    /// Always the `ticket_id` of the originating request.
    pub ticket_id: String,
    /// Classified intent.
    pub intent: Intent,
    /// Classified sentiment.
    pub sentiment: Sentiment,
    /// Suggested priority.
    pub priority: Priority,
    /// Model confidence, between 0 and 1.
    pub confidence: f64,
    /// Concise ticket summary.
    pub summary: String,
    /// Reply draft for the agent to send.
    pub suggested_reply: String,
    /// Recommended follow-up steps, in order.
    pub actions: Vec<String>,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Language the reply was drafted in.
    #[serde(default)]
    pub language: Option<String>,
}

impl TriageResult {
    /// Build a result from the model's raw JSON object.
    ///
    /// The `ticket_id` is always taken from the originating request; whatever the
    /// model put there is discarded.
    pub fn from_model_value(value: Value, ticket_id: &str) -> Result<Self, TriageError> {
        let Value::Object(mut fields) = value else {
            return Err(TriageError::MalformedModelOutput(format!("expected a JSON object, got {}", json_kind(&value))));
        };

        fields.insert("ticket_id".to_string(), Value::String(ticket_id.to_string()));

        let result: TriageResult = serde_json::from_value(Value::Object(fields)).map_err(|err| TriageError::InvalidModelOutput(err.to_string()))?;

        if !(0.0..=1.0).contains(&result.confidence) {
            return Err(TriageError::InvalidModelOutput(format!("confidence must be between 0 and 1 (got {})", result.confidence)));
        }

        Ok(result)
    }
}

// Provider plumbing.

/// A single user turn handed to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Chat role of the turn; always `user`.
    pub role: &'static str,
    /// The rendered ticket.
    pub text: String,
}

/// What a provider handed back.
///
/// Some providers return an already-decoded object; others only give raw text
/// that is expected to parse as JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutput {
    /// A JSON value decoded by the provider.
    Structured(Value),
    /// Raw text, expected to parse as JSON.
    Text(String),
}

impl ModelOutput {
    /// Resolve the output into a JSON value, parsing text when needed.
    pub fn into_value(self) -> Result<Value, TriageError> {
        match self {
            ModelOutput::Structured(value) => Ok(value),
            ModelOutput::Text(text) => serde_json::from_str(&text).map_err(|err| TriageError::MalformedModelOutput(err.to_string())),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// Tests.
