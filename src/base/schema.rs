//! The response schema that constrains the model's reply.
//!
//! The canonical form is plain JSON Schema (what OpenAI expects). Gemini takes the
//! OpenAPI flavour with upper-case type names, which is derived from the same value.

use std::sync::OnceLock;

use serde_json::{Value, json};

static TRIAGE_RESPONSE_SCHEMA: OnceLock<Value> = OnceLock::new();
static GEMINI_RESPONSE_SCHEMA: OnceLock<Value> = OnceLock::new();

/// Name used when a provider wants the schema labelled.
pub const TRIAGE_RESPONSE_SCHEMA_NAME: &str = "TicketTriage";

/// Get the triage response schema.
pub fn triage_response_schema() -> &'static Value {
    TRIAGE_RESPONSE_SCHEMA.get_or_init(|| {
        json!({
            "type": "object",
            "properties": {
                "intent": {
                    "type": "string",
                    "enum": [
                        "refund_request",
                        "order_status",
                        "technical_issue",
                        "account_access",
                        "billing_question",
                        "feedback",
                        "other"
                    ]
                },
                "sentiment": { "type": "string", "enum": ["angry", "frustrated", "neutral", "satisfied", "delighted"] },
                "priority": { "type": "string", "enum": ["low", "medium", "high", "urgent"] },
                "confidence": { "type": "number", "description": "Confidence between 0 and 1" },
                "summary": { "type": "string", "description": "Concise ticket summary" },
                "suggested_reply": { "type": "string", "description": "Reply draft for the agent to send" },
                "actions": { "type": "array", "items": { "type": "string", "description": "Recommended follow-up step" } },
                "tags": { "type": "array", "items": { "type": "string" } },
                "language": { "type": "string" }
            },
            "required": ["intent", "sentiment", "priority", "confidence", "summary", "suggested_reply", "actions"]
        })
    })
}

/// Get the triage response schema in Gemini's dialect.
pub fn gemini_response_schema() -> &'static Value {
    GEMINI_RESPONSE_SCHEMA.get_or_init(|| to_gemini_schema(triage_response_schema()))
}

/// Upper-case every `type` keyword, recursing through nested schemas.
fn to_gemini_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| {
                let value = match (key.as_str(), value) {
                    ("type", Value::String(ty)) => Value::String(ty.to_uppercase()),
                    // Property names and enum values are data, not schema keywords.
                    ("properties", Value::Object(props)) => Value::Object(props.iter().map(|(name, prop)| (name.clone(), to_gemini_schema(prop))).collect()),
                    ("enum" | "required", _) => value.clone(),
                    _ => to_gemini_schema(value),
                };

                (key.clone(), value)
            })
            .collect(),
        Value::Array(items) => Value::Array(items.iter().map(to_gemini_schema).collect()),
        other => other.clone(),
    }
}

// Tests.
