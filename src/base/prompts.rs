//! System directive and prompt construction for ticket triage.

use crate::base::types::{Prompt, TicketPayload};

/// System directive.
pub const SYSTEM_DIRECTIVE: &str = "You are Support Copilot, a customer support specialist. \
Given the full ticket transcript, return intent, urgency, sentiment, \
a concise summary, recommended actions, and a short reply draft. \
Follow company tone: empathic, concise, solution-focused. \
If you lack detail, highlight missing info instead of inventing answers.";

/// Render a ticket into the single user turn sent to the model.
///
/// The layout is fixed: the context block (with knowledge base extracts, if any),
/// the transcript, then the closing instruction. Messages whose text is blank after
/// trimming are dropped.
pub fn build_prompt(payload: &TicketPayload) -> Prompt {
    let mut context_parts = vec![
        format!("Ticket ID: {}", payload.ticket_id),
        format!("Channel: {}", payload.channel.as_deref().unwrap_or("unknown")),
        format!("Customer tier: {}", payload.customer_tier.as_deref().unwrap_or("unknown")),
        format!("Language hint: {}", payload.language),
    ];

    if let Some(snippets) = payload.knowledge_snippets.as_ref().filter(|s| !s.is_empty()) {
        context_parts.push("Relevant KB:".to_string());
        context_parts.extend(snippets.iter().enumerate().map(|(idx, snippet)| format!("[KB {}] {}", idx + 1, snippet.trim())));
    }

    let transcript_lines = payload
        .messages
        .iter()
        .filter_map(|msg| {
            let text = msg.text.trim();
            (!text.is_empty()).then(|| format!("{}: {}", msg.role_label(), text))
        })
        .collect::<Vec<_>>();

    let text = [context_parts.join("\n"), "Transcript:".to_string(), transcript_lines.join("\n"), String::new(), "Return JSON only.".to_string()].join("\n");

    Prompt { role: "user", text }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::types::Message;

    fn payload() -> TicketPayload {
        TicketPayload {
            ticket_id: "T-100".to_string(),
            messages: vec![
                Message {
                    role: "customer".to_string(),
                    text: "  My order 9283 still shows processing after 10 days. ".to_string(),
                },
                Message {
                    role: "agent".to_string(),
                    text: "   ".to_string(),
                },
                Message {
                    role: "agent".to_string(),
                    text: "Let me check that for you.".to_string(),
                },
                Message {
                    role: "customer".to_string(),
                    text: "Please cancel it and refund me ASAP.".to_string(),
                },
            ],
            language: "en".to_string(),
            channel: Some("email".to_string()),
            customer_tier: None,
            knowledge_snippets: None,
        }
    }

    #[test]
    fn test_build_prompt_layout() {
        let prompt = build_prompt(&payload());

        let expected = "Ticket ID: T-100\n\
Channel: email\n\
Customer tier: unknown\n\
Language hint: en\n\
Transcript:\n\
CUSTOMER: My order 9283 still shows processing after 10 days.\n\
AGENT: Let me check that for you.\n\
CUSTOMER: Please cancel it and refund me ASAP.\n\
\n\
Return JSON only.";

        assert_eq!(prompt.role, "user");
        assert_eq!(prompt.text, expected);
    }

    #[test]
    fn test_build_prompt_one_line_per_non_blank_message() {
        let prompt = build_prompt(&payload());
        let transcript = prompt.text.split("Transcript:\n").nth(1).unwrap().split("\n\n").next().unwrap();

        let lines = transcript.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("CUSTOMER: "));
        assert!(lines[1].starts_with("AGENT: "));
        assert!(lines[2].starts_with("CUSTOMER: "));
    }

    #[test]
    fn test_build_prompt_knowledge_snippets() {
        let mut payload = payload();
        payload.knowledge_snippets = Some(vec![" Refunds take 5-7 business days. ".to_string(), "Orders ship within 48h.".to_string()]);

        let prompt = build_prompt(&payload);

        assert!(prompt.text.contains("Language hint: en\nRelevant KB:\n[KB 1] Refunds take 5-7 business days.\n[KB 2] Orders ship within 48h.\nTranscript:"));
    }

    #[test]
    fn test_build_prompt_without_snippets_has_no_kb_section() {
        let prompt = build_prompt(&payload());
        assert!(!prompt.text.contains("Relevant KB"));

        let mut payload = payload();
        payload.knowledge_snippets = Some(vec![]);
        assert!(!build_prompt(&payload).text.contains("Relevant KB"));
    }

    #[test]
    fn test_build_prompt_uppercases_any_role() {
        let mut payload = payload();
        payload.messages = vec![
            Message {
                role: "Customer".to_string(),
                text: "Where is my parcel?".to_string(),
            },
            Message {
                role: "system".to_string(),
                text: "Ticket reopened.".to_string(),
            },
        ];

        let prompt = build_prompt(&payload);

        assert!(prompt.text.contains("Transcript:\nCUSTOMER: Where is my parcel?\nSYSTEM: Ticket reopened.\n"));
    }

    #[test]
    fn test_build_prompt_is_deterministic() {
        assert_eq!(build_prompt(&payload()), build_prompt(&payload()));
    }
}
