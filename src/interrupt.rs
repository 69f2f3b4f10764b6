//! Interrupt classification
//!
//! A plan run can suspend with interrupts from multiple unrelated causes at
//! once, including shapes introduced by newer planner versions. Classification
//! is therefore total: an unknown shape maps to [`InterruptKind::Unrecognized`]
//! instead of failing, so one odd interrupt never aborts processing of its
//! siblings. Unrecognized interrupts are answered with a denial downstream.

use serde_json::Value;

use crate::planner::Interrupt;

/// What a raised interrupt is asking for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterruptKind {
    /// A tool call is waiting on an external authorization flow
    AuthorizationPending { tool: String, url: String, token: String },

    /// A tool call is waiting on explicit human sign-off
    ApprovalPending { tool: String, input: Value },

    /// Shape not recognized; treated as an automatic denial
    Unrecognized,
}

/// Classify a raised interrupt
///
/// Pure and total: never fails, and classifying the same value twice yields
/// the same result.
pub fn classify(interrupt: &Interrupt) -> InterruptKind {
    let value = &interrupt.value;

    let tool = match value.get("tool_name").and_then(Value::as_str) {
        Some(t) => t.to_string(),
        None => return InterruptKind::Unrecognized,
    };

    if value.get("authorization_required").and_then(Value::as_bool) == Some(true) {
        let response = value.get("authorization_response");
        let url = response.and_then(|r| r.get("url")).and_then(Value::as_str);
        let token = response.and_then(|r| r.get("id")).and_then(Value::as_str);

        // Without both the URL and the completion token there is nothing
        // the collector can act on.
        return match (url, token) {
            (Some(url), Some(token)) => InterruptKind::AuthorizationPending {
                tool,
                url: url.to_string(),
                token: token.to_string(),
            },
            _ => InterruptKind::Unrecognized,
        };
    }

    if value.get("hitl_required").and_then(Value::as_bool) == Some(true) {
        return InterruptKind::ApprovalPending {
            tool,
            input: value.get("input").cloned().unwrap_or(Value::Null),
        };
    }

    InterruptKind::Unrecognized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::AuthRequest;

    #[test]
    fn test_classify_authorization_pending() {
        let auth = AuthRequest {
            url: "https://auth.example.com/flow/42".to_string(),
            id: "req_42".to_string(),
        };
        let interrupt = Interrupt::authorization("create_presentation", &auth);

        let kind = classify(&interrupt);
        assert_eq!(
            kind,
            InterruptKind::AuthorizationPending {
                tool: "create_presentation".to_string(),
                url: "https://auth.example.com/flow/42".to_string(),
                token: "req_42".to_string(),
            }
        );
    }

    #[test]
    fn test_classify_approval_pending() {
        let input = serde_json::json!({"title": "Q3 Review"});
        let interrupt = Interrupt::approval("create_presentation", &input);

        match classify(&interrupt) {
            InterruptKind::ApprovalPending { tool, input: got } => {
                assert_eq!(tool, "create_presentation");
                assert_eq!(got, input);
            }
            other => panic!("expected ApprovalPending, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_is_total_over_junk_shapes() {
        let shapes = vec![
            serde_json::json!(null),
            serde_json::json!(42),
            serde_json::json!("surprise"),
            serde_json::json!([]),
            serde_json::json!({}),
            serde_json::json!({"tool_name": "x"}),
            serde_json::json!({"authorization_required": true}),
            serde_json::json!({"tool_name": "x", "some_new_flag": true}),
        ];

        for shape in shapes {
            assert_eq!(classify(&Interrupt::new(shape)), InterruptKind::Unrecognized);
        }
    }

    #[test]
    fn test_classify_authorization_missing_handle_is_unrecognized() {
        // authorization_required without a usable url/token pair
        let interrupt = Interrupt::new(serde_json::json!({
            "tool_name": "x",
            "authorization_required": true,
            "authorization_response": {"url": "https://auth.example.com"},
        }));
        assert_eq!(classify(&interrupt), InterruptKind::Unrecognized);
    }

    #[test]
    fn test_classify_is_idempotent() {
        let interrupt = Interrupt::approval("tool", &serde_json::json!({"a": 1}));
        assert_eq!(classify(&interrupt), classify(&interrupt));

        let junk = Interrupt::new(serde_json::json!({"weird": true}));
        assert_eq!(classify(&junk), classify(&junk));
    }
}
