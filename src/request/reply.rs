use serde::Deserialize;

/// Outcome of one exchange, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `{"completion": "..."}`
    Completion(String),
    /// `{"error": "..."}`, or a synthetic error for a failed exchange.
    Error(String),
    /// Bytes that were not a valid reply object. `raw` is the lossy text.
    Malformed { raw: String, reason: String },
}

#[derive(Deserialize)]
struct WireReply {
    completion: Option<String>,
    error: Option<String>,
}

impl Reply {
    /// Parse raw reply bytes. Never fails; bad input becomes `Malformed`.
    pub fn parse(bytes: &[u8]) -> Self {
        let raw = String::from_utf8_lossy(bytes).into_owned();
        match serde_json::from_slice::<WireReply>(bytes) {
            Ok(WireReply {
                completion: Some(completion),
                ..
            }) => Reply::Completion(completion),
            Ok(WireReply {
                error: Some(error), ..
            }) => Reply::Error(error),
            Ok(_) => Reply::Malformed {
                raw,
                reason: "reply has neither completion nor error".into(),
            },
            Err(e) => Reply::Malformed {
                raw,
                reason: format!("invalid reply: {}", e),
            },
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Reply::Completion(_) => None,
            Reply::Error(e) => Some(e),
            Reply::Malformed { reason, .. } => Some(reason),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error().is_some()
    }

    /// Text written to the clipboard and the output element.
    pub fn output_text(&self) -> String {
        match self {
            Reply::Completion(text) => text.clone(),
            Reply::Error(e) => error_payload(e),
            Reply::Malformed { raw, reason } => {
                if raw.trim().is_empty() {
                    error_payload(reason)
                } else {
                    raw.clone()
                }
            }
        }
    }
}

fn error_payload(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_wins_over_error_field() {
        let reply = Reply::parse(br#"{"completion":"ok","error":"ignored"}"#);
        assert_eq!(reply, Reply::Completion("ok".into()));
    }

    #[test]
    fn empty_object_is_malformed() {
        let reply = Reply::parse(b"{}");
        assert!(matches!(reply, Reply::Malformed { .. }));
        assert_eq!(reply.output_text(), "{}");
    }

    #[test]
    fn blank_reply_shows_error_payload() {
        let reply = Reply::parse(b"");
        assert!(reply.is_error());
        assert!(reply.output_text().starts_with("{\"error\":"));
    }

    #[test]
    fn invalid_utf8_is_kept_lossy() {
        let reply = Reply::parse(&[0xff, b'h', b'i']);
        match reply {
            Reply::Malformed { raw, .. } => assert!(raw.ends_with("hi")),
            other => panic!("expected malformed, got {:?}", other),
        }
    }
}
