use chatbox_model::{Completion, CompletionRequest};
use serde::{Deserialize, Serialize};

// -----------------------------
// Type received from the server
// -----------------------------

/// The reply body. Only `text` is required, other fields are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ChatResponse {
    pub text: String,
}

// -------------------------
// Type sent to the server
// -------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ChatRequest {
    #[serde(rename = "Body")]
    body: String,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_request(req: &CompletionRequest) -> ChatRequest {
    ChatRequest {
        body: req.input.clone(),
    }
}

#[inline]
pub fn into_completion(resp: ChatResponse) -> Completion {
    Completion { text: resp.text }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_request_body_shape() {
        let req = create_request(&CompletionRequest::new("hello"));
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value, json!({ "Body": "hello" }));
    }

    #[test]
    fn test_response_ignores_extra_fields() {
        let resp: ChatResponse = serde_json::from_value(json!({
            "text": "hi there",
            "usage": { "tokens": 3 }
        }))
        .unwrap();
        assert_eq!(into_completion(resp).text, "hi there");
    }

    #[test]
    fn test_response_requires_text() {
        let result =
            serde_json::from_value::<ChatResponse>(json!({ "message": "x" }));
        assert!(result.is_err());

        let result = serde_json::from_value::<ChatResponse>(json!({ "text": 1 }));
        assert!(result.is_err());
    }
}
