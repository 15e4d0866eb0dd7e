//! Response body shared by the form endpoints.

use serde::{Deserialize, Serialize};

/// `{ ok, message?, error?, retryAfter? }` as consumed by the site's forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Seconds until the client may retry, only on 429.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl FormResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: Some(message.into()),
            error: None,
            retry_after: None,
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: None,
            error: Some(error.into()),
            retry_after: None,
        }
    }

    /// Localized rate limit rejection.
    pub fn too_many_requests(retry_after: u64) -> Self {
        Self {
            retry_after: Some(retry_after),
            ..Self::error(format!(
                "Te veel verzoeken. Probeer het over {retry_after} seconden opnieuw."
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_body_shape() {
        let body = serde_json::to_value(FormResponse::too_many_requests(42)).unwrap();
        assert_eq!(body["ok"], false);
        assert_eq!(body["retryAfter"], 42);
        assert!(body["error"].as_str().unwrap().contains("Te veel verzoeken"));
        assert!(body.get("message").is_none());
    }

    #[test]
    fn test_ok_body_omits_error() {
        let body = serde_json::to_value(FormResponse::ok("Bedankt!")).unwrap();
        assert_eq!(body, serde_json::json!({ "ok": true, "message": "Bedankt!" }));
    }
}
