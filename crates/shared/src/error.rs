use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    Conflict,
    Internal,
}

/// Typed error body some API endpoints return alongside a non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    /// Parses a response body as an `ApiError`, if it is one.
    pub fn from_body(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_typed_error_body() {
        let error = ApiError::from_body(r#"{"code":"conflict","message":"email taken"}"#)
            .expect("typed body");
        assert_eq!(error.code, ErrorCode::Conflict);
        assert_eq!(error.message, "email taken");
    }

    #[test]
    fn plain_text_body_is_not_an_api_error() {
        assert!(ApiError::from_body("Bad Gateway").is_none());
    }
}
