use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::gemini::GeminiError;

// Errors a handler can surface to the caller. Validation failures never
// reach this type; the Json extractor rejects them first.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Gemini(#[from] GeminiError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Gemini(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_errors_render_as_500_with_the_snippet() {
        let err = ApiError::from(GeminiError::Upstream {
            body: "model overloaded".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Gemini error: model overloaded");
    }
}
