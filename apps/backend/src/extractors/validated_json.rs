use std::ops::Deref;

use actix_web::dev::Payload;
use actix_web::web::Bytes;
use actix_web::{FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use tracing::debug;

use crate::error::AppError;
use crate::logging::pii::Redacted;

/// JSON body extractor whose failures are `ValidationError` (422) envelopes.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T> ValidatedJson<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> FromRequest for ValidatedJson<T>
where
    T: DeserializeOwned + 'static,
{
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let body = Bytes::from_request(req, payload);

        Box::pin(async move {
            let body = body.await.map_err(|e| {
                debug!(error = %e, "failed to read request body");
                AppError::invalid("Failed to read request body")
            })?;

            let parsed = serde_json::from_slice::<T>(&body).map_err(|e| {
                debug!(
                    error = %Redacted(&e.to_string()),
                    body_size = body.len(),
                    "JSON parsing failed"
                );
                AppError::invalid(describe_json_error(&e))
            })?;

            Ok(ValidatedJson(parsed))
        })
    }
}

/// Client-facing text for a parse failure, without echoing body content.
fn describe_json_error(error: &serde_json::Error) -> String {
    match error.classify() {
        Category::Syntax => format!("Invalid JSON at line {}", error.line()),
        Category::Eof => "Invalid JSON: unexpected end of input".to_string(),
        Category::Data => {
            let message = error.to_string();
            let head = message.split(" at line ").next().unwrap_or_default();
            // Field names only; type errors would echo the offending value
            if head.starts_with("missing field") || head.starts_with("unknown field") {
                format!("Invalid request body: {head}")
            } else {
                "Invalid request body: wrong types for one or more fields".to_string()
            }
        }
        Category::Io => "Invalid JSON: I/O error while reading body".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Body {
        title: String,
    }

    async fn extract(raw: &'static str) -> Result<ValidatedJson<Body>, AppError> {
        let (req, mut payload) = TestRequest::post()
            .insert_header(("content-type", "application/json"))
            .set_payload(raw)
            .to_http_parts();
        ValidatedJson::<Body>::from_request(&req, &mut payload).await
    }

    #[actix_web::test]
    async fn test_valid_body() {
        let body = extract(r#"{"title":"x"}"#).await.unwrap();
        assert_eq!(body.title, "x");
    }

    #[actix_web::test]
    async fn test_syntax_error_is_validation() {
        let err = extract("{not json").await.unwrap_err();
        assert_eq!(err.status().as_u16(), 422);
        assert!(err.public_detail().starts_with("Invalid JSON"));
    }

    #[actix_web::test]
    async fn test_missing_field_is_named() {
        let err = extract("{}").await.unwrap_err();
        assert_eq!(err.public_detail(), "Invalid request body: missing field `title`");
    }

    #[actix_web::test]
    async fn test_wrong_type_does_not_echo_value() {
        let err = extract(r#"{"title": 12345678}"#).await.unwrap_err();
        assert!(!err.public_detail().contains("12345678"));
        assert_eq!(err.status().as_u16(), 422);
    }
}
