//! Request extractors shared by the book handlers.

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use bookshelf_http::error::AppError;
use serde_json::{Map, Value};

use super::models::BookId;

/// Custom verb used by the search routes.
pub const SEARCH: &str = "SEARCH";

/// JSON object body, kept untyped until a contract converts it.
///
/// An empty body reads as `{}`; anything that is not a JSON object is a 400.
#[derive(Debug, Clone)]
pub struct JsonPayload(pub Map<String, Value>);

impl<S> FromRequest<S> for JsonPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::rejected(rejection.status(), rejection.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(Map::new()));
        }

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            Ok(_) => Err(AppError::bad_request("request body must be a JSON object")),
            Err(err) => Err(AppError::bad_request(format!(
                "request body is not valid JSON: {err}"
            ))),
        }
    }
}

/// Guard admitting only the `SEARCH` verb; anything else gets the 501 reply.
#[derive(Debug, Clone, Copy)]
pub struct SearchVerb;

impl<S> FromRequestParts<S> for SearchVerb
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if parts.method.as_str() == SEARCH {
            Ok(Self)
        } else {
            Err(AppError::not_implemented(
                parts.method.as_str(),
                parts.uri.path(),
            ))
        }
    }
}

/// The `{book_id}` path segment, parsed. `raw` is the segment as sent.
#[derive(Debug, Clone)]
pub struct BookIdPath {
    pub id: BookId,
    pub raw: String,
}

impl<S> FromRequestParts<S> for BookIdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::rejected(rejection.status(), rejection.body_text()))?;
        let id = parse_book_id(&raw)?;
        Ok(Self { id, raw })
    }
}

/// Parse a path segment into a book id, rejecting malformed ids up front.
pub fn parse_book_id(raw: &str) -> Result<BookId, AppError> {
    raw.parse().map_err(|_| {
        tracing::warn!(book_id = raw, "malformed book id");
        AppError::bad_request(format!("'{raw}' is not a valid book id"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    async fn payload(body: &'static str) -> Result<JsonPayload, AppError> {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/book")
            .body(Body::from(body))
            .unwrap();
        JsonPayload::from_request(request, &()).await
    }

    #[tokio::test]
    async fn empty_body_reads_as_empty_object() {
        assert!(payload("").await.unwrap().0.is_empty());
        assert!(payload("  \n").await.unwrap().0.is_empty());
    }

    #[tokio::test]
    async fn non_object_bodies_are_rejected() {
        for body in ["[1, 2]", "\"text\"", "{ broken"] {
            let err = payload(body).await.unwrap_err();
            assert!(matches!(err, AppError::BadRequest { .. }), "body = {body}");
        }
    }

    #[tokio::test]
    async fn oversized_body_keeps_payload_too_large() {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/book")
            .body(Body::from(vec![b' '; 3 * 1024 * 1024]))
            .unwrap();
        let err = JsonPayload::from_request(request, &()).await.unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn malformed_ids_are_bad_requests() {
        let err = parse_book_id("61967133c1626e60e9750f7a").unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
        assert!(parse_book_id(&BookId::generate().to_string()).is_ok());
    }
}
