use axum::{
    async_trait,
    body::Body,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Query, Request},
    http::{header::CONTENT_TYPE, request::Parts},
    Json,
};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::ApiError;

/// Bodies larger than this are rejected before JSON parsing.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// JSON body whose rejections come back as `{ "message": ... }` with 400.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                let message = rejection.body_text();
                warn!(error = %message, "rejected request body");
                Err(ApiError::BadRequest(message))
            }
        }
    }
}

/// Like [`JsonBody`], but a request without a body or without a
/// `Content-Type` yields `T::default()`.
pub struct OptionalJsonBody<T>(pub Result<T, ApiError>);

#[async_trait]
impl<S, T> FromRequest<S> for OptionalJsonBody<T>
where
    T: Default + Send,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !req.headers().contains_key(CONTENT_TYPE) {
            return Ok(Self(Ok(T::default())));
        }

        let (parts, body) = req.into_parts();
        let bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
            Ok(bytes) => bytes,
            Err(e) => return Ok(Self(Err(ApiError::BadRequest(e.to_string())))),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(Ok(T::default())));
        }

        let req = Request::from_parts(parts, Body::from(bytes));
        let parsed = JsonBody::<T>::from_request(req, state)
            .await
            .map(|JsonBody(value)| value);
        Ok(Self(parsed))
    }
}

/// Query string whose malformed forms (duplicate keys and the like) read as
/// an empty query instead of a plain-text 400.
pub struct LenientQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for LenientQuery<T>
where
    T: DeserializeOwned + Default + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(LenientQuery(value)),
            Err(rejection) => {
                debug!(error = %rejection.body_text(), "ignoring malformed query string");
                Ok(LenientQuery(T::default()))
            }
        }
    }
}

/// Numeric `:id` path segment. Anything that is not an id cannot match a
/// record, so it is reported as not found.
pub struct UserId(pub u64);

#[async_trait]
impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                debug!(error = %rejection.body_text(), "unreadable user id");
                ApiError::NotFound
            })?;
        parse_id(&raw).map(UserId)
    }
}

pub(crate) fn parse_id(raw: &str) -> Result<u64, ApiError> {
    raw.trim().parse::<u64>().map_err(|_| ApiError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_rejects_non_numeric_as_not_found() {
        assert_eq!(parse_id("12").unwrap(), 12);
        assert!(matches!(parse_id("getByName"), Err(ApiError::NotFound)));
        assert!(matches!(parse_id("-1"), Err(ApiError::NotFound)));
    }
}
