//! Validating extractors: the raw body or path parameters are run through
//! the DTO's schema before a handler sees them. Handlers only ever receive
//! sanitized, typed input.

use std::collections::HashMap;

use std::convert::Infallible;

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{request::Parts, HeaderMap},
};
use schema_validator::{Schema, ValidationErrors};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::api::rest::error::{from_parts, map_validation_errors};
use crate::api::rest::problem::ProblemResponse;

/// Header set by the ingress for every request.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

fn request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

/// The request's `x-request-id`, if any. Never rejects.
#[derive(Debug, Clone, Default)]
pub struct RequestId(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for RequestId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(request_id(&parts.headers)))
    }
}

/// A payload type bound to the schema that admits it.
pub trait Validated: DeserializeOwned {
    fn schema() -> &'static Schema;
}

/// JSON body validated against `T::schema()`. An empty body counts as absent.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

/// Path parameters validated against `T::schema()`.
#[derive(Debug, Clone)]
pub struct ValidPath<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: Validated,
{
    type Rejection = ProblemResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let instance = req.uri().path().to_owned();
        let rid = request_id(req.headers());
        let reject = |e: ValidationErrors| map_validation_errors(e, &instance).with_request_id(rid.as_deref());

        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            ProblemResponse(from_parts(
                rejection.status(),
                "USERS_BAD_BODY",
                "Unreadable body",
                rejection.body_text(),
                &instance,
            ))
            .with_request_id(rid.as_deref())
        })?;

        let raw = parse_body(&bytes).map_err(reject)?;
        T::schema()
            .validate_into(raw.as_ref())
            .map(ValidJson)
            .map_err(reject)
    }
}

impl<S, T> FromRequestParts<S> for ValidPath<T>
where
    S: Send + Sync,
    T: Validated,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let instance = parts.uri.path().to_owned();
        let rid = request_id(&parts.headers);
        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                ProblemResponse(from_parts(
                    rejection.status(),
                    "USERS_BAD_PATH",
                    "Invalid path",
                    rejection.body_text(),
                    &instance,
                ))
                .with_request_id(rid.as_deref())
            })?;

        let raw: Map<String, Value> = params
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        T::schema()
            .validate_into(Some(&Value::Object(raw)))
            .map(ValidPath)
            .map_err(|e| map_validation_errors(e, &instance).with_request_id(rid.as_deref()))
    }
}

fn parse_body(bytes: &[u8]) -> Result<Option<Value>, ValidationErrors> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(bytes)
        .map(Some)
        .map_err(|e| ValidationErrors::single("", format!("\"value\" must be valid JSON: {e}")))
}
