//! Request correlation.
//!
//! `SetRequestIdLayer` stamps every request with a UUID `x-request-id`
//! before anything else runs; handlers and middleware read it back through
//! the [`RequestId`] extractor so every log line and denial can be tied to
//! one request.
//!
//! [`Submission`] reads the fields of a form post, whether the client sent
//! them as a JSON object or as an urlencoded form.

use std::convert::Infallible;
use std::fmt;

use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap},
    Form, Json,
};

use crate::http::response::ApiError;
use crate::validation::FieldSet;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Correlation id of the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for RequestId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown");
        Ok(RequestId(id.to_string()))
    }
}

/// Submitted fields, in submission order.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission(pub FieldSet);

impl<S: Send + Sync> FromRequest<S> for Submission {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_urlencoded(req.headers()) {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state).await?;
            Ok(Submission(FieldSet::from_form_pairs(pairs)))
        } else {
            let Json(fields) = Json::<FieldSet>::from_request(req, state).await?;
            Ok(Submission(fields))
        }
    }
}

fn is_urlencoded(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| {
            mime.trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
}
