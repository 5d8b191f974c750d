//! Operator identity extractor
//!
//! Write endpoints need to know who is acting (for audit entries and point
//! awards) and the request's idempotency key. Identity arrives in
//! `X-Operator-*` headers set by the edge gateway; full authentication is
//! outside this service.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::ops::OperationMeta;
use crate::utils::AppError;

/// Acting operator plus per-request metadata
#[derive(Debug, Clone)]
pub struct Operator {
    pub id: i64,
    pub name: String,
    pub role: String,
    pub ip_address: Option<String>,
    /// Idempotency key: client-supplied `X-Request-Id` or generated
    pub request_id: String,
}

impl Operator {
    /// Build the operation metadata for an orchestrated call
    pub fn into_meta(self) -> OperationMeta {
        OperationMeta {
            request_id: self.request_id,
            operator_id: self.id,
            operator_name: self.name,
            operator_role: self.role,
            ip_address: self.ip_address,
            timestamp: shared::util::now_millis(),
        }
    }
}

fn header_str<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl<S> FromRequestParts<S> for Operator
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header_str(parts, "x-operator-id")
            .ok_or_else(|| AppError::validation("X-Operator-Id header is required"))?
            .parse::<i64>()
            .map_err(|_| AppError::validation("X-Operator-Id must be an integer"))?;

        let name = header_str(parts, "x-operator-name")
            .unwrap_or("unknown")
            .to_string();
        let role = header_str(parts, "x-operator-role")
            .unwrap_or("staff")
            .to_string();

        // First hop of X-Forwarded-For, when the gateway sets it
        let ip_address = header_str(parts, "x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string());

        let request_id = header_str(parts, "x-request-id")
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        Ok(Self {
            id,
            name,
            role,
            ip_address,
            request_id,
        })
    }
}
