//! Caller identity middleware
//!
//! Authentication is performed by the gateway in front of this service,
//! which forwards the resolved identity as `x-caller-id` / `x-caller-role`.
//! Requests without them proceed as anonymous callers.

use alp_common::{Caller, Role};
use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};

use super::error::{ApiError, ApiResult};

pub const CALLER_ID_HEADER: &str = "x-caller-id";
pub const CALLER_ROLE_HEADER: &str = "x-caller-role";

/// Resolve the caller from gateway headers
pub fn caller_from_headers(headers: &HeaderMap) -> ApiResult<Caller> {
    let header = |name: &str| -> ApiResult<Option<String>> {
        headers
            .get(name)
            .map(|value| {
                value
                    .to_str()
                    .map(|s| s.trim().to_string())
                    .map_err(|_| ApiError::BadRequest(format!("{} is not valid text", name)))
            })
            .transpose()
    };

    let role = match header(CALLER_ROLE_HEADER)? {
        Some(raw) => Role::parse(&raw)
            .ok_or_else(|| ApiError::BadRequest(format!("Unknown caller role: {}", raw)))?,
        None => return Ok(Caller::anonymous()),
    };
    if role == Role::Anonymous {
        return Ok(Caller::anonymous());
    }

    match header(CALLER_ID_HEADER)? {
        Some(id) if !id.is_empty() => Ok(Caller::new(id, role)),
        _ => Err(ApiError::BadRequest(format!(
            "{} is required for role {}",
            CALLER_ID_HEADER, role
        ))),
    }
}

/// Attach the resolved [`Caller`] to the request extensions
pub async fn identity_middleware(mut request: Request, next: Next) -> ApiResult<Response> {
    let caller = caller_from_headers(request.headers())?;
    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}
