use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::admin::{verify_session, AdminIdentity};
use crate::database::AppState;
use crate::error::AppError;

/// Cookie the admin pages keep the session token in.
pub const SESSION_COOKIE: &str = "sb-access-token";

/// Token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

/// Bearer token, falling back to the session cookie set by the login page.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    bearer_token(headers).or_else(|| {
        headers
            .get(header::COOKIE)?
            .to_str()
            .ok()?
            .split(';')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| key.trim() == SESSION_COOKIE)
            .map(|(_, value)| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

/// Admits only requests carrying the token of a user whose profile role is
/// `admin`. The verified [`AdminIdentity`] is attached as a request extension.
///
/// Checks run in order and the first failure answers:
/// 1. no bearer token - **401** `Missing access token`
/// 2. no service role key - **500** `Admin client not configured`
/// 3. token rejected by the auth service - **401** `Invalid or expired token`
/// 4. profile missing or not `admin` - **403** `Admin access required`
pub async fn require_admin(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&headers)
        .ok_or_else(|| AppError::Unauthorized("Missing access token".into()))?;
    if !state.data.admin_enabled() {
        return Err(AppError::NotConfigured);
    }
    let user = verify_session(state.data.as_ref(), &token).await?;

    let profile = match state.data.get_profile(&user.id).await {
        Ok(Some(profile)) if profile.is_admin() => profile,
        Ok(_) => return Err(AppError::Forbidden("Admin access required".into())),
        Err(e) => {
            debug!("profile lookup failed: {e}");
            return Err(AppError::Forbidden("Admin access required".into()));
        }
    };

    request.extensions_mut().insert(AdminIdentity {
        user,
        profile,
        token,
    });
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn session_cookie_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("productView=list; sb-access-token=tok"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("tok"));
    }
}
