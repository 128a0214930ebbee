use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

use super::domain::{Actor, UserId, UserRole, UserStatus, WireCode};
use super::error::MarketplaceError;

/// Identity headers set by the upstream session gateway.
pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";
pub const USER_STATUS_HEADER: &str = "x-user-status";

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Resolve the caller from gateway headers. A missing status means `ACTIVE`;
/// anything unreadable is treated as unauthenticated.
pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, MarketplaceError> {
    let user_id = header(headers, USER_ID_HEADER).ok_or(MarketplaceError::Unauthorized)?;
    let role = header(headers, USER_ROLE_HEADER)
        .and_then(UserRole::from_code)
        .ok_or(MarketplaceError::Unauthorized)?;
    let status = match header(headers, USER_STATUS_HEADER) {
        Some(raw) => UserStatus::from_code(raw).ok_or(MarketplaceError::Unauthorized)?,
        None => UserStatus::Active,
    };

    Ok(Actor {
        user_id: UserId(user_id.to_string()),
        role,
        status,
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = MarketplaceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        actor_from_headers(&parts.headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_actor_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("worker-7"));
        headers.insert(USER_ROLE_HEADER, HeaderValue::from_static("worker"));

        let actor = actor_from_headers(&headers).expect("actor");
        assert_eq!(actor.user_id, UserId("worker-7".to_string()));
        assert_eq!(actor.role, UserRole::Worker);
        assert_eq!(actor.status, UserStatus::Active);
    }

    #[test]
    fn missing_or_unknown_identity_is_unauthorized() {
        let headers = HeaderMap::new();
        assert!(matches!(
            actor_from_headers(&headers),
            Err(MarketplaceError::Unauthorized)
        ));

        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("u-1"));
        headers.insert(USER_ROLE_HEADER, HeaderValue::from_static("FOREMAN"));
        assert!(matches!(
            actor_from_headers(&headers),
            Err(MarketplaceError::Unauthorized)
        ));
    }
}
