//! Acting profile extractor.
//!
//! Resolves the bearer token of a request into the profile it belongs to.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::models::Profile;
use domain::ClockError;
use tracing::debug;

use crate::app::AppState;
use crate::error::ApiError;

/// The authenticated, active profile making the request.
#[derive(Debug, Clone)]
pub struct ActingProfile(pub Profile);

/// Extracts the token from a `Bearer <token>` Authorization header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for ActingProfile {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ClockError::Unauthenticated)?;

        let profile_id = state.verifier.verify_profile_id(token).map_err(|e| {
            debug!(error = %e, "Rejected access token");
            ClockError::Unauthenticated
        })?;

        let profile = state
            .processor
            .collaborators()
            .profiles
            .get_profile(profile_id)
            .await?
            .ok_or(ClockError::Unauthenticated)?;

        if !profile.is_active {
            return Err(ClockError::Disabled.into());
        }

        Ok(ActingProfile(profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header("Authorization", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&parts_with(Some("Bearer abc.def"))), Some("abc.def"));
        assert_eq!(bearer_token(&parts_with(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&parts_with(Some("Bearer "))), None);
        assert_eq!(bearer_token(&parts_with(None)), None);
    }
}
