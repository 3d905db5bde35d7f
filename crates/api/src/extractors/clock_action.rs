//! Clock action path extractor.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use domain::models::ClockAction;

use crate::error::ApiError;

/// The `:action` path segment of a clock route.
///
/// Unknown actions are rejected with 404 before any other extractor runs, so
/// place it ahead of [`super::ActingProfile`] in handler arguments.
#[derive(Debug, Clone, Copy)]
pub struct ClockActionPath(pub ClockAction);

#[async_trait]
impl<S> FromRequestParts<S> for ClockActionPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(action) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::NotFound("Clock action missing".to_string()))?;

        ClockAction::from_str(&action)
            .map(ClockActionPath)
            .ok_or_else(|| ApiError::NotFound(format!("Unknown clock action '{}'", action)))
    }
}
