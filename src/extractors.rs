use axum::extract::{FromRequest, FromRequestParts, Path};
use axum::http::request::Parts;

use crate::error::AppError;

/// Integer id taken from the single `{id}` path segment.
/// Anything that isn't a valid id is treated as a missing entity (404).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityId(pub i64);

impl<S> FromRequestParts<S> for EntityId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound)?;

        parse_id(&raw).map(EntityId).ok_or(AppError::NotFound)
    }
}

/// `axum::Form` whose rejections (wrong content type, undecodable body)
/// come back as a plain 400 through `AppError`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Form), rejection(AppError))]
pub struct FormData<T>(pub T);

fn parse_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id > 0)
}
