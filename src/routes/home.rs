use axum::response::Response;

use crate::routes::found;

/// The landing page is the user list.
pub async fn index() -> Response {
    found("/users")
}
