use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;

use crate::db::models::{Post, User, UserInput};
use crate::db::store::StoreError;
use crate::error::AppResult;
use crate::extractors::{EntityId, FormData};
use crate::routes::{found, Html};
use crate::state::AppState;

// --- Templates ---

#[derive(Template)]
#[template(path = "pages/users_list.html")]
pub struct UsersListTemplate {
    pub users: Vec<User>,
}

#[derive(Template)]
#[template(path = "pages/user_detail.html")]
pub struct UserDetailTemplate {
    pub user: User,
    pub posts: Vec<Post>,
}

/// Shared by the create and edit forms; only the labels and target differ.
#[derive(Template)]
#[template(path = "pages/user_form.html")]
pub struct UserFormTemplate {
    pub heading: String,
    pub action: String,
    pub submit_label: String,
    pub cancel_href: String,
    pub first_name: String,
    pub last_name: String,
    pub image_url: String,
    pub error: String,
}

impl UserFormTemplate {
    fn create(input: &UserInput, error: String) -> Self {
        Self {
            heading: "Create a user".to_string(),
            action: "/users/new".to_string(),
            submit_label: "Add".to_string(),
            cancel_href: "/users".to_string(),
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            image_url: input.image_url.clone().unwrap_or_default(),
            error,
        }
    }

    fn edit(id: i64, input: &UserInput, error: String) -> Self {
        Self {
            heading: "Edit a user".to_string(),
            action: format!("/users/{}/edit", id),
            submit_label: "Save".to_string(),
            cancel_href: format!("/users/{}", id),
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            image_url: input.image_url.clone().unwrap_or_default(),
            error,
        }
    }
}

// --- Forms ---

#[derive(Debug, Deserialize)]
pub struct UserForm {
    #[serde(rename = "first-name", default)]
    pub first_name: String,
    #[serde(rename = "last-name", default)]
    pub last_name: String,
    #[serde(rename = "image-url", default)]
    pub image_url: Option<String>,
}

impl From<UserForm> for UserInput {
    fn from(form: UserForm) -> Self {
        UserInput {
            first_name: form.first_name,
            last_name: form.last_name,
            image_url: form.image_url,
        }
    }
}

impl From<&User> for UserInput {
    fn from(user: &User) -> Self {
        UserInput {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            image_url: user.image_url.clone(),
        }
    }
}

// --- Router ---

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/new", get(new_user_form).post(create_user))
        .route("/users/{id}", get(user_detail))
        .route("/users/{id}/edit", get(edit_user_form).post(update_user))
        .route("/users/{id}/delete", post(delete_user))
}

// --- Handlers ---

async fn list_users(State(state): State<AppState>) -> AppResult<Html<UsersListTemplate>> {
    let users = state.store.list_users()?;
    Ok(Html(UsersListTemplate { users }))
}

async fn new_user_form() -> Html<UserFormTemplate> {
    Html(UserFormTemplate::create(&UserInput::default(), String::new()))
}

async fn create_user(
    State(state): State<AppState>,
    FormData(form): FormData<UserForm>,
) -> AppResult<Response> {
    let input = UserInput::from(form);

    match state.store.create_user(input.clone()) {
        Ok(_) => Ok(found("/users")),
        Err(StoreError::Validation(msg)) => Ok((
            StatusCode::BAD_REQUEST,
            Html(UserFormTemplate::create(&input, msg)),
        )
            .into_response()),
        Err(e) => Err(e.into()),
    }
}

async fn user_detail(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> AppResult<Html<UserDetailTemplate>> {
    let user = state.store.get_user(id)?;
    let posts = state.store.list_posts_for_user(id)?;
    Ok(Html(UserDetailTemplate { user, posts }))
}

async fn edit_user_form(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> AppResult<Html<UserFormTemplate>> {
    let user = state.store.get_user(id)?;
    Ok(Html(UserFormTemplate::edit(
        id,
        &UserInput::from(&user),
        String::new(),
    )))
}

async fn update_user(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    FormData(form): FormData<UserForm>,
) -> AppResult<Response> {
    // Unknown ids are a 404 even when the submitted form is also invalid
    state.store.get_user(id)?;

    let input = UserInput::from(form);
    match state.store.update_user(id, input.clone()) {
        Ok(()) => Ok(found("/users")),
        Err(StoreError::Validation(msg)) => Ok((
            StatusCode::BAD_REQUEST,
            Html(UserFormTemplate::edit(id, &input, msg)),
        )
            .into_response()),
        Err(e) => Err(e.into()),
    }
}

async fn delete_user(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> AppResult<Response> {
    state.store.delete_user(id)?;
    Ok(found("/"))
}
