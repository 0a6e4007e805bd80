use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;

use crate::db::models::{Post, PostInput, User};
use crate::db::store::StoreError;
use crate::error::AppResult;
use crate::extractors::{EntityId, FormData};
use crate::routes::{found, Html};
use crate::state::AppState;

// --- Templates ---

#[derive(Template)]
#[template(path = "pages/post_detail.html")]
pub struct PostDetailTemplate {
    pub post: Post,
    pub author: User,
}

#[derive(Template)]
#[template(path = "pages/post_form.html")]
pub struct PostFormTemplate {
    pub heading: String,
    pub action: String,
    pub submit_label: String,
    pub cancel_href: String,
    pub title: String,
    pub content: String,
    pub error: String,
}

impl PostFormTemplate {
    fn create(author: &User, input: &PostInput, error: String) -> Self {
        Self {
            heading: format!("Add post for {}", author.full_name()),
            action: format!("/users/{}/posts/new", author.id),
            submit_label: "Add".to_string(),
            cancel_href: format!("/users/{}", author.id),
            title: input.title.clone(),
            content: input.content.clone(),
            error,
        }
    }

    fn edit(id: i64, input: &PostInput, error: String) -> Self {
        Self {
            heading: "Edit post".to_string(),
            action: format!("/posts/{}/edit", id),
            submit_label: "Save".to_string(),
            cancel_href: format!("/posts/{}", id),
            title: input.title.clone(),
            content: input.content.clone(),
            error,
        }
    }
}

// --- Forms ---

#[derive(Debug, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl From<PostForm> for PostInput {
    fn from(form: PostForm) -> Self {
        PostInput {
            title: form.title,
            content: form.content,
        }
    }
}

// --- Router ---

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/users/{id}/posts/new",
            get(new_post_form).post(create_post),
        )
        .route("/posts/{id}", get(post_detail))
        .route("/posts/{id}/edit", get(edit_post_form).post(update_post))
        .route("/posts/{id}/delete", post(delete_post))
}

// --- Handlers ---

async fn new_post_form(
    State(state): State<AppState>,
    EntityId(user_id): EntityId,
) -> AppResult<Html<PostFormTemplate>> {
    let author = state.store.get_user(user_id)?;
    Ok(Html(PostFormTemplate::create(
        &author,
        &PostInput::default(),
        String::new(),
    )))
}

async fn create_post(
    State(state): State<AppState>,
    EntityId(user_id): EntityId,
    FormData(form): FormData<PostForm>,
) -> AppResult<Response> {
    let author = state.store.get_user(user_id)?;

    let input = PostInput::from(form);
    match state.store.create_post(user_id, input.clone()) {
        Ok(_) => Ok(found(&format!("/users/{}", user_id))),
        Err(StoreError::Validation(msg)) => Ok((
            StatusCode::BAD_REQUEST,
            Html(PostFormTemplate::create(&author, &input, msg)),
        )
            .into_response()),
        Err(e) => Err(e.into()),
    }
}

async fn post_detail(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> AppResult<Html<PostDetailTemplate>> {
    let post = state.store.get_post(id)?;
    let author = state.store.get_user(post.user_id)?;
    Ok(Html(PostDetailTemplate { post, author }))
}

async fn edit_post_form(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> AppResult<Html<PostFormTemplate>> {
    let post = state.store.get_post(id)?;
    let input = PostInput {
        title: post.title,
        content: post.content,
    };
    Ok(Html(PostFormTemplate::edit(id, &input, String::new())))
}

async fn update_post(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    FormData(form): FormData<PostForm>,
) -> AppResult<Response> {
    state.store.get_post(id)?;

    let input = PostInput::from(form);
    match state.store.update_post(id, input.clone()) {
        Ok(()) => Ok(found(&format!("/posts/{}", id))),
        Err(StoreError::Validation(msg)) => Ok((
            StatusCode::BAD_REQUEST,
            Html(PostFormTemplate::edit(id, &input, msg)),
        )
            .into_response()),
        Err(e) => Err(e.into()),
    }
}

async fn delete_post(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> AppResult<Response> {
    state.store.delete_post(id)?;
    Ok(found("/users"))
}
