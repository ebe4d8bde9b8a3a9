use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    error::{ApiError, MessageResponse},
    extractors::{JsonBody, LenientQuery, OptionalJsonBody, UserId},
    state::AppState,
    users::{
        dto::{CreateUserRequest, FilterQuery, NameQuery, UpdateUserRequest, UserResponse},
        repo_types::User,
        services,
    },
};

// Literal paths are registered ahead of `/user/:id` so they are never read as an id.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user/getByName", get(get_by_name).fallback(not_found))
        .route("/user/filter", get(filter_by_age).fallback(not_found))
        .route(
            "/user",
            get(list_users).post(create_user).fallback(not_found),
        )
        .route(
            "/user/:id",
            get(get_user)
                .patch(update_user)
                .delete(delete_user)
                .fallback(not_found),
        )
}

pub async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = services::create_user(&state, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            message: "User added successfully".into(),
            user,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    UserId(id): UserId,
    OptionalJsonBody(payload): OptionalJsonBody<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let patch = match payload {
        Ok(patch) => patch,
        Err(body_error) => {
            // An unknown id is reported ahead of a bad body.
            services::find_by_id(&state, id).await?;
            return Err(body_error);
        }
    };
    let user = services::update_user(&state, id, patch).await?;
    Ok(Json(UserResponse {
        message: "User updated".into(),
        user,
    }))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> Result<Json<MessageResponse>, ApiError> {
    services::delete_user(&state, id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

#[instrument(skip(state))]
pub async fn get_by_name(
    State(state): State<AppState>,
    LenientQuery(q): LenientQuery<NameQuery>,
) -> Result<Json<User>, ApiError> {
    let user = services::find_by_name(&state, q.name.as_deref()).await?;
    Ok(Json(user))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(services::list_users(&state).await?))
}

#[instrument(skip(state))]
pub async fn filter_by_age(
    State(state): State<AppState>,
    LenientQuery(q): LenientQuery<FilterQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = services::filter_by_min_age(&state, q.min_age.as_deref()).await?;
    Ok(Json(users))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> Result<Json<User>, ApiError> {
    Ok(Json(services::find_by_id(&state, id).await?))
}
