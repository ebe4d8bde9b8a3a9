use tracing::{info, warn};

use crate::error::ApiError;
use crate::state::AppState;
use crate::users::dto::{CreateUserRequest, UpdateUserRequest};
use crate::users::repo_types::User;

/// Next id after the highest one in use, so ids freed by deletions are not handed out again
/// while a higher id still exists.
pub(crate) fn next_id(users: &[User]) -> Result<u64, ApiError> {
    users
        .iter()
        .map(|u| u.id)
        .max()
        .unwrap_or(0)
        .checked_add(1)
        .ok_or(ApiError::IdsExhausted)
}

pub(crate) fn parse_min_age(raw: Option<&str>) -> Result<i64, ApiError> {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .ok_or_else(|| ApiError::BadRequest("minAge is required".into()))
}

pub async fn create_user(state: &AppState, input: CreateUserRequest) -> Result<User, ApiError> {
    let _guard = state.write_lock.lock().await;
    let mut users = state.store.read_all().await?;

    if users.iter().any(|u| u.email == input.email) {
        warn!(email = %input.email, "email already exists");
        return Err(ApiError::Conflict);
    }

    let user = User {
        id: next_id(&users)?,
        name: input.name,
        age: input.age,
        email: input.email,
    };
    users.push(user.clone());
    state.store.write_all(&users).await?;

    info!(user_id = user.id, email = %user.email, "user created");
    Ok(user)
}

pub async fn update_user(
    state: &AppState,
    id: u64,
    patch: UpdateUserRequest,
) -> Result<User, ApiError> {
    let _guard = state.write_lock.lock().await;
    let mut users = state.store.read_all().await?;

    let Some(index) = users.iter().position(|u| u.id == id) else {
        warn!(user_id = id, "update of unknown user");
        return Err(ApiError::NotFound);
    };

    if let Some(email) = &patch.email {
        if users.iter().any(|u| u.id != id && &u.email == email) {
            warn!(user_id = id, email = %email, "email already exists");
            return Err(ApiError::Conflict);
        }
    }

    let user = &mut users[index];
    if let Some(name) = patch.name {
        user.name = name;
    }
    if let Some(age) = patch.age {
        user.age = age;
    }
    if let Some(email) = patch.email {
        user.email = email;
    }
    let updated = user.clone();

    state.store.write_all(&users).await?;
    info!(user_id = id, "user updated");
    Ok(updated)
}

pub async fn delete_user(state: &AppState, id: u64) -> Result<(), ApiError> {
    let _guard = state.write_lock.lock().await;
    let mut users = state.store.read_all().await?;

    let Some(index) = users.iter().position(|u| u.id == id) else {
        warn!(user_id = id, "delete of unknown user");
        return Err(ApiError::NotFound);
    };
    users.remove(index);

    state.store.write_all(&users).await?;
    info!(user_id = id, "user deleted");
    Ok(())
}

pub async fn find_by_id(state: &AppState, id: u64) -> Result<User, ApiError> {
    state
        .store
        .read_all()
        .await?
        .into_iter()
        .find(|u| u.id == id)
        .ok_or(ApiError::NotFound)
}

/// First match in insertion order.
pub async fn find_by_name(state: &AppState, name: Option<&str>) -> Result<User, ApiError> {
    let Some(name) = name else {
        return Err(ApiError::NotFound);
    };
    state
        .store
        .read_all()
        .await?
        .into_iter()
        .find(|u| u.name == name)
        .ok_or(ApiError::NotFound)
}

pub async fn list_users(state: &AppState) -> Result<Vec<User>, ApiError> {
    Ok(state.store.read_all().await?)
}

pub async fn filter_by_min_age(
    state: &AppState,
    min_age: Option<&str>,
) -> Result<Vec<User>, ApiError> {
    let min_age = parse_min_age(min_age)?;
    let users = state.store.read_all().await?;
    Ok(users
        .into_iter()
        .filter(|u| i64::from(u.age) >= min_age)
        .collect())
}
