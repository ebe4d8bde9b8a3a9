use serde::{Deserialize, Serialize};

use super::repo_types::User;

/// Request body for `POST /user`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub age: u32,
    pub email: String,
}

/// Request body for `PATCH /user/:id`. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub message: String,
    pub user: User,
}

#[derive(Debug, Default, Deserialize)]
pub struct NameQuery {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    #[serde(rename = "minAge")]
    pub min_age: Option<String>,
}
