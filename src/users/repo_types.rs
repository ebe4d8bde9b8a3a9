use serde::{Deserialize, Serialize};

/// User record as persisted in the users file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub age: u32,
    pub email: String, // unique across the collection
}
