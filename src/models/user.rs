use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::Assignment;

/// User document (collection `users`), owns its assignments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub name: String,

    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

impl User {
    pub fn new(name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            assignments: Vec::new(),
        }
    }
}

/// Name plus assignment count, computed at read time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserOverview {
    pub name: String,
    pub assignment_count: usize,
}

impl From<&User> for UserOverview {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            assignment_count: user.assignments.len(),
        }
    }
}

/// Body of POST /v1/users
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateUserRequest {
    pub name: String,
}

/// Generic result body for write endpoints
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_without_assignments_field() {
        let doc = mongodb::bson::doc! { "name": "alice" };
        let user: User = mongodb::bson::from_document(doc).unwrap();
        assert!(user.assignments.is_empty());
    }

    #[test]
    fn test_overview_counts_assignments() {
        let mut user = User::new("alice");
        user.assignments.push(Assignment::new("Essay 1", None));
        user.assignments.push(Assignment::new("Essay 2", None));

        let overview = UserOverview::from(&user);
        assert_eq!(overview.name, "alice");
        assert_eq!(overview.assignment_count, 2);
    }
}
