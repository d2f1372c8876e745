use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Placeholder stored when an assignment is created without a due date.
pub const UNSPECIFIED_DUE_DATE: &str = "unspecified";

fn default_due_date() -> String {
    UNSPECIFIED_DUE_DATE.to_string()
}

/// Assignment embedded in its owning user's document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub name: String,

    /// Free-form text, compared as a plain string when sorting
    #[serde(default = "default_due_date")]
    pub due_date: String,
}

impl Assignment {
    pub fn new(name: &str, due_date: Option<&str>) -> Self {
        let due_date = due_date
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .unwrap_or_else(default_due_date);

        Self {
            id: Some(ObjectId::new()),
            name: name.trim().to_string(),
            due_date,
        }
    }

    /// Line shown to chat and HTTP clients
    pub fn describe(&self) -> String {
        format!("Assignment: {} is due by {}", self.name, self.due_date)
    }
}

/// Body of POST /v1/users/{name}
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AddAssignmentRequest {
    pub name: String,
    pub due_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_due_date_defaults_to_unspecified() {
        assert_eq!(Assignment::new("Essay 1", None).due_date, "unspecified");
        assert_eq!(Assignment::new("Essay 1", Some("  ")).due_date, "unspecified");
    }

    #[test]
    fn test_describe() {
        let a = Assignment::new(" Essay 1 ", Some("2024-01-01"));
        assert_eq!(a.describe(), "Assignment: Essay 1 is due by 2024-01-01");
    }

    #[test]
    fn test_stored_document_without_due_date() {
        let doc = mongodb::bson::doc! { "name": "Lab" };
        let a: Assignment = mongodb::bson::from_document(doc).unwrap();
        assert_eq!(a.due_date, UNSPECIFIED_DUE_DATE);
        assert!(a.id.is_none());
    }
}
