// ==================== USERS & ASSIGNMENTS ====================
// Operações sobre usuários e suas tarefas (assignments embutidas no documento)

use std::sync::Arc;

use crate::{
    models::{Assignment, User, UserOverview},
    store::RecordStore,
    utils::AppError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddUserOutcome {
    Created,
    AlreadyExists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOutcome {
    Added,
    UnknownUser,
}

/// Result of listing a user's assignments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentListing {
    /// Explanatory message for a name that is not stored
    UnknownUser(String),
    /// Formatted lines sorted by due date, possibly empty
    Assignments(Vec<String>),
}

impl AssignmentListing {
    /// Lines as returned by the HTTP API; the not-found message becomes the
    /// only entry.
    pub fn into_lines(self) -> Vec<String> {
        match self {
            AssignmentListing::UnknownUser(message) => vec![message],
            AssignmentListing::Assignments(lines) => lines,
        }
    }
}

pub fn unknown_user_message(name: &str) -> String {
    format!("{} isn't in the database.", name)
}

/// Operation surface shared by the chat commands and the HTTP API.
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn RecordStore>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// All user names in storage order
    pub async fn list_user_names(&self) -> Result<Vec<String>, AppError> {
        let users = self.store.list_all().await?;
        Ok(users.into_iter().map(|u| u.name).collect())
    }

    pub async fn list_overview(&self) -> Result<Vec<UserOverview>, AppError> {
        let users = self.store.list_all().await?;
        Ok(users.iter().map(UserOverview::from).collect())
    }

    pub async fn add_user(&self, name: &str) -> Result<AddUserOutcome, AppError> {
        let name = validated_name(name)?;

        if self.store.insert_if_absent(User::new(name)).await? {
            log::info!("✅ User '{}' added", name);
            Ok(AddUserOutcome::Created)
        } else {
            log::info!("ℹ️  User '{}' already in database", name);
            Ok(AddUserOutcome::AlreadyExists)
        }
    }

    /// Removes the user and, with it, every assignment it owns. Returns the
    /// number of users deleted (0 or 1).
    pub async fn delete_user(&self, name: &str) -> Result<u64, AppError> {
        match self.store.remove_by_name(name.trim()).await? {
            Some(user) => {
                for assignment in &user.assignments {
                    log::info!(
                        "🗑️  Deleting assignment '{}' ({}) of '{}'",
                        assignment.name,
                        assignment.id.map(|id| id.to_hex()).unwrap_or_default(),
                        user.name
                    );
                }
                log::info!("✅ User '{}' deleted with {} assignment(s)", user.name, user.assignments.len());
                Ok(1)
            }
            None => {
                log::info!("ℹ️  {} is not in database", name);
                Ok(0)
            }
        }
    }

    /// Formatted assignments sorted by `due_date` as plain strings, so
    /// calendar order only holds when every date shares one format.
    pub async fn list_assignments(&self, name: &str) -> Result<AssignmentListing, AppError> {
        let name = name.trim();
        let user = match self.store.find_by_name(name).await? {
            Some(user) => user,
            None => {
                let message = unknown_user_message(name);
                log::info!("ℹ️  {}", message);
                return Ok(AssignmentListing::UnknownUser(message));
            }
        };

        let mut assignments = user.assignments;
        if assignments.is_empty() {
            log::debug!("No assignments for {}", name);
        }
        assignments.sort_by(|a, b| a.due_date.cmp(&b.due_date));

        Ok(AssignmentListing::Assignments(
            assignments.iter().map(Assignment::describe).collect(),
        ))
    }

    pub async fn add_assignment(
        &self,
        name: &str,
        assignment_name: &str,
        due_date: Option<&str>,
    ) -> Result<AssignmentOutcome, AppError> {
        let name = name.trim();
        if assignment_name.trim().is_empty() {
            return Err(AppError::InvalidRequest("assignment name must not be empty".to_string()));
        }

        let assignment = Assignment::new(assignment_name, due_date);
        let label = assignment.describe();

        if self.store.push_assignment(name, assignment).await? {
            log::info!("✅ {} (user '{}')", label, name);
            Ok(AssignmentOutcome::Added)
        } else {
            log::info!("ℹ️  User '{}' doesn't exist, assignment not added", name);
            Ok(AssignmentOutcome::UnknownUser)
        }
    }

    pub async fn user_exists(&self, name: &str) -> Result<bool, AppError> {
        let found = self.store.find_by_name(name.trim()).await?.is_some();
        if !found {
            log::debug!("Couldn't find user named {}", name);
        }
        Ok(found)
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.store.ping().await
    }
}

fn validated_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidRequest("user name must not be empty".to_string()));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use async_trait::async_trait;

    fn repository() -> UserRepository {
        UserRepository::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_add_user_then_listed_once() {
        let repo = repository();
        assert_eq!(repo.add_user("alice").await.unwrap(), AddUserOutcome::Created);

        let names = repo.list_user_names().await.unwrap();
        assert_eq!(names.iter().filter(|n| *n == "alice").count(), 1);
        assert!(repo.user_exists("alice").await.unwrap());
    }

    #[tokio::test]
    async fn test_add_existing_user_is_idempotent() {
        let repo = repository();
        repo.add_user("alice").await.unwrap();
        repo.add_assignment("alice", "Essay 1", Some("2024-01-01")).await.unwrap();
        let before = repo.list_overview().await.unwrap();

        assert_eq!(repo.add_user("alice").await.unwrap(), AddUserOutcome::AlreadyExists);
        assert_eq!(repo.list_overview().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_add_user_rejects_blank_name() {
        let repo = repository();
        let err = repo.add_user("   ").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
        assert!(repo.list_user_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_user_cascades_assignments() {
        let repo = repository();
        repo.add_user("alice").await.unwrap();
        for i in 0..3 {
            repo.add_assignment("alice", &format!("Essay {}", i), None).await.unwrap();
        }

        assert_eq!(repo.delete_user("alice").await.unwrap(), 1);
        assert!(!repo.user_exists("alice").await.unwrap());
        assert_eq!(
            repo.list_assignments("alice").await.unwrap(),
            AssignmentListing::UnknownUser("alice isn't in the database.".to_string())
        );

        // re-creating the name starts from an empty assignment list
        repo.add_user("alice").await.unwrap();
        assert_eq!(
            repo.list_assignments("alice").await.unwrap(),
            AssignmentListing::Assignments(vec![])
        );
    }

    #[tokio::test]
    async fn test_delete_missing_user_returns_zero() {
        let repo = repository();
        repo.add_user("bob").await.unwrap();

        assert_eq!(repo.delete_user("alice").await.unwrap(), 0);
        assert_eq!(repo.list_user_names().await.unwrap(), vec!["bob"]);
    }

    #[tokio::test]
    async fn test_add_assignment_example_scenario() {
        let repo = repository();
        repo.add_user("alice").await.unwrap();
        let outcome = repo.add_assignment("alice", "Essay 1", Some("2024-01-01")).await.unwrap();
        assert_eq!(outcome, AssignmentOutcome::Added);

        let lines = repo.list_assignments("alice").await.unwrap().into_lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Essay 1"));
        assert!(lines[0].contains("2024-01-01"));
    }

    #[tokio::test]
    async fn test_add_assignment_to_missing_user_is_noop() {
        let repo = repository();
        repo.add_user("bob").await.unwrap();

        let outcome = repo.add_assignment("alice", "Essay 1", Some("2024-01-01")).await.unwrap();
        assert_eq!(outcome, AssignmentOutcome::UnknownUser);
        assert!(!repo.user_exists("alice").await.unwrap());
        assert_eq!(
            repo.list_overview().await.unwrap(),
            vec![UserOverview { name: "bob".to_string(), assignment_count: 0 }]
        );
    }

    #[tokio::test]
    async fn test_assignments_sorted_by_due_date_string() {
        let repo = repository();
        repo.add_user("alice").await.unwrap();
        repo.add_assignment("alice", "Final", Some("2024-05-01")).await.unwrap();
        repo.add_assignment("alice", "Quiz", Some("2024-01-15")).await.unwrap();
        repo.add_assignment("alice", "Lab", Some("2024-03-02")).await.unwrap();

        let lines = repo.list_assignments("alice").await.unwrap().into_lines();
        assert_eq!(
            lines,
            vec![
                "Assignment: Quiz is due by 2024-01-15",
                "Assignment: Lab is due by 2024-03-02",
                "Assignment: Final is due by 2024-05-01",
            ]
        );
    }

    #[tokio::test]
    async fn test_mixed_date_formats_sort_lexicographically() {
        let repo = repository();
        repo.add_user("alice").await.unwrap();
        repo.add_assignment("alice", "A", Some("9/1/2024")).await.unwrap();
        repo.add_assignment("alice", "B", Some("10/1/2024")).await.unwrap();

        let lines = repo.list_assignments("alice").await.unwrap().into_lines();
        assert!(lines[0].contains("10/1/2024"));
        assert!(lines[1].contains("9/1/2024"));
    }

    #[tokio::test]
    async fn test_overview_in_storage_order() {
        let repo = repository();
        repo.add_user("a").await.unwrap();
        repo.add_user("b").await.unwrap();
        repo.add_assignment("a", "Essay 1", None).await.unwrap();
        repo.add_assignment("a", "Essay 2", None).await.unwrap();

        assert_eq!(
            repo.list_overview().await.unwrap(),
            vec![
                UserOverview { name: "a".to_string(), assignment_count: 2 },
                UserOverview { name: "b".to_string(), assignment_count: 0 },
            ]
        );
    }

    struct FailingStore;

    #[async_trait]
    impl RecordStore for FailingStore {
        async fn find_by_name(&self, _name: &str) -> Result<Option<User>, AppError> {
            Err(AppError::DatabaseError("offline".to_string()))
        }
        async fn insert_if_absent(&self, _user: User) -> Result<bool, AppError> {
            Err(AppError::DatabaseError("offline".to_string()))
        }
        async fn push_assignment(&self, _name: &str, _assignment: Assignment) -> Result<bool, AppError> {
            Err(AppError::DatabaseError("offline".to_string()))
        }
        async fn remove_by_name(&self, _name: &str) -> Result<Option<User>, AppError> {
            Err(AppError::DatabaseError("offline".to_string()))
        }
        async fn list_all(&self) -> Result<Vec<User>, AppError> {
            Err(AppError::DatabaseError("offline".to_string()))
        }
        async fn ping(&self) -> Result<(), AppError> {
            Err(AppError::DatabaseError("offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_persistence_failure_is_propagated() {
        let repo = UserRepository::new(Arc::new(FailingStore));

        assert!(matches!(repo.add_user("alice").await, Err(AppError::DatabaseError(_))));
        assert!(matches!(repo.delete_user("alice").await, Err(AppError::DatabaseError(_))));
        assert!(matches!(
            repo.add_assignment("alice", "Essay", None).await,
            Err(AppError::DatabaseError(_))
        ));
    }
}
