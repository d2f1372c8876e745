use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use super::RecordStore;
use crate::models::{Assignment, User};
use crate::utils::AppError;

/// In-process `RecordStore`; storage order is insertion order.
///
/// Used by tests and by `STORE_BACKEND=memory` for running without a
/// database. The write lock makes every conditional write atomic.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.name == name).cloned())
    }

    async fn insert_if_absent(&self, mut user: User) -> Result<bool, AppError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.name == user.name) {
            return Ok(false);
        }
        user.id.get_or_insert_with(ObjectId::new);
        users.push(user);
        Ok(true)
    }

    async fn push_assignment(&self, name: &str, assignment: Assignment) -> Result<bool, AppError> {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.name == name) {
            Some(user) => {
                user.assignments.push(assignment);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove_by_name(&self, name: &str) -> Result<Option<User>, AppError> {
        let mut users = self.users.write().await;
        let position = users.iter().position(|u| u.name == name);
        Ok(position.map(|pos| users.remove(pos)))
    }

    async fn list_all(&self) -> Result<Vec<User>, AppError> {
        Ok(self.users.read().await.clone())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insertion_order_is_storage_order() {
        let store = MemoryStore::new();
        for name in ["carol", "alice", "bob"] {
            assert!(store.insert_if_absent(User::new(name)).await.unwrap());
        }

        let names: Vec<String> = store.list_all().await.unwrap().into_iter().map(|u| u.name).collect();
        assert_eq!(names, vec!["carol", "alice", "bob"]);
    }

    #[tokio::test]
    async fn test_conditional_writes() {
        let store = MemoryStore::new();
        assert!(store.insert_if_absent(User::new("alice")).await.unwrap());
        assert!(!store.insert_if_absent(User::new("alice")).await.unwrap());

        assert!(store.push_assignment("alice", Assignment::new("Lab", None)).await.unwrap());
        assert!(!store.push_assignment("bob", Assignment::new("Lab", None)).await.unwrap());

        let removed = store.remove_by_name("alice").await.unwrap().unwrap();
        assert_eq!(removed.assignments.len(), 1);
        assert!(store.remove_by_name("alice").await.unwrap().is_none());
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_names_resolve_to_first_in_storage_order() {
        let store = MemoryStore::new();
        let first = User { id: Some(ObjectId::new()), ..User::new("alice") };
        let mut second = User { id: Some(ObjectId::new()), ..User::new("alice") };
        second.assignments.push(Assignment::new("Old", Some("2023-01-01")));
        store.users.write().await.extend([first.clone(), second.clone()]);

        assert_eq!(store.find_by_name("alice").await.unwrap(), Some(first.clone()));

        assert!(store.push_assignment("alice", Assignment::new("Lab", None)).await.unwrap());
        let users = store.list_all().await.unwrap();
        assert_eq!(users[0].assignments.len(), 1);
        assert_eq!(users[0].assignments[0].name, "Lab");
        assert_eq!(users[1], second);

        let removed = store.remove_by_name("alice").await.unwrap().unwrap();
        assert_eq!(removed.id, first.id);
        assert_eq!(store.list_all().await.unwrap(), vec![second.clone()]);
        assert_eq!(store.find_by_name("alice").await.unwrap(), Some(second));
    }
}
