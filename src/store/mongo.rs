use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::Collection;

use super::RecordStore;
use crate::database::{MongoDB, USERS_COLLECTION};
use crate::models::{Assignment, User};
use crate::utils::AppError;

/// `RecordStore` backed by the `users` collection. Storage order is
/// ascending `_id`, i.e. creation order.
#[derive(Clone)]
pub struct MongoStore {
    db: MongoDB,
}

impl MongoStore {
    pub fn new(db: MongoDB) -> Self {
        Self { db }
    }

    fn users(&self) -> Collection<User> {
        self.db.collection::<User>(USERS_COLLECTION)
    }

    fn storage_order() -> Document {
        doc! { "_id": 1 }
    }
}

#[async_trait]
impl RecordStore for MongoStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<User>, AppError> {
        let user = self
            .users()
            .find_one(doc! { "name": name })
            .sort(Self::storage_order())
            .await?;
        Ok(user)
    }

    async fn insert_if_absent(&self, user: User) -> Result<bool, AppError> {
        let assignments = mongodb::bson::to_bson(&user.assignments)?;

        // Upsert: o filtro por nome vira o documento inserido
        let result = self
            .users()
            .update_one(
                doc! { "name": &user.name },
                doc! { "$setOnInsert": { "assignments": assignments } },
            )
            .upsert(true)
            .await?;

        Ok(result.upserted_id.is_some())
    }

    async fn push_assignment(&self, name: &str, assignment: Assignment) -> Result<bool, AppError> {
        let assignment = mongodb::bson::to_bson(&assignment)?;

        let updated = self
            .users()
            .find_one_and_update(
                doc! { "name": name },
                doc! { "$push": { "assignments": assignment } },
            )
            .sort(Self::storage_order())
            .await?;

        Ok(updated.is_some())
    }

    async fn remove_by_name(&self, name: &str) -> Result<Option<User>, AppError> {
        let removed = self
            .users()
            .find_one_and_delete(doc! { "name": name })
            .sort(Self::storage_order())
            .await?;
        Ok(removed)
    }

    async fn list_all(&self) -> Result<Vec<User>, AppError> {
        let cursor = self
            .users()
            .find(doc! {})
            .sort(Self::storage_order())
            .await?;
        let users: Vec<User> = cursor.try_collect().await?;
        Ok(users)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.db.database().run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}
