/// Owner-scoped resource operations
///
/// Every operation takes the acting user's id and only ever sees that user's
/// resources. A key that exists but belongs to someone else is
/// indistinguishable from one that does not exist.

use std::sync::Arc;

use tracing::info;

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::models::{Resource, UserId};
use crate::quota::ResourceCreator;
use crate::store::{ResourceStore, UserStore};

#[derive(Clone)]
pub struct ResourceService {
    resources: Arc<dyn ResourceStore>,
    creator: ResourceCreator,
}

impl ResourceService {
    pub fn new<S>(store: Arc<S>, clock: Arc<dyn Clock>) -> Self
    where
        S: UserStore + ResourceStore + 'static,
    {
        let creator = ResourceCreator::new(store.clone(), clock);
        Self {
            resources: store,
            creator,
        }
    }

    /// Creates a resource, subject to the owner's quota
    pub async fn create(&self, user_id: UserId) -> Result<Resource> {
        self.creator.create_resource(user_id).await
    }

    pub async fn list(&self, user_id: UserId) -> Result<Vec<Resource>> {
        self.resources.list_resources(user_id).await
    }

    pub async fn get(&self, user_id: UserId, key: &str) -> Result<Resource> {
        self.resources
            .find_resource(user_id, key)
            .await?
            .ok_or(Error::NotFound("resource"))
    }

    pub async fn delete(&self, user_id: UserId, key: &str) -> Result<()> {
        if !self.resources.delete_resource(user_id, key).await? {
            return Err(Error::NotFound("resource"));
        }
        info!(user_id, key, "Resource deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::CreateUser;
    use crate::quota::Quota;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone, Utc};

    async fn setup() -> (Arc<ManualClock>, ResourceService, UserId, UserId) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ));
        let mut ids = Vec::new();
        for email in ["a@test.com", "b@test.com"] {
            let user = store
                .insert_user(CreateUser {
                    email: email.to_string(),
                    password_hash: "hash".to_string(),
                    is_admin: false,
                    quota: Quota::Unlimited,
                })
                .await
                .unwrap();
            ids.push(user.id);
        }
        let service = ResourceService::new(store, clock.clone());
        (clock, service, ids[0], ids[1])
    }

    #[tokio::test]
    async fn test_list_is_owner_scoped_and_ordered() {
        let (clock, service, alice, bob) = setup().await;

        let first = service.create(alice).await.unwrap();
        clock.advance(Duration::seconds(1));
        let second = service.create(alice).await.unwrap();
        service.create(bob).await.unwrap();

        let listed = service.list(alice).await.unwrap();
        assert_eq!(listed, vec![first, second]);
    }

    #[tokio::test]
    async fn test_foreign_key_looks_absent() {
        let (_clock, service, alice, bob) = setup().await;
        let resource = service.create(alice).await.unwrap();

        assert_eq!(service.get(alice, &resource.key).await.unwrap(), resource);
        assert!(matches!(
            service.get(bob, &resource.key).await.unwrap_err(),
            Error::NotFound("resource")
        ));
        assert!(matches!(
            service.delete(bob, &resource.key).await.unwrap_err(),
            Error::NotFound("resource")
        ));
        assert!(matches!(
            service.get(alice, "missing").await.unwrap_err(),
            Error::NotFound("resource")
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let (_clock, service, alice, _bob) = setup().await;
        let resource = service.create(alice).await.unwrap();

        service.delete(alice, &resource.key).await.unwrap();
        assert!(service.list(alice).await.unwrap().is_empty());
        assert!(service.delete(alice, &resource.key).await.is_err());
    }
}
