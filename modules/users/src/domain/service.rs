use std::sync::Arc;

use crate::contract::model::{NewUser, User, UserPatch};
use crate::domain::error::DomainError;
use crate::domain::ports::{Clock, SystemClock};
use crate::domain::repo::UsersRepository;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Domain service with the CRUD rules for users.
/// Depends only on the repository and clock ports, not on infra types.
///
/// Inputs are expected to be validated already (see `domain::schemas`);
/// the only failure the service produces itself is `UserNotFound`.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn UsersRepository>,
    clock: Arc<dyn Clock>,
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(repo: Arc<dyn UsersRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    pub fn with_system_clock(repo: Arc<dyn UsersRepository>) -> Self {
        Self::new(repo, Arc::new(SystemClock))
    }

    #[instrument(name = "users.service.get_user", skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: &str) -> Result<User, DomainError> {
        debug!("Getting user by id");

        let user = self
            .repo
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::internal(e.to_string()))?
            .ok_or_else(|| DomainError::user_not_found(id))?;
        debug!("Successfully retrieved user");
        Ok(user)
    }

    #[instrument(name = "users.service.list_users", skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        let users = self
            .repo
            .list()
            .await
            .map_err(|e| DomainError::internal(e.to_string()))?;
        debug!("Listed {} users", users.len());
        Ok(users)
    }

    #[instrument(name = "users.service.create_user", skip(self, new_user))]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        info!("Creating new user");

        let now = self.clock.now();
        let mut user = User {
            id: Uuid::new_v4().to_string(),
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            email: new_user.email,
            phone: new_user.phone,
            created_at: now,
            updated_at: now,
        };

        // insert() refuses a taken id; draw a new one until it sticks.
        while !self
            .repo
            .insert(user.clone())
            .await
            .map_err(|e| DomainError::internal(e.to_string()))?
        {
            warn!(user_id = %user.id, "Generated id already taken, retrying");
            user.id = Uuid::new_v4().to_string();
        }

        info!("Successfully created user with id={}", user.id);
        Ok(user)
    }

    #[instrument(name = "users.service.update_user", skip(self, patch), fields(user_id = %id))]
    pub async fn update_user(&self, id: &str, patch: UserPatch) -> Result<User, DomainError> {
        info!("Updating user");
        if patch.is_empty() {
            debug!("Empty patch, only updated_at changes");
        }

        let now = self.clock.now();
        let apply = move |current: &mut User| {
            if let Some(first_name) = &patch.first_name {
                current.first_name = first_name.clone();
            }
            if let Some(last_name) = &patch.last_name {
                current.last_name = last_name.clone();
            }
            if let Some(email) = &patch.email {
                current.email = Some(email.clone());
            }
            if let Some(phone) = &patch.phone {
                current.phone = Some(phone.clone());
            }
            // Refreshed even when the patch is empty; never before creation.
            current.updated_at = now.max(current.created_at);
        };

        let updated = self
            .repo
            .modify(id, &apply)
            .await
            .map_err(|e| DomainError::internal(e.to_string()))?
            .ok_or_else(|| DomainError::user_not_found(id))?;

        info!("Successfully updated user");
        Ok(updated)
    }

    #[instrument(name = "users.service.delete_user", skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: &str) -> Result<User, DomainError> {
        info!("Deleting user");

        let removed = self
            .repo
            .delete(id)
            .await
            .map_err(|e| DomainError::internal(e.to_string()))?
            .ok_or_else(|| DomainError::user_not_found(id))?;

        info!("Successfully deleted user");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::storage::InMemoryUsersRepository;
    use chrono::{DateTime, TimeZone, Utc};
    use tracing_test::traced_test;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    struct BrokenRepo;

    #[async_trait::async_trait]
    impl UsersRepository for BrokenRepo {
        async fn find_by_id(&self, _id: &str) -> anyhow::Result<Option<User>> {
            anyhow::bail!("store offline")
        }
        async fn list(&self) -> anyhow::Result<Vec<User>> {
            anyhow::bail!("store offline")
        }
        async fn insert(&self, _u: User) -> anyhow::Result<bool> {
            anyhow::bail!("store offline")
        }
        async fn modify(
            &self,
            _id: &str,
            _f: &(dyn for<'a> Fn(&'a mut User) + Send + Sync),
        ) -> anyhow::Result<Option<User>> {
            anyhow::bail!("store offline")
        }
        async fn delete(&self, _id: &str) -> anyhow::Result<Option<User>> {
            anyhow::bail!("store offline")
        }
    }

    /// Refuses the first insert as if its id were taken, then delegates.
    struct CollidingRepo {
        inner: InMemoryUsersRepository,
        refused: parking_lot::Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl UsersRepository for CollidingRepo {
        async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<User>> {
            self.inner.find_by_id(id).await
        }
        async fn list(&self) -> anyhow::Result<Vec<User>> {
            self.inner.list().await
        }
        async fn insert(&self, u: User) -> anyhow::Result<bool> {
            {
                let mut refused = self.refused.lock();
                if refused.is_empty() {
                    refused.push(u.id);
                    return Ok(false);
                }
            }
            self.inner.insert(u).await
        }
        async fn modify(
            &self,
            id: &str,
            f: &(dyn for<'a> Fn(&'a mut User) + Send + Sync),
        ) -> anyhow::Result<Option<User>> {
            self.inner.modify(id, f).await
        }
        async fn delete(&self, id: &str) -> anyhow::Result<Option<User>> {
            self.inner.delete(id).await
        }
    }

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn john() -> User {
        User {
            id: "1".into(),
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: Some("john@example.com".into()),
            phone: None,
            created_at: at(2024, 1, 1, 0, 0),
            updated_at: at(2024, 1, 1, 0, 0),
        }
    }

    fn service_with(users: Vec<User>, now: DateTime<Utc>) -> Service {
        Service::new(
            Arc::new(InMemoryUsersRepository::with_users(users)),
            Arc::new(FixedClock(now)),
        )
    }

    #[tokio::test]
    async fn update_at_pinned_time() {
        let svc = service_with(vec![john()], at(2024, 2, 15, 12, 30));
        let patch = UserPatch {
            last_name: Some("X".into()),
            ..Default::default()
        };

        let updated = svc.update_user("1", patch).await.unwrap();
        assert_eq!(
            updated,
            User {
                last_name: "X".into(),
                updated_at: at(2024, 2, 15, 12, 30),
                ..john()
            }
        );
        assert_eq!(svc.get_user("1").await.unwrap(), updated);
    }

    #[tokio::test]
    async fn empty_patch_only_touches_updated_at() {
        let svc = service_with(vec![john()], at(2024, 3, 1, 9, 0));
        let updated = svc.update_user("1", UserPatch::default()).await.unwrap();
        assert_eq!(
            updated,
            User {
                updated_at: at(2024, 3, 1, 9, 0),
                ..john()
            }
        );
    }

    #[tokio::test]
    async fn create_stamps_both_timestamps() {
        let now = at(2024, 5, 5, 5, 5);
        let svc = service_with(vec![], now);
        let created = svc
            .create_user(NewUser {
                first_name: "Ann".into(),
                last_name: "Lee".into(),
                email: None,
                phone: None,
            })
            .await
            .unwrap();
        assert!(!created.id.is_empty());
        assert_eq!(created.created_at, now);
        assert_eq!(created.updated_at, now);
        assert_eq!(svc.list_users().await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn create_retries_when_id_is_taken() {
        let repo = Arc::new(CollidingRepo {
            inner: InMemoryUsersRepository::new(),
            refused: parking_lot::Mutex::new(Vec::new()),
        });
        let svc = Service::new(repo.clone(), Arc::new(FixedClock(at(2024, 5, 5, 5, 5))));

        let created = svc
            .create_user(NewUser {
                first_name: "Ann".into(),
                last_name: "Lee".into(),
                email: None,
                phone: None,
            })
            .await
            .unwrap();

        let refused = repo.refused.lock().clone();
        assert_eq!(refused.len(), 1);
        assert_ne!(created.id, refused[0]);
        assert_eq!(svc.list_users().await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn updated_at_never_precedes_created_at() {
        let svc = service_with(vec![john()], at(2023, 12, 31, 23, 0));
        let updated = svc
            .update_user(
                "1",
                UserPatch {
                    first_name: Some("Jack".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.first_name, "Jack");
        assert_eq!(updated.updated_at, john().created_at);
        assert!(updated.created_at <= updated.updated_at);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let empty = service_with(vec![], at(2024, 1, 2, 0, 0));
        let seeded = service_with(vec![john()], at(2024, 1, 2, 0, 0));

        for svc in [&empty, &seeded] {
            for id in ["", "ABC", "2"] {
                assert!(matches!(
                    svc.get_user(id).await,
                    Err(DomainError::UserNotFound { .. })
                ));
                assert!(matches!(
                    svc.update_user(id, UserPatch::default()).await,
                    Err(DomainError::UserNotFound { .. })
                ));
                assert!(matches!(
                    svc.delete_user(id).await,
                    Err(DomainError::UserNotFound { .. })
                ));
            }
        }
        assert_eq!(seeded.list_users().await.unwrap(), vec![john()]);
    }

    #[tokio::test]
    async fn delete_returns_removed_record() {
        let svc = service_with(vec![john()], at(2024, 1, 2, 0, 0));
        assert_eq!(svc.delete_user("1").await.unwrap(), john());
        assert!(svc.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn storage_failures_become_internal() {
        let svc = Service::with_system_clock(Arc::new(BrokenRepo));
        assert!(matches!(
            svc.list_users().await,
            Err(DomainError::Internal { .. })
        ));
        assert!(matches!(
            svc.get_user("1").await,
            Err(DomainError::Internal { .. })
        ));
    }

    #[tokio::test]
    #[traced_test]
    async fn operations_run_in_named_spans() {
        let svc = service_with(vec![john()], at(2024, 2, 15, 12, 30));
        svc.update_user("1", UserPatch::default()).await.unwrap();
        assert!(logs_contain("users.service.update_user"));
        assert!(logs_contain("Successfully updated user"));
    }
}
