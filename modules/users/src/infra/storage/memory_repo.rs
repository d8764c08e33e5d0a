//! In-memory repository implementation for the domain port.
//!
//! The whole collection sits behind one `RwLock`: readers clone under the
//! read lock, every mutation runs start to finish under the write lock, so
//! no caller can observe a half-merged record. The lock is never held across
//! an `.await`.

use parking_lot::RwLock;

use crate::contract::model::User;
use crate::domain::repo::UsersRepository;

/// Ordered, process-local user store. Insertion order is list order.
#[derive(Default)]
pub struct InMemoryUsersRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUsersRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a pre-populated collection (fixtures, tests).
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: RwLock::new(users),
        }
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }

    fn position(users: &[User], id: &str) -> Option<usize> {
        users.iter().position(|u| u.id == id)
    }
}

#[async_trait::async_trait]
impl UsersRepository for InMemoryUsersRepository {
    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<User>> {
        Ok(self.users.read().iter().find(|u| u.id == id).cloned())
    }

    async fn list(&self) -> anyhow::Result<Vec<User>> {
        Ok(self.users.read().clone())
    }

    async fn insert(&self, u: User) -> anyhow::Result<bool> {
        let mut users = self.users.write();
        if Self::position(&users, &u.id).is_some() {
            return Ok(false);
        }
        users.push(u);
        Ok(true)
    }

    async fn modify(
        &self,
        id: &str,
        f: &(dyn for<'a> Fn(&'a mut User) + Send + Sync),
    ) -> anyhow::Result<Option<User>> {
        let mut users = self.users.write();
        let Some(idx) = Self::position(&users, id) else {
            return Ok(None);
        };
        let mut next = users[idx].clone();
        f(&mut next);
        users[idx] = next.clone();
        Ok(Some(next))
    }

    async fn delete(&self, id: &str) -> anyhow::Result<Option<User>> {
        let mut users = self.users.write();
        Ok(Self::position(&users, id).map(|idx| users.remove(idx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn user(id: &str) -> User {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        User {
            id: id.to_string(),
            first_name: format!("First {id}"),
            last_name: format!("Last {id}"),
            email: None,
            phone: None,
            created_at: at,
            updated_at: at,
        }
    }

    fn ids(users: &[User]) -> Vec<&str> {
        users.iter().map(|u| u.id.as_str()).collect()
    }

    #[tokio::test]
    async fn insert_appends_and_refuses_duplicates() {
        let repo = InMemoryUsersRepository::new();
        assert!(repo.insert(user("a")).await.unwrap());
        assert!(repo.insert(user("b")).await.unwrap());
        assert!(!repo.insert(user("a")).await.unwrap());
        assert_eq!(repo.len(), 2);
        assert_eq!(ids(&repo.list().await.unwrap()), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn lookup_is_exact_and_case_sensitive() {
        let repo = InMemoryUsersRepository::with_users(vec![user("abc")]);
        assert!(repo.find_by_id("abc").await.unwrap().is_some());
        assert!(repo.find_by_id("ABC").await.unwrap().is_none());
        assert!(repo.find_by_id("").await.unwrap().is_none());
        assert!(repo.find_by_id("ab").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn modify_keeps_position() {
        let repo = InMemoryUsersRepository::with_users(vec![user("a"), user("b"), user("c")]);
        let set_name = |u: &mut User| u.first_name = "Changed".into();
        let updated = repo.modify("b", &set_name).await.unwrap().unwrap();
        assert_eq!(updated.first_name, "Changed");

        let all = repo.list().await.unwrap();
        assert_eq!(ids(&all), vec!["a", "b", "c"]);
        assert_eq!(all[1].first_name, "Changed");
        assert!(repo.modify("zzz", &set_name).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn returned_records_are_copies() {
        let repo = InMemoryUsersRepository::with_users(vec![user("a")]);
        let mut copy = repo.find_by_id("a").await.unwrap().unwrap();
        copy.first_name = "Mutated".into();
        assert_eq!(
            repo.find_by_id("a").await.unwrap().unwrap().first_name,
            "First a"
        );
    }

    #[tokio::test]
    async fn delete_preserves_relative_order() {
        let repo = InMemoryUsersRepository::with_users(vec![user("a"), user("b"), user("c")]);
        let removed = repo.delete("b").await.unwrap().unwrap();
        assert_eq!(removed.id, "b");
        assert_eq!(ids(&repo.list().await.unwrap()), vec!["a", "c"]);
        assert!(repo.delete("b").await.unwrap().is_none());
        assert!(!repo.is_empty());
    }
}
