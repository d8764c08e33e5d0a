use crate::contract::model::User;
use async_trait::async_trait;

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
///
/// Ids are compared exactly (case-sensitive). Every method returns copies;
/// no caller ever holds a reference into the store.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Load a user by id.
    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<User>>;
    /// All users in insertion order.
    async fn list(&self) -> anyhow::Result<Vec<User>>;
    /// Append a fully-formed user. Returns `false` (and stores nothing) if
    /// the id is already taken.
    ///
    /// Service computes id/timestamps; repo persists.
    async fn insert(&self, u: User) -> anyhow::Result<bool>;
    /// Apply `f` to the user with `id` in place and return the result.
    /// The lookup, mutation and write-back are one atomic step.
    async fn modify(
        &self,
        id: &str,
        f: &(dyn for<'a> Fn(&'a mut User) + Send + Sync),
    ) -> anyhow::Result<Option<User>>;
    /// Remove by id, returning the removed user.
    async fn delete(&self, id: &str) -> anyhow::Result<Option<User>>;
}
