use async_trait::async_trait;
use std::sync::Arc;

use crate::contract::{
    client::UsersApi,
    error::UsersError,
    model::{NewUser, User, UserPatch},
};
use crate::domain::{schemas, service::Service};

/// Local implementation of the UsersApi trait that delegates to the domain service.
///
/// Typed inputs go through the same schemas the REST layer uses before they
/// reach the service.
pub struct UsersLocalClient {
    service: Arc<Service>,
}

impl UsersLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl UsersApi for UsersLocalClient {
    async fn get_user(&self, id: &str) -> Result<User, UsersError> {
        self.service.get_user(id).await.map_err(UsersError::from)
    }

    async fn list_users(&self) -> Result<Vec<User>, UsersError> {
        self.service.list_users().await.map_err(UsersError::from)
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, UsersError> {
        schemas::check_new_user(&new_user)?;
        self.service
            .create_user(new_user)
            .await
            .map_err(UsersError::from)
    }

    async fn update_user(&self, id: &str, patch: UserPatch) -> Result<User, UsersError> {
        schemas::check_patch(&patch)?;
        self.service
            .update_user(id, patch)
            .await
            .map_err(UsersError::from)
    }

    async fn delete_user(&self, id: &str) -> Result<User, UsersError> {
        self.service.delete_user(id).await.map_err(UsersError::from)
    }
}
