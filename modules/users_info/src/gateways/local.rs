use async_trait::async_trait;
use std::sync::Arc;

use crate::contract::{
    client::UsersInfoApi,
    error::UsersInfoError,
    model::{NewUser, User},
};
use crate::domain::{error::DomainError, service::Service};

/// Local implementation of the UsersInfoApi trait that delegates to the domain service
pub struct UsersInfoLocalClient {
    service: Arc<Service>,
}

impl UsersInfoLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl UsersInfoApi for UsersInfoLocalClient {
    async fn get_user(&self, id: i64) -> anyhow::Result<User> {
        self.service.get_user(id).await.map_err(to_contract_error)
    }

    async fn list_users(&self, skip: Option<i64>, limit: Option<i64>) -> anyhow::Result<Vec<User>> {
        self.service
            .list_users(skip, limit)
            .await
            .map_err(to_contract_error)
    }

    async fn create_user(&self, new_user: NewUser) -> anyhow::Result<User> {
        self.service
            .create_user(new_user)
            .await
            .map_err(to_contract_error)
    }

    async fn count_users(&self) -> anyhow::Result<usize> {
        self.service.count_users().await.map_err(to_contract_error)
    }
}

/// Map domain errors to contract errors wrapped in anyhow
fn to_contract_error(domain_error: DomainError) -> anyhow::Error {
    anyhow::Error::new(UsersInfoError::from(domain_error))
}
