//! The remote finance API as seen by the application.

use crate::core::analytics::{Period, PeriodSummary};
use crate::core::error::AppError;
use crate::core::transaction::{
    Category, NewTransaction, Transaction, TransactionUpdate, User,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub type ApiResult<T> = Result<T, AppError>;

#[derive(Debug, Clone, Serialize)]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Every call except sign-up/sign-in carries the bearer token.
#[async_trait]
pub trait FinanceApi: Send + Sync {
    async fn sign_up(&self, request: &SignUpRequest) -> ApiResult<AuthResponse>;
    async fn sign_in(&self, request: &SignInRequest) -> ApiResult<AuthResponse>;
    async fn sign_out(&self, token: &str) -> ApiResult<()>;
    async fn current_user(&self, token: &str) -> ApiResult<User>;

    async fn list_transactions(&self, token: &str) -> ApiResult<Vec<Transaction>>;
    async fn create_transaction(
        &self,
        token: &str,
        transaction: &NewTransaction,
    ) -> ApiResult<Transaction>;
    async fn update_transaction(
        &self,
        token: &str,
        id: &str,
        update: &TransactionUpdate,
    ) -> ApiResult<Transaction>;
    async fn delete_transaction(&self, token: &str, id: &str) -> ApiResult<()>;

    async fn list_categories(&self, token: &str) -> ApiResult<Vec<Category>>;
    async fn period_summary(&self, token: &str, period: Period) -> ApiResult<PeriodSummary>;
}
