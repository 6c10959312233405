use crate::core::analytics::{CategorySummary, Period, PeriodSummary};
use crate::core::error::AppError;
use crate::core::finance::{ApiResult, AuthResponse, FinanceApi, SignInRequest, SignUpRequest};
use crate::core::transaction::{
    Category, NewTransaction, Transaction, TransactionKind, TransactionRecord, TransactionUpdate,
    User,
};
use crate::providers::util::{check_status, http_client};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

/// Client for the wallet REST API.
pub struct WalletApiClient {
    base_url: String,
    client: Client,
}

impl WalletApiClient {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client()?,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder, fallback: &str) -> ApiResult<reqwest::Response> {
        let response = request.send().await?;
        check_status(response, fallback).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> ApiResult<T> {
        let response = self.send(request, fallback).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| AppError::MalformedResponse(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResponse {
    #[serde(default)]
    categories_summary: Vec<SummaryLine>,
    #[serde(default)]
    income_summary: Decimal,
    #[serde(default)]
    expense_summary: Decimal,
    #[serde(default)]
    period_total: Decimal,
}

#[derive(Debug, Deserialize)]
struct SummaryLine {
    #[serde(alias = "category", default)]
    name: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<TransactionKind>,
    #[serde(alias = "amount", alias = "sum", default)]
    total: Decimal,
}

impl SummaryResponse {
    fn into_summary(self, period: Period) -> PeriodSummary {
        PeriodSummary {
            period,
            income: self.income_summary,
            expenses: self.expense_summary.abs(),
            total: self.period_total,
            categories: self
                .categories_summary
                .into_iter()
                .map(|line| CategorySummary {
                    name: line.name.unwrap_or_else(|| "Unknown".to_string()),
                    kind: line.kind,
                    total: line.total.abs(),
                })
                .collect(),
        }
    }
}

#[async_trait]
impl FinanceApi for WalletApiClient {
    #[instrument(name = "WalletSignUp", skip_all, fields(email = %request.email))]
    async fn sign_up(&self, request: &SignUpRequest) -> ApiResult<AuthResponse> {
        let req = self.client.post(self.url("/auth/sign-up")).json(request);
        self.send_json(req, "Registration failed").await
    }

    #[instrument(name = "WalletSignIn", skip_all, fields(email = %request.email))]
    async fn sign_in(&self, request: &SignInRequest) -> ApiResult<AuthResponse> {
        let req = self.client.post(self.url("/auth/sign-in")).json(request);
        self.send_json(req, "Login failed").await
    }

    async fn sign_out(&self, token: &str) -> ApiResult<()> {
        let req = self
            .client
            .delete(self.url("/auth/sign-out"))
            .bearer_auth(token);
        self.send(req, "Logout failed").await?;
        Ok(())
    }

    async fn current_user(&self, token: &str) -> ApiResult<User> {
        let req = self
            .client
            .get(self.url("/users/current"))
            .bearer_auth(token);
        self.send_json(req, "Failed to fetch current user").await
    }

    #[instrument(name = "WalletListTransactions", skip_all)]
    async fn list_transactions(&self, token: &str) -> ApiResult<Vec<Transaction>> {
        let req = self.client.get(self.url("/transactions")).bearer_auth(token);
        let records: Vec<TransactionRecord> =
            self.send_json(req, "Failed to fetch transactions").await?;
        debug!(count = records.len(), "Fetched transactions");
        records.into_iter().map(Transaction::try_from).collect()
    }

    async fn create_transaction(
        &self,
        token: &str,
        transaction: &NewTransaction,
    ) -> ApiResult<Transaction> {
        let req = self
            .client
            .post(self.url("/transactions"))
            .bearer_auth(token)
            .json(transaction);
        let record: TransactionRecord = self.send_json(req, "Failed to add transaction").await?;
        Transaction::try_from(record)
    }

    async fn update_transaction(
        &self,
        token: &str,
        id: &str,
        update: &TransactionUpdate,
    ) -> ApiResult<Transaction> {
        let req = self
            .client
            .patch(self.url(&format!("/transactions/{id}")))
            .bearer_auth(token)
            .json(update);
        let record: TransactionRecord = self
            .send_json(req, "Failed to update transaction")
            .await?;
        Transaction::try_from(record)
    }

    async fn delete_transaction(&self, token: &str, id: &str) -> ApiResult<()> {
        let req = self
            .client
            .delete(self.url(&format!("/transactions/{id}")))
            .bearer_auth(token);
        self.send(req, "Failed to delete transaction").await?;
        Ok(())
    }

    async fn list_categories(&self, token: &str) -> ApiResult<Vec<Category>> {
        let req = self
            .client
            .get(self.url("/transaction-categories"))
            .bearer_auth(token);
        self.send_json(req, "Failed to fetch categories").await
    }

    #[instrument(name = "WalletPeriodSummary", skip_all, fields(period = %period))]
    async fn period_summary(&self, token: &str, period: Period) -> ApiResult<PeriodSummary> {
        let url = self.url(&format!(
            "/transactions-summary?month={}&year={}",
            period.month, period.year
        ));
        let req = self.client.get(url).bearer_auth(token);
        let response: SummaryResponse = self
            .send_json(req, "Failed to fetch statistics")
            .await?;
        Ok(response.into_summary(period))
    }
}
