//! The application store: owns [`AppState`], runs commands against the
//! remote APIs and publishes every change to subscribers.

use crate::core::analytics::Period;
use crate::core::cache::KeyValueCollection;
use crate::core::error::AppError;
use crate::core::finance::{FinanceApi, SignInRequest, SignUpRequest};
use crate::core::ledger::LedgerAction;
use crate::core::rates::RateSnapshot;
use crate::core::state::{Action, AppState, reduce};
use crate::core::transaction::{Transaction, TransactionDraft, TransactionPatch, User};
use crate::providers::caching::RateCache;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, info, warn};

const TOKEN_KEY: &[u8] = b"token";

pub struct App {
    api: Arc<dyn FinanceApi>,
    rates: RateCache,
    session_store: Arc<dyn KeyValueCollection>,
    state: watch::Sender<AppState>,
    generation: AtomicU64,
}

impl App {
    pub fn new(
        api: Arc<dyn FinanceApi>,
        rates: RateCache,
        session_store: Arc<dyn KeyValueCollection>,
    ) -> Self {
        let (state, _) = watch::channel(AppState::default());
        Self {
            api,
            rates,
            session_store,
            state,
            generation: AtomicU64::new(0),
        }
    }

    /// Receiver notified after every committed action.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> AppState {
        self.state.borrow().clone()
    }

    /// Abandons every in-flight command: their responses are dropped
    /// instead of being applied.
    pub fn unmount(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.commit(Action::Unmounted);
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn commit(&self, action: Action) {
        self.state.send_modify(|state| reduce(state, action));
    }

    fn commit_if_current(&self, generation: u64, action: Action) -> bool {
        if self.generation() != generation {
            debug!("Discarding response for an unmounted view");
            return false;
        }
        self.commit(action);
        true
    }

    fn token(&self) -> Result<String, AppError> {
        self.state
            .borrow()
            .session
            .token
            .clone()
            .ok_or(AppError::MissingSession)
    }

    /// Records a failed command. A rejected token ends the session unless
    /// the request was abandoned meanwhile.
    async fn fail<T>(
        &self,
        generation: u64,
        err: AppError,
        on_error: impl FnOnce(String) -> Action,
    ) -> Result<T, AppError> {
        if let AppError::Unauthorized(reason) = &err {
            if self.generation() == generation {
                warn!("Session rejected by server: {}", reason);
                self.end_session().await;
            } else {
                debug!("Ignoring rejection of an abandoned request: {}", reason);
            }
        } else {
            self.commit_if_current(generation, on_error(err.to_string()));
        }
        Err(err)
    }

    async fn end_session(&self) {
        if let Err(e) = self.session_store.clear().await {
            warn!("Failed to clear stored session: {}", e);
        }
        self.commit(Action::SignedOut);
    }

    /// Persists and commits a new session. Returns `false` when the view was
    /// unmounted while the request was in flight.
    async fn start_session(
        &self,
        generation: u64,
        user: User,
        token: String,
    ) -> Result<bool, AppError> {
        if self.generation() != generation {
            debug!("Discarding session for an unmounted view");
            return Ok(false);
        }
        self.session_store
            .put(TOKEN_KEY, token.as_bytes())
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;
        Ok(self.commit_if_current(generation, Action::SignedIn { user, token }))
    }

    pub async fn sign_up(&self, username: &str, email: &str, password: &str) -> Result<User, AppError> {
        let request = SignUpRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let generation = self.generation();
        let auth = self.api.sign_up(&request).await?;
        info!("Registered {}", auth.user.email);
        self.start_session(generation, auth.user.clone(), auth.token)
            .await?;
        Ok(auth.user)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, AppError> {
        let request = SignInRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let generation = self.generation();
        let auth = self.api.sign_in(&request).await?;
        info!("Signed in as {}", auth.user.email);
        self.start_session(generation, auth.user.clone(), auth.token)
            .await?;
        Ok(auth.user)
    }

    /// Signs out locally even when the server call fails. Requests still in
    /// flight can no longer touch the next session.
    pub async fn sign_out(&self) -> Result<(), AppError> {
        let result = match self.token() {
            Ok(token) => self.api.sign_out(&token).await,
            Err(_) => Ok(()),
        };
        if let Err(e) = &result {
            warn!("Server sign-out failed: {}", e);
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.end_session().await;
        result.or_else(|e| if e.is_unauthorized() { Ok(()) } else { Err(e) })
    }

    /// Resumes the persisted session. Returns `false` when there is none,
    /// the server no longer accepts the stored token, or the view was
    /// unmounted before the answer arrived.
    pub async fn restore_session(&self) -> Result<bool, AppError> {
        let generation = self.generation();
        let Some(bytes) = self.session_store.get(TOKEN_KEY).await else {
            return Ok(false);
        };
        let token = String::from_utf8_lossy(&bytes).into_owned();
        match self.api.current_user(&token).await {
            Ok(user) => Ok(self.commit_if_current(generation, Action::SignedIn { user, token })),
            Err(AppError::Unauthorized(reason)) => {
                if self.generation() == generation {
                    debug!("Stored token rejected: {}", reason);
                    self.end_session().await;
                }
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn refresh_user(&self) -> Result<User, AppError> {
        let token = self.token()?;
        let generation = self.generation();
        match self.api.current_user(&token).await {
            Ok(user) => {
                self.commit_if_current(generation, Action::UserRefreshed(user.clone()));
                Ok(user)
            }
            Err(e) => self.fail(generation, e, |m| Action::Ledger(LedgerAction::Failed(m))).await,
        }
    }

    pub async fn load_transactions(&self) -> Result<(), AppError> {
        let token = self.token()?;
        let generation = self.generation();
        self.commit(Action::Ledger(LedgerAction::Pending));
        match self.api.list_transactions(&token).await {
            Ok(transactions) => {
                self.commit_if_current(
                    generation,
                    Action::Ledger(LedgerAction::TransactionsLoaded(transactions)),
                );
                Ok(())
            }
            Err(e) => self.fail(generation, e, |m| Action::Ledger(LedgerAction::Failed(m))).await,
        }
    }

    /// Fetches categories once per session.
    pub async fn load_categories(&self) -> Result<(), AppError> {
        if self.state.borrow().ledger.has_categories() {
            debug!("Categories already loaded");
            return Ok(());
        }
        let token = self.token()?;
        let generation = self.generation();
        match self.api.list_categories(&token).await {
            Ok(categories) => {
                self.commit_if_current(
                    generation,
                    Action::Ledger(LedgerAction::CategoriesLoaded(categories)),
                );
                Ok(())
            }
            Err(e) => self.fail(generation, e, |m| Action::Ledger(LedgerAction::Failed(m))).await,
        }
    }

    pub fn invalidate_categories(&self) {
        self.commit(Action::Ledger(LedgerAction::CategoriesInvalidated));
    }

    /// Loads transactions and categories concurrently.
    pub async fn refresh(&self) -> Result<(), AppError> {
        let (transactions, categories) =
            futures::join!(self.load_transactions(), self.load_categories());
        transactions.and(categories)
    }

    pub async fn add_transaction(&self, draft: &TransactionDraft) -> Result<Transaction, AppError> {
        let payload = draft.validate()?;
        let token = self.token()?;
        let generation = self.generation();
        match self.api.create_transaction(&token, &payload).await {
            Ok(transaction) => {
                self.commit_if_current(
                    generation,
                    Action::Ledger(LedgerAction::TransactionAdded(transaction.clone())),
                );
                Ok(transaction)
            }
            Err(e) => self.fail(generation, e, |m| Action::Ledger(LedgerAction::Failed(m))).await,
        }
    }

    pub async fn update_transaction(
        &self,
        id: &str,
        patch: &TransactionPatch,
    ) -> Result<Transaction, AppError> {
        let kind = self.state.borrow().ledger.find(id).map(Transaction::kind);
        let update = patch.validate(kind)?;
        let token = self.token()?;
        let generation = self.generation();
        match self.api.update_transaction(&token, id, &update).await {
            Ok(transaction) => {
                self.commit_if_current(
                    generation,
                    Action::Ledger(LedgerAction::TransactionUpdated(transaction.clone())),
                );
                Ok(transaction)
            }
            Err(e) => self.fail(generation, e, |m| Action::Ledger(LedgerAction::Failed(m))).await,
        }
    }

    pub async fn delete_transaction(&self, id: &str) -> Result<(), AppError> {
        let token = self.token()?;
        let generation = self.generation();
        match self.api.delete_transaction(&token, id).await {
            Ok(()) => {
                self.commit_if_current(
                    generation,
                    Action::Ledger(LedgerAction::TransactionDeleted(id.to_string())),
                );
                Ok(())
            }
            Err(e) => self.fail(generation, e, |m| Action::Ledger(LedgerAction::Failed(m))).await,
        }
    }

    pub async fn load_statistics(&self, period: Period) -> Result<(), AppError> {
        let token = self.token()?;
        let generation = self.generation();
        self.commit(Action::StatisticsRequested(period));
        match self.api.period_summary(&token, period).await {
            Ok(summary) => {
                self.commit_if_current(generation, Action::StatisticsLoaded(summary));
                Ok(())
            }
            Err(e) => self.fail(generation, e, Action::StatisticsFailed).await,
        }
    }

    /// Rates need no session.
    pub async fn load_rates(&self) -> Result<RateSnapshot, AppError> {
        let generation = self.generation();
        self.commit(Action::RatesRequested);
        match self.rates.get_rates().await {
            Ok(snapshot) => {
                self.commit_if_current(generation, Action::RatesLoaded(snapshot.clone()));
                Ok(snapshot)
            }
            Err(e) => {
                let message = format!("{e:#}");
                self.commit_if_current(generation, Action::RatesFailed(message.clone()));
                Err(AppError::Network(message))
            }
        }
    }
}
