//! Application state and the reducer that mutates it.

use crate::core::analytics::{Period, PeriodSummary};
use crate::core::ledger::{Ledger, LedgerAction};
use crate::core::rates::{RateSnapshot, RateState};
use crate::core::transaction::User;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
}

impl Session {
    pub fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatisticsState {
    pub data: Option<PeriodSummary>,
    pub period: Period,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub session: Session,
    pub ledger: Ledger,
    pub statistics: StatisticsState,
    pub rates: RateState,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SignedIn { user: User, token: String },
    UserRefreshed(User),
    SignedOut,
    Ledger(LedgerAction),
    StatisticsRequested(Period),
    StatisticsLoaded(PeriodSummary),
    StatisticsFailed(String),
    RatesRequested,
    RatesLoaded(RateSnapshot),
    RatesFailed(String),
    /// The view went away; pending loads will never complete.
    Unmounted,
}

pub fn reduce(state: &mut AppState, action: Action) {
    match action {
        Action::SignedIn { user, token } => {
            state.session = Session {
                user: Some(user),
                token: Some(token),
            };
        }
        Action::UserRefreshed(user) => state.session.user = Some(user),
        Action::SignedOut => {
            state.session = Session::default();
            state.ledger.apply(LedgerAction::Cleared);
            state.statistics = StatisticsState {
                period: state.statistics.period,
                ..Default::default()
            };
        }
        Action::Ledger(action) => state.ledger.apply(action),
        Action::StatisticsRequested(period) => {
            state.statistics.period = period;
            state.statistics.is_loading = true;
            state.statistics.error = None;
        }
        Action::StatisticsLoaded(summary) => {
            state.statistics.is_loading = false;
            state.statistics.data = Some(summary);
            state.statistics.error = None;
        }
        Action::StatisticsFailed(message) => {
            state.statistics.is_loading = false;
            state.statistics.data = None;
            state.statistics.error = Some(message);
        }
        Action::RatesRequested => state.rates = RateState::Loading,
        Action::RatesLoaded(snapshot) => {
            state.rates = if snapshot.stale {
                RateState::StaleFallback(snapshot)
            } else {
                RateState::Ready(snapshot)
            };
        }
        Action::RatesFailed(message) => state.rates = RateState::Error(message),
        Action::Unmounted => {
            state.ledger.apply(LedgerAction::Settled);
            state.statistics.is_loading = false;
            if state.rates == RateState::Loading {
                state.rates = RateState::Empty;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::Transaction;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn user() -> User {
        User {
            id: "u1".into(),
            username: "ann".into(),
            email: "ann@example.com".into(),
            balance: Decimal::ZERO,
        }
    }

    fn summary(period: Period) -> PeriodSummary {
        PeriodSummary {
            period,
            income: Decimal::from(10),
            expenses: Decimal::from(4),
            total: Decimal::from(6),
            categories: vec![],
        }
    }

    #[test]
    fn test_sign_out_clears_session_and_ledger() {
        let mut state = AppState::default();
        reduce(
            &mut state,
            Action::SignedIn {
                user: user(),
                token: "tok".into(),
            },
        );
        assert!(state.session.is_signed_in());

        let period = Period::new(2025, 1).unwrap();
        reduce(
            &mut state,
            Action::Ledger(LedgerAction::TransactionsLoaded(vec![Transaction::income(
                "t1",
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                "Salary",
                Decimal::from(10),
            )])),
        );
        reduce(&mut state, Action::StatisticsLoaded(summary(period)));
        reduce(&mut state, Action::StatisticsRequested(period));

        reduce(&mut state, Action::SignedOut);
        assert!(!state.session.is_signed_in());
        assert!(state.session.user.is_none());
        assert!(state.ledger.transactions().is_empty());
        assert!(state.statistics.data.is_none());
        assert_eq!(state.statistics.period, period);
    }

    #[test]
    fn test_statistics_failure_clears_data() {
        let mut state = AppState::default();
        let period = Period::new(2025, 2).unwrap();
        reduce(&mut state, Action::StatisticsRequested(period));
        assert!(state.statistics.is_loading);
        reduce(&mut state, Action::StatisticsLoaded(summary(period)));
        assert!(state.statistics.data.is_some());

        reduce(&mut state, Action::StatisticsFailed("boom".into()));
        assert!(state.statistics.data.is_none());
        assert_eq!(state.statistics.error.as_deref(), Some("boom"));
        assert!(!state.statistics.is_loading);
    }

    #[test]
    fn test_rate_state_transitions() {
        let mut state = AppState::default();
        assert_eq!(state.rates, RateState::Empty);

        reduce(&mut state, Action::RatesRequested);
        assert_eq!(state.rates, RateState::Loading);

        let snapshot = RateSnapshot {
            rates: vec![],
            fetched_at_ms: 5,
            stale: false,
        };
        reduce(&mut state, Action::RatesLoaded(snapshot.clone()));
        assert_eq!(state.rates, RateState::Ready(snapshot.clone()));

        let stale = RateSnapshot {
            stale: true,
            ..snapshot
        };
        reduce(&mut state, Action::RatesLoaded(stale.clone()));
        assert_eq!(state.rates, RateState::StaleFallback(stale));

        reduce(&mut state, Action::RatesFailed("offline".into()));
        assert_eq!(state.rates, RateState::Error("offline".into()));
    }

    #[test]
    fn test_unmount_settles_pending_loads() {
        let mut state = AppState::default();
        reduce(&mut state, Action::Ledger(LedgerAction::Pending));
        reduce(&mut state, Action::RatesRequested);
        reduce(&mut state, Action::StatisticsRequested(Period::new(2025, 1).unwrap()));

        reduce(&mut state, Action::Unmounted);
        assert!(!state.ledger.is_loading);
        assert!(!state.statistics.is_loading);
        assert_eq!(state.rates, RateState::Empty);
    }
}
