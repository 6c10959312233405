use crate::core::error::AppError;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

pub const USER_AGENT: &str = concat!("moneyguard/", env!("CARGO_PKG_VERSION"));

pub fn http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().user_agent(USER_AGENT).build()
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Passes successful responses through and turns the rest into an
/// [`AppError`], preferring the server's own `message`.
pub async fn check_status(response: Response, fallback: &str) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    debug!(%status, %body, "Request rejected");
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string());

    if status == StatusCode::UNAUTHORIZED {
        Err(AppError::Unauthorized(message))
    } else {
        Err(AppError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
