use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

/// Sent on every request so The Odds API and the insight endpoint can
/// attribute traffic to this terminal.
const USER_AGENT: &str = "props-terminal/0.1";
const REQUEST_TIMEOUT_SECS: u64 = 10;

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared blocking client for odds and insight requests.
pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_is_built_once_and_reused() {
        let first = http_client().expect("client builds");
        let second = http_client().expect("client builds");
        assert!(std::ptr::eq(first, second));
    }
}
