use std::env;

use anyhow::{Context, anyhow};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http_client::http_client;
use crate::state::{EventMarket, Game};

const BASE_URL: &str = "https://api.the-odds-api.com/v4/sports/basketball_nba";
const DEFAULT_REGIONS: &str = "us";

/// Explicit per-request configuration: the key is typed in by the user and
/// travels with every command instead of living in ambient state.
#[derive(Debug, Clone)]
pub struct OddsClientConfig {
    pub api_key: String,
    pub regions: String,
}

impl OddsClientConfig {
    pub fn with_key(api_key: impl Into<String>) -> Self {
        let regions = env::var("ODDS_REGIONS")
            .unwrap_or_else(|_| DEFAULT_REGIONS.to_string())
            .trim()
            .to_ascii_lowercase();
        Self {
            api_key: api_key.into(),
            regions,
        }
    }
}

#[derive(Debug, Error)]
pub enum OddsError {
    #[error("invalid API key")]
    Unauthorized,
    #[error("rate limit exceeded")]
    RateLimited,
    #[error("market unavailable: {0}")]
    MarketUnavailable(String),
    #[error("{0}")]
    Transport(#[from] anyhow::Error),
}

/// One priced side of a bet from one bookmaker, verbatim from the provider.
/// Player props carry the player name in `description`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOutcome {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub point: Option<f64>,
    #[serde(default)]
    pub team: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMarket {
    pub key: String,
    #[serde(default)]
    pub last_update: Option<String>,
    #[serde(default)]
    pub outcomes: Vec<RawOutcome>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmakerQuote {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub markets: Vec<RawMarket>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OddsResponse {
    pub id: String,
    #[serde(default)]
    pub sport_key: Option<String>,
    #[serde(default)]
    pub commence_time: Option<String>,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub bookmakers: Vec<BookmakerQuote>,
}

pub fn fetch_events(cfg: &OddsClientConfig) -> Result<Vec<Game>, OddsError> {
    let url = format!("{BASE_URL}/events");
    let body = get_with_status_mapping(&url, &[("apiKey", cfg.api_key.as_str())])?;
    Ok(parse_events_json(&body)?)
}

/// Discovery call: which markets exist for this event. Cheap, no odds data.
pub fn fetch_available_markets(
    cfg: &OddsClientConfig,
    event_id: &str,
) -> Result<Vec<EventMarket>, OddsError> {
    let url = format!("{BASE_URL}/events/{event_id}/markets");
    let body = get_with_status_mapping(&url, &[("apiKey", cfg.api_key.as_str())])?;
    Ok(parse_event_markets_json(&body)?)
}

/// Fetch odds for exactly one market. The single-market guard keeps each call
/// at one quota unit.
pub fn fetch_market_odds(
    cfg: &OddsClientConfig,
    event_id: &str,
    market: &str,
) -> Result<OddsResponse, OddsError> {
    ensure_single_market(market)?;
    let url = format!("{BASE_URL}/events/{event_id}/odds");
    let body = get_with_status_mapping(
        &url,
        &[
            ("apiKey", cfg.api_key.as_str()),
            ("regions", cfg.regions.as_str()),
            ("markets", market),
            ("oddsFormat", "american"),
        ],
    )?;
    Ok(parse_odds_json(&body)?)
}

pub fn parse_events_json(raw: &str) -> anyhow::Result<Vec<Game>> {
    serde_json::from_str(raw).context("invalid events json")
}

pub fn parse_event_markets_json(raw: &str) -> anyhow::Result<Vec<EventMarket>> {
    // The endpoint sometimes wraps the list in {"markets": [...]}.
    if let Ok(list) = serde_json::from_str::<Vec<EventMarket>>(raw) {
        return Ok(list);
    }
    #[derive(Deserialize)]
    struct Wrapper {
        #[serde(default)]
        markets: Vec<EventMarket>,
    }
    let wrapper: Wrapper = serde_json::from_str(raw).context("invalid markets json")?;
    Ok(wrapper.markets)
}

pub fn parse_odds_json(raw: &str) -> anyhow::Result<OddsResponse> {
    serde_json::from_str(raw).context("invalid odds json")
}

/// Keep only player-prop markets from a discovery response.
pub fn player_market_keys(markets: &[EventMarket]) -> Vec<String> {
    markets
        .iter()
        .filter(|m| m.key.starts_with("player_"))
        .map(|m| m.key.clone())
        .collect()
}

fn ensure_single_market(market: &str) -> Result<(), OddsError> {
    if market.contains(',') {
        return Err(OddsError::Transport(anyhow!(
            "multiple markets requested in a single call: {market}"
        )));
    }
    Ok(())
}

fn get_with_status_mapping(url: &str, query: &[(&str, &str)]) -> Result<String, OddsError> {
    let client = http_client()?;
    let resp = client
        .get(url)
        .query(query)
        .send()
        .context("odds request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading odds body")?;

    if status.is_success() {
        return Ok(body);
    }
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(OddsError::Unauthorized),
        StatusCode::TOO_MANY_REQUESTS => Err(OddsError::RateLimited),
        StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => {
            Err(OddsError::MarketUnavailable(body_snippet(&body)))
        }
        _ => Err(OddsError::Transport(anyhow!(
            "odds http {}: {}",
            status,
            body_snippet(&body)
        ))),
    }
}

fn body_snippet(body: &str) -> String {
    body.trim()
        .replace('\n', " ")
        .replace('\r', " ")
        .chars()
        .take(220)
        .collect()
}
