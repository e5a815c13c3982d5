use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::insights::{self, InsightConfig};
use crate::odds_fetch::{self, OddsClientConfig, OddsError};
use crate::state::{Delta, ProviderCommand, PrimaryPlayerProp};

/// Worker thread bridging the UI to the odds provider and the insight
/// generator. One command in, one or more deltas out; the UI side decides
/// whether a result is still relevant to the current selection.
pub fn spawn_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let insight_cfg = InsightConfig::from_env();
        for cmd in cmd_rx {
            match cmd {
                ProviderCommand::FetchGames { api_key } => fetch_games(&tx, &api_key),
                ProviderCommand::FetchMarkets { api_key, event_id } => {
                    fetch_markets(&tx, &api_key, &event_id)
                }
                ProviderCommand::FetchMarketOdds {
                    api_key,
                    event_id,
                    market,
                } => fetch_market_odds(&tx, &api_key, &event_id, &market),
                ProviderCommand::GenerateInsights {
                    event_id,
                    market,
                    bookmaker_title,
                    props,
                } => generate_insights(&tx, &insight_cfg, &event_id, &market, &bookmaker_title, &props),
            }
        }
    });
}

fn fetch_games(tx: &Sender<Delta>, api_key: &str) {
    let cfg = OddsClientConfig::with_key(api_key);
    match odds_fetch::fetch_events(&cfg) {
        Ok(games) => {
            let _ = tx.send(Delta::SetGames(games));
        }
        Err(OddsError::Unauthorized) => {
            let _ = tx.send(Delta::ApiKeyRejected);
        }
        Err(err) => {
            let _ = tx.send(Delta::GamesFailed(err.to_string()));
        }
    }
}

fn fetch_markets(tx: &Sender<Delta>, api_key: &str, event_id: &str) {
    let cfg = OddsClientConfig::with_key(api_key);
    match odds_fetch::fetch_available_markets(&cfg, event_id) {
        Ok(markets) => {
            let _ = tx.send(Delta::SetMarkets {
                event_id: event_id.to_string(),
                markets: odds_fetch::player_market_keys(&markets),
            });
        }
        Err(OddsError::Unauthorized) => {
            let _ = tx.send(Delta::ApiKeyRejected);
        }
        Err(err) => {
            // Discovery is best-effort; an empty list triggers the fallback
            // market tabs on the UI side.
            let _ = tx.send(Delta::Log(format!("[WARN] Market discovery failed: {err}")));
            let _ = tx.send(Delta::SetMarkets {
                event_id: event_id.to_string(),
                markets: Vec::new(),
            });
        }
    }
}

fn fetch_market_odds(tx: &Sender<Delta>, api_key: &str, event_id: &str, market: &str) {
    let cfg = OddsClientConfig::with_key(api_key);
    match odds_fetch::fetch_market_odds(&cfg, event_id, market) {
        Ok(response) => {
            let _ = tx.send(Delta::SetMarketOdds {
                event_id: event_id.to_string(),
                market: market.to_string(),
                response,
            });
        }
        Err(OddsError::Unauthorized) => {
            let _ = tx.send(Delta::ApiKeyRejected);
        }
        Err(err) => {
            let _ = tx.send(Delta::MarketFailed {
                event_id: event_id.to_string(),
                market: market.to_string(),
                message: err.to_string(),
            });
        }
    }
}

fn generate_insights(
    tx: &Sender<Delta>,
    cfg: &InsightConfig,
    event_id: &str,
    market: &str,
    bookmaker_title: &str,
    props: &[PrimaryPlayerProp],
) {
    if !cfg.enabled() {
        let _ = tx.send(Delta::InsightsFailed {
            event_id: event_id.to_string(),
            market: market.to_string(),
            message: "GEMINI_API_KEY missing".to_string(),
        });
        return;
    }
    match insights::generate_insights(cfg, market, bookmaker_title, props) {
        Ok(insights) => {
            let _ = tx.send(Delta::SetInsights {
                event_id: event_id.to_string(),
                market: market.to_string(),
                insights,
            });
        }
        Err(err) => {
            let _ = tx.send(Delta::InsightsFailed {
                event_id: event_id.to_string(),
                market: market.to_string(),
                message: err.to_string(),
            });
        }
    }
}
