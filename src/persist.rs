use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::odds_fetch::OddsResponse;
use crate::state::{AppState, Game, Screen};

const CACHE_DIR: &str = "props_terminal";
const CACHE_FILE: &str = "cache.json";
const CACHE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct CacheFile {
    version: u32,
    api_key: Option<String>,
    #[serde(default)]
    games: Vec<Game>,
    #[serde(default)]
    games_fetched_at: Option<u64>,
    #[serde(default)]
    markets: HashMap<String, Vec<String>>,
    // Odds payloads keyed "event|market" so the JSON map key stays a string.
    #[serde(default)]
    odds: HashMap<String, OddsResponse>,
    #[serde(default)]
    odds_fetched_at: HashMap<String, u64>,
}

pub fn load_into_state(state: &mut AppState) {
    let Some(path) = cache_path() else {
        return;
    };
    let Some(cache) = load_cache_file(&path) else {
        return;
    };
    if cache.version != CACHE_VERSION {
        return;
    }

    if let Some(key) = cache.api_key.filter(|k| !k.trim().is_empty()) {
        state.api_key = Some(key);
        state.screen = Screen::GamesList;
    }
    state.games = cache.games;
    state.games_fetched_at = cache.games_fetched_at.and_then(system_time_from_secs);
    state.available_markets = cache.markets;
    for (joined, response) in cache.odds {
        let Some(key) = split_market_key(&joined) else {
            continue;
        };
        if let Some(at) = cache
            .odds_fetched_at
            .get(&joined)
            .copied()
            .and_then(system_time_from_secs)
        {
            state.market_fetched_at.insert(key.clone(), at);
        }
        state.market_cache.insert(key, response);
    }
}

pub fn save_from_state(state: &AppState) {
    let Some(path) = cache_path() else {
        return;
    };
    let Some(dir) = path.parent() else {
        return;
    };
    let _ = fs::create_dir_all(dir);

    let cache = CacheFile {
        version: CACHE_VERSION,
        api_key: state.api_key.clone(),
        games: state.games.clone(),
        games_fetched_at: state.games_fetched_at.and_then(system_time_to_secs),
        markets: state.available_markets.clone(),
        odds: state
            .market_cache
            .iter()
            .map(|(key, resp)| (join_market_key(key), resp.clone()))
            .collect(),
        odds_fetched_at: state
            .market_fetched_at
            .iter()
            .filter_map(|(key, at)| system_time_to_secs(*at).map(|t| (join_market_key(key), t)))
            .collect(),
    };

    if let Ok(json) = serde_json::to_string(&cache) {
        let tmp = path.with_extension("json.tmp");
        if fs::write(&tmp, json).is_ok() {
            let _ = fs::rename(&tmp, &path);
        }
    }
}

fn join_market_key(key: &(String, String)) -> String {
    format!("{}|{}", key.0, key.1)
}

fn split_market_key(joined: &str) -> Option<(String, String)> {
    let (event_id, market) = joined.split_once('|')?;
    if event_id.is_empty() || market.is_empty() {
        return None;
    }
    Some((event_id.to_string(), market.to_string()))
}

fn load_cache_file(path: &Path) -> Option<CacheFile> {
    let raw = fs::read_to_string(path).ok()?;
    serde_json::from_str::<CacheFile>(&raw).ok()
}

fn cache_path() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR).join(CACHE_FILE));
        }
    }
    // Fallback to ~/.cache on linux-like systems.
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".cache")
            .join(CACHE_DIR)
            .join(CACHE_FILE),
    )
}

fn system_time_to_secs(time: SystemTime) -> Option<u64> {
    time.duration_since(UNIX_EPOCH).ok().map(|d| d.as_secs())
}

fn system_time_from_secs(secs: u64) -> Option<SystemTime> {
    UNIX_EPOCH.checked_add(std::time::Duration::from_secs(secs))
}
