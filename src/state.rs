use std::collections::{HashMap, VecDeque};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::emr::{self, EmrResult};
use crate::insights::PlayerInsight;
use crate::normalize;
use crate::odds_fetch::OddsResponse;
use crate::rank;

/// Player-prop markets offered when discovery returns nothing usable.
pub const FALLBACK_PLAYER_MARKETS: [&str; 6] = [
    "player_points",
    "player_assists",
    "player_rebounds",
    "player_blocks",
    "player_steals",
    "player_threes",
];

pub const DEFAULT_MARKET: &str = "player_points";
pub const DEFAULT_BOOKMAKER: &str = "draftkings";

const LOG_CAP: usize = 50;

/// Cache key for one fetched odds payload: (event id, market key).
pub type MarketKey = (String, String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    ApiKeySetup,
    GamesList,
    GameDetail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsensusStrength {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParlayRole {
    Anchor,
    Support,
    Volatile,
}

/// The side the aggregate bookmaker pricing favors. Absent = neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketLean {
    More,
    Less,
}

impl ConsensusStrength {
    pub fn label(self) -> &'static str {
        match self {
            ConsensusStrength::Low => "Low",
            ConsensusStrength::Medium => "Medium",
            ConsensusStrength::High => "High",
        }
    }
}

impl ParlayRole {
    pub fn label(self) -> &'static str {
        match self {
            ParlayRole::Anchor => "Anchor",
            ParlayRole::Support => "Support",
            ParlayRole::Volatile => "Volatile",
        }
    }
}

impl MarketLean {
    pub fn label(self) -> &'static str {
        match self {
            MarketLean::More => "MORE",
            MarketLean::Less => "LESS",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub commence_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMarket {
    pub key: String,
    #[serde(default)]
    pub group: String,
}

/// One bookmaker's consolidated quote for a player at one specific line.
/// Either side may be absent when that book only priced one direction.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerOffer {
    pub bookmaker: String,
    pub bookmaker_title: String,
    pub over_price: Option<f64>,
    pub under_price: Option<f64>,
}

impl PlayerOffer {
    pub fn is_two_sided(&self) -> bool {
        self.over_price.is_some() && self.under_price.is_some()
    }
}

/// The unit the scoring pipeline operates on: one player's representative
/// line for one market, rebuilt from scratch on every normalization pass.
#[derive(Debug, Clone)]
pub struct PrimaryPlayerProp {
    pub player_name: String,
    pub market_key: String,
    pub line: f64,
    pub team: Option<String>,
    pub offers: Vec<PlayerOffer>,
    pub consensus: ConsensusStrength,
    pub role: ParlayRole,
    pub lean: Option<MarketLean>,
    pub avg_over_price: f64,
    pub avg_under_price: f64,
    pub notable: bool,
}

impl PrimaryPlayerProp {
    pub fn offer_for(&self, bookmaker: &str) -> Option<&PlayerOffer> {
        self.offers.iter().find(|o| o.bookmaker == bookmaker)
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub api_key: Option<String>,
    pub key_input: String,
    pub key_error: Option<String>,
    pub games: Vec<Game>,
    pub games_loading: bool,
    pub games_fetched_at: Option<SystemTime>,
    pub selected: usize,
    pub available_markets: HashMap<String, Vec<String>>,
    pub selected_market: String,
    pub selected_bookmaker: String,
    pub market_cache: HashMap<MarketKey, OddsResponse>,
    pub market_fetched_at: HashMap<MarketKey, SystemTime>,
    pub market_errors: HashMap<MarketKey, String>,
    pub market_loading: Option<MarketKey>,
    pub props: Vec<PrimaryPlayerProp>,
    pub prop_emrs: Vec<EmrResult>,
    pub prop_scroll: usize,
    pub insights: HashMap<MarketKey, Vec<PlayerInsight>>,
    pub insights_loading: bool,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::ApiKeySetup,
            api_key: None,
            key_input: String::new(),
            key_error: None,
            games: Vec::new(),
            games_loading: false,
            games_fetched_at: None,
            selected: 0,
            available_markets: HashMap::new(),
            selected_market: DEFAULT_MARKET.to_string(),
            selected_bookmaker: DEFAULT_BOOKMAKER.to_string(),
            market_cache: HashMap::new(),
            market_fetched_at: HashMap::new(),
            market_errors: HashMap::new(),
            market_loading: None,
            props: Vec::new(),
            prop_emrs: Vec::new(),
            prop_scroll: 0,
            insights: HashMap::new(),
            insights_loading: false,
            logs: VecDeque::new(),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        self.logs.push_back(line.into());
        while self.logs.len() > LOG_CAP {
            self.logs.pop_front();
        }
    }

    pub fn selected_game(&self) -> Option<&Game> {
        self.games.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if !self.games.is_empty() {
            self.selected = (self.selected + 1).min(self.games.len() - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Enter the detail screen for the selected game. Every game starts from
    /// the default market and bookmaker; selections never carry over from a
    /// previously viewed game. Returns false when nothing is selected.
    pub fn open_selected_game(&mut self) -> bool {
        if self.selected_game().is_none() {
            return false;
        }
        self.screen = Screen::GameDetail;
        self.selected_market = DEFAULT_MARKET.to_string();
        self.selected_bookmaker = DEFAULT_BOOKMAKER.to_string();
        self.prop_scroll = 0;
        self.recompute_props();
        true
    }

    /// Key for the (event, market) payload the detail screen is showing.
    pub fn current_key(&self) -> Option<MarketKey> {
        let game = self.selected_game()?;
        Some((game.id.clone(), self.selected_market.clone()))
    }

    pub fn current_response(&self) -> Option<&OddsResponse> {
        let key = self.current_key()?;
        self.market_cache.get(&key)
    }

    pub fn current_error(&self) -> Option<&str> {
        let key = self.current_key()?;
        self.market_errors.get(&key).map(String::as_str)
    }

    pub fn current_insights(&self) -> Option<&[PlayerInsight]> {
        let key = self.current_key()?;
        self.insights.get(&key).map(Vec::as_slice)
    }

    /// Market tabs for the selected event: discovered player markets, or the
    /// static fallback list when discovery came back empty.
    pub fn markets_for_selected(&self) -> Vec<String> {
        let discovered = self
            .selected_game()
            .and_then(|g| self.available_markets.get(&g.id))
            .filter(|keys| !keys.is_empty());
        match discovered {
            Some(keys) => keys.clone(),
            None => FALLBACK_PLAYER_MARKETS
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }

    /// Bookmakers quoting the currently shown payload, in provider order.
    pub fn current_bookmakers(&self) -> Vec<(String, String)> {
        self.current_response()
            .map(|resp| {
                resp.bookmakers
                    .iter()
                    .map(|b| (b.key.clone(), b.title.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn cycle_market(&mut self, step: isize) {
        let markets = self.markets_for_selected();
        if markets.is_empty() {
            return;
        }
        let current = markets
            .iter()
            .position(|m| *m == self.selected_market)
            .unwrap_or(0);
        let len = markets.len() as isize;
        let next = (current as isize + step).rem_euclid(len) as usize;
        self.selected_market = markets[next].clone();
        self.prop_scroll = 0;
        self.recompute_props();
    }

    pub fn scroll_props_down(&mut self) {
        if !self.props.is_empty() {
            self.prop_scroll = (self.prop_scroll + 1).min(self.props.len() - 1);
        }
    }

    pub fn scroll_props_up(&mut self) {
        self.prop_scroll = self.prop_scroll.saturating_sub(1);
    }

    pub fn cycle_bookmaker(&mut self) {
        let books = self.current_bookmakers();
        if books.is_empty() {
            return;
        }
        let current = books
            .iter()
            .position(|(key, _)| *key == self.selected_bookmaker)
            .unwrap_or(0);
        let next = (current + 1) % books.len();
        self.selected_bookmaker = books[next].0.clone();
        self.recompute_props();
    }

    pub fn selected_bookmaker_title(&self) -> String {
        self.current_bookmakers()
            .into_iter()
            .find(|(key, _)| *key == self.selected_bookmaker)
            .map(|(_, title)| title)
            .unwrap_or_else(|| self.selected_bookmaker.clone())
    }

    /// Rebuild the prop list and per-prop EMR from the cached payload for the
    /// current (event, market, bookmaker) selection. Pure over the cache, so
    /// it is safe to re-run on every input change.
    pub fn recompute_props(&mut self) {
        let Some(key) = self.current_key() else {
            self.props.clear();
            self.prop_emrs.clear();
            self.prop_scroll = 0;
            return;
        };
        let Some(response) = self.market_cache.get(&key) else {
            self.props.clear();
            self.prop_emrs.clear();
            self.prop_scroll = 0;
            return;
        };

        let mut props = normalize::build_primary_props(response, &key.1);
        rank::mark_notable(&mut props, &self.selected_bookmaker);
        self.prop_emrs = props
            .iter()
            .map(|p| emr::calculate_emr(p, &self.selected_bookmaker))
            .collect();
        self.props = props;
        self.prop_scroll = self.prop_scroll.min(self.props.len().saturating_sub(1));
    }

    /// Combined miss rate over the notable selections at the current book.
    pub fn notable_parlay_miss_rate(&self) -> Option<u8> {
        let legs: Vec<u8> = self
            .props
            .iter()
            .zip(self.prop_emrs.iter())
            .filter(|(prop, _)| prop.notable)
            .map(|(_, emr)| emr.value)
            .collect();
        if legs.is_empty() {
            None
        } else {
            Some(emr::parlay_miss_rate(&legs))
        }
    }

    pub fn clear_key(&mut self) {
        self.api_key = None;
        self.key_input.clear();
        self.screen = Screen::ApiKeySetup;
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetGames(Vec<Game>),
    GamesFailed(String),
    SetMarkets {
        event_id: String,
        markets: Vec<String>,
    },
    SetMarketOdds {
        event_id: String,
        market: String,
        response: OddsResponse,
    },
    MarketFailed {
        event_id: String,
        market: String,
        message: String,
    },
    SetInsights {
        event_id: String,
        market: String,
        insights: Vec<PlayerInsight>,
    },
    InsightsFailed {
        event_id: String,
        market: String,
        message: String,
    },
    ApiKeyRejected,
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    FetchGames {
        api_key: String,
    },
    FetchMarkets {
        api_key: String,
        event_id: String,
    },
    FetchMarketOdds {
        api_key: String,
        event_id: String,
        market: String,
    },
    GenerateInsights {
        event_id: String,
        market: String,
        bookmaker_title: String,
        props: Vec<PrimaryPlayerProp>,
    },
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetGames(games) => {
            state.games_loading = false;
            state.games_fetched_at = Some(SystemTime::now());
            if state.selected >= games.len() {
                state.selected = games.len().saturating_sub(1);
            }
            state.push_log(format!("[INFO] Loaded {} upcoming games", games.len()));
            state.games = games;
        }
        Delta::GamesFailed(message) => {
            state.games_loading = false;
            state.push_log(format!("[WARN] Events fetch failed: {message}"));
        }
        Delta::SetMarkets { event_id, markets } => {
            if markets.is_empty() {
                state.push_log("[INFO] No player markets discovered, using fallback list");
            } else {
                state.push_log(format!(
                    "[INFO] Discovered {} player markets",
                    markets.len()
                ));
            }
            state.available_markets.insert(event_id, markets);
        }
        Delta::SetMarketOdds {
            event_id,
            market,
            response,
        } => {
            let key = (event_id, market);
            if state.market_loading.as_ref() == Some(&key) {
                state.market_loading = None;
            }
            state.market_errors.remove(&key);
            state
                .market_fetched_at
                .insert(key.clone(), SystemTime::now());
            state.market_cache.insert(key.clone(), response);
            // Stale results (selection moved on) stay cached but are not shown.
            if state.current_key().as_ref() == Some(&key) {
                state.recompute_props();
            }
        }
        Delta::MarketFailed {
            event_id,
            market,
            message,
        } => {
            let key = (event_id, market);
            if state.market_loading.as_ref() == Some(&key) {
                state.market_loading = None;
            }
            state.push_log(format!("[WARN] Market {} unavailable: {message}", key.1));
            state.market_errors.insert(key, message);
        }
        Delta::SetInsights {
            event_id,
            market,
            insights,
        } => {
            state.insights_loading = false;
            state.push_log(format!(
                "[INFO] Insights ready for {} players",
                insights.len()
            ));
            state.insights.insert((event_id, market), insights);
        }
        Delta::InsightsFailed {
            event_id: _,
            market,
            message,
        } => {
            state.insights_loading = false;
            state.push_log(format!("[WARN] Insights failed for {market}: {message}"));
        }
        Delta::ApiKeyRejected => {
            state.push_log("[WARN] API key rejected, returning to setup");
            state.key_error = Some("Invalid API key".to_string());
            state.clear_key();
        }
        Delta::Log(line) => state.push_log(line),
    }
}
