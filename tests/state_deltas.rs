use std::fs;
use std::path::PathBuf;

use props_terminal::insights::PlayerInsight;
use props_terminal::odds_fetch::parse_odds_json;
use props_terminal::state::{apply_delta, AppState, Delta, Game, Screen};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn game(id: &str) -> Game {
    Game {
        id: id.to_string(),
        home_team: "Boston Celtics".to_string(),
        away_team: "Miami Heat".to_string(),
        commence_time: String::new(),
    }
}

fn state_with_game(id: &str) -> AppState {
    let mut state = AppState::new();
    state.screen = Screen::GameDetail;
    state.api_key = Some("k".to_string());
    state.games = vec![game(id)];
    state.selected = 0;
    state
}

#[test]
fn set_games_clamps_selection_and_clears_loading() {
    let mut state = AppState::new();
    state.games_loading = true;
    state.selected = 5;
    apply_delta(&mut state, Delta::SetGames(vec![game("ev1"), game("ev2")]));
    assert!(!state.games_loading);
    assert_eq!(state.selected, 1);
    assert_eq!(state.games.len(), 2);
    assert!(state.games_fetched_at.is_some());
}

#[test]
fn market_odds_for_the_current_selection_rebuild_props() {
    let mut state = state_with_game("ev-bos-mia");
    let response = parse_odds_json(&read_fixture("odds_player_points.json")).expect("fixture");

    apply_delta(
        &mut state,
        Delta::SetMarketOdds {
            event_id: "ev-bos-mia".to_string(),
            market: "player_points".to_string(),
            response,
        },
    );

    assert_eq!(state.props.len(), 4);
    assert_eq!(state.prop_emrs.len(), 4);
    assert!(state.notable_parlay_miss_rate().is_some());
}

#[test]
fn stale_market_odds_are_cached_but_not_shown() {
    let mut state = state_with_game("ev-bos-mia");
    let response = parse_odds_json(&read_fixture("odds_player_points.json")).expect("fixture");

    // The user has moved to another market since the request went out.
    state.selected_market = "player_assists".to_string();
    apply_delta(
        &mut state,
        Delta::SetMarketOdds {
            event_id: "ev-bos-mia".to_string(),
            market: "player_points".to_string(),
            response,
        },
    );

    assert!(state.props.is_empty());
    let key = ("ev-bos-mia".to_string(), "player_points".to_string());
    assert!(state.market_cache.contains_key(&key));

    // Cycling back to the cached market recomputes from the cache.
    state.selected_market = "player_points".to_string();
    state.recompute_props();
    assert_eq!(state.props.len(), 4);
}

#[test]
fn market_failure_is_recorded_per_key() {
    let mut state = state_with_game("ev-bos-mia");
    let key = ("ev-bos-mia".to_string(), "player_points".to_string());
    state.market_loading = Some(key.clone());

    apply_delta(
        &mut state,
        Delta::MarketFailed {
            event_id: "ev-bos-mia".to_string(),
            market: "player_points".to_string(),
            message: "market unavailable: no odds".to_string(),
        },
    );

    assert!(state.market_loading.is_none());
    assert_eq!(
        state.current_error(),
        Some("market unavailable: no odds")
    );
}

#[test]
fn rejected_key_returns_to_setup() {
    let mut state = state_with_game("ev-bos-mia");
    apply_delta(&mut state, Delta::ApiKeyRejected);
    assert_eq!(state.screen, Screen::ApiKeySetup);
    assert!(state.api_key.is_none());
    assert!(state.key_error.is_some());
}

#[test]
fn insights_land_under_their_event_and_market() {
    let mut state = state_with_game("ev-bos-mia");
    state.insights_loading = true;
    apply_delta(
        &mut state,
        Delta::SetInsights {
            event_id: "ev-bos-mia".to_string(),
            market: "player_points".to_string(),
            insights: vec![PlayerInsight {
                player_name: "Jayson Tatum".to_string(),
                prediction: Some("MORE".to_string()),
                reason: "short juice across books".to_string(),
            }],
        },
    );
    assert!(!state.insights_loading);
    let insights = state.current_insights().expect("insights stored");
    assert_eq!(insights.len(), 1);
    assert_eq!(insights[0].player_name, "Jayson Tatum");
}

#[test]
fn opening_a_game_resets_market_and_bookmaker() {
    let mut state = state_with_game("ev-bos-mia");
    state.screen = Screen::GamesList;
    // Leftovers from browsing another game's detail screen.
    state.selected_market = "player_assists".to_string();
    state.selected_bookmaker = "fanduel".to_string();
    state.prop_scroll = 3;

    assert!(state.open_selected_game());
    assert_eq!(state.screen, Screen::GameDetail);
    assert_eq!(state.selected_market, "player_points");
    assert_eq!(state.selected_bookmaker, "draftkings");
    assert_eq!(state.prop_scroll, 0);
}

#[test]
fn opening_with_no_game_selected_is_a_no_op() {
    let mut state = AppState::new();
    state.screen = Screen::GamesList;
    assert!(!state.open_selected_game());
    assert_eq!(state.screen, Screen::GamesList);
}

#[test]
fn prop_scroll_clamps_to_the_prop_list() {
    let mut state = state_with_game("ev-bos-mia");
    let response = parse_odds_json(&read_fixture("odds_player_points.json")).expect("fixture");
    apply_delta(
        &mut state,
        Delta::SetMarketOdds {
            event_id: "ev-bos-mia".to_string(),
            market: "player_points".to_string(),
            response,
        },
    );
    assert_eq!(state.props.len(), 4);

    for _ in 0..10 {
        state.scroll_props_down();
    }
    assert_eq!(state.prop_scroll, 3);
    state.scroll_props_up();
    assert_eq!(state.prop_scroll, 2);

    // Switching market drops the offset along with the rows.
    state.cycle_market(1);
    assert_eq!(state.prop_scroll, 0);
    assert!(state.props.is_empty());
    state.scroll_props_down();
    assert_eq!(state.prop_scroll, 0);
}

#[test]
fn empty_market_discovery_falls_back_to_static_tabs() {
    let mut state = state_with_game("ev-bos-mia");
    apply_delta(
        &mut state,
        Delta::SetMarkets {
            event_id: "ev-bos-mia".to_string(),
            markets: Vec::new(),
        },
    );
    let tabs = state.markets_for_selected();
    assert!(tabs.contains(&"player_points".to_string()));
    assert_eq!(tabs.len(), 6);
}
