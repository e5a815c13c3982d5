use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use chrono::{Duration as ChronoDuration, Utc};
use rand::Rng;
use rand::rngs::ThreadRng;

use crate::odds_fetch::{BookmakerQuote, OddsResponse, RawMarket, RawOutcome};
use crate::insights::PlayerInsight;
use crate::state::{Delta, Game, ProviderCommand};

const FAKE_BOOKS: [(&str, &str); 3] = [
    ("draftkings", "DraftKings"),
    ("fanduel", "FanDuel"),
    ("betmgm", "BetMGM"),
];

const FAKE_PLAYERS: [&str; 6] = [
    "A. Stone",
    "C. Hale",
    "E. Pike",
    "J. Nox",
    "K. Rook",
    "T. Vale",
];

const FAKE_GAMES: [(&str, &str); 4] = [
    ("Boston Celtics", "Miami Heat"),
    ("Denver Nuggets", "Phoenix Suns"),
    ("Milwaukee Bucks", "New York Knicks"),
    ("Golden State Warriors", "Dallas Mavericks"),
];

/// Offline provider for demo runs: answers every command with synthetic data
/// so the whole pipeline and UI work without keys or network.
pub fn spawn_fake_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let mut rng = rand::thread_rng();
        let _ = tx.send(Delta::Log("[INFO] Demo feed active (PROPS_DEMO=1)".to_string()));
        for cmd in cmd_rx {
            match cmd {
                ProviderCommand::FetchGames { .. } => {
                    let _ = tx.send(Delta::SetGames(fake_games()));
                }
                ProviderCommand::FetchMarkets { event_id, .. } => {
                    let markets = vec![
                        "player_points".to_string(),
                        "player_assists".to_string(),
                        "player_rebounds".to_string(),
                        "player_threes".to_string(),
                    ];
                    let _ = tx.send(Delta::SetMarkets { event_id, markets });
                }
                ProviderCommand::FetchMarketOdds {
                    event_id, market, ..
                } => {
                    let response = fake_odds_response(&mut rng, &event_id, &market);
                    let _ = tx.send(Delta::SetMarketOdds {
                        event_id,
                        market,
                        response,
                    });
                }
                ProviderCommand::GenerateInsights {
                    event_id,
                    market,
                    props,
                    ..
                } => {
                    let insights = props
                        .iter()
                        .map(|prop| PlayerInsight {
                            player_name: prop.player_name.clone(),
                            prediction: Some(
                                prop.lean
                                    .map(|l| l.label())
                                    .unwrap_or("MORE")
                                    .to_string(),
                            ),
                            reason: "Demo insight: follows the market lean".to_string(),
                        })
                        .collect();
                    let _ = tx.send(Delta::SetInsights {
                        event_id,
                        market,
                        insights,
                    });
                }
            }
        }
    });
}

fn fake_games() -> Vec<Game> {
    FAKE_GAMES
        .iter()
        .enumerate()
        .map(|(idx, (home, away))| Game {
            id: format!("demo-{idx}"),
            home_team: home.to_string(),
            away_team: away.to_string(),
            commence_time: (Utc::now() + ChronoDuration::hours(3 + idx as i64 * 2))
                .format("%Y-%m-%dT%H:%M:%SZ")
                .to_string(),
        })
        .collect()
}

fn fake_odds_response(rng: &mut ThreadRng, event_id: &str, market: &str) -> OddsResponse {
    let (home_team, away_team) = FAKE_GAMES
        .get(
            event_id
                .strip_prefix("demo-")
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(0),
        )
        .copied()
        .unwrap_or(FAKE_GAMES[0]);

    let lines: Vec<f64> = FAKE_PLAYERS
        .iter()
        .map(|_| fake_line(rng, market))
        .collect();

    let bookmakers = FAKE_BOOKS
        .iter()
        .map(|(key, title)| {
            let mut outcomes = Vec::new();
            for (player, line) in FAKE_PLAYERS.iter().zip(lines.iter()) {
                // Books mostly agree on the line; one occasionally shades it
                // by half a point or drops a side, which exercises the
                // primary-line selection and one-sided handling.
                let line = if rng.gen_bool(0.15) { line + 0.5 } else { *line };
                let over = -110.0 - rng.gen_range(0..15) as f64;
                let under = -220.0 - over;
                outcomes.push(fake_outcome("Over", player, over, line, home_team));
                if rng.gen_bool(0.9) {
                    outcomes.push(fake_outcome("Under", player, under, line, home_team));
                }
            }
            BookmakerQuote {
                key: key.to_string(),
                title: title.to_string(),
                markets: vec![RawMarket {
                    key: market.to_string(),
                    last_update: None,
                    outcomes,
                }],
            }
        })
        .collect();

    OddsResponse {
        id: event_id.to_string(),
        sport_key: Some("basketball_nba".to_string()),
        commence_time: None,
        home_team: home_team.to_string(),
        away_team: away_team.to_string(),
        bookmakers,
    }
}

fn fake_line(rng: &mut ThreadRng, market: &str) -> f64 {
    let base = if market.contains("points") {
        rng.gen_range(8..30) as f64
    } else if market.contains("threes") {
        rng.gen_range(1..5) as f64
    } else {
        rng.gen_range(2..12) as f64
    };
    if rng.gen_bool(0.6) { base + 0.5 } else { base }
}

fn fake_outcome(name: &str, player: &str, price: f64, line: f64, team: &str) -> RawOutcome {
    RawOutcome {
        name: name.to_string(),
        description: Some(player.to_string()),
        price,
        point: Some(line),
        team: Some(team.to_string()),
    }
}
