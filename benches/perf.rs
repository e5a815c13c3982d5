use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use props_terminal::emr::{calculate_emr, parlay_miss_rate};
use props_terminal::normalize::build_primary_props;
use props_terminal::odds_fetch::{parse_events_json, parse_odds_json, OddsResponse};
use props_terminal::rank::mark_notable;

fn bench_events_parse(c: &mut Criterion) {
    c.bench_function("events_parse", |b| {
        b.iter(|| {
            let games = parse_events_json(black_box(EVENTS_JSON)).unwrap();
            black_box(games.len());
        })
    });
}

fn bench_odds_parse(c: &mut Criterion) {
    c.bench_function("odds_parse", |b| {
        b.iter(|| {
            let resp = parse_odds_json(black_box(ODDS_JSON)).unwrap();
            black_box(resp.bookmakers.len());
        })
    });
}

fn bench_normalize(c: &mut Criterion) {
    let resp = large_response();
    c.bench_function("normalize", |b| {
        b.iter(|| {
            let props = build_primary_props(black_box(&resp), "player_points");
            black_box(props.len());
        })
    });
}

fn bench_normalize_rank_and_score(c: &mut Criterion) {
    let resp = large_response();
    c.bench_function("normalize_rank_and_score", |b| {
        b.iter(|| {
            let mut props = build_primary_props(black_box(&resp), "player_points");
            mark_notable(&mut props, "draftkings");
            let legs: Vec<u8> = props
                .iter()
                .filter(|p| p.notable)
                .map(|p| calculate_emr(p, "draftkings").value)
                .collect();
            black_box(parlay_miss_rate(&legs));
        })
    });
}

/// Same payload shape as the fixture, scaled to a realistic slate: the base
/// roster repeated with distinct player names across all three books.
fn large_response() -> OddsResponse {
    let mut resp = parse_odds_json(ODDS_JSON).unwrap();
    for bookie in &mut resp.bookmakers {
        for market in &mut bookie.markets {
            let base = market.outcomes.clone();
            for copy in 1..20 {
                for outcome in &base {
                    let mut outcome = outcome.clone();
                    if let Some(name) = &outcome.description {
                        outcome.description = Some(format!("{name} {copy}"));
                    }
                    market.outcomes.push(outcome);
                }
            }
        }
    }
    resp
}

criterion_group!(
    perf,
    bench_events_parse,
    bench_odds_parse,
    bench_normalize,
    bench_normalize_rank_and_score
);
criterion_main!(perf);

static EVENTS_JSON: &str = include_str!("../tests/fixtures/events.json");
static ODDS_JSON: &str = include_str!("../tests/fixtures/odds_player_points.json");
