use std::fs;
use std::path::PathBuf;

use props_terminal::emr::{calculate_emr, parlay_miss_rate};
use props_terminal::normalize::build_primary_props;
use props_terminal::odds_fetch::{parse_odds_json, OddsResponse};
use props_terminal::rank::mark_notable;
use props_terminal::state::{ConsensusStrength, MarketLean, ParlayRole, PrimaryPlayerProp};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn fixture_response() -> OddsResponse {
    parse_odds_json(&read_fixture("odds_player_points.json")).expect("fixture should parse")
}

fn fixture_props() -> Vec<PrimaryPlayerProp> {
    build_primary_props(&fixture_response(), "player_points")
}

fn prop_by_name<'a>(props: &'a [PrimaryPlayerProp], name: &str) -> &'a PrimaryPlayerProp {
    props
        .iter()
        .find(|p| p.player_name == name)
        .unwrap_or_else(|| panic!("missing prop for {name}"))
}

#[test]
fn normalizes_one_prop_per_player_sorted_by_name() {
    let props = fixture_props();
    let names: Vec<&str> = props.iter().map(|p| p.player_name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Derrick White",
            "Jaylen Brown",
            "Jayson Tatum",
            "Payton Pritchard"
        ]
    );
}

#[test]
fn three_aligned_books_make_a_high_consensus_volatile_star() {
    let props = fixture_props();
    let tatum = prop_by_name(&props, "Jayson Tatum");
    assert_eq!(tatum.line, 27.5);
    assert_eq!(tatum.offers.len(), 3);
    assert_eq!(tatum.consensus, ConsensusStrength::High);
    assert_eq!(tatum.lean, Some(MarketLean::More));
    // A 27.5 points line sits above the volatile threshold.
    assert_eq!(tatum.role, ParlayRole::Volatile);
    assert_eq!(tatum.team.as_deref(), Some("Boston Celtics"));
}

#[test]
fn primary_line_follows_the_two_sided_majority() {
    let props = fixture_props();
    let brown = prop_by_name(&props, "Jaylen Brown");
    // Two books price 24.5 fully, BetMGM alone prices 23.5.
    assert_eq!(brown.line, 24.5);
    assert_eq!(brown.offers.len(), 2);
    assert_eq!(brown.consensus, ConsensusStrength::Medium);
    assert_eq!(brown.lean, Some(MarketLean::Less));
    assert_eq!(brown.role, ParlayRole::Support);
}

#[test]
fn tied_line_counts_break_toward_the_lowest_line() {
    let props = fixture_props();
    let pritchard = prop_by_name(&props, "Payton Pritchard");
    // DraftKings quotes 8.5 and FanDuel quotes 9.5, one two-sided book each.
    assert_eq!(pritchard.line, 8.5);
    assert_eq!(pritchard.offers.len(), 1);
    assert_eq!(pritchard.consensus, ConsensusStrength::Low);
    assert_eq!(pritchard.role, ParlayRole::Volatile);
}

#[test]
fn one_sided_quotes_never_grade_a_lean() {
    let props = fixture_props();
    let white = prop_by_name(&props, "Derrick White");
    assert_eq!(white.line, 16.5);
    assert_eq!(white.lean, None);
    assert!(white.offers.iter().all(|o| o.under_price.is_none()));
}

#[test]
fn notable_marking_caps_per_role_and_skips_ineligible() {
    let mut props = fixture_props();
    mark_notable(&mut props, "draftkings");

    assert!(prop_by_name(&props, "Jayson Tatum").notable);
    assert!(prop_by_name(&props, "Jaylen Brown").notable);
    assert!(prop_by_name(&props, "Payton Pritchard").notable);
    // No lean and no two-sided quote: never notable.
    assert!(!prop_by_name(&props, "Derrick White").notable);
}

#[test]
fn switching_bookmaker_changes_eligibility() {
    let mut props = fixture_props();
    // BetMGM has no offer at Pritchard's or Brown's primary lines.
    mark_notable(&mut props, "betmgm");
    assert!(prop_by_name(&props, "Jayson Tatum").notable);
    assert!(!prop_by_name(&props, "Jaylen Brown").notable);
    assert!(!prop_by_name(&props, "Payton Pritchard").notable);
}

#[test]
fn emr_tracks_line_shape_and_book_agreement() {
    let props = fixture_props();
    let tatum = calculate_emr(prop_by_name(&props, "Jayson Tatum"), "draftkings");
    let pritchard = calculate_emr(prop_by_name(&props, "Payton Pritchard"), "draftkings");

    assert_eq!(tatum.value, 51);
    assert!(tatum.is_hook);
    // The thin 8.5 line carries the bench-role adjustment on top of the hook.
    assert_eq!(pritchard.value, 55);
    assert!(pritchard.value > tatum.value);
}

#[test]
fn parlay_miss_rate_over_the_notable_legs() {
    let mut props = fixture_props();
    mark_notable(&mut props, "draftkings");
    let legs: Vec<u8> = props
        .iter()
        .filter(|p| p.notable)
        .map(|p| calculate_emr(p, "draftkings").value)
        .collect();
    assert_eq!(legs.len(), 3);
    let combined = parlay_miss_rate(&legs);
    // Three legs around 50% each compound to a far riskier ticket.
    assert!(combined > *legs.iter().max().expect("non-empty"));
    assert_eq!(combined, 89);
}
