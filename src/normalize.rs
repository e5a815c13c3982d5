use std::collections::HashMap;

use crate::consensus;
use crate::odds_fetch::OddsResponse;
use crate::parlay_role;
use crate::state::{PlayerOffer, PrimaryPlayerProp};

const UNKNOWN_PLAYER: &str = "Unknown";

#[derive(Debug)]
struct LineBucket {
    line: f64,
    offers: Vec<PlayerOffer>,
}

#[derive(Debug)]
struct PropAccumulator {
    player_name: String,
    market_key: String,
    team: Option<String>,
    lines: Vec<LineBucket>,
}

/// Consolidate a raw single-market odds payload into one annotated
/// `PrimaryPlayerProp` per (player, market) pair.
///
/// Pure function of the payload: grouping is by exact line value, same-book
/// Over/Under rows merge into one offer, and the primary line is the one with
/// the most fully two-sided books. Equal counts break toward the lowest line
/// so the choice is deterministic regardless of provider ordering. Output is
/// sorted by player name ascending.
pub fn build_primary_props(response: &OddsResponse, market_key: &str) -> Vec<PrimaryPlayerProp> {
    let mut order: Vec<String> = Vec::new();
    let mut accums: HashMap<String, PropAccumulator> = HashMap::new();

    for bookie in &response.bookmakers {
        for market in &bookie.markets {
            if market.key != market_key {
                continue;
            }
            for outcome in &market.outcomes {
                let player_name = outcome
                    .description
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_PLAYER.to_string());
                let line = outcome.point.unwrap_or(0.0);
                let key = format!("{player_name}|{}", market.key);

                let accum = accums.entry(key.clone()).or_insert_with(|| {
                    order.push(key.clone());
                    PropAccumulator {
                        player_name,
                        market_key: market.key.clone(),
                        team: None,
                        lines: Vec::new(),
                    }
                });
                if accum.team.is_none() {
                    accum.team = outcome.team.clone();
                }

                let bucket = match accum.lines.iter_mut().find(|b| b.line == line) {
                    Some(bucket) => bucket,
                    None => {
                        accum.lines.push(LineBucket {
                            line,
                            offers: Vec::new(),
                        });
                        accum.lines.last_mut().expect("bucket just pushed")
                    }
                };

                // The second row from the same book fills the missing side
                // instead of creating a duplicate offer.
                match bucket.offers.iter_mut().find(|o| o.bookmaker == bookie.key) {
                    Some(offer) => match outcome.name.as_str() {
                        "Over" => offer.over_price = Some(outcome.price),
                        "Under" => offer.under_price = Some(outcome.price),
                        _ => {}
                    },
                    None => {
                        bucket.offers.push(PlayerOffer {
                            bookmaker: bookie.key.clone(),
                            bookmaker_title: bookie.title.clone(),
                            over_price: (outcome.name == "Over").then_some(outcome.price),
                            under_price: (outcome.name == "Under").then_some(outcome.price),
                        });
                    }
                }
            }
        }
    }

    let mut props: Vec<PrimaryPlayerProp> = order
        .into_iter()
        .filter_map(|key| accums.remove(&key))
        .map(annotate)
        .collect();
    props.sort_by(|a, b| a.player_name.cmp(&b.player_name));
    props
}

/// Pick the primary line, then attach consensus, lean, and role.
fn annotate(accum: PropAccumulator) -> PrimaryPlayerProp {
    let bucket = select_primary_line(accum.lines);
    let summary = consensus::estimate_consensus(&bucket.offers);

    // Role classification looks at the price of whichever side the market
    // favors; a neutral market contributes the neutral baseline.
    let avg_juice = match summary.lean {
        Some(crate::state::MarketLean::More) => summary.avg_over_price,
        Some(crate::state::MarketLean::Less) => summary.avg_under_price,
        None => consensus::NEUTRAL_PRICE,
    };
    let role = parlay_role::classify(
        bucket.line,
        &accum.market_key,
        summary.strength,
        avg_juice,
    );

    PrimaryPlayerProp {
        player_name: accum.player_name,
        market_key: accum.market_key,
        line: bucket.line,
        team: accum.team,
        offers: bucket.offers,
        consensus: summary.strength,
        role,
        lean: summary.lean,
        avg_over_price: summary.avg_over_price,
        avg_under_price: summary.avg_under_price,
        notable: false,
    }
}

fn select_primary_line(mut lines: Vec<LineBucket>) -> LineBucket {
    if lines.is_empty() {
        return LineBucket {
            line: 0.0,
            offers: Vec::new(),
        };
    }

    let mut best_idx = 0;
    let mut best_count = two_sided_count(&lines[0]);
    for (idx, bucket) in lines.iter().enumerate().skip(1) {
        let count = two_sided_count(bucket);
        if count > best_count || (count == best_count && bucket.line < lines[best_idx].line) {
            best_idx = idx;
            best_count = count;
        }
    }
    lines.swap_remove(best_idx)
}

fn two_sided_count(bucket: &LineBucket) -> usize {
    bucket.offers.iter().filter(|o| o.is_two_sided()).count()
}
