use crate::state::{ConsensusStrength, MarketLean, PlayerOffer};

/// Neutral American-odds baseline (52.4% implied) used whenever a side has no
/// quotes at all.
pub const NEUTRAL_PRICE: f64 = -110.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsensusSummary {
    pub strength: ConsensusStrength,
    pub lean: Option<MarketLean>,
    pub avg_over_price: f64,
    pub avg_under_price: f64,
}

/// Aggregate market direction and agreement across the books quoting one
/// primary line. Total over any offer list, including an empty one.
pub fn estimate_consensus(offers: &[PlayerOffer]) -> ConsensusSummary {
    if offers.is_empty() {
        return ConsensusSummary {
            strength: ConsensusStrength::Low,
            lean: None,
            avg_over_price: NEUTRAL_PRICE,
            avg_under_price: NEUTRAL_PRICE,
        };
    }

    let over_prices: Vec<f64> = offers.iter().filter_map(|o| o.over_price).collect();
    let under_prices: Vec<f64> = offers.iter().filter_map(|o| o.under_price).collect();

    let avg_over_price = mean(&over_prices).unwrap_or(NEUTRAL_PRICE);
    let avg_under_price = mean(&under_prices).unwrap_or(NEUTRAL_PRICE);

    // Lower American price = shorter payout = the market favors that side.
    // With only one side quoted there is no comparison to make.
    let lean = if over_prices.is_empty() || under_prices.is_empty() {
        None
    } else if avg_over_price < avg_under_price {
        Some(MarketLean::More)
    } else {
        Some(MarketLean::Less)
    };

    let strength = match offers.len() {
        0 | 1 => ConsensusStrength::Low,
        2 => ConsensusStrength::Medium,
        _ => {
            if juice_aligned(&over_prices, &under_prices) {
                ConsensusStrength::High
            } else {
                ConsensusStrength::Medium
            }
        }
    };

    ConsensusSummary {
        strength,
        lean,
        avg_over_price,
        avg_under_price,
    }
}

/// Unanimous favorite pricing: every book quoting an over favors the over, or
/// every book quoting an under favors the under.
fn juice_aligned(over_prices: &[f64], under_prices: &[f64]) -> bool {
    let all_over_favored =
        !over_prices.is_empty() && over_prices.iter().all(|price| *price < 0.0);
    let all_under_favored =
        !under_prices.is_empty() && under_prices.iter().all(|price| *price < 0.0);
    all_over_favored || all_under_favored
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(book: &str, over: Option<f64>, under: Option<f64>) -> PlayerOffer {
        PlayerOffer {
            bookmaker: book.to_string(),
            bookmaker_title: book.to_string(),
            over_price: over,
            under_price: under,
        }
    }

    #[test]
    fn empty_offers_yield_neutral_baseline() {
        let summary = estimate_consensus(&[]);
        assert_eq!(summary.strength, ConsensusStrength::Low);
        assert_eq!(summary.lean, None);
        assert_eq!(summary.avg_over_price, NEUTRAL_PRICE);
        assert_eq!(summary.avg_under_price, NEUTRAL_PRICE);
    }

    #[test]
    fn single_book_is_low_consensus() {
        let offers = vec![offer("dk", Some(-115.0), Some(-105.0))];
        let summary = estimate_consensus(&offers);
        assert_eq!(summary.strength, ConsensusStrength::Low);
        assert_eq!(summary.lean, Some(MarketLean::More));
    }

    #[test]
    fn two_books_are_medium() {
        let offers = vec![
            offer("dk", Some(-110.0), Some(-110.0)),
            offer("fd", Some(-112.0), Some(-108.0)),
        ];
        assert_eq!(
            estimate_consensus(&offers).strength,
            ConsensusStrength::Medium
        );
    }

    #[test]
    fn three_aligned_books_are_high() {
        let offers = vec![
            offer("dk", Some(-115.0), Some(-105.0)),
            offer("fd", Some(-118.0), Some(-102.0)),
            offer("mgm", Some(-112.0), Some(-108.0)),
        ];
        assert_eq!(
            estimate_consensus(&offers).strength,
            ConsensusStrength::High
        );
    }

    #[test]
    fn three_split_books_are_medium() {
        // One book prices the over as a dog and one under is also positive, so
        // neither side is unanimously favored.
        let offers = vec![
            offer("dk", Some(-115.0), Some(105.0)),
            offer("fd", Some(110.0), Some(-120.0)),
            offer("mgm", Some(-112.0), Some(108.0)),
        ];
        assert_eq!(
            estimate_consensus(&offers).strength,
            ConsensusStrength::Medium
        );
    }

    #[test]
    fn lean_follows_the_cheaper_side() {
        let more = vec![offer("dk", Some(-130.0), Some(110.0))];
        let less = vec![offer("dk", Some(105.0), Some(-125.0))];
        assert_eq!(estimate_consensus(&more).lean, Some(MarketLean::More));
        assert_eq!(estimate_consensus(&less).lean, Some(MarketLean::Less));
    }

    #[test]
    fn one_sided_quotes_leave_lean_neutral() {
        let offers = vec![
            offer("dk", Some(-115.0), None),
            offer("fd", Some(-110.0), None),
        ];
        let summary = estimate_consensus(&offers);
        assert_eq!(summary.lean, None);
        assert_eq!(summary.avg_under_price, NEUTRAL_PRICE);
    }
}
