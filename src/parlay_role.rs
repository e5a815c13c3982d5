use crate::state::{ConsensusStrength, ParlayRole};

/// Structural role of a leg in a parlay.
///
/// Anchor stabilizes the ticket: low line, strong agreement, moderate juice.
/// Volatile is the opposite: thin agreement, high lines, or aggressive
/// pricing. Everything else is Support. The Volatile checks run first and win
/// over an otherwise anchor-qualifying prop.
pub fn classify(
    line: f64,
    market_key: &str,
    consensus: ConsensusStrength,
    avg_juice: f64,
) -> ParlayRole {
    let is_points = market_key.contains("points");
    let is_aggressive_price = avg_juice > 120.0 || avg_juice < -180.0;

    if consensus == ConsensusStrength::Low
        || (is_points && line > 26.0)
        || (!is_points && line > 10.0)
        || is_aggressive_price
    {
        return ParlayRole::Volatile;
    }

    if consensus == ConsensusStrength::High
        && ((is_points && line < 16.0) || (!is_points && line < 5.0))
        && avg_juice.abs() <= 150.0
    {
        return ParlayRole::Anchor;
    }

    ParlayRole::Support
}
