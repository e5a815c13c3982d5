use crate::consensus::NEUTRAL_PRICE;
use crate::state::PrimaryPlayerProp;

const SHRINK_FACTOR: f64 = 0.65;
const EMR_FLOOR: f64 = 0.10;
const EMR_CEIL: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Lower,
    Moderate,
    Elevated,
    High,
}

impl RiskLevel {
    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Lower => "Lower Miss Risk",
            RiskLevel::Moderate => "Moderate Miss Risk",
            RiskLevel::Elevated => "Elevated Miss Risk",
            RiskLevel::High => "High Miss Risk",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmrResult {
    /// Estimated miss risk as an integer percent, always within [10, 85].
    pub value: u8,
    pub level: RiskLevel,
    pub is_hook: bool,
}

/// Estimated Miss Risk for one prop at one bookmaker. Total: a missing offer
/// or missing side falls back to the -110 neutral baseline instead of failing.
pub fn calculate_emr(prop: &PrimaryPlayerProp, bookmaker_key: &str) -> EmrResult {
    let odds = prop
        .offer_for(bookmaker_key)
        .and_then(|offer| offer.over_price)
        .unwrap_or(NEUTRAL_PRICE);

    let implied_prob = if odds < 0.0 {
        odds.abs() / (odds.abs() + 100.0)
    } else {
        100.0 / (odds + 100.0)
    };
    let base = 1.0 - implied_prob;

    // Half-point lines cannot push, which costs the bettor the tie outcome.
    let is_hook = line_is_hook(prop.line);
    let hook_adjustment = if is_hook { 0.04 } else { 0.0 };

    let disagreement_adjustment = market_disagreement(&over_prices(prop));

    // Low points lines belong to bench/role players with volatile minutes.
    let role_adjustment = if prop.market_key.contains("points") {
        if prop.line < 10.0 {
            0.06
        } else if prop.line < 18.0 {
            0.03
        } else {
            0.0
        }
    } else {
        0.0
    };

    let raw = base + hook_adjustment + disagreement_adjustment + role_adjustment;
    let shrunk = 0.5 + SHRINK_FACTOR * (raw - 0.5);
    let final_emr = shrunk.clamp(EMR_FLOOR, EMR_CEIL);

    let level = if final_emr < 0.40 {
        RiskLevel::Lower
    } else if final_emr <= 0.55 {
        RiskLevel::Moderate
    } else if final_emr <= 0.65 {
        RiskLevel::Elevated
    } else {
        RiskLevel::High
    };

    EmrResult {
        value: (final_emr * 100.0).round() as u8,
        level,
        is_hook,
    }
}

/// Combined miss rate for a parlay built from individual EMR percentages.
pub fn parlay_miss_rate(emrs: &[u8]) -> u8 {
    if emrs.is_empty() {
        return 0;
    }
    let hit_prob: f64 = emrs
        .iter()
        .map(|emr| 1.0 - f64::from(*emr) / 100.0)
        .product();
    ((1.0 - hit_prob) * 100.0).round() as u8
}

pub fn line_is_hook(line: f64) -> bool {
    line.fract() != 0.0
}

fn over_prices(prop: &PrimaryPlayerProp) -> Vec<f64> {
    prop.offers.iter().filter_map(|o| o.over_price).collect()
}

/// Spread of over prices across books at the primary line. A wide spread
/// means the books disagree about the true probability.
fn market_disagreement(over_prices: &[f64]) -> f64 {
    if over_prices.len() < 2 {
        return 0.0;
    }
    let min = over_prices.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = over_prices
        .iter()
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max);
    let spread = (max - min).abs();
    if spread < 10.0 {
        0.01
    } else if spread < 25.0 {
        0.03
    } else {
        0.06
    }
}
