use crate::emr;
use crate::state::{ParlayRole, PrimaryPlayerProp};

/// How many players to highlight per role group.
const PICKS_PER_ROLE: usize = 2;

const ROLES: [ParlayRole; 3] = [ParlayRole::Anchor, ParlayRole::Support, ParlayRole::Volatile];

/// Flag up to two "notable" props per role at the selected bookmaker.
///
/// Eligibility requires a graded market lean and a fully two-sided quote at
/// the selected book. Ranking key is the EMR value plus a 5-point hook
/// penalty, ascending (lower = more stable); the sort is stable so ties keep
/// their normalizer order. Only the `notable` flag is written; it is
/// presentation metadata and nothing downstream reads it.
pub fn mark_notable(props: &mut [PrimaryPlayerProp], selected_bookmaker: &str) {
    for prop in props.iter_mut() {
        prop.notable = false;
    }

    let mut eligible: Vec<(usize, ParlayRole, u16)> = props
        .iter()
        .enumerate()
        .filter(|(_, prop)| {
            prop.lean.is_some()
                && prop
                    .offer_for(selected_bookmaker)
                    .is_some_and(|offer| offer.is_two_sided())
        })
        .map(|(idx, prop)| (idx, prop.role, stability_score(prop, selected_bookmaker)))
        .collect();
    eligible.sort_by_key(|(_, _, score)| *score);

    for role in ROLES {
        for (idx, _, _) in eligible
            .iter()
            .filter(|(_, r, _)| *r == role)
            .take(PICKS_PER_ROLE)
        {
            props[*idx].notable = true;
        }
    }
}

fn stability_score(prop: &PrimaryPlayerProp, selected_bookmaker: &str) -> u16 {
    let result = emr::calculate_emr(prop, selected_bookmaker);
    let hook_penalty = if result.is_hook { 5 } else { 0 };
    u16::from(result.value) + hook_penalty
}
