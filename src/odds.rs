//! Average-odds imputation from matches with a similar rank pairing.
//!
//! The reference table is the whole dataset, later matches included. Rows are therefore
//! filled with odds that were not known at the time they were played.

use rayon::prelude::*;
use tracing::{info, warn};

use crate::record::MatchRecord;

/// Rank-distance search window: starts at `start`, grows by `step`, gives up past `max`.
///
/// A non-positive step searches the start window only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OddsWindow {
    pub start: f64,
    pub step: f64,
    pub max: f64,
}

impl Default for OddsWindow {
    fn default() -> Self {
        Self {
            start: 10.0,
            step: 10.0,
            max: 100.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OddsFill {
    pub records: Vec<MatchRecord>,
    pub filled: usize,
    pub unresolved: usize,
}

fn within(target: f64, candidate: f64, w: f64) -> bool {
    (target - w) < candidate && candidate < (target + w)
}

/// Mean average odds of the rows whose ranks both lie strictly within the first
/// non-empty window around the target's ranks.
///
/// Only rows carrying both ranks and both average odds count as comparables.
/// Returns `None` when the target has no ranks or no window up to `max` finds anything.
pub fn find_odds_for(
    target: &MatchRecord,
    reference: &[MatchRecord],
    window: OddsWindow,
) -> Option<(f64, f64)> {
    let (Some(rank0), Some(rank1)) = (target.rank0, target.rank1) else {
        return None;
    };

    let mut w = window.start;
    while w <= window.max {
        let mut sum0 = 0.0;
        let mut sum1 = 0.0;
        let mut n = 0usize;
        for m in reference {
            let (Some(r0), Some(r1), Some(a0), Some(a1)) = (m.rank0, m.rank1, m.avg0, m.avg1)
            else {
                continue;
            };
            if within(rank0, r0, w) && within(rank1, r1, w) {
                sum0 += a0;
                sum1 += a1;
                n += 1;
            }
        }
        if n > 0 {
            return Some((sum0 / n as f64, sum1 / n as f64));
        }
        // Zero, negative or NaN steps, or a step lost to rounding, cannot widen further.
        let next = w + window.step;
        if next.is_nan() || next <= w {
            break;
        }
        w = next;
    }
    None
}

/// Copies `matches`, filling the missing average odds of each row.
///
/// Lookups run against the unfilled snapshot, so filled values never feed other rows.
/// Present odds are kept; only the missing slot(s) take the imputed mean.
pub fn fill_missing_odds(matches: &[MatchRecord], window: OddsWindow) -> OddsFill {
    let imputed = matches
        .par_iter()
        .map(|m| {
            if m.has_odds() {
                None
            } else {
                Some(find_odds_for(m, matches, window))
            }
        })
        .collect::<Vec<_>>();

    let mut filled = 0usize;
    let mut unresolved = 0usize;
    let mut records = Vec::with_capacity(matches.len());
    for (m, found) in matches.iter().zip(imputed) {
        let mut row = m.clone();
        match found {
            None => {}
            Some(Some((o0, o1))) => {
                row.avg0 = row.avg0.or(Some(o0));
                row.avg1 = row.avg1.or(Some(o1));
                filled += 1;
            }
            Some(None) => unresolved += 1,
        }
        records.push(row);
    }

    info!(rows = matches.len(), filled, unresolved, "odds imputation done");
    if unresolved > 0 {
        warn!(unresolved, "rows left without odds: no comparable ranks within window");
    }

    OddsFill {
        records,
        filled,
        unresolved,
    }
}
