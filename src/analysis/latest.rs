//! Latest-value reduction.
//!
//! Per group, keep the observation with the greatest date. On a tie the
//! first one encountered in input order wins. Undated rows are ignored.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::domain::{Observation, Summary};

/// The most recent observation overall, if any.
pub fn latest<'a, I>(records: I) -> Option<&'a Observation>
where
    I: IntoIterator<Item = &'a Observation>,
{
    let mut best: Option<&Observation> = None;
    for r in records {
        let Some(date) = r.date else { continue };
        if best.and_then(|b| b.date).is_none_or(|d| date > d) {
            best = Some(r);
        }
    }
    best
}

/// The most recent observation per key. Rows for which `key` returns `None`
/// are skipped.
pub fn latest_by<'a, I, K, F>(records: I, mut key: F) -> BTreeMap<K, &'a Observation>
where
    I: IntoIterator<Item = &'a Observation>,
    K: Ord,
    F: FnMut(&Observation) -> Option<K>,
{
    let mut out: BTreeMap<K, &Observation> = BTreeMap::new();
    for r in records {
        let Some(date) = r.date else { continue };
        let Some(k) = key(r) else { continue };
        match out.entry(k) {
            Entry::Vacant(slot) => {
                slot.insert(r);
            }
            Entry::Occupied(mut slot) => {
                if slot.get().date.is_none_or(|d| date > d) {
                    slot.insert(r);
                }
            }
        }
    }
    out
}

/// Latest observation per ISO code (map coloring).
pub fn latest_by_iso<'a, I>(records: I) -> BTreeMap<String, &'a Observation>
where
    I: IntoIterator<Item = &'a Observation>,
{
    latest_by(records, |r| r.iso_code.clone())
}

/// Latest observation per calendar year.
pub fn latest_by_year<'a, I>(records: I) -> BTreeMap<i32, &'a Observation>
where
    I: IntoIterator<Item = &'a Observation>,
{
    latest_by(records, Observation::year)
}

/// Summary tiles for a filtered window; all zeros when the window is empty.
pub fn summarize<'a, I>(records: I) -> Summary
where
    I: IntoIterator<Item = &'a Observation>,
{
    latest(records).map(Summary::from_observation).unwrap_or_default()
}
