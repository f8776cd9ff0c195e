//! Weekly time-slot model and the lock-union algebra.
//!
//! Slots are logical labels, not absolute timestamps: a [`TimeSlot`] pairs a
//! weekday with one or more time-of-day labels (e.g. `"09:00-10:00"`). The
//! engine never reconciles timezones.
//!
//! Duplicate handling: slots are normalized (deduped, sorted) on write at
//! intake, and [`merge_slots`] dedupes again on every read so that legacy
//! rows with duplicate days or labels cannot poison a mentor's availability.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Weekday
// ---------------------------------------------------------------------------

/// Day-of-week label used by availability slots.
///
/// Variants serialize with their capitalized English names (`"Monday"`),
/// matching the wire format used by clients.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TimeSlot
// ---------------------------------------------------------------------------

/// One weekday plus the time-of-day labels booked or available on it.
///
/// Within a slot list each day appears at most once by convention; readers
/// must not rely on that and should merge through [`merge_slots`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub day: Weekday,
    pub time_slots: Vec<String>,
}

impl TimeSlot {
    pub fn new(day: Weekday, time_slots: Vec<String>) -> Self {
        Self { day, time_slots }
    }

    /// Dedupe and sort the time-of-day labels in place.
    pub fn normalize(&mut self) {
        self.time_slots.sort();
        self.time_slots.dedup();
    }

    /// True when the slot carries no time-of-day labels (or only empty ones).
    pub fn is_empty(&self) -> bool {
        self.time_slots.iter().all(|s| s.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// Lock union
// ---------------------------------------------------------------------------

/// Merge slot lists into one deduplicated entry per day.
///
/// For each day appearing anywhere in the input, the time-of-day labels of
/// all entries for that day are unioned, deduped, and sorted. Output entries
/// are ordered Monday through Sunday. Empty labels are dropped.
///
/// This is the Slot Lock Calculator's reduce step: feeding it the flattened
/// slots of a mentor's in-force engagements and accepted requests yields the
/// day-by-day set of locked slots.
pub fn merge_slots<I>(sources: I) -> Vec<TimeSlot>
where
    I: IntoIterator<Item = TimeSlot>,
{
    let mut by_day: BTreeMap<Weekday, Vec<String>> = BTreeMap::new();

    for slot in sources {
        let labels = by_day.entry(slot.day).or_default();
        for label in slot.time_slots {
            if !label.trim().is_empty() {
                labels.push(label);
            }
        }
    }

    by_day
        .into_iter()
        .filter_map(|(day, mut labels)| {
            labels.sort();
            labels.dedup();
            if labels.is_empty() {
                None
            } else {
                Some(TimeSlot::new(day, labels))
            }
        })
        .collect()
}

/// True when `wanted` claims any (day, label) pair already present in `locked`.
pub fn overlaps(locked: &[TimeSlot], wanted: &TimeSlot) -> bool {
    locked.iter().any(|held| {
        held.day == wanted.day
            && held
                .time_slots
                .iter()
                .any(|label| wanted.time_slots.contains(label))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(day: Weekday, labels: &[&str]) -> TimeSlot {
        TimeSlot::new(day, labels.iter().map(|s| s.to_string()).collect())
    }

    // -----------------------------------------------------------------------
    // merge_slots
    // -----------------------------------------------------------------------

    #[test]
    fn merge_unions_labels_for_same_day() {
        let merged = merge_slots(vec![
            slot(Weekday::Monday, &["09:00-10:00"]),
            slot(Weekday::Monday, &["14:00-15:00"]),
        ]);
        assert_eq!(
            merged,
            vec![slot(Weekday::Monday, &["09:00-10:00", "14:00-15:00"])]
        );
    }

    #[test]
    fn merge_keeps_distinct_days_separate() {
        let merged = merge_slots(vec![
            slot(Weekday::Wednesday, &["10:00-11:00"]),
            slot(Weekday::Monday, &["09:00-10:00"]),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].day, Weekday::Monday);
        assert_eq!(merged[1].day, Weekday::Wednesday);
    }

    #[test]
    fn merge_dedupes_repeated_labels() {
        let merged = merge_slots(vec![
            slot(Weekday::Friday, &["09:00-10:00", "09:00-10:00"]),
            slot(Weekday::Friday, &["09:00-10:00"]),
        ]);
        assert_eq!(merged, vec![slot(Weekday::Friday, &["09:00-10:00"])]);
    }

    #[test]
    fn merge_drops_empty_labels_and_empty_days() {
        let merged = merge_slots(vec![
            slot(Weekday::Tuesday, &["", "  "]),
            slot(Weekday::Thursday, &["11:00-12:00", ""]),
        ]);
        assert_eq!(merged, vec![slot(Weekday::Thursday, &["11:00-12:00"])]);
    }

    #[test]
    fn merge_of_nothing_is_empty() {
        assert!(merge_slots(Vec::<TimeSlot>::new()).is_empty());
    }

    // -----------------------------------------------------------------------
    // overlaps
    // -----------------------------------------------------------------------

    #[test]
    fn overlap_requires_same_day_and_shared_label() {
        let locked = vec![slot(Weekday::Monday, &["09:00-10:00"])];

        assert!(overlaps(&locked, &slot(Weekday::Monday, &["09:00-10:00"])));
        assert!(!overlaps(&locked, &slot(Weekday::Monday, &["14:00-15:00"])));
        assert!(!overlaps(&locked, &slot(Weekday::Tuesday, &["09:00-10:00"])));
    }

    #[test]
    fn overlap_detects_partial_intersection() {
        let locked = vec![slot(Weekday::Monday, &["09:00-10:00", "10:00-11:00"])];
        let wanted = slot(Weekday::Monday, &["10:00-11:00", "16:00-17:00"]);
        assert!(overlaps(&locked, &wanted));
    }

    // -----------------------------------------------------------------------
    // normalize
    // -----------------------------------------------------------------------

    #[test]
    fn normalize_sorts_and_dedupes() {
        let mut s = slot(Weekday::Monday, &["14:00-15:00", "09:00-10:00", "14:00-15:00"]);
        s.normalize();
        assert_eq!(s.time_slots, vec!["09:00-10:00", "14:00-15:00"]);
    }

    #[test]
    fn empty_slot_detection() {
        assert!(slot(Weekday::Monday, &[]).is_empty());
        assert!(slot(Weekday::Monday, &["", " "]).is_empty());
        assert!(!slot(Weekday::Monday, &["09:00-10:00"]).is_empty());
    }
}
