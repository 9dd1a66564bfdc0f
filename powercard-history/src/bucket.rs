use std::{
    collections::BTreeMap,
    ops::{AddAssign, RangeBounds},
};

use chrono::{DateTime, Local};
use powercard_quantities::Watts;
use serde::{Deserialize, Serialize};

use crate::hour::HourStart;

/// Running total of the samples recorded within one hour.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[must_use]
pub struct HourBucket {
    pub sum: Watts,
    pub count: u32,
}

impl HourBucket {
    /// Add the value, unless the sum would stop being finite or the count would overflow.
    #[must_use]
    pub fn push(&mut self, value: Watts) -> bool {
        let sum = self.sum + value;
        match self.count.checked_add(1) {
            Some(count) if sum.is_finite() => {
                self.sum = sum;
                self.count = count;
                true
            }
            _ => false,
        }
    }

    /// Mean of the samples, `None` when there are none or the merged sum is no longer finite.
    pub fn average(self) -> Option<Watts> {
        if self.count == 0 || !self.sum.is_finite() {
            None
        } else {
            Some(self.sum / f64::from(self.count))
        }
    }
}

impl AddAssign for HourBucket {
    fn add_assign(&mut self, rhs: Self) {
        self.sum += rhs.sum;
        self.count = self.count.saturating_add(rhs.count);
    }
}

/// Hourly buckets of a single entity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
#[must_use]
pub struct EntityHistory(BTreeMap<HourStart, HourBucket>);

impl EntityHistory {
    /// Add the value to the hour's bucket and tell whether it was accepted.
    #[must_use]
    pub fn push(&mut self, hour: HourStart, value: Watts) -> bool {
        self.0.entry(hour).or_default().push(value)
    }

    /// Bucket for the hour, if any sample landed in it.
    pub fn get(&self, hour: HourStart) -> Option<HourBucket> {
        self.0.get(&hour).copied().filter(|bucket| bucket.count != 0)
    }

    /// Merge all buckets whose hour start falls within the range.
    pub fn total(&self, hours: impl RangeBounds<HourStart>) -> HourBucket {
        let mut total = HourBucket::default();
        for bucket in self.0.range(hours).map(|(_, bucket)| *bucket) {
            total += bucket;
        }
        total
    }

    /// Drop the buckets which started strictly before the cutoff and return how many were dropped.
    pub fn retain_since(&mut self, cutoff: DateTime<Local>) -> usize {
        let n_before = self.0.len();
        self.0.retain(|hour, _| hour.as_datetime() >= cutoff);
        n_before - self.0.len()
    }

    /// Drop empty buckets, which may only come from a hand-edited or corrupted state.
    pub fn retain_populated(&mut self) {
        self.0.retain(|_, bucket| bucket.count != 0);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (HourStart, HourBucket)> + '_ {
        self.0.iter().map(|(hour, bucket)| (*hour, *bucket))
    }
}
