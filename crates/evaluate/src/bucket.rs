//! Lead-time buckets.

use std::fmt;

use serde::Serialize;

/// How far ahead a forecast was made, grouped into fixed day ranges.
///
/// Ranges are closed and leave gaps: a lead of 2.5 days falls in no bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum LeadTimeBucket {
    #[serde(rename = "0-2d")]
    Days0To2,
    #[serde(rename = "3-5d")]
    Days3To5,
    #[serde(rename = "6-9d")]
    Days6To9,
    #[serde(rename = "10-14d")]
    Days10To14,
}

impl LeadTimeBucket {
    /// All buckets, shortest lead first.
    pub const ALL: [LeadTimeBucket; 4] = [
        LeadTimeBucket::Days0To2,
        LeadTimeBucket::Days3To5,
        LeadTimeBucket::Days6To9,
        LeadTimeBucket::Days10To14,
    ];

    /// Inclusive `(min_days, max_days)`.
    pub const fn day_range(self) -> (f64, f64) {
        match self {
            LeadTimeBucket::Days0To2 => (0.0, 2.0),
            LeadTimeBucket::Days3To5 => (3.0, 5.0),
            LeadTimeBucket::Days6To9 => (6.0, 9.0),
            LeadTimeBucket::Days10To14 => (10.0, 14.0),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            LeadTimeBucket::Days0To2 => "0-2d",
            LeadTimeBucket::Days3To5 => "3-5d",
            LeadTimeBucket::Days6To9 => "6-9d",
            LeadTimeBucket::Days10To14 => "10-14d",
        }
    }

    /// Bucket containing `lead_hours / 24` days, if any.
    pub fn from_lead_hours(lead_hours: f64) -> Option<Self> {
        let lead_days = lead_hours / 24.0;
        Self::ALL.into_iter().find(|b| b.contains_days(lead_days))
    }

    pub fn contains_days(self, lead_days: f64) -> bool {
        let (lo, hi) = self.day_range();
        lo <= lead_days && lead_days <= hi
    }
}

impl fmt::Display for LeadTimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
