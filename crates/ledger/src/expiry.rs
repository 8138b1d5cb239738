//! Expiry classification.
//!
//! `classify` is a pure function of `(expires_at, now)`. It holds no state and
//! is re-evaluated on every recompute: its result moves with the wall clock
//! even when no new transaction arrives, so caching it against a batch would
//! publish stale tiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Urgency tiers in escalation order.
///
/// `Ord` follows declaration order, so tier comparisons express escalation
/// (`Normal < Warning < Danger < Expired`). `Unset` is the valid "no expiry"
/// state, not an error.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryTier {
    Normal,
    Warning,
    Danger,
    Expired,
    Unset,
}

/// Classification result: tier plus a display string of the remaining time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryStatus {
    pub tier: ExpiryTier,
    /// Compact remaining-time text, e.g. "2d 0h 0m", "3h 10m", "0m".
    pub remaining: String,
}

/// Three days, in whole minutes.
const DANGER_THRESHOLD_MINUTES: i64 = 3 * 24 * 60;
/// Seven days, in whole minutes.
const WARNING_THRESHOLD_MINUTES: i64 = 7 * 24 * 60;

/// Classify a batch's time-to-expiry at instant `now`.
pub fn classify(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> ExpiryStatus {
    let Some(expires_at) = expires_at else {
        return ExpiryStatus {
            tier: ExpiryTier::Unset,
            remaining: "no expiry".to_string(),
        };
    };

    // Whole minutes, truncated toward zero.
    let minutes = (expires_at - now).num_minutes();

    if minutes <= 0 {
        return ExpiryStatus {
            tier: ExpiryTier::Expired,
            remaining: "0m".to_string(),
        };
    }

    let tier = if minutes <= DANGER_THRESHOLD_MINUTES {
        ExpiryTier::Danger
    } else if minutes <= WARNING_THRESHOLD_MINUTES {
        ExpiryTier::Warning
    } else {
        ExpiryTier::Normal
    };

    ExpiryStatus {
        tier,
        remaining: remaining_text(minutes),
    }
}

/// Format whole minutes as `{d}d {h}h {m}m`, omitting leading zero components.
fn remaining_text(minutes: i64) -> String {
    let days = minutes / (24 * 60);
    let hours = (minutes % (24 * 60)) / 60;
    let mins = minutes % 60;

    if days > 0 {
        format!("{days}d {hours}h {mins}m")
    } else if hours > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{mins}m")
    }
}
