//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Gender inferred from the display name, derived once and never re-derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    /// Storage string for this gender.
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Unknown => "unknown",
        }
    }

    /// Parse a stored or model-produced gender string.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "male" => Gender::Male,
            "female" => Gender::Female,
            _ => Gender::Unknown,
        }
    }
}

/// One per distinct end-user identity; owned exclusively by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    /// Stable external identity.
    pub user_id: String,
    /// Delivery destination; may differ from `user_id`.
    pub conversation_id: String,
    /// Display name as last reported by the platform.
    pub display_name: Option<String>,
    /// Inferred gender, derived once.
    pub gender: Gender,
    /// Free-form comma-joined preference tags; last write wins.
    pub preference_tags: Option<String>,
    /// Age from explicit extraction only, bounded 1-120.
    pub age_hint: Option<i64>,
    /// Free consumption events used in the current daily window.
    pub daily_free_quota_used: i64,
    /// Start of the current daily quota window.
    pub quota_reset_at: i64,
    /// Last inbound message timestamp.
    pub last_inbound_at: i64,
    /// When the last quick re-engagement prompt was sent.
    pub last_quick_prompt_at: Option<i64>,
    /// When the last daily re-engagement prompt was sent.
    pub last_daily_prompt_at: Option<i64>,
    /// A quick prompt has been sent for the current idle period.
    pub quick_prompt_pending: bool,
    /// When the stats-feature reminder was last sent.
    pub last_stats_reminder_at: Option<i64>,
    /// When the overuse warning was last sent.
    pub last_overuse_warning_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Append-only conversation log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ConversationTurn {
    /// Auto-incrementing id; insertion order is the only ordering guarantee.
    pub id: i64,
    pub conversation_id: String,
    /// "user" or "assistant".
    pub role: String,
    pub content: String,
    /// Side-signal id dispatched with this turn, if any.
    pub side_signal: Option<String>,
    pub created_at: i64,
}

/// One user-reported consumption event; never mutated after insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DrinkEvent {
    pub id: i64,
    pub user_id: String,
    pub kind: String,
    pub amount: i64,
    pub unit: String,
    pub occurred_at: i64,
}

/// Read-side aggregate over the drink ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DrinkTotal {
    pub kind: String,
    pub unit: String,
    pub total: i64,
}

/// A recorded gift purchase; immutable once successful.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct GiftTransaction {
    pub id: i64,
    pub user_id: String,
    pub item_code: String,
    pub price_units: i64,
    pub currency: String,
    pub provider_charge_id: String,
    /// "pending", "successful" or "failed".
    pub status: String,
    pub raw_payload: Option<String>,
    pub created_at: i64,
}

/// The slice of a profile the re-engagement scheduler needs per candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PromptCandidate {
    pub user_id: String,
    pub conversation_id: String,
    pub display_name: Option<String>,
    pub preference_tags: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_parse() {
        assert_eq!(Gender::parse("male"), Gender::Male);
        assert_eq!(Gender::parse(" FEMALE "), Gender::Female);
        assert_eq!(Gender::parse("neutral"), Gender::Unknown);
        assert_eq!(Gender::parse(""), Gender::Unknown);
    }

    #[test]
    fn test_gender_round_trip() {
        for g in [Gender::Male, Gender::Female, Gender::Unknown] {
            assert_eq!(Gender::parse(g.as_str()), g);
        }
    }
}
