//! Side-signals: non-text reactions dispatched alongside a reply.

use serde::{Deserialize, Serialize};

/// A themed reaction the bot can dispatch next to (or instead of) text.
///
/// Drink signals represent the persona "having a drink" and are gated by the
/// daily free-consumption quota; mood signals are always free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SideSignal {
    Beer,
    Vodka,
    Wine,
    Whisky,
    Happy,
    Sad,
}

impl SideSignal {
    /// Stable string id used in storage and in the dispatch adapter.
    pub fn id(&self) -> &'static str {
        match self {
            SideSignal::Beer => "drink_beer",
            SideSignal::Vodka => "drink_vodka",
            SideSignal::Wine => "drink_wine",
            SideSignal::Whisky => "drink_whisky",
            SideSignal::Happy => "mood_happy",
            SideSignal::Sad => "mood_sad",
        }
    }

    /// Parse a stored signal id.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "drink_beer" => Some(SideSignal::Beer),
            "drink_vodka" => Some(SideSignal::Vodka),
            "drink_wine" => Some(SideSignal::Wine),
            "drink_whisky" => Some(SideSignal::Whisky),
            "mood_happy" => Some(SideSignal::Happy),
            "mood_sad" => Some(SideSignal::Sad),
            _ => None,
        }
    }

    /// Whether dispatching this signal counts as an agent consumption event.
    pub fn involves_drink(&self) -> bool {
        matches!(
            self,
            SideSignal::Beer | SideSignal::Vodka | SideSignal::Wine | SideSignal::Whisky
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SideSignal; 6] = [
        SideSignal::Beer,
        SideSignal::Vodka,
        SideSignal::Wine,
        SideSignal::Whisky,
        SideSignal::Happy,
        SideSignal::Sad,
    ];

    #[test]
    fn test_id_round_trip() {
        for signal in ALL {
            assert_eq!(SideSignal::parse(signal.id()), Some(signal));
        }
        assert_eq!(SideSignal::parse("drink_mead"), None);
    }

    #[test]
    fn test_drink_gating() {
        assert!(SideSignal::Beer.involves_drink());
        assert!(SideSignal::Whisky.involves_drink());
        assert!(!SideSignal::Happy.involves_drink());
        assert!(!SideSignal::Sad.involves_drink());
    }
}
