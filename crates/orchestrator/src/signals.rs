//! Side-signal classification over the agent's own reply text.
//!
//! The reply is scanned against an ordered keyword table; the first matching
//! rule wins, so a reply mentioning both a toast and sadness still yields the
//! drink signal.

use bot_core::SideSignal;

/// Ordered rules. Earlier entries take precedence.
const RULES: &[(SideSignal, &[&str])] = &[
    (
        SideSignal::Beer,
        &["выпьем", "пьем", "пьём", "выпей", "наливай", "за встречу"],
    ),
    (SideSignal::Vodka, &["водк", "водочк"]),
    (SideSignal::Wine, &["вино", "винц", "бокал"]),
    (SideSignal::Whisky, &["виски", "вискар"]),
    (SideSignal::Sad, &["грустно", "печально", "тоскливо", "жаль"]),
    (
        SideSignal::Happy,
        &["радостно", "весело", "счастлив", "ура"],
    ),
];

/// Classify a reply into at most one side-signal.
pub fn classify(reply: &str) -> Option<SideSignal> {
    let lowered = reply.to_lowercase();

    for (signal, keywords) in RULES {
        if keywords.iter().any(|kw| lowered.contains(kw)) {
            return Some(*signal);
        }
    }

    None
}
