//! Deterministic fact extraction from inbound text.
//!
//! Pure pattern rules, no model involvement: the same message always yields
//! the same facts. Three independent rules run over the lowercased text:
//! an age statement, drink preferences gated on an affinity verb, and a
//! reported consumption event.

use std::sync::OnceLock;

use regex::Regex;

/// One reported consumption event, ready for the drink ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrinkReport {
    /// Canonical drink tag, or "алкоголь" when unspecified.
    pub kind: String,
    pub amount: i64,
    /// Measure word, "порций" when unspecified.
    pub unit: String,
}

/// Everything one message yielded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactUpdateSet {
    /// Stated age, already validated to 1-120.
    pub age: Option<i64>,
    /// Canonical drink tags named next to an affinity verb, deduplicated,
    /// in order of appearance.
    pub preferences: Vec<String>,
    /// Reported consumption, if the message contains one.
    pub drink: Option<DrinkReport>,
}

impl FactUpdateSet {
    pub fn is_empty(&self) -> bool {
        self.age.is_none() && self.preferences.is_empty() && self.drink.is_none()
    }
}

const MAX_AMOUNT: i64 = 50;

/// Affinity verbs that turn a drink mention into a stored preference.
const PREFERENCE_VERBS: [&str; 6] = [
    "люблю",
    "обожаю",
    "предпочитаю",
    "нравится",
    "запомни",
    "мой любимый",
];

/// (stem, canonical tag). Stems are matched against whole words.
const DRINK_STEMS: [(&str, &str); 9] = [
    ("пив", "пиво"),
    ("водк", "водка"),
    ("виски", "виски"),
    ("вискар", "виски"),
    ("вин", "вино"),
    ("коньяк", "коньяк"),
    ("шампанск", "шампанское"),
    ("текил", "текила"),
    ("ром", "ром"),
];

/// Numeral words accepted as a consumption amount.
const NUMERAL_WORDS: [(&str, i64); 13] = [
    ("один", 1),
    ("одну", 1),
    ("одно", 1),
    ("два", 2),
    ("две", 2),
    ("пару", 2),
    ("три", 3),
    ("четыре", 4),
    ("пять", 5),
    ("шесть", 6),
    ("семь", 7),
    ("восемь", 8),
    ("десять", 10),
];

/// (stem, canonical unit).
const UNIT_STEMS: [(&str, &str); 9] = [
    ("грамм", "г"),
    ("мл", "мл"),
    ("литр", "л"),
    ("стакан", "стаканов"),
    ("бокал", "бокалов"),
    ("бутыл", "бутылок"),
    ("банк", "банок"),
    ("рюм", "рюмок"),
    ("кружк", "кружек"),
];

fn age_statement_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // "мне 25", "мне 25 лет"
    RE.get_or_init(|| Regex::new(r"мне\s+(\d{1,3})").unwrap())
}

fn age_years_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // "25 лет", "31 год", "22 года"
    RE.get_or_init(|| Regex::new(r"\b(\d{1,3})\s*(?:лет|год(?:а|ов)?)\b").unwrap())
}

fn consumption_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bвыпил[аи]?\b").unwrap())
}

fn word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]+|\p{Alphabetic}+").unwrap())
}

/// Run all extraction rules over one message.
pub fn extract(text: &str) -> FactUpdateSet {
    let lowered = text.to_lowercase();

    FactUpdateSet {
        age: extract_age(&lowered),
        preferences: extract_preferences(&lowered),
        drink: extract_drink(&lowered),
    }
}

/// First matching age pattern wins; out-of-range values are discarded.
fn extract_age(lowered: &str) -> Option<i64> {
    let capture = age_statement_re()
        .captures(lowered)
        .or_else(|| age_years_re().captures(lowered))?;

    let age: i64 = capture.get(1)?.as_str().parse().ok()?;
    (1..=120).contains(&age).then_some(age)
}

/// Drink tags are only collected when the message carries an affinity verb,
/// so a bare drink mention ("вчера было пиво") stores nothing.
fn extract_preferences(lowered: &str) -> Vec<String> {
    if !PREFERENCE_VERBS.iter().any(|verb| lowered.contains(verb)) {
        return Vec::new();
    }

    let mut tags: Vec<String> = Vec::new();
    for word in word_re().find_iter(lowered) {
        if let Some(tag) = canonical_drink(word.as_str()) {
            if !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
        }
    }

    tags
}

fn canonical_drink(word: &str) -> Option<&'static str> {
    DRINK_STEMS
        .iter()
        .find(|(stem, _)| word.starts_with(stem))
        .map(|(_, tag)| *tag)
}

/// A consumption report needs both the trigger verb and an explicit amount
/// (digits or a numeral word); a bare "выпил" stores nothing, so questions
/// about drinking never land in the ledger.
fn extract_drink(lowered: &str) -> Option<DrinkReport> {
    consumption_re().find(lowered)?;

    let mut amount: Option<i64> = None;
    let mut unit: Option<&'static str> = None;
    let mut kind: Option<&'static str> = None;

    for word in word_re().find_iter(lowered) {
        let w = word.as_str();

        if amount.is_none() {
            if let Ok(n) = w.parse::<i64>() {
                amount = Some(n);
            } else if let Some(&(_, n)) = NUMERAL_WORDS.iter().find(|(word, _)| *word == w) {
                amount = Some(n);
            }
        }
        if unit.is_none() {
            unit = UNIT_STEMS
                .iter()
                .find(|(stem, _)| w.starts_with(stem))
                .map(|(_, u)| *u);
        }
        if kind.is_none() {
            kind = canonical_drink(w);
        }
    }

    let amount = amount?;
    if !(1..=MAX_AMOUNT).contains(&amount) {
        return None;
    }

    Some(DrinkReport {
        kind: kind.unwrap_or("алкоголь").to_string(),
        amount,
        unit: unit.unwrap_or("порций").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_statement() {
        assert_eq!(extract("Мне 25 лет").age, Some(25));
        assert_eq!(extract("мне 31").age, Some(31));
        assert_eq!(extract("скоро 40 лет стукнет").age, Some(40));
    }

    #[test]
    fn test_age_out_of_range_discarded() {
        assert_eq!(extract("мне 0 лет").age, None);
        assert_eq!(extract("мне 121 год").age, None);
        assert_eq!(extract("этому дому 300 лет").age, None);
    }

    #[test]
    fn test_age_first_match_wins() {
        assert_eq!(extract("мне 25, а брату 30 лет").age, Some(25));
    }

    #[test]
    fn test_no_age() {
        assert_eq!(extract("привет, как дела?").age, None);
    }

    #[test]
    fn test_preferences_need_affinity_verb() {
        assert_eq!(extract("люблю пиво и виски").preferences, ["пиво", "виски"]);
        // A bare mention stores nothing.
        assert!(extract("вчера было пиво").preferences.is_empty());
    }

    #[test]
    fn test_preferences_dedup_in_order() {
        let facts = extract("обожаю вино, вино и еще раз винцо");
        assert_eq!(facts.preferences, ["вино"]);
    }

    #[test]
    fn test_wine_stem_does_not_swallow_whisky() {
        assert_eq!(extract("предпочитаю виски").preferences, ["виски"]);
    }

    #[test]
    fn test_consumption_with_digits() {
        let report = extract("выпил 2 бутылки пива").drink.unwrap();
        assert_eq!(report.kind, "пиво");
        assert_eq!(report.amount, 2);
        assert_eq!(report.unit, "бутылок");
    }

    #[test]
    fn test_consumption_with_numeral_word() {
        let report = extract("выпила пару рюмок водки").drink.unwrap();
        assert_eq!(report.kind, "водка");
        assert_eq!(report.amount, 2);
        assert_eq!(report.unit, "рюмок");
    }

    #[test]
    fn test_consumption_kind_and_unit_defaults() {
        let report = extract("выпил 3 чего-то крепкого").drink.unwrap();
        assert_eq!(report.kind, "алкоголь");
        assert_eq!(report.amount, 3);
        assert_eq!(report.unit, "порций");
    }

    #[test]
    fn test_bare_trigger_without_amount_stores_nothing() {
        assert_eq!(extract("вчера выпил немного").drink, None);
        assert_eq!(extract("сколько я выпил?").drink, None);
        assert_eq!(extract("выпила и пошла спать").drink, None);
    }

    #[test]
    fn test_consumption_amount_out_of_range_discarded() {
        assert_eq!(extract("выпил 100 стаканов").drink, None);
    }

    #[test]
    fn test_no_consumption_without_trigger() {
        assert_eq!(extract("купил 2 бутылки пива").drink, None);
    }

    #[test]
    fn test_deterministic() {
        let text = "Мне 25 лет, люблю вино, выпил 2 бокала";
        assert_eq!(extract(text), extract(text));

        let facts = extract(text);
        assert_eq!(facts.age, Some(25));
        assert_eq!(facts.preferences, ["вино"]);
        assert_eq!(facts.drink.as_ref().unwrap().unit, "бокалов");
    }

    #[test]
    fn test_empty_input() {
        assert!(extract("").is_empty());
    }
}
