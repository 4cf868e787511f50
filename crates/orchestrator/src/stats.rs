//! Consumption statistics report.
//!
//! Both the request detection and the report body are deterministic; the
//! stats branch never touches the language model.

use database::models::DrinkTotal;

/// Keywords that make a message a statistics request.
const STATS_KEYWORDS: [&str; 3] = ["статистик", "сколько выпил", "сколько я выпил"];

/// Whether an inbound message asks for the consumption report.
pub fn is_stats_request(text: &str) -> bool {
    let lowered = text.to_lowercase();
    STATS_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

/// Render the two-window consumption report.
pub fn format_report(today: &[DrinkTotal], week: &[DrinkTotal]) -> String {
    let mut report = String::from("📊 Твоя статистика выпитого:\n\n🍻 Сегодня:\n");
    report.push_str(&format_totals(today));
    report.push_str("\n\n📅 За 7 дней:\n");
    report.push_str(&format_totals(week));
    report
}

fn format_totals(totals: &[DrinkTotal]) -> String {
    if totals.is_empty() {
        return "Пока ничего не выпито 🙃".to_string();
    }

    totals
        .iter()
        .map(|t| format!("• {}: {} {}", t.kind, t.total, t.unit))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(kind: &str, unit: &str, total: i64) -> DrinkTotal {
        DrinkTotal {
            kind: kind.to_string(),
            unit: unit.to_string(),
            total,
        }
    }

    #[test]
    fn test_request_detection() {
        assert!(is_stats_request("статистика"));
        assert!(is_stats_request("Покажи СТАТИСТИКУ пожалуйста"));
        assert!(is_stats_request("сколько выпил за неделю?"));
        assert!(!is_stats_request("давай выпьем"));
        assert!(!is_stats_request("привет"));
    }

    #[test]
    fn test_report_with_data() {
        let today = vec![total("пиво", "бутылок", 2)];
        let week = vec![total("пиво", "бутылок", 5), total("водка", "г", 100)];

        let report = format_report(&today, &week);
        assert!(report.contains("Сегодня:\n• пиво: 2 бутылок"));
        assert!(report.contains("• водка: 100 г"));
    }

    #[test]
    fn test_report_empty() {
        let report = format_report(&[], &[]);
        assert_eq!(report.matches("Пока ничего не выпито").count(), 2);
    }

    #[test]
    fn test_report_deterministic() {
        let week = vec![total("вино", "бокалов", 3)];
        assert_eq!(format_report(&[], &week), format_report(&[], &week));
    }
}
