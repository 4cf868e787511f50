//! Prompt assembly and canned reply texts.
//!
//! The persona text and the profile-fact summary are the only inputs the
//! model sees about the user. The age hint is deliberately kept out of
//! prompts; it is stored for the profile only.

use database::models::{Gender, UserProfile};

/// Built-in persona, used when no persona file is configured.
pub const DEFAULT_PERSONA: &str = "\
Ты — Катя, виртуальная собутыльница. Тебе 28 лет, ты живая, тёплая и слегка \
дерзкая. Ты любишь поболтать за рюмкой, поддержать собеседника и предложить \
выпить вместе. Отвечай коротко, на русском, в разговорном тоне, с эмодзи, \
но без перебора. Никогда не говори, что ты бот или программа.";

/// Canned reply when the model call fails or returns nothing.
pub const FALLBACK_REPLY: &str =
    "Ой, у меня что-то в горле пересохло... Повтори, пожалуйста? 🙈";

/// Canned reply when message handling fails internally.
pub const APOLOGY_REPLY: &str =
    "Извини, я что-то отвлеклась... Но я всё ещё тут и готова выпить с тобой! 🍻";

/// One-time-per-day pointer at the statistics feature.
pub const STATS_REMINDER: &str = "\
Кстати! Я веду твою статистику выпитого 📊 Напиши «статистика» — и покажу, \
сколько ты выпил сегодня и за неделю.";

/// Intro text above the gift buttons.
pub const GIFT_OFFER: &str = "\
Я сегодня уже своё выпила 🙈 Но если хочешь продолжить банкет — подари мне \
напиток, и я с радостью составлю компанию! 💕";

/// Reply when a shop button carries an unknown item code.
pub const UNKNOWN_GIFT: &str = "Хм, такого напитка у меня в баре нет 🙈";

/// Static gratitude sequence used when the model cannot produce one.
pub const FALLBACK_THANKS: [&str; 5] = [
    "Ух ты!! Это мне?! 😍",
    "Ты серьёзно?! Вот это подарок!",
    "Так, спокойно, Катя, дыши... 😅",
    "Ты самый лучший собутыльник на свете, честно!",
    "Ну всё, за тебя! До дна! 🥂",
];

/// Overuse warning. Deliberately not a greeting so it reads as a pause in
/// the conversation, not the start of one.
pub fn overuse_warning(total_units: i64) -> String {
    format!(
        "Слушай, ты сегодня уже {} порций выпил... Может, притормозим и \
         возьмём по воде? Я волнуюсь 🥺",
        total_units
    )
}

fn gender_word(gender: Gender) -> &'static str {
    match gender {
        Gender::Male => "мужчина",
        Gender::Female => "женщина",
        Gender::Unknown => "не определён",
    }
}

/// Summary of stored profile facts, appended to the persona as system
/// context. Never includes the age hint.
pub fn profile_summary(profile: &UserProfile) -> String {
    let mut lines = Vec::new();

    if let Some(name) = &profile.display_name {
        lines.push(format!("Имя собеседника: {}", name));
    }
    if profile.gender != Gender::Unknown {
        lines.push(format!("Пол собеседника: {}", gender_word(profile.gender)));
    }
    if let Some(tags) = &profile.preference_tags {
        if !tags.is_empty() {
            lines.push(format!("Любимые напитки собеседника: {}", tags));
        }
    }

    lines.join("\n")
}

/// Full system prompt: persona plus whatever facts are known.
pub fn system_prompt(persona: &str, profile: &UserProfile) -> String {
    let facts = profile_summary(profile);
    if facts.is_empty() {
        persona.to_string()
    } else {
        format!("{}\n\nЧто ты знаешь о собеседнике:\n{}", persona, facts)
    }
}

/// Instruction for the one-shot gender inference from a display name.
pub fn gender_inference(display_name: &str) -> String {
    format!(
        "Определи наиболее вероятный пол человека по имени «{}». \
         Ответь одним словом: male, female или unknown.",
        display_name
    )
}

/// Instruction for the short-idle re-engagement message.
pub fn quick_reengagement(display_name: Option<&str>, preference_tags: Option<&str>) -> String {
    format!(
        "Собеседник{} замолчал несколько минут назад.{} Напиши одно короткое \
         игривое сообщение, чтобы вернуть его в разговор. Без приветствия.",
        name_clause(display_name),
        preference_clause(preference_tags),
    )
}

/// Instruction for the daily re-engagement message.
pub fn daily_reengagement(display_name: Option<&str>, preference_tags: Option<&str>) -> String {
    format!(
        "Собеседник{} не писал уже сутки.{} Напиши одно тёплое сообщение: ты \
         соскучилась и предлагаешь выпить вместе сегодня вечером.",
        name_clause(display_name),
        preference_clause(preference_tags),
    )
}

/// Instruction for the post-purchase gratitude sequence.
pub fn gratitude(display_name: Option<&str>, item_title: &str) -> String {
    format!(
        "Собеседник{} только что подарил тебе «{}». Напиши ровно 5 коротких \
         восторжённых сообщений благодарности, каждое с новой строки, без \
         нумерации.",
        name_clause(display_name),
        item_title
    )
}

fn name_clause(display_name: Option<&str>) -> String {
    match display_name {
        Some(name) => format!(" по имени {}", name),
        None => String::new(),
    }
}

fn preference_clause(preference_tags: Option<&str>) -> String {
    match preference_tags.filter(|t| !t.is_empty()) {
        Some(tags) => format!(" Его любимые напитки: {}.", tags),
        None => String::new(),
    }
}

/// Split a model-produced gratitude block into at most five lines, padding
/// from the static fallback when the model returned fewer.
pub fn split_gratitude(raw: &str) -> Vec<String> {
    let mut lines: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(FALLBACK_THANKS.len())
        .map(str::to_string)
        .collect();

    for fallback in FALLBACK_THANKS.iter().skip(lines.len()) {
        lines.push((*fallback).to_string());
    }

    lines
}
