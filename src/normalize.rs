//! Pure transforms from the intermediate upstream shape into canonical
//! tournament records: organizer inference, name cleanup, format and status
//! mapping, prize formatting, and the featured heuristic.

use {
    itertools::Itertools as _,
    lazy_regex::{
        regex,
        regex_find,
    },
    crate::prelude::*,
};

/// Tuning constants for the featured heuristic, not contracts.
pub(crate) const FEATURED_MIN_PARTICIPANTS: i64 = 64;
pub(crate) const FEATURED_MIN_PRIZE: f64 = 10_000.0;

const PRESTIGE_KEYWORDS: &[&str] = &["championship", "masters", "pro league", "red bull", "wololo", "world's edge"];

/// Conjunctions and prepositions kept lowercase when re-title-casing, except
/// at the start of a name. Includes the Portuguese ones the community uses.
const SMALL_WORDS: &[&str] = &["a", "and", "da", "das", "de", "do", "dos", "e", "em", "for", "o", "of", "the", "to"];

const ORGANIZERS: &[(&str, &str)] = &[
    ("redbull", "Red Bull"),
    ("red bull", "Red Bull"),
    ("wololo", "Red Bull"),
    ("world's edge", "World's Edge"),
    ("worlds edge", "World's Edge"),
    ("egc", "Elite Gaming Channel"),
    ("brasil", "AoE4 Brasil"),
    ("brazil", "AoE4 Brasil"),
    ("liga", "Liga NMC"),
];

pub(crate) fn normalize(raw: RawTournament, fallback_id: i64, today: NaiveDate) -> Tournament {
    let name = clean_name(&raw.name);
    let organizer = infer_organizer(raw.organizer.as_deref().unwrap_or(&raw.name));
    let prize_amount = raw.prize.as_deref().and_then(parse_prize_amount);
    let status = match raw.status.as_deref() {
        Some(status) => map_status(status),
        None => Status::from_dates(raw.start_date, raw.end_date, today),
    };
    let featured = is_featured(&name, &organizer, raw.participants.unwrap_or_default(), prize_amount);
    Tournament {
        id: raw.id.unwrap_or(fallback_id),
        game: crate::tournament::GAME.to_owned(),
        format: map_format(raw.format_code.as_deref()),
        prize: format_prize(raw.prize.as_deref()),
        participants: raw.participants.unwrap_or_default(),
        max_participants: raw.max_participants,
        start_date: raw.start_date,
        end_date: raw.end_date,
        bracket_url: raw.bracket_url,
        registration_url: raw.registration_url,
        discord_url: raw.discord_url,
        vod_url: raw.vod_url,
        thumbnail: thumbnail_for(&organizer),
        name, organizer, status, featured,
    }
}

/// Fixed lookup from the upstream status vocabulary to the three canonical
/// buckets. Unknown values default to upcoming.
pub(crate) fn map_status(upstream: &str) -> Status {
    match upstream.trim().to_lowercase().as_str() {
        "ongoing" => Status::Active,
        "completed" => Status::Completed,
        "upcoming" | "registration" => Status::Upcoming,
        _ => Status::Upcoming,
    }
}

pub(crate) fn map_format(code: Option<&str>) -> String {
    match code.map(str::trim) {
        None | Some("") => "Single Elimination".to_owned(),
        Some("1") => "Single Elimination".to_owned(),
        Some("2") => "Double Elimination".to_owned(),
        Some("3") => "Round Robin".to_owned(),
        Some("4") => "Swiss".to_owned(),
        Some("5") => "Group Stage".to_owned(),
        Some(other) => other.to_owned(),
    }
}

pub(crate) fn infer_organizer(raw: &str) -> String {
    let lower = raw.to_lowercase();
    for (needle, canonical) in ORGANIZERS {
        if lower.contains(needle) {
            return (*canonical).to_owned()
        }
    }
    if raw.trim().is_empty() {
        "Community".to_owned()
    } else {
        title_case(raw)
    }
}

/// Strips game-name tags, collapses whitespace, and re-title-cases.
pub(crate) fn clean_name(raw: &str) -> String {
    let stripped = regex!(r"(?i)\bage of empires (?:iv|4)\b|\baoe ?(?:iv|4)\b").replace_all(raw, " ");
    title_case(&stripped)
}

pub(crate) fn title_case(name: &str) -> String {
    name.split_whitespace()
        .enumerate()
        .map(|(position, word)| {
            let lower = word.to_lowercase();
            if position > 0 && SMALL_WORDS.contains(&&*lower) {
                lower
            } else {
                capitalize(word)
            }
        })
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::default(),
    }
}

/// First numeric token of the upstream prize string, if any.
pub(crate) fn parse_prize_amount(raw: &str) -> Option<f64> {
    regex_find!(r"[0-9][0-9,]*(?:\.[0-9]+)?", raw)?.replace(',', "").parse().ok()
}

pub(crate) fn format_prize(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else { return "A confirmar".to_owned() };
    match parse_prize_amount(raw) {
        Some(amount) => format_currency(amount),
        None => raw.to_owned(),
    }
}

pub(crate) fn format_currency(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    format!("${}.{:02}", group_thousands(cents / 100), cents % 100)
}

fn group_thousands(amount: i64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

pub(crate) fn is_featured(name: &str, organizer: &str, participants: i64, prize_amount: Option<f64>) -> bool {
    let name = name.to_lowercase();
    let organizer = organizer.to_lowercase();
    PRESTIGE_KEYWORDS.iter().any(|keyword| name.contains(keyword) || organizer.contains(keyword))
        || participants > FEATURED_MIN_PARTICIPANTS
        || prize_amount.is_some_and(|amount| amount > FEATURED_MIN_PRIZE)
}

pub(crate) fn thumbnail_for(organizer: &str) -> String {
    match organizer {
        "Red Bull" => "/images/tournaments/redbull.png".to_owned(),
        "World's Edge" => "/images/tournaments/worlds-edge.png".to_owned(),
        "Elite Gaming Channel" => "/images/tournaments/egc.png".to_owned(),
        "AoE4 Brasil" => "/images/tournaments/aoe4-brasil.png".to_owned(),
        "Liga NMC" => "/images/tournaments/liga-nmc.png".to_owned(),
        _ => "/images/tournaments/default.png".to_owned(),
    }
}
