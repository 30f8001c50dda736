//! Static fallback dataset, served whenever live extraction is unavailable
//! or low-confidence. This is a fixture, not generated data; only the dates
//! are relative to the evaluation date.

use {
    chrono::Days,
    crate::prelude::*,
};

fn fixture(id: i64, name: &str, organizer: &str, format: &str, prize: &str, participants: i64, start_date: NaiveDate, end_date: NaiveDate, status: Status, featured: bool) -> Tournament {
    Tournament {
        id,
        name: name.to_owned(),
        organizer: organizer.to_owned(),
        game: crate::tournament::GAME.to_owned(),
        format: format.to_owned(),
        prize: prize.to_owned(),
        participants,
        max_participants: None,
        bracket_url: None,
        registration_url: None,
        discord_url: Some("https://discord.gg/aoe4brasil".to_owned()),
        vod_url: None,
        thumbnail: crate::normalize::thumbnail_for(organizer),
        start_date, end_date, status, featured,
    }
}

pub(crate) fn listing(today: NaiveDate) -> Listing {
    let days = |n| Days::new(n);
    let mut listing = Listing {
        active: vec![
            fixture(9001, "Copa AoE4 Brasil", "AoE4 Brasil", "Double Elimination", "$1,000.00", 32,
                today - days(2), today + days(1), Status::Active, false),
        ],
        upcoming: vec![
            fixture(9002, "Wololo Masters Invitational", "Red Bull", "Group Stage", "$25,000.00", 16,
                today + days(7), today + days(10), Status::Upcoming, true),
            fixture(9003, "Liga NMC Temporada 4", "Liga NMC", "Round Robin", "$500.00", 24,
                today + days(21), today + days(49), Status::Upcoming, false),
        ],
        completed: vec![
            fixture(9004, "Torneio da Comunidade", "Community", "Single Elimination", "A confirmar", 48,
                today - days(30), today - days(28), Status::Completed, false),
            fixture(9005, "World's Edge Anniversary Cup", "World's Edge", "Swiss", "$10,000.00", 64,
                today - days(60), today - days(55), Status::Completed, true),
            fixture(9006, "Copa Verao de Aoe4 Brasil", "AoE4 Brasil", "Single Elimination", "$750.00", 28,
                today - days(90), today - days(88), Status::Completed, false),
        ],
    };
    listing.sort();
    listing
}
