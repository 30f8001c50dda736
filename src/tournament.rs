//! Canonical tournament shapes shared by every upstream variant.

use {
    std::cmp::Reverse,
    crate::prelude::*,
};

pub(crate) const GAME: &str = "Age of Empires IV";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Status {
    Active,
    Upcoming,
    Completed,
}

impl Status {
    /// The status bucket is always derived from the dates relative to the
    /// evaluation date, never trusted verbatim from upstream. The only
    /// exception is an explicit upstream status enum, which goes through
    /// [`crate::normalize::map_status`] instead.
    pub(crate) fn from_dates(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Self {
        if today < start {
            Self::Upcoming
        } else if today > end {
            Self::Completed
        } else {
            Self::Active
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Upcoming => write!(f, "upcoming"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// Common intermediate shape each adapter reduces its upstream records to
/// before the normalizer runs. Keeps the normalization rules single-sourced.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawTournament {
    pub(crate) id: Option<i64>,
    pub(crate) name: String,
    pub(crate) organizer: Option<String>,
    pub(crate) format_code: Option<String>,
    pub(crate) prize: Option<String>,
    pub(crate) participants: Option<i64>,
    pub(crate) max_participants: Option<i64>,
    pub(crate) start_date: NaiveDate,
    pub(crate) end_date: NaiveDate,
    pub(crate) status: Option<String>,
    pub(crate) bracket_url: Option<String>,
    pub(crate) registration_url: Option<String>,
    pub(crate) discord_url: Option<String>,
    pub(crate) vod_url: Option<String>,
}

impl RawTournament {
    pub(crate) fn new(name: impl ToString, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            organizer: None,
            format_code: None,
            prize: None,
            participants: None,
            max_participants: None,
            status: None,
            bracket_url: None,
            registration_url: None,
            discord_url: None,
            vod_url: None,
            start_date, end_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub(crate) struct Tournament {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) organizer: String,
    pub(crate) game: String,
    pub(crate) format: String,
    pub(crate) prize: String,
    pub(crate) participants: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) max_participants: Option<i64>,
    pub(crate) start_date: NaiveDate,
    pub(crate) end_date: NaiveDate,
    pub(crate) status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) bracket_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) registration_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) discord_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) vod_url: Option<String>,
    pub(crate) thumbnail: String,
    pub(crate) featured: bool,
}

/// The three status buckets served to the frontend.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub(crate) struct Listing {
    pub(crate) active: Vec<Tournament>,
    pub(crate) upcoming: Vec<Tournament>,
    pub(crate) completed: Vec<Tournament>,
}

impl Listing {
    pub(crate) fn from_tournaments(tournaments: impl IntoIterator<Item = Tournament>) -> Self {
        let mut listing = Self::default();
        for tournament in tournaments {
            match tournament.status {
                Status::Active => listing.active.push(tournament),
                Status::Upcoming => listing.upcoming.push(tournament),
                Status::Completed => listing.completed.push(tournament),
            }
        }
        listing.sort();
        listing
    }

    /// Soonest start first for active/upcoming, most recent start first for
    /// completed. Featured entries sort ahead of the rest within each bucket,
    /// ties keeping the date order.
    pub(crate) fn sort(&mut self) {
        self.active.sort_by_key(|tournament| (!tournament.featured, tournament.start_date));
        self.upcoming.sort_by_key(|tournament| (!tournament.featured, tournament.start_date));
        self.completed.sort_by_key(|tournament| (!tournament.featured, Reverse(tournament.start_date)));
    }

    pub(crate) fn len(&self) -> usize {
        self.active.len() + self.upcoming.len() + self.completed.len()
    }
}
