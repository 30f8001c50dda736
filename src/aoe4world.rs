//! Results API source adapter. Raw wire types for the tournament listing
//! endpoint; these map to the common intermediate shape before the
//! normalizer runs.

use {
    async_trait::async_trait,
    url::Url,
    crate::{
        api::{
            SourceError,
            TournamentSource,
        },
        prelude::*,
    },
};

const DEFAULT_LIMIT: u32 = 50;

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error(transparent)] Reqwest(#[from] reqwest::Error),
    #[error("unexpected response shape from the tournaments API")]
    MalformedShape,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ListingResponse {
    pub(crate) tournaments: Option<Vec<ApiTournament>>,
}

/// Option-heavy on purpose; the API omits fields freely.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiTournament {
    pub(crate) id: Option<i64>,
    pub(crate) name: Option<String>,
    pub(crate) organizer: Option<String>,
    #[serde(rename = "tournamentType")]
    pub(crate) tournament_type: Option<String>,
    #[serde(rename = "prizePool")]
    pub(crate) prize_pool: Option<String>,
    #[serde(rename = "registeredParticipants")]
    pub(crate) registered_participants: Option<i64>,
    #[serde(rename = "maxParticipants")]
    pub(crate) max_participants: Option<i64>,
    #[serde(rename = "startDate")]
    pub(crate) start_date: Option<NaiveDate>,
    #[serde(rename = "endDate")]
    pub(crate) end_date: Option<NaiveDate>,
    pub(crate) status: Option<String>,
    #[serde(rename = "bracketUrl")]
    pub(crate) bracket_url: Option<String>,
    #[serde(rename = "registrationUrl")]
    pub(crate) registration_url: Option<String>,
    #[serde(rename = "discordUrl")]
    pub(crate) discord_url: Option<String>,
    #[serde(rename = "vodUrl")]
    pub(crate) vod_url: Option<String>,
}

impl ApiTournament {
    /// Entries without a name or start date are skipped rather than failing
    /// the whole listing.
    pub(crate) fn into_raw(self) -> Option<RawTournament> {
        let name = self.name.filter(|name| !name.trim().is_empty())?;
        let start_date = self.start_date?;
        let mut raw = RawTournament::new(name, start_date, self.end_date.unwrap_or(start_date));
        raw.id = self.id;
        raw.organizer = self.organizer;
        raw.format_code = self.tournament_type;
        raw.prize = self.prize_pool;
        raw.participants = self.registered_participants;
        raw.max_participants = self.max_participants;
        raw.status = self.status;
        raw.bracket_url = self.bracket_url;
        raw.registration_url = self.registration_url;
        raw.discord_url = self.discord_url;
        raw.vod_url = self.vod_url;
        Some(raw)
    }
}

pub(crate) struct Aoe4WorldSource {
    pub(crate) http_client: reqwest::Client,
    pub(crate) api_url: Url,
    pub(crate) api_key: Option<String>,
}

#[async_trait]
impl TournamentSource for Aoe4WorldSource {
    fn name(&self) -> &'static str {
        "aoe4world"
    }

    async fn fetch(&self) -> Result<Vec<RawTournament>, SourceError> {
        let listing = fetch_listing(&self.http_client, &self.api_url, self.api_key.as_deref(), DEFAULT_LIMIT, 0).await?;
        Ok(listing.into_iter().filter_map(ApiTournament::into_raw).collect())
    }
}

pub(crate) async fn fetch_listing(http_client: &reqwest::Client, api_url: &Url, api_key: Option<&str>, limit: u32, offset: u32) -> Result<Vec<ApiTournament>, Error> {
    let mut request = http_client.get(api_url.clone())
        .query(&[("limit", limit.to_string()), ("offset", offset.to_string())]);
    if let Some(api_key) = api_key {
        request = request.bearer_auth(api_key);
    }
    let response = request
        .send().await?
        .error_for_status()?
        .json::<ListingResponse>().await?;
    response.tournaments.ok_or(Error::MalformedShape)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_deserializes_and_maps_to_raw() {
        let body = r#"{
            "tournaments": [
                {
                    "id": 7,
                    "name": "Copa Brasil",
                    "organizer": "AoE4 Brasil",
                    "tournamentType": "2",
                    "prizePool": "$1,500",
                    "registeredParticipants": 32,
                    "maxParticipants": 64,
                    "startDate": "2026-09-05",
                    "endDate": "2026-09-07",
                    "status": "registration",
                    "bracketUrl": "https://example.com/bracket"
                },
                { "name": "", "startDate": "2026-09-05" },
                { "name": "No Dates Cup" }
            ]
        }"#;
        let listing = serde_json::from_str::<ListingResponse>(body).unwrap();
        let raw = listing.tournaments.unwrap().into_iter().filter_map(ApiTournament::into_raw).collect::<Vec<_>>();
        assert_eq!(raw.len(), 1, "nameless and dateless entries are skipped");
        assert_eq!(raw[0].id, Some(7));
        assert_eq!(raw[0].format_code.as_deref(), Some("2"));
        assert_eq!(raw[0].status.as_deref(), Some("registration"));
        assert_eq!(raw[0].end_date, NaiveDate::from_ymd_opt(2026, 9, 7).unwrap());
    }

    #[test]
    fn missing_end_date_collapses_to_the_start_date() {
        let body = r#"{ "tournaments": [ { "name": "One Day Cup", "startDate": "2026-09-05" } ] }"#;
        let listing = serde_json::from_str::<ListingResponse>(body).unwrap();
        let raw = listing.tournaments.unwrap().into_iter().filter_map(ApiTournament::into_raw).collect::<Vec<_>>();
        assert_eq!(raw[0].start_date, raw[0].end_date);
    }
}
