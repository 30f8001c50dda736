//! Wiki source adapter: fetches templated tournament markup through the
//! MediaWiki parse API and extracts loosely structured candidates from it.
//!
//! Extraction is regex-based and deliberately isolated behind
//! [`extract_candidates`] so it can be swapped for a markup-tree query
//! without touching the normalizer or the cache. A candidate count below
//! [`MIN_CANDIDATES`] is a typed failure, not a silent partial result.

use {
    async_trait::async_trait,
    lazy_regex::{
        regex,
        regex_captures,
    },
    url::Url,
    crate::{
        api::{
            SourceError,
            TournamentSource,
        },
        prelude::*,
    },
};

/// Extracted names shorter than this are treated as markup noise.
pub(crate) const MIN_NAME_LEN: usize = 5;
/// Below this many candidates the extraction probably failed and the result
/// is discarded rather than served.
pub(crate) const MIN_CANDIDATES: usize = 3;

const WIKI_BASE: &str = "https://liquipedia.net";
const TOURNAMENTS_PAGE: &str = "Age_of_Empires_IV/Tournaments";

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error(transparent)] Reqwest(#[from] reqwest::Error),
    #[error("unexpected response shape from the wiki parse API")]
    MalformedShape,
    #[error("extraction yielded only {0} candidates")]
    LowConfidence(usize),
}

#[derive(Deserialize)]
struct ParseResponse {
    parse: Option<ParsePayload>,
}

#[derive(Deserialize)]
struct ParsePayload {
    text: ParseText,
}

#[derive(Deserialize)]
struct ParseText {
    #[serde(rename = "*")]
    content: String,
}

/// One loosely structured tournament pulled out of the markup.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Candidate {
    pub(crate) name: String,
    pub(crate) link: Option<String>,
    pub(crate) start_date: NaiveDate,
    pub(crate) end_date: NaiveDate,
}

impl From<Candidate> for RawTournament {
    fn from(candidate: Candidate) -> Self {
        let mut raw = Self::new(&candidate.name, candidate.start_date, candidate.end_date);
        raw.bracket_url = candidate.link.map(|link| if link.starts_with('/') {
            format!("{WIKI_BASE}{link}")
        } else {
            link
        });
        raw
    }
}

pub(crate) struct LiquipediaSource {
    pub(crate) http_client: reqwest::Client,
    pub(crate) api_url: Url,
}

#[async_trait]
impl TournamentSource for LiquipediaSource {
    fn name(&self) -> &'static str {
        "liquipedia"
    }

    async fn fetch(&self) -> Result<Vec<RawTournament>, SourceError> {
        let markup = fetch_markup(&self.http_client, &self.api_url).await?;
        let candidates = extract_candidates(&markup, Utc::now().date_naive());
        if candidates.len() < MIN_CANDIDATES {
            return Err(Error::LowConfidence(candidates.len()).into())
        }
        Ok(candidates.into_iter().map(RawTournament::from).collect())
    }
}

/// Fetches the templated HTML for the tournaments page. Non-2xx statuses and
/// missing payloads surface as errors; the caller falls back.
pub(crate) async fn fetch_markup(http_client: &reqwest::Client, api_url: &Url) -> Result<String, Error> {
    let response = http_client.get(api_url.clone())
        .query(&[
            ("action", "parse"),
            ("page", TOURNAMENTS_PAGE),
            ("prop", "text"),
            ("format", "json"),
        ])
        .send().await?
        .error_for_status()?
        .json::<ParseResponse>().await?;
    Ok(response.parse.ok_or(Error::MalformedShape)?.text.content)
}

/// Scans the markup row by row for anchor text plus nearby date tokens.
pub(crate) fn extract_candidates(html: &str, today: NaiveDate) -> Vec<Candidate> {
    regex!(r"(?is)<tr[^>]*>(.*?)</tr>").captures_iter(html)
        .filter_map(|row| {
            let row = row.get(1)?.as_str();
            let (_, link, name) = regex_captures!(r#"(?is)<a[^>]+href="([^"]+)"[^>]*>([^<]+)</a>"#, row)?;
            let name = decode_entities(name);
            let name = name.trim();
            if name.chars().count() < MIN_NAME_LEN {
                return None
            }
            let (start_date, end_date) = parse_date_range(row, today)?;
            Some(Candidate {
                name: name.to_owned(),
                link: Some(link.to_owned()),
                start_date, end_date,
            })
        })
        .collect()
}

/// Pulls up to two date-like tokens out of a row. Two tokens are a range,
/// one token is a single-day event, and a first token without a year borrows
/// it from the second token (or the current year).
pub(crate) fn parse_date_range(raw: &str, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let mut tokens = regex!(r"(?i)\d{4}-\d{2}-\d{2}|[a-z]{3,9} \d{1,2}(?:, \d{4})?").find_iter(raw)
        .map(|token| token.as_str())
        .filter(|token| parse_date_token(token, today.year()).is_some());
    let first = tokens.next()?;
    match tokens.next() {
        Some(second) => {
            let end = parse_date_token(second, today.year())?;
            let start = parse_date_token(first, end.year())?;
            Some((start, end))
        }
        None => {
            let date = parse_date_token(first, today.year())?;
            Some((date, date))
        }
    }
}

fn parse_date_token(token: &str, year_hint: i32) -> Option<NaiveDate> {
    let token = token.trim();
    if let Ok(date) = NaiveDate::parse_from_str(token, "%Y-%m-%d") {
        return Some(date)
    }
    for format in ["%B %d, %Y", "%b %d, %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(token, format) {
            return Some(date)
        }
    }
    for format in ["%B %d, %Y", "%b %d, %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&format!("{token}, {year_hint}"), format) {
            return Some(date)
        }
    }
    None
}

fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&nbsp;", " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(ymd: (i32, u32, u32)) -> NaiveDate {
        NaiveDate::from_ymd_opt(ymd.0, ymd.1, ymd.2).unwrap()
    }

    const TODAY: (i32, u32, u32) = (2026, 8, 29);

    #[test]
    fn extracts_name_link_and_range_per_row() {
        let html = r#"
            <table>
            <tr><td><a href="/ageofempires/Winter_Championship">Winter Championship</a></td><td>Jan 10 - Jan 12, 2027</td></tr>
            <tr><td><a href="/ageofempires/Copa_Brasil">Copa Brasil 2026</a></td><td>2026-09-05</td></tr>
            <tr><td><a href="/ageofempires/X">Ad</a></td><td>Sep 1, 2026</td></tr>
            </table>
        "#;
        let candidates = extract_candidates(html, date(TODAY));
        assert_eq!(candidates.len(), 2, "short names must be excluded as noise");
        assert_eq!(candidates[0].name, "Winter Championship");
        assert_eq!(candidates[0].link.as_deref(), Some("/ageofempires/Winter_Championship"));
        assert_eq!(candidates[0].start_date, date((2027, 1, 10)));
        assert_eq!(candidates[0].end_date, date((2027, 1, 12)));
        assert_eq!(candidates[1].start_date, date((2026, 9, 5)));
        assert_eq!(candidates[1].end_date, date((2026, 9, 5)), "single token is both start and end");
    }

    #[test]
    fn first_token_borrows_the_year_from_the_second() {
        let (start, end) = parse_date_range("Dec 28 - January 3, 2027", date(TODAY)).unwrap();
        assert_eq!(start, date((2027, 12, 28)));
        assert_eq!(end, date((2027, 1, 3)));
    }

    #[test]
    fn yearless_single_token_uses_the_current_year() {
        let (start, end) = parse_date_range("September 12", date(TODAY)).unwrap();
        assert_eq!(start, date((2026, 9, 12)));
        assert_eq!(end, start);
    }

    #[test]
    fn rows_without_dates_are_skipped() {
        let html = r#"<tr><td><a href="/x">Some Tournament Name</a></td><td>TBD</td></tr>"#;
        assert_eq!(extract_candidates(html, date(TODAY)), Vec::new());
    }

    #[test]
    fn entities_are_decoded_in_names() {
        let html = r#"<tr><td><a href="/x">King&#39;s Crown &amp; Cup</a></td><td>2026-10-01</td></tr>"#;
        let candidates = extract_candidates(html, date(TODAY));
        assert_eq!(candidates[0].name, "King's Crown & Cup");
    }
}
