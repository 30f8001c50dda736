//! Tournament listing pipeline and the JSON routes serving it.
//!
//! The pipeline never surfaces a hard failure to the browser: whatever goes
//! wrong upstream, the response is a success carrying either live data or
//! the static fallback dataset with an `error` field set.

use {
    async_trait::async_trait,
    itertools::Itertools as _,
    rocket::{
        State,
        http::Status as HttpStatus,
        request::{
            self,
            FromRequest,
            Request,
        },
        response::Debug,
        serde::json::Json,
    },
    sqlx::PgPool,
    crate::{
        aoe4world,
        db,
        fallback,
        liquipedia,
        normalize,
        prelude::*,
    },
};

pub(crate) const CACHE_KEY: &str = "tournaments";
pub(crate) const CACHE_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, thiserror::Error)]
pub(crate) enum SourceError {
    #[error(transparent)] Aoe4World(#[from] aoe4world::Error),
    #[error(transparent)] Liquipedia(#[from] liquipedia::Error),
}

/// One upstream producing intermediate tournament records. The seam exists
/// so the serving layer can be exercised with fakes.
#[async_trait]
pub(crate) trait TournamentSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn fetch(&self) -> Result<Vec<RawTournament>, SourceError>;
}

/// The two live upstreams, fetched concurrently and awaited jointly. Primary
/// is the results API; its records win on dedup since they carry more fields.
pub(crate) struct SourceSet {
    pub(crate) primary: Box<dyn TournamentSource>,
    pub(crate) secondary: Box<dyn TournamentSource>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub(crate) struct TournamentsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
    #[serde(flatten)]
    pub(crate) listing: Listing,
}

/// Runs the full pipeline once: joint fetch, merge, normalize, bucket. Only
/// when no live source yields any data does the response degrade to the
/// fallback dataset, flagged through the `error` field.
pub(crate) async fn assemble(sources: &SourceSet, today: NaiveDate) -> TournamentsResponse {
    let (primary, secondary) = tokio::join!(sources.primary.fetch(), sources.secondary.fetch());
    let mut raw = Vec::default();
    for (source, result) in [(&sources.primary, primary), (&sources.secondary, secondary)] {
        match result {
            Ok(batch) => raw.extend(batch),
            Err(e) => log::warn!("tournament source {} unavailable: {e}", source.name()),
        }
    }
    if raw.is_empty() {
        log::warn!("no live tournament data from any source, serving fallback dataset");
        return TournamentsResponse {
            error: Some("live tournament data unavailable".to_owned()),
            listing: fallback::listing(today),
        }
    }
    let tournaments = raw.into_iter()
        .enumerate()
        .map(|(i, raw)| normalize::normalize(raw, i as i64 + 1, today))
        .unique_by(|tournament| tournament.name.to_lowercase())
        .collect_vec();
    TournamentsResponse {
        error: None,
        listing: Listing::from_tournaments(tournaments),
    }
}

#[rocket::get("/tournaments?<refresh>")]
pub(crate) async fn tournaments(cache: &State<Arc<Cache<TournamentsResponse>>>, sources: &State<Arc<SourceSet>>, refresh: Option<bool>) -> Json<TournamentsResponse> {
    let today = Utc::now().date_naive();
    let response = if refresh.unwrap_or_default() {
        let response = assemble(sources, today).await;
        cache.set(CACHE_KEY, response.clone(), CACHE_TTL).await;
        response
    } else {
        cache.get_or_compute(CACHE_KEY, CACHE_TTL, || assemble(sources, today)).await
    };
    Json(response)
}

/// Guard for the admin CRUD routes, checked against the configured token.
pub(crate) struct AdminToken;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminToken {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, ()> {
        let Some(config) = request.guard::<&State<Config>>().await.succeeded() else {
            return request::Outcome::Error((HttpStatus::InternalServerError, ()))
        };
        match request.headers().get_one("X-Admin-Token") {
            Some(token) if token == config.admin_token => request::Outcome::Success(Self),
            _ => request::Outcome::Error((HttpStatus::Unauthorized, ())),
        }
    }
}

#[rocket::get("/tournaments/curated")]
pub(crate) async fn curated_list(pool: &State<PgPool>) -> Result<Json<Vec<db::CuratedTournament>>, Debug<sqlx::Error>> {
    Ok(Json(db::CuratedTournament::all(pool).await?))
}

#[rocket::get("/tournaments/curated/<id>")]
pub(crate) async fn curated_get(pool: &State<PgPool>, id: i64) -> Result<Option<Json<db::CuratedTournament>>, Debug<sqlx::Error>> {
    Ok(db::CuratedTournament::from_id(pool, id).await?.map(Json))
}

#[rocket::post("/admin/tournaments", format = "json", data = "<tournament>")]
pub(crate) async fn curated_create(pool: &State<PgPool>, _admin: AdminToken, tournament: Json<db::NewCuratedTournament>) -> Result<Json<db::CuratedTournament>, Debug<sqlx::Error>> {
    Ok(Json(db::CuratedTournament::create(pool, &tournament).await?))
}

#[rocket::put("/admin/tournaments/<id>", format = "json", data = "<tournament>")]
pub(crate) async fn curated_update(pool: &State<PgPool>, _admin: AdminToken, id: i64, tournament: Json<db::NewCuratedTournament>) -> Result<Option<Json<db::CuratedTournament>>, Debug<sqlx::Error>> {
    Ok(db::CuratedTournament::update(pool, id, &tournament).await?.map(Json))
}

#[rocket::delete("/admin/tournaments/<id>")]
pub(crate) async fn curated_delete(pool: &State<PgPool>, _admin: AdminToken, id: i64) -> Result<HttpStatus, Debug<sqlx::Error>> {
    Ok(if db::CuratedTournament::delete(pool, id).await? {
        HttpStatus::NoContent
    } else {
        HttpStatus::NotFound
    })
}

#[cfg(test)]
mod tests {
    use {
        std::sync::atomic::{
            AtomicUsize,
            Ordering,
        },
        rocket::local::asynchronous::Client,
        super::*,
    };

    struct FakeSource {
        calls: Arc<AtomicUsize>,
        records: Result<Vec<RawTournament>, fn() -> SourceError>,
    }

    impl FakeSource {
        fn ok(records: Vec<RawTournament>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::<AtomicUsize>::default();
            (Self { calls: Arc::clone(&calls), records: Ok(records) }, calls)
        }

        fn failing(error: fn() -> SourceError) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::<AtomicUsize>::default();
            (Self { calls: Arc::clone(&calls), records: Err(error) }, calls)
        }
    }

    #[async_trait]
    impl TournamentSource for FakeSource {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn fetch(&self) -> Result<Vec<RawTournament>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.records {
                Ok(records) => Ok(records.clone()),
                Err(error) => Err(error()),
            }
        }
    }

    fn date(ymd: (i32, u32, u32)) -> NaiveDate {
        NaiveDate::from_ymd_opt(ymd.0, ymd.1, ymd.2).unwrap()
    }

    fn raw(name: &str, start: NaiveDate) -> RawTournament {
        RawTournament::new(name, start, start + chrono::Days::new(1))
    }

    fn test_rocket(sources: SourceSet) -> rocket::Rocket<rocket::Build> {
        let config = Config {
            liquipedia_api_url: "https://liquipedia.net/ageofempires/api.php".parse().unwrap(),
            aoe4world_api_url: "https://aoe4world.com/api/v0/tournaments".parse().unwrap(),
            aoe4world_api_key: None,
            admin_token: "test-admin-token".to_owned(),
            database: None,
        };
        let pool = sqlx::postgres::PgPoolOptions::new().connect_lazy_with(sqlx::postgres::PgConnectOptions::new());
        crate::http::rocket(pool, config, Arc::new(Cache::new(crate::cache::DEFAULT_MAX_ENTRIES)), Arc::new(sources), 0)
    }

    #[rocket::async_test]
    async fn second_request_within_ttl_hits_the_cache() {
        let (primary, primary_calls) = FakeSource::ok(vec![raw("Copa Brasil Aberta", date((2031, 9, 5)))]);
        let (secondary, secondary_calls) = FakeSource::ok(vec![raw("Liga Comunitaria", date((2031, 10, 1)))]);
        let client = Client::tracked(test_rocket(SourceSet {
            primary: Box::new(primary),
            secondary: Box::new(secondary),
        })).await.unwrap();
        let first = client.get("/api/tournaments").dispatch().await.into_json::<TournamentsResponse>().await.unwrap();
        let second = client.get("/api/tournaments").dispatch().await.into_json::<TournamentsResponse>().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.error, None);
        assert_eq!(first.listing.upcoming.len(), 2);
    }

    #[rocket::async_test]
    async fn refresh_flag_bypasses_the_cache() {
        let (primary, primary_calls) = FakeSource::ok(vec![raw("Copa Brasil Aberta", date((2031, 9, 5)))]);
        let (secondary, _) = FakeSource::ok(Vec::new());
        let client = Client::tracked(test_rocket(SourceSet {
            primary: Box::new(primary),
            secondary: Box::new(secondary),
        })).await.unwrap();
        client.get("/api/tournaments").dispatch().await;
        client.get("/api/tournaments?refresh=true").dispatch().await;
        assert_eq!(primary_calls.load(Ordering::SeqCst), 2);
    }

    #[rocket::async_test]
    async fn total_upstream_failure_degrades_to_the_fallback_dataset() {
        let (primary, _) = FakeSource::failing(|| aoe4world::Error::MalformedShape.into());
        let (secondary, _) = FakeSource::failing(|| liquipedia::Error::LowConfidence(1).into());
        let client = Client::tracked(test_rocket(SourceSet {
            primary: Box::new(primary),
            secondary: Box::new(secondary),
        })).await.unwrap();
        let response = client.get("/api/tournaments").dispatch().await;
        assert_eq!(response.status(), rocket::http::Status::Ok);
        let body = response.into_json::<TournamentsResponse>().await.unwrap();
        assert!(body.error.is_some());
        assert_eq!(body.listing, fallback::listing(Utc::now().date_naive()));
    }

    #[rocket::async_test]
    async fn low_confidence_extraction_substitutes_the_fallback_grouping() {
        let (primary, _) = FakeSource::ok(Vec::new());
        let (secondary, _) = FakeSource::failing(|| liquipedia::Error::LowConfidence(2).into());
        let client = Client::tracked(test_rocket(SourceSet {
            primary: Box::new(primary),
            secondary: Box::new(secondary),
        })).await.unwrap();
        let body = client.get("/api/tournaments").dispatch().await.into_json::<TournamentsResponse>().await.unwrap();
        assert_eq!(body.listing, fallback::listing(Utc::now().date_naive()));
        assert!(body.error.is_some());
    }

    #[rocket::async_test]
    async fn admin_routes_require_the_token() {
        let (primary, _) = FakeSource::ok(Vec::new());
        let (secondary, _) = FakeSource::ok(Vec::new());
        let client = Client::tracked(test_rocket(SourceSet {
            primary: Box::new(primary),
            secondary: Box::new(secondary),
        })).await.unwrap();
        let response = client.delete("/api/admin/tournaments/1").dispatch().await;
        assert_eq!(response.status(), rocket::http::Status::Unauthorized);
    }

    #[tokio::test]
    async fn duplicate_records_across_sources_collapse_to_the_primary() {
        let (primary, _) = FakeSource::ok(vec![{
            let mut record = raw("Copa Brasil Aberta", date((2026, 9, 5)));
            record.id = Some(7);
            record
        }]);
        let (secondary, _) = FakeSource::ok(vec![raw("copa brasil aberta", date((2026, 9, 5)))]);
        let sources = SourceSet { primary: Box::new(primary), secondary: Box::new(secondary) };
        let response = assemble(&sources, date((2026, 8, 29))).await;
        assert_eq!(response.listing.len(), 1);
        assert_eq!(response.listing.upcoming[0].id, 7);
    }

    #[tokio::test]
    async fn one_live_source_is_enough_for_live_data() {
        let (primary, _) = FakeSource::failing(|| aoe4world::Error::MalformedShape.into());
        let (secondary, _) = FakeSource::ok(vec![raw("Liga Comunitaria", date((2026, 10, 1)))]);
        let sources = SourceSet { primary: Box::new(primary), secondary: Box::new(secondary) };
        let response = assemble(&sources, date((2026, 8, 29))).await;
        assert_eq!(response.error, None);
        assert_eq!(response.listing.upcoming.len(), 1);
    }
}
