use {
    rocket::{
        Build,
        Request,
        Rocket,
        response::content::RawText,
        serde::json::Json,
    },
    sqlx::PgPool,
    crate::{
        api,
        prelude::*,
    },
};

#[derive(Serialize)]
pub(crate) struct ErrorBody {
    pub(crate) error: String,
}

#[rocket::get("/robots.txt")]
async fn robots_txt() -> RawText<&'static str> {
    RawText("User-agent: *\nDisallow: /api/\n")
}

#[rocket::catch(404)]
fn not_found(request: &Request<'_>) -> Json<ErrorBody> {
    Json(ErrorBody { error: format!("no route matching {}", request.uri()) })
}

#[rocket::catch(500)]
fn internal_server_error() -> Json<ErrorBody> {
    Json(ErrorBody { error: "internal server error".to_owned() })
}

pub(crate) fn rocket(pool: PgPool, config: Config, cache: Arc<Cache<api::TournamentsResponse>>, sources: Arc<api::SourceSet>, port: u16) -> Rocket<Build> {
    rocket::custom(rocket::Config::figment().merge(("port", port)))
        .mount("/", rocket::routes![robots_txt])
        .mount("/api", rocket::routes![
            api::tournaments,
            api::curated_list,
            api::curated_get,
            api::curated_create,
            api::curated_update,
            api::curated_delete,
        ])
        .register("/", rocket::catchers![
            not_found,
            internal_server_error,
        ])
        .manage(pool)
        .manage(config)
        .manage(cache)
        .manage(sources)
}
