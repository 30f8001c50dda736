use {
    std::path::PathBuf,
    clap::Parser as _,
    futures::future::FutureExt as _,
    sqlx::postgres::{
        PgConnectOptions,
        PgPoolOptions,
    },
    crate::prelude::*,
};

mod aoe4world;
mod api;
mod cache;
mod config;
mod db;
mod fallback;
mod http;
mod liquipedia;
mod normalize;
mod prelude;
mod tournament;

#[derive(clap::Parser)]
#[clap(version)]
struct Args {
    #[clap(long)]
    port: Option<u16>,
    #[clap(long, default_value = "assets/config.json")]
    config: PathBuf,
}

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error(transparent)] Config(#[from] config::Error),
    #[error(transparent)] Reqwest(#[from] reqwest::Error),
    #[error(transparent)] Rocket(#[from] rocket::Error),
    #[error(transparent)] Task(#[from] tokio::task::JoinError),
}

#[rocket::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
    let config = Config::load(&args.config).await?;
    let http_client = reqwest::Client::builder()
        .user_agent(concat!("Aoe4Brasil/", env!("CARGO_PKG_VERSION"), " (https://github.com/aoe4brasil/site)"))
        .timeout(Duration::from_secs(10))
        .use_rustls_tls()
        .https_only(true)
        .build()?;
    let mut db_options = PgConnectOptions::new()
        .application_name("aoe4-brasil")
        .database("aoe4_brasil");
    if let Some(ref db_config) = config.database {
        if let Some(ref host) = db_config.host {
            db_options = db_options.host(host);
        }
        if let Some(port) = db_config.port {
            db_options = db_options.port(port);
        }
        if let Some(ref username) = db_config.username {
            db_options = db_options.username(username);
        }
        if let Some(ref password) = db_config.password {
            db_options = db_options.password(password);
        }
        if let Some(ref database) = db_config.database {
            db_options = db_options.database(database);
        }
    }
    let pool = PgPoolOptions::default()
        .max_connections(16)
        .connect_lazy_with(db_options);
    let cache = Arc::new(Cache::new(cache::DEFAULT_MAX_ENTRIES));
    let sources = Arc::new(api::SourceSet {
        primary: Box::new(aoe4world::Aoe4WorldSource {
            http_client: http_client.clone(),
            api_url: config.aoe4world_api_url.clone(),
            api_key: config.aoe4world_api_key.clone(),
        }),
        secondary: Box::new(liquipedia::LiquipediaSource {
            http_client,
            api_url: config.liquipedia_api_url.clone(),
        }),
    });
    let rocket = http::rocket(pool, config, Arc::clone(&cache), Arc::clone(&sources), args.port.unwrap_or(24816)).ignite().await?;
    let refresh_task = tokio::spawn(refresh_manager(cache, sources, rocket.shutdown())).map(|res| match res {
        Ok(()) => Ok(()),
        Err(e) => Err(Error::Task(e)),
    });
    let rocket_task = tokio::spawn(rocket.launch()).map(|res| match res {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => Err(Error::from(e)),
        Err(e) => Err(Error::from(e)),
    });
    let ((), ()) = tokio::try_join!(rocket_task, refresh_task)?;
    Ok(())
}

/// Background task keeping the tournament listing cache warm.
async fn refresh_manager(cache: Arc<Cache<api::TournamentsResponse>>, sources: Arc<api::SourceSet>, shutdown: rocket::Shutdown) {
    let mut interval = tokio::time::interval(api::CACHE_TTL);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let response = api::assemble(&sources, Utc::now().date_naive()).await;
                log::info!("refreshed tournament listing cache ({} tournaments)", response.listing.len());
                cache.set(api::CACHE_KEY, response, api::CACHE_TTL).await;
            }
            _ = shutdown.clone() => break,
        }
    }
}
