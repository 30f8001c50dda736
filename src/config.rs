use {
    std::path::Path,
    tokio::fs,
    url::Url,
    crate::prelude::*,
};

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error(transparent)] Io(#[from] std::io::Error),
    #[error(transparent)] Json(#[from] serde_json::Error),
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Config {
    /// MediaWiki `api.php` endpoint of the wiki the tournament calendar is scraped from.
    pub(crate) liquipedia_api_url: Url,
    /// Tournament listing endpoint of the results API.
    pub(crate) aoe4world_api_url: Url,
    #[serde(default)]
    pub(crate) aoe4world_api_key: Option<String>,
    pub(crate) admin_token: String,
    #[serde(default)]
    pub(crate) database: Option<ConfigDatabase>,
}

impl Config {
    pub(crate) async fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        Ok(serde_json::from_slice(&fs::read(path).await?)?)
    }
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfigDatabase {
    pub(crate) host: Option<String>,
    pub(crate) port: Option<u16>,
    pub(crate) username: Option<String>,
    pub(crate) password: Option<String>,
    pub(crate) database: Option<String>,
}
