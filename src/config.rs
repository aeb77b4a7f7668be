use std::time::Duration;

use log::{error, info};
use mongodb::{bson::doc, options::ClientOptions, Client as MongoClient};
use rocket::{
    fairing::{Fairing, Info, Kind},
    figment::{providers::Env, Figment},
    Build, Rocket,
};
use serde::{Deserialize, Deserializer};

use crate::model::mongodb::CollectionName;

/// How long startup may spend reaching the database before giving up.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Plain (unprefixed) environment variables the service reads, alongside
/// Rocket's own `Rocket.toml` and `ROCKET_*` sources.
const PLAIN_ENV_KEYS: &[&str] = &[
    "port",
    "database_url",
    "database_name",
    "collection_name",
    "database_collection",
    "cors_origins",
];

/// The figment the server is configured from.
///
/// `DATABASE_COLLECTION` is accepted as an alias of `COLLECTION_NAME`.
pub fn figment() -> Figment {
    let plain_env = Env::raw().only(PLAIN_ENV_KEYS).map(|key| {
        if key == "database_collection" {
            "collection_name".into()
        } else {
            key.into()
        }
    });
    rocket::Config::figment().merge(plain_env)
}

/// Application configuration, derived from `Rocket.toml` and environment
/// variables. This struct becomes managed state and can be inspected by any
/// endpoint or fairing.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Origins allowed to make cross-origin requests. Empty allows any.
    #[serde(default, deserialize_with = "origin_list")]
    cors_origins: Vec<String>,
}

/// Origins come either as a list or as a single comma-separated string, the
/// form a plain environment variable takes.
fn origin_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Origins {
        List(Vec<String>),
        Joined(String),
    }

    let origins = match Origins::deserialize(deserializer)? {
        Origins::List(list) => list,
        Origins::Joined(joined) => joined.split(',').map(str::to_string).collect(),
    };
    Ok(origins
        .into_iter()
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect())
}

impl Config {
    /// Configured via `CORS_ORIGINS`.
    pub fn cors_origins(&self) -> &[String] {
        &self.cors_origins
    }
}

/// A fairing that loads the application config and puts it in managed state.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// Configuration for the database.
#[derive(Deserialize)]
struct DbConfig {
    // secrets
    database_url: String,
    // non-secrets
    database_name: String,
    collection_name: String,
}

/// A fairing that loads the MongoDB config, connects to the database, and
/// places the `Client`, `Database` and party `CollectionName` into managed
/// state.
pub struct DatabaseFairing;

#[rocket::async_trait]
impl Fairing for DatabaseFairing {
    fn info(&self) -> Info {
        Info {
            name: "MongoDB",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<DbConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load database config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        info!("Loaded database config, connecting...");

        let client = match connect(&config.database_url).await {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to connect to database: {e}");
                return Err(rocket);
            }
        };
        let db = client.database(&config.database_name);
        info!(
            "...database connection online! Database: {}, collection: {}",
            config.database_name, config.collection_name
        );

        // Manage the state.
        rocket = rocket
            .manage(client)
            .manage(db)
            .manage(CollectionName(config.collection_name));
        Ok(rocket)
    }
}

/// Build a client for the given URI and make sure the server answers within
/// [`CONNECT_TIMEOUT`]. The driver connects lazily, so without the ping a bad
/// URI would only surface on the first request.
async fn connect(uri: &str) -> Result<MongoClient, mongodb::error::Error> {
    let mut options = ClientOptions::parse(uri).await?;
    options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
    options.connect_timeout = Some(CONNECT_TIMEOUT);
    options.server_selection_timeout = Some(CONNECT_TIMEOUT);
    let client = MongoClient::with_options(options)?;
    client
        .database("admin")
        .run_command(doc! { "ping": 1 }, None)
        .await?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rocket::figment::providers::{Format, Toml};

    #[test]
    fn cors_origins_default_to_empty() {
        let config: Config = Figment::new().extract().unwrap();
        assert!(config.cors_origins().is_empty());
    }

    #[test]
    fn database_config_from_toml() {
        let figment = Figment::from(Toml::string(
            r#"
            database_url = "mongodb://db:27017"
            database_name = "payparty"
            collection_name = "parties"
            cors_origins = ["https://app.example"]
            "#,
        ));
        let db: DbConfig = figment.extract().unwrap();
        assert_eq!(db.database_url, "mongodb://db:27017");
        assert_eq!(db.database_name, "payparty");
        assert_eq!(db.collection_name, "parties");
        let config: Config = figment.extract().unwrap();
        assert_eq!(config.cors_origins(), ["https://app.example".to_string()]);
    }

    #[test]
    fn cors_origins_from_plain_string() {
        let config: Config = Figment::new()
            .merge(("cors_origins", "https://app.example"))
            .extract()
            .unwrap();
        assert_eq!(config.cors_origins(), ["https://app.example".to_string()]);
    }

    #[test]
    fn cors_origins_from_comma_list() {
        let config: Config = Figment::new()
            .merge(("cors_origins", "https://a.example, https://b.example,"))
            .extract()
            .unwrap();
        assert_eq!(
            config.cors_origins(),
            [
                "https://a.example".to_string(),
                "https://b.example".to_string()
            ]
        );

        let config: Config = Figment::new()
            .merge(("cors_origins", ""))
            .extract()
            .unwrap();
        assert!(config.cors_origins().is_empty());
    }

    #[test]
    fn cors_origins_from_sequence() {
        let config: Config = Figment::new()
            .merge(("cors_origins", ["https://a.example", "https://b.example"]))
            .extract()
            .unwrap();
        assert_eq!(config.cors_origins().len(), 2);
        assert_eq!(config.cors_origins()[1], "https://b.example");
    }

    #[test]
    fn missing_database_config_fails() {
        let figment = Figment::from(Toml::string(r#"database_url = "mongodb://db:27017""#));
        assert!(figment.extract::<DbConfig>().is_err());
    }
}
