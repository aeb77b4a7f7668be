#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use crate::config::{ConfigFairing, DatabaseFairing};
use crate::cors::CorsFairing;
use crate::logging::LoggerFairing;

pub mod api;
pub mod config;
pub mod cors;
pub mod error;
pub mod logging;
pub mod model;

/// Assemble the server: configuration, database connection, CORS and
/// request logging, and the party routes.
pub fn build() -> Rocket<Build> {
    rocket_base().attach(DatabaseFairing)
}

/// Everything except the database connection. Tests use this directly for
/// routes that never touch the store.
fn rocket_base() -> Rocket<Build> {
    rocket::custom(config::figment())
        .mount("/", api::routes())
        .attach(ConfigFairing)
        .attach(CorsFairing)
        .attach(LoggerFairing)
}

/// Collection used by the database-backed tests.
#[cfg(test)]
const TEST_COLLECTION: &str = "parties";

/// Connect to the test database server, panicking if there isn't one running.
/// The server is taken from `DATABASE_URL`, defaulting to a local instance.
#[cfg(test)]
async fn db_client() -> mongodb::Client {
    use mongodb::{bson::doc, options::ClientOptions};
    use std::time::Duration;

    let uri = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    let mut options = ClientOptions::parse(&uri)
        .await
        .unwrap_or_else(|err| panic!("Bad DATABASE_URL {uri:?}: {err}"));
    options.connect_timeout = Some(Duration::from_secs(2));
    options.server_selection_timeout = Some(Duration::from_secs(2));
    let client = mongodb::Client::with_options(options).unwrap();
    client
        .database("admin")
        .run_command(doc! { "ping": 1 }, None)
        .await
        .unwrap_or_else(|err| panic!("No MongoDB server reachable at {uri}: {err}"));
    client
}

/// Get the name of the database to use.
/// Use a random name to avoid collisions between tests.
#[cfg(test)]
fn database() -> String {
    let random: u32 = rand::random();
    format!("test{random}")
}

/// A server using the given database in place of the configured one.
#[cfg(test)]
fn rocket_for_db(db_client: mongodb::Client, db_name: &str) -> Rocket<Build> {
    use crate::model::mongodb::CollectionName;

    let db = db_client.database(db_name);
    rocket_base()
        .manage(db_client)
        .manage(db)
        .manage(CollectionName(TEST_COLLECTION.to_string()))
}
