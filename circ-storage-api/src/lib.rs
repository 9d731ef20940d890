#[macro_use]
extern crate rocket;

use rocket::figment::value::Map;
use rocket::figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use rocket::request::Request;
use rocket::serde::json::{Json, Value, json};
use rocket::{Build, Rocket};

pub mod api;
pub mod expiry;
pub mod logged_json;
pub mod models;
pub mod okapi_headers;
pub mod orm;
pub use orm::DbConn;
pub mod query;
pub mod schema;

fn error_body(status: u16, error: &str, req: &Request) -> Json<Value> {
    Json(json!({
        "error": error,
        "path": req.uri().path().to_string(),
        "status": status
    }))
}

#[catch(400)]
fn bad_request(req: &Request) -> Json<Value> {
    error_body(400, "Bad Request", req)
}

#[catch(404)]
fn not_found(req: &Request) -> Json<Value> {
    error_body(404, "Not Found", req)
}

#[catch(422)]
fn unprocessable_entity(req: &Request) -> Json<Value> {
    error_body(422, "Unprocessable Entity", req)
}

#[catch(500)]
fn internal_server_error(req: &Request) -> Json<Value> {
    error_body(500, "Internal Server Error", req)
}

#[catch(default)]
fn default_catcher(status: rocket::http::Status, req: &Request) -> Json<Value> {
    error_body(status.code, status.reason().unwrap_or("Unknown Error"), req)
}

pub fn mount_api_routes(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket.mount("/", api::routes())
}

pub fn register_catchers(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket.register(
        "/",
        catchers![
            bad_request,
            not_found,
            unprocessable_entity,
            internal_server_error,
            default_catcher
        ],
    )
}

fn log_rocket_info(rocket: &Rocket<Build>) {
    let figment = rocket.figment();

    if let Ok(address) = figment.extract_inner::<String>("address") {
        info!("Rocket is running at: {}", address);
    }

    if let Ok(port) = figment.extract_inner::<u16>("port") {
        info!("Rocket is listening on port: {}", port);
    }

    match figment.extract_inner::<Map<String, Value>>("databases.sqlite_db") {
        Ok(db_config) => {
            if let Some(Value::String(url)) = db_config.get("url") {
                info!("Database URL: {}", url);
            } else {
                warn!("Database URL not found in configuration");
            }
        }
        Err(e) => {
            warn!("Failed to extract database configuration: {}", e);
        }
    }
}

/// Builds the configuration: Rocket defaults, then `Rocket.toml`, then
/// `ROCKET_*` variables, then the database URL if one is given.
pub fn figment(database_url: Option<String>) -> Figment {
    let figment = Figment::from(rocket::Config::default())
        .merge(Toml::file("Rocket.toml").nested())
        .merge(Env::prefixed("ROCKET_").global());

    match database_url {
        Some(url) => figment.merge(("databases.sqlite_db.url", url)),
        None => figment,
    }
}

/// Assembles the application on top of `figment`.
pub fn rocket_from(figment: Figment) -> Rocket<Build> {
    let rocket = rocket::custom(figment)
        .attach(DbConn::fairing())
        .attach(orm::run_migrations_fairing());

    log_rocket_info(&rocket);

    register_catchers(mount_api_routes(rocket))
}

/// Builds the application from the environment. `DATABASE_URL` (also read
/// from a `.env` file) selects the SQLite database.
///
/// Note that this function doesn't get tested by our tests. Tests set up an
/// in-memory database through `orm::testing::test_rocket`.
pub fn rocket() -> Rocket<Build> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").ok();
    if database_url.is_none() {
        warn!("DATABASE_URL is not set; relying on Rocket.toml for the database URL");
    }

    rocket_from(figment(database_url))
}
