pub mod app_state;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers_files;
pub mod handlers_songs;
pub mod models;
pub mod negotiation;
pub mod routes;
pub mod schema;
pub mod startup;
pub mod store;
pub mod uploads;

#[cfg(test)]
pub mod test_utils;
