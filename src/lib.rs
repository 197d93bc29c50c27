pub mod cli;
pub mod config;
pub mod errors;
pub mod normalize;
pub mod prompt;
pub mod provider;
pub mod routes;
pub mod schema;
pub mod store;
pub mod uploads;
pub mod wire;
