pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod migrate;
pub mod profile;
pub mod store;
