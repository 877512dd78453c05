pub mod config;
pub mod dataset;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod routes;
pub mod stats;
