// Library for tests to access modules

pub mod aggregator;
pub mod config;
pub mod discovery;
pub mod endpoint;
pub mod models;
pub mod routes;
pub mod version;
