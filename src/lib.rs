// Library for tests to access modules

pub mod actions;
pub mod auth;
pub mod balance_repo;
pub mod command;
pub mod config;
pub mod error;
pub mod history_repo;
pub mod models;
pub mod network;
pub mod routes;
pub mod sampler;
pub mod service_repo;
pub mod sysinfo_repo;
pub mod version;
pub mod worker;
