pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod guard;
pub mod logging;
pub mod models;
pub mod routes;
pub mod seed;
pub mod services;
pub mod state;
