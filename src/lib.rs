pub mod api;
pub mod config;
pub mod db;
pub mod stats;
pub mod validation;
