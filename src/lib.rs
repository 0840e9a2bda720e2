pub mod build_info;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod service;
pub mod store;
