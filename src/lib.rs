pub mod api;
pub mod app;
pub mod config;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;
pub mod uploads;
pub mod utils;
pub mod validation;

#[cfg(test)]
mod test_support;
