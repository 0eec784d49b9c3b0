pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod form;
pub mod model;
pub mod notice;
pub mod notify;
pub mod output;
pub mod session;
pub mod shell;
pub mod store;
pub mod utils;

#[cfg(test)]
mod tests;
