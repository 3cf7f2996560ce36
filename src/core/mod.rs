//! Core translation engine module

pub mod client;
pub mod config;
pub mod debounce;
pub mod detector;
pub mod errors;
pub mod history;
pub mod models;
pub mod orchestrator;
pub mod session;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;
