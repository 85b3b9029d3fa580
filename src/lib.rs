pub mod config;
pub mod engine;
pub mod job;
pub mod merge;
pub mod naming;
pub mod runner;
pub mod selector;
