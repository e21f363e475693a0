pub mod cache;
pub mod commands;
pub mod config;
pub mod error;
pub mod git;
pub mod http;
pub mod report;
pub mod resolver;
pub mod resolvers;
pub mod sync;

pub use sync::sync;
