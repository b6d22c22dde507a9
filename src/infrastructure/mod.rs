//! Infrastructure layer with caches, file-system adapters and configuration.

pub mod cache;
pub mod config;
pub mod image;
pub mod rewrites;
