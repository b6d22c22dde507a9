//! Imagehub - an image resolution and derivative service.
//!
//! This crate maps legacy image identifiers to files on disk, produces resized
//! and re-encoded derivatives on demand, and caches both the rewrite table and
//! the derivatives in memory behind an axum HTTP surface.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing services and DTOs.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing caches, file-system adapters and configuration.
pub mod infrastructure;
/// Presentation layer containing the HTTP router and handlers.
pub mod presentation;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "imagehub";
