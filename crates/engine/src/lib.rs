//! Improv Studio Engine library.
//!
//! This crate contains all server-side code for the improv studio.
//!
//! ## Structure
//!
//! - `use_cases/` - Turn orchestration, dialogue generation and fallback
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - HTTP entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
