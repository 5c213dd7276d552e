//! Runtime settings: playback tuning, library scanning, where preferences
//! live and how logging is filtered.
//!
//! `Settings::load` layers an optional TOML file and `ENCORE__` environment
//! variables over the struct defaults.

mod load;
mod schema;

pub use schema::*;
