//! Application module: view state for the terminal UI.
//!
//! `App` lives in `app::model` and holds the scanned library, pane focus,
//! cursors and the latest engine snapshot.

mod model;

pub use model::*;
