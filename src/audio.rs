//! Audio output for local files, implemented on top of `rodio`.
//!
//! `RodioBackend` is the production `MediaBackend`: it owns the output
//! stream and at most one `Sink`, and reports progress back to the engine
//! through an event channel. It is polled with `tick()` from the UI loop
//! rather than running its own thread.

mod backend;
mod sink;

pub use backend::RodioBackend;

#[cfg(test)]
mod tests;
