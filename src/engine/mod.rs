//! Transition engine.
//!
//! # Modules
//!
//! - `scripts` - executed-script tracking and script disposition
//! - `head` - head reconciliation (stylesheet continuity, hint dedup)
//! - `body` - atomic body swap with script refresh
//! - `events` - scoped before/after transition listeners
//! - `manager` - the orchestrator tying the above together

pub mod body;
pub mod events;
pub mod head;
pub mod manager;
pub mod scripts;

#[cfg(test)]
mod tests;
