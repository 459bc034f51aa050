//! Utility modules for the transition engine.

pub mod html;
