//! Cross-module scenarios.
//!
//! - `determinism.rs`: same seed, same inputs, same arena
//! - `integration.rs`: full frame pipeline from spawn to cleanup
//! - `helpers.rs`: setup utilities shared by both

mod helpers;
