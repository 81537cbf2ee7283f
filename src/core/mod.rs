//! Core library components.
//!
//! Format resolution, payload codecs, the rotation merge and the engine
//! that drives them against a secret store.

pub mod catalog;
pub mod codec;
pub mod config;
pub mod constants;
pub mod domain;
pub mod engine;
pub mod merge;
pub mod path;
pub mod planner;
pub mod registry;
pub mod resolve;
pub mod store;
pub mod types;
pub mod validation;
