//! Core library components.
//!
//! Contains the resolution engine: reference parsing, tree walking, the
//! handle cache, the backend client, and the orchestrating resolver.

pub mod backend;
pub mod cache;
pub mod config;
pub mod constants;
pub mod document;
pub mod reference;
pub mod resolver;
pub mod walker;
