//! Unseal - resolve `ENC[...]` secret handles in configuration documents.
//!
//! Configuration can reference secrets by opaque handle instead of storing
//! plaintext. Unseal finds every reference, asks an external backend command
//! for all missing handles in one batch, and writes the plaintext back.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── resolve       # Resolve a document
//! │   ├── handles       # List referenced handles
//! │   ├── check         # Inspect backend configuration
//! │   └── output        # Terminal output helpers
//! └── core/             # Resolution engine
//!     ├── config        # .unseal.toml and UNSEAL_* overrides
//!     ├── reference     # ENC[handle] parsing
//!     ├── walker        # Document tree traversal
//!     ├── cache         # Process-wide handle cache
//!     ├── backend/      # Backend protocol and subprocess runner
//!     ├── document      # YAML codec
//!     └── resolver      # Two-pass resolution
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use unseal::core::cache::HandleCache;
//! use unseal::core::config::Config;
//! use unseal::core::resolver::Resolver;
//!
//! let config = Config::load(None)?;
//! let resolver = Resolver::from_config(&config, Arc::new(HandleCache::new()));
//! let resolved = resolver.resolve(b"password: ENC[db_pass]\n")?;
//! # Ok::<(), unseal::error::Error>(())
//! ```

pub mod cli;
pub mod core;
pub mod error;
