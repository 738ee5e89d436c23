//! Notelink - shareable note links
//!
//! Stores note content under short random slugs with an expiry, rate limits
//! link creation per client address and serves notes back as escaped HTML.
//!
//! # Architecture
//! - `api`: HTTP handlers (share API, public page, health) and middleware
//! - `services`: link issuance / resolution, rate limiting, slug generation
//! - `storage`: key-value store trait and backends (memory, Redis)
//! - `config`: static configuration (TOML + environment)
//! - `runtime`: application lifecycle and execution modes
//! - `system`: logging setup
//! - `cli`: command-line definitions

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
