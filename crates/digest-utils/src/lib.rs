//! Shared utilities for portfolio-digest
//!
//! This crate provides common functionality used across the workspace,
//! including logging setup and environment-backed configuration helpers.

pub mod config;
pub mod logging;

pub use config::{EnvError, env_list, env_opt, env_or, env_parse, env_required, load_dotenv};
pub use logging::{LogFormat, init_tracing};
