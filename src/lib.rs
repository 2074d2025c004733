//! # Task Runner
//!
//! An HTTP service that turns plain-English tasks into scripts and runs them.
//!
//! This library provides:
//! - An HTTP API for task submission and file reads
//! - A completion client for OpenAI-compatible chat endpoints
//! - Script materialization with inline dependency metadata, executed via `uv run`
//!
//! ## Flow
//!
//! 1. Receive a task via `POST /run`
//! 2. Ask the model for `{code, dependencies}` under a strict JSON schema
//! 3. Write the script with its dependency header into a per-request directory
//! 4. Run it in the workspace and report how it ended
//!
//! ## Example
//!
//! ```rust,ignore
//! use task_runner::{agent::TaskRunner, config::Config};
//!
//! let config = Config::from_env()?;
//! let runner = TaskRunner::new(&config);
//! let outcome = runner.run_task("list files in current directory").await?;
//! ```

pub mod agent;
pub mod api;
pub mod config;
pub mod llm;
pub mod tools;

pub use config::Config;
