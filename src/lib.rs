//! Recipe engine for package-contributed project configuration.
//!
//! Packages ship a `cook.yaml` (or `cook.json`) recipe declaring the files
//! and directories they contribute to the consuming project. Applying a
//! recipe is idempotent and reversible: text-like formats carry the
//! contribution inside a `###> package ###` / `###< package ###` block, and
//! structured formats track it through the keys the recipe declares.
//!
//! The public API is organised into these layers:
//!
//! - **[`config`]**: the project manifest and path options
//! - **[`recipe`]**: loading, validating and defaulting recipes
//! - **[`markers`]** and **[`filters`]**: the block protocol and PHP value filters
//! - **[`mergers`]**: one applier per destination format
//! - **[`oven`]**: running recipes across packages
//! - **[`commands`]**: top-level subcommand orchestration (`install`, `uninstall`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod filters;
pub mod fs;
pub mod logging;
pub mod markers;
pub mod mergers;
pub mod oven;
pub mod php;
pub mod recipe;
pub mod state;
