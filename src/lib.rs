//! Locale Keys - typed message keys for YAML locale catalogs
//!
//! A language-service plugin that makes the keys of YAML locale files visible
//! to the editor's type checker. Each locale file is replaced, inside the
//! host's view only, by a synthesized declaration module whose key union
//! lists exactly the keys the file and its includes define. Literal keys
//! then get completion, checking, go-to-definition and hover.
//!
//! ## Module Structure
//!
//! - `cli`: developer command-line interface
//! - `config`: plugin options and `tsconfig.json` loading
//! - `core`: locale file resolution, key extraction, synthesis, backtracking
//! - `host`: the host language-service surface the plugin decorates
//! - `plugin`: plugin entry point and the decorators it hands to the host
//! - `utils`: shared path helpers

pub mod cli;
pub mod config;
pub mod core;
pub mod host;
pub mod plugin;
pub mod utils;
