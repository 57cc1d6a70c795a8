//! Core engine: locale file resolution, key extraction, declaration synthesis
//! and key backtracking. Nothing here knows about the host editor service.

pub mod alias;
pub mod backtrack;
pub mod catalog;
pub mod fs;
pub mod include;
pub mod lib_module;
pub mod line_index;
pub mod parsers;
pub mod synth;

pub use alias::{AliasTable, AliasTarget};
pub use catalog::{Catalog, KeyDetail, KeyMap};
pub use fs::{FileSystem, LocaleFile, RealFileSystem};
pub use include::{IncludeGraph, IncludeResolver};
pub use lib_module::{LibKind, LibModule};
