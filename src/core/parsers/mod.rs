//! Source parsers.
//!
//! - `script`: TS/TSX/JS source parsed with swc, to find key literals at a position

pub mod script;
