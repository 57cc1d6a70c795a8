pub mod check;
mod command_result;
pub mod context;
pub mod includes;
pub mod keys;
pub mod lookup;
pub mod synth;

pub use command_result::*;
pub use context::ProjectContext;
