//! Configuration types
//!
//! User-facing configs hold literal-or-provider values. `bind` evaluates them
//! once into plain settings structs that the running component keeps.

pub mod database;
pub mod table;
pub mod templatable;

pub use database::*;
pub use table::*;
pub use templatable::Templatable;
