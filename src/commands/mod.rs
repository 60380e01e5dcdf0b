//! Command workflows behind the CLI surface.

pub mod add;
pub mod auto;
pub mod generate;
