//! Terminal plots for the non-interactive `report` / `plot` commands.

pub mod ascii;

pub use ascii::*;
