//! World entities.

mod cell;
mod food;

pub use cell::Cell;
pub use food::Food;
