//! Demonstration object graphs for jsync.
//!
//! Each scenario saves a graph to a JSON file, reads the file back into a
//! fresh instance and reports both sides.

pub mod animals;
pub mod scenario;
pub mod shapes;

pub use scenario::{Outcome, read_document, run_animals, run_line, run_zoo, write_document};
