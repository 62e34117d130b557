//! Problem instance: city coordinates and their pairwise distances.

mod distance;
mod parse;

pub use distance::{DistanceModel, Point};
pub use parse::parse_instance;
