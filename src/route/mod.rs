//! Tour representation and starting-tour construction.

mod construct;
mod state;

pub use construct::nearest_neighbor;
pub use state::RouteState;
