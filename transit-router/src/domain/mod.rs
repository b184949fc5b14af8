//! Domain types for the transit router.
//!
//! Stops are the vertices of the transit graph and edges the directed,
//! weighted segments between them. Identity is always carried by the small
//! copyable id types; edges refer to stops by id and never own them.

mod coordinate;
mod edge;
mod route;
mod stop;

pub use coordinate::{Coordinate, EARTH_RADIUS_KM};
pub use edge::Edge;
pub use route::{Direction, EdgeKind, InvalidRouteId, RouteId, TRANSFER_SENTINEL};
pub use stop::{Stop, StopId};
