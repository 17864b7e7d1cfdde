//! Half-space clipping of a convex polytope down to a boundary
//! representation: vertices, edges and faces with explicit adjacency,
//! addressed by stable indices into growable pools.

pub mod clip;
pub mod error;
pub mod plane;
pub mod store;

pub use clip::{clip, ClipOutcome};
pub use error::GeomError;
pub use plane::{Plane, EPSILON};
pub use store::{Edge, Face, MeshStore, Vertex};
