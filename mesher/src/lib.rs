//! Turns a clipped polytope's faces into per-texture triangle meshes:
//! ring construction, winding correction, UV projection, and grouping.

pub mod group;
pub mod triangulate;
pub mod types;

pub use group::{MeshGroup, TextureMesh};
pub use triangulate::{correct_winding, face_ring, project_uv, tangent_for, triangulate_face, TriangulatedFace};
pub use types::{FaceData, MesherOptions, Tangent, Winding};
