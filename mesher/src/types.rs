use glam::Vec3;

/// The per-face payload carried by the polytope's `Face<FaceData>`: the
/// UV basis and the texture this face belongs to. Everything the mesher
/// needs that isn't already on the face (its normal, its edge loop).
#[derive(Debug, Clone, Copy)]
pub struct FaceData {
    pub u: Vec3,
    pub v: Vec3,
    pub u_scale: f32,
    pub v_scale: f32,
    pub u_offset: f32,
    pub v_offset: f32,
    pub texture_id: u32,
}

/// Requested traversal direction of a face's vertex ring, as seen looking
/// against the face normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    Cw,
    Ccw,
    Any,
}

/// Tangent direction plus the handedness a renderer needs to reconstruct
/// the bitangent (`bitangent = cross(normal, tangent) * handedness`).
#[derive(Debug, Clone, Copy)]
pub struct Tangent {
    pub dir: Vec3,
    pub handedness: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct MesherOptions {
    /// Snap emitted positions to the nearest integer world unit, masking
    /// sub-voxel drift accumulated over many clips at the cost of detail.
    pub snap_positions: bool,
    pub winding: Winding,
}

impl Default for MesherOptions {
    fn default() -> Self {
        Self {
            snap_positions: true,
            winding: Winding::Ccw,
        }
    }
}
