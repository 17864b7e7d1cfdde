use std::collections::HashMap;

use glam::Vec3;

use crate::triangulate::TriangulatedFace;
use crate::types::Tangent;

/// One texture's worth of triangulated geometry, accumulated across every
/// brush and face an entity contributes to it.
#[derive(Debug, Default, Clone)]
pub struct TextureMesh {
    pub texture_id: u32,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tangents: Vec<Tangent>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u16>,
}

impl TextureMesh {
    fn new(texture_id: u32) -> Self {
        Self {
            texture_id,
            ..Default::default()
        }
    }

    fn absorb(&mut self, face: TriangulatedFace) {
        let base = self.positions.len() as u16;

        self.positions.extend(face.positions);
        self.normals.extend(face.normals);
        self.tangents.extend(face.tangents);
        self.uvs.extend(face.uvs);

        for tri in face.triangles {
            self.indices.push(base + tri[0]);
            self.indices.push(base + tri[1]);
            self.indices.push(base + tri[2]);
        }
    }
}

/// Maintains one [`TextureMesh`] per texture identity, keyed by the
/// integer hash cached on each face at parse time.
#[derive(Debug, Default)]
pub struct MeshGroup {
    by_texture: HashMap<u32, TextureMesh>,
    /// Preserves first-seen order so output mesh order is deterministic.
    order: Vec<u32>,
}

impl MeshGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_face(&mut self, face: TriangulatedFace) {
        let texture_id = face.texture_id;
        if !self.by_texture.contains_key(&texture_id) {
            self.order.push(texture_id);
            self.by_texture
                .insert(texture_id, TextureMesh::new(texture_id));
        }
        self.by_texture.get_mut(&texture_id).unwrap().absorb(face);
    }

    /// Finished meshes, one per texture, in the order their texture was
    /// first encountered.
    pub fn into_meshes(self) -> Vec<TextureMesh> {
        let Self {
            mut by_texture,
            order,
        } = self;
        order
            .into_iter()
            .map(|id| by_texture.remove(&id).expect("order tracks by_texture"))
            .collect()
    }
}
