use glam::Vec3;
use tracing::trace;

use geom::MeshStore;

use crate::types::{FaceData, MesherOptions, Tangent, Winding};

/// Walks `face`'s unordered edge list into a closed vertex ring
/// (`ring.len() == edges.len() + 1`, first == last).
pub fn face_ring(store: &MeshStore<FaceData>, face: usize) -> Vec<usize> {
    let edges = &store.faces[face].edges;
    let edge_count = edges.len();

    if edge_count == 0 {
        return Vec::new();
    }

    let first = &store.edges[edges[0]];
    let mut ring = Vec::with_capacity(edge_count + 1);
    ring.push(first.vertices[0]);
    ring.push(first.vertices[1]);

    for i in 1..edge_count {
        let prev = ring[i - 1];
        let current = ring[i];

        let next = edges.iter().find_map(|&e_idx| {
            let e = &store.edges[e_idx];
            if e.vertices[0] == current && e.vertices[1] != prev {
                Some(e.vertices[1])
            } else if e.vertices[1] == current && e.vertices[0] != prev {
                Some(e.vertices[0])
            } else {
                None
            }
        });

        ring.push(next.expect("face edge loop is not a single closed ring"));
    }

    ring
}

pub fn correct_winding(store: &MeshStore<FaceData>, normal: Vec3, ring: &mut [usize], target: Winding) {
    if target == Winding::Any || ring.len() < 2 {
        return;
    }

    let mut accumulator = Vec3::ZERO;
    for pair in ring.windows(2) {
        let p0 = store.vertices[pair[0]].position;
        let p1 = store.vertices[pair[1]].position;
        accumulator += p0.cross(p1);
    }

    let length = accumulator.length();
    if length <= f32::EPSILON {
        return;
    }
    let accumulator = accumulator / length;

    let current = if normal.dot(accumulator) > 0.0 {
        Winding::Ccw
    } else {
        Winding::Cw
    };

    if current != target {
        ring.reverse();
    }
}

/// `u = (p . U) * su + ou`, `v = (p . V) * sv + ov`.
pub fn project_uv(face: &FaceData, position: Vec3) -> [f32; 2] {
    [
        position.dot(face.u) * face.u_scale + face.u_offset,
        position.dot(face.v) * face.v_scale + face.v_offset,
    ]
}

pub fn tangent_for(face: &FaceData, normal: Vec3) -> Tangent {
    let handedness = if face.u.cross(face.v).dot(normal) >= 0.0 {
        1.0
    } else {
        -1.0
    };
    Tangent {
        dir: face.u,
        handedness,
    }
}

fn snap(options: &MesherOptions, position: Vec3) -> Vec3 {
    if options.snap_positions {
        position.round()
    } else {
        position
    }
}

pub struct TriangulatedFace {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tangents: Vec<Tangent>,
    pub uvs: Vec<[f32; 2]>,
    /// Triangle fan indices, local to this face's own vertex list.
    pub triangles: Vec<[u16; 3]>,
    pub texture_id: u32,
}

/// Returns `None` for a degenerate face (empty edge list, or fewer than 3
/// ring vertices).
pub fn triangulate_face(store: &MeshStore<FaceData>, face: usize, options: &MesherOptions) -> Option<TriangulatedFace> {
    let normal = store.faces[face].normal;
    let userdata = store.faces[face].userdata;

    let mut ring = face_ring(store, face);
    if ring.len() < 4 {
        // A closed ring has at least 3 distinct vertices plus the closing
        // repeat of the first; anything smaller is degenerate.
        trace!(face, ring_len = ring.len(), "skipping degenerate face");
        return None;
    }

    correct_winding(store, normal, &mut ring, options.winding);

    let ring_len = ring.len() - 1; // distinct vertex count
    let mut positions = Vec::with_capacity(ring_len);
    let mut normals = Vec::with_capacity(ring_len);
    let mut tangents = Vec::with_capacity(ring_len);
    let mut uvs = Vec::with_capacity(ring_len);

    let tangent = tangent_for(&userdata, normal);

    for &v in &ring[..ring_len] {
        let position = store.vertices[v].position;
        positions.push(snap(options, position));
        normals.push(normal);
        tangents.push(tangent);
        uvs.push(project_uv(&userdata, position));
    }

    let mut triangles = Vec::with_capacity(ring_len.saturating_sub(2));
    for i in 1..ring_len - 1 {
        triangles.push([0u16, i as u16, (i + 1) as u16]);
    }

    Some(TriangulatedFace {
        positions,
        normals,
        tangents,
        uvs,
        triangles,
        texture_id: userdata.texture_id,
    })
}
