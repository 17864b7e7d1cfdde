use arena::Arena;
use glam::Vec3;

/// A vertex of the polytope. `distance` is scratch space written by
/// [`crate::clip::clip`] during its vertex pass and read back during the
/// edge pass of the same call; it carries no meaning between clips.
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Vec3,
    pub distance: f32,
    pub clipped: bool,
}

impl Vertex {
    fn new(position: Vec3) -> Self {
        Self {
            position,
            distance: 0.0,
            clipped: false,
        }
    }
}

/// An ordered pair of vertex indices with up to two incident faces.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub vertices: [usize; 2],
    pub faces: [Option<usize>; 2],
    pub clipped: bool,
}

/// A planar face: an unordered set of edge indices plus a normal and
/// caller-supplied per-face data (UV basis, texture identity, ...).
#[derive(Debug, Clone)]
pub struct Face<F> {
    pub edges: Vec<usize>,
    pub normal: Vec3,
    pub userdata: F,
    pub clipped: bool,
}

/// Owns the three growable pools a clip session mutates. `F` is the
/// opaque per-face payload threaded through from the brush driver.
pub struct MeshStore<F> {
    pub vertices: Arena<Vertex>,
    pub edges: Arena<Edge>,
    pub faces: Arena<Face<F>>,
}

impl<F> Default for MeshStore<F> {
    fn default() -> Self {
        Self {
            vertices: Arena::new(),
            edges: Arena::new(),
            faces: Arena::new(),
        }
    }
}

impl<F> MeshStore<F> {
    pub fn add_vertex(&mut self, position: Vec3) -> usize {
        self.vertices.push(Vertex::new(position))
    }

    /// The caller is responsible for wiring up face membership via
    /// [`attach`](Self::attach).
    pub fn add_edge(&mut self, v0: usize, v1: usize) -> usize {
        self.edges.push(Edge {
            vertices: [v0, v1],
            faces: [None, None],
            clipped: false,
        })
    }

    pub fn add_face(&mut self, normal: Vec3, userdata: F) -> usize {
        self.faces.push(Face {
            edges: Vec::new(),
            normal,
            userdata,
            clipped: false,
        })
    }

    /// Appends `edge` to `face`'s edge list and records `face` into the
    /// first free face slot of `edge`. Panics if both of the edge's face
    /// slots are already occupied -- callers that need a recoverable error
    /// should check before calling, which [`crate::clip::clip`] does.
    pub fn attach(&mut self, face: usize, edge: usize) {
        self.faces[face].edges.push(edge);

        let e = &mut self.edges[edge];
        if e.faces[0].is_none() {
            e.faces[0] = Some(face);
        } else if e.faces[1].is_none() {
            e.faces[1] = Some(face);
        } else {
            panic!("edge {edge} already has two incident faces");
        }
    }

    /// Removes `edge` from `face`'s edge list. Marks `face` clipped once
    /// its edge list empties.
    pub fn detach(&mut self, face: usize, edge: usize) {
        let f = &mut self.faces[face];
        if let Some(pos) = f.edges.iter().position(|&e| e == edge) {
            f.edges.swap_remove(pos);
        }
        if f.edges.is_empty() {
            f.clipped = true;
        }
    }

    /// Builds the canonical axis-aligned cube: 8 vertices, 12 edges, 6
    /// faces, each face's normal pointing outward. `userdata` is cloned
    /// once per face.
    pub fn seed_cube(min: Vec3, max: Vec3, userdata: F) -> Self
    where
        F: Clone,
    {
        let mut store = Self::default();

        // front bottom left .. back bottom right, matching the reference layout.
        store.add_vertex(Vec3::new(min.x, min.y, min.z)); // 0
        store.add_vertex(Vec3::new(min.x, max.y, min.z)); // 1
        store.add_vertex(Vec3::new(max.x, max.y, min.z)); // 2
        store.add_vertex(Vec3::new(max.x, min.y, min.z)); // 3
        store.add_vertex(Vec3::new(min.x, min.y, max.z)); // 4
        store.add_vertex(Vec3::new(min.x, max.y, max.z)); // 5
        store.add_vertex(Vec3::new(max.x, max.y, max.z)); // 6
        store.add_vertex(Vec3::new(max.x, min.y, max.z)); // 7

        store.add_edge(0, 3); // 0 front-bottom
        store.add_edge(1, 2); // 1 front-top
        store.add_edge(0, 1); // 2 front-left
        store.add_edge(2, 3); // 3 front-right
        store.add_edge(4, 7); // 4 back-bottom
        store.add_edge(5, 6); // 5 back-top
        store.add_edge(4, 5); // 6 back-left
        store.add_edge(6, 7); // 7 back-right
        store.add_edge(0, 4); // 8 side-bottom-left
        store.add_edge(1, 5); // 9 side-top-left
        store.add_edge(3, 7); // 10 side-bottom-right
        store.add_edge(2, 6); // 11 side-top-right

        let front = store.add_face(Vec3::new(0.0, 0.0, -1.0), userdata.clone());
        let back = store.add_face(Vec3::new(0.0, 0.0, 1.0), userdata.clone());
        let left = store.add_face(Vec3::new(-1.0, 0.0, 0.0), userdata.clone());
        let right = store.add_face(Vec3::new(1.0, 0.0, 0.0), userdata.clone());
        let top = store.add_face(Vec3::new(0.0, 1.0, 0.0), userdata.clone());
        let bottom = store.add_face(Vec3::new(0.0, -1.0, 0.0), userdata);

        for e in [0, 1, 2, 3] {
            store.attach(front, e);
        }
        for e in [4, 5, 6, 7] {
            store.attach(back, e);
        }
        for e in [2, 6, 8, 9] {
            store.attach(left, e);
        }
        for e in [3, 7, 10, 11] {
            store.attach(right, e);
        }
        for e in [1, 5, 9, 11] {
            store.attach(top, e);
        }
        for e in [0, 4, 8, 10] {
            store.attach(bottom, e);
        }

        store
    }

    pub fn non_clipped_vertices(&self) -> impl Iterator<Item = (usize, &Vertex)> {
        self.vertices.enumerate().filter(|(_, v)| !v.clipped)
    }

    pub fn non_clipped_edges(&self) -> impl Iterator<Item = (usize, &Edge)> {
        self.edges.enumerate().filter(|(_, e)| !e.clipped)
    }

    pub fn non_clipped_faces(&self) -> impl Iterator<Item = (usize, &Face<F>)> {
        self.faces.enumerate().filter(|(_, f)| !f.clipped)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn seed_cube_has_canonical_counts() {
        let store = MeshStore::seed_cube(Vec3::splat(-1.0), Vec3::splat(1.0), ());
        assert_eq!(store.vertices.len(), 8);
        assert_eq!(store.edges.len(), 12);
        assert_eq!(store.faces.len(), 6);

        for (_, edge) in store.non_clipped_edges() {
            assert!(edge.faces[0].is_some());
            assert!(edge.faces[1].is_some());
        }

        for (_, face) in store.non_clipped_faces() {
            assert_eq!(face.edges.len(), 4);
        }
    }

    #[test]
    fn attach_then_detach_clears_face() {
        let mut store: MeshStore<()> = MeshStore::default();
        let v0 = store.add_vertex(Vec3::ZERO);
        let v1 = store.add_vertex(Vec3::X);
        let edge = store.add_edge(v0, v1);
        let face = store.add_face(Vec3::Y, ());

        store.attach(face, edge);
        assert_eq!(store.faces[face].edges.len(), 1);

        store.detach(face, edge);
        assert!(store.faces[face].edges.is_empty());
        assert!(store.faces[face].clipped);
    }
}
