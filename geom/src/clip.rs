use tracing::trace;

use crate::error::GeomError;
use crate::plane::{Plane, EPSILON};
use crate::store::MeshStore;

/// What a single [`clip`] call produced.
pub struct ClipOutcome {
    /// The face created by this cut. Its edge list is empty when the plane
    /// didn't actually intersect the polytope (nothing to close).
    pub new_face: usize,
}

/// Clips `store` in place by `plane`, keeping the half-space `d(p) <= 0`.
/// `userdata` is attached to the face created by the cut.
///
/// Idempotent: clipping twice by the same plane leaves the second call's
/// new face empty, since none of its vertices end up on the clipped side.
pub fn clip<F>(
    store: &mut MeshStore<F>,
    plane: &Plane,
    userdata: F,
) -> Result<Option<ClipOutcome>, GeomError> {
    let mut count_clipped = 0usize;
    let mut count_total = 0usize;

    // Pass 1: classify every non-clipped vertex against the plane.
    let vertex_count = store.vertices.len();
    for i in 0..vertex_count {
        if store.vertices[i].clipped {
            continue;
        }

        count_total += 1;
        let d = plane.signed_distance(store.vertices[i].position);

        if d >= EPSILON {
            count_clipped += 1;
            store.vertices[i].clipped = true;
            store.vertices[i].distance = d;
        } else if d >= -EPSILON {
            store.vertices[i].distance = 0.0;
        } else {
            store.vertices[i].distance = d;
        }
    }

    trace!(count_total, count_clipped, "clip: vertex pass");

    if count_clipped == 0 || count_clipped == count_total {
        return Ok(None);
    }

    // Pass 2: resolve each edge against its endpoints' classification.
    let edge_count = store.edges.len();
    for i in 0..edge_count {
        if store.edges[i].clipped {
            continue;
        }

        let [v0, v1] = store.edges[i].vertices;
        let c0 = store.vertices[v0].clipped;
        let c1 = store.vertices[v1].clipped;

        if c0 && c1 {
            store.edges[i].clipped = true;
            let faces = store.edges[i].faces;
            if let Some(f) = faces[0] {
                store.detach(f, i);
            }
            if let Some(f) = faces[1] {
                store.detach(f, i);
            }
        } else if !c0 && !c1 {
            continue;
        } else {
            let d0 = store.vertices[v0].distance;
            let d1 = store.vertices[v1].distance;
            let t = Plane::intersect(d0, d1);
            let p0 = store.vertices[v0].position;
            let p1 = store.vertices[v1].position;
            let new_vertex = store.add_vertex(p0.lerp(p1, t));

            if c0 {
                store.edges[i].vertices[0] = new_vertex;
            } else {
                store.edges[i].vertices[1] = new_vertex;
            }
        }
    }

    // Pass 3: close the hole each affected face now has, and build the new
    // face from the edges used to close it.
    let new_face = store.add_face(plane.normal, userdata);
    let mut occurs = vec![0u8; store.vertices.len()];

    for face_idx in 0..new_face {
        if store.faces[face_idx].clipped {
            continue;
        }

        let edges = store.faces[face_idx].edges.clone();

        for &e in &edges {
            let [v0, v1] = store.edges[e].vertices;
            occurs[v0] = 0;
            occurs[v1] = 0;
        }
        for &e in &edges {
            let [v0, v1] = store.edges[e].vertices;
            occurs[v0] += 1;
            occurs[v1] += 1;
        }

        let mut endpoints: [Option<usize>; 2] = [None, None];

        for &e in &edges {
            let [v0, v1] = store.edges[e].vertices;
            let mut endpoint = None;
            if occurs[v0] == 1 {
                endpoint = Some(v0);
            }
            if occurs[v1] == 1 {
                endpoint = Some(v1);
            }
            let Some(endpoint) = endpoint else {
                continue;
            };

            if endpoints[0].is_none() {
                endpoints[0] = Some(endpoint);
            } else if endpoints[1].is_none() {
                endpoints[1] = Some(endpoint);
            } else {
                return Err(GeomError::InvariantViolation { face: face_idx });
            }
        }

        match (endpoints[0], endpoints[1]) {
            (Some(a), Some(b)) => {
                let edge = store.add_edge(a, b);
                store.attach(face_idx, edge);
                store.attach(new_face, edge);
            }
            (None, None) => {}
            _ => return Err(GeomError::InvariantViolation { face: face_idx }),
        }
    }

    trace!(new_face, "clip: face closure pass done");

    Ok(Some(ClipOutcome { new_face }))
}
