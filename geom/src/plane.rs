use glam::Vec3;

/// Distance under which a vertex is treated as lying on the plane rather
/// than strictly to one side of it.
pub const EPSILON: f32 = 0.01;

/// A half-space boundary `{ p : n . p <= c }`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub c: f32,
}

impl Plane {
    pub fn new(normal: Vec3, c: f32) -> Self {
        Self { normal, c }
    }

    /// Builds the plane through three non-collinear points, in the winding
    /// `p1, p2, p3`: `n = (p1 - p2) x (p1 - p3)`, `c = n . p1`.
    pub fn from_points(p1: Vec3, p2: Vec3, p3: Vec3) -> Self {
        let normal = (p1 - p2).cross(p1 - p3);
        let c = normal.dot(p1);
        Self { normal, c }
    }

    /// `d(p) = n . p - c`. Positive on the clipped side, negative on the
    /// kept side, zero (within [`EPSILON`]) on the plane itself.
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p) - self.c
    }

    /// Interpolation parameter for the point where segment `(v0, v1)`
    /// crosses this plane, given the two endpoints' signed distances.
    /// Only meaningful when `d0` and `d1` have opposite sign.
    pub fn intersect(d0: f32, d1: f32) -> f32 {
        d0 / (d0 - d1)
    }
}
