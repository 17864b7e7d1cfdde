//! Converts brush-based level entities into per-texture triangle meshes:
//! seed a bounding cube, clip it by each of a brush's planes, then
//! triangulate and UV-project the surviving faces.

pub mod config;
pub mod driver;
pub mod error;

pub use config::BuildConfig;
pub use driver::{build_brush, build_entity, build_map, EntityBuild, MapBuild};
pub use error::{BuildError, BuildWarning};

#[cfg(test)]
mod test {
    use super::*;
    use glam::{DVec3, DVec4};

    fn textured_plane(p1: DVec3, p2: DVec3, p3: DVec3) -> map::BrushPlane {
        map::BrushPlane {
            p1,
            p2,
            p3,
            texture_name: "NULL".to_string(),
            texture_id: 1,
            u: DVec4::new(1.0, 0.0, 0.0, 0.0),
            v: DVec4::new(0.0, 1.0, 0.0, 0.0),
            rotation: 0.0,
            u_scale: 1.0,
            v_scale: 1.0,
        }
    }

    fn tetrahedron_brush() -> map::Brush {
        // n=(1,1,1)/sqrt(3), c=1/sqrt(3), plus the three coordinate planes.
        map::Brush {
            planes: vec![
                textured_plane(
                    DVec3::new(1.0, 0.0, 0.0),
                    DVec3::new(0.0, 1.0, 0.0),
                    DVec3::new(0.0, 0.0, 1.0),
                ),
                textured_plane(
                    DVec3::new(0.0, 0.0, 0.0),
                    DVec3::new(0.0, 1.0, 0.0),
                    DVec3::new(0.0, 0.0, 1.0),
                ),
                textured_plane(
                    DVec3::new(0.0, 0.0, 0.0),
                    DVec3::new(0.0, 0.0, 1.0),
                    DVec3::new(1.0, 0.0, 0.0),
                ),
                textured_plane(
                    DVec3::new(0.0, 0.0, 0.0),
                    DVec3::new(1.0, 0.0, 0.0),
                    DVec3::new(0.0, 1.0, 0.0),
                ),
            ],
        }
    }

    #[test]
    fn tetrahedron_brush_builds_four_textured_faces() {
        let config = BuildConfig {
            world_half_extent: 10.0,
            ..Default::default()
        };

        let (store, warnings) = build_brush(&tetrahedron_brush(), 0, 0, &config).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(store.non_clipped_faces().count(), 4);
        assert_eq!(store.non_clipped_edges().count(), 6);
        assert_eq!(store.non_clipped_vertices().count(), 4);
    }

    #[test]
    fn two_opposite_planes_yield_empty_polytope_and_degenerate_warnings() {
        let config = BuildConfig {
            world_half_extent: 10.0,
            ..Default::default()
        };

        // n=(1,0,0), c=1
        let plane_a = textured_plane(
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(1.0, 0.0, 1.0),
        );
        // n=(-1,0,0), c=-2
        let plane_b = textured_plane(
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::new(2.0, 0.0, 1.0),
            DVec3::new(2.0, 1.0, 0.0),
        );

        let brush = map::Brush {
            planes: vec![plane_a, plane_b],
        };

        let (store, warnings) = build_brush(&brush, 1, 0, &config).unwrap();
        assert_eq!(store.non_clipped_vertices().count(), 0);
        assert_eq!(store.non_clipped_faces().count(), 0);
        assert!(warnings
            .iter()
            .any(|w| matches!(w, BuildWarning::EmptyPolytope { entity: 1, brush: 0 })));
        assert!(warnings
            .iter()
            .any(|w| matches!(w, BuildWarning::DegenerateBrush { entity: 1, brush: 0 })));
    }

    #[test]
    fn fewer_than_four_planes_is_flagged_but_still_clips() {
        let config = BuildConfig::default();
        let mut planes = tetrahedron_brush().planes;
        planes.truncate(1);
        let brush = map::Brush { planes };

        let (store, warnings) = build_brush(&brush, 2, 3, &config).unwrap();
        // A single plane still carves a (huge, world-cube-bounded) shape.
        assert!(store.non_clipped_faces().count() > 0);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            warnings[0],
            BuildWarning::DegenerateBrush { entity: 2, brush: 3 }
        ));
    }

    #[test]
    fn build_entity_groups_faces_by_texture_across_brushes() {
        let config = BuildConfig {
            world_half_extent: 10.0,
            ..Default::default()
        };

        let entity = map::Entity {
            attributes: Default::default(),
            brushes: Some(vec![tetrahedron_brush(), tetrahedron_brush()]),
        };

        let result = build_entity(&entity, 0, &config);
        assert!(result.errors.is_empty());
        assert_eq!(result.meshes.len(), 1); // every face shares texture_id 1
        assert_eq!(result.meshes[0].indices.len() % 3, 0);
        assert!(!result.meshes[0].indices.is_empty());
    }
}
