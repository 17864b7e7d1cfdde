use std::collections::HashMap;

use glam::Vec3;
use tracing::{info_span, warn};

use geom::MeshStore;
use mesher::{FaceData, MeshGroup, TextureMesh};

use crate::config::BuildConfig;
use crate::error::{BuildError, BuildWarning};

fn face_data_for(plane: &map::BrushPlane) -> FaceData {
    FaceData {
        u: plane.u.truncate().as_vec3(),
        v: plane.v.truncate().as_vec3(),
        u_scale: plane.u_scale as f32,
        v_scale: plane.v_scale as f32,
        u_offset: plane.u.w as f32,
        v_offset: plane.v.w as f32,
        texture_id: plane.texture_id,
    }
}

// DegenerateBrush and EmptyPolytope are independent and can both fire: a
// brush under four planes still clips against the seed cube, it just can't
// bound a finite volume on its own.
pub fn build_brush(
    brush: &map::Brush,
    entity: usize,
    brush_idx: usize,
    config: &BuildConfig,
) -> Result<(MeshStore<FaceData>, Vec<BuildWarning>), BuildError> {
    let mut warnings = Vec::new();

    if brush.planes.len() < 4 {
        warnings.push(BuildWarning::DegenerateBrush {
            entity,
            brush: brush_idx,
        });
    }

    let half = config.world_half_extent;
    let mut store = MeshStore::seed_cube(
        Vec3::splat(-half),
        Vec3::splat(half),
        FaceData {
            u: Vec3::X,
            v: Vec3::Y,
            u_scale: 1.0,
            v_scale: 1.0,
            u_offset: 0.0,
            v_offset: 0.0,
            texture_id: 0,
        },
    );

    for plane in &brush.planes {
        geom::clip(&mut store, &plane.plane(), face_data_for(plane)).map_err(|source| {
            BuildError::InvariantViolation {
                entity,
                brush: brush_idx,
                source,
            }
        })?;
    }

    if store.non_clipped_faces().count() == 0 {
        warnings.push(BuildWarning::EmptyPolytope {
            entity,
            brush: brush_idx,
        });
    }

    Ok((store, warnings))
}

#[derive(Debug, Default)]
pub struct EntityBuild {
    pub meshes: Vec<TextureMesh>,
    pub warnings: Vec<BuildWarning>,
    pub errors: Vec<BuildError>,
}

// A brush whose clip errors is skipped; the rest of the entity still builds.
pub fn build_entity(entity: &map::Entity, entity_idx: usize, config: &BuildConfig) -> EntityBuild {
    let span = info_span!("build_entity", entity = entity_idx);
    let _enter = span.enter();

    let mut result = EntityBuild::default();
    let mut group = MeshGroup::new();

    let Some(brushes) = &entity.brushes else {
        return result;
    };

    for (brush_idx, brush) in brushes.iter().enumerate() {
        match build_brush(brush, entity_idx, brush_idx, config) {
            Ok((store, warnings)) => {
                for warning in &warnings {
                    warn!(%warning, "brush warning");
                }
                result.warnings.extend(warnings);

                let faces: Vec<usize> = store.non_clipped_faces().map(|(i, _)| i).collect();
                for face in faces {
                    if let Some(triangulated) = mesher::triangulate_face(&store, face, &config.mesher) {
                        group.push_face(triangulated);
                    }
                }
            }
            Err(error) => {
                warn!(%error, entity = entity_idx, brush = brush_idx, "brush clip failed");
                result.errors.push(error);
            }
        }
    }

    result.meshes = group.into_meshes();
    result
}

#[derive(Debug, Default)]
pub struct MapBuild {
    pub world: EntityBuild,
    pub entities_by_class: HashMap<String, Vec<EntityBuild>>,
}

pub fn build_map(map: &map::Map, config: &BuildConfig) -> MapBuild {
    let world = build_entity(&map.world, 0, config);

    let mut entities_by_class = HashMap::new();
    for (classname, entities) in &map.entities_by_class {
        let builds = entities
            .iter()
            .enumerate()
            .map(|(i, entity)| build_entity(entity, i, config))
            .collect();
        entities_by_class.insert(classname.clone(), builds);
    }

    MapBuild {
        world,
        entities_by_class,
    }
}
