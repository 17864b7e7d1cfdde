#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("entity {entity} brush {brush}: {source}")]
    InvariantViolation {
        entity: usize,
        brush: usize,
        #[source]
        source: geom::GeomError,
    },
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum BuildWarning {
    #[error("entity {entity} brush {brush} has fewer than four planes and bounds no volume")]
    DegenerateBrush { entity: usize, brush: usize },
    #[error("entity {entity} brush {brush} was entirely clipped away")]
    EmptyPolytope { entity: usize, brush: usize },
}
