/// Knobs for one conversion run. Not persisted anywhere; the CLI binary
/// surfaces these as flags, but the library contract itself takes no
/// environment variables or config files.
#[derive(Debug, Clone, Copy)]
pub struct BuildConfig {
    /// Half-extent of the seed cube every brush starts from. Must be large
    /// enough that every brush plane meaningfully cuts it.
    pub world_half_extent: f32,
    pub mesher: mesher::MesherOptions,
    pub parse: map::ParseOptions,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            world_half_extent: 1.0e5,
            mesher: mesher::MesherOptions::default(),
            parse: map::ParseOptions::default(),
        }
    }
}
