use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("malformed map text at byte offset {offset}")]
    Parse { offset: usize },
    #[error("cannot read map file `{path}`: {source}")]
    Io {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}
