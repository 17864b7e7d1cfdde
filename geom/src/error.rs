#[derive(Debug, thiserror::Error)]
pub enum GeomError {
    #[error("face {face} has more than two open-chain endpoints after a clip")]
    InvariantViolation { face: usize },
}
