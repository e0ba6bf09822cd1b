use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    #[error("invalid position snapshot: {snapshot:?}")]
    InvalidSnapshot { snapshot: String },
    #[error("invalid square: {input:?}")]
    InvalidSquare { input: String },
    #[error("invalid move: {input:?}")]
    InvalidMove { input: String },
}
