use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdeError {
    #[error("document '{uri}' is not open")]
    UnknownDocument { uri: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("position {line}:{character} is outside the document")]
    PositionOutOfRange { line: u32, character: u32 },
}
