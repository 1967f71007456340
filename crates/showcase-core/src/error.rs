use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("Unknown car: {0}")]
    UnknownCar(String),

    #[error("Unsupported language code: {0}")]
    UnknownLanguage(String),
}
