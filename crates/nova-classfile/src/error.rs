pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("invalid signature: {0}")]
    InvalidSignature(String),
    #[error("unexpected end of input")]
    UnexpectedEof,
}
