use thiserror::Error;

/// All errors generated while building or parsing events.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorRepr {
    #[error("empty symbol, {}", .0)]
    EmptySymbol(&'static str),
    #[error("out of bounds, {}", .0)]
    OutOfBounds(String),
    #[error("unknown {kind}: {value:?}")]
    UnknownVariant { kind: &'static str, value: String },
}
