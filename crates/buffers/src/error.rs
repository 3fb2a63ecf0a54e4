use std::io;

/// Failure reported by a [`ByteSink`](crate::ByteSink) or
/// [`ByteSource`](crate::ByteSource).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    #[error("unexpected end of buffer")]
    EndOfBuffer,
    #[error("i/o error ({kind:?}): {message}")]
    Io { kind: io::ErrorKind, message: String },
}

impl From<io::Error> for BufferError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            return BufferError::EndOfBuffer;
        }
        BufferError::Io {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
