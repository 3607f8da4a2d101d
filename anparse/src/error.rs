use std::io;

/// Central error type.
#[derive(Debug)]
pub enum Error {
    /// some command failed, but parsing continued
    Failed,
    Io(io::Error),
    Analizi(analizi::Error),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<analizi::Error> for Error {
    fn from(err: analizi::Error) -> Self {
        Self::Analizi(err)
    }
}
