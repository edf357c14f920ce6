/// Errors that can occur during Reed-Solomon construction, encode, reconst, update or replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RSError {
    /// `data <= 0 || parity <= 0 || data + parity > 256`.
    IllegalVects,
    /// Wrong number of vectors passed to `encode`.
    MismatchVects,
    /// A vector has zero length.
    ZeroVectSize,
    /// Vectors are not all the same length.
    MismatchVectSize,
    /// `reconst` was called with nothing to reconstruct; treated as success by callers.
    NoNeedReconst,
    /// Too many lost vectors to reconstruct: fewer than `data` survivors, or more than `parity` needed.
    TooManyLost,
    /// `parity.len() != parity_shards`.
    MismatchParityNum,
    /// A vector index is out of `[0, data+parity)`.
    IllegalVectIndex,
    /// More rows passed to `replace` than there are data shards.
    TooManyReplace,
    /// `replace_rows.len() != data.len()`.
    MismatchReplace,
    /// Inversion hit an all-zero pivot column; only reachable with a corrupted encode matrix.
    SingularMatrix,
}

impl std::fmt::Display for RSError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            RSError::IllegalVects => write!(f, "illegal data/parity number: <= 0 or data+parity > 256"),
            RSError::MismatchVects => write!(f, "too few/many vects given"),
            RSError::ZeroVectSize => write!(f, "vect size is 0"),
            RSError::MismatchVectSize => write!(f, "vects size mismatched"),
            RSError::NoNeedReconst => write!(f, "no need reconst"),
            RSError::TooManyLost => write!(f, "too many lost"),
            RSError::MismatchParityNum => write!(f, "parity number mismatched"),
            RSError::IllegalVectIndex => write!(f, "illegal vect index"),
            RSError::TooManyReplace => write!(f, "too many data for replacing"),
            RSError::MismatchReplace => write!(f, "number of replaceRows and data mismatch"),
            RSError::SingularMatrix => write!(f, "matrix is singular"),
        }
    }
}

impl std::error::Error for RSError {}
