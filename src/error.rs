/// Category of a failure surfaced by the fitting engine or the CLI host.
///
/// Each kind maps to a stable numeric status (see [`FitError::status`]) so a
/// host runtime can translate errors into its own convention. The values
/// follow the GSL errno codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Model vector not of length 9, or an observation not of length 3.
    Dimension,
    /// Observation value that is non-finite or a negative branch length.
    Format,
    /// Fewer observations than varying parameters.
    InsufficientData,
    /// Invalid solver options or CLI settings.
    Config,
    /// Rank-deficient Jacobian or design matrix.
    Singular,
    /// Iteration budget exhausted before convergence.
    MaxIterations,
    /// Damping overflowed without an accepted step.
    NoProgress,
    /// The model produced non-finite values.
    BadFunction,
    /// File read/write/parse failure (CLI host only).
    Io,
}

impl ErrorKind {
    /// Numeric status code (GSL errno values).
    pub fn status(self) -> i32 {
        match self {
            ErrorKind::Format => 1,
            ErrorKind::InsufficientData | ErrorKind::Config => 4,
            ErrorKind::Io => 5,
            ErrorKind::BadFunction => 9,
            ErrorKind::MaxIterations => 11,
            ErrorKind::Dimension => 19,
            ErrorKind::Singular => 21,
            ErrorKind::NoProgress => 27,
        }
    }

    /// Process exit code used by the `lcfit` binary.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Dimension | ErrorKind::Format | ErrorKind::Config | ErrorKind::Io => 2,
            ErrorKind::InsufficientData => 3,
            ErrorKind::Singular
            | ErrorKind::MaxIterations
            | ErrorKind::NoProgress
            | ErrorKind::BadFunction => 4,
        }
    }
}

#[derive(Clone)]
pub struct FitError {
    kind: ErrorKind,
    message: String,
}

impl FitError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status(&self) -> i32 {
        self.kind.status()
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FitError")
            .field("kind", &self.kind)
            .field("status", &self.status())
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for FitError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_distinguish_numerical_failures() {
        let kinds = [
            ErrorKind::Singular,
            ErrorKind::MaxIterations,
            ErrorKind::NoProgress,
            ErrorKind::BadFunction,
        ];
        for (i, a) in kinds.iter().enumerate() {
            assert_eq!(a.exit_code(), 4, "{a:?}");
            for b in &kinds[i + 1..] {
                assert_ne!(a.status(), b.status(), "{a:?} and {b:?} share a status");
            }
        }
        assert_eq!(ErrorKind::Dimension.exit_code(), 2);
        assert_eq!(ErrorKind::InsufficientData.exit_code(), 3);
    }

    #[test]
    fn display_is_the_message() {
        let err = FitError::new(ErrorKind::Dimension, "Invalid model dimension: 8 [expected 9]");
        assert_eq!(err.to_string(), "Invalid model dimension: 8 [expected 9]");
        assert_eq!(err.status(), 19);
        assert_eq!(err.exit_code(), 2);
    }
}
