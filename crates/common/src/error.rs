/// Errors surfaced by shapedraw operations.
///
/// Registry and argument errors are returned to the caller. The two fault
/// variants describe client code that failed during dispatch or rendering;
/// they are logged and counted by the frame loop, never propagated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShapeDrawError {
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("session {0} is already registered")]
    DuplicateRegistration(String),
    #[error("required argument `{0}` is missing")]
    NullArgument(&'static str),
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },
    #[error("listener {listener} in session {session} failed: {detail}")]
    ListenerFault {
        session: String,
        listener: String,
        detail: String,
    },
    #[error("shape {shape} in session {session} failed: {detail}")]
    ShapeFault {
        session: String,
        shape: String,
        detail: String,
    },
}

impl ShapeDrawError {
    pub fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ShapeDrawError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_argument() {
        let err = ShapeDrawError::invalid_argument("duration_ms", "must be >= 0, got -1");
        assert_eq!(
            err.to_string(),
            "invalid argument `duration_ms`: must be >= 0, got -1"
        );
        assert_eq!(
            ShapeDrawError::NullArgument("owner").to_string(),
            "required argument `owner` is missing"
        );
    }
}
