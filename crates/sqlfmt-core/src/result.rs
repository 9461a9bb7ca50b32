//! Result type alias for formatting operations

use crate::error::SqlFmtError;

/// Standard Result type for formatting operations
pub type Result<T> = std::result::Result<T, SqlFmtError>;

/// Convenience methods for hosts that process many inputs
pub trait ResultExt<T> {
    /// Log the error and keep going with `None`
    ///
    /// Syntax and configuration errors are logged at warn level, internal
    /// invariant violations at error level.
    fn log_and_continue(self) -> Option<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn log_and_continue(self) -> Option<T> {
        self.inspect_err(|err| {
            if err.is_user_error() {
                tracing::warn!(kind = ?err.kind(), "skipping input: {err}");
            } else {
                tracing::error!("internal error: {err}");
            }
        })
        .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_and_continue() {
        let ok: Result<u8> = Ok(1);
        assert_eq!(ok.log_and_continue(), Some(1));

        let err: Result<u8> = Err(SqlFmtError::config("printWidth", "must be positive"));
        assert_eq!(err.log_and_continue(), None);

        let internal: Result<u8> = Err(SqlFmtError::invariant("lost a comment"));
        assert_eq!(internal.log_and_continue(), None);
    }
}
