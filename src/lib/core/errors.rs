use anyhow::Error;
use std::io;

/// Returns `true` if the error originated from a broken pipe.
///
/// Library errors wrap their I/O source, so the root cause of an
/// [`anyhow::Error`] built from a [`crate::core::error::VtmError::Io`] is still
/// the underlying [`io::Error`].
#[inline]
pub fn is_broken_pipe(err: &Error) -> bool {
    err.root_cause()
        .downcast_ref::<io::Error>()
        .map(|io_err| io_err.kind() == io::ErrorKind::BrokenPipe)
        .unwrap_or(false)
}
