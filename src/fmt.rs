//! Debug formatting helpers for [`custom_debug_derive`].

use std::fmt;

/// Formats a secret as a fixed placeholder, keeping only whether it is set.
///
/// Use with `#[debug(with = "crate::fmt::redacted")]` on credential fields so
/// API keys never reach logs through `{:?}`.
pub fn redacted<T: AsRef<str>>(value: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if value.as_ref().is_empty() {
        f.write_str("\"\"")
    } else {
        f.write_str("\"<redacted>\"")
    }
}
