//! Reversible filesystem-safe encoding for package keys and document names.
//!
//! Cache directory and file names are derived from package keys and remote
//! filenames, which may contain `@`, `/`, and other characters that are
//! unsafe or ambiguous on disk. [`sanitize`] percent-escapes everything
//! outside a conservative safe set; [`desanitize`] inverts it exactly, so
//! on-disk names can be mapped back to their original keys.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::error::{Error, Result};

/// Bytes escaped by [`sanitize`]: everything except ASCII alphanumerics,
/// `-`, `_`, and `.`. Escaping `%` itself keeps the encoding reversible.
const ESCAPED: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Encodes a package key or filename into a filesystem-safe form.
///
/// ```
/// use erudita_core::sanitize::sanitize;
///
/// assert_eq!(sanitize("@scope/name"), "%40scope%2Fname");
/// assert_eq!(sanitize("react@18.2.0"), "react%4018.2.0");
/// ```
#[must_use]
pub fn sanitize(raw: &str) -> String {
    utf8_percent_encode(raw, ESCAPED).to_string()
}

/// Decodes a name produced by [`sanitize`] back to the original string.
///
/// # Errors
///
/// Returns [`Error::Serialization`] when the decoded bytes are not valid
/// UTF-8, which can only happen for names this module did not produce.
pub fn desanitize(encoded: &str) -> Result<String> {
    percent_decode_str(encoded)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| Error::Serialization(format!("cache entry name '{encoded}' is not valid UTF-8")))
}
