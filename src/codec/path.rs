//! Reversible path encoding for multiplexed query values.
//!
//! A child path may itself contain `&` and `=`, which would split the shared
//! query string. Both are swapped for private markers before percent-encoding
//! and restored after decoding.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;

/// Characters left untouched by a URI component encoder.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const AMP_MARKER: &str = "%M1";
const EQ_MARKER: &str = "%M2";

/// Failure to percent-decode a single component.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A `%` not followed by two hex digits.
    #[error("malformed escape at byte {0}")]
    Malformed(usize),

    /// Escapes decode to bytes that are not UTF-8.
    #[error("escaped bytes are not valid UTF-8")]
    InvalidUtf8,
}

/// Encode a child path into a token safe to embed as one query value.
pub fn encode(path: &str) -> String {
    let canonical = normalize(path)
        .replace('&', AMP_MARKER)
        .replace('=', EQ_MARKER);
    utf8_percent_encode(&canonical, COMPONENT).to_string()
}

/// Decode a token produced by [`encode`] back into the child path.
///
/// Input that cannot be decoded is returned unchanged apart from marker
/// restoration.
pub fn decode(token: &str) -> String {
    normalize(token)
        .replace(AMP_MARKER, "&")
        .replace(EQ_MARKER, "=")
}

/// Percent-decode until a fixed point, stopping early once a private marker
/// surfaces so it is not mistaken for an escape on the next pass.
fn normalize(input: &str) -> String {
    let mut current = input.to_string();
    loop {
        match decode_component(&current) {
            Ok(decoded) => {
                if decoded == current || has_marker(&decoded) {
                    return decoded;
                }
                tracing::trace!(from = %current, to = %decoded, "Path decode pass");
                current = decoded;
            }
            Err(_) => return current,
        }
    }
}

fn has_marker(value: &str) -> bool {
    value.contains(AMP_MARKER) || value.contains(EQ_MARKER)
}

/// Strict URI component decoding: every `%` must start a valid escape.
fn decode_component(input: &str) -> Result<String, CodecError> {
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit);
            if !valid {
                return Err(CodecError::Malformed(i));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    percent_decode_str(input)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| CodecError::InvalidUtf8)
}
