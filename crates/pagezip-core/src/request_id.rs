//! Per-invocation request identifiers.
//!
//! The identifier namespaces both the scratch layout and the output archive,
//! so it must be usable as a single path component.

use uuid::Uuid;

const MAX_LEN: usize = 64;

/// Fresh identifier for a request that did not bring its own.
pub fn generate() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Sanitizes a caller-supplied identifier into a safe file-name fragment.
///
/// - Keeps ASCII alphanumerics, `-` and `_`; everything else becomes `_`
/// - Collapses consecutive underscores
/// - Limits length to 64 bytes, then trims underscores at both ends
///
/// Returns `None` when nothing usable is left. The mapping is lossy: `a b`
/// and `a/b` both become `a_b` and would share an output path.
pub fn sanitize(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len().min(MAX_LEN));
    let mut prev_underscore = false;

    for c in raw.chars() {
        let replacement = if c.is_ascii_alphanumeric() || c == '-' {
            c
        } else {
            '_'
        };

        if replacement == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(replacement);
            prev_underscore = false;
        }
    }

    let limited = out[..out.len().min(MAX_LEN)].trim_matches('_');
    if limited.is_empty() {
        None
    } else {
        Some(limited.to_string())
    }
}
