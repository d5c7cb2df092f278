//! Splicing the compatibility shim into the HTML payload.

use memchr::memmem;

/// Marker after which the shim is inserted.
pub const HEAD_MARKER: &[u8] = b"<head>";

/// Insert `shim` immediately after the first `<head>` in `payload`.
///
/// Without a `<head>` marker the shim is prepended to the whole payload.
/// The shim is opaque: it is copied byte for byte and never parsed.
pub fn inject_shim(payload: &[u8], shim: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + shim.len());
    match memmem::find(payload, HEAD_MARKER) {
        Some(pos) => {
            let split = pos + HEAD_MARKER.len();
            out.extend_from_slice(&payload[..split]);
            out.extend_from_slice(shim.as_bytes());
            out.extend_from_slice(&payload[split..]);
        }
        None => {
            out.extend_from_slice(shim.as_bytes());
            out.extend_from_slice(payload);
        }
    }
    out
}
