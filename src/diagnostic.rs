//! Packs an HTTP status into a 32-bit code whose hex rendering reads as the status itself,
//! e.g. 404 becomes `FFFF0404`. Only meant for display; errors keep the plain status.

pub const DIAGNOSTIC_MARKER: u32 = 0xFFFF_0000;

/// Largest status whose digits fit in the four nibbles below the marker.
pub const MAX_DIAGNOSTIC_STATUS: u16 = 9999;

/// Returns `None` for statuses above [`MAX_DIAGNOSTIC_STATUS`], whose digits would spill
/// into the marker.
pub fn diagnostic_code(status: u16) -> Option<u32> {
    if status > MAX_DIAGNOSTIC_STATUS {
        return None;
    }

    let packed = status
        .to_string()
        .bytes()
        .fold(0u32, |acc, digit| (acc << 4) | u32::from(digit - b'0'));

    Some(packed | DIAGNOSTIC_MARKER)
}

/// Recovers the status packed by [`diagnostic_code`].
///
/// Returns `None` when the marker is missing or a nibble is not a decimal digit.
pub fn decode_diagnostic(code: u32) -> Option<u16> {
    if code & DIAGNOSTIC_MARKER != DIAGNOSTIC_MARKER {
        return None;
    }

    let mut status: u16 = 0;
    for shift in (0..4).rev() {
        let digit = (code >> (shift * 4)) & 0xF;
        if digit > 9 {
            return None;
        }
        status = status * 10 + digit as u16;
    }

    Some(status)
}
