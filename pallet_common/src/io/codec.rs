//! Wire text codec for register values.
//!
//! The I/O layer carries every register value as text. Gateway and PLC
//! firmware variants disagree on how a set bit is spelled, so decoding is
//! tolerant: `1`, `true` and `on` in any case, with surrounding whitespace,
//! read as `true`. Every other literal, including garbage, reads as
//! `false`.

/// Decode a bit register value.
pub fn decode_bool(raw: &str) -> bool {
    let value = raw.trim();
    value == "1" || value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("on")
}

/// Encode a bit register value (`"1"` / `"0"`).
#[inline]
pub fn encode_bool(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

/// Encode an integer register value as base-10 text.
#[inline]
pub fn encode_int(value: u32) -> String {
    value.to_string()
}
