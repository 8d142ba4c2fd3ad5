use crate::protocol::error::ProtocolError;
use crate::protocol::frame::defs::{FLAG_BYTE, MIN_FRAME_LEN};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::io;
use tokio_util::codec::{Decoder, Encoder};

const ESCAPE_BYTE: u8 = 0x7D;
const ESCAPE_FLAG_SUFFIX: u8 = 0x02; // 0x7E on the wire becomes 7D 02
const ESCAPE_SELF_SUFFIX: u8 = 0x01; // 0x7D on the wire becomes 7D 01

/// Single-byte XOR parity over `bytes`.
pub fn xor_checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc ^ b)
}

/// Apply the JT808 escape rule to `raw`, appending to `dst`.
///
/// Run after the checksum byte is in place and before the flag bytes are
/// added; the output never contains a raw 0x7E.
pub fn escape_into<B: BufMut>(raw: &[u8], dst: &mut B) {
    for &b in raw {
        match b {
            FLAG_BYTE => {
                dst.put_u8(ESCAPE_BYTE);
                dst.put_u8(ESCAPE_FLAG_SUFFIX);
            }
            ESCAPE_BYTE => {
                dst.put_u8(ESCAPE_BYTE);
                dst.put_u8(ESCAPE_SELF_SUFFIX);
            }
            other => dst.put_u8(other),
        }
    }
}

/// Reverse the escape rule.
///
/// Any 0x7D followed by something other than 0x01/0x02, or dangling at the
/// end of the payload, is a framing error.
pub fn unescape(raw: &[u8]) -> Result<BytesMut, ProtocolError> {
    let mut out = BytesMut::with_capacity(raw.len());
    let mut iter = raw.iter();
    while let Some(&b) = iter.next() {
        if b != ESCAPE_BYTE {
            out.put_u8(b);
            continue;
        }
        match iter.next() {
            Some(&ESCAPE_FLAG_SUFFIX) => out.put_u8(FLAG_BYTE),
            Some(&ESCAPE_SELF_SUFFIX) => out.put_u8(ESCAPE_BYTE),
            Some(&other) => {
                return Err(ProtocolError::UnescapeFailure(format!(
                    "invalid escape suffix {other:#04X}"
                )))
            }
            None => {
                return Err(ProtocolError::UnescapeFailure(
                    "dangling 0x7D at end of payload".into(),
                ))
            }
        }
    }
    Ok(out)
}

/// Encode a decimal digit string into `width` BCD bytes.
///
/// Shorter inputs are left-padded with `0` nibbles, so `"13523339527"`
/// over 6 bytes becomes `01 35 23 33 95 27`.
pub fn encode_bcd(digits: &str, width: usize) -> Result<Vec<u8>, ProtocolError> {
    if digits.len() > width * 2 {
        return Err(ProtocolError::Semantic(format!(
            "'{digits}' does not fit in {width} BCD bytes"
        )));
    }
    if !digits.bytes().all(|c| c.is_ascii_digit()) {
        return Err(ProtocolError::Semantic(format!(
            "'{digits}' contains non-decimal characters"
        )));
    }
    let mut padded = String::with_capacity(width * 2);
    for _ in 0..width * 2 - digits.len() {
        padded.push('0');
    }
    padded.push_str(digits);
    let bytes = padded.as_bytes();
    let mut out = Vec::with_capacity(width);
    for i in 0..width {
        let hi = bytes[2 * i] - b'0';
        let lo = bytes[2 * i + 1] - b'0';
        out.push((hi << 4) | lo);
    }
    Ok(out)
}

/// Decode BCD bytes into a digit string, preserving every digit.
///
/// Used for timestamps, where a leading `00` month must survive round-trip.
pub fn decode_bcd_fill_zero(bytes: &[u8]) -> Result<String, ProtocolError> {
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        let hi = (b >> 4) & 0x0F;
        let lo = b & 0x0F;
        if hi > 9 || lo > 9 {
            return Err(ProtocolError::Semantic(format!("invalid BCD byte {b:#04X}")));
        }
        out.push(char::from(b'0' + hi));
        out.push(char::from(b'0' + lo));
    }
    Ok(out)
}

/// Decode BCD bytes into a digit string with leading zeros stripped.
///
/// Phone numbers use this form: an 11-digit number padded to 12 digits on
/// encode comes back as the original 11 digits. An all-zero field decodes
/// to `"0"`.
pub fn decode_bcd(bytes: &[u8]) -> Result<String, ProtocolError> {
    let full = decode_bcd_fill_zero(bytes)?;
    let trimmed = full.trim_start_matches('0');
    if trimmed.is_empty() {
        Ok("0".to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

/// Encode a `"YYMMDDhhmmss"` time string into 6 BCD bytes.
pub fn encode_time_bcd(time: &str) -> Result<[u8; 6], ProtocolError> {
    if time.len() != 12 {
        return Err(ProtocolError::Semantic(format!(
            "time '{time}' must be 12 digits (YYMMDDhhmmss)"
        )));
    }
    let bytes = encode_bcd(time, 6)?;
    let mut out = [0u8; 6];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// Decode a 6-byte BCD time field into `"YYMMDDhhmmss"`.
pub fn decode_time_bcd(bytes: &[u8]) -> Result<String, ProtocolError> {
    if bytes.len() != 6 {
        return Err(ProtocolError::Semantic(format!(
            "time field must be 6 bytes, got {}",
            bytes.len()
        )));
    }
    decode_bcd_fill_zero(bytes)
}

/// Interpret a `"YYMMDDhhmmss"` string as a calendar timestamp.
///
/// Years are 2000-based per the standard's two-digit year field.
pub fn parse_time(time: &str) -> Result<NaiveDateTime, ProtocolError> {
    if time.len() != 12 || !time.bytes().all(|c| c.is_ascii_digit()) {
        return Err(ProtocolError::Semantic(format!(
            "time '{time}' must be 12 digits (YYMMDDhhmmss)"
        )));
    }
    let field = |i: usize| -> u32 { time[i..i + 2].parse().unwrap_or(0) };
    build_datetime(
        2000 + field(0) as i32,
        field(2),
        field(4),
        field(6),
        field(8),
        field(10),
    )
}

/// Build `NaiveDateTime` with validation and rich errors.
#[inline]
fn build_datetime(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> Result<NaiveDateTime, ProtocolError> {
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        ProtocolError::Semantic(format!("Invalid date: year={year} month={month} day={day}"))
    })?;
    let time = NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(|| {
        ProtocolError::Semantic(format!(
            "Invalid time: hour={hour} minute={minute} second={second}"
        ))
    })?;
    Ok(NaiveDateTime::new(date, time))
}

/// Stream-level frame delimiter for JT808 over TCP.
///
/// Scans the inbound buffer for a `0x7E … 0x7E` span, skipping garbage
/// between frames, and yields one complete raw frame (flags included,
/// still escaped). Header/body parsing is the registry's job; this codec
/// only finds frame boundaries so it stays usable before any handler is
/// registered.
#[derive(Debug, Clone, Default)]
pub struct Jt808FrameCodec;

impl Jt808FrameCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for Jt808FrameCodec {
    type Item = Bytes;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            // Drop noise ahead of the opening flag.
            let Some(start) = src.iter().position(|&b| b == FLAG_BYTE) else {
                src.clear();
                return Ok(None);
            };
            if start > 0 {
                src.advance(start);
            }

            // Locate the closing flag. A second flag closer than the minimum
            // frame length cannot terminate a valid frame; treat it as the
            // opening flag of the next candidate and resynchronize.
            match src[1..].iter().position(|&b| b == FLAG_BYTE) {
                None => return Ok(None),
                Some(rel) => {
                    let end = rel + 1;
                    if end + 1 < MIN_FRAME_LEN {
                        src.advance(end);
                        continue;
                    }
                    let frame = src.split_to(end + 1).freeze();
                    return Ok(Some(frame));
                }
            }
        }
    }
}

impl Encoder<Bytes> for Jt808FrameCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.extend_from_slice(&item);
        Ok(())
    }
}

impl Encoder<Vec<u8>> for Jt808FrameCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Vec<u8>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.extend_from_slice(&item);
        Ok(())
    }
}
