use crate::protocol::codec::{escape_into, unescape, xor_checksum};
use crate::protocol::error::ProtocolError;
use crate::protocol::wire::{WireDecode, WireEncode};
use bytes::{BufMut, Bytes, BytesMut};

pub mod body;
pub mod builder;
pub mod defs;
pub mod header;

pub use body::*;
pub use builder::*;
pub use header::{BodyAttr, MessageHeader};

use defs::{FLAG_BYTE, MAX_BODY_LEN, MIN_FRAME_LEN};

/// Assemble a complete wire frame from a header and a body.
///
/// The header's body-length field is patched to the actual body length
/// before encoding; the checksum covers header and body, the escape pass
/// runs after the checksum, and the flag bytes come last.
pub fn assemble_frame(header: &MessageHeader, body: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    if body.len() > MAX_BODY_LEN {
        return Err(ProtocolError::BodyEncode {
            msg_id: header.msg_id,
            reason: format!(
                "body is {} bytes, maximum {MAX_BODY_LEN} per frame",
                body.len()
            ),
        });
    }
    let mut patched = header.clone();
    patched.attr.set_body_len(body.len())?;

    let mut plain = BytesMut::with_capacity(patched.wire_len() + body.len() + 1);
    patched.encode_to(&mut plain, &())?;
    plain.put_slice(body);
    plain.put_u8(xor_checksum(&plain));

    let mut out = Vec::with_capacity(plain.len() + 2);
    out.push(FLAG_BYTE);
    escape_into(&plain, &mut out);
    out.push(FLAG_BYTE);
    Ok(out)
}

/// Unwrap a complete wire frame into its header and body bytes.
///
/// Verifies the flag bytes, reverses the escape pass, checks the minimum
/// length and the XOR checksum, decodes the header, and requires the
/// declared body length to match the actual span.
pub fn split_frame(input: &[u8]) -> Result<(MessageHeader, Bytes), ProtocolError> {
    if input.len() < 2 || input[0] != FLAG_BYTE || input[input.len() - 1] != FLAG_BYTE {
        return Err(ProtocolError::MissingFlags);
    }
    let interior = unescape(&input[1..input.len() - 1])?;
    // Interior is header + body + checksum; the two flags complete the frame.
    if interior.len() + 2 < MIN_FRAME_LEN {
        return Err(ProtocolError::FrameTooShort {
            actual: interior.len() + 2,
            minimum: MIN_FRAME_LEN,
        });
    }

    let (payload, trailer) = interior.split_at(interior.len() - 1);
    let calculated = xor_checksum(payload);
    if trailer[0] != calculated {
        return Err(ProtocolError::ChecksumMismatch {
            expected: trailer[0],
            calculated,
        });
    }

    let parent = Bytes::from(payload.to_vec());
    let (body, header) = MessageHeader::parse(&parent, &parent, &())?;
    if header.attr.body_len() != body.len() {
        return Err(ProtocolError::HeaderParse(format!(
            "attribute declares {} body bytes but the frame carries {}",
            header.attr.body_len(),
            body.len()
        )));
    }
    let body = parent.slice_ref(body);
    Ok((header, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::frame::defs::Phone;
    use crate::types::EncryptMode;

    fn heartbeat_header() -> MessageHeader {
        MessageHeader {
            msg_id: 0x0002,
            attr: BodyAttr::default(),
            phone: Phone::new("13523339527").unwrap(),
            flow_num: 1,
            total_packets: 0,
            packet_seq: 0,
        }
    }

    #[test]
    fn assemble_split_round_trip() {
        let frame = assemble_frame(&heartbeat_header(), &[]).unwrap();
        assert_eq!(frame.first(), Some(&FLAG_BYTE));
        assert_eq!(frame.last(), Some(&FLAG_BYTE));

        let (header, body) = split_frame(&frame).unwrap();
        assert_eq!(header.msg_id, 0x0002);
        assert_eq!(header.phone.as_str(), "13523339527");
        assert_eq!(header.flow_num, 1);
        assert!(body.is_empty());
    }

    #[test]
    fn flag_bytes_in_body_are_escaped() {
        let body = [0x7E, 0x00, 0x7D, 0x01];
        let frame = assemble_frame(&heartbeat_header(), &body).unwrap();
        let interior = &frame[1..frame.len() - 1];
        assert!(!interior.contains(&FLAG_BYTE));
        assert!(interior.windows(2).any(|w| w == [0x7D, 0x02]));
        assert!(interior.windows(2).any(|w| w == [0x7D, 0x01]));

        let (_, parsed_body) = split_frame(&frame).unwrap();
        assert_eq!(&parsed_body[..], &body[..]);
    }

    #[test]
    fn split_rejects_missing_flags_and_short_frames() {
        let frame = assemble_frame(&heartbeat_header(), &[]).unwrap();
        let mut no_flag = frame.clone();
        *no_flag.last_mut().unwrap() = 0x00;
        assert!(matches!(
            split_frame(&no_flag),
            Err(ProtocolError::MissingFlags)
        ));

        assert!(matches!(
            split_frame(&[0x7E, 0x00, 0x01, 0x7E]),
            Err(ProtocolError::FrameTooShort { .. })
        ));
    }

    #[test]
    fn split_rejects_corrupted_checksum() {
        let mut frame = assemble_frame(&heartbeat_header(), &[0x11, 0x22]).unwrap();
        // Corrupt one body byte; flag and escape bytes stay untouched.
        let idx = frame.len() - 4;
        frame[idx] ^= 0xFF;
        assert!(matches!(
            split_frame(&frame),
            Err(ProtocolError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn split_rejects_body_length_mismatch() {
        // Hand-build a frame whose attribute word claims 5 body bytes while
        // carrying 2.
        let mut header = heartbeat_header();
        header.attr = BodyAttr::from_parts(5, EncryptMode::Plain, false).unwrap();
        let mut plain = BytesMut::new();
        header.encode_to(&mut plain, &()).unwrap();
        plain.put_slice(&[0xAA, 0xBB]);
        plain.put_u8(xor_checksum(&plain));
        let mut raw = vec![FLAG_BYTE];
        escape_into(&plain, &mut raw);
        raw.push(FLAG_BYTE);

        assert!(matches!(
            split_frame(&raw),
            Err(ProtocolError::HeaderParse(_))
        ));
    }

    #[test]
    fn oversize_body_is_rejected() {
        let body = vec![0u8; MAX_BODY_LEN + 1];
        assert!(matches!(
            assemble_frame(&heartbeat_header(), &body),
            Err(ProtocolError::BodyEncode { .. })
        ));
    }
}
