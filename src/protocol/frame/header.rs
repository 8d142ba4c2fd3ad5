use crate::protocol::error::ProtocolError;
use crate::protocol::frame::defs::{Phone, HEADER_LEN_PACKET, HEADER_LEN_SHORT, MAX_BODY_LEN};
use crate::protocol::wire::{WireDecode, WireEncode};
use crate::types::EncryptMode;
use bytes::{BufMut, Bytes};
use serde::{Deserialize, Serialize};

/// Message body attribute word (16 bits).
///
/// Layout, MSB to LSB: `reserved:2 | packet:1 | encrypt:3 | body_len:10`.
/// The raw word is kept so reserved bits survive a decode/encode cycle;
/// all access masks and shifts explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyAttr(pub u16);

impl BodyAttr {
    pub fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub fn from_parts(
        body_len: usize,
        encrypt: EncryptMode,
        packet: bool,
    ) -> Result<Self, ProtocolError> {
        if body_len > MAX_BODY_LEN {
            return Err(ProtocolError::Semantic(format!(
                "body length {body_len} exceeds the 10-bit maximum {MAX_BODY_LEN}"
            )));
        }
        let mut raw = body_len as u16;
        raw |= (encrypt.to_bits() as u16) << 10;
        if packet {
            raw |= 1 << 13;
        }
        Ok(Self(raw))
    }

    pub fn raw(self) -> u16 {
        self.0
    }

    /// Body length, bits 0-9.
    pub fn body_len(self) -> usize {
        (self.0 & 0x03FF) as usize
    }

    pub fn set_body_len(&mut self, len: usize) -> Result<(), ProtocolError> {
        if len > MAX_BODY_LEN {
            return Err(ProtocolError::Semantic(format!(
                "body length {len} exceeds the 10-bit maximum {MAX_BODY_LEN}"
            )));
        }
        self.0 = (self.0 & !0x03FF) | len as u16;
        Ok(())
    }

    /// Encryption mode, bits 10-12.
    pub fn encrypt(self) -> EncryptMode {
        EncryptMode::from_bits(((self.0 >> 10) & 0x07) as u8)
    }

    pub fn set_encrypt(&mut self, mode: EncryptMode) {
        self.0 = (self.0 & !(0x07 << 10)) | ((mode.to_bits() as u16) << 10);
    }

    /// Segmentation flag, bit 13.
    pub fn packet(self) -> bool {
        self.0 & (1 << 13) != 0
    }

    pub fn set_packet(&mut self, on: bool) {
        if on {
            self.0 |= 1 << 13;
        } else {
            self.0 &= !(1 << 13);
        }
    }

    /// Reserved bits 14-15, zero on send, preserved on receive.
    pub fn reserved(self) -> u8 {
        ((self.0 >> 14) & 0x03) as u8
    }
}

/// JT808 message header.
///
/// # Wire format (big-endian)
///
/// | Offset | Size | Field |
/// |-------:|-----:|-------|
/// | 0 | 2 | message ID |
/// | 2 | 2 | body attribute word |
/// | 4 | 6 | phone number (BCD, 12 digits) |
/// | 10 | 2 | message flow number |
/// | 12 | 2 | total packets (only if `packet` is set) |
/// | 14 | 2 | packet sequence (only if `packet` is set) |
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageHeader {
    pub msg_id: u16,
    pub attr: BodyAttr,
    pub phone: Phone,
    pub flow_num: u16,
    /// Total number of packets; meaningful only when `attr.packet()`.
    pub total_packets: u16,
    /// 1-based sequence of this packet; meaningful only when `attr.packet()`.
    pub packet_seq: u16,
}

impl MessageHeader {
    /// Header length on the wire for the current packet flag.
    pub fn wire_len(&self) -> usize {
        if self.attr.packet() {
            HEADER_LEN_PACKET
        } else {
            HEADER_LEN_SHORT
        }
    }
}

impl WireEncode for MessageHeader {
    type Error = ProtocolError;
    type Context = ();

    fn encoded_len(&self, _ctx: &Self::Context) -> usize {
        self.wire_len()
    }

    fn encode_to<B: BufMut>(&self, dst: &mut B, _ctx: &Self::Context) -> Result<(), Self::Error> {
        dst.put_u16(self.msg_id);
        dst.put_u16(self.attr.raw());
        dst.put_slice(&self.phone.to_bcd()?);
        dst.put_u16(self.flow_num);
        if self.attr.packet() {
            if self.total_packets == 0 || self.packet_seq == 0 || self.packet_seq > self.total_packets
            {
                return Err(ProtocolError::Semantic(format!(
                    "invalid segmentation fields: total {} seq {}",
                    self.total_packets, self.packet_seq
                )));
            }
            dst.put_u16(self.total_packets);
            dst.put_u16(self.packet_seq);
        }
        Ok(())
    }
}

impl WireDecode for MessageHeader {
    type Error = ProtocolError;
    type Context = ();

    fn parse<'a>(
        input: &'a [u8],
        _parent: &Bytes,
        _ctx: &Self::Context,
    ) -> Result<(&'a [u8], Self), Self::Error> {
        if input.len() < HEADER_LEN_SHORT {
            return Err(ProtocolError::HeaderParse(format!(
                "need at least {HEADER_LEN_SHORT} bytes, got {}",
                input.len()
            )));
        }
        let msg_id = u16::from_be_bytes([input[0], input[1]]);
        let attr = BodyAttr::new(u16::from_be_bytes([input[2], input[3]]));
        let phone = Phone::from_bcd(&input[4..10])
            .map_err(|e| ProtocolError::HeaderParse(e.to_string()))?;
        let flow_num = u16::from_be_bytes([input[10], input[11]]);

        let (total_packets, packet_seq, consumed) = if attr.packet() {
            if input.len() < HEADER_LEN_PACKET {
                return Err(ProtocolError::HeaderParse(
                    "packet flag set but segmentation fields missing".into(),
                ));
            }
            let total = u16::from_be_bytes([input[12], input[13]]);
            let seq = u16::from_be_bytes([input[14], input[15]]);
            if total == 0 || seq == 0 || seq > total {
                return Err(ProtocolError::HeaderParse(format!(
                    "invalid segmentation fields: total {total} seq {seq}"
                )));
            }
            (total, seq, HEADER_LEN_PACKET)
        } else {
            (0, 0, HEADER_LEN_SHORT)
        };

        Ok((
            &input[consumed..],
            Self {
                msg_id,
                attr,
                phone,
                flow_num,
                total_packets,
                packet_seq,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn attr_triple_round_trip() {
        for body_len in 0usize..=1023 {
            for encrypt_bits in 0u8..=7 {
                for packet in [false, true] {
                    let attr = BodyAttr::from_parts(
                        body_len,
                        EncryptMode::from_bits(encrypt_bits),
                        packet,
                    )
                    .unwrap();
                    assert_eq!(attr.body_len(), body_len);
                    assert_eq!(attr.encrypt().to_bits(), encrypt_bits);
                    assert_eq!(attr.packet(), packet);
                    assert_eq!(attr.reserved(), 0);
                }
            }
        }
        assert!(BodyAttr::from_parts(1024, EncryptMode::Plain, false).is_err());
    }

    #[test]
    fn attr_preserves_reserved_bits() {
        let mut attr = BodyAttr::new(0xC000 | 28);
        assert_eq!(attr.reserved(), 0b11);
        attr.set_body_len(100).unwrap();
        attr.set_packet(true);
        assert_eq!(attr.reserved(), 0b11);
        assert_eq!(attr.body_len(), 100);
    }

    #[test]
    fn header_round_trip_short() {
        let header = MessageHeader {
            msg_id: 0x0002,
            attr: BodyAttr::from_parts(0, EncryptMode::Plain, false).unwrap(),
            phone: Phone::new("13523339527").unwrap(),
            flow_num: 1,
            total_packets: 0,
            packet_seq: 0,
        };
        let mut buf = BytesMut::new();
        header.encode_to(&mut buf, &()).unwrap();
        assert_eq!(
            &buf[..],
            &[0x00, 0x02, 0x00, 0x00, 0x01, 0x35, 0x23, 0x33, 0x95, 0x27, 0x00, 0x01]
        );
        let (rest, parsed) = MessageHeader::parse(&buf, &Bytes::new(), &()).unwrap();
        assert!(rest.is_empty());
        assert_eq!(parsed, header);
    }

    #[test]
    fn header_round_trip_segmented() {
        let mut attr = BodyAttr::from_parts(512, EncryptMode::Plain, true).unwrap();
        attr.set_body_len(512).unwrap();
        let header = MessageHeader {
            msg_id: 0x8108,
            attr,
            phone: Phone::new("13523339527").unwrap(),
            flow_num: 9,
            total_packets: 3,
            packet_seq: 2,
        };
        let mut buf = BytesMut::new();
        header.encode_to(&mut buf, &()).unwrap();
        assert_eq!(buf.len(), HEADER_LEN_PACKET);
        // Segmentation fields occupy bytes 12..16.
        assert_eq!(&buf[12..16], &[0x00, 0x03, 0x00, 0x02]);
        let (_, parsed) = MessageHeader::parse(&buf, &Bytes::new(), &()).unwrap();
        assert_eq!(parsed.total_packets, 3);
        assert_eq!(parsed.packet_seq, 2);
    }

    #[test]
    fn header_rejects_bad_segmentation() {
        let attr = BodyAttr::from_parts(0, EncryptMode::Plain, true).unwrap();
        let header = MessageHeader {
            msg_id: 0x8108,
            attr,
            phone: Phone::new("1").unwrap(),
            flow_num: 0,
            total_packets: 2,
            packet_seq: 3,
        };
        let mut buf = BytesMut::new();
        assert!(header.encode_to(&mut buf, &()).is_err());
    }
}
