use crate::protocol::codec::{decode_time_bcd, encode_time_bcd};
use crate::protocol::error::ProtocolError;
use crate::protocol::frame::defs::{AlarmFlags, AreaAttribute, StatusFlags};
use crate::protocol::wire::{WireDecode, WireEncode};
use crate::types::{PlateColor, UpgradeResult, UpgradeType};
use bytes::{BufMut, Bytes};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Terminal parameter items: parameter ID to raw value (at most 255 bytes).
pub type TerminalParameters = BTreeMap<u32, Vec<u8>>;

/// Location extension items: extension ID to raw value (at most 255 bytes).
pub type LocationExtensions = BTreeMap<u8, Vec<u8>>;

/// Fixed size of the basic location block.
pub const LOCATION_BASIC_LEN: usize = 28;

/// Terminal registration body (0x0100).
///
/// # Wire format
/// `province:u16 | city:u16 | manufacturer:5B | model:20B (0x00-padded) |
/// terminal_id:7B (0x00-padded) | plate_color:u8 | plate_num:remainder`.
/// The plate number is present iff the color is not `Vin`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisterInfo {
    pub province_id: u16,
    pub city_id: u16,
    pub manufacturer_id: [u8; 5],
    /// Terminal model, up to 20 bytes; trailing pad bytes are stripped on decode.
    pub terminal_model: Vec<u8>,
    /// Terminal ID, up to 7 bytes; trailing pad bytes are stripped on decode.
    pub terminal_id: Vec<u8>,
    pub plate_color: PlateColor,
    pub plate_num: String,
}

impl WireEncode for RegisterInfo {
    type Error = ProtocolError;
    type Context = ();

    fn encoded_len(&self, _ctx: &Self::Context) -> usize {
        let plate = if self.plate_color == PlateColor::Vin {
            0
        } else {
            self.plate_num.len()
        };
        37 + plate
    }

    fn encode_to<B: BufMut>(&self, dst: &mut B, _ctx: &Self::Context) -> Result<(), Self::Error> {
        if self.terminal_model.len() > 20 {
            return Err(ProtocolError::Semantic(format!(
                "terminal model is {} bytes, maximum 20",
                self.terminal_model.len()
            )));
        }
        if self.terminal_id.len() > 7 {
            return Err(ProtocolError::Semantic(format!(
                "terminal id is {} bytes, maximum 7",
                self.terminal_id.len()
            )));
        }
        dst.put_u16(self.province_id);
        dst.put_u16(self.city_id);
        dst.put_slice(&self.manufacturer_id);
        dst.put_slice(&self.terminal_model);
        dst.put_bytes(0x00, 20 - self.terminal_model.len());
        dst.put_slice(&self.terminal_id);
        dst.put_bytes(0x00, 7 - self.terminal_id.len());
        dst.put_u8(self.plate_color.into());
        if self.plate_color != PlateColor::Vin {
            dst.put_slice(self.plate_num.as_bytes());
        }
        Ok(())
    }
}

impl WireDecode for RegisterInfo {
    type Error = ProtocolError;
    type Context = ();

    fn parse<'a>(
        input: &'a [u8],
        _parent: &Bytes,
        _ctx: &Self::Context,
    ) -> Result<(&'a [u8], Self), Self::Error> {
        if input.len() < 37 {
            return Err(ProtocolError::Semantic(format!(
                "register body needs at least 37 bytes, got {}",
                input.len()
            )));
        }
        let province_id = u16::from_be_bytes([input[0], input[1]]);
        let city_id = u16::from_be_bytes([input[2], input[3]]);
        let mut manufacturer_id = [0u8; 5];
        manufacturer_id.copy_from_slice(&input[4..9]);
        let terminal_model = trim_padding(&input[9..29]);
        let terminal_id = trim_padding(&input[29..36]);
        let plate_color = PlateColor::from(input[36]);
        let plate_num = if plate_color == PlateColor::Vin {
            String::new()
        } else {
            String::from_utf8(input[37..].to_vec())
                .map_err(|e| ProtocolError::Semantic(format!("plate number is not text: {e}")))?
        };
        Ok((
            &[],
            Self {
                province_id,
                city_id,
                manufacturer_id,
                terminal_model,
                terminal_id,
                plate_color,
                plate_num,
            },
        ))
    }
}

fn trim_padding(bytes: &[u8]) -> Vec<u8> {
    let end = bytes
        .iter()
        .rposition(|&b| b != 0x00)
        .map_or(0, |pos| pos + 1);
    bytes[..end].to_vec()
}

/// Basic location block shared by 0x0200 / 0x0201 / 0x0801 (fixed 28 bytes).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationBasic {
    pub alarm: AlarmFlags,
    pub status: StatusFlags,
    /// Latitude in degrees multiplied by 1e6.
    pub latitude: u32,
    /// Longitude in degrees multiplied by 1e6.
    pub longitude: u32,
    /// Altitude in meters.
    pub altitude: u16,
    /// Speed in 1/10 km/h.
    pub speed: u16,
    /// Bearing, 0-359, true north is 0, clockwise.
    pub bearing: u16,
    /// "YYMMDDhhmmss" (GMT+8).
    pub time: String,
}

impl LocationBasic {
    /// Interpret the BCD time field as a calendar timestamp.
    pub fn timestamp(&self) -> Result<chrono::NaiveDateTime, ProtocolError> {
        crate::protocol::codec::parse_time(&self.time)
    }
}

impl WireEncode for LocationBasic {
    type Error = ProtocolError;
    type Context = ();

    fn encoded_len(&self, _ctx: &Self::Context) -> usize {
        LOCATION_BASIC_LEN
    }

    fn encode_to<B: BufMut>(&self, dst: &mut B, _ctx: &Self::Context) -> Result<(), Self::Error> {
        dst.put_u32(self.alarm.raw());
        dst.put_u32(self.status.raw());
        dst.put_u32(self.latitude);
        dst.put_u32(self.longitude);
        dst.put_u16(self.altitude);
        dst.put_u16(self.speed);
        dst.put_u16(self.bearing);
        dst.put_slice(&encode_time_bcd(&self.time)?);
        Ok(())
    }
}

impl WireDecode for LocationBasic {
    type Error = ProtocolError;
    type Context = ();

    fn parse<'a>(
        input: &'a [u8],
        _parent: &Bytes,
        _ctx: &Self::Context,
    ) -> Result<(&'a [u8], Self), Self::Error> {
        if input.len() < LOCATION_BASIC_LEN {
            return Err(ProtocolError::Semantic(format!(
                "location block needs {LOCATION_BASIC_LEN} bytes, got {}",
                input.len()
            )));
        }
        let be32 = |i: usize| u32::from_be_bytes([input[i], input[i + 1], input[i + 2], input[i + 3]]);
        let be16 = |i: usize| u16::from_be_bytes([input[i], input[i + 1]]);
        let basic = Self {
            alarm: AlarmFlags::new(be32(0)),
            status: StatusFlags::new(be32(4)),
            latitude: be32(8),
            longitude: be32(12),
            altitude: be16(16),
            speed: be16(18),
            bearing: be16(20),
            time: decode_time_bcd(&input[22..28])?,
        };
        Ok((&input[LOCATION_BASIC_LEN..], basic))
    }
}

/// Temporary location tracking control body (0x8202).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingControl {
    /// Report interval in seconds; 0 stops tracking.
    pub interval: u16,
    /// How long the tracking request stays valid, in seconds.
    pub valid_seconds: u32,
}

/// One polygon vertex, in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Time window of a polygon area, "YYMMDDhhmmss" BCD on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaTimeWindow {
    pub start_time: String,
    pub stop_time: String,
}

/// Speed limit of a polygon area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaSpeedLimit {
    /// Maximum speed in km/h.
    pub max_speed: u16,
    /// Seconds of sustained overspeed before the alarm fires.
    pub overspeed_seconds: u8,
}

/// Polygon geofence body (0x8604).
///
/// The optional parts are the single source of truth: encoding patches the
/// `by_time` / `speed_limit` attribute bits to match their presence, so an
/// inconsistent combination cannot reach the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolygonArea {
    pub area_id: u32,
    pub attribute: AreaAttribute,
    pub time_window: Option<AreaTimeWindow>,
    pub speed_limit: Option<AreaSpeedLimit>,
    pub vertices: Vec<LocationPoint>,
}

impl WireEncode for PolygonArea {
    type Error = ProtocolError;
    type Context = ();

    fn encoded_len(&self, _ctx: &Self::Context) -> usize {
        4 + 2
            + self.time_window.as_ref().map_or(0, |_| 12)
            + self.speed_limit.as_ref().map_or(0, |_| 3)
            + 2
            + self.vertices.len() * 8
    }

    fn encode_to<B: BufMut>(&self, dst: &mut B, _ctx: &Self::Context) -> Result<(), Self::Error> {
        if self.vertices.len() > u16::MAX as usize {
            return Err(ProtocolError::Semantic(format!(
                "too many vertices: {}",
                self.vertices.len()
            )));
        }
        let mut attr = self.attribute;
        attr.set_by_time(self.time_window.is_some());
        attr.set_speed_limit(self.speed_limit.is_some());

        dst.put_u32(self.area_id);
        dst.put_u16(attr.raw());
        if let Some(window) = &self.time_window {
            dst.put_slice(&encode_time_bcd(&window.start_time)?);
            dst.put_slice(&encode_time_bcd(&window.stop_time)?);
        }
        if let Some(limit) = &self.speed_limit {
            dst.put_u16(limit.max_speed);
            dst.put_u8(limit.overspeed_seconds);
        }
        dst.put_u16(self.vertices.len() as u16);
        for vertex in &self.vertices {
            dst.put_u32((vertex.latitude * 1e6).round() as u32);
            dst.put_u32((vertex.longitude * 1e6).round() as u32);
        }
        Ok(())
    }
}

impl WireDecode for PolygonArea {
    type Error = ProtocolError;
    type Context = ();

    fn parse<'a>(
        input: &'a [u8],
        _parent: &Bytes,
        _ctx: &Self::Context,
    ) -> Result<(&'a [u8], Self), Self::Error> {
        if input.len() < 8 {
            return Err(ProtocolError::Semantic(
                "polygon body needs at least 8 bytes".into(),
            ));
        }
        let area_id = u32::from_be_bytes([input[0], input[1], input[2], input[3]]);
        let attribute = AreaAttribute::new(u16::from_be_bytes([input[4], input[5]]));
        let mut pos = 6;

        let time_window = if attribute.by_time() {
            if input.len() < pos + 12 {
                return Err(ProtocolError::Semantic(
                    "polygon body truncated inside time window".into(),
                ));
            }
            let window = AreaTimeWindow {
                start_time: decode_time_bcd(&input[pos..pos + 6])?,
                stop_time: decode_time_bcd(&input[pos + 6..pos + 12])?,
            };
            pos += 12;
            Some(window)
        } else {
            None
        };

        let speed_limit = if attribute.speed_limit() {
            if input.len() < pos + 3 {
                return Err(ProtocolError::Semantic(
                    "polygon body truncated inside speed limit".into(),
                ));
            }
            let limit = AreaSpeedLimit {
                max_speed: u16::from_be_bytes([input[pos], input[pos + 1]]),
                overspeed_seconds: input[pos + 2],
            };
            pos += 3;
            Some(limit)
        } else {
            None
        };

        if input.len() < pos + 2 {
            return Err(ProtocolError::Semantic(
                "polygon body truncated before vertex count".into(),
            ));
        }
        let count = u16::from_be_bytes([input[pos], input[pos + 1]]) as usize;
        pos += 2;
        if input.len() - pos != count * 8 {
            return Err(ProtocolError::Semantic(format!(
                "vertex area is {} bytes, expected {} for {count} vertices",
                input.len() - pos,
                count * 8
            )));
        }
        let mut vertices = Vec::with_capacity(count);
        for _ in 0..count {
            let lat = u32::from_be_bytes([input[pos], input[pos + 1], input[pos + 2], input[pos + 3]]);
            let lon = u32::from_be_bytes([
                input[pos + 4],
                input[pos + 5],
                input[pos + 6],
                input[pos + 7],
            ]);
            vertices.push(LocationPoint {
                latitude: lat as f64 * 1e-6,
                longitude: lon as f64 * 1e-6,
            });
            pos += 8;
        }

        Ok((
            &input[pos..],
            Self {
                area_id,
                attribute,
                time_window,
                speed_limit,
                vertices,
            },
        ))
    }
}

/// Terminal upgrade body (0x8108) and upgrade result fields (0x0108).
///
/// # Wire format (0x8108)
/// `type:u8 | manufacturer:5B | version_len:u8 | version | total_len:u32 |
/// chunk:remainder`. `upgrade_result` never reaches the 0x8108 wire; it is
/// carried for the 0x0108 report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpgradeInfo {
    pub upgrade_type: UpgradeType,
    pub upgrade_result: UpgradeResult,
    pub manufacturer_id: [u8; 5],
    pub version_id: String,
    /// Total length of the logical upgrade package across all segments.
    pub total_len: u32,
    /// The chunk carried by this frame.
    pub chunk: Bytes,
}

impl UpgradeInfo {
    /// Fixed bytes ahead of the chunk for the current version string.
    pub fn prefix_len(&self) -> usize {
        1 + 5 + 1 + self.version_id.len() + 4
    }
}

impl WireEncode for UpgradeInfo {
    type Error = ProtocolError;
    type Context = ();

    fn encoded_len(&self, _ctx: &Self::Context) -> usize {
        self.prefix_len() + self.chunk.len()
    }

    fn encode_to<B: BufMut>(&self, dst: &mut B, _ctx: &Self::Context) -> Result<(), Self::Error> {
        if self.version_id.len() > u8::MAX as usize {
            return Err(ProtocolError::Semantic(format!(
                "version id is {} bytes, maximum 255",
                self.version_id.len()
            )));
        }
        dst.put_u8(self.upgrade_type.into());
        dst.put_slice(&self.manufacturer_id);
        dst.put_u8(self.version_id.len() as u8);
        dst.put_slice(self.version_id.as_bytes());
        dst.put_u32(self.total_len);
        dst.put_slice(&self.chunk);
        Ok(())
    }
}

impl WireDecode for UpgradeInfo {
    type Error = ProtocolError;
    type Context = ();

    fn parse<'a>(
        input: &'a [u8],
        _parent: &Bytes,
        _ctx: &Self::Context,
    ) -> Result<(&'a [u8], Self), Self::Error> {
        if input.len() < 11 {
            return Err(ProtocolError::Semantic(format!(
                "upgrade body needs at least 11 bytes, got {}",
                input.len()
            )));
        }
        let upgrade_type = UpgradeType::from(input[0]);
        let mut manufacturer_id = [0u8; 5];
        manufacturer_id.copy_from_slice(&input[1..6]);
        let version_len = input[6] as usize;
        if input.len() < 11 + version_len {
            return Err(ProtocolError::Semantic(
                "upgrade body truncated inside version id".into(),
            ));
        }
        let version_id = String::from_utf8(input[7..7 + version_len].to_vec())
            .map_err(|e| ProtocolError::Semantic(format!("version id is not text: {e}")))?;
        let pos = 7 + version_len;
        let total_len =
            u32::from_be_bytes([input[pos], input[pos + 1], input[pos + 2], input[pos + 3]]);
        let chunk = Bytes::copy_from_slice(&input[pos + 4..]);
        Ok((
            &[],
            Self {
                upgrade_type,
                upgrade_result: UpgradeResult::default(),
                manufacturer_id,
                version_id,
                total_len,
                chunk,
            },
        ))
    }
}

/// Fill packet request body (0x8003).
///
/// # Wire format
/// `first_packet_flow_num:u16 | count:u8 | count x packet_id:u16`,
/// all big-endian.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillPacket {
    /// Flow number of the first packet of the segmented message.
    pub first_packet_flow_num: u16,
    /// Sequence numbers of the packets to retransmit.
    pub packet_ids: Vec<u16>,
}

impl WireEncode for FillPacket {
    type Error = ProtocolError;
    type Context = ();

    fn encoded_len(&self, _ctx: &Self::Context) -> usize {
        3 + self.packet_ids.len() * 2
    }

    fn encode_to<B: BufMut>(&self, dst: &mut B, _ctx: &Self::Context) -> Result<(), Self::Error> {
        if self.packet_ids.len() > u8::MAX as usize {
            return Err(ProtocolError::Semantic(format!(
                "too many retransmission ids: {}",
                self.packet_ids.len()
            )));
        }
        dst.put_u16(self.first_packet_flow_num);
        dst.put_u8(self.packet_ids.len() as u8);
        for id in &self.packet_ids {
            dst.put_u16(*id);
        }
        Ok(())
    }
}

impl WireDecode for FillPacket {
    type Error = ProtocolError;
    type Context = ();

    fn parse<'a>(
        input: &'a [u8],
        _parent: &Bytes,
        _ctx: &Self::Context,
    ) -> Result<(&'a [u8], Self), Self::Error> {
        if input.len() < 3 {
            return Err(ProtocolError::Semantic(
                "fill packet body needs at least 3 bytes".into(),
            ));
        }
        let first_packet_flow_num = u16::from_be_bytes([input[0], input[1]]);
        let count = input[2] as usize;
        if input.len() - 3 != count * 2 {
            return Err(ProtocolError::Semantic(format!(
                "id area is {} bytes, expected {} for {count} ids",
                input.len() - 3,
                count * 2
            )));
        }
        let packet_ids = input[3..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        Ok((
            &[],
            Self {
                first_packet_flow_num,
                packet_ids,
            },
        ))
    }
}

/// Multimedia data upload body (0x0801).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultimediaUpload {
    pub media_id: u32,
    /// 0 image, 1 audio, 2 video.
    pub media_type: u8,
    /// 0 JPEG, 1 TIF, 2 MP3, 3 WAV, 4 WMV.
    pub media_format: u8,
    pub media_event: u8,
    pub channel_id: u8,
    /// The 28-byte basic location block captured with the media.
    pub location_body: Bytes,
    pub media_data: Bytes,
}

impl WireEncode for MultimediaUpload {
    type Error = ProtocolError;
    type Context = ();

    fn encoded_len(&self, _ctx: &Self::Context) -> usize {
        8 + LOCATION_BASIC_LEN + self.media_data.len()
    }

    fn encode_to<B: BufMut>(&self, dst: &mut B, _ctx: &Self::Context) -> Result<(), Self::Error> {
        if self.location_body.len() != LOCATION_BASIC_LEN {
            return Err(ProtocolError::Semantic(format!(
                "location body must be {LOCATION_BASIC_LEN} bytes, got {}",
                self.location_body.len()
            )));
        }
        dst.put_u32(self.media_id);
        dst.put_u8(self.media_type);
        dst.put_u8(self.media_format);
        dst.put_u8(self.media_event);
        dst.put_u8(self.channel_id);
        dst.put_slice(&self.location_body);
        dst.put_slice(&self.media_data);
        Ok(())
    }
}

impl WireDecode for MultimediaUpload {
    type Error = ProtocolError;
    type Context = ();

    fn parse<'a>(
        input: &'a [u8],
        _parent: &Bytes,
        _ctx: &Self::Context,
    ) -> Result<(&'a [u8], Self), Self::Error> {
        if input.len() < 8 + LOCATION_BASIC_LEN {
            return Err(ProtocolError::Semantic(format!(
                "multimedia body needs at least {} bytes, got {}",
                8 + LOCATION_BASIC_LEN,
                input.len()
            )));
        }
        let media_id = u32::from_be_bytes([input[0], input[1], input[2], input[3]]);
        Ok((
            &[],
            Self {
                media_id,
                media_type: input[4],
                media_format: input[5],
                media_event: input[6],
                channel_id: input[7],
                location_body: Bytes::copy_from_slice(&input[8..8 + LOCATION_BASIC_LEN]),
                media_data: Bytes::copy_from_slice(&input[8 + LOCATION_BASIC_LEN..]),
            },
        ))
    }
}

/// Multimedia upload response body (0x8800).
///
/// An empty retransmission list means the upload was accepted; the body is
/// then just the media ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultimediaUploadResponse {
    pub media_id: u32,
    pub reload_packet_ids: Vec<u16>,
}

impl MultimediaUploadResponse {
    pub fn is_accepted(&self) -> bool {
        self.reload_packet_ids.is_empty()
    }
}

impl WireEncode for MultimediaUploadResponse {
    type Error = ProtocolError;
    type Context = ();

    fn encoded_len(&self, _ctx: &Self::Context) -> usize {
        if self.reload_packet_ids.is_empty() {
            4
        } else {
            5 + self.reload_packet_ids.len() * 2
        }
    }

    fn encode_to<B: BufMut>(&self, dst: &mut B, _ctx: &Self::Context) -> Result<(), Self::Error> {
        if self.reload_packet_ids.len() > u8::MAX as usize {
            return Err(ProtocolError::Semantic(format!(
                "too many retransmission ids: {}",
                self.reload_packet_ids.len()
            )));
        }
        dst.put_u32(self.media_id);
        if !self.reload_packet_ids.is_empty() {
            dst.put_u8(self.reload_packet_ids.len() as u8);
            for id in &self.reload_packet_ids {
                dst.put_u16(*id);
            }
        }
        Ok(())
    }
}

impl WireDecode for MultimediaUploadResponse {
    type Error = ProtocolError;
    type Context = ();

    fn parse<'a>(
        input: &'a [u8],
        _parent: &Bytes,
        _ctx: &Self::Context,
    ) -> Result<(&'a [u8], Self), Self::Error> {
        if input.len() < 4 {
            return Err(ProtocolError::Semantic(
                "multimedia response needs at least 4 bytes".into(),
            ));
        }
        let media_id = u32::from_be_bytes([input[0], input[1], input[2], input[3]]);
        let reload_packet_ids = if input.len() > 4 {
            let count = input[4] as usize;
            if input.len() - 5 != count * 2 {
                return Err(ProtocolError::Semantic(format!(
                    "id area is {} bytes, expected {} for {count} ids",
                    input.len() - 5,
                    count * 2
                )));
            }
            input[5..]
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect()
        } else {
            Vec::new()
        };
        Ok((
            &[],
            Self {
                media_id,
                reload_packet_ids,
            },
        ))
    }
}

/// Encode `count:u8 | count x (id:u32, len:u8, value)` parameter items.
pub fn encode_parameter_items<B: BufMut>(
    params: &TerminalParameters,
    dst: &mut B,
) -> Result<(), ProtocolError> {
    if params.len() > u8::MAX as usize {
        return Err(ProtocolError::Semantic(format!(
            "too many parameter items: {}",
            params.len()
        )));
    }
    dst.put_u8(params.len() as u8);
    for (id, value) in params {
        if value.len() > u8::MAX as usize {
            return Err(ProtocolError::Semantic(format!(
                "parameter {id:#010X} value is {} bytes, maximum 255",
                value.len()
            )));
        }
        dst.put_u32(*id);
        dst.put_u8(value.len() as u8);
        dst.put_slice(value);
    }
    Ok(())
}

/// Decode the parameter item list written by [`encode_parameter_items`].
pub fn decode_parameter_items(input: &[u8]) -> Result<TerminalParameters, ProtocolError> {
    if input.is_empty() {
        return Err(ProtocolError::Semantic(
            "parameter list missing count byte".into(),
        ));
    }
    let count = input[0] as usize;
    let mut pos = 1;
    let mut params = TerminalParameters::new();
    for _ in 0..count {
        if input.len() < pos + 5 {
            return Err(ProtocolError::Semantic(
                "parameter list truncated inside item header".into(),
            ));
        }
        let id = u32::from_be_bytes([input[pos], input[pos + 1], input[pos + 2], input[pos + 3]]);
        let len = input[pos + 4] as usize;
        pos += 5;
        if input.len() < pos + len {
            return Err(ProtocolError::Semantic(format!(
                "parameter {id:#010X} declares {len} value bytes but the list ends early"
            )));
        }
        params.insert(id, input[pos..pos + len].to_vec());
        pos += len;
    }
    if pos != input.len() {
        return Err(ProtocolError::Semantic(format!(
            "{} trailing bytes after the last parameter item",
            input.len() - pos
        )));
    }
    Ok(params)
}

/// Encode the TLV extension list appended to location reports.
pub fn encode_extension_items<B: BufMut>(
    extensions: &LocationExtensions,
    dst: &mut B,
) -> Result<(), ProtocolError> {
    for (id, value) in extensions {
        if value.len() > u8::MAX as usize {
            return Err(ProtocolError::Semantic(format!(
                "extension {id:#04X} value is {} bytes, maximum 255",
                value.len()
            )));
        }
        dst.put_u8(*id);
        dst.put_u8(value.len() as u8);
        dst.put_slice(value);
    }
    Ok(())
}

/// Decode the TLV extension list appended to location reports.
pub fn decode_extension_items(input: &[u8]) -> Result<LocationExtensions, ProtocolError> {
    let mut pos = 0;
    let mut extensions = LocationExtensions::new();
    while pos < input.len() {
        if input.len() < pos + 2 {
            return Err(ProtocolError::Semantic(
                "extension list truncated inside item header".into(),
            ));
        }
        let id = input[pos];
        let len = input[pos + 1] as usize;
        pos += 2;
        if input.len() < pos + len {
            return Err(ProtocolError::Semantic(format!(
                "extension {id:#04X} declares {len} value bytes but the list ends early"
            )));
        }
        extensions.insert(id, input[pos..pos + len].to_vec());
        pos += len;
    }
    Ok(extensions)
}
