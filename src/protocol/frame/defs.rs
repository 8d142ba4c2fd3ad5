use crate::protocol::codec::{decode_bcd, encode_bcd};
use crate::protocol::error::ProtocolError;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use std::fmt;

/// The 0x7E sentinel delimiting a frame on the wire.
pub const FLAG_BYTE: u8 = 0x7E;

/// Shortest legal frame: flag + 12-byte header + checksum + flag.
pub const MIN_FRAME_LEN: usize = 15;

/// Message header length without segmentation fields.
pub const HEADER_LEN_SHORT: usize = 12;

/// Message header length with total/sequence fields.
pub const HEADER_LEN_PACKET: usize = 16;

/// Maximum body length expressible in the 10-bit attribute field.
pub const MAX_BODY_LEN: usize = 1023;

// --- Message catalog ---

/// JT/T 808 message IDs.
///
/// IDs with the high `0x8000` bit originate from the platform, the rest
/// from the terminal. The registries are keyed by raw `u16` so vendor
/// extensions outside this catalog stay first-class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u16)]
pub enum MessageId {
    TerminalGeneralResponse = 0x0001,
    TerminalHeartbeat = 0x0002,
    TerminalLogout = 0x0003,
    TerminalRegister = 0x0100,
    TerminalAuthentication = 0x0102,
    QueryParametersResponse = 0x0104,
    UpgradeResultReport = 0x0108,
    LocationReport = 0x0200,
    LocationQueryResponse = 0x0201,
    MultimediaUpload = 0x0801,
    PlatformGeneralResponse = 0x8001,
    FillPacketRequest = 0x8003,
    RegisterResponse = 0x8100,
    SetTerminalParameters = 0x8103,
    QueryTerminalParameters = 0x8104,
    QuerySpecificParameters = 0x8106,
    TerminalUpgrade = 0x8108,
    LocationQuery = 0x8201,
    TrackingControl = 0x8202,
    SetPolygonArea = 0x8604,
    DeletePolygonArea = 0x8605,
    MultimediaUploadResponse = 0x8800,

    Unknown = 0xFFFF,
}

impl MessageId {
    /// True for platform-to-terminal messages (`0x8xxx`).
    pub fn is_platform_sourced(self) -> bool {
        (self as u16) & 0x8000 != 0
    }
}

impl From<u16> for MessageId {
    fn from(val: u16) -> Self {
        match val {
            0x0001 => MessageId::TerminalGeneralResponse,
            0x0002 => MessageId::TerminalHeartbeat,
            0x0003 => MessageId::TerminalLogout,
            0x0100 => MessageId::TerminalRegister,
            0x0102 => MessageId::TerminalAuthentication,
            0x0104 => MessageId::QueryParametersResponse,
            0x0108 => MessageId::UpgradeResultReport,
            0x0200 => MessageId::LocationReport,
            0x0201 => MessageId::LocationQueryResponse,
            0x0801 => MessageId::MultimediaUpload,
            0x8001 => MessageId::PlatformGeneralResponse,
            0x8003 => MessageId::FillPacketRequest,
            0x8100 => MessageId::RegisterResponse,
            0x8103 => MessageId::SetTerminalParameters,
            0x8104 => MessageId::QueryTerminalParameters,
            0x8106 => MessageId::QuerySpecificParameters,
            0x8108 => MessageId::TerminalUpgrade,
            0x8201 => MessageId::LocationQuery,
            0x8202 => MessageId::TrackingControl,
            0x8604 => MessageId::SetPolygonArea,
            0x8605 => MessageId::DeletePolygonArea,
            0x8800 => MessageId::MultimediaUploadResponse,
            _ => MessageId::Unknown,
        }
    }
}

impl From<MessageId> for u16 {
    fn from(val: MessageId) -> Self {
        val as u16
    }
}

// --- Terminal phone number ---

/// Terminal phone number, up to 12 decimal digits.
///
/// # Wire format
/// 6 bytes of BCD; shorter numbers are left-padded with `0` nibbles, so an
/// 11-digit number round-trips unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    pub fn new(digits: impl Into<String>) -> Result<Self, ProtocolError> {
        let digits = digits.into();
        if digits.len() > 12 || !digits.bytes().all(|c| c.is_ascii_digit()) {
            return Err(ProtocolError::Semantic(format!(
                "phone '{digits}' must be at most 12 decimal digits"
            )));
        }
        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render the 6 BCD wire bytes.
    pub fn to_bcd(&self) -> Result<[u8; 6], ProtocolError> {
        let bytes = encode_bcd(&self.0, 6)?;
        let mut out = [0u8; 6];
        out.copy_from_slice(&bytes);
        Ok(out)
    }

    /// Parse from the 6 BCD wire bytes, stripping pad zeros.
    pub fn from_bcd(bytes: &[u8]) -> Result<Self, ProtocolError> {
        if bytes.len() != 6 {
            return Err(ProtocolError::Semantic(format!(
                "phone field must be 6 bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self(decode_bcd(bytes)?))
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// --- Alarm word ---

/// Location report alarm word (32 bits).
///
/// Named accessors mask and shift explicitly; compiler bit fields are
/// layout-defined and never touch the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlarmFlags(pub u32);

macro_rules! flag_bit {
    ($get:ident, $set:ident, $bit:expr) => {
        pub fn $get(self) -> bool {
            self.0 & (1 << $bit) != 0
        }

        pub fn $set(&mut self, on: bool) {
            if on {
                self.0 |= 1 << $bit;
            } else {
                self.0 &= !(1 << $bit);
            }
        }
    };
}

impl AlarmFlags {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    flag_bit!(sos, set_sos, 0);
    flag_bit!(overspeed, set_overspeed, 1);
    flag_bit!(fatigue, set_fatigue, 2);
    flag_bit!(early_warning, set_early_warning, 3);
    flag_bit!(gnss_fault, set_gnss_fault, 4);
    flag_bit!(gnss_antenna_cut, set_gnss_antenna_cut, 5);
    flag_bit!(gnss_antenna_short, set_gnss_antenna_short, 6);
    flag_bit!(power_low, set_power_low, 7);
    flag_bit!(power_cut, set_power_cut, 8);
    flag_bit!(lcd_fault, set_lcd_fault, 9);
    flag_bit!(tts_fault, set_tts_fault, 10);
    flag_bit!(camera_fault, set_camera_fault, 11);
    flag_bit!(obd_fault, set_obd_fault, 12);
    flag_bit!(day_drive_overtime, set_day_drive_overtime, 18);
    flag_bit!(parking_overtime, set_parking_overtime, 19);
    flag_bit!(in_out_area, set_in_out_area, 20);
    flag_bit!(in_out_road, set_in_out_road, 21);
    flag_bit!(road_drive_time, set_road_drive_time, 22);
    flag_bit!(road_deviate, set_road_deviate, 23);
    flag_bit!(vss_fault, set_vss_fault, 24);
    flag_bit!(oil_fault, set_oil_fault, 25);
    flag_bit!(anti_theft, set_anti_theft, 26);
    flag_bit!(illegal_ignition, set_illegal_ignition, 27);
    flag_bit!(illegal_displacement, set_illegal_displacement, 28);
    flag_bit!(collision, set_collision, 29);
}

// --- Status word ---

/// Location report status word (32 bits).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusFlags(pub u32);

impl StatusFlags {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    flag_bit!(acc, set_acc, 0);
    flag_bit!(positioning, set_positioning, 1);
    flag_bit!(south_latitude, set_south_latitude, 2);
    flag_bit!(west_longitude, set_west_longitude, 3);
    flag_bit!(out_of_service, set_out_of_service, 4);
    flag_bit!(gps_encrypted, set_gps_encrypted, 5);
    flag_bit!(oil_cut, set_oil_cut, 10);
    flag_bit!(circuit_cut, set_circuit_cut, 11);
    flag_bit!(door_locked, set_door_locked, 12);
    flag_bit!(door1_open, set_door1_open, 13);
    flag_bit!(door2_open, set_door2_open, 14);
    flag_bit!(door3_open, set_door3_open, 15);
    flag_bit!(door4_open, set_door4_open, 16);
    flag_bit!(door5_open, set_door5_open, 17);
    flag_bit!(gps_enabled, set_gps_enabled, 18);
    flag_bit!(beidou_enabled, set_beidou_enabled, 19);
    flag_bit!(glonass_enabled, set_glonass_enabled, 20);
    flag_bit!(galileo_enabled, set_galileo_enabled, 21);

    /// Trip status, bits 8-9: 00 empty, 01 half load, 10 reserved, 11 full.
    pub fn trip_status(self) -> u8 {
        ((self.0 >> 8) & 0x03) as u8
    }

    pub fn set_trip_status(&mut self, status: u8) {
        self.0 = (self.0 & !(0x03 << 8)) | (((status as u32) & 0x03) << 8);
    }
}

// --- Geofence area attribute word ---

/// Polygon area attribute word (16 bits).
///
/// Bit 0 enables the time window fields, bit 1 the speed limit fields;
/// the remaining bits pass through untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AreaAttribute(pub u16);

impl AreaAttribute {
    pub fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u16 {
        self.0
    }

    pub fn by_time(self) -> bool {
        self.0 & 0x0001 != 0
    }

    pub fn set_by_time(&mut self, on: bool) {
        if on {
            self.0 |= 0x0001;
        } else {
            self.0 &= !0x0001;
        }
    }

    pub fn speed_limit(self) -> bool {
        self.0 & 0x0002 != 0
    }

    pub fn set_speed_limit(&mut self, on: bool) {
        if on {
            self.0 |= 0x0002;
        } else {
            self.0 &= !0x0002;
        }
    }

    pub fn alarm_to_driver(self) -> bool {
        self.0 & 0x0004 != 0
    }

    pub fn alarm_to_platform(self) -> bool {
        self.0 & 0x0008 != 0
    }
}

// --- Well-known terminal parameter IDs ---

/// NTRIP/CORS differential-correction parameters from the vendor range.
pub mod parameter_ids {
    /// CORS server IP (string).
    pub const NTRIP_CORS_IP: u32 = 0xF020;
    /// CORS server port (u16).
    pub const NTRIP_CORS_PORT: u32 = 0xF021;
    /// CORS user name (string).
    pub const NTRIP_CORS_USER: u32 = 0xF022;
    /// CORS password (string).
    pub const NTRIP_CORS_PASSWD: u32 = 0xF023;
    /// CORS mount point (string).
    pub const NTRIP_CORS_MOUNT_POINT: u32 = 0xF024;
    /// GGA report interval in seconds (u8).
    pub const NTRIP_CORS_GGA_INTERVAL: u32 = 0xF025;
    /// Start correction stream on boot (u8, 0/1).
    pub const NTRIP_CORS_STARTUP: u32 = 0xF026;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_id_round_trip() {
        for raw in [0x0001u16, 0x0200, 0x8108, 0x8800] {
            let id = MessageId::from(raw);
            assert_ne!(id, MessageId::Unknown);
            assert_eq!(u16::from(id), raw);
        }
        assert_eq!(MessageId::from(0x7777), MessageId::Unknown);
        assert!(MessageId::SetPolygonArea.is_platform_sourced());
        assert!(!MessageId::LocationReport.is_platform_sourced());
    }

    #[test]
    fn phone_validation_and_bcd() {
        let phone = Phone::new("13523339527").unwrap();
        assert_eq!(
            phone.to_bcd().unwrap(),
            [0x01, 0x35, 0x23, 0x33, 0x95, 0x27]
        );
        assert_eq!(Phone::from_bcd(&phone.to_bcd().unwrap()).unwrap(), phone);

        assert!(Phone::new("1234567890123").is_err());
        assert!(Phone::new("12345abc").is_err());
    }

    #[test]
    fn alarm_and_status_bits() {
        let mut alarm = AlarmFlags::default();
        alarm.set_overspeed(true);
        assert_eq!(alarm.raw(), 0x0000_0002);
        alarm.set_collision(true);
        assert!(alarm.overspeed() && alarm.collision());
        alarm.set_overspeed(false);
        assert_eq!(alarm.raw(), 1 << 29);

        let mut status = StatusFlags::new(0x0000_0003);
        assert!(status.acc() && status.positioning());
        status.set_trip_status(0b11);
        assert_eq!(status.trip_status(), 0b11);
        assert_eq!(status.raw(), 0x0000_0303);
    }

    #[test]
    fn area_attribute_bits() {
        let mut attr = AreaAttribute::new(0x0000);
        attr.set_by_time(true);
        attr.set_speed_limit(true);
        assert!(attr.by_time() && attr.speed_limit());
        attr.set_by_time(false);
        assert_eq!(attr.raw(), 0x0002);
    }
}
