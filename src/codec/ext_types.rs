use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// Location report extension item IDs.
///
/// Each item travels as `id:u8 | len:u8 | value` after the 28-byte basic
/// block. IDs outside this catalog are carried verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum ExtensionId {
    /// Mileage in 1/10 km, DWORD.
    Mileage = 0x01,
    /// Oil mass in 1/10 L, WORD.
    OilMass = 0x02,
    /// Speed from the tachograph in 1/10 km/h, WORD.
    TachographSpeed = 0x03,
    /// ID of an alarm event needing manual confirmation, WORD.
    AlarmConfirmationId = 0x04,
    /// Overspeed alarm detail, BYTE or BYTE+DWORD.
    OverspeedAlarm = 0x11,
    /// Area/route entry-exit alarm detail, BYTE+DWORD+BYTE.
    AreaRouteAlarm = 0x12,
    /// Driving time alarm detail, DWORD+WORD+BYTE.
    DrivingTimeAlarm = 0x13,
    /// Extended vehicle signal status, DWORD.
    VehicleSignal = 0x25,
    /// IO status, WORD.
    IoStatus = 0x2A,
    /// Analog quantity, DWORD.
    AnalogQuantity = 0x2B,
    /// Wireless network signal strength, BYTE.
    NetworkSignal = 0x30,
    /// Number of GNSS satellites, BYTE.
    GnssSatellites = 0x31,
    /// Length of trailing custom information, BYTE.
    CustomLength = 0xE0,
    /// Positioning solution status, BYTE.
    PositioningStatus = 0xEE,

    Unknown = 0xFF,
}

impl From<u8> for ExtensionId {
    fn from(val: u8) -> Self {
        match val {
            0x01 => ExtensionId::Mileage,
            0x02 => ExtensionId::OilMass,
            0x03 => ExtensionId::TachographSpeed,
            0x04 => ExtensionId::AlarmConfirmationId,
            0x11 => ExtensionId::OverspeedAlarm,
            0x12 => ExtensionId::AreaRouteAlarm,
            0x13 => ExtensionId::DrivingTimeAlarm,
            0x25 => ExtensionId::VehicleSignal,
            0x2A => ExtensionId::IoStatus,
            0x2B => ExtensionId::AnalogQuantity,
            0x30 => ExtensionId::NetworkSignal,
            0x31 => ExtensionId::GnssSatellites,
            0xE0 => ExtensionId::CustomLength,
            0xEE => ExtensionId::PositioningStatus,
            _ => ExtensionId::Unknown,
        }
    }
}

impl From<ExtensionId> for u8 {
    fn from(val: ExtensionId) -> Self {
        val as u8
    }
}

/// Location type of an overspeed alarm detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum OverspeedLocation {
    /// No specific location; the detail has no area/route ID.
    #[default]
    None = 0x00,
    CircularArea = 0x01,
    RectangleArea = 0x02,
    PolygonArea = 0x03,
    RoadSection = 0x04,
}

impl From<u8> for OverspeedLocation {
    fn from(val: u8) -> Self {
        match val {
            0x01 => OverspeedLocation::CircularArea,
            0x02 => OverspeedLocation::RectangleArea,
            0x03 => OverspeedLocation::PolygonArea,
            0x04 => OverspeedLocation::RoadSection,
            _ => OverspeedLocation::None,
        }
    }
}

/// Location type of an area/route entry-exit alarm detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum AreaRouteLocation {
    #[default]
    CircularArea = 0x00,
    RectangleArea = 0x01,
    PolygonArea = 0x02,
    Route = 0x03,
}

impl From<u8> for AreaRouteLocation {
    fn from(val: u8) -> Self {
        match val {
            0x01 => AreaRouteLocation::RectangleArea,
            0x02 => AreaRouteLocation::PolygonArea,
            0x03 => AreaRouteLocation::Route,
            _ => AreaRouteLocation::CircularArea,
        }
    }
}

/// Direction of an area/route entry-exit alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum AreaRouteDirection {
    #[default]
    Entering = 0x00,
    Leaving = 0x01,
}

impl From<u8> for AreaRouteDirection {
    fn from(val: u8) -> Self {
        if val == 0x01 {
            AreaRouteDirection::Leaving
        } else {
            AreaRouteDirection::Entering
        }
    }
}

/// Extended vehicle signal status word (32 bits).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleSignalFlags(pub u32);

macro_rules! signal_bit {
    ($get:ident, $bit:expr) => {
        pub fn $get(self) -> bool {
            self.0 & (1 << $bit) != 0
        }
    };
}

impl VehicleSignalFlags {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    signal_bit!(low_beam, 0);
    signal_bit!(high_beam, 1);
    signal_bit!(right_turn, 2);
    signal_bit!(left_turn, 3);
    signal_bit!(braking, 4);
    signal_bit!(reversing, 5);
    signal_bit!(fog_lamp, 6);
    signal_bit!(outline_lamp, 7);
    signal_bit!(horn, 8);
    signal_bit!(air_conditioner, 9);
    signal_bit!(neutral, 10);
    signal_bit!(retarder, 11);
    signal_bit!(abs_active, 12);
    signal_bit!(heater, 13);
    signal_bit!(clutch, 14);
}

/// IO status word (16 bits).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IoStatusFlags(pub u16);

impl IoStatusFlags {
    pub fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u16 {
        self.0
    }

    pub fn deep_dormancy(self) -> bool {
        self.0 & 0x0001 != 0
    }

    pub fn dormancy(self) -> bool {
        self.0 & 0x0002 != 0
    }
}

/// A decoded location extension value.
///
/// Unknown IDs keep their raw bytes so a report can be re-encoded without
/// losing vendor items.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtensionValue {
    /// Mileage in 1/10 km.
    Mileage(u32),
    /// Oil mass in 1/10 L.
    OilMass(u16),
    /// Tachograph speed in 1/10 km/h.
    TachographSpeed(u16),
    AlarmConfirmationId(u16),
    Overspeed {
        location_type: OverspeedLocation,
        /// Present unless `location_type` is `None`.
        area_route_id: Option<u32>,
    },
    AreaRoute {
        location_type: AreaRouteLocation,
        area_route_id: u32,
        direction: AreaRouteDirection,
    },
    DrivingTime {
        road_section_id: u32,
        /// Driving time on the section, seconds.
        drive_seconds: u16,
        /// 0 insufficient, 1 excessive.
        result: u8,
    },
    VehicleSignal(VehicleSignalFlags),
    IoStatus(IoStatusFlags),
    AnalogQuantity(u32),
    /// Signal strength, vendor-scaled.
    NetworkSignal(u8),
    GnssSatellites(u8),
    /// Anything this catalog does not know, kept verbatim.
    Raw(Bytes),
}
