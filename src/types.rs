use serde_repr::{Deserialize_repr, Serialize_repr};
use std::fmt;

/// Vehicle plate color carried in the register body.
///
/// `Vin` (0) means the vehicle is not yet registered; the plate number
/// field is absent in that case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum PlateColor {
    #[default]
    Vin = 0x00,
    Blue = 0x01,
    Yellow = 0x02,
    Black = 0x03,
    White = 0x04,
    Other = 0x05,
}

impl From<u8> for PlateColor {
    fn from(val: u8) -> Self {
        match val {
            0x00 => PlateColor::Vin,
            0x01 => PlateColor::Blue,
            0x02 => PlateColor::Yellow,
            0x03 => PlateColor::Black,
            0x04 => PlateColor::White,
            _ => PlateColor::Other,
        }
    }
}

impl From<PlateColor> for u8 {
    fn from(val: PlateColor) -> Self {
        val as u8
    }
}

/// Result code of the general response messages (0x0001 / 0x8001).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum GeneralResponseResult {
    #[default]
    Success = 0x00,
    Failure = 0x01,
    MessageHasWrong = 0x02,
    NotSupport = 0x03,
    /// Used only by platform responses.
    AlarmHandlingConfirmation = 0x04,
}

impl From<u8> for GeneralResponseResult {
    fn from(val: u8) -> Self {
        match val {
            0x00 => GeneralResponseResult::Success,
            0x01 => GeneralResponseResult::Failure,
            0x02 => GeneralResponseResult::MessageHasWrong,
            0x04 => GeneralResponseResult::AlarmHandlingConfirmation,
            _ => GeneralResponseResult::NotSupport,
        }
    }
}

impl From<GeneralResponseResult> for u8 {
    fn from(val: GeneralResponseResult) -> Self {
        val as u8
    }
}

/// Result code of the register response (0x8100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum RegisterResult {
    #[default]
    Success = 0x00,
    VehicleAlreadyRegistered = 0x01,
    NoSuchVehicle = 0x02,
    TerminalAlreadyRegistered = 0x03,
    NoSuchTerminal = 0x04,
}

impl From<u8> for RegisterResult {
    fn from(val: u8) -> Self {
        match val {
            0x00 => RegisterResult::Success,
            0x01 => RegisterResult::VehicleAlreadyRegistered,
            0x02 => RegisterResult::NoSuchVehicle,
            0x03 => RegisterResult::TerminalAlreadyRegistered,
            _ => RegisterResult::NoSuchTerminal,
        }
    }
}

impl From<RegisterResult> for u8 {
    fn from(val: RegisterResult) -> Self {
        val as u8
    }
}

/// Target of a terminal upgrade (0x8108).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum UpgradeType {
    #[default]
    Terminal = 0x00,
    /// Road transport certificate IC card reader.
    IcCardReader = 0x0C,
    /// Beidou satellite positioning module.
    Gnss = 0x34,
}

impl From<u8> for UpgradeType {
    fn from(val: u8) -> Self {
        match val {
            0x0C => UpgradeType::IcCardReader,
            0x34 => UpgradeType::Gnss,
            _ => UpgradeType::Terminal,
        }
    }
}

impl From<UpgradeType> for u8 {
    fn from(val: UpgradeType) -> Self {
        val as u8
    }
}

/// Outcome reported by the terminal after an upgrade (0x0108).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum UpgradeResult {
    #[default]
    Success = 0x00,
    Failed = 0x01,
    Cancelled = 0x02,
}

impl From<u8> for UpgradeResult {
    fn from(val: u8) -> Self {
        match val {
            0x01 => UpgradeResult::Failed,
            0x02 => UpgradeResult::Cancelled,
            _ => UpgradeResult::Success,
        }
    }
}

impl From<UpgradeResult> for u8 {
    fn from(val: UpgradeResult) -> Self {
        val as u8
    }
}

/// Body encryption mode, bits 10-12 of the attribute word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncryptMode {
    /// Plaintext body.
    Plain,
    /// RSA-encrypted body.
    Rsa,
    /// Reserved bit combinations, preserved verbatim.
    Reserved(u8),
}

impl EncryptMode {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0x00 => EncryptMode::Plain,
            0x01 => EncryptMode::Rsa,
            other => EncryptMode::Reserved(other),
        }
    }

    pub fn to_bits(self) -> u8 {
        match self {
            EncryptMode::Plain => 0x00,
            EncryptMode::Rsa => 0x01,
            EncryptMode::Reserved(bits) => bits & 0x07,
        }
    }
}

impl Default for EncryptMode {
    fn default() -> Self {
        EncryptMode::Plain
    }
}

impl fmt::Display for EncryptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncryptMode::Plain => write!(f, "plain"),
            EncryptMode::Rsa => write!(f, "rsa"),
            EncryptMode::Reserved(bits) => write!(f, "reserved({bits:#05b})"),
        }
    }
}
