#![allow(dead_code)]

use jt808_codec::protocol::frame::body::{
    LocationBasic, LocationExtensions, RegisterInfo, TerminalParameters,
};
use jt808_codec::protocol::frame::defs::{AlarmFlags, Phone, StatusFlags};
use jt808_codec::types::PlateColor;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize tracing once for the whole test binary; `RUST_LOG` narrows it.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "jt808_codec=trace".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

pub fn test_phone() -> Phone {
    Phone::new("13523339527").unwrap()
}

pub fn sample_location() -> LocationBasic {
    LocationBasic {
        alarm: AlarmFlags::new(0x0000_0002),
        status: StatusFlags::new(0x0000_0003),
        latitude: 31_824_845,
        longitude: 117_246_002,
        altitude: 50,
        speed: 600,
        bearing: 90,
        time: "200718120000".to_string(),
    }
}

pub fn sample_register_info() -> RegisterInfo {
    RegisterInfo {
        province_id: 44,
        city_id: 300,
        manufacturer_id: *b"MFG01",
        terminal_model: b"TRACKER-9".to_vec(),
        terminal_id: b"T000001".to_vec(),
        plate_color: PlateColor::Blue,
        plate_num: "GDB8888".to_string(),
    }
}

pub fn sample_parameters() -> TerminalParameters {
    let mut params = TerminalParameters::new();
    params.insert(0xF020, b"192.168.3.111".to_vec());
    params
}

pub fn sample_extensions() -> LocationExtensions {
    let mut ext = LocationExtensions::new();
    ext.insert(0x01, vec![0x00, 0x01, 0xE2, 0x40]);
    ext.insert(0x30, vec![0x1F]);
    ext
}
