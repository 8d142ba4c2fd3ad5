use super::ext_types::{
    AreaRouteDirection, AreaRouteLocation, ExtensionId, ExtensionValue, IoStatusFlags,
    OverspeedLocation, VehicleSignalFlags,
};
use crate::protocol::error::ProtocolError;
use crate::protocol::frame::body::LocationExtensions;
use bytes::{BufMut, Bytes, BytesMut};

fn expect_len(id: ExtensionId, data: &[u8], want: usize) -> Result<(), ProtocolError> {
    if data.len() != want {
        return Err(ProtocolError::Semantic(format!(
            "extension {:#04X} value must be {want} bytes, got {}",
            u8::from(id),
            data.len()
        )));
    }
    Ok(())
}

fn be16(data: &[u8]) -> u16 {
    u16::from_be_bytes([data[0], data[1]])
}

fn be32(data: &[u8]) -> u32 {
    u32::from_be_bytes([data[0], data[1], data[2], data[3]])
}

/// Decode one extension item value by its ID.
///
/// Known IDs get their sub-schema applied; unknown IDs come back as
/// [`ExtensionValue::Raw`] so nothing is lost.
pub fn parse_extension(id: u8, data: &[u8]) -> Result<ExtensionValue, ProtocolError> {
    let ext_id = ExtensionId::from(id);
    let value = match ext_id {
        ExtensionId::Mileage => {
            expect_len(ext_id, data, 4)?;
            ExtensionValue::Mileage(be32(data))
        }
        ExtensionId::OilMass => {
            expect_len(ext_id, data, 2)?;
            ExtensionValue::OilMass(be16(data))
        }
        ExtensionId::TachographSpeed => {
            expect_len(ext_id, data, 2)?;
            ExtensionValue::TachographSpeed(be16(data))
        }
        ExtensionId::AlarmConfirmationId => {
            expect_len(ext_id, data, 2)?;
            ExtensionValue::AlarmConfirmationId(be16(data))
        }
        ExtensionId::OverspeedAlarm => {
            // BYTE, plus DWORD area/route ID when a location is named.
            if data.is_empty() {
                return Err(ProtocolError::Semantic(
                    "overspeed alarm value missing location type".into(),
                ));
            }
            let location_type = OverspeedLocation::from(data[0]);
            let area_route_id = match location_type {
                OverspeedLocation::None => {
                    expect_len(ext_id, data, 1)?;
                    None
                }
                _ => {
                    expect_len(ext_id, data, 5)?;
                    Some(be32(&data[1..]))
                }
            };
            ExtensionValue::Overspeed {
                location_type,
                area_route_id,
            }
        }
        ExtensionId::AreaRouteAlarm => {
            expect_len(ext_id, data, 6)?;
            ExtensionValue::AreaRoute {
                location_type: AreaRouteLocation::from(data[0]),
                area_route_id: be32(&data[1..5]),
                direction: AreaRouteDirection::from(data[5]),
            }
        }
        ExtensionId::DrivingTimeAlarm => {
            expect_len(ext_id, data, 7)?;
            ExtensionValue::DrivingTime {
                road_section_id: be32(&data[0..4]),
                drive_seconds: be16(&data[4..6]),
                result: data[6],
            }
        }
        ExtensionId::VehicleSignal => {
            expect_len(ext_id, data, 4)?;
            ExtensionValue::VehicleSignal(VehicleSignalFlags::new(be32(data)))
        }
        ExtensionId::IoStatus => {
            expect_len(ext_id, data, 2)?;
            ExtensionValue::IoStatus(IoStatusFlags::new(be16(data)))
        }
        ExtensionId::AnalogQuantity => {
            expect_len(ext_id, data, 4)?;
            ExtensionValue::AnalogQuantity(be32(data))
        }
        ExtensionId::NetworkSignal => {
            expect_len(ext_id, data, 1)?;
            ExtensionValue::NetworkSignal(data[0])
        }
        ExtensionId::GnssSatellites => {
            expect_len(ext_id, data, 1)?;
            ExtensionValue::GnssSatellites(data[0])
        }
        ExtensionId::CustomLength
        | ExtensionId::PositioningStatus
        | ExtensionId::Unknown => ExtensionValue::Raw(Bytes::copy_from_slice(data)),
    };
    Ok(value)
}

/// Encode one extension value back to `(id, value bytes)`.
///
/// For [`ExtensionValue::Raw`] the caller supplies the ID; typed values
/// carry their own.
pub fn encode_extension(value: &ExtensionValue, raw_id: u8) -> (u8, Vec<u8>) {
    let mut buf = BytesMut::new();
    let id = match value {
        ExtensionValue::Mileage(v) => {
            buf.put_u32(*v);
            ExtensionId::Mileage.into()
        }
        ExtensionValue::OilMass(v) => {
            buf.put_u16(*v);
            ExtensionId::OilMass.into()
        }
        ExtensionValue::TachographSpeed(v) => {
            buf.put_u16(*v);
            ExtensionId::TachographSpeed.into()
        }
        ExtensionValue::AlarmConfirmationId(v) => {
            buf.put_u16(*v);
            ExtensionId::AlarmConfirmationId.into()
        }
        ExtensionValue::Overspeed {
            location_type,
            area_route_id,
        } => {
            buf.put_u8(*location_type as u8);
            if let Some(id) = area_route_id {
                buf.put_u32(*id);
            }
            ExtensionId::OverspeedAlarm.into()
        }
        ExtensionValue::AreaRoute {
            location_type,
            area_route_id,
            direction,
        } => {
            buf.put_u8(*location_type as u8);
            buf.put_u32(*area_route_id);
            buf.put_u8(*direction as u8);
            ExtensionId::AreaRouteAlarm.into()
        }
        ExtensionValue::DrivingTime {
            road_section_id,
            drive_seconds,
            result,
        } => {
            buf.put_u32(*road_section_id);
            buf.put_u16(*drive_seconds);
            buf.put_u8(*result);
            ExtensionId::DrivingTimeAlarm.into()
        }
        ExtensionValue::VehicleSignal(flags) => {
            buf.put_u32(flags.raw());
            ExtensionId::VehicleSignal.into()
        }
        ExtensionValue::IoStatus(flags) => {
            buf.put_u16(flags.raw());
            ExtensionId::IoStatus.into()
        }
        ExtensionValue::AnalogQuantity(v) => {
            buf.put_u32(*v);
            ExtensionId::AnalogQuantity.into()
        }
        ExtensionValue::NetworkSignal(v) => {
            buf.put_u8(*v);
            ExtensionId::NetworkSignal.into()
        }
        ExtensionValue::GnssSatellites(v) => {
            buf.put_u8(*v);
            ExtensionId::GnssSatellites.into()
        }
        ExtensionValue::Raw(bytes) => {
            buf.put_slice(bytes);
            raw_id
        }
    };
    (id, buf.to_vec())
}

/// Insert a typed value into a location extension map.
pub fn put_extension(extensions: &mut LocationExtensions, value: &ExtensionValue, raw_id: u8) {
    let (id, bytes) = encode_extension(value, raw_id);
    extensions.insert(id, bytes);
}

/// Decode every item of a location extension map.
pub fn parse_extensions(
    extensions: &LocationExtensions,
) -> Result<Vec<(u8, ExtensionValue)>, ProtocolError> {
    extensions
        .iter()
        .map(|(id, data)| Ok((*id, parse_extension(*id, data)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mileage_round_trip() {
        let value = ExtensionValue::Mileage(123_456);
        let (id, bytes) = encode_extension(&value, 0);
        assert_eq!(id, 0x01);
        assert_eq!(bytes, vec![0x00, 0x01, 0xE2, 0x40]);
        assert_eq!(parse_extension(id, &bytes).unwrap(), value);
    }

    #[test]
    fn overspeed_with_and_without_area() {
        let bare = ExtensionValue::Overspeed {
            location_type: OverspeedLocation::None,
            area_route_id: None,
        };
        let (id, bytes) = encode_extension(&bare, 0);
        assert_eq!(bytes.len(), 1);
        assert_eq!(parse_extension(id, &bytes).unwrap(), bare);

        let scoped = ExtensionValue::Overspeed {
            location_type: OverspeedLocation::PolygonArea,
            area_route_id: Some(9),
        };
        let (id, bytes) = encode_extension(&scoped, 0);
        assert_eq!(bytes.len(), 5);
        assert_eq!(parse_extension(id, &bytes).unwrap(), scoped);

        // Location named but ID missing is a hard error.
        assert!(parse_extension(0x11, &[0x03]).is_err());
    }

    #[test]
    fn area_route_alarm_layout() {
        let value = ExtensionValue::AreaRoute {
            location_type: AreaRouteLocation::Route,
            area_route_id: 0x0102_0304,
            direction: AreaRouteDirection::Leaving,
        };
        let (id, bytes) = encode_extension(&value, 0);
        assert_eq!(id, 0x12);
        assert_eq!(bytes, vec![0x03, 0x01, 0x02, 0x03, 0x04, 0x01]);
        assert_eq!(parse_extension(id, &bytes).unwrap(), value);
    }

    #[test]
    fn signal_and_io_bits() {
        let value = ExtensionValue::VehicleSignal(VehicleSignalFlags::new(0b10011));
        let (id, bytes) = encode_extension(&value, 0);
        match parse_extension(id, &bytes).unwrap() {
            ExtensionValue::VehicleSignal(flags) => {
                assert!(flags.low_beam() && flags.high_beam() && flags.braking());
                assert!(!flags.right_turn());
            }
            other => panic!("unexpected {other:?}"),
        }

        let value = ExtensionValue::IoStatus(IoStatusFlags::new(0x0003));
        let (id, bytes) = encode_extension(&value, 0);
        match parse_extension(id, &bytes).unwrap() {
            ExtensionValue::IoStatus(flags) => {
                assert!(flags.deep_dormancy() && flags.dormancy());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_ids_round_trip_raw() {
        let value = parse_extension(0xE1, &[0xAA, 0xBB]).unwrap();
        assert_eq!(value, ExtensionValue::Raw(Bytes::from_static(&[0xAA, 0xBB])));
        let (id, bytes) = encode_extension(&value, 0xE1);
        assert_eq!((id, bytes), (0xE1, vec![0xAA, 0xBB]));
    }

    #[test]
    fn map_level_helpers() {
        let mut extensions = LocationExtensions::new();
        put_extension(&mut extensions, &ExtensionValue::Mileage(100), 0);
        put_extension(&mut extensions, &ExtensionValue::GnssSatellites(12), 0);
        extensions.insert(0xE1, vec![0x01]);

        let decoded = parse_extensions(&extensions).unwrap();
        assert_eq!(decoded.len(), 3);
        assert!(decoded
            .iter()
            .any(|(id, v)| *id == 0x01 && *v == ExtensionValue::Mileage(100)));
        assert!(decoded
            .iter()
            .any(|(id, v)| *id == 0xE1 && matches!(v, ExtensionValue::Raw(_))));
    }

    #[test]
    fn length_mismatch_is_rejected() {
        assert!(parse_extension(0x01, &[0x00, 0x01]).is_err());
        assert!(parse_extension(0x2A, &[0x00]).is_err());
    }
}
