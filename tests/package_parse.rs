mod common;

use common::{
    init_tracing, sample_extensions, sample_location, sample_parameters, sample_register_info,
    test_phone,
};
use bytes::Bytes;
use jt808_codec::protocol::frame::body::{
    AreaSpeedLimit, AreaTimeWindow, FillPacket, LocationPoint, MultimediaUpload,
    MultimediaUploadResponse, PolygonArea, TrackingControl,
};
use jt808_codec::protocol::frame::builder::build_platform_general_response;
use jt808_codec::protocol::frame::defs::MessageId;
use jt808_codec::types::{GeneralResponseResult, RegisterResult, UpgradeResult, UpgradeType};
use jt808_codec::{Jt808Packager, Jt808Parser, ProtocolParameter, ProtocolError};

fn fresh_para(msg_id: MessageId) -> ProtocolParameter {
    let mut para = ProtocolParameter::new();
    para.send.header.msg_id = msg_id.into();
    para.send.header.phone = test_phone();
    para.send.header.flow_num = 1;
    para
}

fn round_trip(para: &ProtocolParameter) -> ProtocolParameter {
    let packager = Jt808Packager::new();
    let parser = Jt808Parser::new();
    let frame = packager.package(para).unwrap();
    let mut received = ProtocolParameter::new();
    let msg_id = parser.parse(&frame, &mut received).unwrap();
    assert_eq!(msg_id, para.send.header.msg_id);

    // Re-packaging the parse view must reproduce the frame byte for byte.
    let mut echo = ProtocolParameter::new();
    echo.send = received.parse.clone();
    assert_eq!(packager.package(&echo).unwrap(), frame);
    received
}

#[test]
fn heartbeat_literal_frame() {
    init_tracing();
    let packager = Jt808Packager::new();
    let para = fresh_para(MessageId::TerminalHeartbeat);
    let frame = packager.package(&para).unwrap();
    assert_eq!(
        frame,
        hex::decode("7e000200000135233395270001957e").unwrap()
    );

    let parser = Jt808Parser::new();
    let mut received = ProtocolParameter::new();
    parser.parse(&frame, &mut received).unwrap();
    let header = &received.parse.header;
    assert_eq!(header.msg_id, 0x0002);
    assert_eq!(header.attr.body_len(), 0);
    assert_eq!(header.phone.as_str(), "13523339527");
    assert_eq!(header.flow_num, 1);
}

#[test]
fn platform_general_response_fixture() {
    init_tracing();
    let packager = Jt808Packager::new();
    let para = build_platform_general_response(
        test_phone(),
        42,
        7,
        MessageId::TerminalHeartbeat.into(),
        GeneralResponseResult::Success.into(),
    );
    let frame = packager.package(&para).unwrap();
    // Header: id 8001, attr 0005, phone BCD, flow 002A; body 00 07 00 02 00.
    assert_eq!(
        &frame[1..18],
        hex::decode("80010005013523339527002a0007000200").unwrap()
    );

    let received = round_trip(&para);
    assert_eq!(received.parse.response_flow_num, 7);
    assert_eq!(received.parse.response_msg_id, 0x0002);
    assert_eq!(
        GeneralResponseResult::from(received.parse.response_result),
        GeneralResponseResult::Success
    );
}

#[test]
fn terminal_general_response_round_trip() {
    let mut para = fresh_para(MessageId::TerminalGeneralResponse);
    para.send.response_flow_num = 99;
    para.send.response_msg_id = 0x8103;
    para.send.response_result = GeneralResponseResult::NotSupport.into();
    let received = round_trip(&para);
    assert_eq!(received.parse.response_flow_num, 99);
    assert_eq!(received.parse.response_msg_id, 0x8103);
}

#[test]
fn empty_bodied_messages_round_trip() {
    for msg_id in [
        MessageId::TerminalHeartbeat,
        MessageId::TerminalLogout,
        MessageId::QueryTerminalParameters,
        MessageId::LocationQuery,
    ] {
        let para = fresh_para(msg_id);
        let received = round_trip(&para);
        assert_eq!(received.parse.header.attr.body_len(), 0);
    }
}

#[test]
fn register_round_trip() {
    let mut para = fresh_para(MessageId::TerminalRegister);
    para.send.register_info = sample_register_info();
    let received = round_trip(&para);
    assert_eq!(received.parse.register_info, sample_register_info());
}

#[test]
fn register_response_carries_auth_code_only_on_success() {
    let mut para = fresh_para(MessageId::RegisterResponse);
    para.send.response_flow_num = 11;
    para.send.response_result = RegisterResult::Success.into();
    para.send.authentication_code = b"auth-code-123".to_vec();
    let received = round_trip(&para);
    assert_eq!(received.parse.authentication_code, b"auth-code-123");

    para.send.response_result = RegisterResult::NoSuchTerminal.into();
    let received = round_trip(&para);
    assert!(received.parse.authentication_code.is_empty());
}

#[test]
fn authentication_body_is_escaped_on_the_wire() {
    init_tracing();
    let mut para = fresh_para(MessageId::TerminalAuthentication);
    // Code deliberately contains both sentinel bytes.
    para.send.authentication_code = vec![0x7E, 0x01, 0x7D, 0x7F];
    let packager = Jt808Packager::new();
    let frame = packager.package(&para).unwrap();

    let interior = &frame[1..frame.len() - 1];
    assert!(!interior.contains(&0x7E));
    assert!(interior.windows(2).any(|w| w == [0x7D, 0x02]));
    assert!(interior.windows(2).any(|w| w == [0x7D, 0x01]));

    let received = round_trip(&para);
    assert_eq!(received.parse.authentication_code, vec![0x7E, 0x01, 0x7D, 0x7F]);
}

#[test]
fn set_terminal_parameters_fixture() {
    let mut para = fresh_para(MessageId::SetTerminalParameters);
    para.send.terminal_parameters = sample_parameters();
    let packager = Jt808Packager::new();
    let frame = packager.package(&para).unwrap();
    // count 01 | id 0000F020 | len 0D | "192.168.3.111"
    let body = hex::decode("010000f0200d3139322e3136382e332e313131").unwrap();
    assert_eq!(&frame[13..13 + 19], &body[..]);

    let received = round_trip(&para);
    assert_eq!(
        received.parse.terminal_parameters.get(&0xF020).unwrap(),
        b"192.168.3.111"
    );
}

#[test]
fn parameter_query_response_round_trip() {
    let mut para = fresh_para(MessageId::QueryParametersResponse);
    para.send.response_flow_num = 5;
    para.send.terminal_parameters = sample_parameters();
    let received = round_trip(&para);
    assert_eq!(received.parse.response_flow_num, 5);
    assert_eq!(received.parse.terminal_parameters, sample_parameters());
}

#[test]
fn specific_parameter_query_round_trip() {
    let mut para = fresh_para(MessageId::QuerySpecificParameters);
    para.send.terminal_parameter_ids = vec![0x0001, 0xF020, 0xF026];
    let received = round_trip(&para);
    assert_eq!(
        received.parse.terminal_parameter_ids,
        vec![0x0001, 0xF020, 0xF026]
    );
}

#[test]
fn location_report_fixture() {
    init_tracing();
    let mut para = fresh_para(MessageId::LocationReport);
    para.send.location_basic = sample_location();
    let packager = Jt808Packager::new();
    let frame = packager.package(&para).unwrap();

    let parser = Jt808Parser::new();
    let mut received = ProtocolParameter::new();
    parser.parse(&frame, &mut received).unwrap();
    assert_eq!(received.parse.header.attr.body_len(), 28);

    let basic = &received.parse.location_basic;
    assert!(basic.alarm.overspeed());
    assert!(basic.status.acc() && basic.status.positioning());
    assert_eq!(basic.latitude, 31_824_845);
    assert_eq!(basic.longitude, 117_246_002);
    assert_eq!(basic.altitude, 50);
    assert_eq!(basic.speed, 600);
    assert_eq!(basic.bearing, 90);
    assert_eq!(basic.time, "200718120000");
}

#[test]
fn location_report_with_extensions_round_trip() {
    let mut para = fresh_para(MessageId::LocationReport);
    para.send.location_basic = sample_location();
    para.send.location_extensions = sample_extensions();
    let received = round_trip(&para);
    assert_eq!(received.parse.location_extensions, sample_extensions());
}

#[test]
fn location_query_response_flow_number_regression() {
    // Flow number must come from both bytes, not one byte read twice.
    let mut para = fresh_para(MessageId::LocationQueryResponse);
    para.send.response_flow_num = 0x0102;
    para.send.location_basic = sample_location();
    let received = round_trip(&para);
    assert_eq!(received.parse.response_flow_num, 0x0102);
    assert_eq!(received.parse.location_basic, sample_location());
}

#[test]
fn fill_packet_request_ids_are_big_endian() {
    let mut para = fresh_para(MessageId::FillPacketRequest);
    para.send.fill_packet = FillPacket {
        first_packet_flow_num: 0x0010,
        packet_ids: vec![0x0102, 0x0304],
    };
    let received = round_trip(&para);
    // The byte-addition decoding of the original would yield 3 and 7 here.
    assert_eq!(received.parse.fill_packet.packet_ids, vec![0x0102, 0x0304]);
    assert_eq!(received.parse.fill_packet.first_packet_flow_num, 0x0010);
}

#[test]
fn tracking_control_round_trip() {
    let mut para = fresh_para(MessageId::TrackingControl);
    para.send.tracking_control = TrackingControl {
        interval: 30,
        valid_seconds: 3600,
    };
    let received = round_trip(&para);
    assert_eq!(received.parse.tracking_control.interval, 30);
    assert_eq!(received.parse.tracking_control.valid_seconds, 3600);
}

#[test]
fn polygon_area_round_trip() {
    let mut para = fresh_para(MessageId::SetPolygonArea);
    para.send.polygon_area = PolygonArea {
        area_id: 12,
        time_window: Some(AreaTimeWindow {
            start_time: "200101080000".to_string(),
            stop_time: "201231200000".to_string(),
        }),
        speed_limit: Some(AreaSpeedLimit {
            max_speed: 60,
            overspeed_seconds: 5,
        }),
        vertices: vec![
            LocationPoint {
                latitude: 31.824845,
                longitude: 117.246002,
            },
            LocationPoint {
                latitude: 31.9,
                longitude: 117.3,
            },
            LocationPoint {
                latitude: 31.85,
                longitude: 117.1,
            },
        ],
        ..PolygonArea::default()
    };
    let received = round_trip(&para);
    let area = &received.parse.polygon_area;
    assert_eq!(area.area_id, 12);
    assert_eq!(area.time_window, para.send.polygon_area.time_window);
    assert_eq!(area.speed_limit, para.send.polygon_area.speed_limit);
    assert_eq!(area.vertices.len(), 3);
}

#[test]
fn delete_polygon_area_round_trip() {
    let mut para = fresh_para(MessageId::DeletePolygonArea);
    para.send.polygon_area_ids = vec![1, 2, 0xFFFF_FFFF];
    let received = round_trip(&para);
    assert_eq!(received.parse.polygon_area_ids, vec![1, 2, 0xFFFF_FFFF]);
}

#[test]
fn upgrade_result_report_round_trip() {
    let mut para = fresh_para(MessageId::UpgradeResultReport);
    para.send.upgrade_info.upgrade_type = UpgradeType::Gnss;
    para.send.upgrade_info.upgrade_result = UpgradeResult::Failed;
    let received = round_trip(&para);
    assert_eq!(received.parse.upgrade_info.upgrade_type, UpgradeType::Gnss);
    assert_eq!(
        received.parse.upgrade_info.upgrade_result,
        UpgradeResult::Failed
    );
}

#[test]
fn multimedia_upload_round_trip() {
    let mut location_body = Vec::new();
    {
        use jt808_codec::protocol::wire::WireEncode;
        sample_location().encode_to(&mut location_body, &()).unwrap();
    }
    let mut para = fresh_para(MessageId::MultimediaUpload);
    para.send.multimedia_upload = MultimediaUpload {
        media_id: 7,
        media_type: 0,
        media_format: 0,
        media_event: 2,
        channel_id: 1,
        location_body: Bytes::from(location_body),
        media_data: Bytes::from_static(&[0xFF, 0xD8, 0xFF, 0xE0]),
    };
    let received = round_trip(&para);
    assert_eq!(received.parse.multimedia_upload, para.send.multimedia_upload);
}

#[test]
fn multimedia_upload_response_round_trip() {
    let mut para = fresh_para(MessageId::MultimediaUploadResponse);
    para.send.multimedia_response = MultimediaUploadResponse {
        media_id: 7,
        reload_packet_ids: Vec::new(),
    };
    let received = round_trip(&para);
    assert!(received.parse.multimedia_response.is_accepted());

    para.send.multimedia_response.reload_packet_ids = vec![2, 3];
    let received = round_trip(&para);
    assert_eq!(
        received.parse.multimedia_response.reload_packet_ids,
        vec![2, 3]
    );
}

#[test]
fn corrupted_frame_reports_checksum_error_code() {
    let packager = Jt808Packager::new();
    let parser = Jt808Parser::new();
    let para = fresh_para(MessageId::TerminalHeartbeat);
    let mut frame = packager.package(&para).unwrap();
    frame[2] ^= 0x10; // attribute byte, cannot create a flag or escape byte

    let mut received = ProtocolParameter::new();
    let err = parser.parse(&frame, &mut received).unwrap_err();
    assert!(matches!(err, ProtocolError::ChecksumMismatch { .. }));
    assert_eq!(err.code(), -4);
}
