use crate::protocol::error::ProtocolError;
use crate::protocol::frame::body::{LocationBasic, LocationExtensions, RegisterInfo, UpgradeInfo};
use crate::protocol::frame::defs::{MessageId, Phone, MAX_BODY_LEN};
use crate::protocol::packager::Jt808Packager;
use crate::protocol::parameter::ProtocolParameter;
use bytes::Bytes;

fn base_parameter(msg_id: MessageId, phone: Phone, flow_num: u16) -> ProtocolParameter {
    let mut para = ProtocolParameter::new();
    para.send.header.msg_id = msg_id.into();
    para.send.header.phone = phone;
    para.send.header.flow_num = flow_num;
    para
}

/// Build a terminal heartbeat (0x0002) parameter set.
pub fn build_heartbeat(phone: Phone, flow_num: u16) -> ProtocolParameter {
    base_parameter(MessageId::TerminalHeartbeat, phone, flow_num)
}

/// Build a terminal register (0x0100) parameter set.
pub fn build_register(phone: Phone, flow_num: u16, info: RegisterInfo) -> ProtocolParameter {
    let mut para = base_parameter(MessageId::TerminalRegister, phone, flow_num);
    para.send.register_info = info;
    para
}

/// Build a terminal authentication (0x0102) parameter set.
pub fn build_authentication(
    phone: Phone,
    flow_num: u16,
    authentication_code: Vec<u8>,
) -> ProtocolParameter {
    let mut para = base_parameter(MessageId::TerminalAuthentication, phone, flow_num);
    para.send.authentication_code = authentication_code;
    para
}

/// Build a location report (0x0200) parameter set.
pub fn build_location_report(
    phone: Phone,
    flow_num: u16,
    basic: LocationBasic,
    extensions: LocationExtensions,
) -> ProtocolParameter {
    let mut para = base_parameter(MessageId::LocationReport, phone, flow_num);
    para.send.location_basic = basic;
    para.send.location_extensions = extensions;
    para
}

/// Build a platform general response (0x8001) to a received message.
pub fn build_platform_general_response(
    phone: Phone,
    flow_num: u16,
    response_flow_num: u16,
    response_msg_id: u16,
    result: u8,
) -> ProtocolParameter {
    let mut para = base_parameter(MessageId::PlatformGeneralResponse, phone, flow_num);
    para.send.response_flow_num = response_flow_num;
    para.send.response_msg_id = response_msg_id;
    para.send.response_result = result;
    para
}

/// Build a terminal upgrade (0x8108) parameter set carrying the whole
/// package payload; feed it to [`package_upgrade_frames`] for the wire form.
pub fn build_upgrade(phone: Phone, flow_num: u16, mut info: UpgradeInfo) -> ProtocolParameter {
    let mut para = base_parameter(MessageId::TerminalUpgrade, phone, flow_num);
    info.total_len = info.chunk.len() as u32;
    para.send.upgrade_info = info;
    para
}

/// Package a terminal upgrade, segmenting the payload when needed.
///
/// A payload that fits one frame yields a single unsegmented frame. Larger
/// payloads are split into N frames that all share the message ID and flow
/// number, carry `packet == 1` with `total == N` and `seq` 1..=N, and are
/// each a complete 0x8108 body (prefix plus a slice of the payload), so
/// concatenating the parsed chunk fields reconstructs the payload.
/// Reassembly and Fill-Packet retransmission stay with the application.
pub fn package_upgrade_frames(
    packager: &Jt808Packager,
    para: &ProtocolParameter,
) -> Result<Vec<Vec<u8>>, ProtocolError> {
    let mut view = para.send.clone();
    view.header.msg_id = MessageId::TerminalUpgrade.into();
    let payload = view.upgrade_info.chunk.clone();
    let capacity = MAX_BODY_LEN - view.upgrade_info.prefix_len();

    if payload.len() <= capacity {
        view.header.attr.set_packet(false);
        view.header.total_packets = 0;
        view.header.packet_seq = 0;
        let body = packager.encode_body(&view)?;
        return Ok(vec![crate::protocol::frame::assemble_frame(
            &view.header,
            &body,
        )?]);
    }

    let total = payload.len().div_ceil(capacity);
    if total > u16::MAX as usize {
        return Err(ProtocolError::BodyEncode {
            msg_id: view.header.msg_id,
            reason: format!("payload needs {total} segments, maximum 65535"),
        });
    }

    let mut frames = Vec::with_capacity(total);
    view.header.attr.set_packet(true);
    view.header.total_packets = total as u16;
    for (index, slice) in payload.chunks(capacity).enumerate() {
        view.header.packet_seq = (index + 1) as u16;
        view.upgrade_info.chunk = Bytes::copy_from_slice(slice);
        let body = packager.encode_body(&view)?;
        frames.push(crate::protocol::frame::assemble_frame(&view.header, &body)?);
    }
    Ok(frames)
}
