use crate::protocol::error::ProtocolError;
use crate::protocol::frame::body::{encode_extension_items, encode_parameter_items};
use crate::protocol::frame::defs::MessageId;
use crate::protocol::frame::{assemble_frame, defs::MAX_BODY_LEN};
use crate::protocol::parameter::{MessageView, ProtocolParameter};
use crate::protocol::wire::WireEncode;
use bytes::{BufMut, BytesMut};
use std::collections::HashMap;

/// Message body encoder: renders the body bytes for one message ID from the
/// send view. Framing (header, checksum, escape, flags) is the packager's
/// job.
pub type PackageHandler =
    Box<dyn Fn(&MessageView) -> Result<Vec<u8>, ProtocolError> + Send + Sync>;

/// Encoder registry keyed by message ID.
///
/// Built-in handlers for the standard catalog are installed by [`new`];
/// vendor-specific IDs are added with [`append`] or replaced with
/// [`overwrite`]. The registry is an owned value with no interior locking:
/// populate it at startup and share it read-only afterwards.
///
/// [`new`]: Jt808Packager::new
/// [`append`]: Jt808Packager::append
/// [`overwrite`]: Jt808Packager::overwrite
pub struct Jt808Packager {
    handlers: HashMap<u16, PackageHandler>,
}

impl Default for Jt808Packager {
    fn default() -> Self {
        Self::new()
    }
}

impl Jt808Packager {
    /// Registry with the standard catalog installed.
    pub fn new() -> Self {
        let mut packager = Self::empty();
        packager.install_defaults();
        packager
    }

    /// Registry with no handlers at all.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for a new message ID.
    pub fn append(&mut self, msg_id: u16, handler: PackageHandler) -> Result<(), ProtocolError> {
        if self.handlers.contains_key(&msg_id) {
            return Err(ProtocolError::DuplicateHandler(msg_id));
        }
        self.handlers.insert(msg_id, handler);
        Ok(())
    }

    /// Replace the handler for a message ID, inserting if absent.
    pub fn overwrite(&mut self, msg_id: u16, handler: PackageHandler) {
        self.handlers.insert(msg_id, handler);
    }

    pub fn contains(&self, msg_id: u16) -> bool {
        self.handlers.contains_key(&msg_id)
    }

    /// Render the body for `send.header.msg_id` without framing it.
    pub fn encode_body(&self, view: &MessageView) -> Result<Vec<u8>, ProtocolError> {
        let msg_id = view.header.msg_id;
        let handler = self
            .handlers
            .get(&msg_id)
            .ok_or(ProtocolError::UnregisteredMessage(msg_id))?;
        handler(view)
    }

    /// Package the send view into a complete wire frame.
    pub fn package(&self, para: &ProtocolParameter) -> Result<Vec<u8>, ProtocolError> {
        let view = &para.send;
        let msg_id = view.header.msg_id;
        let body = self.encode_body(view)?;
        if body.len() > MAX_BODY_LEN {
            return Err(ProtocolError::BodyEncode {
                msg_id,
                reason: format!(
                    "body is {} bytes, maximum {MAX_BODY_LEN}; segment the payload",
                    body.len()
                ),
            });
        }
        let frame = assemble_frame(&view.header, &body)?;
        tracing::trace!(
            msg_id = format_args!("{msg_id:#06X}"),
            body_len = body.len(),
            frame = %hex::encode(&frame),
            "packaged frame"
        );
        Ok(frame)
    }

    fn install_defaults(&mut self) {
        // 0x0001 / 0x8001, terminal and platform general response.
        // Body: response flow number, response message ID, result.
        let general_response: fn(&MessageView) -> Result<Vec<u8>, ProtocolError> = |view| {
            let mut buf = BytesMut::with_capacity(5);
            buf.put_u16(view.response_flow_num);
            buf.put_u16(view.response_msg_id);
            buf.put_u8(view.response_result);
            Ok(buf.to_vec())
        };
        self.overwrite(
            MessageId::TerminalGeneralResponse.into(),
            Box::new(general_response),
        );
        self.overwrite(
            MessageId::PlatformGeneralResponse.into(),
            Box::new(general_response),
        );

        // 0x0002 heartbeat, 0x0003 logout, 0x8104 query-all, 0x8201
        // location query: empty bodies.
        let empty_body: fn(&MessageView) -> Result<Vec<u8>, ProtocolError> = |_| Ok(Vec::new());
        self.overwrite(MessageId::TerminalHeartbeat.into(), Box::new(empty_body));
        self.overwrite(MessageId::TerminalLogout.into(), Box::new(empty_body));
        self.overwrite(
            MessageId::QueryTerminalParameters.into(),
            Box::new(empty_body),
        );
        self.overwrite(MessageId::LocationQuery.into(), Box::new(empty_body));

        // 0x8003, fill packet request.
        self.overwrite(
            MessageId::FillPacketRequest.into(),
            Box::new(|view| view.fill_packet.encode_to_vec(&())),
        );

        // 0x0100, terminal register.
        self.overwrite(
            MessageId::TerminalRegister.into(),
            Box::new(|view| view.register_info.encode_to_vec(&())),
        );

        // 0x8100, register response. The authentication code trails only on
        // success.
        self.overwrite(
            MessageId::RegisterResponse.into(),
            Box::new(|view| {
                let mut buf = BytesMut::with_capacity(3 + view.authentication_code.len());
                buf.put_u16(view.response_flow_num);
                buf.put_u8(view.response_result);
                if view.response_result == 0 {
                    buf.put_slice(&view.authentication_code);
                }
                Ok(buf.to_vec())
            }),
        );

        // 0x0102, terminal authentication: the code is the whole body.
        self.overwrite(
            MessageId::TerminalAuthentication.into(),
            Box::new(|view| Ok(view.authentication_code.clone())),
        );

        // 0x8103, set terminal parameters.
        self.overwrite(
            MessageId::SetTerminalParameters.into(),
            Box::new(|view| {
                let mut buf = BytesMut::new();
                encode_parameter_items(&view.terminal_parameters, &mut buf)?;
                Ok(buf.to_vec())
            }),
        );

        // 0x0104, parameter query response: response flow number, then the
        // same item list as 0x8103.
        self.overwrite(
            MessageId::QueryParametersResponse.into(),
            Box::new(|view| {
                let mut buf = BytesMut::new();
                buf.put_u16(view.response_flow_num);
                encode_parameter_items(&view.terminal_parameters, &mut buf)?;
                Ok(buf.to_vec())
            }),
        );

        // 0x8106, query specific parameters.
        self.overwrite(
            MessageId::QuerySpecificParameters.into(),
            Box::new(|view| {
                if view.terminal_parameter_ids.len() > u8::MAX as usize {
                    return Err(ProtocolError::Semantic(format!(
                        "too many parameter ids: {}",
                        view.terminal_parameter_ids.len()
                    )));
                }
                let mut buf =
                    BytesMut::with_capacity(1 + view.terminal_parameter_ids.len() * 4);
                buf.put_u8(view.terminal_parameter_ids.len() as u8);
                for id in &view.terminal_parameter_ids {
                    buf.put_u32(*id);
                }
                Ok(buf.to_vec())
            }),
        );

        // 0x8108, terminal upgrade. Oversized chunks are the builder's
        // segmentation job; a single frame past the ceiling fails in
        // `package`.
        self.overwrite(
            MessageId::TerminalUpgrade.into(),
            Box::new(|view| view.upgrade_info.encode_to_vec(&())),
        );

        // 0x0108, upgrade result report.
        self.overwrite(
            MessageId::UpgradeResultReport.into(),
            Box::new(|view| {
                Ok(vec![
                    view.upgrade_info.upgrade_type.into(),
                    view.upgrade_info.upgrade_result.into(),
                ])
            }),
        );

        // 0x0200 location report: 28-byte basic block plus TLV extensions.
        self.overwrite(
            MessageId::LocationReport.into(),
            Box::new(|view| {
                let mut buf = BytesMut::with_capacity(view.location_basic.encoded_len(&()));
                view.location_basic.encode_to(&mut buf, &())?;
                encode_extension_items(&view.location_extensions, &mut buf)?;
                Ok(buf.to_vec())
            }),
        );

        // 0x0201 location query response: response flow number first.
        self.overwrite(
            MessageId::LocationQueryResponse.into(),
            Box::new(|view| {
                let mut buf =
                    BytesMut::with_capacity(2 + view.location_basic.encoded_len(&()));
                buf.put_u16(view.response_flow_num);
                view.location_basic.encode_to(&mut buf, &())?;
                encode_extension_items(&view.location_extensions, &mut buf)?;
                Ok(buf.to_vec())
            }),
        );

        // 0x8202, temporary location tracking control.
        self.overwrite(
            MessageId::TrackingControl.into(),
            Box::new(|view| {
                let mut buf = BytesMut::with_capacity(6);
                buf.put_u16(view.tracking_control.interval);
                buf.put_u32(view.tracking_control.valid_seconds);
                Ok(buf.to_vec())
            }),
        );

        // 0x8604, set polygon area.
        self.overwrite(
            MessageId::SetPolygonArea.into(),
            Box::new(|view| view.polygon_area.encode_to_vec(&())),
        );

        // 0x8605, delete polygon areas.
        self.overwrite(
            MessageId::DeletePolygonArea.into(),
            Box::new(|view| {
                if view.polygon_area_ids.len() > u8::MAX as usize {
                    return Err(ProtocolError::Semantic(format!(
                        "too many area ids: {}",
                        view.polygon_area_ids.len()
                    )));
                }
                let mut buf = BytesMut::with_capacity(1 + view.polygon_area_ids.len() * 4);
                buf.put_u8(view.polygon_area_ids.len() as u8);
                for id in &view.polygon_area_ids {
                    buf.put_u32(*id);
                }
                Ok(buf.to_vec())
            }),
        );

        // 0x0801, multimedia data upload.
        self.overwrite(
            MessageId::MultimediaUpload.into(),
            Box::new(|view| view.multimedia_upload.encode_to_vec(&())),
        );

        // 0x8800, multimedia upload response.
        self.overwrite(
            MessageId::MultimediaUploadResponse.into(),
            Box::new(|view| view.multimedia_response.encode_to_vec(&())),
        );
    }
}
