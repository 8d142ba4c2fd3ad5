use crate::protocol::error::ProtocolError;
use crate::protocol::frame::body::{
    decode_extension_items, decode_parameter_items, FillPacket, LocationBasic, MultimediaUpload,
    MultimediaUploadResponse, PolygonArea, RegisterInfo, UpgradeInfo,
};
use crate::protocol::frame::defs::MessageId;
use crate::protocol::frame::split_frame;
use crate::protocol::parameter::{MessageView, ProtocolParameter};
use crate::protocol::wire::WireDecode;
use bytes::Bytes;
use std::collections::HashMap;

/// Message body decoder: interprets the body bytes of one message ID into
/// the parse view. The frame envelope is already stripped and verified.
pub type ParseHandler =
    Box<dyn Fn(&[u8], &mut MessageView) -> Result<(), ProtocolError> + Send + Sync>;

/// Decoder registry keyed by message ID, symmetric to [`Jt808Packager`].
///
/// [`parse`] runs the full inbound pipeline: unescape, checksum, header
/// decode, then body dispatch. Handler failures surface as
/// [`ProtocolError::BodyDecode`] with the offending message ID attached.
///
/// [`Jt808Packager`]: crate::protocol::packager::Jt808Packager
/// [`parse`]: Jt808Parser::parse
pub struct Jt808Parser {
    handlers: HashMap<u16, ParseHandler>,
}

impl Default for Jt808Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Jt808Parser {
    /// Registry with the standard catalog installed.
    pub fn new() -> Self {
        let mut parser = Self::empty();
        parser.install_defaults();
        parser
    }

    /// Registry with no handlers at all.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for a new message ID.
    pub fn append(&mut self, msg_id: u16, handler: ParseHandler) -> Result<(), ProtocolError> {
        if self.handlers.contains_key(&msg_id) {
            return Err(ProtocolError::DuplicateHandler(msg_id));
        }
        self.handlers.insert(msg_id, handler);
        Ok(())
    }

    /// Replace the handler for a message ID, inserting if absent.
    pub fn overwrite(&mut self, msg_id: u16, handler: ParseHandler) {
        self.handlers.insert(msg_id, handler);
    }

    pub fn contains(&self, msg_id: u16) -> bool {
        self.handlers.contains_key(&msg_id)
    }

    /// Parse one complete wire frame into the parse view.
    ///
    /// Returns the decoded message ID. On error nothing outside
    /// `para.parse` has been touched; the parse view may hold partial
    /// contents for diagnostics.
    pub fn parse(&self, input: &[u8], para: &mut ProtocolParameter) -> Result<u16, ProtocolError> {
        let (header, body) = split_frame(input)?;
        let msg_id = header.msg_id;
        para.parse.header = header;

        let handler = self
            .handlers
            .get(&msg_id)
            .ok_or(ProtocolError::UnregisteredMessage(msg_id))?;
        handler(&body, &mut para.parse).map_err(|e| match e {
            already @ ProtocolError::BodyDecode { .. } => already,
            other => ProtocolError::BodyDecode {
                msg_id,
                reason: other.to_string(),
            },
        })?;
        tracing::trace!(
            msg_id = format_args!("{msg_id:#06X}"),
            body = %hex::encode(&body),
            "parsed frame"
        );
        Ok(msg_id)
    }

    fn install_defaults(&mut self) {
        // 0x0001 / 0x8001, general responses.
        let general_response: fn(&[u8], &mut MessageView) -> Result<(), ProtocolError> =
            |body, view| {
                if body.len() != 5 {
                    return Err(ProtocolError::Semantic(format!(
                        "general response body must be 5 bytes, got {}",
                        body.len()
                    )));
                }
                view.response_flow_num = u16::from_be_bytes([body[0], body[1]]);
                view.response_msg_id = u16::from_be_bytes([body[2], body[3]]);
                view.response_result = body[4];
                Ok(())
            };
        self.overwrite(
            MessageId::TerminalGeneralResponse.into(),
            Box::new(general_response),
        );
        self.overwrite(
            MessageId::PlatformGeneralResponse.into(),
            Box::new(general_response),
        );

        // Empty bodies: 0x0002, 0x0003, 0x8104, 0x8201.
        let empty_body: fn(&[u8], &mut MessageView) -> Result<(), ProtocolError> = |body, _| {
            if !body.is_empty() {
                return Err(ProtocolError::Semantic(format!(
                    "expected empty body, got {} bytes",
                    body.len()
                )));
            }
            Ok(())
        };
        self.overwrite(MessageId::TerminalHeartbeat.into(), Box::new(empty_body));
        self.overwrite(MessageId::TerminalLogout.into(), Box::new(empty_body));
        self.overwrite(MessageId::LocationQuery.into(), Box::new(empty_body));
        // A query for all parameters additionally clears any stale specific
        // ID list so the two query forms stay distinguishable.
        self.overwrite(
            MessageId::QueryTerminalParameters.into(),
            Box::new(|body, view| {
                if !body.is_empty() {
                    return Err(ProtocolError::Semantic(format!(
                        "expected empty body, got {} bytes",
                        body.len()
                    )));
                }
                view.terminal_parameter_ids.clear();
                Ok(())
            }),
        );

        // 0x8003, fill packet request. IDs decode big-endian.
        self.overwrite(
            MessageId::FillPacketRequest.into(),
            Box::new(|body, view| {
                let (_, fill_packet) = FillPacket::parse(body, &Bytes::new(), &())?;
                view.fill_packet = fill_packet;
                Ok(())
            }),
        );

        // 0x0100, terminal register.
        self.overwrite(
            MessageId::TerminalRegister.into(),
            Box::new(|body, view| {
                let (_, info) = RegisterInfo::parse(body, &Bytes::new(), &())?;
                view.register_info = info;
                Ok(())
            }),
        );

        // 0x8100, register response: auth code trails only on success.
        self.overwrite(
            MessageId::RegisterResponse.into(),
            Box::new(|body, view| {
                if body.len() < 3 {
                    return Err(ProtocolError::Semantic(format!(
                        "register response body must be at least 3 bytes, got {}",
                        body.len()
                    )));
                }
                view.response_flow_num = u16::from_be_bytes([body[0], body[1]]);
                view.response_result = body[2];
                view.authentication_code = if view.response_result == 0 {
                    body[3..].to_vec()
                } else {
                    Vec::new()
                };
                Ok(())
            }),
        );

        // 0x0102, terminal authentication.
        self.overwrite(
            MessageId::TerminalAuthentication.into(),
            Box::new(|body, view| {
                view.authentication_code = body.to_vec();
                Ok(())
            }),
        );

        // 0x8103, set terminal parameters.
        self.overwrite(
            MessageId::SetTerminalParameters.into(),
            Box::new(|body, view| {
                view.terminal_parameters = decode_parameter_items(body)?;
                Ok(())
            }),
        );

        // 0x0104, parameter query response.
        self.overwrite(
            MessageId::QueryParametersResponse.into(),
            Box::new(|body, view| {
                if body.len() < 3 {
                    return Err(ProtocolError::Semantic(format!(
                        "parameter query response must be at least 3 bytes, got {}",
                        body.len()
                    )));
                }
                view.response_flow_num = u16::from_be_bytes([body[0], body[1]]);
                view.terminal_parameters = decode_parameter_items(&body[2..])?;
                Ok(())
            }),
        );

        // 0x8106, query specific parameters.
        self.overwrite(
            MessageId::QuerySpecificParameters.into(),
            Box::new(|body, view| {
                if body.is_empty() {
                    return Err(ProtocolError::Semantic(
                        "specific parameter query missing count byte".into(),
                    ));
                }
                let count = body[0] as usize;
                if body.len() - 1 != count * 4 {
                    return Err(ProtocolError::Semantic(format!(
                        "id area is {} bytes, expected {} for {count} ids",
                        body.len() - 1,
                        count * 4
                    )));
                }
                view.terminal_parameter_ids = body[1..]
                    .chunks_exact(4)
                    .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
                    .collect();
                Ok(())
            }),
        );

        // 0x8108, terminal upgrade.
        self.overwrite(
            MessageId::TerminalUpgrade.into(),
            Box::new(|body, view| {
                let (_, info) = UpgradeInfo::parse(body, &Bytes::new(), &())?;
                view.upgrade_info = info;
                Ok(())
            }),
        );

        // 0x0108, upgrade result report.
        self.overwrite(
            MessageId::UpgradeResultReport.into(),
            Box::new(|body, view| {
                if body.len() != 2 {
                    return Err(ProtocolError::Semantic(format!(
                        "upgrade result body must be 2 bytes, got {}",
                        body.len()
                    )));
                }
                view.upgrade_info.upgrade_type = body[0].into();
                view.upgrade_info.upgrade_result = body[1].into();
                Ok(())
            }),
        );

        // 0x0200, location report.
        self.overwrite(
            MessageId::LocationReport.into(),
            Box::new(|body, view| {
                let (rest, basic) = LocationBasic::parse(body, &Bytes::new(), &())?;
                view.location_basic = basic;
                view.location_extensions = decode_extension_items(rest)?;
                Ok(())
            }),
        );

        // 0x0201, location query response: response flow number first, then
        // the same layout as 0x0200.
        self.overwrite(
            MessageId::LocationQueryResponse.into(),
            Box::new(|body, view| {
                if body.len() < 2 {
                    return Err(ProtocolError::Semantic(
                        "location query response missing flow number".into(),
                    ));
                }
                view.response_flow_num = u16::from_be_bytes([body[0], body[1]]);
                let (rest, basic) = LocationBasic::parse(&body[2..], &Bytes::new(), &())?;
                view.location_basic = basic;
                view.location_extensions = decode_extension_items(rest)?;
                Ok(())
            }),
        );

        // 0x8202, temporary location tracking control.
        self.overwrite(
            MessageId::TrackingControl.into(),
            Box::new(|body, view| {
                if body.len() != 6 {
                    return Err(ProtocolError::Semantic(format!(
                        "tracking control body must be 6 bytes, got {}",
                        body.len()
                    )));
                }
                view.tracking_control.interval = u16::from_be_bytes([body[0], body[1]]);
                view.tracking_control.valid_seconds =
                    u32::from_be_bytes([body[2], body[3], body[4], body[5]]);
                Ok(())
            }),
        );

        // 0x8604, set polygon area.
        self.overwrite(
            MessageId::SetPolygonArea.into(),
            Box::new(|body, view| {
                let (_, area) = PolygonArea::parse(body, &Bytes::new(), &())?;
                view.polygon_area = area;
                Ok(())
            }),
        );

        // 0x8605, delete polygon areas.
        self.overwrite(
            MessageId::DeletePolygonArea.into(),
            Box::new(|body, view| {
                if body.is_empty() {
                    return Err(ProtocolError::Semantic(
                        "polygon delete body missing count byte".into(),
                    ));
                }
                let count = body[0] as usize;
                if body.len() - 1 != count * 4 {
                    return Err(ProtocolError::Semantic(format!(
                        "area id area is {} bytes, expected {} for {count} ids",
                        body.len() - 1,
                        count * 4
                    )));
                }
                view.polygon_area_ids = body[1..]
                    .chunks_exact(4)
                    .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
                    .collect();
                Ok(())
            }),
        );

        // 0x0801, multimedia data upload.
        self.overwrite(
            MessageId::MultimediaUpload.into(),
            Box::new(|body, view| {
                let (_, upload) = MultimediaUpload::parse(body, &Bytes::new(), &())?;
                view.multimedia_upload = upload;
                Ok(())
            }),
        );

        // 0x8800, multimedia upload response.
        self.overwrite(
            MessageId::MultimediaUploadResponse.into(),
            Box::new(|body, view| {
                let (_, response) = MultimediaUploadResponse::parse(body, &Bytes::new(), &())?;
                view.multimedia_response = response;
                Ok(())
            }),
        );
    }
}
