use crate::protocol::frame::body::{
    FillPacket, LocationBasic, LocationExtensions, MultimediaUpload, MultimediaUploadResponse,
    PolygonArea, RegisterInfo, TerminalParameters, TrackingControl, UpgradeInfo,
};
use crate::protocol::frame::header::MessageHeader;

/// One side of the protocol state: everything a message body can read from
/// or write into.
///
/// Which fields a given message touches depends on its ID; untouched fields
/// keep their previous values.
#[derive(Debug, Clone, Default)]
pub struct MessageView {
    /// Message header. On the send side the caller sets `msg_id`, `phone`
    /// and `flow_num`; the packager patches the body length. On the parse
    /// side it is fully decoded from the wire.
    pub header: MessageHeader,

    /// Flow number being responded to (general/register/query responses).
    pub response_flow_num: u16,
    /// Message ID being responded to (general responses).
    pub response_msg_id: u16,
    /// Raw result code; interpret via `GeneralResponseResult` or
    /// `RegisterResult` depending on the message.
    pub response_result: u8,

    pub register_info: RegisterInfo,
    /// Authentication code (0x0102 body, 0x8100 trailer).
    pub authentication_code: Vec<u8>,
    pub terminal_parameters: TerminalParameters,
    /// Parameter IDs for the specific-parameter query (0x8106).
    pub terminal_parameter_ids: Vec<u32>,
    pub location_basic: LocationBasic,
    pub location_extensions: LocationExtensions,
    pub tracking_control: TrackingControl,
    pub polygon_area: PolygonArea,
    /// Area IDs for polygon deletion (0x8605).
    pub polygon_area_ids: Vec<u32>,
    pub upgrade_info: UpgradeInfo,
    pub fill_packet: FillPacket,
    pub multimedia_upload: MultimediaUpload,
    pub multimedia_response: MultimediaUploadResponse,
    /// Reserved bytes; carried for callers, never encoded.
    pub retain: Vec<u8>,
}

/// Protocol state shared between the packager and the parser.
///
/// The two views are deliberately separate: the packager reads only `send`
/// and the parser writes only `parse`, so a received frame can never
/// clobber outgoing state on the next send even when one value is used for
/// both directions of a connection.
#[derive(Debug, Clone, Default)]
pub struct ProtocolParameter {
    /// Filled by the caller before packaging.
    pub send: MessageView,
    /// Populated by the parser; partial contents after a decode error are
    /// diagnostic only.
    pub parse: MessageView,
}

impl ProtocolParameter {
    pub fn new() -> Self {
        Self::default()
    }
}
