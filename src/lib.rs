//! JT/T 808 vehicle telematics frame codec.
//!
//! Converts structured protocol parameters to on-the-wire byte frames and
//! back: the `7E … 7E` envelope with byte escaping and XOR checksum, the
//! bit-packed message header with BCD phone number and segmentation fields,
//! and the per-message body layouts of the standard catalog (registration,
//! authentication, heartbeat, location reports with TLV extensions,
//! terminal parameters, polygon geofencing, firmware upgrade, multimedia
//! upload, general responses).
//!
//! The codec is a pure synchronous library over caller-owned buffers.
//! Transport, timers and application state machines live elsewhere; the
//! only long-lived state is the pair of handler registries, which callers
//! construct, optionally extend with vendor-specific message IDs, and then
//! treat as read-only.
//!
//! ```
//! use jt808_codec::protocol::frame::builder::build_heartbeat;
//! use jt808_codec::protocol::frame::defs::Phone;
//! use jt808_codec::{Jt808Packager, Jt808Parser, ProtocolParameter};
//!
//! let packager = Jt808Packager::new();
//! let parser = Jt808Parser::new();
//!
//! let para = build_heartbeat(Phone::new("13523339527").unwrap(), 1);
//! let frame = packager.package(&para).unwrap();
//!
//! let mut received = ProtocolParameter::new();
//! let msg_id = parser.parse(&frame, &mut received).unwrap();
//! assert_eq!(msg_id, 0x0002);
//! ```

pub mod codec;
pub mod protocol;
pub mod types;

pub use protocol::error::ProtocolError;
pub use protocol::packager::Jt808Packager;
pub use protocol::parameter::{MessageView, ProtocolParameter};
pub use protocol::parser::Jt808Parser;
