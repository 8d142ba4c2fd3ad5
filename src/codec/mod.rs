//! Value-level codecs for location report extension items.
//!
//! The protocol layer treats extension items as opaque `id | len | value`
//! entries; this module applies the known sub-schemas on demand and keeps
//! unknown IDs intact.

pub mod ext_parser;
pub mod ext_types;

pub use ext_parser::{encode_extension, parse_extension, parse_extensions, put_extension};
pub use ext_types::{ExtensionId, ExtensionValue, IoStatusFlags, VehicleSignalFlags};
