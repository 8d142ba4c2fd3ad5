pub mod codec;
pub mod error;
pub mod frame;
pub mod packager;
pub mod parameter;
pub mod parser;
pub mod sequence;
pub mod wire;

pub use error::ProtocolError;
pub use packager::{Jt808Packager, PackageHandler};
pub use parameter::{MessageView, ProtocolParameter};
pub use parser::{Jt808Parser, ParseHandler};
pub use sequence::FlowSequence;
