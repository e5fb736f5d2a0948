pub mod binary;
pub mod command;
pub mod packet;
pub mod primitive;
pub mod response;

pub use binary::{BinaryReader, SavedPosition, WireValue};
