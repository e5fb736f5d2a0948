pub mod channel;
pub mod conn;
pub mod statement;

pub use channel::FramedChannel;
pub use conn::Connection;
pub use statement::Statement;
