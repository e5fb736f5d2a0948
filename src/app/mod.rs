pub mod buffer;
pub mod parameter;

pub use buffer::{ApplicationDataBuffer, ColumnBindingMap, ConversionResult, Number};
pub use parameter::{Parameter, ParameterBindingMap};
