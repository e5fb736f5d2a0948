use crate::constant::ResponseStatus;
use crate::error::{Error, Result};
use crate::protocol::binary::BinaryReader;

/// Read the status byte that opens every response.
///
/// On success the returned reader is positioned at the response body. A
/// failure status carries the server's error text.
pub fn read_response_status(payload: &[u8]) -> Result<BinaryReader<'_>> {
    let mut reader = BinaryReader::new(payload);
    let status = reader.read_u8()?;
    if status != ResponseStatus::Success as u8 {
        let message = reader
            .read_string()
            .ok()
            .flatten()
            .unwrap_or("Unknown server error")
            .to_string();
        return Err(Error::ServerError { status, message });
    }
    Ok(reader)
}
