/// Reusable buffers for request/response exchange
///
/// `Connection` uses a single `BufferSet` for all its operations. Bytes are
/// valid during an operation.
#[derive(Debug, Default)]
pub struct BufferSet {
    /// Payload of the last response, without the length header
    pub read_buffer: Vec<u8>,

    /// Payload of the request being built, without the length header
    write_buffer: Vec<u8>,
}

impl BufferSet {
    /// Create a new empty buffer set
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the write buffer and return mutable access.
    #[inline]
    pub fn new_write_buffer(&mut self) -> &mut Vec<u8> {
        self.write_buffer.clear();
        &mut self.write_buffer
    }

    /// Get the write buffer for reading.
    #[inline]
    pub fn write_buffer(&self) -> &[u8] {
        &self.write_buffer
    }
}
