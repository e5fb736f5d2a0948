use std::io::{Read, Write};

use zerocopy::{FromZeros, IntoBytes};

use crate::error::{Error, Result};
use crate::protocol::packet::MessageHeader;

/// Length-prefixed message framing over a byte stream
///
/// Every message is `[i32 LE payload length][payload]`. A failed send leaves
/// the stream in an unknown state; the owner must drop the channel.
#[derive(Debug)]
pub struct FramedChannel<S> {
    stream: S,
}

impl<S: Read + Write> FramedChannel<S> {
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Write the header and then the whole payload
    #[tracing::instrument(skip_all)]
    pub fn send(&mut self, payload: &[u8]) -> Result<()> {
        let header = MessageHeader::encode(payload.len())?;
        tracing::debug!(len = payload.len(), "send");
        self.stream.write_all(header.as_bytes())?;
        self.stream.write_all(payload)?;
        self.stream.flush()?;
        Ok(())
    }

    /// Read one message into `buffer`, replacing its contents.
    ///
    /// When the peer closes mid-payload, `buffer` keeps the bytes that did
    /// arrive and the call fails with [`Error::ConnectionClosed`].
    #[tracing::instrument(skip_all)]
    pub fn receive(&mut self, buffer: &mut Vec<u8>) -> Result<()> {
        buffer.clear();

        let mut header = MessageHeader::new_zeroed();
        self.stream.read_exact(header.as_mut_bytes())?;
        let length = header.length()?;
        tracing::debug!(len = length, "receive");

        buffer.resize(length, 0);
        let mut received = 0;
        while received < length {
            let n = match self.stream.read(&mut buffer[received..]) {
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    buffer.truncate(received);
                    return Err(e.into());
                }
            };
            if n == 0 {
                buffer.truncate(received);
                return Err(Error::ConnectionClosed {
                    expected: length,
                    received,
                });
            }
            received += n;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// In-memory duplex: reads from `input`, writes to `output`
    struct Duplex {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
    }

    impl Read for Duplex {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for Duplex {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.output.write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Yields at most `chunk` bytes per read
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        chunk: usize,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = buf.len().min(self.chunk).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    impl Write for Trickle {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn framed(payload: &[u8]) -> Vec<u8> {
        let mut out = (payload.len() as i32).to_le_bytes().to_vec();
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn test_send_writes_le_header() {
        let mut channel = FramedChannel::new(Duplex {
            input: Cursor::new(Vec::new()),
            output: Vec::new(),
        });
        channel.send(&[9, 8, 7]).unwrap();
        assert_eq!(channel.into_inner().output, vec![3, 0, 0, 0, 9, 8, 7]);
    }

    #[test]
    fn test_receive_accumulates_short_reads() {
        let payload: Vec<u8> = (0..=255).cycle().take(5000).collect();
        let mut channel = FramedChannel::new(Trickle {
            data: framed(&payload),
            pos: 0,
            chunk: 7,
        });
        let mut buffer = vec![0xAA; 3];
        channel.receive(&mut buffer).unwrap();
        assert_eq!(buffer, payload);
    }

    #[test]
    fn test_receive_empty_payload() {
        let mut channel = FramedChannel::new(Trickle {
            data: framed(&[]),
            pos: 0,
            chunk: 4,
        });
        let mut buffer = vec![1, 2];
        channel.receive(&mut buffer).unwrap();
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_receive_peer_closed_mid_payload() {
        let mut data = framed(&[1, 2, 3, 4, 5]);
        data.truncate(4 + 2);
        let mut channel = FramedChannel::new(Trickle { data, pos: 0, chunk: 64 });
        let mut buffer = Vec::new();
        match channel.receive(&mut buffer) {
            Err(Error::ConnectionClosed { expected, received }) => {
                assert_eq!(expected, 5);
                assert_eq!(received, 2);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(buffer, vec![1, 2]);
    }

    #[test]
    fn test_receive_truncated_header() {
        let mut channel = FramedChannel::new(Trickle {
            data: vec![5, 0],
            pos: 0,
            chunk: 64,
        });
        let mut buffer = Vec::new();
        assert!(matches!(channel.receive(&mut buffer), Err(Error::IoError(_))));
    }

    #[test]
    fn test_receive_negative_length() {
        let mut channel = FramedChannel::new(Trickle {
            data: (-1i32).to_le_bytes().to_vec(),
            pos: 0,
            chunk: 64,
        });
        let mut buffer = Vec::new();
        assert!(matches!(channel.receive(&mut buffer), Err(Error::InvalidPacket)));
    }
}
