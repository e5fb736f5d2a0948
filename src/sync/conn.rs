use std::net::{Shutdown, TcpStream};

use crate::buffer::BufferSet;
use crate::constant::SqlResult;
use crate::diagnostic::HeaderDiagnosticRecord;
use crate::error::{Error, Result};
use crate::opts::Opts;
use crate::sync::channel::FramedChannel;
use crate::sync::statement::Statement;

/// A connection to one node's ODBC endpoint
///
/// Public operations never fail across the boundary: they return a
/// [`SqlResult`] and leave the details in [`Connection::diagnostics`].
#[derive(Debug, Default)]
pub struct Connection {
    channel: Option<FramedChannel<TcpStream>>,
    opts: Opts,
    buffer_set: BufferSet,
    diag: HeaderDiagnosticRecord,
}

impl Connection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect with default options for `host:port` and `cache`
    pub fn establish(&mut self, host: &str, port: u16, cache: &str) -> SqlResult {
        self.establish_with(&Opts::new(host, port, cache))
    }

    pub fn establish_with(&mut self, opts: &Opts) -> SqlResult {
        self.diag.reset();
        let result = self.internal_establish(opts);
        self.diag.complete(result, opts)
    }

    #[tracing::instrument(skip_all)]
    fn internal_establish(&mut self, opts: &Opts) -> Result<SqlResult> {
        if self.channel.is_some() {
            return Err(Error::AlreadyConnected);
        }
        if opts.cache.is_empty() {
            return Err(Error::BadConfigError("Cache is not specified.".to_string()));
        }

        let stream = TcpStream::connect((opts.host.as_str(), opts.port)).map_err(|source| {
            Error::CannotConnect {
                host: opts.host.clone(),
                port: opts.port,
                source,
            }
        })?;
        stream.set_nodelay(opts.tcp_nodelay)?;
        stream.set_read_timeout(opts.read_timeout)?;
        stream.set_write_timeout(opts.write_timeout)?;

        tracing::debug!(host = %opts.host, port = opts.port, cache = %opts.cache, "connected");
        self.channel = Some(FramedChannel::new(stream));
        self.opts = opts.clone();
        Ok(SqlResult::Success)
    }

    /// Close the socket
    pub fn release(&mut self) -> SqlResult {
        self.diag.reset();
        let result = self.internal_release();
        self.diag.complete(result, &self.opts)
    }

    fn internal_release(&mut self) -> Result<SqlResult> {
        let channel = self.channel.take().ok_or(Error::NotConnected)?;
        if let Err(err) = channel.get_ref().shutdown(Shutdown::Both) {
            tracing::debug!(error = %err, "shutdown failed");
        }
        Ok(SqlResult::Success)
    }

    pub fn is_connected(&self) -> bool {
        self.channel.is_some()
    }

    /// Options of the current (or last) connection
    pub fn opts(&self) -> &Opts {
        &self.opts
    }

    pub fn diagnostics(&self) -> &HeaderDiagnosticRecord {
        &self.diag
    }

    /// Create a statement borrowing this connection
    pub fn create_statement<'b>(&mut self) -> Statement<'_, 'b> {
        Statement::new(self)
    }

    /// One request/response round trip.
    ///
    /// `encode` fills the request payload, `decode` parses the response
    /// payload. A request that fails to encode is never sent. An I/O failure
    /// leaves the stream unusable, so the channel is dropped and the
    /// connection must be re-established.
    #[tracing::instrument(skip_all)]
    pub(crate) fn sync_message<T>(
        &mut self,
        encode: impl FnOnce(&mut Vec<u8>) -> Result<()>,
        decode: impl FnOnce(&[u8]) -> Result<T>,
    ) -> Result<T> {
        let channel = self.channel.as_mut().ok_or(Error::NotConnected)?;

        encode(self.buffer_set.new_write_buffer())?;
        if let Err(err) = channel.send(self.buffer_set.write_buffer()) {
            tracing::warn!(error = %err, "send failed, closing connection");
            self.channel = None;
            return Err(err);
        }
        if let Err(err) = channel.receive(&mut self.buffer_set.read_buffer) {
            tracing::warn!(error = %err, "receive failed, closing connection");
            self.channel = None;
            return Err(err);
        }

        decode(&self.buffer_set.read_buffer)
    }
}
