//! Scripted stand-in for a node's ODBC endpoint, served on a loopback port

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

use ignite_odbc::constant::{CommandByte, ResponseStatus};
use ignite_odbc::meta::{ColumnMeta, TableMeta};
use ignite_odbc::protocol::binary::{WireValue, write_bool, write_i32, write_i64, write_string};

pub struct MockNode {
    port: u16,
    handle: JoinHandle<Vec<Vec<u8>>>,
}

impl MockNode {
    /// Accept one connection and answer every request with `handler`'s payload
    /// until the client goes away.
    pub fn spawn<F>(mut handler: F) -> Self
    where
        F: FnMut(&[u8]) -> Vec<u8> + Send + 'static,
    {
        init_tracing();
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock node");
        let port = listener.local_addr().expect("local addr").port();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut requests = Vec::new();
            while let Some(request) = read_frame(&mut stream) {
                let response = handler(&request);
                if write_frame(&mut stream, &response).is_err() {
                    break;
                }
                requests.push(request);
            }
            requests
        });
        Self { port, handle }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Wait for the client to disconnect; returns the requests it sent
    pub fn join(self) -> Vec<Vec<u8>> {
        self.handle.join().expect("mock node panicked")
    }
}

/// Route driver logs to the test harness output. Run with `RUST_LOG=debug` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn read_frame(stream: &mut TcpStream) -> Option<Vec<u8>> {
    let mut header = [0u8; 4];
    stream.read_exact(&mut header).ok()?;
    let len = usize::try_from(i32::from_le_bytes(header)).ok()?;
    let mut payload = vec![0; len];
    stream.read_exact(&mut payload).ok()?;
    Some(payload)
}

pub fn write_frame(stream: &mut TcpStream, payload: &[u8]) -> std::io::Result<()> {
    stream.write_all(&(payload.len() as i32).to_le_bytes())?;
    stream.write_all(payload)?;
    stream.flush()
}

/// Command byte of a request
pub fn command(request: &[u8]) -> Option<CommandByte> {
    request.first().copied().and_then(CommandByte::from_u8)
}

// ============================================================================
// Responses
// ============================================================================

pub fn success(body: impl FnOnce(&mut Vec<u8>)) -> Vec<u8> {
    let mut out = vec![ResponseStatus::Success as u8];
    body(&mut out);
    out
}

pub fn failure(message: &str) -> Vec<u8> {
    let mut out = vec![ResponseStatus::Failed as u8];
    write_string(&mut out, Some(message)).expect("encode message");
    out
}

pub fn execute_response(query_id: i64, columns: &[ColumnMeta]) -> Vec<u8> {
    success(|out| {
        write_i64(out, query_id);
        write_i32(out, columns.len() as i32);
        for column in columns {
            column.write(out).expect("encode column");
        }
    })
}

pub fn fetch_response(query_id: i64, last: bool, rows: &[Vec<WireValue>]) -> Vec<u8> {
    let mut page = Vec::new();
    for row in rows {
        write_i32(&mut page, row.len() as i32);
        for value in row {
            value.write(&mut page).expect("encode value");
        }
    }
    fetch_response_raw(query_id, last, rows.len() as i32, &page)
}

/// FETCH response around pre-encoded row bytes
pub fn fetch_response_raw(query_id: i64, last: bool, row_count: i32, page: &[u8]) -> Vec<u8> {
    success(|out| {
        write_i64(out, query_id);
        write_bool(out, last);
        write_i32(out, row_count);
        out.extend_from_slice(page);
    })
}

pub fn close_response(query_id: i64) -> Vec<u8> {
    success(|out| write_i64(out, query_id))
}

pub fn columns_meta_response(columns: &[ColumnMeta]) -> Vec<u8> {
    success(|out| {
        write_i32(out, columns.len() as i32);
        for column in columns {
            column.write(out).expect("encode column");
        }
    })
}

pub fn tables_meta_response(tables: &[TableMeta]) -> Vec<u8> {
    success(|out| {
        write_i32(out, tables.len() as i32);
        for table in tables {
            table.write(out).expect("encode table");
        }
    })
}

/// Query id carried by a FETCH or CLOSE request
pub fn request_query_id(request: &[u8]) -> i64 {
    let bytes = request.get(1..9).expect("query id");
    i64::from_le_bytes(bytes.try_into().expect("eight bytes"))
}

/// Serves one result set: EXECUTE returns `columns`, each FETCH hands out
/// the next page (the final one flagged last), CLOSE acknowledges.
pub fn result_set(
    query_id: i64,
    columns: Vec<ColumnMeta>,
    pages: Vec<Vec<Vec<WireValue>>>,
) -> impl FnMut(&[u8]) -> Vec<u8> + Send + 'static {
    let mut pages: VecDeque<_> = pages.into();
    move |request| match command(request) {
        Some(CommandByte::ExecuteSqlQuery) => execute_response(query_id, &columns),
        Some(CommandByte::FetchSqlQuery) => {
            let page = pages.pop_front().unwrap_or_default();
            fetch_response(query_id, pages.is_empty(), &page)
        }
        Some(CommandByte::CloseSqlQuery) => close_response(query_id),
        _ => failure("Unexpected request"),
    }
}
