//! Nonblocking HTTP serve loop.
//!
//! Connections are handled one at a time on the shared executor thread.
//! The socket is polled through `async-io-mini` timers rather than
//! blocking reads, so the scan loop keeps running while a client is
//! slow; a per-connection read deadline bounds how long a stalled
//! client can occupy the handler at all.
//!
//! Core borrows are confined to the dispatch step. No `.await` happens
//! while a borrow is live (see the contract in [`crate::tasks`]).

use core::time::Duration;
use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};

use log::{debug, info, warn};

use crate::app::commands::RelayCommand;
use crate::app::ports::{EventSink, ExpanderBus};
use crate::error::Error;
use crate::http::request::{self, RequestError, Route};
use crate::http::{response, ui};
use crate::tasks::SharedCore;

/// Largest request head we accept. The UI's control requests are well
/// under 200 bytes; anything bigger is not one of ours.
const MAX_REQUEST_BYTES: usize = 1024;

/// Accept-poll interval when no client is waiting.
const ACCEPT_POLL_MS: u64 = 10;

/// Read-poll interval while waiting for request bytes.
const READ_POLL_MS: u64 = 5;

/// Serve forever. `listener` must already be nonblocking.
///
/// Handler failures are logged and dropped; nothing a client sends can
/// stop the loop.
pub async fn serve<B: ExpanderBus, S: EventSink>(
    listener: TcpListener,
    core: SharedCore<B, S>,
    read_timeout_ms: u32,
) {
    info!(
        "http: serving on {}",
        listener
            .local_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "<unknown>".into())
    );

    loop {
        match listener.accept() {
            Ok((stream, peer)) => {
                debug!("http: connection from {}", peer);
                if let Err(e) = handle_connection(stream, &core, read_timeout_ms).await {
                    debug!("http: connection from {} failed: {}", peer, e);
                }
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                async_io_mini::Timer::after(Duration::from_millis(ACCEPT_POLL_MS)).await;
            }
            Err(e) => {
                warn!("http: accept failed: {}", e);
                async_io_mini::Timer::after(Duration::from_millis(100)).await;
            }
        }
    }
}

async fn handle_connection<B: ExpanderBus, S: EventSink>(
    mut stream: TcpStream,
    core: &SharedCore<B, S>,
    read_timeout_ms: u32,
) -> io::Result<()> {
    stream.set_nonblocking(true)?;
    stream.set_nodelay(true).ok();

    let head = match read_request_head(&mut stream, read_timeout_ms).await? {
        Some(head) => head,
        None => return Ok(()), // peer gave up, nothing to answer
    };

    let line = head.split("\r\n").next().unwrap_or("");
    let body = dispatch(line, core);
    write_all_nonblocking(&mut stream, &body).await
}

/// Read until the blank line ending the request head, the deadline, or
/// the size cap. Returns `None` on timeout or early close.
async fn read_request_head(
    stream: &mut TcpStream,
    read_timeout_ms: u32,
) -> io::Result<Option<String>> {
    let mut buf = [0u8; MAX_REQUEST_BYTES];
    let mut len = 0usize;
    let mut waited_ms: u64 = 0;

    loop {
        match stream.read(&mut buf[len..]) {
            Ok(0) => return Ok(None),
            Ok(n) => {
                len += n;
                if buf[..len].windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
                if len == buf.len() {
                    // Head too large; route on what we have (the request
                    // line fits in far less than the cap).
                    break;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                if waited_ms >= u64::from(read_timeout_ms) {
                    debug!("http: read deadline expired");
                    return Ok(None);
                }
                async_io_mini::Timer::after(Duration::from_millis(READ_POLL_MS)).await;
                waited_ms += READ_POLL_MS;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }

    Ok(Some(String::from_utf8_lossy(&buf[..len]).into_owned()))
}

/// Route the request line and build the full response bytes.
///
/// The core borrow lives only inside this function, which never awaits.
fn dispatch<B: ExpanderBus, S: EventSink>(line: &str, core: &SharedCore<B, S>) -> Vec<u8> {
    let mut out = Vec::new();
    match request::parse_request_line(line) {
        Ok(Route::Index) => {
            let _ = response::ok(&mut out, response::CONTENT_HTML, ui::INDEX_HTML.as_bytes());
        }
        Ok(Route::Control(cmd)) => match apply_command(core, cmd) {
            Ok(json) => {
                let _ = response::ok(&mut out, response::CONTENT_JSON, &json);
            }
            Err(Error::InvalidId(id)) => {
                warn!("http: control request for invalid relay id {}", id);
                let _ = response::bad_request(&mut out, "invalid relay id");
            }
            Err(e) => {
                warn!("http: control request failed: {}", e);
                let _ = response::server_error(&mut out);
            }
        },
        Ok(Route::ApiState) => {
            let snapshot = core.borrow().snapshot();
            match serde_json::to_vec(&snapshot) {
                Ok(json) => {
                    let _ = response::ok(&mut out, response::CONTENT_JSON, &json);
                }
                Err(e) => {
                    warn!("http: snapshot serialization failed: {}", e);
                    let _ = response::server_error(&mut out);
                }
            }
        }
        Err(RequestError::MethodNotAllowed) => {
            let _ = response::method_not_allowed(&mut out);
        }
        Err(RequestError::UnknownPath) => {
            let _ = response::not_found(&mut out);
        }
        Err(RequestError::Malformed) | Err(RequestError::BadQuery) => {
            let _ = response::bad_request(&mut out, "bad request");
        }
    }
    out
}

fn apply_command<B: ExpanderBus, S: EventSink>(
    core: &SharedCore<B, S>,
    cmd: RelayCommand,
) -> Result<Vec<u8>, Error> {
    let snapshot = core.borrow_mut().handle_command(cmd)?;
    serde_json::to_vec(&snapshot).map_err(|_| Error::Init("snapshot serialization"))
}

async fn write_all_nonblocking(stream: &mut TcpStream, mut data: &[u8]) -> io::Result<()> {
    while !data.is_empty() {
        match stream.write(data) {
            Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
            Ok(n) => data = &data[n..],
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                async_io_mini::Timer::after(Duration::from_millis(READ_POLL_MS)).await;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    match stream.flush() {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(()),
        Err(e) => Err(e),
    }
}
