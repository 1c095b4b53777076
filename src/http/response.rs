//! HTTP/1.1 response framing.
//!
//! Every response is `Connection: close` with an explicit
//! `Content-Length`, so the peer never has to guess where the body ends
//! and the server never has to track keep-alive state.

use std::io::{self, Write};

pub const CONTENT_HTML: &str = "text/html; charset=utf-8";
pub const CONTENT_JSON: &str = "application/json";
pub const CONTENT_TEXT: &str = "text/plain; charset=utf-8";

fn write_response<W: Write>(
    w: &mut W,
    status: u16,
    reason: &str,
    content_type: &str,
    body: &[u8],
) -> io::Result<()> {
    write!(
        w,
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason,
        content_type,
        body.len()
    )?;
    w.write_all(body)?;
    w.flush()
}

pub fn ok<W: Write>(w: &mut W, content_type: &str, body: &[u8]) -> io::Result<()> {
    write_response(w, 200, "OK", content_type, body)
}

pub fn bad_request<W: Write>(w: &mut W, detail: &str) -> io::Result<()> {
    write_response(w, 400, "Bad Request", CONTENT_TEXT, detail.as_bytes())
}

pub fn not_found<W: Write>(w: &mut W) -> io::Result<()> {
    write_response(w, 404, "Not Found", CONTENT_TEXT, b"not found")
}

pub fn method_not_allowed<W: Write>(w: &mut W) -> io::Result<()> {
    write_response(w, 405, "Method Not Allowed", CONTENT_TEXT, b"GET only")
}

pub fn server_error<W: Write>(w: &mut W) -> io::Result<()> {
    write_response(w, 500, "Internal Server Error", CONTENT_TEXT, b"internal error")
}
