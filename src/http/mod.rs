//! Minimal HTTP/1.1 control surface.
//!
//! One route set, GET only:
//!
//! - `GET /` — embedded web UI; with a `?relay=..&state=..` query it is
//!   also the control endpoint (the UI's buttons hit it with `fetch`).
//! - `GET /api/state` — JSON snapshot of all relays and inputs.
//!
//! Parsing and framing are deliberately tiny: request line plus query
//! string in, status line plus `Content-Length` out, `Connection: close`
//! on every response.

pub mod request;
pub mod response;
pub mod server;
pub mod ui;
