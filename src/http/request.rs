//! Request-line and query-string parsing into typed routes.
//!
//! Only the request line is inspected; headers are read off the socket
//! by the server (to find the end of the request) but carry no routing
//! information here.

use crate::app::commands::RelayCommand;
use crate::config::CHANNEL_COUNT;

/// What a parsed request asks the server to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `GET /` with no control query.
    Index,
    /// `GET /?relay=..&state=..` — apply the command, then serve the UI.
    Control(RelayCommand),
    /// `GET /api/state`.
    ApiState,
}

/// Why a request could not be routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestError {
    /// Not a parseable `GET <target> HTTP/1.x` request line.
    Malformed,
    /// Method other than GET.
    MethodNotAllowed,
    /// Path not one of the served routes.
    UnknownPath,
    /// Control query present but invalid (bad id, bad state, missing key).
    BadQuery,
}

/// Parse the first line of an HTTP request into a [`Route`].
///
/// `line` is everything up to (not including) the first CRLF.
pub fn parse_request_line(line: &str) -> Result<Route, RequestError> {
    let mut parts = line.split(' ');
    let method = parts.next().ok_or(RequestError::Malformed)?;
    let target = parts.next().ok_or(RequestError::Malformed)?;
    let version = parts.next().ok_or(RequestError::Malformed)?;

    if !version.starts_with("HTTP/1.") {
        return Err(RequestError::Malformed);
    }
    if method != "GET" {
        return Err(RequestError::MethodNotAllowed);
    }

    let (path, query) = match target.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (target, None),
    };

    match path {
        "/" => match query {
            None | Some("") => Ok(Route::Index),
            Some(q) => parse_control_query(q).map(Route::Control),
        },
        "/api/state" => Ok(Route::ApiState),
        _ => Err(RequestError::UnknownPath),
    }
}

/// Parse `relay=<id|all>&state=<on|off|toggle>` into a command.
///
/// `relay=all&state=toggle` is the all-or-nothing flip (all on unless
/// every relay is already on). `state=toggle` with a single id is not
/// accepted; single-relay buttons always send an explicit target state.
fn parse_control_query(query: &str) -> Result<RelayCommand, RequestError> {
    let mut relay: Option<&str> = None;
    let mut state: Option<&str> = None;

    for pair in query.split('&') {
        let (key, value) = pair.split_once('=').ok_or(RequestError::BadQuery)?;
        match key {
            "relay" => relay = Some(value),
            "state" => state = Some(value),
            // Unknown keys are ignored, matching lax browser behavior.
            _ => {}
        }
    }

    let relay = relay.ok_or(RequestError::BadQuery)?;
    let state = state.ok_or(RequestError::BadQuery)?;

    if relay == "all" {
        return match state {
            "on" => Ok(RelayCommand::SetAll { on: true }),
            "off" => Ok(RelayCommand::SetAll { on: false }),
            "toggle" => Ok(RelayCommand::ToggleAll),
            _ => Err(RequestError::BadQuery),
        };
    }

    let id: u8 = relay.parse().map_err(|_| RequestError::BadQuery)?;
    if id < 1 || id as usize > CHANNEL_COUNT {
        return Err(RequestError::BadQuery);
    }
    match state {
        "on" => Ok(RelayCommand::Set { id, on: true }),
        "off" => Ok(RelayCommand::Set { id, on: false }),
        _ => Err(RequestError::BadQuery),
    }
}
