//! Plain-text wire formats.
//!
//! - node list: one `id,address,ip,x,y,h` line per node
//! - probe reply: `x,y,h,error`
//!
//! Floats are written with `{}` so they read back bit-for-bit.

use crate::coords::Position;
use crate::error::CoordinetError;
use crate::types::{CoordinateState, PeerRecord};

type Result<T> = std::result::Result<T, CoordinetError>;

/// Validate a required text field (id, address, ip)
pub fn require_field<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CoordinetError::InvalidRequest(format!("missing {name}")))?;

    if value.contains([',', '\n', '\r']) {
        return Err(CoordinetError::InvalidRequest(format!(
            "{name} contains a reserved character"
        )));
    }
    Ok(value)
}

/// Parse a required, finite coordinate component
pub fn require_coordinate(name: &str, value: Option<&str>) -> Result<f64> {
    let raw = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CoordinetError::InvalidRequest(format!("missing {name}")))?;

    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(CoordinetError::InvalidRequest(format!("invalid {name}: {raw}"))),
    }
}

/// Parse a position from its three query components
pub fn require_position(x: Option<&str>, y: Option<&str>, h: Option<&str>) -> Result<Position> {
    Ok(Position::new(
        require_coordinate("x", x)?,
        require_coordinate("y", y)?,
        require_coordinate("h", h)?,
    ))
}

pub fn encode_peer_line(peer: &PeerRecord) -> String {
    format!(
        "{},{},{},{},{},{}",
        peer.id, peer.address, peer.ip, peer.position.x, peer.position.y, peer.position.h
    )
}

/// Encode a node list, one line per node, each newline-terminated
pub fn encode_node_list(peers: &[PeerRecord]) -> String {
    let mut body = String::new();
    for peer in peers {
        body.push_str(&encode_peer_line(peer));
        body.push('\n');
    }
    body
}

pub fn parse_peer_line(line: &str) -> Result<PeerRecord> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if parts.len() != 6 {
        return Err(CoordinetError::MalformedResponse(format!(
            "expected 6 fields, got {}: {line}",
            parts.len()
        )));
    }

    let malformed = |e: CoordinetError| CoordinetError::MalformedResponse(e.to_string());
    let id = require_field("id", Some(parts[0])).map_err(malformed)?;
    let address = require_field("address", Some(parts[1])).map_err(malformed)?;
    let ip = require_field("ip", Some(parts[2])).map_err(malformed)?;
    let position =
        require_position(Some(parts[3]), Some(parts[4]), Some(parts[5])).map_err(malformed)?;

    Ok(PeerRecord::new(id, address, ip, position))
}

/// Parse a node list body. Blank lines are ignored; any malformed line
/// fails the whole body.
pub fn parse_node_list(body: &str) -> Result<Vec<PeerRecord>> {
    body.lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_peer_line)
        .collect()
}

pub fn encode_probe(state: &CoordinateState) -> String {
    format!(
        "{},{},{},{}",
        state.position.x, state.position.y, state.position.h, state.error
    )
}

pub fn parse_probe(body: &str) -> Result<CoordinateState> {
    let parts: Vec<&str> = body.trim().split(',').collect();
    if parts.len() != 4 {
        return Err(CoordinetError::MalformedResponse(format!(
            "expected x,y,h,error, got: {}",
            body.trim()
        )));
    }

    let malformed = |e: CoordinetError| CoordinetError::MalformedResponse(e.to_string());
    let position =
        require_position(Some(parts[0]), Some(parts[1]), Some(parts[2])).map_err(malformed)?;
    let error = require_coordinate("error", Some(parts[3])).map_err(malformed)?;
    if error < 0.0 {
        return Err(CoordinetError::MalformedResponse(format!("negative error: {error}")));
    }

    Ok(CoordinateState::new(position, error))
}
