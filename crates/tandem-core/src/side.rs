//! Endpoint roles on a two-party network.

/// Which end of the connection this endpoint is.
///
/// A network's side is fixed at construction and never changes for the
/// lifetime of the underlying stream. The discriminants are the wire
/// encoding used in handshake/identity messages by the layer above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Side {
    /// The endpoint that initiated the connection.
    Client = 0,
    /// The endpoint that accepted the connection.
    Server = 1,
}

impl Side {
    /// The other endpoint's side.
    pub fn opposite(self) -> Side {
        match self {
            Side::Client => Side::Server,
            Side::Server => Side::Client,
        }
    }

    /// Decode a side from its wire representation.
    pub fn from_wire(value: u8) -> Option<Side> {
        match value {
            0 => Some(Side::Client),
            1 => Some(Side::Server),
            _ => None,
        }
    }

    /// The wire representation of this side.
    pub fn as_wire(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Client => write!(f, "client"),
            Side::Server => write!(f, "server"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_an_involution() {
        assert_eq!(Side::Client.opposite(), Side::Server);
        assert_eq!(Side::Server.opposite(), Side::Client);
        assert_eq!(Side::Client.opposite().opposite(), Side::Client);
    }

    #[test]
    fn wire_encoding_round_trips() {
        assert_eq!(Side::from_wire(Side::Client.as_wire()), Some(Side::Client));
        assert_eq!(Side::from_wire(Side::Server.as_wire()), Some(Side::Server));
        assert_eq!(Side::from_wire(2), None);
    }
}
