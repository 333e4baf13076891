//! Unified error type for the Mosaic server.

use mosaic_protocol::ProtocolError;
use mosaic_room::RoomError;
use mosaic_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates a `From` impl, so
/// `?` converts sub-crate errors on the way up.
#[derive(Debug, thiserror::Error)]
pub enum MosaicError {
    /// A transport-level error (bind, send, recv, oversized line).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (malformed line, unexpected message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (refused login, room gone).
    #[error(transparent)]
    Room(#[from] RoomError),
}
