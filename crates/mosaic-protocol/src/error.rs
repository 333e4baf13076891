//! Error types for the protocol layer.
//!
//! Every Mosaic crate has its own error enum. A `ProtocolError` always
//! means the bytes on the wire were wrong, never the game move inside
//! them. The server closes a connection on any of these.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a message into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, an unknown `"type"`, a
    /// missing field or a field of the wrong type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded but is not allowed here, such as a game
    /// message before `login`.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
