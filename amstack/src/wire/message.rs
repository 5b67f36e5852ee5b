use core::fmt;

use crate::time::Instant;

/// Bytes reserved in front of the anchor for link headers.
pub const HEADER_CAPACITY: usize = 16;

/// Bytes of link payload.
pub const DATA_CAPACITY: usize = 28;

/// Bytes reserved behind the data region for link footers.
pub const FOOTER_CAPACITY: usize = 4;

/// Total number of bytes in a message buffer.
pub const MESSAGE_LEN: usize = HEADER_CAPACITY + DATA_CAPACITY + FOOTER_CAPACITY;

/// Offset of the first byte of link payload, identical for every buffer.
pub const ANCHOR: usize = HEADER_CAPACITY;

/// A packet buffer of fixed maximum size.
///
/// There is no notion of the length of a message at this level. Each layer records the length of
/// its payload within its own header, see the [`Layer`] contract.
///
/// Exactly one party holds a `&mut Message` at any time: the device while waiting for a frame or
/// transmitting one, a receiver for the duration of a receive call, or a client. Handing buffers
/// around is done by moving these exclusive references.
///
/// [`Layer`]: ../layer/trait.Layer.html
#[derive(Clone, PartialEq, Eq)]
pub struct Message {
    bytes: [u8; MESSAGE_LEN],
    metadata: Metadata,
}

/// Out of band information attached to a message.
///
/// Not part of any header and not counted against the payload capacity. Devices fill it on
/// reception and transmission.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Time of reception or transmission, if the device records one.
    pub timestamp: Option<Instant>,
    /// Ask the device to request a link level acknowledgement when transmitting.
    pub ack_requested: bool,
    /// Set by the device when the transmission was acknowledged by the receiver.
    pub acked: bool,
}

impl Message {
    /// A zeroed message.
    pub const fn new() -> Self {
        Message {
            bytes: [0; MESSAGE_LEN],
            metadata: Metadata {
                timestamp: None,
                ack_requested: false,
                acked: false,
            },
        }
    }

    /// The whole buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The whole buffer, mutably.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// The region in front of the anchor.
    pub fn header_region(&self) -> &[u8] {
        &self.bytes[..ANCHOR]
    }

    /// The data region starting at the anchor.
    pub fn data_region(&self) -> &[u8] {
        &self.bytes[ANCHOR..ANCHOR + DATA_CAPACITY]
    }

    /// The region behind the data.
    pub fn footer_region(&self) -> &[u8] {
        &self.bytes[ANCHOR + DATA_CAPACITY..]
    }

    /// The out of band metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Mutable access to the out of band metadata.
    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

impl Default for Message {
    fn default() -> Self {
        Message::new()
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Message")
            .field("header", &self.header_region())
            .field("data", &self.data_region())
            .field("footer", &self.footer_region())
            .field("metadata", &self.metadata)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regions_partition_buffer() {
        let message = Message::new();
        assert_eq!(message.header_region().len(), HEADER_CAPACITY);
        assert_eq!(message.data_region().len(), DATA_CAPACITY);
        assert_eq!(message.footer_region().len(), FOOTER_CAPACITY);
        assert_eq!(message.as_bytes().len(), MESSAGE_LEN);
    }
}
