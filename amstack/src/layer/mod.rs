//! The process logic of protocol layers.
//!
//! ## Layering
//!
//! A layer adds a header and a footer of fixed size around the payload of the layer below it.
//! Layers are composed by wrapping: a [`Header`] or [`ActiveMessage`] owns the layer it is stacked
//! on, down to the [`Frame`] of the physical link. Each wrapper computes where its payload starts
//! and how long it can be once, when it is constructed, from the values of its lower layer. The
//! resulting chain of types is fixed for the lifetime of the stack and no layer ever inspects
//! packet content to find a payload.
//!
//! The common operations of all layers are collected in the [`Layer`] trait. Protocol specific
//! fields are exposed by additional traits of the individual layers, such as [`am::Packet`] for
//! addressing. Both only ever take a message by reference, so a buffering component can read and
//! restore the full state of a packet without copying it.
//!
//! ## Receiving
//!
//! Reception follows the buffer swap discipline. A receiver is called with an exclusive borrow of
//! a message and must return an exclusive borrow of a message, either the same one or a spare it
//! owned before. When a different buffer is returned the receiver keeps the one it was given, and
//! the device continues with the returned one. A slow consumer can thus only ever drop its own
//! packets, there is always a buffer for the next frame.
//!
//! ## Sending
//!
//! Sending is virtualized: every client owns exactly one send slot in the [`am::SendQueue`] and
//! gives up its buffer until the completion for it hands it back. The device pulls frames from
//! the queue when it is ready, which serves the clients in round robin order.
//!
//! [`Header`]: struct.Header.html
//! [`ActiveMessage`]: am/struct.ActiveMessage.html
//! [`Frame`]: struct.Frame.html
//! [`Layer`]: trait.Layer.html
//! [`am::Packet`]: am/trait.Packet.html
//! [`am::SendQueue`]: am/struct.SendQueue.html
use core::fmt;

use crate::wire::Message;

pub mod am;
mod frame;
mod header;
#[cfg(test)]
mod tests;

pub use frame::Frame;
pub use header::Header;

/// The result type of layer operations.
pub type Result<T> = core::result::Result<T, Error>;

/// The error domain shared by all layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Error {
    /// The client already has a send outstanding.
    ///
    /// Every client owns a single send slot. It is only freed by the completion of the send that
    /// occupied it, a second request before that is refused.
    Busy,

    /// The operation is not valid in the current state.
    ///
    /// Returned when cancelling without anything pending or after the frame was already handed
    /// to the device, when referring to an unknown client, or when changing the configuration of
    /// a running stack.
    Fail,

    /// The requested length exceeds the maximum payload of the layer.
    ///
    /// Also returned when composing a layer whose header and footer do not fit into the payload
    /// of its lower layer.
    BadSize,

    /// The send was cancelled before it reached the device.
    ///
    /// Only ever delivered through a completion.
    Cancelled,

    /// The device did not transmit the frame.
    ///
    /// Only ever delivered through a completion. There is no further classification and the stack
    /// never retries on its own.
    Transmission,

    /// A dispatch registration conflicts with an existing one.
    ///
    /// Each protocol type has at most one handler for packets destined to this node and at most
    /// one for overheard packets. A handler for any destination claims both.
    Conflict,

    /// The action could not be completed because there were not enough resources.
    ///
    /// The dispatch table or the send slots are full. Provide larger storage during setup.
    Exhausted,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Error::Busy => "a send is already outstanding",
            Error::Fail => "operation invalid in the current state",
            Error::BadSize => "length exceeds the maximum payload",
            Error::Cancelled => "send was cancelled",
            Error::Transmission => "transmission failed",
            Error::Conflict => "conflicting dispatch registration",
            Error::Exhausted => "storage exhausted",
        })
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error { }

/// Can convert from a wire error.
///
/// This indicates some layer tried to interpret a header but failed.
impl From<crate::wire::Error> for Error {
    fn from(_: crate::wire::Error) -> Self {
        Error::Fail
    }
}

/// A standard wrapper for a function implementing receive or send traits.
///
/// Keeps the type alias overhead low by providing a single wrapper type that implements the
/// receive traits for all layers, where applicable.
pub struct FnHandler<F>(pub F);

/// The fixed sizes a layer occupies around its payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Descriptor {
    /// Bytes in front of the payload.
    pub header: usize,
    /// Bytes behind the payload.
    pub footer: usize,
}

/// The packet layering contract.
///
/// Implemented identically at every level of a stack. All offsets are resolved when a layer is
/// constructed, so every method is constant time for that layer and at most linear in the depth
/// of the stack when it forwards to its lower layer.
pub trait Layer {
    /// The header and footer sizes of this layer alone.
    fn descriptor(&self) -> Descriptor;

    /// The layer this one is stacked on, `None` at the physical framing.
    fn lower(&self) -> Option<&dyn Layer>;

    /// Offset of the first payload byte from the start of the message.
    ///
    /// Constant for all messages and all calls.
    fn payload_offset(&self) -> usize;

    /// The largest payload this layer can carry.
    ///
    /// Equal to the maximum payload of the lower layer minus the header and footer of this one.
    fn max_payload_len(&self) -> usize;

    /// The payload length currently recorded in the message, at most `max_payload_len`.
    fn payload_len(&self, message: &Message) -> usize;

    /// Record a payload length without touching the payload.
    ///
    /// Fails with `BadSize` when the length exceeds `max_payload_len`, leaving the message as it
    /// was.
    fn set_payload_len(&self, message: &mut Message, len: usize) -> Result<()>;

    /// Reset the header and footer of this layer and all layers below to a neutral state.
    ///
    /// Idempotent and without effect on the layers above. Use it before handing a message to a
    /// different transport.
    fn clear(&self, message: &mut Message);

    /// The payload of a given length, or `None` if it is longer than `max_payload_len`.
    fn payload<'m>(&self, message: &'m Message, len: usize) -> Option<&'m [u8]> {
        if len > self.max_payload_len() {
            return None;
        }

        let start = self.payload_offset();
        message.as_bytes().get(start..start + len)
    }

    /// The payload of a given length for writing, or `None` if it is longer than
    /// `max_payload_len`.
    fn payload_mut<'m>(&self, message: &'m mut Message, len: usize) -> Option<&'m mut [u8]> {
        if len > self.max_payload_len() {
            return None;
        }

        let start = self.payload_offset();
        message.as_bytes_mut().get_mut(start..start + len)
    }

    /// Iterate the descriptors of this layer and all layers below, top to bottom.
    fn descriptors(&self) -> Descriptors<'_> where Self: Sized {
        Descriptors { next: Some(self) }
    }
}

/// Iterator over the descriptors of a layer stack.
///
/// Returned by [`Layer::descriptors`].
///
/// [`Layer::descriptors`]: trait.Layer.html#method.descriptors
pub struct Descriptors<'l> {
    next: Option<&'l dyn Layer>,
}

impl Descriptor {
    /// Sum of header and footer.
    pub fn overhead(self) -> usize {
        self.header + self.footer
    }
}

impl<'l> Iterator for Descriptors<'l> {
    type Item = Descriptor;

    fn next(&mut self) -> Option<Descriptor> {
        let layer = self.next?;
        self.next = layer.lower();
        Some(layer.descriptor())
    }
}

/// Zero a range of the message.
pub(crate) fn zero(message: &mut Message, range: core::ops::Range<usize>) {
    for byte in &mut message.as_bytes_mut()[range] {
        *byte = 0;
    }
}
