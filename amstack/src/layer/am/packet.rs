use crate::layer::{Layer, Result};
use crate::time::Instant;
use crate::wire::Message;

use super::{Address, AmId, Group};
use super::queue::{ClientId, SendError, Slot};

/// Access to the active message fields of a message.
///
/// Provides a getter and a setter for every header field so that buffering components can store
/// and restore the complete state of a packet in place. The local identity of the node is
/// readable through the same interface.
pub trait Packet: Layer {
    /// The address of this node.
    fn address(&self) -> Address;

    /// The group of this node.
    fn local_group(&self) -> Group;

    /// The destination address of a message.
    fn destination(&self, message: &Message) -> Address;

    /// The source address of a message.
    fn source(&self, message: &Message) -> Address;

    /// The protocol type of a message.
    fn am_type(&self, message: &Message) -> AmId;

    /// The group of a message.
    fn group(&self, message: &Message) -> Group;

    /// Set the destination address of a message.
    fn set_destination(&self, message: &mut Message, address: Address);

    /// Set the source address of a message.
    fn set_source(&self, message: &mut Message, address: Address);

    /// Set the protocol type of a message.
    fn set_am_type(&self, message: &mut Message, am_type: AmId);

    /// Set the group of a message.
    fn set_group(&self, message: &mut Message, group: Group);

    /// Whether the message is addressed to this node, directly or by broadcast.
    fn is_for_me(&self, message: &Message) -> bool {
        let destination = self.destination(message);
        destination == self.address() || destination.is_broadcast()
    }

    /// Ask the link to acknowledge the transmission of the message.
    fn request_ack(&self, message: &mut Message) {
        message.metadata_mut().ack_requested = true;
    }

    /// Whether the link reported an acknowledgement for the last transmission.
    fn was_acked(&self, message: &Message) -> bool {
        message.metadata().acked
    }
}

/// Fill in the header of an outgoing message.
///
/// Leaves the message untouched if the length is too large.
pub(crate) fn prepare(
    packet: &dyn Packet,
    message: &mut Message,
    destination: Address,
    am_type: AmId,
    len: usize,
) -> Result<()> {
    packet.set_payload_len(message, len)?;
    packet.set_destination(message, destination);
    packet.set_source(message, packet.address());
    packet.set_group(message, packet.local_group());
    packet.set_am_type(message, am_type);
    message.metadata_mut().acked = false;
    Ok(())
}

/// A reference to the active message layer a packet was processed by.
#[derive(Clone, Copy)]
pub struct Controller<'p> {
    packet: &'p dyn Packet,
}

/// An incoming active message.
///
/// Holds the exclusive borrow of the receive buffer. Either return it through `into_message` or
/// keep it and return a spare buffer instead.
pub struct InPacket<'p, 'a> {
    /// The layer the packet was received by.
    pub control: Controller<'p>,

    /// The receive buffer.
    pub message: &'a mut Message,
}

/// The completion of a send.
pub struct Completion<'s, 'a> {
    /// Success, `Cancelled` or `Transmission`.
    pub result: Result<()>,

    /// The buffer that was given up by `send`.
    pub message: &'a mut Message,

    /// The send slot of the client, free again.
    pub control: SendControl<'s, 'a>,
}

/// A handle to a free send slot, used to send again directly from a completion.
pub struct SendControl<'s, 'a> {
    pub(crate) packet: &'s dyn Packet,
    pub(crate) slot: &'s mut Slot<'a>,
    pub(crate) client: ClientId,
}

impl<'p> Controller<'p> {
    pub(crate) fn new(packet: &'p dyn Packet) -> Self {
        Controller { packet }
    }

    /// The field accessor of the layer.
    pub fn packet(&self) -> &'p dyn Packet {
        self.packet
    }
}

impl<'p, 'a> InPacket<'p, 'a> {
    pub(crate) fn new(control: Controller<'p>, message: &'a mut Message) -> Self {
        InPacket { control, message }
    }

    /// The payload of the active message.
    pub fn payload(&self) -> &[u8] {
        let packet = self.control.packet;
        let len = packet.payload_len(self.message);
        packet.payload(self.message, len).unwrap_or(&[])
    }

    /// The payload of the active message, for writing.
    pub fn payload_mut(&mut self) -> &mut [u8] {
        let packet = self.control.packet;
        let len = packet.payload_len(self.message);
        packet.payload_mut(self.message, len).unwrap_or(&mut [])
    }

    /// The sender.
    pub fn source(&self) -> Address {
        self.control.packet.source(self.message)
    }

    /// The destination, this node, broadcast or another node when overheard.
    pub fn destination(&self) -> Address {
        self.control.packet.destination(self.message)
    }

    /// The protocol type.
    pub fn am_type(&self) -> AmId {
        self.control.packet.am_type(self.message)
    }

    /// Whether the packet is addressed to this node.
    pub fn is_for_me(&self) -> bool {
        self.control.packet.is_for_me(self.message)
    }

    /// The time of reception, if the link provides one.
    pub fn timestamp(&self) -> Option<Instant> {
        self.message.metadata().timestamp
    }

    /// Give up the packet and return its buffer.
    pub fn into_message(self) -> &'a mut Message {
        self.message
    }
}

impl<'s, 'a> SendControl<'s, 'a> {
    /// The client owning the slot.
    pub fn client(&self) -> ClientId {
        self.client
    }

    /// The field accessor of the layer.
    pub fn packet(&self) -> &'s dyn Packet {
        self.packet
    }

    /// The payload region of a message for a given length.
    ///
    /// Returns `None` if the length exceeds the maximum payload.
    pub fn payload_mut<'m>(&self, message: &'m mut Message, len: usize) -> Option<&'m mut [u8]> {
        self.packet.payload_mut(message, len)
    }

    /// Send a message from the now free slot.
    ///
    /// The same rules as for `SendQueue::send` apply. In particular it fails with `Busy` when
    /// called a second time from the same completion.
    pub fn send(&mut self, destination: Address, message: &'a mut Message, len: usize)
        -> core::result::Result<(), SendError<'a>>
    {
        self.slot.accept(self.packet, self.client, destination, message, len)
    }
}
