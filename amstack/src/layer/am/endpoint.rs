use crate::layer::{Descriptor, Error, FnHandler, Layer, Result};
use crate::nic;
use crate::wire::{am_header, AmRepr, Message};
use crate::wire::am::HEADER_LEN;

use super::{Address, AmId, Group, Recv};
use super::packet::{Controller, InPacket, Packet};

/// The local identity of a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Identity {
    /// The address of this node.
    pub address: Address,
    /// The group this node belongs to, packets of other groups are ignored.
    pub group: Group,
}

/// The active message layer over some lower layer.
///
/// Places its header directly in front of its payload and records the payload length in it.
/// Received messages are only surfaced if their header is consistent with the payload of the
/// lower layer and their group matches the group of this node.
#[derive(Clone, Debug)]
pub struct ActiveMessage<L> {
    lower: L,
    identity: Identity,
    offset: usize,
    max_len: usize,
}

/// An active message layer borrowed for receiving.
pub struct Receiver<'l, L, H> {
    layer: &'l ActiveMessage<L>,

    /// The upper protocol receiver.
    handler: H,
}

impl<L: Layer> ActiveMessage<L> {
    /// Stack the active message layer onto `lower`.
    ///
    /// Fails with `BadSize` if the lower layer can not carry the header.
    pub fn new(lower: L, identity: Identity) -> Result<Self> {
        let max_len = lower.max_payload_len()
            .checked_sub(HEADER_LEN)
            .ok_or(Error::BadSize)?;
        let offset = lower.payload_offset() + HEADER_LEN;

        Ok(ActiveMessage {
            lower,
            identity,
            offset,
            // The length field is a single byte.
            max_len: max_len.min(usize::from(u8::max_value())),
        })
    }

    /// The layer this one is stacked on.
    pub fn inner(&self) -> &L {
        &self.lower
    }

    /// The local identity.
    pub fn identity(&self) -> Identity {
        self.identity
    }

    /// Change the local identity.
    pub fn set_identity(&mut self, identity: Identity) {
        net_debug!("am identity {} group {}", identity.address, identity.group);
        self.identity = identity;
    }

    /// Receive packets using this layer.
    pub fn recv<H>(&self, handler: H) -> Receiver<'_, L, H> {
        Receiver { layer: self, handler }
    }

    /// Receive packets using this layer and a function.
    pub fn recv_with<H>(&self, handler: H) -> Receiver<'_, L, FnHandler<H>> {
        self.recv(FnHandler(handler))
    }

    fn header<'m>(&self, message: &'m Message) -> &'m am_header {
        am_header::new_unchecked(&message.as_bytes()[self.offset - HEADER_LEN..])
    }

    fn header_mut<'m>(&self, message: &'m mut Message) -> &'m mut am_header {
        am_header::new_unchecked_mut(&mut message.as_bytes_mut()[self.offset - HEADER_LEN..])
    }

    /// Check a received message, returning its header on success.
    fn accept(&self, message: &Message) -> Result<AmRepr> {
        let available = self.lower.payload_len(message);
        let frame = &message.as_bytes()[self.offset - HEADER_LEN..][..available];
        let repr = match am_header::new_checked(frame).and_then(AmRepr::parse) {
            Ok(repr) => repr,
            Err(err) => {
                net_trace!("am: dropping frame of {} bytes: {}", available, err);
                return Err(err.into());
            },
        };

        if usize::from(repr.length) + HEADER_LEN != available {
            net_trace!("am: length {} does not match frame of {}", repr.length, available);
            return Err(Error::Fail);
        }

        if repr.group != self.identity.group {
            net_trace!("am: foreign group {} from {}", repr.group, repr.src_addr);
            return Err(Error::Fail);
        }

        Ok(repr)
    }
}

impl<L: Layer> Layer for ActiveMessage<L> {
    fn descriptor(&self) -> Descriptor {
        Descriptor { header: HEADER_LEN, footer: 0 }
    }

    fn lower(&self) -> Option<&dyn Layer> {
        Some(&self.lower)
    }

    fn payload_offset(&self) -> usize {
        self.offset
    }

    fn max_payload_len(&self) -> usize {
        self.max_len
    }

    fn payload_len(&self, message: &Message) -> usize {
        usize::from(self.header(message).length()).min(self.max_len)
    }

    fn set_payload_len(&self, message: &mut Message, len: usize) -> Result<()> {
        if len > self.max_len {
            return Err(Error::BadSize);
        }

        self.lower.set_payload_len(message, len + HEADER_LEN)?;
        self.header_mut(message).set_length(len as u8);
        Ok(())
    }

    fn clear(&self, message: &mut Message) {
        self.header_mut(message).clear();
        self.lower.clear(message);
    }
}

impl<L: Layer> Packet for ActiveMessage<L> {
    fn address(&self) -> Address {
        self.identity.address
    }

    fn local_group(&self) -> Group {
        self.identity.group
    }

    fn destination(&self, message: &Message) -> Address {
        self.header(message).dst_addr()
    }

    fn source(&self, message: &Message) -> Address {
        self.header(message).src_addr()
    }

    fn am_type(&self, message: &Message) -> AmId {
        self.header(message).am_type()
    }

    fn group(&self, message: &Message) -> Group {
        self.header(message).group()
    }

    fn set_destination(&self, message: &mut Message, address: Address) {
        self.header_mut(message).set_dst_addr(address)
    }

    fn set_source(&self, message: &mut Message, address: Address) {
        self.header_mut(message).set_src_addr(address)
    }

    fn set_am_type(&self, message: &mut Message, am_type: AmId) {
        self.header_mut(message).set_am_type(am_type)
    }

    fn set_group(&self, message: &mut Message, group: Group) {
        self.header_mut(message).set_group(group)
    }
}

impl<'a, L, H> nic::Recv<'a> for Receiver<'_, L, H>
where
    L: Layer,
    H: Recv<'a>,
{
    fn receive(&mut self, message: &'a mut Message) -> &'a mut Message {
        if self.layer.accept(message).is_err() {
            return message;
        }

        let control = Controller::new(self.layer);
        self.handler.receive(InPacket::new(control, message))
    }
}
