//! The active message layer.
//!
//! An active message is a single hop, unreliable packet carrying a destination address, the
//! address of its sender, a group and a protocol type. The layer itself only frames and
//! interprets these fields. Demultiplexing to clients by protocol type happens in the
//! [`Dispatcher`], sharing the transmitter between clients in the [`SendQueue`].
//!
//! Clients are not stored inside the layer. They are provided by the caller on each poll through
//! the [`Clients`] trait and identified by the [`ClientId`] handed out when their send slot was
//! created. All registrations are done during setup, nothing is allocated afterwards.
//!
//! [`Dispatcher`]: struct.Dispatcher.html
//! [`SendQueue`]: struct.SendQueue.html
//! [`Clients`]: trait.Clients.html
//! [`ClientId`]: struct.ClientId.html
use crate::wire::Message;
use super::FnHandler;

mod dispatch;
mod endpoint;
mod packet;
mod queue;

pub use dispatch::{
    Class,
    Dispatcher,
    Route,
    Routing,
};

pub use endpoint::{
    ActiveMessage,
    Identity,
    Receiver,
};

pub use packet::{
    Completion,
    Controller,
    InPacket,
    Packet,
    SendControl,
};

pub use queue::{
    ClientId,
    SendError,
    SendQueue,
    Sender,
    Slot,
};

pub use crate::wire::{
    AmAddress as Address,
    AmGroup as Group,
    AmId,
};

/// An active message receiver.
///
/// Called with every packet that passed the checks of the layer. It must return a buffer before
/// it returns. If it returns a buffer other than the one inside the packet, it becomes the owner
/// of that packet and must not expect the returned buffer back.
pub trait Recv<'a> {
    /// Inspect one incoming packet and hand back a buffer for the next one.
    fn receive(&mut self, packet: InPacket<'_, 'a>) -> &'a mut Message;
}

/// A client of the active message stack.
///
/// Receives packets of the protocol types it subscribed to and the completion of its own sends.
/// All methods have defaults that drop the packet or ignore the completion, implement only what
/// the client subscribed to.
pub trait Client<'a> {
    /// A packet addressed to this node or broadcast.
    ///
    /// Also called for overheard packets if the client is registered for any destination, use
    /// `InPacket::is_for_me` to tell them apart.
    fn receive(&mut self, packet: InPacket<'_, 'a>) -> &'a mut Message {
        packet.into_message()
    }

    /// A packet addressed to another node, overheard on a promiscuous link.
    fn snoop(&mut self, packet: InPacket<'_, 'a>) -> &'a mut Message {
        packet.into_message()
    }

    /// The outcome of the send of this client.
    ///
    /// Called exactly once for every accepted send, with the buffer that was given up for it.
    fn send_done(&mut self, completion: Completion<'_, 'a>) {
        let _ = completion;
    }
}

/// The set of clients of a stack, looked up by their id.
pub trait Clients<'a> {
    /// Get the client owning a send slot.
    fn client(&mut self, id: ClientId) -> Option<&mut dyn Client<'a>>;
}

impl<'a, C: Client<'a>> Clients<'a> for [C] {
    fn client(&mut self, id: ClientId) -> Option<&mut dyn Client<'a>> {
        self.get_mut(id.index())
            .map(|client| client as &mut dyn Client<'a>)
    }
}

impl<'a, C: Clients<'a> + ?Sized> Clients<'a> for &'_ mut C {
    fn client(&mut self, id: ClientId) -> Option<&mut dyn Client<'a>> {
        (**self).client(id)
    }
}

impl<'a, C: Client<'a> + ?Sized> Client<'a> for &'_ mut C {
    fn receive(&mut self, packet: InPacket<'_, 'a>) -> &'a mut Message {
        (**self).receive(packet)
    }

    fn snoop(&mut self, packet: InPacket<'_, 'a>) -> &'a mut Message {
        (**self).snoop(packet)
    }

    fn send_done(&mut self, completion: Completion<'_, 'a>) {
        (**self).send_done(completion)
    }
}

impl<'a, F> Recv<'a> for FnHandler<F>
    where F: for<'p> FnMut(InPacket<'p, 'a>) -> &'a mut Message
{
    fn receive(&mut self, packet: InPacket<'_, 'a>) -> &'a mut Message {
        self.0(packet)
    }
}

impl<'a, R: Recv<'a> + ?Sized> Recv<'a> for &'_ mut R {
    fn receive(&mut self, packet: InPacket<'_, 'a>) -> &'a mut Message {
        (**self).receive(packet)
    }
}
