use core::{fmt, mem};

use crate::layer::{Error, Result};
use crate::managed::{List, Partial, Slice};
use crate::nic;
use crate::wire::Message;

use super::{Address, AmId, Clients};
use super::packet::{prepare, Completion, Packet, SendControl};

/// Identifies a client and its send slot.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClientId(u8);

/// The send slot of one client.
///
/// Holds at most one message. Provide the storage for all slots when creating the queue, for
/// example as an array of `Slot::default()`.
#[derive(Debug, Default)]
pub struct Slot<'a> {
    am_type: AmId,
    state: State<'a>,
}

#[derive(Debug)]
enum State<'a> {
    /// No send outstanding.
    Idle,
    /// Waiting for the device.
    Pending(&'a mut Message),
    /// Handed to the device, which owns the message until it completes.
    Committed,
    /// The outcome is determined but not yet delivered to the client.
    Done(&'a mut Message, Result<()>),
}

/// A send that was refused, returning the message.
pub struct SendError<'a> {
    /// Why the send was refused.
    pub error: Error,

    /// The message, unchanged.
    pub message: &'a mut Message,
}

/// Shares one transmitter between all clients.
///
/// Each client owns exactly one slot. The device pulls messages from the queue in round robin
/// order, starting after the client that was served last and skipping clients without a pending
/// message. A client continuously sending is thus served at least once in every round over all
/// clients. At most one message is with the device at any time.
pub struct SendQueue<'r, 'a> {
    slots: List<'r, Slot<'a>>,

    /// The slot to look at first for the next transmission.
    cursor: usize,

    /// The client whose message is with the device.
    in_flight: Option<ClientId>,
}

/// A send queue borrowed by a device for transmission.
pub struct Sender<'q, 'r, 'a, C: ?Sized> {
    queue: &'q mut SendQueue<'r, 'a>,
    packet: &'q dyn Packet,
    clients: &'q mut C,
}

impl ClientId {
    /// The position of the client, matching the order of creation.
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "client{}", self.0)
    }
}

impl<'a> Default for State<'a> {
    fn default() -> Self {
        State::Idle
    }
}

impl<'a> State<'a> {
    fn take_pending(&mut self) -> Option<&'a mut Message> {
        match mem::replace(self, State::Committed) {
            State::Pending(message) => Some(message),
            other => {
                *self = other;
                None
            },
        }
    }

    fn take_done(&mut self) -> Option<(&'a mut Message, Result<()>)> {
        match mem::replace(self, State::Idle) {
            State::Done(message, result) => Some((message, result)),
            other => {
                *self = other;
                None
            },
        }
    }
}

impl<'a> Slot<'a> {
    /// Whether a send of this slot has not yet completed.
    pub fn is_busy(&self) -> bool {
        match self.state {
            State::Idle => false,
            _ => true,
        }
    }

    /// The protocol type this slot sends with.
    pub fn am_type(&self) -> AmId {
        self.am_type
    }

    pub(crate) fn accept(
        &mut self,
        packet: &dyn Packet,
        client: ClientId,
        destination: Address,
        message: &'a mut Message,
        len: usize,
    ) -> core::result::Result<(), SendError<'a>> {
        if self.is_busy() {
            net_trace!("{}: send refused, slot busy", client);
            return Err(SendError { error: Error::Busy, message });
        }

        if let Err(error) = prepare(packet, message, destination, self.am_type, len) {
            net_trace!("{}: send of {} bytes refused: {}", client, len, error);
            return Err(SendError { error, message });
        }

        net_trace!("{}: queued {} bytes to {}", client, len, destination);
        self.state = State::Pending(message);
        Ok(())
    }
}

impl<'r, 'a> SendQueue<'r, 'a> {
    /// Create an empty queue with storage for the slots of all clients.
    pub fn new<S>(storage: S) -> Self
        where S: Into<Slice<'r, Slot<'a>>>,
    {
        SendQueue {
            slots: Partial::new(storage.into()),
            cursor: 0,
            in_flight: None,
        }
    }

    /// Create the slot of a new client sending with a protocol type.
    ///
    /// Fails with `Exhausted` when the storage holds no further slot.
    pub fn client(&mut self, am_type: AmId) -> Result<ClientId> {
        let index = self.slots.len();
        if index > usize::from(u8::max_value()) {
            return Err(Error::Exhausted);
        }

        let slot = self.slots.push().ok_or(Error::Exhausted)?;
        *slot = Slot { am_type, state: State::Idle };
        Ok(ClientId(index as u8))
    }

    /// The number of clients.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether there are no clients yet.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether the client has a send outstanding.
    ///
    /// False for unknown clients.
    pub fn is_busy(&self, client: ClientId) -> bool {
        self.slots.get(client.index()).map_or(false, Slot::is_busy)
    }

    /// Queue a message of a client for transmission.
    ///
    /// Writes the active message header with the protocol type of the client and hands the
    /// message to the queue until the completion. Fails with `Busy` when the client already has a
    /// send outstanding, `BadSize` when `len` exceeds the maximum payload of `packet` and `Fail`
    /// for an unknown client. A refused message is returned unchanged.
    pub fn send(
        &mut self,
        packet: &dyn Packet,
        client: ClientId,
        destination: Address,
        message: &'a mut Message,
        len: usize,
    ) -> core::result::Result<(), SendError<'a>> {
        match self.slots.get_mut(client.index()) {
            Some(slot) => slot.accept(packet, client, destination, message, len),
            None => Err(SendError { error: Error::Fail, message }),
        }
    }

    /// Withdraw the pending message of a client.
    ///
    /// Succeeds only while the message waits for the device. The completion with `Cancelled` is
    /// then delivered on the next flush. Fails with `Fail` if nothing is pending, in particular
    /// when the message was already handed to the device, whose completion proceeds as normal.
    pub fn cancel(&mut self, client: ClientId) -> Result<()> {
        let slot = self.slots.get_mut(client.index()).ok_or(Error::Fail)?;
        match slot.state.take_pending() {
            Some(message) => {
                net_trace!("{}: send cancelled", client);
                slot.state = State::Done(message, Err(Error::Cancelled));
                Ok(())
            },
            None => {
                net_trace!("{}: nothing to cancel", client);
                Err(Error::Fail)
            },
        }
    }

    /// Deliver all determined but undelivered completions.
    ///
    /// Returns the number of completions delivered. A completion for a client that is missing
    /// from `clients` stays in its slot.
    pub fn flush<C>(&mut self, packet: &dyn Packet, clients: &mut C) -> usize
        where C: Clients<'a> + ?Sized,
    {
        let mut count = 0;
        for index in 0..self.slots.len() {
            let client = ClientId(index as u8);
            let slot = &mut self.slots[index];
            if let Some((message, result)) = slot.state.take_done() {
                deliver(packet, clients, client, slot, message, result);
                count += 1;
            }
        }
        count
    }

    /// Borrow the queue as the source of frames for a device.
    pub fn sender<'q, C>(&'q mut self, packet: &'q dyn Packet, clients: &'q mut C)
        -> Sender<'q, 'r, 'a, C>
        where C: Clients<'a> + ?Sized,
    {
        Sender { queue: self, packet, clients }
    }

    /// Commit the next pending message in round robin order.
    ///
    /// Nothing is committed while the device still owns a message, even if it asks again.
    fn next_pending(&mut self) -> Option<(ClientId, &'a mut Message)> {
        if let Some(client) = self.in_flight {
            net_trace!("{}: still with the device", client);
            return None;
        }

        let count = self.slots.len();
        for step in 0..count {
            let index = (self.cursor + step) % count;
            if let Some(message) = self.slots[index].state.take_pending() {
                let client = ClientId(index as u8);
                self.cursor = (index + 1) % count;
                self.in_flight = Some(client);
                return Some((client, message));
            }
        }
        None
    }
}

/// Hand a completion to its client, or keep it in the slot if the client is unknown.
fn deliver<'a, C>(
    packet: &dyn Packet,
    clients: &mut C,
    client: ClientId,
    slot: &mut Slot<'a>,
    message: &'a mut Message,
    result: Result<()>,
)
    where C: Clients<'a> + ?Sized,
{
    match clients.client(client) {
        Some(handler) => {
            net_trace!("{}: send done {:?}", client, result);
            handler.send_done(Completion {
                result,
                message,
                control: SendControl { packet, slot, client },
            });
        },
        None => {
            net_debug!("{}: no client to complete send", client);
            slot.state = State::Done(message, result);
        },
    }
}

impl<'a, C> nic::Send<'a> for Sender<'_, '_, 'a, C>
    where C: Clients<'a> + ?Sized,
{
    fn next(&mut self) -> Option<&'a mut Message> {
        let (client, message) = self.queue.next_pending()?;
        net_trace!("{}: committed to device", client);
        Some(message)
    }

    fn done(&mut self, message: &'a mut Message, result: Result<()>) {
        let client = match self.queue.in_flight.take() {
            Some(client) => client,
            None => {
                net_debug!("completion without a committed send");
                return;
            },
        };

        let slot = &mut self.queue.slots[client.index()];
        slot.state = State::Idle;
        deliver(self.packet, &mut *self.clients, client, slot, message, result);
    }
}
