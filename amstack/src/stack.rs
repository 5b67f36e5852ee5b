//! Composes a device with the active message layer.
//!
//! The [`Stack`] is pure wiring. It owns one device, the active message layer stacked on the
//! framing the device reports, the dispatcher and the send queue, and forwards every operation to
//! the component responsible for it.
//!
//! ## Usage
//!
//! ```
//! use amstack::Stack;
//! use amstack::layer::am::{self, AmId, Class, Identity, Route, Slot};
//! use amstack::nic::Loopback;
//! use amstack::wire::Message;
//!
//! struct Ping(usize);
//!
//! impl<'a> am::Client<'a> for Ping {
//!     fn receive(&mut self, packet: am::InPacket<'_, 'a>) -> &'a mut Message {
//!         self.0 += 1;
//!         packet.into_message()
//!     }
//! }
//!
//! let mut air: [Message; 2] = Default::default();
//! let mut receive = Message::default();
//! let mut outgoing = Message::default();
//! let mut routes = [Route::default(); 1];
//! let mut slots: [Slot; 1] = Default::default();
//!
//! let device = Loopback::new(&mut air[..], &mut receive);
//! let identity = Identity { address: am::Address(1), group: am::Group(0x22) };
//! let mut stack = Stack::new(device, identity, &mut routes[..], &mut slots[..]).unwrap();
//!
//! let ping = stack.client(AmId(6)).unwrap();
//! stack.subscribe(AmId(6), Class::Receive, ping).unwrap();
//! stack.start().unwrap();
//!
//! stack.payload_mut(&mut outgoing, 4).unwrap().copy_from_slice(b"ping");
//! assert!(stack.send(ping, am::Address::BROADCAST, &mut outgoing, 4).is_ok());
//!
//! let mut clients = [Ping(0)];
//! for _ in 0..3 {
//!     stack.poll(&mut clients[..]).unwrap();
//! }
//! assert_eq!(clients[0].0, 1);
//! ```
//!
//! [`Stack`]: struct.Stack.html
use crate::layer::{Error, Frame, Layer, Result};
use crate::layer::am::{
    ActiveMessage, Address, AmId, Class, ClientId, Clients, Dispatcher, Identity, Packet as _,
    Route, SendError, SendQueue, Slot,
};
use crate::managed::Slice;
use crate::nic::Device;
use crate::wire::Message;

/// The number of frames received at most in one poll, unless changed.
pub const DEFAULT_RX_BURST: usize = 4;

/// An active message stack over one device.
pub struct Stack<'r, 'a, D> {
    device: D,
    am: ActiveMessage<Frame>,
    dispatcher: Dispatcher<'r>,
    queue: SendQueue<'r, 'a>,
    started: bool,
    rx_burst: usize,
}

impl<'r, 'a, D: Device<'a>> Stack<'r, 'a, D> {
    /// Compose a stack over a device.
    ///
    /// The storage for the dispatch table and the send slots bounds the number of protocol types
    /// and clients. Fails with `BadSize` if the framing of the device does not fit into a
    /// message.
    pub fn new<R, S>(device: D, identity: Identity, routes: R, slots: S) -> Result<Self>
    where
        R: Into<Slice<'r, Route>>,
        S: Into<Slice<'r, Slot<'a>>>,
    {
        let frame = Frame::new(device.personality().framing())?;
        let am = ActiveMessage::new(frame, identity)?;

        Ok(Stack {
            device,
            am,
            dispatcher: Dispatcher::new(routes),
            queue: SendQueue::new(slots),
            started: false,
            rx_burst: DEFAULT_RX_BURST,
        })
    }

    /// Create a new client sending with the given protocol type.
    ///
    /// Only possible before the stack is started. Fails with `Exhausted` if there is no slot
    /// left.
    pub fn client(&mut self, am_type: AmId) -> Result<ClientId> {
        if self.started {
            return Err(Error::Fail);
        }

        self.queue.client(am_type)
    }

    /// Subscribe a client to a class of received packets of a protocol type.
    ///
    /// Only possible before the stack is started. Fails with `Conflict` if the class is already
    /// claimed for the protocol type, see `Dispatcher::register`.
    pub fn subscribe(&mut self, am_type: AmId, class: Class, client: ClientId) -> Result<()> {
        if self.started || client.index() >= self.queue.len() {
            return Err(Error::Fail);
        }

        self.dispatcher.register(am_type, class, client)
    }

    /// Send a message from the slot of a client.
    ///
    /// The payload must already be in place, see `payload_mut`. On success the message is given
    /// up until the completion is delivered to the client. Sends are accepted while the stack is
    /// stopped and transmitted once it is started.
    pub fn send(&mut self, client: ClientId, destination: Address, message: &'a mut Message, len: usize)
        -> core::result::Result<(), SendError<'a>>
    {
        self.queue.send(&self.am, client, destination, message, len)
    }

    /// Cancel the send of a client that was not yet handed to the device.
    ///
    /// On success the completion with `Cancelled` is delivered during the next poll.
    pub fn cancel(&mut self, client: ClientId) -> Result<()> {
        self.queue.cancel(client)
    }

    /// Whether the client has a send outstanding.
    pub fn is_busy(&self, client: ClientId) -> bool {
        self.queue.is_busy(client)
    }

    /// The active message payload of a given length.
    ///
    /// Returns `None` if the length exceeds the maximum payload.
    pub fn payload<'m>(&self, message: &'m Message, len: usize) -> Option<&'m [u8]> {
        self.am.payload(message, len)
    }

    /// The active message payload of a given length, for writing.
    pub fn payload_mut<'m>(&self, message: &'m mut Message, len: usize) -> Option<&'m mut [u8]> {
        self.am.payload_mut(message, len)
    }

    /// The largest payload of an active message.
    pub fn max_payload_len(&self) -> usize {
        self.am.max_payload_len()
    }

    /// Reset all headers of a message.
    pub fn clear(&self, message: &mut Message) {
        self.am.clear(message)
    }

    /// The active message layer, for field access.
    pub fn packet(&self) -> &ActiveMessage<Frame> {
        &self.am
    }

    /// The local identity.
    pub fn identity(&self) -> Identity {
        self.am.identity()
    }

    /// Change the local identity.
    pub fn set_identity(&mut self, identity: Identity) {
        self.am.set_identity(identity)
    }

    /// Change the number of frames received at most in one poll.
    pub fn set_rx_burst(&mut self, rx_burst: usize) {
        self.rx_burst = rx_burst;
    }

    /// The device.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// The device, mutably.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Whether the stack is started.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Start the device and the datapath.
    ///
    /// Checks that the dispatch table only refers to existing clients. Starting a started stack
    /// does nothing.
    pub fn start(&mut self) -> Result<()> {
        if self.started {
            return Ok(());
        }

        self.dispatcher.validate(self.queue.len())?;
        self.device.start()?;
        self.started = true;
        net_debug!("stack started as {} in group {}", self.am.address(), self.am.local_group());
        Ok(())
    }

    /// Stop the datapath and the device.
    ///
    /// Pending sends stay queued, a send already handed to the device completes after the next
    /// start.
    pub fn stop(&mut self) -> Result<()> {
        if !self.started {
            return Ok(());
        }

        self.device.stop()?;
        self.started = false;
        net_debug!("stack stopped");
        Ok(())
    }

    /// Process all events of the stack.
    ///
    /// Delivers completions of cancelled sends, lets the device transmit one message and receive
    /// up to the burst of frames. Returns the number of events processed, zero while stopped.
    pub fn poll<C>(&mut self, clients: &mut C) -> Result<usize>
        where C: Clients<'a> + ?Sized,
    {
        if !self.started {
            return Ok(0);
        }

        let promiscuous = self.device.personality().capabilities().promiscuous();

        let mut count = self.queue.flush(&self.am, &mut *clients);
        count += self.device.tx(1, self.queue.sender(&self.am, &mut *clients))?;

        let routing = self.dispatcher.recv(&mut *clients, promiscuous);
        count += self.device.rx(self.rx_burst, self.am.recv(routing))?;
        Ok(count)
    }
}
