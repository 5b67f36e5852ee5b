use crate::layer::{Error, Result};
use crate::managed::{List, Partial, Slice};
use crate::wire::Message;

use super::{AmId, ClientId, Clients, InPacket, Recv};

/// The class of packets a handler is registered for.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Class {
    /// Packets addressed to this node or broadcast.
    Receive,
    /// Packets addressed to other nodes, overheard on a promiscuous link.
    Snoop,
    /// Packets of any destination.
    ///
    /// Claims both other classes of the protocol type. The client gets all of them through
    /// `Client::receive`.
    Any,
}

/// The handlers of one protocol type.
///
/// Provide the storage for the dispatch table as an array of `Route::default()`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Route {
    am_type: AmId,
    receive: Option<ClientId>,
    snoop: Option<ClientId>,
    any: Option<ClientId>,
}

/// Routes received packets to clients by protocol type and destination.
///
/// The table is filled during setup. Each protocol type has at most one handler for packets
/// destined to this node and at most one for overheard packets, conflicting registrations are
/// refused. Exactly one handler is called for every packet, packets without a handler are
/// dropped by handing their buffer straight back.
pub struct Dispatcher<'r> {
    routes: List<'r, Route>,
}

/// A dispatcher borrowed for receiving.
pub struct Routing<'d, 'c, C: ?Sized> {
    dispatcher: &'d Dispatcher<'d>,
    clients: &'c mut C,
    promiscuous: bool,
}

impl Route {
    /// The protocol type routed.
    pub fn am_type(&self) -> AmId {
        self.am_type
    }

    /// The handler of a class, if registered.
    pub fn handler(&self, class: Class) -> Option<ClientId> {
        match class {
            Class::Receive => self.receive,
            Class::Snoop => self.snoop,
            Class::Any => self.any,
        }
    }

    fn claim(&mut self, class: Class, client: ClientId) -> Result<()> {
        let taken = match class {
            Class::Receive => self.receive.is_some() || self.any.is_some(),
            Class::Snoop => self.snoop.is_some() || self.any.is_some(),
            Class::Any => self.receive.is_some() || self.snoop.is_some() || self.any.is_some(),
        };

        if taken {
            return Err(Error::Conflict);
        }

        match class {
            Class::Receive => self.receive = Some(client),
            Class::Snoop => self.snoop = Some(client),
            Class::Any => self.any = Some(client),
        }

        Ok(())
    }
}

impl<'r> Dispatcher<'r> {
    /// Create an empty dispatch table.
    pub fn new<S>(storage: S) -> Self
        where S: Into<Slice<'r, Route>>,
    {
        Dispatcher {
            routes: Partial::new(storage.into()),
        }
    }

    /// Register a client for a class of packets of a protocol type.
    ///
    /// Fails with `Conflict` if the class is already claimed, with `Exhausted` if the protocol
    /// type is new and the table is full.
    pub fn register(&mut self, am_type: AmId, class: Class, client: ClientId) -> Result<()> {
        let index = match self.routes.iter().position(|route| route.am_type == am_type) {
            Some(index) => index,
            None => {
                let route = self.routes.push().ok_or(Error::Exhausted)?;
                *route = Route { am_type, ..Route::default() };
                self.routes.len() - 1
            },
        };

        let result = self.routes[index].claim(class, client);
        match result {
            Ok(()) => net_debug!("dispatch {} {:?} to {}", am_type, class, client),
            Err(_) => net_debug!("dispatch {} {:?} already claimed", am_type, class),
        }
        result
    }

    /// Check that every registered handler refers to one of `count` clients.
    pub fn validate(&self, count: usize) -> Result<()> {
        let unknown = self.routes.iter()
            .flat_map(|route| route.receive.iter().chain(&route.snoop).chain(&route.any))
            .any(|client| client.index() >= count);
        if unknown {
            Err(Error::Fail)
        } else {
            Ok(())
        }
    }

    /// The route of a protocol type.
    pub fn route(&self, am_type: AmId) -> Option<&Route> {
        self.routes.iter().find(|route| route.am_type == am_type)
    }

    /// The client to deliver a packet to.
    ///
    /// `destined` tells whether the packet is addressed to this node, `promiscuous` whether
    /// overheard packets are delivered at all. Returns the client and the class it was registered
    /// with.
    pub fn lookup(&self, am_type: AmId, destined: bool, promiscuous: bool)
        -> Option<(ClientId, Class)>
    {
        let route = self.route(am_type)?;
        let (class, client) = if destined {
            (Class::Receive, route.receive)
        } else if promiscuous {
            (Class::Snoop, route.snoop)
        } else {
            return None;
        };

        client.map(|client| (client, class))
            .or_else(|| route.any.map(|client| (client, Class::Any)))
    }

    /// Borrow the dispatcher for receiving, delivering to `clients`.
    pub fn recv<'d, 'c, C>(&'d self, clients: &'c mut C, promiscuous: bool) -> Routing<'d, 'c, C>
        where C: ?Sized,
    {
        Routing { dispatcher: self, clients, promiscuous }
    }
}

impl<'a, C> Recv<'a> for Routing<'_, '_, C>
    where C: Clients<'a> + ?Sized,
{
    fn receive(&mut self, packet: InPacket<'_, 'a>) -> &'a mut Message {
        let am_type = packet.am_type();
        let destined = packet.is_for_me();

        let (id, class) = match self.dispatcher.lookup(am_type, destined, self.promiscuous) {
            Some(found) => found,
            None => {
                net_trace!("dispatch: no handler for {} to {}", am_type, packet.destination());
                return packet.into_message();
            },
        };

        let client = match self.clients.client(id) {
            Some(client) => client,
            None => {
                net_debug!("dispatch: {} is not a known client", id);
                return packet.into_message();
            },
        };

        match class {
            Class::Snoop => client.snoop(packet),
            Class::Receive | Class::Any => client.receive(packet),
        }
    }
}
