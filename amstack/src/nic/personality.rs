use crate::layer::Descriptor;

/// A general description of a device.
///
/// The interaction with these happens purely via methods. This leaves the implementation open to
/// additions in the future, for transceivers with more hardware support.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Personality {
    capabilities: Capabilities,
    framing: Descriptor,
}

/// Operations supported natively by the transceiver.
///
/// The usage for a `Device` is simply to instantiate a baseline with no support and then enable
/// those features that the hardware provides.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    promiscuous: bool,
    acknowledgements: bool,
}

impl Personality {
    /// A personality with no extras.
    ///
    /// Advertises no capabilities and the smallest possible framing, a single length byte in
    /// front of the payload.
    pub fn baseline() -> Self {
        Personality {
            capabilities: Capabilities::no_support(),
            framing: Descriptor { header: 1, footer: 0 },
        }
    }

    /// Check the capabilities of the interface.
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Mutably get the capabilities which allows for modifications.
    pub fn capabilities_mut(&mut self) -> &mut Capabilities {
        &mut self.capabilities
    }

    /// The header and footer of the physical frame.
    pub fn framing(&self) -> Descriptor {
        self.framing
    }

    /// Change the framing of the physical frame.
    pub fn set_framing(&mut self, framing: Descriptor) {
        self.framing = framing;
    }
}

impl Capabilities {
    /// Instantiates capabilities of a transceiver without any extras.
    pub fn no_support() -> Self {
        Capabilities::default()
    }

    /// Whether frames addressed to other nodes are received.
    pub fn promiscuous(&self) -> bool {
        self.promiscuous
    }

    /// Set whether frames addressed to other nodes are received.
    pub fn set_promiscuous(&mut self, promiscuous: bool) {
        self.promiscuous = promiscuous;
    }

    /// Whether the link acknowledges transmissions on request.
    pub fn acknowledgements(&self) -> bool {
        self.acknowledgements
    }

    /// Set whether the link acknowledges transmissions on request.
    pub fn set_acknowledgements(&mut self, acknowledgements: bool) {
        self.acknowledgements = acknowledgements;
    }
}
