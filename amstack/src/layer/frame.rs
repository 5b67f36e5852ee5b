use crate::wire::{Message, ANCHOR, DATA_CAPACITY, FOOTER_CAPACITY, HEADER_CAPACITY};
use super::{zero, Descriptor, Error, Layer, Result};

/// The framing of the physical link.
///
/// The bottom of every layer stack. Its payload always starts at the anchor of the message and
/// its header is placed immediately in front of it, so the header start depends on the framing of
/// the device. The first header byte holds the length of the link payload, the remaining header
/// bytes and the footer are reserved for the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    descriptor: Descriptor,
}

impl Frame {
    /// Describe the framing of a device.
    ///
    /// Fails with `BadSize` if the header has no room for the length byte or header and footer
    /// do not fit into the reserved regions of a message.
    pub fn new(descriptor: Descriptor) -> Result<Self> {
        if descriptor.header == 0
            || descriptor.header > HEADER_CAPACITY
            || descriptor.footer > FOOTER_CAPACITY
        {
            net_debug!("framing {:?} does not fit the message regions", descriptor);
            return Err(Error::BadSize);
        }

        Ok(Frame { descriptor })
    }

    /// Offset of the first byte on the air.
    pub fn start(&self) -> usize {
        ANCHOR - self.descriptor.header
    }

    /// The number of bytes the device transmits for a message.
    pub fn frame_len(&self, message: &Message) -> usize {
        self.descriptor.overhead() + self.payload_len(message)
    }

    /// The header bytes reserved for the device, behind the length byte.
    pub fn header<'m>(&self, message: &'m Message) -> &'m [u8] {
        &message.as_bytes()[self.start() + 1..ANCHOR]
    }

    /// The mutable header bytes reserved for the device.
    pub fn header_mut<'m>(&self, message: &'m mut Message) -> &'m mut [u8] {
        let start = self.start();
        &mut message.as_bytes_mut()[start + 1..ANCHOR]
    }

    /// The footer of the frame, at the start of the footer region.
    pub fn footer<'m>(&self, message: &'m Message) -> &'m [u8] {
        let start = ANCHOR + DATA_CAPACITY;
        &message.as_bytes()[start..start + self.descriptor.footer]
    }

    /// The mutable footer of the frame.
    pub fn footer_mut<'m>(&self, message: &'m mut Message) -> &'m mut [u8] {
        let start = ANCHOR + DATA_CAPACITY;
        &mut message.as_bytes_mut()[start..start + self.descriptor.footer]
    }
}

impl Layer for Frame {
    fn descriptor(&self) -> Descriptor {
        self.descriptor
    }

    fn lower(&self) -> Option<&dyn Layer> {
        None
    }

    fn payload_offset(&self) -> usize {
        ANCHOR
    }

    fn max_payload_len(&self) -> usize {
        DATA_CAPACITY
    }

    fn payload_len(&self, message: &Message) -> usize {
        usize::from(message.as_bytes()[self.start()]).min(DATA_CAPACITY)
    }

    fn set_payload_len(&self, message: &mut Message, len: usize) -> Result<()> {
        if len > DATA_CAPACITY {
            return Err(Error::BadSize);
        }

        let start = self.start();
        message.as_bytes_mut()[start] = len as u8;
        Ok(())
    }

    fn clear(&self, message: &mut Message) {
        zero(message, self.start()..ANCHOR);
        let footer = ANCHOR + DATA_CAPACITY;
        zero(message, footer..footer + self.descriptor.footer);
    }
}
