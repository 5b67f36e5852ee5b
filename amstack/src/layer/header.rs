use crate::wire::Message;
use super::{zero, Descriptor, Error, Layer, Result};

/// A layer of fixed header and footer size with opaque content.
///
/// The header is placed directly in front of the payload and the footer directly behind it,
/// both within the payload of the lower layer. Protocols that only need some bytes of their own
/// without addressing, a sequence number or a checksum, are built from this.
#[derive(Clone, Debug)]
pub struct Header<L> {
    lower: L,
    descriptor: Descriptor,
    offset: usize,
    max_len: usize,
}

impl<L: Layer> Header<L> {
    /// Stack a layer with the given header and footer sizes onto `lower`.
    ///
    /// Fails with `BadSize` if the header and footer do not fit into the maximum payload of the
    /// lower layer.
    pub fn new(lower: L, descriptor: Descriptor) -> Result<Self> {
        let max_len = lower.max_payload_len()
            .checked_sub(descriptor.overhead())
            .ok_or(Error::BadSize)?;
        let offset = lower.payload_offset() + descriptor.header;

        Ok(Header {
            lower,
            descriptor,
            offset,
            max_len,
        })
    }

    /// The layer this one is stacked on.
    pub fn inner(&self) -> &L {
        &self.lower
    }

    /// The header bytes of this layer.
    pub fn header<'m>(&self, message: &'m Message) -> &'m [u8] {
        &message.as_bytes()[self.offset - self.descriptor.header..self.offset]
    }

    /// The mutable header bytes of this layer.
    pub fn header_mut<'m>(&self, message: &'m mut Message) -> &'m mut [u8] {
        &mut message.as_bytes_mut()[self.offset - self.descriptor.header..self.offset]
    }

    /// The footer bytes of this layer, behind the current payload.
    pub fn footer<'m>(&self, message: &'m Message) -> &'m [u8] {
        let start = self.offset + self.payload_len(message);
        &message.as_bytes()[start..start + self.descriptor.footer]
    }

    /// The mutable footer bytes of this layer.
    pub fn footer_mut<'m>(&self, message: &'m mut Message) -> &'m mut [u8] {
        let start = self.offset + self.payload_len(message);
        &mut message.as_bytes_mut()[start..start + self.descriptor.footer]
    }

    /// Whether the lower payload is long enough to contain this layer at all.
    fn is_present(&self, message: &Message) -> bool {
        self.lower.payload_len(message) >= self.descriptor.overhead()
    }
}

impl<L: Layer> Layer for Header<L> {
    fn descriptor(&self) -> Descriptor {
        self.descriptor
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
        self.lower.payload_len(message)
            .saturating_sub(self.descriptor.overhead())
            .min(self.max_len)
    }

    fn set_payload_len(&self, message: &mut Message, len: usize) -> Result<()> {
        if len > self.max_len {
            return Err(Error::BadSize);
        }

        self.lower.set_payload_len(message, len + self.descriptor.overhead())
    }

    fn clear(&self, message: &mut Message) {
        // A footer only exists while the lower payload holds one.
        if self.is_present(message) {
            let start = self.offset + self.payload_len(message);
            zero(message, start..start + self.descriptor.footer);
        }

        zero(message, self.offset - self.descriptor.header..self.offset);
        self.lower.clear(message);
    }
}
