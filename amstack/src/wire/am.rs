//! The active message header.
//!
//! Seven bytes in network byte order:
//!
//! ```text
//! 0       2       4        5       6      7
//! | dest  | src   | length | group | type | payload ...
//! ```
use core::{fmt, str::FromStr};
use byteorder::{ByteOrder, NetworkEndian};

use crate::wire::{Error, Result};

/// A 16-bit node address.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct Address(pub u16);

/// A group identifier partitioning nodes sharing a channel.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct Group(pub u8);

/// The protocol type of an active message, used for dispatch.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct AmId(pub u8);

impl Address {
    /// The broadcast destination, accepted by every node.
    pub const BROADCAST: Address = Address(0xffff);

    /// Query whether this address is the broadcast address.
    pub fn is_broadcast(self) -> bool {
        self == Self::BROADCAST
    }
}

/// The error returned when parsing an `Address` from a string fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseAddressError {
    _private: (),
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{:04x}", self.0)
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{:02x}", self.0)
    }
}

impl fmt::Display for AmId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "am{}", self.0)
    }
}

impl fmt::Display for ParseAddressError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid node address, expected decimal or 0x-prefixed hexadecimal u16")
    }
}

/// Parses decimal (`17`), hexadecimal (`0x11`), or `broadcast`.
impl FromStr for Address {
    type Err = ParseAddressError;

    fn from_str(src: &str) -> core::result::Result<Self, ParseAddressError> {
        let err = ParseAddressError { _private: () };
        if src == "broadcast" {
            return Ok(Address::BROADCAST);
        }

        let parsed = match src.strip_prefix("0x") {
            Some(hex) => u16::from_str_radix(hex, 16),
            None => src.parse(),
        };

        parsed.map(Address).map_err(|_| err)
    }
}

byte_wrapper! {
    /// A byte sequence representing an active message header and its payload.
    #[derive(Debug, PartialEq, Eq)]
    pub struct am_header([u8]);
}

mod field {
    use crate::wire::field::*;

    pub(crate) const DESTINATION: Field = 0..2;
    pub(crate) const SOURCE:      Field = 2..4;
    pub(crate) const LENGTH:      usize = 4;
    pub(crate) const GROUP:       usize = 5;
    pub(crate) const TYPE:        usize = 6;
    pub(crate) const PAYLOAD:     Rest  = 7..;
}

/// Length of the active message header.
pub const HEADER_LEN: usize = field::PAYLOAD.start;

impl am_header {
    /// Imbue a raw octet buffer with active message structure.
    pub fn new_unchecked(data: &[u8]) -> &Self {
        Self::__from_macro_new_unchecked(data)
    }

    /// Imbue a mutable octet buffer with active message structure.
    pub fn new_unchecked_mut(data: &mut [u8]) -> &mut Self {
        Self::__from_macro_new_unchecked_mut(data)
    }

    /// Shorthand for a combination of `new_unchecked` and `check_len`.
    pub fn new_checked(data: &[u8]) -> Result<&Self> {
        Self::new_unchecked(data).check_len()?;
        Ok(Self::new_unchecked(data))
    }

    /// Shorthand for a combination of `new_unchecked_mut` and `check_len`.
    pub fn new_checked_mut(data: &mut [u8]) -> Result<&mut Self> {
        Self::new_checked(&data[..])?;
        Ok(Self::new_unchecked_mut(data))
    }

    /// Ensure that no accessor method will panic if called.
    /// Returns `Err(Error::Truncated)` if the buffer is too short.
    pub fn check_len(&self) -> Result<()> {
        if self.0.len() < HEADER_LEN {
            Err(Error::Truncated)
        } else {
            Ok(())
        }
    }

    /// Return the length of a buffer required to hold a packet with the payload
    /// of a given length.
    pub fn buffer_len(payload_len: usize) -> usize {
        HEADER_LEN + payload_len
    }

    /// Return the destination address field.
    pub fn dst_addr(&self) -> Address {
        Address(NetworkEndian::read_u16(&self.0[field::DESTINATION]))
    }

    /// Return the source address field.
    pub fn src_addr(&self) -> Address {
        Address(NetworkEndian::read_u16(&self.0[field::SOURCE]))
    }

    /// Return the payload length field.
    pub fn length(&self) -> u8 {
        self.0[field::LENGTH]
    }

    /// Return the group field.
    pub fn group(&self) -> Group {
        Group(self.0[field::GROUP])
    }

    /// Return the type field.
    pub fn am_type(&self) -> AmId {
        AmId(self.0[field::TYPE])
    }

    /// Set the destination address field.
    pub fn set_dst_addr(&mut self, value: Address) {
        NetworkEndian::write_u16(&mut self.0[field::DESTINATION], value.0)
    }

    /// Set the source address field.
    pub fn set_src_addr(&mut self, value: Address) {
        NetworkEndian::write_u16(&mut self.0[field::SOURCE], value.0)
    }

    /// Set the payload length field.
    pub fn set_length(&mut self, value: u8) {
        self.0[field::LENGTH] = value
    }

    /// Set the group field.
    pub fn set_group(&mut self, value: Group) {
        self.0[field::GROUP] = value.0
    }

    /// Set the type field.
    pub fn set_am_type(&mut self, value: AmId) {
        self.0[field::TYPE] = value.0
    }

    /// Zero all header fields, leaving the payload untouched.
    pub fn clear(&mut self) {
        for byte in &mut self.0[..HEADER_LEN] {
            *byte = 0;
        }
    }

    /// Return the payload as a byte slice.
    pub fn payload_slice(&self) -> &[u8] {
        &self.0[field::PAYLOAD]
    }

    /// Return the payload as a mutable byte slice.
    pub fn payload_mut_slice(&mut self) -> &mut [u8] {
        &mut self.0[field::PAYLOAD]
    }
}

impl AsRef<[u8]> for am_header {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl AsMut<[u8]> for am_header {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

/// A high-level representation of an active message header.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Repr {
    /// The node the message is addressed to, or broadcast.
    pub dst_addr: Address,
    /// The sending node.
    pub src_addr: Address,
    /// Length of the payload following the header.
    pub length: u8,
    /// The group of the sender.
    pub group: Group,
    /// The protocol type selecting the receiving client.
    pub am_type: AmId,
}

impl Repr {
    /// Parse a header and check the length field against the available payload.
    pub fn parse(header: &am_header) -> Result<Repr> {
        header.check_len()?;
        if usize::from(header.length()) > header.payload_slice().len() {
            return Err(Error::Malformed);
        }

        Ok(Repr {
            dst_addr: header.dst_addr(),
            src_addr: header.src_addr(),
            length: header.length(),
            group: header.group(),
            am_type: header.am_type(),
        })
    }

    /// Return the length of the header that will be emitted from this high-level representation.
    pub fn header_len(&self) -> usize {
        HEADER_LEN
    }

    /// Emit a high-level representation into a header.
    pub fn emit(&self, header: &mut am_header) {
        header.set_dst_addr(self.dst_addr);
        header.set_src_addr(self.src_addr);
        header.set_length(self.length);
        header.set_group(self.group);
        header.set_am_type(self.am_type);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static FRAME_BYTES: [u8; 10] =
        [0xff, 0xff, 0x00, 0x01, 0x03, 0x22, 0x06,
         0xaa, 0xbb, 0xcc];

    #[test]
    fn deconstruct() {
        let header = am_header::new_checked(&FRAME_BYTES[..]).unwrap();
        assert!(header.dst_addr().is_broadcast());
        assert_eq!(header.src_addr(), Address(1));
        assert_eq!(header.length(), 3);
        assert_eq!(header.group(), Group(0x22));
        assert_eq!(header.am_type(), AmId(6));
        assert_eq!(header.payload_slice(), &[0xaa, 0xbb, 0xcc]);
    }

    #[test]
    fn construct() {
        let mut bytes = [0u8; 10];
        let repr = Repr {
            dst_addr: Address::BROADCAST,
            src_addr: Address(1),
            length: 3,
            group: Group(0x22),
            am_type: AmId(6),
        };
        let header = am_header::new_unchecked_mut(&mut bytes[..]);
        repr.emit(header);
        header.payload_mut_slice().copy_from_slice(&[0xaa, 0xbb, 0xcc]);
        assert_eq!(&bytes[..], &FRAME_BYTES[..]);
    }

    #[test]
    fn parse_rejects_short_and_inconsistent() {
        assert_eq!(am_header::new_checked(&FRAME_BYTES[..5]), Err(Error::Truncated));
        let header = am_header::new_unchecked(&FRAME_BYTES[..9]);
        assert_eq!(Repr::parse(header), Err(Error::Malformed));
    }

    #[test]
    fn parse_address() {
        assert_eq!("17".parse(), Ok(Address(17)));
        assert_eq!("0x00ff".parse(), Ok(Address(0xff)));
        assert_eq!("broadcast".parse(), Ok(Address::BROADCAST));
        assert!("0xfffff".parse::<Address>().is_err());
        assert!("node".parse::<Address>().is_err());
    }
}
