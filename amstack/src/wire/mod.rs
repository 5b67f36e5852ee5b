/*! Low-level packet access and construction.

# The message buffer

Every packet lives in a [`Message`], a buffer of fixed size with three regions and some out of
band [`Metadata`]:

```text
 0                 ANCHOR                          ANCHOR + DATA_CAPACITY
 |  header region  |          data region          |  footer region  |  metadata (not sent)
            <------|------------------------------->
        link header  link payload, upper layers grow forward
```

The anchor is fixed for all buffers. The link layer places its header immediately in front of
it, growing backwards, and its footer into the footer region. Everything above the link layer
nests inside the data region. A buffer can thus change the physical transport without its payload
moving, only the link header needs to be cleared first.

# Header representations

Like for the layers themselves, fixed-size headers are accessed through byte wrappers such as
[`am_header`] that read and write fields in network byte order, and a compact [`AmRepr`] that can
be parsed from and emitted into them.

[`Message`]: struct.Message.html
[`Metadata`]: struct.Metadata.html
[`am_header`]: am/struct.am_header.html
[`AmRepr`]: am/struct.Repr.html
*/

mod field {
    pub(crate) type Field = ::core::ops::Range<usize>;
    pub(crate) type Rest  = ::core::ops::RangeFrom<usize>;
}

pub mod am;
mod error;
mod message;

pub use self::error::{
    Error,
    Result};

pub use self::message::{
    Message,
    Metadata,
    ANCHOR,
    DATA_CAPACITY,
    FOOTER_CAPACITY,
    HEADER_CAPACITY,
    MESSAGE_LEN};

pub use self::am::{
    am_header,
    Address as AmAddress,
    AmId,
    Group as AmGroup,
    Repr as AmRepr};
