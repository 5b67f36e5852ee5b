use core::fmt;

/// The error type for parsing headers out of a message buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A header could not be parsed because the frame was shorter than the header.
    ///
    /// Frames are never longer than the buffer, but a link may deliver frames of any length below
    /// that. A frame too short for all headers of the stack carries no payload to deliver.
    Truncated,

    /// A header was recognized but was self-contradictory.
    ///
    /// Example: an active message header whose length field disagrees with the length the link
    /// reported for the whole frame.
    Malformed,
}

/// The result type for header parsing.
pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Truncated => write!(f, "truncated frame"),
            Error::Malformed => write!(f, "malformed header"),
        }
    }
}
