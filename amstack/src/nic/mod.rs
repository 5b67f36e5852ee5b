//! Encapsulates the physical link.
//!
//! Also permits software emulation of one, for tests and simulations.
//!
//! A device moves whole messages. It pulls outgoing messages from a [`Send`] implementation when
//! it is ready to transmit and reports the outcome of each through the same sender. Received
//! frames are written into the single receive buffer of the device and handed to a [`Recv`]
//! implementation, which returns the buffer the device keeps for the next frame.
//!
//! [`Send`]: trait.Send.html
//! [`Recv`]: trait.Recv.html
mod loopback;
mod loss;
mod personality;

use crate::layer::{FnHandler, Result};
use crate::wire::Message;

pub use self::loopback::Loopback;

pub use self::loss::{
    Lossy,
    PrngLoss,
    Xoroshiro256,
};

pub use self::personality::{
    Capabilities,
    Personality,
};

/// A physical link device.
pub trait Device<'a> {
    /// A description of the device.
    ///
    /// Could be dynamically configured but the stack only reads it when it is set up and at the
    /// start of each receive round.
    fn personality(&self) -> Personality;

    /// The link is powered up.
    ///
    /// The device does not need to do anything before this, no frames are pulled or delivered
    /// while the link is stopped.
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    /// The link is powered down.
    fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    /// Transmit some messages pulled from the `sender`.
    ///
    /// Takes up to `max` messages. Taking a message is irrevocable, the device owns it until it
    /// reports its completion through `Send::done`, which may happen during a later call. Returns
    /// the number of messages taken.
    fn tx(&mut self, max: usize, sender: impl Send<'a>) -> Result<usize>;

    /// Deliver received frames to the `receiver`.
    ///
    /// Delivers up to `max` frames, each in the current receive buffer of the device, and keeps
    /// the buffer returned by the receiver for the next frame.
    fn rx(&mut self, max: usize, receiver: impl Recv<'a>) -> Result<usize>;
}

/// A raw frame receiver.
pub trait Recv<'a> {
    /// Receive a single frame.
    ///
    /// Must return a buffer, either `frame` itself or a buffer owned by the receiver before. In
    /// the latter case `frame` is now owned by the receiver.
    fn receive(&mut self, frame: &'a mut Message) -> &'a mut Message;
}

/// A raw frame source.
pub trait Send<'a> {
    /// Hand over the next frame to transmit, if any.
    fn next(&mut self) -> Option<&'a mut Message>;

    /// Report the outcome of the transmission of a frame taken with `next`.
    fn done(&mut self, frame: &'a mut Message, result: Result<()>);
}

impl<'a, F> Recv<'a> for FnHandler<F>
    where F: FnMut(&'a mut Message) -> &'a mut Message
{
    fn receive(&mut self, frame: &'a mut Message) -> &'a mut Message {
        (self.0)(frame)
    }
}

impl<'a, R: Recv<'a> + ?Sized> Recv<'a> for &'_ mut R {
    fn receive(&mut self, frame: &'a mut Message) -> &'a mut Message {
        (**self).receive(frame)
    }
}

impl<'a, S: Send<'a> + ?Sized> Send<'a> for &'_ mut S {
    fn next(&mut self) -> Option<&'a mut Message> {
        (**self).next()
    }

    fn done(&mut self, frame: &'a mut Message, result: Result<()>) {
        (**self).done(frame, result)
    }
}
