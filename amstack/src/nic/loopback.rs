//! Implementation of a software loop-back device.
use crate::layer::{Error, Result};
use crate::managed::Slice;
use crate::time::Instant;
use crate::wire::{Message, Metadata};

use super::{Personality, Recv, Send};

/// A software loop-back device.
///
/// Maintains a ring of frames on the air. A transmitted frame is copied into the ring and its
/// completion is reported on the next call to `tx`, received frames are copied from the ring into
/// the single receive buffer. Transmission fails when the ring is full.
pub struct Loopback<'r, 'a> {
    air: Slice<'r, Message>,
    /// Index of the oldest frame on the air.
    head: usize,
    /// Number of frames on the air.
    len: usize,
    /// Only `None` while a frame is delivered.
    receive: Option<&'a mut Message>,
    in_flight: Option<(&'a mut Message, Result<()>)>,
    personality: Personality,
    now: Instant,
    transmitted: usize,
}

impl<'r, 'a> Loopback<'r, 'a> {
    /// Create a loop-back device.
    ///
    /// The capacity of `air` bounds the number of frames that were sent but not yet received.
    /// `receive` is the initial receive buffer.
    pub fn new<A>(air: A, receive: &'a mut Message) -> Self
        where A: Into<Slice<'r, Message>>,
    {
        Loopback {
            air: air.into(),
            head: 0,
            len: 0,
            receive: Some(receive),
            in_flight: None,
            personality: Personality::baseline(),
            now: Instant::from_millis(0),
            transmitted: 0,
        }
    }

    /// Update the timestamp of all future frames.
    pub fn set_current_time(&mut self, instant: Instant) {
        self.now = instant;
    }

    /// Mutably get the personality, to enable capabilities or change the framing.
    pub fn personality_mut(&mut self) -> &mut Personality {
        &mut self.personality
    }

    /// The number of frames that went on the air.
    pub fn transmitted(&self) -> usize {
        self.transmitted
    }

    /// The number of frames waiting to be received.
    pub fn pending(&self) -> usize {
        self.len
    }

    /// The buffer the next frame will be received into.
    pub fn receive_buffer(&self) -> Option<&Message> {
        self.receive.as_ref().map(|buffer| &**buffer)
    }

    /// Put a frame on the air as if another node had sent it.
    ///
    /// Fails with `Exhausted` when the ring is full.
    pub fn inject(&mut self, frame: &Message) -> Result<()> {
        self.put_on_air(frame).ok_or(Error::Exhausted)
    }

    fn put_on_air(&mut self, frame: &Message) -> Option<()> {
        if self.len == self.air.len() {
            return None;
        }

        let index = (self.head + self.len) % self.air.len();
        let slot = &mut self.air[index];
        slot.clone_from(frame);
        *slot.metadata_mut() = Metadata::default();
        self.len += 1;
        Some(())
    }

    fn transmit(&mut self, frame: &mut Message) -> Result<()> {
        let acknowledgements = self.personality.capabilities().acknowledgements();
        frame.metadata_mut().timestamp = Some(self.now);

        if self.put_on_air(frame).is_none() {
            net_trace!("loopback: air full at {}", self.now);
            frame.metadata_mut().acked = false;
            return Err(Error::Transmission);
        }

        self.transmitted += 1;
        let metadata = frame.metadata_mut();
        metadata.acked = acknowledgements && metadata.ack_requested;
        Ok(())
    }
}

impl<'r, 'a> super::Device<'a> for Loopback<'r, 'a> {
    fn personality(&self) -> Personality {
        self.personality.clone()
    }

    fn tx(&mut self, max: usize, mut sender: impl Send<'a>) -> Result<usize> {
        if let Some((frame, result)) = self.in_flight.take() {
            sender.done(frame, result);
        }

        if max == 0 {
            return Ok(0);
        }

        let frame = match sender.next() {
            Some(frame) => frame,
            None => return Ok(0),
        };

        let result = self.transmit(frame);
        self.in_flight = Some((frame, result));
        Ok(1)
    }

    fn rx(&mut self, max: usize, mut receiver: impl Recv<'a>) -> Result<usize> {
        let mut count = 0;

        while count < max && self.len > 0 {
            let buffer = self.receive.take().ok_or(Error::Fail)?;
            buffer.clone_from(&self.air[self.head]);
            buffer.metadata_mut().timestamp = Some(self.now);
            self.head = (self.head + 1) % self.air.len();
            self.len -= 1;

            self.receive = Some(receiver.receive(buffer));
            count += 1;
        }

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nic::Device as _;

    /// Sends one message and records its completion.
    struct Once<'a> {
        message: Option<&'a mut Message>,
        returned: Option<&'a mut Message>,
        done: Option<Result<()>>,
    }

    /// Counts received frames, returning each buffer.
    struct Count(usize);

    impl<'a> Send<'a> for Once<'a> {
        fn next(&mut self) -> Option<&'a mut Message> {
            self.message.take()
        }

        fn done(&mut self, frame: &'a mut Message, result: Result<()>) {
            self.returned = Some(frame);
            self.done = Some(result);
        }
    }

    impl<'a> Recv<'a> for Count {
        fn receive(&mut self, frame: &'a mut Message) -> &'a mut Message {
            self.0 += 1;
            frame
        }
    }

    #[test]
    fn simple_loopback() {
        let mut air: [Message; 1] = Default::default();
        let mut receive = Message::default();
        let mut outgoing = Message::default();
        outgoing.as_bytes_mut()[20] = 0xaa;
        outgoing.metadata_mut().ack_requested = true;

        let mut loopback = Loopback::new(&mut air[..], &mut receive);
        loopback.personality_mut().capabilities_mut().set_acknowledgements(true);
        loopback.set_current_time(Instant::from_millis(42));

        let mut once = Once { message: Some(&mut outgoing), returned: None, done: None };
        assert_eq!(loopback.tx(1, &mut once), Ok(1));
        assert_eq!(once.done, None);
        assert_eq!(loopback.tx(1, &mut once), Ok(0));
        assert_eq!(once.done, Some(Ok(())));

        let outgoing = once.returned.take().unwrap();
        assert!(outgoing.metadata().acked);
        assert_eq!(outgoing.metadata().timestamp, Some(Instant::from_millis(42)));
        assert_eq!(loopback.transmitted(), 1);

        let mut count = Count(0);
        assert_eq!(loopback.rx(4, &mut count), Ok(1));
        assert_eq!(count.0, 1);
        assert_eq!(loopback.pending(), 0);

        let received = loopback.receive_buffer().unwrap();
        assert_eq!(received.as_bytes()[20], 0xaa);
        assert!(!received.metadata().ack_requested);
        assert_eq!(received.metadata().timestamp, Some(Instant::from_millis(42)));
    }

    #[test]
    fn full_air_fails_transmission() {
        let mut air: [Message; 1] = Default::default();
        let mut receive = Message::default();
        let mut outgoing = Message::default();
        let other = Message::default();

        let mut loopback = Loopback::new(&mut air[..], &mut receive);
        assert_eq!(loopback.inject(&other), Ok(()));
        assert_eq!(loopback.inject(&other), Err(Error::Exhausted));

        let mut once = Once { message: Some(&mut outgoing), returned: None, done: None };
        assert_eq!(loopback.tx(1, &mut once), Ok(1));
        assert_eq!(loopback.tx(0, &mut once), Ok(0));
        assert_eq!(once.done, Some(Err(Error::Transmission)));
        assert_eq!(loopback.transmitted(), 0);
        assert_eq!(loopback.pending(), 1);
    }
}
