//! Simulates frame loss.
//!
//! The lossy device is a simple wrapper around another device which simulates a lossy link. This
//! works by dropping received frames and failing the transmission of outgoing frames.
use crate::layer::{Error, Result};
use crate::wire::Message;

use super::{Device, Personality, Recv, Send};

/// Simple pseudo-random loss.
///
/// Can simulate burst losses and uniform losses by dropping frames based on a pulse design.
#[derive(Copy, Clone, Debug, Hash)]
pub struct PrngLoss {
    /// Threshold for dropping the frame.
    pub threshold: u32,
    /// The frame is never dropped while `count` is at least as large as `threshold`.
    pub count: u32,
    /// Reset value for `count` when it reaches `0`.
    pub reset: u32,
    /// Loss rate as a (0, 32)-bit fixed point number.
    ///
    /// Or `None` for no loss at all, which can be used to temporarily turn loss off.
    pub lossrate: Option<u32>,
    /// The current prng state.
    pub prng: Xoroshiro256,
}

/// A device dropping some of its frames.
pub struct Lossy<D>(pub D, pub PrngLoss);

/// The xoshiro256** generator.
#[derive(Copy, Clone, Debug, Hash)]
pub struct Xoroshiro256 {
    state: [u64; 4],
}

struct LossySend<'l, S> {
    sender: S,
    loss: &'l mut PrngLoss,
}

struct LossyRecv<'l, R> {
    receiver: R,
    loss: &'l mut PrngLoss,
}

impl PrngLoss {
    /// A uniform loss simulator.
    pub fn uniform(rate: Option<u32>, seed: u64) -> Self {
        PrngLoss {
            // Threshold always greater than count
            threshold: 1,
            count: 0,
            reset: 0,
            lossrate: rate,
            prng: Xoroshiro256::new(seed),
        }
    }

    /// Wrap a device to make it lossy.
    pub fn lossy<D>(&self, device: D) -> Lossy<D> {
        Lossy(device, *self)
    }

    /// Simulate burst losses as pulses.
    ///
    /// Drops all frames while in a high state, lets frames pass while in low state. Every pulse
    /// consists of `length` frames, the last `high` of which are dropped.
    ///
    /// # Panics
    /// This method panics if `length` is zero or `high` exceeds `length`.
    pub fn pulsed(high: u32, length: u32) -> Self {
        assert!(length > 0, "Pulse length must not be zero");
        assert!(high <= length, "Length of high signals must be shorter than total length");
        PrngLoss {
            threshold: high,
            count: length - 1,
            reset: length - 1,
            // Frame always lost when pulse condition is true.
            lossrate: Some(u32::max_value()),
            prng: Xoroshiro256::new(0),
        }
    }

    /// Determine the fate for the next frame, `true` if it is lost.
    pub fn next(&mut self) -> bool {
        let in_window = self.count < self.threshold;
        let fate = Some(self.roll()) <= self.lossrate;

        self.count = self.count.checked_sub(1)
            .unwrap_or(self.reset);

        fate & in_window
    }

    /// Generate the next value of the prng.
    fn roll(&mut self) -> u32 {
        (self.prng.next() >> 32) as u32
    }
}

impl Xoroshiro256 {
    /// Seed the generator, expanding the seed with splitmix64.
    pub fn new(seed: u64) -> Self {
        let mut mix = seed;
        let mut state = [0; 4];
        for word in state.iter_mut() {
            mix = mix.wrapping_add(0x9e37_79b9_7f4a_7c15);
            let mut z = mix;
            z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
            *word = z ^ (z >> 31);
        }
        Xoroshiro256 { state }
    }

    /// The next pseudo-random value.
    pub fn next(&mut self) -> u64 {
        let s = &mut self.state;
        let result = s[1]
            .wrapping_mul(5)
            .rotate_left(7)
            .wrapping_mul(9);

        let t = s[1] << 17;

        s[2] ^= s[0];
        s[3] ^= s[1];
        s[1] ^= s[2];
        s[0] ^= s[3];

        s[2] ^= t;

        s[3] = s[3].rotate_left(45);

        result
    }
}

impl<'a, S: Send<'a>> Send<'a> for LossySend<'_, S> {
    fn next(&mut self) -> Option<&'a mut Message> {
        let frame = self.sender.next()?;
        if self.loss.next() {
            net_trace!("lossy: transmission dropped");
            self.sender.done(frame, Err(Error::Transmission));
            return None;
        }

        Some(frame)
    }

    fn done(&mut self, frame: &'a mut Message, result: Result<()>) {
        self.sender.done(frame, result)
    }
}

impl<'a, R: Recv<'a>> Recv<'a> for LossyRecv<'_, R> {
    fn receive(&mut self, frame: &'a mut Message) -> &'a mut Message {
        if self.loss.next() {
            net_trace!("lossy: reception dropped");
            return frame;
        }

        self.receiver.receive(frame)
    }
}

impl<'a, D: Device<'a>> Device<'a> for Lossy<D> {
    fn personality(&self) -> Personality {
        self.0.personality()
    }

    fn start(&mut self) -> Result<()> {
        self.0.start()
    }

    fn stop(&mut self) -> Result<()> {
        self.0.stop()
    }

    fn tx(&mut self, max: usize, sender: impl Send<'a>) -> Result<usize> {
        self.0.tx(max, LossySend { sender, loss: &mut self.1 })
    }

    fn rx(&mut self, max: usize, receiver: impl Recv<'a>) -> Result<usize> {
        self.0.rx(max, LossyRecv { receiver, loss: &mut self.1 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nic::Loopback;

    /// Counts received frames, returning each buffer.
    struct Count(usize);

    /// Offers one message and records its completion.
    struct Once<'a> {
        message: Option<&'a mut Message>,
        done: Option<Result<()>>,
    }

    impl<'a> Recv<'a> for Count {
        fn receive(&mut self, frame: &'a mut Message) -> &'a mut Message {
            self.0 += 1;
            frame
        }
    }

    impl<'a> Send<'a> for Once<'a> {
        fn next(&mut self) -> Option<&'a mut Message> {
            self.message.take()
        }

        fn done(&mut self, _: &'a mut Message, result: Result<()>) {
            self.done = Some(result);
        }
    }

    #[test]
    fn pulsed() {
        // Drops one out of 10 frames.
        let mut prng = PrngLoss::pulsed(1, 10);
        let count = (0..100)
            .filter(|_| prng.next())
            .count();
        assert_eq!(count, 10);

        // Drops all frames.
        prng = PrngLoss::pulsed(1, 1);
        let count = (0..100)
            .filter(|_| prng.next())
            .count();
        assert_eq!(count, 100);

        // Drops at most one out of 10 frames.
        prng = PrngLoss::pulsed(1, 10);
        prng.lossrate = Some(!0 >> 1);
        let count = (0..100)
            .filter(|_| prng.next())
            .count();
        assert!(count <= 10);
    }

    #[test]
    fn uniform_bounds() {
        let mut never = PrngLoss::uniform(None, 7);
        assert!((0..100).all(|_| !never.next()));

        let mut always = PrngLoss::uniform(Some(u32::max_value()), 7);
        assert!((0..100).all(|_| always.next()));

        let mut half = PrngLoss::uniform(Some(u32::max_value() / 2), 7);
        let lost = (0..1000).filter(|_| half.next()).count();
        assert!(lost > 350 && lost < 650, "lost {} of 1000", lost);
    }

    #[test]
    fn total_loss() {
        let mut air: [Message; 2] = Default::default();
        let mut receive = Message::default();
        let mut outgoing = Message::default();
        let receive_ptr: *const Message = &receive;

        let loopback = Loopback::new(&mut air[..], &mut receive);
        let mut lossy = PrngLoss::uniform(Some(u32::max_value()), 3).lossy(loopback);
        lossy.0.inject(&Message::default()).unwrap();

        let mut count = Count(0);
        assert_eq!(lossy.rx(4, &mut count), Ok(1));
        assert_eq!(count.0, 0);
        assert_eq!(lossy.0.pending(), 0);
        let buffer = lossy.0.receive_buffer().unwrap();
        assert!(core::ptr::eq(buffer, receive_ptr));

        let mut once = Once { message: Some(&mut outgoing), done: None };
        assert_eq!(lossy.tx(1, &mut once), Ok(0));
        assert_eq!(once.done, Some(Err(Error::Transmission)));
        assert_eq!(lossy.0.transmitted(), 0);
    }
}
