//! Two clients exchanging broadcasts over a software loop-back.
//!
//! # Usage
//!
//! Each client sends with its own protocol type and is subscribed to the type of the other. A
//! client sends again as soon as its previous send completed, until it has sent `count` messages.
//! Optionally the link is made lossy, dropping transmissions and receptions at random.
//!
//!   > $ cargo run --example two_nodes -- --count 20 --loss 10
use std::io::{stdout, Write};
use structopt::StructOpt;

use amstack::Stack;
use amstack::layer::am::{self, Address, AmId, Class, Completion, Group, Identity, InPacket};
use amstack::layer::am::{Route, Slot};
use amstack::nic::{Loopback, PrngLoss};
use amstack::wire::Message;

const PING: AmId = AmId(6);
const PONG: AmId = AmId(7);

/// Frames that can be on the air at once.
const AIR: usize = 8;

fn main() {
    let Config {
        count,
        loss,
        seed,
        promiscuous,
    } = Config::from_args();

    let rate = loss.map(|percent| (percent.min(100.0) / 100.0 * f64::from(u32::max_value())) as u32);

    let mut air: [Message; AIR] = Default::default();
    let mut receive = Message::default();
    let mut outgoing: [Message; 2] = Default::default();
    let mut routes = [Route::default(); 2];
    let mut slots: [Slot; 2] = Default::default();

    let mut loopback = Loopback::new(&mut air[..], &mut receive);
    loopback.personality_mut().capabilities_mut().set_promiscuous(promiscuous);
    let device = PrngLoss::uniform(rate, seed).lossy(loopback);

    let identity = Identity { address: Address(1), group: Group(0x22) };
    let mut stack = Stack::new(device, identity, &mut routes[..], &mut slots[..])
        .expect("Framing of the loop-back does not fit");

    let ping = stack.client(PING).expect("No slot for the ping client");
    let pong = stack.client(PONG).expect("No slot for the pong client");
    stack.subscribe(PONG, Class::Receive, ping).expect("Couldn't subscribe ping");
    stack.subscribe(PING, Class::Receive, pong).expect("Couldn't subscribe pong");
    stack.start().expect("Couldn't start the stack");

    let (first, second) = outgoing.split_at_mut(1);
    stack.payload_mut(&mut first[0], 1).expect("Payload too long")[0] = 0;
    stack.payload_mut(&mut second[0], 1).expect("Payload too long")[0] = 1;
    if stack.send(ping, Address::BROADCAST, &mut first[0], 1).is_err() {
        panic!("Couldn't queue the first ping");
    }
    if stack.send(pong, Address::BROADCAST, &mut second[0], 1).is_err() {
        panic!("Couldn't queue the first pong");
    }

    let mut nodes = [Node::new("ping", count), Node::new("pong", count)];
    let out = stdout();
    let mut out = out.lock();

    while nodes.iter().any(|node| node.remaining > 0) {
        let result = stack.poll(&mut nodes[..]);
        result.unwrap_or_else(|err| {
            panic!("Error during poll {:?}", err);
        });
    }

    // Let the last sends complete and the last frames arrive.
    for _ in 0..AIR + 1 {
        stack.poll(&mut nodes[..]).expect("Error during poll");
    }

    for node in nodes.iter() {
        writeln!(out, "{}: sent {}, failed {}, received {}",
            node.name, node.sent, node.failed, node.received).unwrap();
    }
}

#[derive(StructOpt)]
struct Config {
    /// Number of messages each client sends.
    #[structopt(short = "c", long = "count", default_value = "10")]
    count: usize,
    /// Loss rate of the link in percent.
    #[structopt(long = "loss")]
    loss: Option<f64>,
    /// Seed of the loss simulation.
    #[structopt(long = "seed", default_value = "0")]
    seed: u64,
    /// Report the link as promiscuous.
    #[structopt(long = "promiscuous")]
    promiscuous: bool,
}

struct Node {
    name: &'static str,
    remaining: usize,
    sent: usize,
    failed: usize,
    received: usize,
}

impl Node {
    fn new(name: &'static str, count: usize) -> Self {
        Node {
            name,
            remaining: count,
            sent: 0,
            failed: 0,
            received: 0,
        }
    }
}

impl<'a> am::Client<'a> for Node {
    fn receive(&mut self, packet: InPacket<'_, 'a>) -> &'a mut Message {
        self.received += 1;
        packet.into_message()
    }

    fn send_done(&mut self, completion: Completion<'_, 'a>) {
        let Completion { result, message, mut control } = completion;
        self.remaining = self.remaining.saturating_sub(1);
        match result {
            Ok(()) => self.sent += 1,
            Err(_) => self.failed += 1,
        }

        if self.remaining > 0 && control.send(Address::BROADCAST, message, 1).is_err() {
            panic!("{} couldn't send again", self.name);
        }
    }
}
