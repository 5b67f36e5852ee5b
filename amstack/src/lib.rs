//! A zero-copy active message stack for resource-constrained network nodes.
//!
//! ## Table of contents
//!
//! This is also a recommended reading order but feel free to skip ahead, each chapter tries to be
//! somewhat self-contained.
//!
//! 1. [Design](#design-and-relevant-core-concepts)
//! 2. [The wire module](wire/index.html)
//!    1. [The message buffer](wire/struct.Message.html)
//!    1. [The active message header](wire/am/index.html)
//! 3. [The layers](layer/index.html)
//!    1. [Layering contract](layer/trait.Layer.html)
//!    1. [Active messages](layer/am/index.html)
//!    1. [Dispatch](layer/am/struct.Dispatcher.html)
//!    1. [Send virtualization](layer/am/struct.SendQueue.html)
//! 4. [Network interfaces](nic/index.html)
//! 5. [Composing a stack](stack/index.html)
//! 6. Internals
//!    1. [The managed module](managed/index.html)
//!
//! ## Design and relevant core concepts
//!
//! An active message is a single-hop, best-effort packet with a destination address, a group and
//! a protocol type. Many independent clients share one transceiver: each one gets exactly one
//! outstanding send and a receive path selected by the type of incoming packets.
//!
//! Nothing within `amstack` *ever* dynamically allocates memory. Buffers are exclusively borrowed
//! `Message`s that change hands at well defined points. A receiver is handed a buffer and must
//! hand one back before it returns, which need not be the same one. A sender gives up its buffer
//! until the matching completion returns it. The borrow checker is the enforcement of these
//! rules, there is no reference counting anywhere.
//!
//! Layers stack by wrapping their lower layer, so that all header offsets are resolved once when
//! the stack is composed. Locating a payload is then constant offset arithmetic without any
//! parsing of the packet content.
//!
//! Everything is run-to-completion. No call blocks, callbacks are expected to return promptly and
//! defer heavier work until after they have returned their buffer.
#![warn(missing_docs)]
#![warn(unreachable_pub)]

// tests should be able to use `std`
#![cfg_attr(all(
    not(feature = "std"),
    not(test)),
no_std)]

#[macro_use] mod macros;
pub mod layer;
pub mod managed;
pub mod nic;
pub mod stack;
pub mod time;
pub mod wire;

pub use stack::Stack;

/// The `alloc` crate, or a replacement without feature `"std"`.
#[cfg(any(
    feature = "std",
    test))]
pub extern crate alloc;

#[cfg(all(
    not(feature = "std"),
    not(test)))]
pub use self::managed::alloc;
