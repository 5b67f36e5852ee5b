use crate::wire::{Message, ANCHOR, DATA_CAPACITY};
use super::{Descriptor, Error, Frame, Header, Layer};
use super::am::{ActiveMessage, Address, AmId, Group, Identity, Packet};

const IDENTITY: Identity = Identity {
    address: Address(0x0102),
    group: Group(0x22),
};

fn framing(header: usize, footer: usize) -> Frame {
    Frame::new(Descriptor { header, footer }).unwrap()
}

/// A message with every byte set, so that cleared fields stand out.
fn dirty() -> Message {
    let mut message = Message::new();
    for (idx, byte) in message.as_bytes_mut().iter_mut().enumerate() {
        *byte = 0x80 | idx as u8;
    }
    message
}

#[test]
fn max_payload_recursion() {
    let frame = framing(2, 2);
    assert_eq!(frame.max_payload_len(), DATA_CAPACITY);

    let seq = Header::new(frame, Descriptor { header: 3, footer: 1 }).unwrap();
    assert_eq!(seq.max_payload_len(), DATA_CAPACITY - 4);

    let am = ActiveMessage::new(seq, IDENTITY).unwrap();
    assert_eq!(am.max_payload_len(), DATA_CAPACITY - 4 - 7);

    let upper: usize = am.descriptors()
        .take(2)
        .map(Descriptor::overhead)
        .sum();
    assert_eq!(am.max_payload_len() + upper, frame.max_payload_len());
    assert_eq!(am.descriptors().count(), 3);
}

#[test]
fn payload_beyond_max_fails() {
    let mut message = Message::new();
    let frame = framing(1, 0);
    let seq = Header::new(frame, Descriptor { header: 2, footer: 2 }).unwrap();
    let am = ActiveMessage::new(seq.clone(), IDENTITY).unwrap();

    let layers: [&dyn Layer; 3] = [&frame, &seq, &am];
    for layer in layers.iter() {
        let max = layer.max_payload_len();
        assert_eq!(layer.payload_mut(&mut message, max).map(|p| p.len()), Some(max));
        assert!(layer.payload(&message, max + 1).is_none());
        assert!(layer.payload_mut(&mut message, max + 1).is_none());
        assert_eq!(layer.set_payload_len(&mut message, max + 1), Err(Error::BadSize));
    }
}

#[test]
fn payload_offset_is_fixed() {
    let short = ActiveMessage::new(framing(1, 0), IDENTITY).unwrap();
    let long = ActiveMessage::new(framing(12, 4), IDENTITY).unwrap();

    assert_eq!(short.payload_offset(), ANCHOR + 7);
    assert_eq!(short.payload_offset(), long.payload_offset());

    let mut message = Message::new();
    short.payload_mut(&mut message, 3).unwrap().copy_from_slice(b"abc");
    short.set_payload_len(&mut message, 3).unwrap();

    // Moving the buffer to the other transport only needs the link header cleared.
    short.inner().clear(&mut message);
    long.inner().set_payload_len(&mut message, 3 + 7).unwrap();
    assert_eq!(long.payload_len(&message), 3);
    assert_eq!(long.payload(&message, 3), Some(&b"abc"[..]));
}

#[test]
fn set_payload_len_propagates() {
    let mut message = Message::new();
    let frame = framing(2, 2);
    let seq = Header::new(frame, Descriptor { header: 3, footer: 1 }).unwrap();
    let am = ActiveMessage::new(seq.clone(), IDENTITY).unwrap();

    am.set_payload_len(&mut message, 5).unwrap();
    assert_eq!(am.payload_len(&message), 5);
    assert_eq!(seq.payload_len(&message), 5 + 7);
    assert_eq!(frame.payload_len(&message), 5 + 7 + 4);
    assert_eq!(frame.frame_len(&message), 5 + 7 + 4 + 4);

    let before = message.clone();
    assert_eq!(am.set_payload_len(&mut message, am.max_payload_len() + 1), Err(Error::BadSize));
    assert_eq!(message, before);
}

#[test]
fn clear_is_idempotent() {
    let frame = framing(4, 2);
    let seq = Header::new(frame, Descriptor { header: 2, footer: 2 }).unwrap();
    let am = ActiveMessage::new(seq, IDENTITY).unwrap();

    let mut message = dirty();
    am.set_payload_len(&mut message, 6).unwrap();
    am.clear(&mut message);
    let once = message.clone();
    am.clear(&mut message);
    assert_eq!(message, once);

    assert_eq!(am.payload_len(&message), 0);
    assert_eq!(frame.payload_len(&message), 0);
    assert_eq!(am.destination(&message), Address(0));
}

#[test]
fn clear_leaves_upper_layers() {
    let frame = framing(2, 0);
    let am = ActiveMessage::new(frame, IDENTITY).unwrap();

    let mut message = Message::new();
    am.set_payload_len(&mut message, 2).unwrap();
    am.set_destination(&mut message, Address(7));
    am.set_am_type(&mut message, AmId(9));

    frame.clear(&mut message);
    assert_eq!(frame.payload_len(&message), 0);
    assert_eq!(am.destination(&message), Address(7));
    assert_eq!(am.am_type(&message), AmId(9));
    assert_eq!(am.payload_len(&message), 2);
}

#[test]
fn composition_checks_sizes() {
    assert_eq!(Frame::new(Descriptor { header: 0, footer: 0 }), Err(Error::BadSize));
    assert_eq!(Frame::new(Descriptor { header: 17, footer: 0 }), Err(Error::BadSize));
    assert_eq!(Frame::new(Descriptor { header: 1, footer: 5 }), Err(Error::BadSize));

    let frame = framing(1, 0);
    assert!(Header::new(frame, Descriptor { header: 20, footer: 8 }).is_ok());
    assert_eq!(
        Header::new(frame, Descriptor { header: 20, footer: 9 }).map(|_| ()),
        Err(Error::BadSize));

    let full = Header::new(frame, Descriptor { header: 24, footer: 0 }).unwrap();
    assert_eq!(ActiveMessage::new(full, IDENTITY).map(|_| ()), Err(Error::BadSize));
}

#[test]
fn header_and_footer_regions() {
    let frame = framing(1, 0);
    let seq = Header::new(frame, Descriptor { header: 2, footer: 1 }).unwrap();

    let mut message = Message::new();
    seq.set_payload_len(&mut message, 4).unwrap();
    seq.header_mut(&mut message).copy_from_slice(&[0x12, 0x34]);
    seq.payload_mut(&mut message, 4).unwrap().copy_from_slice(&[1, 2, 3, 4]);
    seq.footer_mut(&mut message).copy_from_slice(&[0xcc]);

    assert_eq!(frame.payload(&message, 7), Some(&[0x12, 0x34, 1, 2, 3, 4, 0xcc][..]));
    assert_eq!(seq.header(&message), &[0x12, 0x34]);
    assert_eq!(seq.footer(&message), &[0xcc]);
}
