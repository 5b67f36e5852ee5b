use amstack::Stack;
use amstack::layer::Error;
use amstack::layer::am::{Address, AmId, Client, Completion, Group, Identity, Route, Slot};
use amstack::nic::Loopback;
use amstack::wire::Message;

const ME: Identity = Identity {
    address: Address(1),
    group: Group(0x22),
};

/// Sends again as soon as the previous send completed.
#[derive(Default)]
struct Eager {
    completed: usize,
    cancelled: usize,
    resend: bool,
}

impl<'a> Client<'a> for Eager {
    fn send_done(&mut self, completion: Completion<'_, 'a>) {
        let Completion { result, message, mut control } = completion;
        match result {
            Ok(()) => self.completed += 1,
            Err(Error::Cancelled) => self.cancelled += 1,
            Err(err) => panic!("unexpected completion {}", err),
        }

        if self.resend {
            assert!(control.send(Address(2), message, 0).is_ok());
        }
    }
}

#[test]
fn two_clients_share_evenly() {
    let mut air: [Message; 4] = Default::default();
    let mut receive = Message::new();
    let mut first = Message::new();
    let mut second = Message::new();
    let mut routes = [Route::default(); 1];
    let mut slots: [Slot; 2] = Default::default();

    let device = Loopback::new(&mut air[..], &mut receive);
    let mut stack = Stack::new(device, ME, &mut routes[..], &mut slots[..]).unwrap();
    let a = stack.client(AmId(1)).unwrap();
    let b = stack.client(AmId(2)).unwrap();
    stack.start().unwrap();

    assert!(stack.send(a, Address(2), &mut first, 0).is_ok());
    assert!(stack.send(b, Address(2), &mut second, 0).is_ok());

    let mut clients = [
        Eager { resend: true, ..Eager::default() },
        Eager { resend: true, ..Eager::default() },
    ];

    let mut polls = 0;
    while clients.iter().map(|c| c.completed).sum::<usize>() < 100 {
        stack.poll(&mut clients[..]).unwrap();
        polls += 1;
        assert!(polls < 1000, "no progress");
    }

    let total: usize = clients.iter().map(|c| c.completed).sum();
    for client in clients.iter() {
        assert!(client.completed + 1 >= total / 2, "unfair share {}", client.completed);
        assert!(client.completed <= total / 2 + 1, "unfair share {}", client.completed);
    }

    // Every completed send went on the air, and one more is in flight.
    assert_eq!(stack.device().transmitted(), total + 1);
}

#[test]
fn cancelled_client_frees_its_slot() {
    let mut air: [Message; 4] = Default::default();
    let mut receive = Message::new();
    let mut first = Message::new();
    let mut second = Message::new();
    let mut routes = [Route::default(); 1];
    let mut slots: [Slot; 2] = Default::default();

    let device = Loopback::new(&mut air[..], &mut receive);
    let mut stack = Stack::new(device, ME, &mut routes[..], &mut slots[..]).unwrap();
    let a = stack.client(AmId(1)).unwrap();
    let b = stack.client(AmId(2)).unwrap();
    stack.start().unwrap();

    assert!(stack.send(a, Address(2), &mut first, 0).is_ok());
    assert!(stack.send(b, Address(2), &mut second, 0).is_ok());
    assert_eq!(stack.cancel(b), Ok(()));

    // The cancelled slot stays occupied until its completion was delivered.
    assert!(stack.is_busy(b));

    let mut clients = [Eager::default(), Eager::default()];
    for _ in 0..3 {
        stack.poll(&mut clients[..]).unwrap();
    }

    assert_eq!(clients[0].completed, 1);
    assert_eq!(clients[0].cancelled, 0);
    assert_eq!(clients[1].completed, 0);
    assert_eq!(clients[1].cancelled, 1);
    assert_eq!(stack.device().transmitted(), 1);
    assert!(!stack.is_busy(a));
    assert!(!stack.is_busy(b));
}
