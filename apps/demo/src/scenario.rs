use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};

use event_bus::{BusConfig, Event, EventBus, Unsubscribe, Wildcard};

use crate::config::ScenarioConfig;

#[derive(Event, Debug)]
#[event(name = "user_joined")]
pub struct UserJoined {
    pub name: String,
}

#[derive(Event, Debug)]
#[event(name = "message_posted")]
pub struct MessagePosted {
    pub author: String,
    pub text: String,
}

#[derive(Event, Debug)]
#[event(name = "user_left")]
pub struct UserLeft {
    pub name: String,
}

#[derive(Event, Debug)]
#[event(name = "room_closed")]
pub struct RoomClosed;

/// Counters collected while the scenario runs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Emissions observed by the wildcard audit listener
    pub events: usize,
    /// Messages delivered to members other than their author
    pub deliveries: usize,
    /// Emissions in which at least one listener panicked
    pub faults: usize,
}

/// A chat room where every member is a `MessagePosted` listener.
///
/// The membership listeners hold clones of the bus. `RoomClosed` clears the bus at the end of
/// [`ChatRoom::run`], and dropping the room clears it as well, so the listeners never outlive
/// the room.
pub struct ChatRoom {
    bus: EventBus,
    members: Rc<RefCell<HashMap<String, Unsubscribe>>>,
    events: Rc<Cell<usize>>,
    deliveries: Rc<Cell<usize>>,
}

impl ChatRoom {
    pub fn new(config: BusConfig) -> Self {
        let room = Self {
            bus: EventBus::with_config(config),
            members: Rc::default(),
            events: Rc::default(),
            deliveries: Rc::default(),
        };

        room.subscribe_audit();
        room.subscribe_membership();

        room
    }

    /// Counts every emission.
    fn subscribe_audit(&self) {
        let events = Rc::clone(&self.events);

        self.bus.on::<Wildcard>(move |event| {
            events.set(events.get() + 1);
            tracing::debug!("Audit: {}", event.event_name());
        });
    }

    /// Registers a member listener on join and removes it on leave.
    fn subscribe_membership(&self) {
        self.bus.once(|joined: &UserJoined| {
            tracing::info!("{} opened the room", joined.name);
        });

        let bus = self.bus.clone();
        let members = Rc::clone(&self.members);
        let deliveries = Rc::clone(&self.deliveries);
        self.bus.on(move |joined: &UserJoined| {
            let name = joined.name.clone();
            let deliveries = Rc::clone(&deliveries);

            let unsubscribe = bus.on(move |message: &MessagePosted| {
                if message.author != name {
                    deliveries.set(deliveries.get() + 1);
                    tracing::trace!("{} received {:?} from {}", name, message.text, message.author);
                }
            });

            // A user joining twice keeps a single member listener.
            let previous = members.borrow_mut().insert(joined.name.clone(), unsubscribe);
            if let Some(previous) = previous {
                previous.unsubscribe();
            }
        });

        let members = Rc::clone(&self.members);
        self.bus.on(move |left: &UserLeft| {
            if let Some(unsubscribe) = members.borrow_mut().remove(&left.name) {
                unsubscribe.unsubscribe();
            }
        });

        let bus = self.bus.clone();
        self.bus.on(move |_: &RoomClosed| bus.clear_all());
    }

    fn subscribe_moderation(&self, forbidden_word: String) {
        self.bus.on(move |message: &MessagePosted| {
            if message.text.contains(&forbidden_word) {
                panic!("{} used a forbidden word", message.author);
            }
        });
    }

    pub fn run(self, config: &ScenarioConfig) -> Summary {
        if let Some(word) = config.forbidden_word.clone() {
            self.subscribe_moderation(word);
        }

        let mut faults = 0;

        for name in &config.users {
            self.bus.emit(UserJoined { name: name.clone() });
        }

        for round in 0..config.messages_per_user {
            for author in &config.users {
                let message = MessagePosted {
                    author: author.clone(),
                    text: format!("message {} from {}", round, author),
                };

                if let Err(err) = self.bus.try_emit(message) {
                    tracing::warn!("Moderation rejected a message: {}", err);
                    faults += 1;
                }
            }
        }

        for name in &config.users {
            self.bus.emit(UserLeft { name: name.clone() });
        }

        self.bus.emit(RoomClosed);

        Summary {
            events: self.events.get(),
            deliveries: self.deliveries.get(),
            faults,
        }
    }
}

impl Drop for ChatRoom {
    fn drop(&mut self) {
        self.bus.clear_all();
    }
}
