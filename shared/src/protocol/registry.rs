use std::collections::HashMap;

use log::{error, info};

use crate::{
    constants::{FIRST_PROTOCOL_ID, UNASSIGNED_MESSAGE_ID},
    protocol::ProtocolError,
    types::MessageId,
};

/// A top-level message with a fixed slot in the protocol
pub trait ProtocolMessage {
    const NAME: &'static str;
}

/// Server to client frame of replicated events
pub struct EventsMessage;

impl ProtocolMessage for EventsMessage {
    const NAME: &'static str = "tickstream::events";
}

/// Client to server acknowledgement of a received frame
pub struct FrameAckMessage;

impl ProtocolMessage for FrameAckMessage {
    const NAME: &'static str = "tickstream::frame_ack";
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SlotKind {
    Message,
    Retired,
}

#[derive(Clone, Debug)]
struct Slot {
    name: &'static str,
    kind: SlotKind,
    pinned: Option<MessageId>,
    id: MessageId,
}

/// Hand-ordered table of top-level message ids.
///
/// Ids are assigned in declaration order, starting at [`FIRST_PROTOCOL_ID`].
/// Once a build has shipped, entries must never be reordered or removed: a
/// message that is no longer used is retired with [`retire_message`], which
/// keeps its slot so every later id stays where it was.
///
/// [`retire_message`]: ProtocolRegistry::retire_message
#[derive(Clone, Debug, Default)]
pub struct ProtocolRegistry {
    slots: Vec<Slot>,
    initialized: bool,
}

impl ProtocolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the messages the event transport uses
    pub fn with_builtin_messages() -> Self {
        let mut registry = Self::new();
        registry.add::<EventsMessage>().add::<FrameAckMessage>();
        registry
    }

    pub fn add<M: ProtocolMessage>(&mut self) -> &mut Self {
        self.add_message(M::NAME)
    }

    pub fn add_message(&mut self, name: &'static str) -> &mut Self {
        if let Err(err) = self.try_push(name, SlotKind::Message, None) {
            panic!("{}", err);
        }
        self
    }

    /// Declares a message whose id was fixed by an earlier build. It still takes
    /// a slot in the declaration order.
    pub fn add_message_with_id(&mut self, name: &'static str, id: MessageId) -> &mut Self {
        if let Err(err) = self.try_push(name, SlotKind::Message, Some(id)) {
            panic!("{}", err);
        }
        self
    }

    /// Marks a slot as permanently unused
    pub fn retire_message(&mut self, name: &'static str) -> &mut Self {
        if let Err(err) = self.try_push(name, SlotKind::Retired, None) {
            panic!("{}", err);
        }
        self
    }

    // Non-panicking builder methods

    pub fn try_add<M: ProtocolMessage>(&mut self) -> Result<&mut Self, ProtocolError> {
        self.try_add_message(M::NAME)
    }

    pub fn try_add_message(&mut self, name: &'static str) -> Result<&mut Self, ProtocolError> {
        self.try_push(name, SlotKind::Message, None)?;
        Ok(self)
    }

    pub fn try_add_message_with_id(
        &mut self,
        name: &'static str,
        id: MessageId,
    ) -> Result<&mut Self, ProtocolError> {
        self.try_push(name, SlotKind::Message, Some(id))?;
        Ok(self)
    }

    pub fn try_retire_message(&mut self, name: &'static str) -> Result<&mut Self, ProtocolError> {
        self.try_push(name, SlotKind::Retired, None)?;
        Ok(self)
    }

    fn try_push(
        &mut self,
        name: &'static str,
        kind: SlotKind,
        pinned: Option<MessageId>,
    ) -> Result<(), ProtocolError> {
        if self.initialized {
            return Err(ProtocolError::AlreadyLocked);
        }
        if self.slots.iter().any(|slot| slot.name == name) {
            return Err(ProtocolError::DuplicateName { name });
        }
        self.slots.push(Slot {
            name,
            kind,
            pinned,
            id: UNASSIGNED_MESSAGE_ID,
        });
        Ok(())
    }

    /// Assigns every id and locks the registry.
    ///
    /// # Panics
    /// Panics if the registry is already initialized
    pub fn init(&mut self) {
        if let Err(err) = self.try_init() {
            panic!("{}", err);
        }
    }

    pub fn try_init(&mut self) -> Result<(), ProtocolError> {
        let untouched = self
            .slots
            .iter()
            .all(|slot| slot.id == UNASSIGNED_MESSAGE_ID);
        if self.initialized || !untouched {
            return Err(ProtocolError::AlreadyInitialized);
        }

        let mut next_id = FIRST_PROTOCOL_ID;
        for slot in self.slots.iter_mut() {
            slot.id = match slot.pinned {
                Some(id) => id,
                None => {
                    let id = next_id;
                    next_id += 1;
                    id
                }
            };
        }
        self.initialized = true;

        info!("{}", self.describe());
        Ok(())
    }

    /// Returns the registry to its declared-but-unassigned state
    pub fn shutdown(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.id = UNASSIGNED_MESSAGE_ID;
        }
        self.initialized = false;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Checks every assigned slot, retired ones included, for reserved or
    /// duplicate ids. Every problem is logged, the first one is returned.
    pub fn validate_all(&self) -> Result<(), ProtocolError> {
        if !self.initialized {
            return Err(ProtocolError::NotInitialized);
        }

        let mut problems = Vec::new();
        let mut seen: HashMap<MessageId, &'static str> = HashMap::new();
        for slot in &self.slots {
            if slot.id < FIRST_PROTOCOL_ID {
                problems.push(ProtocolError::ReservedId {
                    name: slot.name,
                    id: slot.id,
                    first_valid: FIRST_PROTOCOL_ID,
                });
            }
            if let Some(first) = seen.insert(slot.id, slot.name) {
                problems.push(ProtocolError::DuplicateId {
                    id: slot.id,
                    first,
                    second: slot.name,
                });
            }
        }

        for problem in &problems {
            error!("Protocol error: {}", problem);
        }
        match problems.into_iter().next() {
            Some(problem) => Err(problem),
            None => Ok(()),
        }
    }

    /// Id of a live message, `None` for unknown or retired names
    pub fn id(&self, name: &str) -> Option<MessageId> {
        if !self.initialized {
            return None;
        }
        self.slots
            .iter()
            .find(|slot| slot.name == name && slot.kind == SlotKind::Message)
            .map(|slot| slot.id)
    }

    pub fn id_of<M: ProtocolMessage>(&self) -> Option<MessageId> {
        self.id(M::NAME)
    }

    pub fn try_id_of<M: ProtocolMessage>(&self) -> Result<MessageId, ProtocolError> {
        if !self.initialized {
            return Err(ProtocolError::NotInitialized);
        }
        self.id_of::<M>()
            .ok_or(ProtocolError::UnknownMessage { name: M::NAME })
    }

    /// Name of the live message with this id
    pub fn name(&self, id: MessageId) -> Option<&'static str> {
        self.slots
            .iter()
            .find(|slot| slot.id == id && slot.kind == SlotKind::Message && self.initialized)
            .map(|slot| slot.name)
    }

    fn describe(&self) -> String {
        let mut output = String::from("Message protocol:");
        for slot in &self.slots {
            output.push_str(&format!("\n  [{}]", slot.id));
            if slot.kind == SlotKind::Retired {
                output.push_str("[Retired]");
            }
            output.push_str(&format!(" : {}", slot.name));
        }
        output
    }
}
