use thiserror::Error;

use crate::{
    events::EventBusError,
    types::{MessageId, NetId},
};

/// Errors that can occur during protocol operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Protocol is locked and cannot be modified
    #[error("Protocol is already locked and cannot be modified. ProtocolRegistry::init() has been called and no further changes are allowed")]
    AlreadyLocked,

    /// init() called on a registry that already assigned its ids
    #[error("Protocol is already initialized. Call shutdown() before initializing it again")]
    AlreadyInitialized,

    /// Lookup or validation before init()
    #[error("Protocol is not initialized. ProtocolRegistry::init() must be called first")]
    NotInitialized,

    /// Same message name declared twice
    #[error("Message {name:?} is declared more than once in the protocol")]
    DuplicateName { name: &'static str },

    /// A message id inside the reserved range
    #[error("Message {name:?} has id {id}, which is inside the reserved range (ids below {first_valid} are reserved)")]
    ReservedId {
        name: &'static str,
        id: MessageId,
        first_valid: MessageId,
    },

    /// Two messages resolved to the same id
    #[error("Messages {first:?} and {second:?} share protocol id {id}. The protocol is not wire compatible")]
    DuplicateId {
        id: MessageId,
        first: &'static str,
        second: &'static str,
    },

    /// Lookup of a name that was never declared, or was retired
    #[error("Message {name:?} is not a live message in this protocol")]
    UnknownMessage { name: &'static str },

    /// An event type left without a net id
    #[error("Event {type_name:?} has no net id assigned")]
    UnassignedEventId { type_name: &'static str },

    /// Two event types resolved to the same net id
    #[error("Events {first:?} and {second:?} share net id {net_id}. Check the net id overrides")]
    DuplicateEventId {
        net_id: NetId,
        first: &'static str,
        second: &'static str,
    },

    /// A resolved event type could not be declared on the bus
    #[error("Failed to declare event {type_name:?}: {source}")]
    Declaration {
        type_name: &'static str,
        #[source]
        source: EventBusError,
    },
}
