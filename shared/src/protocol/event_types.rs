use std::{
    any::{type_name, TypeId},
    collections::HashMap,
    fmt::Debug,
    hash::Hash,
};

use log::info;

use crate::{
    events::{EventBusError, EventSerializer, NetEventBus},
    protocol::{
        describe_event_ids, resolve_event_ids, validate_event_ids, NetEventIds, ProtocolError,
        ResolvedEventId,
    },
    types::NetId,
};

type Registrator<P> = Box<dyn FnOnce(&mut NetEventBus<P>, NetId) -> Result<(), EventBusError>>;

struct EventType<P: Eq + Hash + Clone + Debug> {
    type_name: &'static str,
    type_id: TypeId,
    registrator: Registrator<P>,
}

/// The list of networked event types of an application.
///
/// Both sides build the same list and hand it to
/// [`register_all`](EventTypes::register_all), which derives net ids from
/// the type names alone. Declaration order does not matter.
pub struct EventTypes<P: Eq + Hash + Clone + Debug> {
    types: Vec<EventType<P>>,
}

impl<P: Eq + Hash + Clone + Debug + 'static> Default for EventTypes<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Eq + Hash + Clone + Debug + 'static> EventTypes<P> {
    pub fn new() -> Self {
        Self { types: Vec::new() }
    }

    /// # Panics
    /// Panics if `T` was already added
    pub fn add<T: 'static>(&mut self, serializer: impl EventSerializer<T>) -> &mut Self {
        if let Err(err) = self.try_add(serializer) {
            panic!("{}", err);
        }
        self
    }

    pub fn try_add<T: 'static>(
        &mut self,
        serializer: impl EventSerializer<T>,
    ) -> Result<&mut Self, ProtocolError> {
        let type_id = TypeId::of::<T>();
        if self.types.iter().any(|event_type| event_type.type_id == type_id) {
            return Err(ProtocolError::DuplicateName {
                name: type_name::<T>(),
            });
        }
        self.types.push(EventType {
            type_name: type_name::<T>(),
            type_id,
            registrator: Box::new(move |bus: &mut NetEventBus<P>, net_id| {
                bus.try_declare::<T>(net_id, serializer)
            }),
        });
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn type_names(&self) -> Vec<&'static str> {
        self.types.iter().map(|event_type| event_type.type_name).collect()
    }

    /// Net ids these types would get with `overrides`, without declaring them
    pub fn resolve(&self, overrides: &dyn NetEventIds) -> Vec<ResolvedEventId> {
        resolve_event_ids(&self.type_names(), overrides)
    }

    /// Resolves and validates the net ids, then declares every type on `bus`.
    /// Nothing is declared if validation fails.
    pub fn register_all(
        self,
        bus: &mut NetEventBus<P>,
        overrides: &dyn NetEventIds,
    ) -> Result<Vec<ResolvedEventId>, ProtocolError> {
        let resolved = self.resolve(overrides);
        validate_event_ids(&resolved)?;

        let net_ids: HashMap<&'static str, NetId> = resolved
            .iter()
            .map(|entry| (entry.type_name, entry.net_id))
            .collect();
        for event_type in self.types {
            let net_id = net_ids
                .get(event_type.type_name)
                .copied()
                .ok_or(ProtocolError::UnassignedEventId {
                    type_name: event_type.type_name,
                })?;
            (event_type.registrator)(bus, net_id).map_err(|source| {
                ProtocolError::Declaration {
                    type_name: event_type.type_name,
                    source,
                }
            })?;
        }

        info!("{}", describe_event_ids(&resolved));
        Ok(resolved)
    }
}
