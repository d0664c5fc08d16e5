use std::collections::{HashMap, HashSet};

use log::error;

use crate::{constants::UNASSIGNED_NET_ID, protocol::ProtocolError, types::NetId};

/// Source of pinned net ids. Returning `0` leaves the type to be assigned
/// automatically.
pub trait NetEventIds {
    fn get_id(&self, type_name: &str) -> NetId;
}

/// Every type is assigned automatically
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOverrides;

impl NetEventIds for NoOverrides {
    fn get_id(&self, _type_name: &str) -> NetId {
        UNASSIGNED_NET_ID
    }
}

impl NetEventIds for HashMap<&'static str, NetId> {
    fn get_id(&self, type_name: &str) -> NetId {
        self.get(type_name).copied().unwrap_or(UNASSIGNED_NET_ID)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedEventId {
    pub type_name: &'static str,
    pub net_id: NetId,
    /// Whether the id came from an override rather than gap filling
    pub fixed: bool,
}

/// Assigns a net id to every event type name.
///
/// Names are sorted first, so the result only depends on the set of names and
/// the overrides, never on declaration order. Overridden names keep their id;
/// every other name, in sorted order, takes the lowest free id starting at 1.
/// The output is in sorted name order.
pub fn resolve_event_ids(
    type_names: &[&'static str],
    overrides: &dyn NetEventIds,
) -> Vec<ResolvedEventId> {
    let mut sorted: Vec<&'static str> = type_names.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut resolved: Vec<ResolvedEventId> = sorted
        .into_iter()
        .map(|type_name| {
            let net_id = overrides.get_id(type_name);
            ResolvedEventId {
                type_name,
                net_id,
                fixed: net_id != UNASSIGNED_NET_ID,
            }
        })
        .collect();

    let mut taken: HashSet<NetId> = resolved
        .iter()
        .filter(|entry| entry.fixed)
        .map(|entry| entry.net_id)
        .collect();

    let mut next_id: NetId = 1;
    for entry in resolved.iter_mut().filter(|entry| !entry.fixed) {
        while taken.contains(&next_id) {
            next_id += 1;
        }
        entry.net_id = next_id;
        taken.insert(next_id);
        next_id += 1;
    }

    resolved
}

/// Rejects unassigned ids and ids shared by two types. Every problem is
/// logged, the first one is returned.
pub fn validate_event_ids(resolved: &[ResolvedEventId]) -> Result<(), ProtocolError> {
    let mut problems = Vec::new();
    let mut seen: HashMap<NetId, &'static str> = HashMap::new();

    for entry in resolved {
        if entry.net_id == UNASSIGNED_NET_ID {
            problems.push(ProtocolError::UnassignedEventId {
                type_name: entry.type_name,
            });
            continue;
        }
        if let Some(first) = seen.insert(entry.net_id, entry.type_name) {
            problems.push(ProtocolError::DuplicateEventId {
                net_id: entry.net_id,
                first,
                second: entry.type_name,
            });
        }
    }

    for problem in &problems {
        error!("Event protocol error: {}", problem);
    }
    match problems.into_iter().next() {
        Some(problem) => Err(problem),
        None => Ok(()),
    }
}

/// Human readable table of the event protocol, in net id order
pub fn describe_event_ids(resolved: &[ResolvedEventId]) -> String {
    let mut by_id: Vec<&ResolvedEventId> = resolved.iter().collect();
    by_id.sort_by_key(|entry| entry.net_id);

    let mut output = String::from("Event protocol:");
    for entry in by_id {
        let origin = if entry.fixed { "Fixed" } else { "Dynamic" };
        output.push_str(&format!(
            "\n  [{}][{}] : {}",
            entry.net_id, origin, entry.type_name
        ));
    }
    output
}
