//! Canonical, deduplicated family record for one conversation

use super::{FamilyData, FamilyMember};

/// Holds the merged family record. Mutated only through [`EntityStore::merge`],
/// replaced wholesale only through [`EntityStore::restore`].
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    data: FamilyData,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> &FamilyData {
        &self.data
    }

    /// Owned copy of the current record
    pub fn snapshot(&self) -> FamilyData {
        self.data.clone()
    }

    /// Replace the record wholesale.
    ///
    /// `FamilyData` can only be deserialized through the known-key filter, so
    /// an untrusted snapshot has already been reduced to its valid subset here.
    pub fn restore(&mut self, data: FamilyData) {
        tracing::debug!(records = data.record_count(), "Restoring family data");
        self.data = data;
    }

    /// Fold newly extracted records into the canonical record.
    pub fn merge(&mut self, incoming: FamilyData) {
        let FamilyData {
            family_members,
            relationships,
            dynamics,
            events,
        } = incoming;

        let before = self.data.record_count();

        for member in family_members {
            self.merge_member(member);
        }
        append_new(&mut self.data.relationships, relationships);
        append_new(&mut self.data.dynamics, dynamics);
        append_new(&mut self.data.events, events);

        tracing::debug!(
            added = self.data.record_count() - before,
            total = self.data.record_count(),
            "Merged family data"
        );
    }

    /// Identity resolution for one incoming member, first match wins:
    /// 1. same non-empty name
    /// 2. no name, same role, and the candidate has no name either
    /// 3. otherwise a new record (anonymous records dedupe by equality)
    fn merge_member(&mut self, incoming: FamilyMember) {
        let members = &mut self.data.family_members;

        let existing = if let Some(name) = incoming.name.as_deref() {
            members.iter_mut().find(|m| m.name.as_deref() == Some(name))
        } else if let Some(role) = incoming.role.as_deref() {
            members
                .iter_mut()
                .find(|m| m.name.is_none() && m.role.as_deref() == Some(role))
        } else {
            members.iter_mut().find(|m| **m == incoming)
        };

        match existing {
            Some(member) => member.absorb(incoming),
            None => members.push(incoming),
        }
    }
}

/// Append each record not already present by full structural equality,
/// preserving insertion order.
fn append_new<T: PartialEq>(existing: &mut Vec<T>, incoming: Vec<T>) {
    for record in incoming {
        if !existing.contains(&record) {
            existing.push(record);
        }
    }
}
