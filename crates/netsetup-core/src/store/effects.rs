// ── Deferred effect queue ──
//
// Membership transitions never touch member devices while the triggering
// mutation is being applied. They enqueue effects instead, which the owner
// drains afterwards in insertion order. Once queued, an effect is never
// cancelled.

use std::collections::VecDeque;

use crate::model::Device;

/// A follow-up change to one member interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Drop the member's standalone addressing.
    ClearAddressing { name: String },
    /// Put back the addressing the member had before it was absorbed.
    RestoreAddressing { name: String, snapshot: Box<Device> },
}

impl Effect {
    /// Interface the effect applies to.
    pub fn target(&self) -> &str {
        match self {
            Self::ClearAddressing { name } | Self::RestoreAddressing { name, .. } => name,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct EffectQueue {
    pending: VecDeque<Effect>,
}

impl EffectQueue {
    pub(crate) fn push(&mut self, effect: Effect) {
        self.pending.push_back(effect);
    }

    pub(crate) fn pop(&mut self) -> Option<Effect> {
        self.pending.pop_front()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.pending.iter()
    }

    /// Snapshot of a restore that is still waiting for `name`.
    ///
    /// Only the last queued effect for the name counts: a restore followed
    /// by a clear means the member ends up cleared.
    pub(crate) fn pending_restore(&self, name: &str) -> Option<&Device> {
        match self.pending.iter().rev().find(|e| e.target() == name)? {
            Effect::RestoreAddressing { snapshot, .. } => Some(snapshot),
            Effect::ClearAddressing { .. } => None,
        }
    }
}
