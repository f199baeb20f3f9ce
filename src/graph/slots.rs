use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

use super::types::Slot;
use crate::error::SlotError;

#[derive(Debug)]
struct LiveWire {
    slot: Slot,
    remaining: usize,
}

/// Assigns variable slots to wires during a single compilation pass.
///
/// A wire holds its slot from the moment its producer registers it until its last
/// consumer has bound it; after that the index is handed out again, lowest first.
/// Parameter slots are never released.
#[derive(Debug)]
pub struct SlotAllocator<K> {
    wires: HashMap<K, LiveWire>,
    free: BTreeSet<u32>,
    next: u32,
    live: usize,
    peak_live: usize,
}

impl<K> Default for SlotAllocator<K> {
    fn default() -> Self {
        Self {
            wires: HashMap::new(),
            free: BTreeSet::new(),
            next: 0,
            live: 0,
            peak_live: 0,
        }
    }
}

impl<K: Hash + Eq> SlotAllocator<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the output wire `wire` read by `consumers` inputs.
    ///
    /// Returns the wire's slot, or `None` when nothing reads it.
    pub fn register_output(&mut self, wire: K, consumers: usize) -> Option<Slot> {
        if let Some(live) = self.wires.get(&wire) {
            return Some(live.slot);
        }
        if consumers == 0 {
            return None;
        }

        let slot = self.take_lowest();
        self.wires.insert(
            wire,
            LiveWire {
                slot,
                remaining: consumers,
            },
        );
        Some(slot)
    }

    /// Reserves a slot for the lifetime of the compiled graph.
    pub fn register_parameter_slot(&mut self) -> Slot {
        self.take_lowest()
    }

    /// Binds one consumer of `wire`. The last consumer releases the slot.
    pub fn use_input(&mut self, wire: &K) -> Result<Slot, SlotError> {
        let live = self
            .wires
            .get_mut(wire)
            .ok_or(SlotError::UnregisteredWire)?;
        let slot = live.slot;

        live.remaining = live.remaining.saturating_sub(1);
        if live.remaining == 0 {
            self.wires.remove(wire);
            self.release(slot);
        }

        Ok(slot)
    }

    pub fn is_registered(&self, wire: &K) -> bool {
        self.wires.contains_key(wire)
    }

    /// `1 +` the highest slot ever issued.
    pub fn slot_count(&self) -> usize {
        self.next as usize
    }

    /// Slots currently held by parameters and partially consumed wires.
    pub fn live_slots(&self) -> usize {
        self.live
    }

    pub fn peak_live_slots(&self) -> usize {
        self.peak_live
    }

    fn take_lowest(&mut self) -> Slot {
        let index = match self.free.pop_first() {
            Some(index) => index,
            None => {
                let index = self.next;
                self.next += 1;
                index
            }
        };

        self.live += 1;
        self.peak_live = self.peak_live.max(self.live);
        Slot::new(index)
    }

    fn release(&mut self, slot: Slot) {
        self.free.insert(slot.index() as u32);
        self.live -= 1;
    }
}
