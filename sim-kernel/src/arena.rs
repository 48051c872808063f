// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Slot arena with generational handles
//!
//! Physics bodies and managed entities live in fixed slots that are reused
//! after their occupant is destroyed. Destruction is a soft delete: the slot
//! is marked free and its generation is bumped, so handles issued before the
//! reuse stop resolving instead of silently pointing at the new occupant.
//!
//! Free slots are kept in an ordered set and the lowest index is always
//! taken first, which gives the same slot choice as a linear scan from
//! index 0.
//!
//! A slot whose generation reaches `u32::MAX` is retired when it is next
//! freed: it never returns to the free list, so no handle can ever alias a
//! later occupant.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Generational handle to a value stored in a [`SlotArena`]
pub struct Handle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(index: u32, generation: u32) -> Self {
        Handle {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// Slot index of this handle
    pub fn index(&self) -> usize {
        self.index as usize
    }

    /// Generation of the slot when this handle was issued
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

// Manual impls so `T` needs none of these traits.
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}v{})", self.index, self.generation)
    }
}

impl<T> fmt::Display for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Vector of reusable slots
#[derive(Debug)]
pub struct SlotArena<T> {
    slots: Vec<Slot<T>>,
    free: BTreeSet<usize>,
    retired: usize,
}

impl<T> SlotArena<T> {
    /// Create an empty arena
    pub fn new() -> Self {
        SlotArena {
            slots: Vec::new(),
            free: BTreeSet::new(),
            retired: 0,
        }
    }

    /// Store `value` in the lowest free slot, or a new slot at the end
    pub fn insert(&mut self, value: T) -> Handle<T> {
        self.insert_with(|_| value)
    }

    /// Like [`insert`](Self::insert), but builds the value from its own handle
    pub fn insert_with(&mut self, build: impl FnOnce(Handle<T>) -> T) -> Handle<T> {
        if let Some(index) = self.free.pop_first() {
            let slot = &mut self.slots[index];
            let handle = Handle::new(index as u32, slot.generation);
            slot.value = Some(build(handle));
            handle
        } else {
            let index = self.slots.len();
            let handle = Handle::new(index as u32, 0);
            self.slots.push(Slot {
                generation: 0,
                value: Some(build(handle)),
            });
            handle
        }
    }

    /// Free the slot behind `handle`
    ///
    /// Returns the removed value, or `None` if the handle is stale.
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation {
            return None;
        }
        let value = slot.value.take()?;
        match slot.generation.checked_add(1) {
            Some(generation) => {
                slot.generation = generation;
                self.free.insert(handle.index());
            }
            None => {
                log::debug!("slot {} exhausted its generations, retiring", handle.index());
                self.retired += 1;
            }
        }
        Some(value)
    }

    /// Check whether `handle` still refers to a live value
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    /// Get the value behind `handle`
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        let slot = self.slots.get(handle.index())?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_ref()
    }

    /// Get the value behind `handle` mutably
    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_mut()
    }

    /// Get the live value in slot `index`
    pub fn get_index(&self, index: usize) -> Option<&T> {
        self.slots.get(index)?.value.as_ref()
    }

    /// Get the live value in slot `index` mutably
    pub fn get_index_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index)?.value.as_mut()
    }

    /// Current handle of the live value in slot `index`
    pub fn handle_at(&self, index: usize) -> Option<Handle<T>> {
        let slot = self.slots.get(index)?;
        slot.value
            .as_ref()
            .map(|_| Handle::new(index as u32, slot.generation))
    }

    /// Borrow slot `a` mutably and slot `b` immutably at the same time
    ///
    /// Returns `None` when `a == b` or either slot is empty.
    pub fn pair_mut(&mut self, a: usize, b: usize) -> Option<(&mut T, &T)> {
        if a == b || a >= self.slots.len() || b >= self.slots.len() {
            return None;
        }
        let (first, second) = if a < b {
            let (low, high) = self.slots.split_at_mut(b);
            (&mut low[a], &high[0])
        } else {
            let (low, high) = self.slots.split_at_mut(a);
            (&mut high[0], &low[b])
        };
        Some((first.value.as_mut()?, second.value.as_ref()?))
    }

    /// Number of slots, live, free or retired
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check whether the arena has no slots at all
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of live values
    pub fn active_count(&self) -> usize {
        self.slots.len() - self.free.len() - self.retired
    }

    /// Iterate over live values in slot order
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value
                .as_ref()
                .map(|value| (Handle::new(index as u32, slot.generation), value))
        })
    }

    /// Remove every slot
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.retired = 0;
    }
}

impl<T> Default for SlotArena<T> {
    fn default() -> Self {
        Self::new()
    }
}
