/// Address of a node in an [`Arena`].
///
/// A slot index is reused once its node is freed; the generation tells the
/// old occupant's keys apart from the new one's.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot {
    index: u32,
    generation: u32,
}

impl Slot {
    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

#[derive(Debug)]
struct Entry<T> {
    generation: u32,
    item: Option<T>,
}

/// Slot storage for graph nodes.
///
/// Freed slots go on a free list and are reused before the storage vector
/// grows. Each reuse bumps the slot's generation, so a key to a freed node
/// never resolves to whatever took its place.
#[derive(Debug)]
pub struct Arena<T> {
    entries: Vec<Entry<T>>,
    free_list: Vec<u32>,
    total_allocations: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            free_list: Vec::new(),
            total_allocations: 0,
        }
    }

    /// Returns the key the next `alloc` will hand out.
    pub fn next_slot(&self) -> Slot {
        match self.free_list.last() {
            Some(idx) => Slot {
                index: *idx,
                generation: self.entries[*idx as usize].generation,
            },
            None => Slot {
                index: self.entries.len() as u32,
                generation: 0,
            },
        }
    }

    pub fn alloc(&mut self, item: T) -> Slot {
        self.total_allocations += 1;
        if let Some(idx) = self.free_list.pop() {
            let entry = &mut self.entries[idx as usize];
            entry.item = Some(item);
            Slot {
                index: idx,
                generation: entry.generation,
            }
        } else {
            let idx = self.entries.len() as u32;
            self.entries.push(Entry {
                generation: 0,
                item: Some(item),
            });
            Slot {
                index: idx,
                generation: 0,
            }
        }
    }

    pub fn get(&self, slot: Slot) -> Option<&T> {
        self.entries
            .get(slot.index as usize)
            .filter(|entry| entry.generation == slot.generation)
            .and_then(|entry| entry.item.as_ref())
    }

    pub fn get_mut(&mut self, slot: Slot) -> Option<&mut T> {
        self.entries
            .get_mut(slot.index as usize)
            .filter(|entry| entry.generation == slot.generation)
            .and_then(|entry| entry.item.as_mut())
    }

    /// Frees a slot and hands back what it held. Stale keys free nothing.
    pub fn remove(&mut self, slot: Slot) -> Option<T> {
        let entry = self.entries.get_mut(slot.index as usize)?;
        if entry.generation != slot.generation {
            return None;
        }
        let item = entry.item.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free_list.push(slot.index);
        Some(item)
    }

    pub fn contains(&self, slot: Slot) -> bool {
        self.get(slot).is_some()
    }

    pub fn live_count(&self) -> usize {
        self.entries.iter().filter(|e| e.item.is_some()).count()
    }

    pub fn total_allocations(&self) -> usize {
        self.total_allocations
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slot, &T)> {
        self.entries.iter().enumerate().filter_map(|(idx, entry)| {
            entry.item.as_ref().map(|item| {
                let slot = Slot {
                    index: idx as u32,
                    generation: entry.generation,
                };
                (slot, item)
            })
        })
    }
}
