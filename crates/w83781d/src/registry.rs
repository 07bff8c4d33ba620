use crate::{DriverError, Result};
use core::fmt;

/// Opaque reference to one registry slot. The generation distinguishes successive
/// occupants of the same slot, so a handle outliving its device never resolves.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct DeviceHandle {
    index: usize,
    generation: u64,
}

impl DeviceHandle {
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client{}.{}", self.index, self.generation)
    }
}

#[derive(Debug)]
struct Slot<T> {
    generation: u64,
    occupant: Option<T>,
}

/// Fixed-capacity table of attached clients.
#[derive(Debug)]
pub struct ClientRegistry<T> {
    slots: Vec<Slot<T>>,
}

impl<T> ClientRegistry<T> {
    pub fn new(capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|_| Slot {
                generation: 0,
                occupant: None,
            })
            .collect();
        Self { slots }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.occupant.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Places `item` in the first free slot.
    pub fn create(&mut self, item: T) -> Result<DeviceHandle> {
        let capacity = self.capacity();
        let (index, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, s)| s.occupant.is_none())
            .ok_or(DriverError::NoCapacity { capacity })?;
        slot.generation += 1;
        slot.occupant = Some(item);
        Ok(DeviceHandle {
            index,
            generation: slot.generation,
        })
    }

    pub fn destroy(&mut self, handle: DeviceHandle) -> Result<T> {
        let slot = self.slot_mut(handle).ok_or(DriverError::NotFound)?;
        slot.occupant.take().ok_or(DriverError::NotFound)
    }

    pub fn get(&self, handle: DeviceHandle) -> Result<&T> {
        self.slots
            .get(handle.index)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.occupant.as_ref())
            .ok_or(DriverError::NotFound)
    }

    /// First live handle whose occupant satisfies `pred`.
    pub fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<DeviceHandle> {
        self.iter().find(|(_, item)| pred(item)).map(|(h, _)| h)
    }

    pub fn handles(&self) -> Vec<DeviceHandle> {
        self.iter().map(|(h, _)| h).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeviceHandle, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, s)| {
            s.occupant.as_ref().map(|item| {
                (
                    DeviceHandle {
                        index,
                        generation: s.generation,
                    },
                    item,
                )
            })
        })
    }

    fn slot_mut(&mut self, handle: DeviceHandle) -> Option<&mut Slot<T>> {
        self.slots
            .get_mut(handle.index)
            .filter(|s| s.generation == handle.generation)
    }
}
