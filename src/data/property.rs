//! Property registry: runtime-attachable per-element data.
//!
//! A mesh owns one registry per element kind. Callers attach a column at
//! runtime (`add_property`), receive a typed [`PropHandle`], and read or
//! write values addressed by the same slot indices the owning entity pool
//! uses. Detaching destroys the column and invalidates the handle: the
//! registry slot carries a generation for exactly that purpose, mirroring
//! the entity pools.
//!
//! The design point: the property store belongs to the *mesh*, indexed by
//! slot, not to the element value. Algorithms can extend a mesh ad hoc
//! without a new element type per feature, and per-element access stays
//! O(1) because columns are dense arrays rather than maps.

use crate::data::column::{PropertyColumn, TypedColumn};
use crate::mesh_error::HemeshError;
use crate::topology::element::Entity;
use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;

pub use crate::data::column::PropertyValue;

/// Typed capability for one registered column of `T` values on elements
/// of kind `E`.
///
/// A handle is borrowed capability, not an owner: the registry owns the
/// column storage, and `remove_property` leaves every copy of the handle
/// dangling-but-detectable.
pub struct PropHandle<E, T> {
    slot: u32,
    generation: u32,
    _marker: PhantomData<fn() -> (E, T)>,
}

impl<E, T> PropHandle<E, T> {
    #[inline]
    const fn new(slot: u32, generation: u32) -> Self {
        Self {
            slot,
            generation,
            _marker: PhantomData,
        }
    }

    /// Registry slot this handle names.
    #[inline]
    pub const fn slot(self) -> u32 {
        self.slot
    }
}

impl<E, T> Copy for PropHandle<E, T> {}

impl<E, T> Clone for PropHandle<E, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, T> PartialEq for PropHandle<E, T> {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot && self.generation == other.generation
    }
}

impl<E, T> Eq for PropHandle<E, T> {}

impl<E, T> fmt::Debug for PropHandle<E, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropHandle")
            .field(&self.slot)
            .field(&self.generation)
            .finish()
    }
}

struct RegistrySlot {
    generation: u32,
    entry: Option<ColumnEntry>,
}

struct ColumnEntry {
    name: String,
    column: Box<dyn PropertyColumn>,
}

impl fmt::Debug for RegistrySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("RegistrySlot");
        d.field("generation", &self.generation);
        match &self.entry {
            Some(e) => d.field("name", &e.name).field("len", &e.column.len()),
            None => d.field("name", &"<removed>"),
        };
        d.finish()
    }
}

/// Per-element-kind table of type-erased property columns, parallel-
/// indexed to the owning [`EntityPool`](crate::pool::EntityPool).
pub struct PropertyRegistry<E: Entity> {
    slots: Vec<RegistrySlot>,
    /// Target column length: the owning pool's capacity as last reported
    /// through [`ensure_capacity`](Self::ensure_capacity).
    capacity: usize,
    _kind: PhantomData<fn() -> E>,
}

impl<E: Entity> fmt::Debug for PropertyRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyRegistry")
            .field("kind", &E::KIND)
            .field("capacity", &self.capacity)
            .field("slots", &self.slots)
            .finish()
    }
}

impl<E: Entity> Default for PropertyRegistry<E> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            capacity: 0,
            _kind: PhantomData,
        }
    }
}

impl<E: Entity> PropertyRegistry<E> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new column of `T` under `name` and returns its handle.
    ///
    /// The column is sized to the owning pool's current capacity and
    /// default-filled. Registering the same name twice creates a second,
    /// independent column; [`find_property`](Self::find_property) resolves
    /// to the most recent registration.
    pub fn add_property<T: PropertyValue>(&mut self, name: &str) -> PropHandle<E, T> {
        let entry = ColumnEntry {
            name: name.to_owned(),
            column: Box::new(TypedColumn::<T>::with_len(self.capacity)),
        };
        // Reuse a freed registry slot before growing the table.
        if let Some(slot) = self.slots.iter().position(|s| s.entry.is_none()) {
            self.slots[slot].entry = Some(entry);
            return PropHandle::new(slot as u32, self.slots[slot].generation);
        }
        let slot = self.slots.len() as u32;
        self.slots.push(RegistrySlot {
            generation: 0,
            entry: Some(entry),
        });
        PropHandle::new(slot, 0)
    }

    /// Destroys the column behind `handle`.
    ///
    /// The slot generation is bumped, so every copy of the handle becomes
    /// invalid and later accesses fail with `UnknownProperty`.
    ///
    /// # Errors
    /// [`HemeshError::UnknownProperty`] if the handle is stale or the
    /// column was already removed.
    pub fn remove_property<T: PropertyValue>(
        &mut self,
        handle: PropHandle<E, T>,
    ) -> Result<(), HemeshError> {
        let slot = self
            .slots
            .get_mut(handle.slot as usize)
            .filter(|s| s.generation == handle.generation && s.entry.is_some())
            .ok_or_else(|| unknown(handle.slot))?;
        slot.entry = None;
        slot.generation = slot.generation.wrapping_add(1);
        Ok(())
    }

    /// Resolves a registered name to a typed handle.
    ///
    /// # Errors
    /// [`HemeshError::UnknownProperty`] if no live column carries `name`;
    /// [`HemeshError::TypeMismatch`] if the column stores a different
    /// value type than `T`.
    pub fn find_property<T: PropertyValue>(
        &self,
        name: &str,
    ) -> Result<PropHandle<E, T>, HemeshError> {
        // Scan newest-first so re-registrations shadow older columns.
        for (slot, s) in self.slots.iter().enumerate().rev() {
            let Some(entry) = &s.entry else { continue };
            if entry.name != name {
                continue;
            }
            if entry.column.value_type_id() != TypeId::of::<T>() {
                return Err(HemeshError::TypeMismatch {
                    name: name.to_owned(),
                    stored: entry.column.value_type_name(),
                    requested: std::any::type_name::<T>(),
                });
            }
            return Ok(PropHandle::new(slot as u32, s.generation));
        }
        Err(HemeshError::UnknownProperty {
            name: name.to_owned(),
        })
    }

    /// Reads the value of the column behind `handle` for the element slot
    /// `index`.
    ///
    /// # Errors
    /// `UnknownProperty` for a removed/stale handle, `TypeMismatch` for a
    /// forged handle of the wrong type, `IndexOutOfRange` if `index`
    /// exceeds the column (possible only behind a shared reference; the
    /// mutable path heals the length first).
    pub fn get<T: PropertyValue>(
        &self,
        handle: PropHandle<E, T>,
        index: u32,
    ) -> Result<&T, HemeshError> {
        let entry = self.entry(handle)?;
        let column = downcast::<T>(entry)?;
        column
            .values
            .get(index as usize)
            .ok_or(HemeshError::IndexOutOfRange {
                index,
                len: column.values.len(),
            })
    }

    /// Mutable access to the value of the column behind `handle` for the
    /// element slot `index`.
    ///
    /// The column is lazily grown to the owning pool's capacity before the
    /// lookup, so a column registered before the pool grew still resolves.
    ///
    /// # Errors
    /// As [`get`](Self::get); `IndexOutOfRange` only if `index` lies
    /// beyond the pool capacity itself.
    pub fn get_mut<T: PropertyValue>(
        &mut self,
        handle: PropHandle<E, T>,
        index: u32,
    ) -> Result<&mut T, HemeshError> {
        let capacity = self.capacity;
        let entry = self.entry_mut(handle)?;
        entry.column.grow_to(capacity);
        let column = downcast_mut::<T>(entry)?;
        let len = column.values.len();
        column
            .values
            .get_mut(index as usize)
            .ok_or(HemeshError::IndexOutOfRange { index, len })
    }

    /// Grows every live column to at least `capacity` slots.
    ///
    /// The mesh calls this after every pool insertion, so columns track
    /// the pool's capacity, not its live count.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        if capacity <= self.capacity {
            return;
        }
        self.capacity = capacity;
        for slot in &mut self.slots {
            if let Some(entry) = &mut slot.entry {
                entry.column.grow_to(capacity);
            }
        }
    }

    /// Resets every live column's value at `index` to the default.
    ///
    /// Called when a pool slot is recycled: the new occupant must not see
    /// the previous element's property values.
    pub fn reset_index(&mut self, index: u32) {
        for slot in &mut self.slots {
            if let Some(entry) = &mut slot.entry {
                entry.column.reset(index as usize);
            }
        }
    }

    /// Number of live columns.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.entry.is_some()).count()
    }

    /// Whether no columns are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of all live columns, in registration slot order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots
            .iter()
            .filter_map(|s| s.entry.as_ref().map(|e| e.name.as_str()))
    }

    fn entry<T>(&self, handle: PropHandle<E, T>) -> Result<&ColumnEntry, HemeshError> {
        self.slots
            .get(handle.slot as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.entry.as_ref())
            .ok_or_else(|| unknown(handle.slot))
    }

    fn entry_mut<T>(&mut self, handle: PropHandle<E, T>) -> Result<&mut ColumnEntry, HemeshError> {
        self.slots
            .get_mut(handle.slot as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.entry.as_mut())
            .ok_or_else(|| unknown(handle.slot))
    }
}

fn unknown(slot: u32) -> HemeshError {
    HemeshError::UnknownProperty {
        name: format!("#{slot}"),
    }
}

fn downcast<T: PropertyValue>(entry: &ColumnEntry) -> Result<&TypedColumn<T>, HemeshError> {
    entry
        .column
        .as_any()
        .downcast_ref::<TypedColumn<T>>()
        .ok_or_else(|| HemeshError::TypeMismatch {
            name: entry.name.clone(),
            stored: entry.column.value_type_name(),
            requested: std::any::type_name::<T>(),
        })
}

fn downcast_mut<T: PropertyValue>(
    entry: &mut ColumnEntry,
) -> Result<&mut TypedColumn<T>, HemeshError> {
    if entry.column.as_any().downcast_ref::<TypedColumn<T>>().is_none() {
        return Err(HemeshError::TypeMismatch {
            name: entry.name.clone(),
            stored: entry.column.value_type_name(),
            requested: std::any::type_name::<T>(),
        });
    }
    Ok(entry
        .column
        .as_any_mut()
        .downcast_mut::<TypedColumn<T>>()
        .expect("checked directly above"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::element::Vertex;

    fn registry_with_capacity(cap: usize) -> PropertyRegistry<Vertex> {
        let mut reg = PropertyRegistry::new();
        reg.ensure_capacity(cap);
        reg
    }

    #[test]
    fn add_write_read() {
        let mut reg = registry_with_capacity(4);
        let h = reg.add_property::<f64>("weight");
        *reg.get_mut(h, 2).unwrap() = 2.5;
        assert_eq!(*reg.get(h, 2).unwrap(), 2.5);
        // untouched cells read as default
        assert_eq!(*reg.get(h, 0).unwrap(), 0.0);
    }

    #[test]
    fn independent_columns() {
        let mut reg = registry_with_capacity(2);
        let p1 = reg.add_property::<f64>("a");
        let p2 = reg.add_property::<f64>("b");
        *reg.get_mut(p1, 0).unwrap() = 9.0;
        // writing through p1 never shows through p2
        assert_eq!(*reg.get(p2, 0).unwrap(), 0.0);
    }

    #[test]
    fn remove_invalidates_handle() {
        let mut reg = registry_with_capacity(1);
        let h = reg.add_property::<i32>("tag");
        reg.remove_property(h).unwrap();
        assert!(matches!(
            reg.get(h, 0),
            Err(HemeshError::UnknownProperty { .. })
        ));
        assert!(matches!(
            reg.remove_property(h),
            Err(HemeshError::UnknownProperty { .. })
        ));
    }

    #[test]
    fn reused_registry_slot_does_not_resurrect_handle() {
        let mut reg = registry_with_capacity(1);
        let old = reg.add_property::<f64>("x");
        *reg.get_mut(old, 0).unwrap() = 2.5;
        reg.remove_property(old).unwrap();
        // Re-registration reuses slot 0 but with a fresh generation and a
        // default-filled column of a different type.
        let new = reg.add_property::<i32>("x");
        assert_eq!(new.slot(), old.slot());
        assert!(reg.get(old, 0).is_err());
        assert_eq!(*reg.get(new, 0).unwrap(), 0);
    }

    #[test]
    fn find_property_checks_type() {
        let mut reg = registry_with_capacity(1);
        let _ = reg.add_property::<f64>("weight");
        assert!(reg.find_property::<f64>("weight").is_ok());
        assert!(matches!(
            reg.find_property::<i32>("weight"),
            Err(HemeshError::TypeMismatch { .. })
        ));
        assert!(matches!(
            reg.find_property::<f64>("missing"),
            Err(HemeshError::UnknownProperty { .. })
        ));
    }

    #[test]
    fn late_registration_lazily_grows_on_write() {
        let mut reg = registry_with_capacity(0);
        let h = reg.add_property::<u8>("late");
        // Pool grows after the column was registered.
        reg.ensure_capacity(3);
        *reg.get_mut(h, 2).unwrap() = 7;
        assert_eq!(*reg.get(h, 2).unwrap(), 7);
        // Beyond pool capacity is a real error.
        assert!(matches!(
            reg.get_mut(h, 5),
            Err(HemeshError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn reset_index_restores_defaults() {
        let mut reg = registry_with_capacity(2);
        let h = reg.add_property::<f64>("w");
        *reg.get_mut(h, 1).unwrap() = 4.0;
        reg.reset_index(1);
        assert_eq!(*reg.get(h, 1).unwrap(), 0.0);
    }
}
