//! Type-erased property columns.
//!
//! A column is a dense array parallel to one entity pool's index space:
//! one value per slot, default-constructed for slots no caller has written
//! to. The registry stores columns as trait objects; the typed access path
//! downcasts through `Any`, so the value type is checked at the call site
//! rather than at storage.

use std::any::{Any, TypeId};

/// Bound for values storable in a property column.
///
/// Blanket-implemented; any `Clone + Default + Debug + 'static` type
/// qualifies.
pub trait PropertyValue: Clone + Default + std::fmt::Debug + 'static {}

impl<T: Clone + Default + std::fmt::Debug + 'static> PropertyValue for T {}

/// Object-safe face of one erased column.
pub(crate) trait PropertyColumn: std::fmt::Debug {
    /// Current column length in slots.
    fn len(&self) -> usize;
    /// Grows the column to `len` slots, default-filling new cells.
    /// Shrinking is never performed.
    fn grow_to(&mut self, len: usize);
    /// Resets the value at `index` to the default, if in range.
    /// Called when a pool slot is recycled for a new element.
    fn reset(&mut self, index: usize);
    /// `TypeId` of the stored value type.
    fn value_type_id(&self) -> TypeId;
    /// Human-readable name of the stored value type, for diagnostics.
    fn value_type_name(&self) -> &'static str;
    /// Upcast for downcasting to the concrete column.
    fn as_any(&self) -> &dyn Any;
    /// Mutable upcast for downcasting to the concrete column.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Concrete dense column of `T` values.
#[derive(Debug, Clone)]
pub(crate) struct TypedColumn<T: PropertyValue> {
    pub(crate) values: Vec<T>,
}

impl<T: PropertyValue> TypedColumn<T> {
    pub(crate) fn with_len(len: usize) -> Self {
        Self {
            values: vec![T::default(); len],
        }
    }
}

impl<T: PropertyValue> PropertyColumn for TypedColumn<T> {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn grow_to(&mut self, len: usize) {
        if len > self.values.len() {
            self.values.resize(len, T::default());
        }
    }

    fn reset(&mut self, index: usize) {
        if let Some(cell) = self.values.get_mut(index) {
            *cell = T::default();
        }
    }

    fn value_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn value_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grow_default_fills() {
        let mut col = TypedColumn::<i32>::with_len(2);
        col.values[0] = 7;
        col.grow_to(5);
        assert_eq!(col.values, vec![7, 0, 0, 0, 0]);
        // grow_to never shrinks
        col.grow_to(1);
        assert_eq!(col.len(), 5);
    }

    #[test]
    fn reset_restores_default() {
        let mut col = TypedColumn::<f64>::with_len(3);
        col.values[1] = 2.5;
        col.reset(1);
        assert_eq!(col.values[1], 0.0);
        // out of range reset is a no-op
        col.reset(99);
    }

    #[test]
    fn erased_type_identity() {
        let col = TypedColumn::<u8>::with_len(1);
        let erased: &dyn PropertyColumn = &col;
        assert_eq!(erased.value_type_id(), TypeId::of::<u8>());
        assert!(erased.as_any().downcast_ref::<TypedColumn<u8>>().is_some());
        assert!(erased.as_any().downcast_ref::<TypedColumn<u16>>().is_none());
    }
}
