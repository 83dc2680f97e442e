//! Live property cells.
//!
//! A [`LiveCell`] is the numeric container an engine interpolates into and the
//! style derivation reads from. Cells are cheap to clone; clones share storage,
//! so an engine running on another thread observes and writes the same value.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::types::AnimatableProperty;

/// Shared, thread-safe numeric value for one animated property.
#[derive(Debug, Clone)]
pub struct LiveCell {
    property: AnimatableProperty,
    bits: Arc<AtomicU64>,
}

impl LiveCell {
    pub fn new(property: AnimatableProperty, value: f64) -> Self {
        Self {
            property,
            bits: Arc::new(AtomicU64::new(value.to_bits())),
        }
    }

    pub fn property(&self) -> AnimatableProperty {
        self.property
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    pub fn set(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Release);
    }

    /// Whether two handles refer to the same storage.
    pub fn same_cell(&self, other: &LiveCell) -> bool {
        Arc::ptr_eq(&self.bits, &other.bits)
    }
}

/// One live cell per [`AnimatableProperty`], owned by an animator.
#[derive(Debug, Clone)]
pub struct LiveCells {
    cells: [LiveCell; 7],
}

impl LiveCells {
    /// Create cells seeded with each property's neutral value.
    pub fn neutral() -> Self {
        Self {
            cells: AnimatableProperty::ALL.map(|p| LiveCell::new(p, p.neutral())),
        }
    }

    pub fn get(&self, property: AnimatableProperty) -> &LiveCell {
        &self.cells[property.index()]
    }

    pub fn value(&self, property: AnimatableProperty) -> f64 {
        self.get(property).get()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LiveCell> {
        self.cells.iter()
    }
}

impl Default for LiveCells {
    fn default() -> Self {
        Self::neutral()
    }
}
