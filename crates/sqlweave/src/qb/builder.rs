//! Copy-on-write record shared by every statement builder.
//!
//! A `Builder<D>` holds its record behind an `Arc`. Cloning is O(1) and every setter
//! goes through `Arc::make_mut`, so a builder that is still shared copies its record
//! before changing it. A base query can be reused as a template and extended in
//! different directions without any branch seeing the others' changes.

use std::sync::Arc;

#[derive(Debug)]
pub struct Builder<D> {
    data: Arc<D>,
}

impl<D> Clone for Builder<D> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<D: Clone + Default> Default for Builder<D> {
    fn default() -> Self {
        Self::new(D::default())
    }
}

impl<D: Clone> Builder<D> {
    pub fn new(data: D) -> Self {
        Self {
            data: Arc::new(data),
        }
    }

    /// Replace the value of one field.
    pub fn set<T>(mut self, field: impl FnOnce(&mut D) -> &mut T, value: T) -> Self {
        *field(Arc::make_mut(&mut self.data)) = value;
        self
    }

    /// Push one item onto a list field.
    pub fn append<T>(mut self, field: impl FnOnce(&mut D) -> &mut Vec<T>, item: T) -> Self {
        field(Arc::make_mut(&mut self.data)).push(item);
        self
    }

    /// Push several items onto a list field, in order.
    pub fn extend<T, I>(mut self, field: impl FnOnce(&mut D) -> &mut Vec<T>, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        field(Arc::make_mut(&mut self.data)).extend(items);
        self
    }

    /// Arbitrary edit of the record.
    pub fn update(mut self, f: impl FnOnce(&mut D)) -> Self {
        f(Arc::make_mut(&mut self.data));
        self
    }

    /// The accumulated record.
    pub fn get_struct(&self) -> &D {
        &self.data
    }

    #[cfg(test)]
    pub(crate) fn shares_record_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}
