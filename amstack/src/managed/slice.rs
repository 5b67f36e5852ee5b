use core::ops::{Deref, DerefMut};

use crate::alloc::vec::Vec;

/// Storage for a sequence of elements that may or may not be owned.
///
/// Setup code chooses the backing memory, the stack only ever sees a slice. Borrowing a stack
/// allocated array is the usual choice on a node, owning a `Vec` is available with `std`.
///
/// ```
/// # use amstack::managed::Slice;
/// let mut storage = [0u8; 4];
/// let slice = Slice::<u8>::from(&mut storage[..]);
/// assert_eq!(slice.len(), 4);
/// ```
#[derive(Debug)]
pub enum Slice<'a, T: 'a> {
    /// A single, owned element.
    One(T),

    /// Borrowed elements.
    Many(&'a mut [T]),

    /// An owned vector.
    ///
    /// Refers to an uninhabited type without feature `std`.
    Owned(Vec<T>),
}

impl<T> Slice<'_, T> {
    /// A slice without any elements.
    pub fn empty() -> Self {
        Slice::Many(&mut [])
    }

    /// View the elements as a standard slice.
    pub fn as_slice(&self) -> &[T] {
        match self {
            Slice::One(one) => core::slice::from_ref(one),
            Slice::Many(many) => many,
            Slice::Owned(vec) => vec.as_slice(),
        }
    }

    /// View the elements as a mutable standard slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match self {
            Slice::One(one) => core::slice::from_mut(one),
            Slice::Many(many) => many,
            Slice::Owned(vec) => vec.as_mut_slice(),
        }
    }
}

impl<T> Deref for Slice<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for Slice<'_, T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> From<T> for Slice<'_, T> {
    fn from(one: T) -> Self {
        Slice::One(one)
    }
}

impl<'a, T> From<&'a mut [T]> for Slice<'a, T> {
    fn from(many: &'a mut [T]) -> Self {
        Slice::Many(many)
    }
}

#[cfg(any(feature = "std", test))]
impl<T> From<Vec<T>> for Slice<'_, T> {
    fn from(vec: Vec<T>) -> Self {
        Slice::Owned(vec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_deref() {
        let mut many = [1, 2, 3];
        assert_eq!(Slice::<i32>::from(&mut many[..]).as_slice(), &[1, 2, 3]);
        assert_eq!(Slice::One(7).as_slice(), &[7]);
        assert_eq!(Slice::<i32>::from(vec![4, 5]).len(), 2);
        assert!(Slice::<u8>::empty().is_empty());
    }
}
