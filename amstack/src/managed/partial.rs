use core::ops::{Deref, DerefMut};

/// Refer to the initialized front part of some container.
///
/// Useful to create a dynamically sized storage over a statically sized backing buffer, used
/// similar to a vector.
///
/// # Usage
///
/// Use a slice as a backing storage, logically initializing it gradually. Contrary to `Vec` the
/// method `push` returns a mutable reference to the next element after it has succeeded instead
/// of taking a value. It only changes the logical length.
///
/// ```
/// # use amstack::managed::Partial;
/// let mut elements = [0; 16];
/// let mut storage = Partial::new(&mut elements[..]);
///
/// for el in 0..10 {
///     // Note that this drops an instance. That may be undesired.
///     *storage.push().unwrap() = el;
/// }
///
/// assert_eq!(storage.len(), 10);
/// ```
///
/// The dispatch table and the send slots are such lists: the backing storage is sized once at
/// setup and registration pushes into it until it is full.
#[derive(Clone, Debug)]
pub struct Partial<C> {
    inner: C,
    end: usize,
}

impl<C> Partial<C> {
    /// Make an instance that initially refers to an empty part.
    pub fn new(container: C) -> Self {
        Partial {
            inner: container,
            end: 0,
        }
    }

    /// Get the claimed length.
    pub fn len(&self) -> usize {
        self.end
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.end == 0
    }
}

impl<C, T> Partial<C>
    where C: Deref<Target=[T]>
{
    /// Check how many elements can be referred to at most.
    pub fn capacity(&self) -> usize {
        self.inner.len()
    }

    /// Get the logically active elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.inner[..self.end]
    }
}

impl<C, T> Partial<C>
    where C: Deref<Target=[T]> + DerefMut,
{
    /// Claim the element behind the last one.
    ///
    /// Returns `None` when the backing storage is exhausted. The element keeps whatever value it
    /// had in the backing storage, overwrite it.
    pub fn push(&mut self) -> Option<&mut T> {
        let element = self.inner.get_mut(self.end)?;
        self.end += 1;
        Some(element)
    }

    /// Get the logically active elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.inner[..self.end]
    }
}

impl<C, T> Deref for Partial<C>
    where C: Deref<Target=[T]>
{
    type Target = [T];
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<C, T> DerefMut for Partial<C>
    where C: Deref<Target=[T]> + DerefMut
{
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_until_full() {
        const SIZE: usize = 4;
        let mut slice = [0; SIZE];
        let mut partial = Partial::new(&mut slice[..]);
        for i in 0..SIZE {
            let element = partial.push().expect("Enough space");
            *element = i;
        }

        assert!(partial.push().is_none());
        assert_eq!(partial.len(), 4);
        assert_eq!(partial.as_slice(), &[0, 1, 2, 3]);
    }

    #[test]
    fn starts_empty() {
        let mut slice = [7; 2];
        let partial = Partial::new(&mut slice[..]);
        assert!(partial.is_empty());
        assert_eq!(partial.capacity(), 2);
        assert_eq!(partial.get(0), None);
    }
}
