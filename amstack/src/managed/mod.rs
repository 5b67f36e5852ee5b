//! An assortment of non-owning containers.
//!
//! All of these containers have some option to construct them from one (or more) slices of the
//! underlying types instead of allocating resources dynamically. The dispatch table, the send
//! slots and the frame ring of software devices are all kept in these.
mod partial;
mod phantom_vec;
mod slice;

pub use self::partial::Partial;
pub use self::slice::Slice;

/// A sort of `Vec` on initialized data.
pub type List<'a, T> = Partial<Slice<'a, T>>;

/// A 'drop-in' replacement for the interface of `alloc`, excluding instantiation.
///
/// A strict `no_std` crate can not allocate on its own, so calling code passes the memory to it.
/// This is easy when the interface can use a generic slice. However, the `Owned` variant of
/// `Slice` must name a vector type in the type system.
///
/// The replacement declared here offers an *interface* similar to the standard vector but is
/// uninhabited, it can't be instantiated. This allows matching on `Slice` without `#[cfg]`
/// switches on the match arms.
#[cfg(all(
    not(feature = "std"),
    not(test)))]
pub mod alloc {
    /// Replacement for `alloc::vec`.
    pub mod vec {
        pub use crate::managed::phantom_vec::Vec;
    }
}
