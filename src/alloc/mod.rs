pub mod allocator;
mod raw;
pub mod types;

#[doc(inline)]
pub use allocator::*;
#[doc(inline)]
pub use types::{
  CapacityPolicy, DEFAULT_ARRAY_CAPACITY, DEFAULT_GROWTH_FACTOR, DEFAULT_STRING_CAPACITY, Error, InvalidOperation, Pending, array::Array, string::{String, Terminator}, view::ArrayView
};
