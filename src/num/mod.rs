use num_traits::{PrimInt, Unsigned};

/// Rounds `val` up to the next multiple of `align`, or `None` if that overflows `T`.
pub fn align_up_checked<T: PrimInt + Unsigned>(val: T, align: T) -> Option<T> {
  debug_assert!(align.count_ones() == 1, "align must be a power of two");

  let val = (val.checked_add(&align)?.checked_sub(&T::one()))?;
  let mask = !(align.checked_sub(&T::one())?);

  Some(val & mask)
}
