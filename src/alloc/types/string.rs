use core::{
  cmp::Ordering, fmt::{self, Debug, Display}, hash::{Hash, Hasher}, ops::Deref, str::{self, Utf8Error}
};

use crate::alloc::{
  Array, ArrayView, CStyleAllocator, CapacityPolicy, DEFAULT_STRING_CAPACITY, Error, InvalidOperation,
  OverflowedLayoutCalculation, Pending
};

/// Whether [String::to_owned_bytes] ends the copy with a NUL byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Terminator {
  /// Append a single `0` after the content, for handing to C.
  Nul,
  /// Copy the content only.
  #[default]
  None,
}

/// A growable run of bytes.
///
/// No encoding is assumed or enforced; [Display] shows invalid UTF-8 as U+FFFD. The content is never NUL-terminated
/// internally, see [Terminator] for producing a terminated copy.
pub struct String<A: CStyleAllocator> {
  bytes: Array<u8, A>,
}

impl<A: CStyleAllocator + Default> String<A> {
  pub fn new() -> Result<Self, Error> {
    Self::new_in(A::default())
  }

  pub fn with_capacity(capacity: usize) -> Result<Self, Error> {
    Self::with_capacity_in(capacity, A::default())
  }

  pub fn from_bytes(source: impl AsRef<[u8]>) -> Result<Self, Error> {
    Self::from_bytes_in(source, A::default())
  }
}

impl<A: CStyleAllocator> String<A> {
  pub fn new_in(allocator: A) -> Result<Self, Error> {
    Self::with_capacity_in(DEFAULT_STRING_CAPACITY, allocator)
  }

  pub fn with_capacity_in(capacity: usize, allocator: A) -> Result<Self, Error> {
    Self::with_capacity_and_policy_in(capacity, CapacityPolicy::default(), allocator)
  }

  pub fn with_capacity_and_policy_in(capacity: usize, policy: CapacityPolicy, allocator: A) -> Result<Self, Error> {
    Ok(Self {
      bytes: Array::with_capacity_and_policy_in(capacity, policy, allocator)?,
    })
  }

  /// Copies `source` into a new string. The capacity starts at the default and grows by the policy until the
  /// content fits, so it is the same capacity pushing the bytes one at a time would reach.
  pub fn from_bytes_in(source: impl AsRef<[u8]>, allocator: A) -> Result<Self, Error> {
    let source = source.as_ref();
    let policy = CapacityPolicy::default();
    let capacity = policy
      .next_capacity(0, DEFAULT_STRING_CAPACITY, Pending::Insert(source.len()))?
      .unwrap_or(DEFAULT_STRING_CAPACITY);

    let mut string = Self::with_capacity_and_policy_in(capacity, policy, allocator)?;
    string.push_bytes(source)?;
    Ok(string)
  }

  pub fn len(&self) -> usize {
    self.bytes.len()
  }

  pub fn capacity(&self) -> usize {
    self.bytes.capacity()
  }

  pub fn is_empty(&self) -> bool {
    self.bytes.is_empty()
  }

  pub fn is_destroyed(&self) -> bool {
    self.bytes.is_destroyed()
  }

  pub fn policy(&self) -> CapacityPolicy {
    self.bytes.policy()
  }

  pub fn allocator(&self) -> &A {
    self.bytes.allocator()
  }

  pub fn as_bytes(&self) -> &[u8] {
    self.bytes.as_slice()
  }

  pub fn to_str(&self) -> Result<&str, Utf8Error> {
    str::from_utf8(self.as_bytes())
  }

  pub fn reserve(&mut self, capacity: usize) -> Result<(), Error> {
    self.bytes.reserve(capacity)
  }

  pub fn expand(&mut self) -> Result<(), Error> {
    self.bytes.expand()
  }

  pub fn shrink(&mut self) -> Result<(), Error> {
    self.bytes.shrink()
  }

  pub fn push(&mut self, byte: u8) -> Result<(), Error> {
    self.bytes.push(byte)
  }

  /// Appends `source`, growing at most once.
  pub fn push_bytes(&mut self, source: impl AsRef<[u8]>) -> Result<(), Error> {
    self.bytes.extend_from_copies(source.as_ref())
  }

  pub fn push_str(&mut self, source: &str) -> Result<(), Error> {
    self.push_bytes(source)
  }

  pub fn insert(&mut self, index: usize, byte: u8) -> Result<(), Error> {
    self.bytes.insert(index, byte)
  }

  pub fn remove(&mut self, index: usize) -> Result<u8, Error> {
    self.bytes.remove(index)
  }

  pub fn pop(&mut self) -> Result<u8, Error> {
    self.bytes.pop()
  }

  pub fn clear(&mut self) {
    self.bytes.clear();
  }

  /// Copies all of `other` onto the end. `other` is left as it was.
  pub fn concat<B: CStyleAllocator>(&mut self, other: &String<B>) -> Result<(), Error> {
    self.push_bytes(other.as_bytes())
  }

  /// Copies the first `count` bytes of `other` onto the end.
  pub fn concat_count<B: CStyleAllocator>(&mut self, other: &String<B>, count: usize) -> Result<(), Error> {
    match other.as_bytes().get(..count) {
      Some(prefix) => self.push_bytes(prefix),
      None => Err(Error::OutOfBounds {
        index: count,
        length: other.len(),
      }),
    }
  }

  /// Lexicographic byte order; a string that is a prefix of another sorts first.
  pub fn compare<B: CStyleAllocator>(&self, other: &String<B>) -> Ordering {
    self.as_bytes().cmp(other.as_bytes())
  }

  /// Borrows `[start, end)`, clamped like [Array::view].
  pub fn view(&self, start: usize, end: usize) -> ArrayView<'_, u8> {
    self.bytes.view(start, end)
  }

  pub fn as_view(&self) -> ArrayView<'_, u8> {
    self.bytes.as_view()
  }

  /// Frees the buffer. Destroying a string twice is an invalid operation.
  pub fn destroy(&mut self) -> Result<(), Error> {
    self.bytes.destroy()
  }
}

impl<A: CStyleAllocator + Clone> String<A> {
  /// Deep copy with the same capacity and policy.
  pub fn try_clone(&self) -> Result<Self, Error> {
    Ok(Self {
      bytes: self.bytes.try_clone()?,
    })
  }

  /// Copies the content into an exactly sized byte array, optionally NUL-terminated.
  pub fn to_owned_bytes(&self, terminator: Terminator) -> Result<Array<u8, A>, Error> {
    if self.is_destroyed() {
      return Err(InvalidOperation::Destroyed.into());
    }

    let extra = match terminator {
      Terminator::Nul => 1,
      Terminator::None => 0,
    };
    let capacity = self.len().checked_add(extra).ok_or(OverflowedLayoutCalculation)?;

    let mut bytes = Array::with_capacity_and_policy_in(capacity.max(1), self.policy(), self.allocator().clone())?;
    bytes.extend_from_copies(self.as_bytes())?;
    if terminator == Terminator::Nul {
      bytes.push(0)?;
    }

    Ok(bytes)
  }
}

impl<A: CStyleAllocator> Deref for String<A> {
  type Target = [u8];

  fn deref(&self) -> &[u8] {
    self.as_bytes()
  }
}

impl<A: CStyleAllocator> AsRef<[u8]> for String<A> {
  fn as_ref(&self) -> &[u8] {
    self.as_bytes()
  }
}

impl<A: CStyleAllocator, B: CStyleAllocator> PartialEq<String<B>> for String<A> {
  fn eq(&self, other: &String<B>) -> bool {
    self.as_bytes() == other.as_bytes()
  }
}

impl<A: CStyleAllocator> Eq for String<A> {}

impl<A: CStyleAllocator> PartialEq<[u8]> for String<A> {
  fn eq(&self, other: &[u8]) -> bool {
    self.as_bytes() == other
  }
}

impl<A: CStyleAllocator> PartialEq<str> for String<A> {
  fn eq(&self, other: &str) -> bool {
    self.as_bytes() == other.as_bytes()
  }
}

impl<A: CStyleAllocator> PartialEq<&str> for String<A> {
  fn eq(&self, other: &&str) -> bool {
    self.as_bytes() == other.as_bytes()
  }
}

impl<A: CStyleAllocator, B: CStyleAllocator> PartialOrd<String<B>> for String<A> {
  fn partial_cmp(&self, other: &String<B>) -> Option<Ordering> {
    Some(self.compare(other))
  }
}

impl<A: CStyleAllocator> Ord for String<A> {
  fn cmp(&self, other: &Self) -> Ordering {
    self.compare(other)
  }
}

impl<A: CStyleAllocator> Hash for String<A> {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.as_bytes().hash(state);
  }
}

impl<A: CStyleAllocator> Display for String<A> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for chunk in self.as_bytes().utf8_chunks() {
      f.write_str(chunk.valid())?;
      if !chunk.invalid().is_empty() {
        f.write_str("\u{FFFD}")?;
      }
    }
    Ok(())
  }
}

impl<A: CStyleAllocator> Debug for String<A> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "\"{}\"", self.as_bytes().escape_ascii())
  }
}

impl<A: CStyleAllocator> fmt::Write for String<A> {
  fn write_str(&mut self, s: &str) -> fmt::Result {
    self.push_str(s).map_err(|_| fmt::Error)
  }
}

#[cfg(test)]
mod tests {
  use core::{cmp::Ordering, fmt::Write};
  use std::string::ToString;

  use super::{String, Terminator};
  use crate::alloc::{ArenaAllocator, Error, InvalidOperation, StdAlloc};

  type Text = String<StdAlloc>;

  #[test]
  fn concat_copies_other() {
    let mut first = Text::new().unwrap();
    first.push_bytes("hello").unwrap();
    let second = Text::from_bytes("world").unwrap();

    first.concat(&second).unwrap();
    assert_eq!(first, "helloworld");
    assert_eq!(first.len(), 10);
    assert_eq!(second, "world");
    assert_eq!(second.len(), 5);
  }

  #[test]
  fn concat_count_takes_prefix() {
    let mut first = Text::from_bytes("ab").unwrap();
    let second = Text::from_bytes("cdef").unwrap();

    first.concat_count(&second, 2).unwrap();
    assert_eq!(first, "abcd");
    assert_eq!(first.concat_count(&second, 5), Err(Error::OutOfBounds { index: 5, length: 4 }));
    assert_eq!(first, "abcd");
  }

  #[test]
  fn from_bytes_capacity_follows_policy() {
    assert_eq!(Text::from_bytes("short").unwrap().capacity(), 12);
    assert_eq!(Text::from_bytes("exactly 12 b").unwrap().capacity(), 12);
    assert_eq!(Text::from_bytes("thirteen byte").unwrap().capacity(), 60);
    assert_eq!(Text::from_bytes("").unwrap().capacity(), 12);
  }

  #[test]
  fn bulk_push_grows_once() {
    let mut text = Text::new().unwrap();
    text.push_bytes([b'x'; 100]).unwrap();
    assert_eq!((text.len(), text.capacity()), (100, 300));
  }

  #[test]
  fn insert_and_remove_shift_bytes() {
    let mut text = Text::from_bytes("helo").unwrap();
    text.insert(3, b'l').unwrap();
    assert_eq!(text, "hello");
    assert_eq!(text.remove(0), Ok(b'h'));
    assert_eq!(text, "ello");
    assert_eq!(text.insert(5, b'!'), Err(Error::OutOfBounds { index: 5, length: 4 }));
    assert_eq!(text.remove(4), Err(Error::OutOfBounds { index: 4, length: 4 }));
    assert_eq!(text.pop(), Ok(b'o'));
    assert_eq!(text, "ell");
  }

  #[test]
  fn compare_is_lexicographic() {
    let apple = Text::from_bytes("apple").unwrap();
    let apples = Text::from_bytes("apples").unwrap();
    let banana = Text::from_bytes("banana").unwrap();

    assert_eq!(apple.compare(&apples), Ordering::Less);
    assert_eq!(banana.compare(&apple), Ordering::Greater);
    assert_eq!(apple.compare(&apple.try_clone().unwrap()), Ordering::Equal);
    assert!(apple < banana);
  }

  #[test]
  fn owned_bytes_terminator_is_chosen_by_caller() {
    let text = Text::from_bytes("bean").unwrap();

    let terminated = text.to_owned_bytes(Terminator::Nul).unwrap();
    assert_eq!(terminated, *b"bean\0");
    assert_eq!(terminated.capacity(), 5);

    let bare = text.to_owned_bytes(Terminator::None).unwrap();
    assert_eq!(bare, *b"bean");

    let empty = Text::new().unwrap().to_owned_bytes(Terminator::None).unwrap();
    assert!(empty.is_empty());
  }

  #[test]
  fn display_replaces_invalid_utf8() {
    let text = Text::from_bytes(b"caf\xc3\xa9 \xff!").unwrap();
    assert_eq!(text.to_string(), "café \u{FFFD}!");
    assert!(text.to_str().is_err());
    assert_eq!(std::format!("{:?}", Text::from_bytes("a\n\"").unwrap()), "\"a\\n\\\"\"");
  }

  #[test]
  fn formatting_writes_into_string() {
    let mut text = Text::new().unwrap();
    write!(text, "{} + {} = {}", 2, 3, 2 + 3).unwrap();
    assert_eq!(text, "2 + 3 = 5");
    assert_eq!(text.to_str(), Ok("2 + 3 = 5"));
  }

  #[test]
  fn clone_is_deep() {
    let original = Text::from_bytes("bean").unwrap();
    let mut clone = original.try_clone().unwrap();
    clone.push_str("stalk").unwrap();
    assert_eq!(original, "bean");
    assert_eq!(clone, "beanstalk");
  }

  #[test]
  fn view_windows_content() {
    let text = Text::from_bytes("hello world").unwrap();
    assert_eq!(text.view(6, 11), *b"world");
    assert_eq!(text.view(20, 5), *b"hello");
    assert!(text.view(6, 11).bytes_eq(&Text::from_bytes("world").unwrap().as_view()));
  }

  #[test]
  fn destroy_twice_is_invalid() {
    let mut text = Text::from_bytes("gone").unwrap();
    text.destroy().unwrap();
    assert!(text.is_destroyed());
    assert!(text.is_empty());
    assert_eq!(text.destroy(), Err(InvalidOperation::Destroyed.into()));
    assert_eq!(text.push(b'x'), Err(InvalidOperation::Destroyed.into()));
  }

  #[test]
  fn destroyed_string_has_no_owned_bytes() {
    let mut text = Text::from_bytes("gone").unwrap();
    text.destroy().unwrap();
    assert_eq!(text.to_owned_bytes(Terminator::None).err(), Some(InvalidOperation::Destroyed.into()));
    assert_eq!(text.to_owned_bytes(Terminator::Nul).err(), Some(InvalidOperation::Destroyed.into()));
  }

  #[test]
  fn pop_shrinks_before_removing() {
    let mut text = Text::from_bytes("thirteen byte").unwrap();
    assert_eq!(text.capacity(), 60);

    assert_eq!(text.pop(), Ok(b'e'));
    assert_eq!((text.len(), text.capacity()), (12, 60));
    assert_eq!(text.pop(), Ok(b't'));
    assert_eq!((text.len(), text.capacity()), (11, 12));
    assert_eq!(text, "thirteen by");

    while text.len() > 2 {
      text.pop().unwrap();
      assert_eq!(text.capacity(), 12);
    }
    assert_eq!(text.pop(), Ok(b'h'));
    assert_eq!((text.len(), text.capacity()), (1, 2));
    assert_eq!(text.pop(), Ok(b't'));
    assert_eq!((text.len(), text.capacity()), (0, 2));
    assert_eq!(text.pop(), Err(InvalidOperation::Empty.into()));
  }

  #[test]
  fn clear_keeps_capacity() {
    let mut text = Text::from_bytes("thirteen byte").unwrap();
    text.clear();
    assert!(text.is_empty());
    assert_eq!(text.capacity(), 60);
    assert_eq!(text.pop(), Err(InvalidOperation::Empty.into()));
  }

  #[test]
  fn exhausted_arena_destroys_string() {
    let mut buffer = [core::mem::MaybeUninit::uninit(); 32];
    let arena = ArenaAllocator::new(&mut buffer);
    let mut text = String::new_in(&arena).unwrap();
    text.push_str("twelve bytes").unwrap();
    assert!(matches!(text.push(b'!'), Err(Error::AllocationFailure(_))));
    assert!(text.is_destroyed());
    assert_eq!(text.len(), 0);
  }

  mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
      #[test]
      fn pushes_keep_capacity_above_length(bytes in proptest::collection::vec(any::<u8>(), 0..500)) {
        let mut text = Text::new().unwrap();
        for &byte in &bytes {
          text.push(byte).unwrap();
          prop_assert!(text.capacity() >= text.len());
        }
        prop_assert_eq!(text.as_bytes(), bytes.as_slice());
      }

      #[test]
      fn push_then_pop_returns_to_empty(bytes in proptest::collection::vec(any::<u8>(), 1..300)) {
        let mut text = Text::new().unwrap();
        for &byte in &bytes {
          text.push(byte).unwrap();
        }
        for &byte in bytes.iter().rev() {
          prop_assert_eq!(text.pop(), Ok(byte));
          prop_assert!(text.capacity() >= text.len());
          prop_assert!(text.capacity() > 0);
        }
        prop_assert!(text.is_empty());
        prop_assert_eq!(text.pop(), Err(InvalidOperation::Empty.into()));
      }

      #[test]
      fn clone_then_mutate_leaves_original(bytes in proptest::collection::vec(any::<u8>(), 0..80), extra in proptest::collection::vec(any::<u8>(), 1..40)) {
        let original = Text::from_bytes(&bytes).unwrap();
        let mut clone = original.try_clone().unwrap();
        prop_assert_eq!(clone.capacity(), original.capacity());

        clone.push_bytes(&extra).unwrap();
        if !bytes.is_empty() {
          clone.remove(0).unwrap();
        }

        prop_assert_eq!(original.as_bytes(), bytes.as_slice());
        prop_assert_eq!(clone.len(), bytes.len() + extra.len() - usize::from(!bytes.is_empty()));
      }

      #[test]
      fn compare_matches_slice_order(a in proptest::collection::vec(any::<u8>(), 0..20), b in proptest::collection::vec(any::<u8>(), 0..20)) {
        let (first, second) = (Text::from_bytes(&a).unwrap(), Text::from_bytes(&b).unwrap());
        prop_assert_eq!(first.compare(&second), a.cmp(&b));
        prop_assert_eq!(first == second, a == b);
      }

      #[test]
      fn concat_preserves_both(a in ".{0,40}", b in ".{0,40}") {
        let mut first = Text::from_bytes(&a).unwrap();
        let second = Text::from_bytes(&b).unwrap();
        first.concat(&second).unwrap();
        let joined = std::format!("{a}{b}");
        prop_assert_eq!(first.to_str(), Ok(joined.as_str()));
        prop_assert_eq!(second.to_str(), Ok(b.as_str()));
      }

      #[test]
      fn insert_then_remove_is_a_no_op(bytes in proptest::collection::vec(any::<u8>(), 0..60), index in any::<prop::sample::Index>(), byte in any::<u8>()) {
        let mut text = Text::from_bytes(&bytes).unwrap();
        let index = index.index(bytes.len() + 1);
        text.insert(index, byte).unwrap();
        prop_assert_eq!(text.remove(index), Ok(byte));
        prop_assert_eq!(text.as_bytes(), bytes.as_slice());
      }
    }
  }
}
