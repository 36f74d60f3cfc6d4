use std::{mem::MaybeUninit, process::ExitCode};

use beanstd::alloc::{ArenaAllocator, Array, Error, Malloc, String};
use beanstd_runner::{Check, init_logging, run_checks};

const CHECKS: &[Check] = &[
  Check::new("Are tests working", tests_are_working),
  Check::new("array grows by the growth factor", array_grows_by_factor),
  Check::new("array shrinks before removing", array_shrinks_before_removing),
  Check::new("append moves elements", append_moves_elements),
  Check::new("string concat copies", string_concat_copies),
  Check::new("exhausted allocator destroys the array", exhausted_allocator_destroys_array),
  Check::new("realloc pointer addresses", realloc_pointer_addresses),
];

fn tests_are_working() -> Result<bool, Error> {
  Ok(1 != 0)
}

fn array_grows_by_factor() -> Result<bool, Error> {
  let mut array = Array::<u32, Malloc>::with_capacity(5)?;
  for value in 1..=5 {
    array.push(value)?;
  }
  let before = (array.len(), array.capacity());

  array.push(6)?;
  let slice = array.slice(1, 4)?;

  Ok(before == (5, 5) && (array.len(), array.capacity()) == (6, 25) && slice == [2, 3, 4])
}

fn array_shrinks_before_removing() -> Result<bool, Error> {
  let mut array = Array::<u64, Malloc>::new()?;
  array.extend_from_slice(&[1, 2, 3, 4, 5, 6])?;
  array.pop()?;
  let popped = array.pop()?;

  Ok(popped == 5 && array.capacity() == 5 && array == [1, 2, 3, 4])
}

fn append_moves_elements() -> Result<bool, Error> {
  let mut first = Array::<String<Malloc>, Malloc>::new()?;
  let mut second = Array::<String<Malloc>, Malloc>::new()?;
  first.push(String::from_bytes("bean")?)?;
  second.push(String::from_bytes("stalk")?)?;

  first.append(&mut second)?;

  Ok(second.is_empty() && first.len() == 2 && first[0] == "bean" && first[1] == "stalk")
}

fn string_concat_copies() -> Result<bool, Error> {
  let mut first = String::<Malloc>::new()?;
  first.push_bytes("hello")?;
  let second = String::<Malloc>::from_bytes("world")?;

  first.concat(&second)?;

  Ok(first == "helloworld" && first.len() == 10 && second == "world")
}

fn exhausted_allocator_destroys_array() -> Result<bool, Error> {
  let mut buffer = [MaybeUninit::uninit(); 64];
  let mut array = Array::<u32, _>::with_capacity_in(5, ArenaAllocator::new(&mut buffer))?;
  array.extend_from_slice(&[1, 2, 3, 4, 5])?;

  let failed = matches!(array.push(6), Err(Error::AllocationFailure(_)));
  Ok(failed && array.is_destroyed() && array.is_empty())
}

fn realloc_pointer_addresses() -> Result<bool, Error> {
  let mut buffer = [MaybeUninit::uninit(); 2048];
  let arena = ArenaAllocator::new(&mut buffer);

  let mut array = Array::<u64, _>::with_capacity_in(5, &arena)?;
  array.extend_from_slice(&[1, 2, 3, 4, 5])?;
  let first = array.as_ptr();

  // The newest block grows where it is
  array.push(6)?;
  let grown = array.as_ptr();

  // Once something else sits after it, growing has to copy
  let blocker = Array::<u64, _>::with_capacity_in(5, &arena)?;
  array.extend_from_slice(&[7; 20])?;
  let moved = array.as_ptr();

  log::debug!(first:? = first, grown:? = grown, moved:? = moved; "array storage addresses");

  Ok(
    first == grown
      && moved != grown
      && arena.contains(moved.cast())
      && array.len() == 26
      && array[..6] == [1, 2, 3, 4, 5, 6]
      && array[6..].iter().all(|&value| value == 7)
      && blocker.capacity() == 5,
  )
}

fn main() -> ExitCode {
  let logger = match init_logging() {
    Ok(logger) => logger,
    Err(error) => {
      eprintln!("{error}");
      return ExitCode::FAILURE;
    }
  };

  match run_checks(CHECKS, logger) {
    0 => ExitCode::SUCCESS,
    failures => {
      log::error!("{failures} of {} checks failed", CHECKS.len());
      ExitCode::FAILURE
    }
  }
}
