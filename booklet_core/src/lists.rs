//! Distribution algorithms over ordered sequences of metadata entities.
//!
//! Every function here is pure and deterministic: sequential numbers always
//! come from an explicit [`Counter`] or starting offset, never from an
//! implicit global, and no entity is ever dropped. Synthetic filler is only
//! added by [`pad_to_multiple`] and is clearly tagged by the caller.

use serde_json::Value;

use crate::BookletError;
use crate::BookletResult;

/// First value of the descending sentinel range reserved for filler
/// identities. Real entities never draw from this range.
pub const FILLER_SENTINEL_START: i64 = 999;

/// An explicit monotonic source of sequential numbers.
///
/// A bounded counter fails with `CounterExhausted` once the bound is
/// passed; there is no silent wraparound.
#[derive(Debug, Clone)]
pub struct Counter {
	next: i64,
	limit: Option<i64>,
}

impl Counter {
	pub fn new(start: i64) -> Self {
		Self {
			next: start,
			limit: None,
		}
	}

	/// A counter yielding values in `start..=last`.
	pub fn bounded(start: i64, last: i64) -> Self {
		Self {
			next: start,
			limit: Some(last),
		}
	}

	/// Draw the next value, advancing the counter.
	pub fn draw(&mut self) -> BookletResult<i64> {
		if let Some(last) = self.limit {
			if self.next > last {
				return Err(BookletError::CounterExhausted(last));
			}
		}
		let value = self.next;
		self.next += 1;
		Ok(value)
	}
}

/// Assign each item an `index` field equal to its position plus `start`,
/// overwriting any previous value. Re-applying with the same `start` is a
/// no-op.
pub fn numerate(mut items: Vec<Value>, start: i64) -> Vec<Value> {
	for (position, item) in items.iter_mut().enumerate() {
		if let Some(object) = item.as_object_mut() {
			object.insert("index".to_string(), Value::from(position as i64 + start));
		}
	}
	items
}

/// Assign each item an `id` field drawn from `counter`, in input order.
pub fn add_numbers(mut items: Vec<Value>, counter: &mut Counter) -> BookletResult<Vec<Value>> {
	for item in &mut items {
		let id = counter.draw()?;
		if let Some(object) = item.as_object_mut() {
			object.insert("id".to_string(), Value::from(id));
		}
	}
	Ok(items)
}

/// Partition into consecutive groups of exactly `size` items, preserving
/// input order.
///
/// The input length must be a multiple of `size`; padding is the caller's
/// responsibility (see [`pad_to_multiple`]) and an uneven length is an
/// explicit `UnevenSplit` failure rather than a silent short final group.
pub fn split_div(items: Vec<Value>, size: usize) -> BookletResult<Vec<Vec<Value>>> {
	if size == 0 || items.len() % size != 0 {
		return Err(BookletError::UnevenSplit {
			len: items.len(),
			size,
		});
	}

	let mut groups = Vec::with_capacity(items.len() / size);
	let mut iter = items.into_iter();
	while iter.len() != 0 {
		groups.push(iter.by_ref().take(size).collect());
	}
	Ok(groups)
}

/// Assign the item at position `p` to bucket `(p + first) % buckets`,
/// preserving relative order within each bucket.
///
/// Unlike [`split_div`] this never produces a remainder group: every bucket
/// receives either `len / buckets` or one more item.
pub fn split_mod(items: Vec<Value>, buckets: usize, first: usize) -> Vec<Vec<Value>> {
	if buckets == 0 {
		return Vec::new();
	}

	let mut result: Vec<Vec<Value>> = (0..buckets).map(|_| Vec::new()).collect();
	for (position, item) in items.into_iter().enumerate() {
		result[(position + first) % buckets].push(item);
	}
	result
}

/// Append synthetic filler entities until the length is a multiple of
/// `size`.
///
/// `make_filler` receives a sentinel number from the descending range
/// `999, 998, …` reserved for filler, so filler identities never collide
/// with a genuine entity and sort after all real ones.
pub fn pad_to_multiple<F>(items: &mut Vec<Value>, size: usize, mut make_filler: F)
where
	F: FnMut(i64) -> Value,
{
	if size == 0 {
		return;
	}

	let mut sentinel = FILLER_SENTINEL_START;
	while items.len() % size != 0 {
		items.push(make_filler(sentinel));
		sentinel -= 1;
	}
}
