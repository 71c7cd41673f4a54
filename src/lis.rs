//! Longest increasing subsequence, as used to find the children that can stay where they are.
//!
//! Values that compare equal are treated as already in order, so with duplicate inputs the result is
//! really a longest *non-decreasing* subsequence. Claim orders are distinct, which makes the two the same.

/// Returns the first index in `low..high` whose key is greater than `value`, or `high` if there is none.
///
/// `key` must be non-decreasing over that range.
pub fn upper_bound<T: PartialOrd>(mut low: usize, mut high: usize, key: impl Fn(usize) -> T, value: T) -> usize {
	while low < high {
		let mid = low + (high - low) / 2;
		if key(mid) <= value {
			low = mid + 1;
		} else {
			high = mid;
		}
	}
	low
}

/// Finds one longest increasing subsequence of `values` in `O(n log n)`.
///
/// The result lists indices into `values`, in ascending order.
#[must_use]
pub fn longest_increasing_subsequence<T: PartialOrd>(values: &[T]) -> Vec<usize> {
	// `tails[l]`: index of the smallest value that ends an increasing run of length `l + 1`.
	let mut tails: Vec<usize> = Vec::with_capacity(values.len());
	let mut predecessors: Vec<Option<usize>> = Vec::with_capacity(values.len());

	for (i, current) in values.iter().enumerate() {
		// Number of runs that `current` can extend. Fast path for the longest run.
		let extends = match tails.last() {
			Some(&last) if values[last] <= *current => tails.len(),
			_ => upper_bound(0, tails.len(), |l| &values[tails[l]], current),
		};

		predecessors.push(extends.checked_sub(1).map(|l| tails[l]));

		// `current` is now the smallest tail of length `extends + 1`, or it would have extended further.
		if extends == tails.len() {
			tails.push(i);
		} else {
			tails[extends] = i;
		}
	}

	let mut subsequence = Vec::with_capacity(tails.len());
	let mut cursor = tails.last().copied();
	while let Some(i) = cursor {
		subsequence.push(i);
		cursor = predecessors[i];
	}
	subsequence.reverse();
	subsequence
}
