//! Subset masks over the source list.
//!
//! A candidate subset of `k` sources is a `u64` whose bit `i` selects source
//! `i`. Exhaustive search over `2^k` masks is exponential by nature; `k` is
//! capped at [`MAX_SOURCE_NODES`] so every mask fits in one word.

/// Bitmask over source indices.
pub type SubsetMask = u64;

/// Largest source count that can be enumerated.
pub const MAX_SOURCE_NODES: usize = 63;

/// Number of members in `mask`.
#[inline]
pub fn size(mask: SubsetMask) -> usize {
    mask.count_ones() as usize
}

/// Mask selecting all of the first `k` sources.
#[inline]
pub fn full(k: usize) -> SubsetMask {
    debug_assert!(k <= MAX_SOURCE_NODES);
    (1u64 << k) - 1
}

/// Source indices selected by `mask`, ascending.
pub fn members(mask: SubsetMask) -> impl Iterator<Item = usize> {
    let mut rest = mask;
    std::iter::from_fn(move || {
        if rest == 0 {
            return None;
        }
        let i = rest.trailing_zeros() as usize;
        rest &= rest - 1;
        Some(i)
    })
}

/// `n choose r`, saturating at `u64::MAX`.
pub fn binomial(n: usize, r: usize) -> u64 {
    if r > n {
        return 0;
    }
    let r = r.min(n - r);
    let mut acc: u128 = 1;
    for i in 0..r {
        // acc is C(n, i) here, so the division is exact.
        match acc.checked_mul((n - i) as u128) {
            Some(v) => acc = v / (i + 1) as u128,
            None => return u64::MAX,
        }
    }
    u64::try_from(acc).unwrap_or(u64::MAX)
}

/// Number of subsets of `k` items whose size lies in `[min, max]`,
/// saturating at `u64::MAX`.
pub fn count_in_window(k: usize, min: usize, max: usize) -> u64 {
    (min..=max.min(k)).fold(0u64, |acc, s| acc.saturating_add(binomial(k, s)))
}

/// Every mask over `k` bits with exactly `s` members, ascending.
///
/// Uses Gosper's hack to step to the next mask with the same popcount.
pub fn masks_of_size(k: usize, s: usize) -> impl Iterator<Item = SubsetMask> {
    let limit: u64 = 1u64 << k;
    let mut next = if s <= k { Some(full(s)) } else { None };
    std::iter::from_fn(move || {
        let current = next?;
        next = if current == 0 {
            None
        } else {
            let c = current & current.wrapping_neg();
            let r = current + c;
            let candidate = (((r ^ current) >> 2) / c) | r;
            (candidate < limit && r != 0).then_some(candidate)
        };
        Some(current)
    })
}
