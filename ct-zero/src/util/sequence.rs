use std::cmp::Reverse;
use std::iter::Zip;

use decorum::N32;

/// The index of the first maximum of `values`. Panics on `NaN`.
pub fn first_max_index(values: impl IntoIterator<Item = f32>) -> Option<usize> {
    values
        .into_iter()
        .enumerate()
        .min_by_key(|&(i, v)| (Reverse(N32::from_inner(v)), i))
        .map(|(i, _)| i)
}

pub fn zip_eq_exact<L, R, LI, RI>(left: L, right: R) -> Zip<LI, RI>
where
    L: IntoIterator<IntoIter = LI>,
    R: IntoIterator<IntoIter = RI>,
    LI: ExactSizeIterator,
    RI: ExactSizeIterator,
{
    let left = left.into_iter();
    let right = right.into_iter();
    assert_eq!(left.len(), right.len(), "Both iterators must have the same length");
    left.zip(right)
}
