use crate::types::AssetIndex;

/// C(n, k). Returns 0 for k > n and 1 for k == 0.
pub fn combination_count(n: usize, k: usize) -> u128 {
    if k > n {
        return 0;
    }
    // C(n, k) = C(n, n-k)
    let k = k.min(n - k);
    let mut count = 1u128;
    for i in 0..k {
        count = count * (n - i) as u128 / (i + 1) as u128;
    }
    count
}

/// Advance `indices` to the next strictly increasing combination of `0..n`,
/// leaving the first `fixed` positions untouched.
///
/// Returns false (indices unspecified) once the last combination was passed.
pub fn next_combination(indices: &mut [AssetIndex], n: usize, fixed: usize) -> bool {
    let k = indices.len();

    // Try to increment from rightmost position
    for i in (fixed..k).rev() {
        let max_val = n - (k - i);
        if indices[i] < max_val {
            indices[i] += 1;
            // Reset all positions to the right
            for j in (i + 1)..k {
                indices[j] = indices[j - 1] + 1;
            }
            return true;
        }
    }
    false
}

/// Strictly increasing k-subsets of `0..n` in lexicographic order,
/// optionally rooted at a fixed first index
pub struct CombinationIter {
    n: usize,
    fixed: usize,
    current: Vec<AssetIndex>,
    exhausted: bool,
}

impl CombinationIter {
    pub fn new(n: usize, k: usize) -> Self {
        Self::starting_from(Vec::new(), 0, n, k)
    }

    /// Combinations whose smallest index is `first`
    pub fn rooted(first: AssetIndex, n: usize, k: usize) -> Self {
        if k == 0 {
            return Self::exhausted(n);
        }
        Self::starting_from(vec![first], first + 1, n, k)
    }

    fn starting_from(prefix: Vec<AssetIndex>, start: usize, n: usize, k: usize) -> Self {
        let fixed = prefix.len();
        if k == 0 || k < fixed || start + (k - fixed) > n || prefix.iter().any(|&i| i >= n) {
            return Self::exhausted(n);
        }

        let mut current = prefix;
        current.extend(start..start + (k - fixed));
        Self {
            n,
            fixed,
            current,
            exhausted: false,
        }
    }

    fn exhausted(n: usize) -> Self {
        Self {
            n,
            fixed: 0,
            current: Vec::new(),
            exhausted: true,
        }
    }
}

impl Iterator for CombinationIter {
    type Item = Vec<AssetIndex>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let combo = self.current.clone();
        self.exhausted = !next_combination(&mut self.current, self.n, self.fixed);
        Some(combo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combination_count() {
        assert_eq!(combination_count(6, 2), 15);
        assert_eq!(combination_count(4, 2), 6);
        assert_eq!(combination_count(5, 0), 1);
        assert_eq!(combination_count(3, 4), 0);
        assert_eq!(combination_count(40, 20), 137_846_528_820);
    }

    #[test]
    fn test_six_choose_two() {
        let combos: Vec<_> = CombinationIter::new(6, 2).collect();
        assert_eq!(combos.len(), 15);
        assert_eq!(combos.first(), Some(&vec![0, 1]));
        assert_eq!(combos.last(), Some(&vec![4, 5]));
        for combo in &combos {
            assert!(combo.windows(2).all(|w| w[0] < w[1]));
        }
        let mut dedup = combos.clone();
        dedup.dedup();
        assert_eq!(dedup.len(), combos.len());
    }

    #[test]
    fn test_rooted_partitions_cover_space() {
        let (n, k) = (7, 3);
        let mut joined = Vec::new();
        for first in 0..=n - k {
            let part: Vec<_> = CombinationIter::rooted(first, n, k).collect();
            assert!(part.iter().all(|c| c[0] == first));
            joined.extend(part);
        }
        let sequential: Vec<_> = CombinationIter::new(n, k).collect();
        assert_eq!(joined, sequential);
    }

    #[test]
    fn test_degenerate_sizes() {
        assert_eq!(CombinationIter::new(3, 0).count(), 0);
        assert_eq!(CombinationIter::new(2, 3).count(), 0);
        assert_eq!(CombinationIter::new(3, 3).count(), 1);
        assert_eq!(CombinationIter::rooted(5, 6, 2).count(), 0);
        assert_eq!(CombinationIter::rooted(4, 6, 2).count(), 1);
    }
}
