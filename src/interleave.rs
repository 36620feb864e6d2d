// 🔀 Interleaver - round-robin merge of branch feeds
//
// Index 0 of every feed, then index 1 of every feed, and so on up to the
// longest feed. Exhausted feeds are skipped, so feeds may differ in length.

/// Merge `feeds` into one sequence in round-robin order.
///
/// Example:
/// ```
/// use revenue_aggregator::interleave;
///
/// let merged = interleave(&[vec![1, 4], vec![2], vec![3, 5, 6]]);
/// assert_eq!(merged, vec![1, 2, 3, 4, 5, 6]);
/// ```
pub fn interleave<T: Clone>(feeds: &[Vec<T>]) -> Vec<T> {
    let longest = feeds.iter().map(Vec::len).max().unwrap_or(0);
    let total = feeds.iter().map(Vec::len).sum();
    let mut merged = Vec::with_capacity(total);

    for i in 0..longest {
        for feed in feeds {
            if let Some(item) = feed.get(i) {
                merged.push(item.clone());
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interleave_round_robin() {
        let feeds = vec![vec!["a0", "a1", "a2"], vec!["b0", "b1", "b2"]];
        assert_eq!(interleave(&feeds), vec!["a0", "b0", "a1", "b1", "a2", "b2"]);
    }

    #[test]
    fn test_interleave_uneven_feeds() {
        let feeds = vec![vec!["a0"], vec!["b0", "b1", "b2"], vec![], vec!["d0", "d1"]];
        assert_eq!(interleave(&feeds), vec!["a0", "b0", "d0", "b1", "d1", "b2"]);
    }

    #[test]
    fn test_interleave_empty_inputs() {
        let none: Vec<Vec<u8>> = vec![];
        assert!(interleave(&none).is_empty());

        let all_empty: Vec<Vec<u8>> = vec![vec![], vec![], vec![]];
        assert!(interleave(&all_empty).is_empty());
    }

    #[test]
    fn test_interleave_keeps_every_item() {
        let feeds = vec![vec![1, 2, 3, 4], vec![5], vec![6, 7]];
        let mut merged = interleave(&feeds);
        merged.sort();
        assert_eq!(merged, vec![1, 2, 3, 4, 5, 6, 7]);
    }
}
