/// Path rewriting helpers
/// Paths are ordered lists of signed segment ids kept as advisory metadata
/// on the graph. The mutators rewrite them with the pure functions in this
/// module, so each rewriting rule can be tested on its own.

/// Replace every occurrence of a consecutive pattern with a single id.
pub fn find_replace(path: &[i64], pattern: &[i64], replacement: i64) -> Vec<i64> {
    let mut result: Vec<i64> = path.to_vec();
    if pattern.is_empty() {
        return result;
    }
    loop {
        let found = (0..result.len())
            .find(|&i| result[i..].starts_with(pattern));
        match found {
            Some(i) => {
                result.splice(i..i + pattern.len(), [replacement]);
            }
            None => return result,
        }
    }
}

/// Insert an id between every adjacent (first, second) pair.
pub fn insert_between(path: &[i64], first: i64, second: i64, inserted: i64) -> Vec<i64> {
    if path.len() < 2 {
        return path.to_vec();
    }
    let mut result = Vec::with_capacity(path.len() + 1);
    for window in path.windows(2) {
        result.push(window[0]);
        if window[0] == first && window[1] == second {
            result.push(inserted);
        }
    }
    result.push(path[path.len() - 1]);
    result
}

/// Split a path at every occurrence of the given id, excluding the id
/// itself. Fragments with fewer than two segments are discarded; they are
/// no longer useful as paths.
pub fn split_on(path: &[i64], seg: i64) -> Vec<Vec<i64>> {
    path.split(|x| *x == seg)
        .filter(|part| part.len() > 1)
        .map(|part| part.to_vec())
        .collect()
}

/// Split a path on every id in the given set, keeping only fragments with
/// at least two segments.
pub fn split_on_all(path: &[i64], segs: &[i64]) -> Vec<Vec<i64>> {
    let mut parts = vec![path.to_vec()];
    for seg in segs {
        parts = parts
            .iter()
            .flat_map(|part| split_on(part, *seg))
            .collect();
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_replace_single() {
        assert_eq!(find_replace(&[1, 5, 8, 3], &[5, 8], 7), vec![1, 7, 3]);
    }

    #[test]
    fn test_find_replace_multiple_occurrences() {
        assert_eq!(find_replace(&[5, 8, 2, 5, 8], &[5, 8], 7), vec![7, 2, 7]);
    }

    #[test]
    fn test_find_replace_absent_pattern() {
        assert_eq!(find_replace(&[1, 2, 3], &[5, 8], 7), vec![1, 2, 3]);
    }

    #[test]
    fn test_insert_between() {
        assert_eq!(insert_between(&[1, 2, 4], 2, 4, 3), vec![1, 2, 3, 4]);
        assert_eq!(insert_between(&[2, 4, 2, 4], 2, 4, 3), vec![2, 3, 4, 2, 3, 4]);
        assert_eq!(insert_between(&[1, 2], 9, 9, 3), vec![1, 2]);
        assert_eq!(insert_between(&[1], 1, 1, 3), vec![1]);
    }

    #[test]
    fn test_split_on() {
        assert_eq!(split_on(&[1, 2, 9, 3, 4], 9), vec![vec![1, 2], vec![3, 4]]);
        // fragments of one segment are discarded
        assert_eq!(split_on(&[1, 9, 3, 4], 9), vec![vec![3, 4]]);
        assert!(split_on(&[9, 1], 9).is_empty());
    }

    #[test]
    fn test_split_on_all() {
        assert_eq!(
            split_on_all(&[1, 2, 9, 3, 4, 8, 5, 6], &[9, 8]),
            vec![vec![1, 2], vec![3, 4], vec![5, 6]]
        );
        assert!(split_on_all(&[1, 9, 2], &[9]).is_empty());
    }
}
