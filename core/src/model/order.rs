use crate::model::ChangeLog;

/// Moves rows of `items` until the row that started at `i` sits at `dest[i]`.
///
/// `dest` must be a permutation of `0..items.len()`. Rows on a longest
/// increasing run of destinations stay where they are. Every other row is
/// moved once, directly behind the row that precedes it in the final order,
/// in ascending destination order. Returns the number of moves emitted.
pub(crate) fn reorder<T>(items: &mut Vec<T>, mut dest: Vec<usize>, changes: &mut ChangeLog) -> usize {
    debug_assert_eq!(items.len(), dest.len());
    let stable = longest_increasing(&dest);
    let mut pending: Vec<usize> = dest
        .iter()
        .zip(&stable)
        .filter(|&(_, keep)| !keep)
        .map(|(&d, _)| d)
        .collect();
    pending.sort_unstable();

    let mut moved = 0;
    for target in pending {
        let Some(from) = dest.iter().position(|&d| d == target) else {
            continue;
        };
        let to = match target.checked_sub(1) {
            Some(prev) => dest.iter().position(|&d| d == prev).map_or(0, |row| row + 1),
            None => 0,
        };
        if to == from || to == from + 1 {
            continue;
        }
        let at = if to > from { to - 1 } else { to };
        let item = items.remove(from);
        items.insert(at, item);
        let d = dest.remove(from);
        dest.insert(at, d);
        changes.moved(from, to);
        moved += 1;
    }
    moved
}

/// Marks one longest strictly increasing subsequence of `seq`.
fn longest_increasing(seq: &[usize]) -> Vec<bool> {
    let mut tails: Vec<usize> = Vec::new();
    let mut prev: Vec<Option<usize>> = vec![None; seq.len()];
    for (i, &value) in seq.iter().enumerate() {
        let pos = tails.partition_point(|&t| seq[t] < value);
        if pos > 0 {
            prev[i] = Some(tails[pos - 1]);
        }
        if pos == tails.len() {
            tails.push(i);
        } else {
            tails[pos] = i;
        }
    }

    let mut keep = vec![false; seq.len()];
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        keep[i] = true;
        cursor = prev[i];
    }
    keep
}
