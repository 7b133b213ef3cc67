use rayon::prelude::*;

/// It is not optimal to split images on too small parts.
/// Rows are grouped so that one task has at least this count of samples.
const MIN_SAMPLES_PER_TASK: usize = 1 << 14;

/// Calls `f(y, row)` for every row of `rows` in the rayon thread pool.
///
/// `first_y` is the index of the first row in `rows`.
pub(crate) fn for_each_row<F>(rows: &mut [u8], row_len: usize, first_y: usize, f: F)
where
    F: Fn(usize, &mut [u8]) + Sync + Send,
{
    if row_len == 0 {
        return;
    }
    let rows_per_task = (MIN_SAMPLES_PER_TASK / row_len).max(1);
    rows.par_chunks_mut(rows_per_task * row_len)
        .enumerate()
        .for_each(|(task, chunk)| {
            let task_first_y = first_y + task * rows_per_task;
            for (y, row) in (task_first_y..).zip(chunk.chunks_exact_mut(row_len)) {
                f(y, row);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_row_is_visited_once_with_its_index() {
        let row_len = 3000;
        let mut rows = vec![0u8; row_len * 40];
        for_each_row(&mut rows, row_len, 7, |y, row| {
            row.iter_mut().for_each(|s| *s = y as u8);
        });
        for (i, row) in rows.chunks_exact(row_len).enumerate() {
            assert!(row.iter().all(|&s| s == (i + 7) as u8));
        }
    }
}
