//! Splitting rows of an image between workers.
use std::ops::Range;

use crate::InvalidPartitionError;

/// Half-open interval of rows `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RowRange {
    pub start: usize,
    pub end: usize,
}

impl RowRange {
    #[inline]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn contains(&self, row: usize) -> bool {
        (self.start..self.end).contains(&row)
    }

    #[inline]
    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Shifts the range so that it is expressed relative to `origin`.
    #[inline]
    pub(crate) fn relative_to(&self, origin: usize) -> Self {
        Self::new(self.start - origin, self.end - origin)
    }
}

impl From<Range<usize>> for RowRange {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

/// Rows assigned to one worker.
///
/// `primary` rows are produced by the worker for the final image.
/// `local` additionally includes one halo row borrowed from each
/// existing neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub rank: usize,
    pub workers: usize,
    pub primary: RowRange,
    pub local: RowRange,
}

impl Partition {
    #[inline]
    pub fn has_prev(&self) -> bool {
        self.rank > 0
    }

    #[inline]
    pub fn has_next(&self) -> bool {
        self.rank + 1 < self.workers
    }

    /// Rank of the worker owning the rows above this partition.
    #[inline]
    pub fn prev_rank(&self) -> Option<usize> {
        self.has_prev().then(|| self.rank - 1)
    }

    /// Rank of the worker owning the rows below this partition.
    #[inline]
    pub fn next_rank(&self) -> Option<usize> {
        self.has_next().then(|| self.rank + 1)
    }

    /// Index of the first primary row inside of the local slice.
    #[inline]
    pub fn primary_offset(&self) -> usize {
        self.primary.start - self.local.start
    }

    /// Primary rows expressed in coordinates of the local slice.
    #[inline]
    pub fn local_primary(&self) -> RowRange {
        self.primary.relative_to(self.local.start)
    }
}

/// Computes row ranges of all workers.
///
/// Worker `i` produces rows `[ceil(i*height/workers), ceil((i+1)*height/workers))`,
/// so with `height=10` and three workers primary ranges are
/// `[0,4)`, `[4,7)` and `[7,10)`.
pub fn compute_ranges(
    height: usize,
    workers: usize,
) -> Result<Vec<Partition>, InvalidPartitionError> {
    if workers == 0 {
        return Err(InvalidPartitionError::ZeroWorkers);
    }
    if height < workers {
        return Err(InvalidPartitionError::TooManyWorkers { height, workers });
    }

    let partitions = (0..workers)
        .map(|rank| {
            let start = (rank * height).div_ceil(workers);
            let end = ((rank + 1) * height).div_ceil(workers);
            let local_start = if rank > 0 { start - 1 } else { start };
            let local_end = if rank + 1 < workers { end + 1 } else { end };
            Partition {
                rank,
                workers,
                primary: RowRange::new(start, end),
                local: RowRange::new(local_start, local_end),
            }
        })
        .collect();
    Ok(partitions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_rows_three_workers() {
        let partitions = compute_ranges(10, 3).unwrap();
        let local: Vec<_> = partitions.iter().map(|p| p.local.as_range()).collect();
        let primary: Vec<_> = partitions.iter().map(|p| p.primary.as_range()).collect();
        assert_eq!(local, vec![0..4, 3..7, 6..10]);
        assert_eq!(primary, vec![0..4, 4..7, 7..10]);
        assert_eq!(partitions[1].primary_offset(), 1);
        assert_eq!(partitions[1].local_primary(), RowRange::new(1, 4));
    }

    #[test]
    fn longer_ranges_go_first() {
        let partitions = compute_ranges(7, 3).unwrap();
        let primary: Vec<_> = partitions.iter().map(|p| p.primary.as_range()).collect();
        assert_eq!(primary, vec![0..3, 3..5, 5..7]);
    }

    #[test]
    fn primaries_cover_all_rows() {
        for height in 1..40 {
            for workers in 1..=height {
                let partitions = compute_ranges(height, workers).unwrap();
                let mut next_row = 0;
                for p in &partitions {
                    assert_eq!(p.primary.start, next_row);
                    assert!(!p.primary.is_empty());
                    assert_eq!(p.local.start, p.primary.start.saturating_sub(1));
                    assert_eq!(p.local.end, (p.primary.end + 1).min(height));
                    next_row = p.primary.end;
                }
                assert_eq!(next_row, height);
            }
        }
    }

    #[test]
    fn single_worker_has_no_halo() {
        let partitions = compute_ranges(5, 1).unwrap();
        assert_eq!(partitions.len(), 1);
        assert_eq!(partitions[0].local, partitions[0].primary);
        assert_eq!(partitions[0].prev_rank(), None);
        assert_eq!(partitions[0].next_rank(), None);
    }

    #[test]
    fn neighbors() {
        let partitions = compute_ranges(8, 4).unwrap();
        assert_eq!(partitions[0].next_rank(), Some(1));
        assert_eq!(partitions[2].prev_rank(), Some(1));
        assert_eq!(partitions[2].next_rank(), Some(3));
        assert_eq!(partitions[3].next_rank(), None);
    }

    #[test]
    fn invalid_partitions() {
        assert_eq!(
            compute_ranges(10, 0),
            Err(InvalidPartitionError::ZeroWorkers)
        );
        assert_eq!(
            compute_ranges(3, 4),
            Err(InvalidPartitionError::TooManyWorkers {
                height: 3,
                workers: 4
            })
        );
    }
}
