//! Scattering an image between workers and gathering results back
//! on the root.
use crate::errors::SliceShape;
use crate::transport::{Communicator, Message};
use crate::{GridError, GridGeometry, Partition, PixelGrid, TransferError};

/// Rank of the worker which owns the whole image before scattering
/// and after gathering.
pub const ROOT: usize = 0;

/// Rows of the image owned by one worker, including halo rows.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalSlice {
    pub rank: usize,
    /// Index of the first row of `grid` inside the whole image.
    pub origin: usize,
    pub grid: PixelGrid,
}

impl LocalSlice {
    fn shape(&self) -> SliceShape {
        SliceShape {
            width: self.grid.width(),
            rows: self.grid.height(),
            channels: self.grid.channels().count(),
            max_value: self.grid.max_value(),
            origin: self.origin,
        }
    }
}

fn expected_shape(geometry: GridGeometry, partition: &Partition) -> SliceShape {
    SliceShape {
        width: geometry.width(),
        rows: partition.local.len(),
        channels: geometry.channels().count(),
        max_value: geometry.max_value(),
        origin: partition.local.start,
    }
}

fn check_shape(
    slice: &LocalSlice,
    geometry: GridGeometry,
    partition: &Partition,
) -> Result<(), TransferError> {
    let expected = expected_shape(geometry, partition);
    let actual = slice.shape();
    if expected != actual {
        return Err(TransferError::DimensionMismatch {
            rank: partition.rank,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Partitions must stay inside the image and their primary rows
/// must reach its last row.
fn check_partitions(partitions: &[Partition], height: usize) -> Result<(), TransferError> {
    for p in partitions {
        let outside = p.local.end > height
            || p.primary.start < p.local.start
            || p.primary.end > p.local.end;
        if outside {
            return Err(TransferError::PartitionMismatch {
                rank: p.rank,
                end: p.local.end,
                height,
            });
        }
    }
    match partitions.last() {
        Some(last) if last.primary.end != height => Err(TransferError::PartitionMismatch {
            rank: last.rank,
            end: last.primary.end,
            height,
        }),
        _ => Ok(()),
    }
}

/// Cuts the image into slices covering local (primary and halo)
/// rows of every partition.
pub fn scatter(grid: &PixelGrid, partitions: &[Partition]) -> Result<Vec<LocalSlice>, GridError> {
    partitions
        .iter()
        .map(|p| {
            Ok(LocalSlice {
                rank: p.rank,
                origin: p.local.start,
                grid: grid.copy_rows(p.local)?,
            })
        })
        .collect()
}

/// Sends slices to their workers and returns the slice of the root.
pub fn send_slices(
    comm: &impl Communicator,
    slices: Vec<LocalSlice>,
) -> Result<Option<LocalSlice>, TransferError> {
    let mut own = None;
    for slice in slices {
        if slice.rank == comm.rank() {
            own = Some(slice);
        } else {
            comm.send(slice.rank, Message::Slice(slice))?;
        }
    }
    Ok(own)
}

/// Waits for the initial slice from the root.
pub fn receive_slice(
    comm: &impl Communicator,
    geometry: GridGeometry,
    partition: &Partition,
) -> Result<LocalSlice, TransferError> {
    match comm.recv(ROOT)? {
        Message::Slice(slice) => {
            check_shape(&slice, geometry, partition)?;
            Ok(slice)
        }
        other => Err(TransferError::UnexpectedMessage {
            rank: comm.rank(),
            from: ROOT,
            kind: other.kind(),
        }),
    }
}

/// Sends the final slice of a worker back to the root.
pub fn send_result(comm: &impl Communicator, slice: LocalSlice) -> Result<(), TransferError> {
    comm.send(ROOT, Message::Result(slice))
}

/// Receives final slices of all workers except the root.
pub fn collect_results(comm: &impl Communicator) -> Result<Vec<LocalSlice>, TransferError> {
    (0..comm.size())
        .filter(|&rank| rank != comm.rank())
        .map(|rank| match comm.recv(rank)? {
            Message::Result(slice) => Ok(slice),
            other => Err(TransferError::UnexpectedMessage {
                rank: comm.rank(),
                from: rank,
                kind: other.kind(),
            }),
        })
        .collect()
}

/// Assembles the whole image from final slices of all workers.
///
/// Only primary rows of every slice are copied, halo rows duplicate
/// primary rows of neighbors and are dropped.
pub fn gather(
    parts: &[LocalSlice],
    partitions: &[Partition],
    geometry: GridGeometry,
) -> Result<PixelGrid, TransferError> {
    check_partitions(partitions, geometry.height())?;
    let mut result = PixelGrid::from_geometry(geometry);
    let row_len = result.row_len();
    let mut received = vec![false; partitions.len()];

    for part in parts {
        let partition = partitions
            .get(part.rank)
            .ok_or(TransferError::UnknownRank(part.rank))?;
        if received[part.rank] {
            return Err(TransferError::DuplicatePart(part.rank));
        }
        received[part.rank] = true;
        check_shape(part, geometry, partition)?;

        let src_rows = partition.local_primary();
        let src = &part.grid.samples()[src_rows.start * row_len..src_rows.end * row_len];
        let dst_rows = partition.primary;
        result.samples_mut()[dst_rows.start * row_len..dst_rows.end * row_len]
            .copy_from_slice(src);
    }

    if let Some(rank) = received.iter().position(|&r| !r) {
        return Err(TransferError::MissingPart(rank));
    }
    log::debug!(
        "Gathered {} slices into {}x{} image",
        parts.len(),
        geometry.width(),
        geometry.height()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compute_ranges, Channels};

    fn numbered_rows(height: usize) -> PixelGrid {
        PixelGrid::from_fn(2, height, Channels::Gray, 255, |r, _, _| r as u8).unwrap()
    }

    #[test]
    fn scatter_then_gather_restores_image() {
        let grid = numbered_rows(10);
        let partitions = compute_ranges(10, 3).unwrap();
        let slices = scatter(&grid, &partitions).unwrap();
        let origins: Vec<_> = slices.iter().map(|s| (s.origin, s.grid.height())).collect();
        assert_eq!(origins, vec![(0, 4), (3, 4), (6, 4)]);
        assert_eq!(slices[1].grid.row(0), &[3, 3]);

        let gathered = gather(&slices, &partitions, grid.geometry()).unwrap();
        assert_eq!(gathered, grid);
    }

    #[test]
    fn gather_drops_halo_rows() {
        let grid = numbered_rows(10);
        let partitions = compute_ranges(10, 3).unwrap();
        let mut slices = scatter(&grid, &partitions).unwrap();
        // Halo rows of the middle worker are garbage now.
        let last = slices[1].grid.height() - 1;
        slices[1].grid.replace_row(0, &[200, 200]);
        slices[1].grid.replace_row(last, &[201, 201]);
        let gathered = gather(&slices, &partitions, grid.geometry()).unwrap();
        assert_eq!(gathered, grid);
    }

    #[test]
    fn gather_reports_mismatches() {
        let grid = numbered_rows(10);
        let partitions = compute_ranges(10, 3).unwrap();
        let slices = scatter(&grid, &partitions).unwrap();

        let mut wrong = slices.clone();
        wrong[2].grid = grid.copy_rows(crate::RowRange::new(6, 9)).unwrap();
        match gather(&wrong, &partitions, grid.geometry()) {
            Err(TransferError::DimensionMismatch {
                rank,
                expected,
                actual,
            }) => {
                assert_eq!(rank, 2);
                assert_eq!(expected.rows, 4);
                assert_eq!(actual.rows, 3);
            }
            res => panic!("Unexpected result: {:?}", res),
        }

        let mut wrong = slices.clone();
        wrong[1].origin = 4;
        assert!(matches!(
            gather(&wrong, &partitions, grid.geometry()),
            Err(TransferError::DimensionMismatch { rank: 1, .. })
        ));

        assert_eq!(
            gather(&slices[..2], &partitions, grid.geometry()),
            Err(TransferError::MissingPart(2))
        );

        let mut wrong = slices.clone();
        wrong.push(slices[0].clone());
        assert_eq!(
            gather(&wrong, &partitions, grid.geometry()),
            Err(TransferError::DuplicatePart(0))
        );
    }

    #[test]
    fn gather_rejects_partitions_of_another_image() {
        let tall = numbered_rows(20);
        let partitions = compute_ranges(20, 2).unwrap();
        let slices = scatter(&tall, &partitions).unwrap();
        let short = numbered_rows(10);
        assert_eq!(
            gather(&slices, &partitions, short.geometry()),
            Err(TransferError::PartitionMismatch {
                rank: 0,
                end: 11,
                height: 10
            })
        );

        let partitions = compute_ranges(5, 2).unwrap();
        let slices = scatter(&short, &partitions).unwrap();
        assert_eq!(
            gather(&slices, &partitions, short.geometry()),
            Err(TransferError::PartitionMismatch {
                rank: 1,
                end: 5,
                height: 10
            })
        );
    }
}
