//! Exchange of boundary rows between neighbor workers.
//!
//! After every filter step a worker sends its first primary row to the
//! previous rank and its last primary row to the next rank. Rows received
//! from neighbors replace the halo rows of the worker, so the next filter
//! step sees the same neighborhood as a single-process run.
//!
//! To avoid a deadlock on blocking channels all ranks follow the same
//! parity protocol: even ranks send first and receive afterwards, odd ranks
//! receive first and send afterwards. Both phases go to the previous rank
//! before the next one.
use crate::transport::{Communicator, Message};
use crate::{Partition, PixelGrid, TransferError};

/// Exchanges halo rows of `grid` (local slice of `partition`) with
/// neighbors of the partition after filter step `step`.
pub fn exchange_halos(
    comm: &impl Communicator,
    partition: &Partition,
    grid: &mut PixelGrid,
    step: usize,
) -> Result<(), TransferError> {
    if partition.rank % 2 == 0 {
        send_boundary_rows(comm, partition, grid, step)?;
        receive_halo_rows(comm, partition, grid, step)?;
    } else {
        receive_halo_rows(comm, partition, grid, step)?;
        send_boundary_rows(comm, partition, grid, step)?;
    }
    Ok(())
}

fn send_boundary_rows(
    comm: &impl Communicator,
    partition: &Partition,
    grid: &PixelGrid,
    step: usize,
) -> Result<(), TransferError> {
    let primary = partition.local_primary();
    if let Some(prev) = partition.prev_rank() {
        let row = grid.row(primary.start).to_vec();
        comm.send(prev, Message::Halo { step, row })?;
    }
    if let Some(next) = partition.next_rank() {
        let row = grid.row(primary.end - 1).to_vec();
        comm.send(next, Message::Halo { step, row })?;
    }
    Ok(())
}

fn receive_halo_rows(
    comm: &impl Communicator,
    partition: &Partition,
    grid: &mut PixelGrid,
    step: usize,
) -> Result<(), TransferError> {
    if let Some(prev) = partition.prev_rank() {
        let row = receive_halo_row(comm, prev, step, grid.row_len())?;
        grid.replace_row(0, &row);
    }
    if let Some(next) = partition.next_rank() {
        let row = receive_halo_row(comm, next, step, grid.row_len())?;
        let last = grid.height() - 1;
        grid.replace_row(last, &row);
    }
    Ok(())
}

fn receive_halo_row(
    comm: &impl Communicator,
    from: usize,
    step: usize,
    row_len: usize,
) -> Result<Vec<u8>, TransferError> {
    match comm.recv(from)? {
        Message::Halo {
            step: actual_step,
            row,
        } => {
            if actual_step != step {
                return Err(TransferError::HaloStepMismatch {
                    rank: comm.rank(),
                    from,
                    expected: step,
                    actual: actual_step,
                });
            }
            if row.len() != row_len {
                return Err(TransferError::HaloRowSize {
                    rank: comm.rank(),
                    from,
                    expected: row_len,
                    actual: row.len(),
                });
            }
            Ok(row)
        }
        other => Err(TransferError::UnexpectedMessage {
            rank: comm.rank(),
            from,
            kind: other.kind(),
        }),
    }
}
