//! Life cycle of one worker rank.
use log::trace;

use crate::convolution::{apply_kernel, EdgePolicy, FilterKernel};
use crate::distribution::{self, LocalSlice, ROOT};
use crate::halo::exchange_halos;
use crate::transport::Communicator;
use crate::{ConvolveError, GridGeometry, Partition, PixelGrid, TransferError};

/// State of a worker.
///
/// `Idle → Receiving → Filtering(0) → Exchanging(0) → Filtering(1) → …
/// → Filtering(N-1) → Sending | Merging → Done`.
/// Halo rows aren't exchanged after the last filter step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Receiving,
    Filtering { step: usize, steps: usize },
    Exchanging { step: usize, steps: usize },
    /// Non-root worker sends its final slice to the root.
    Sending,
    /// Root gathers final slices of all workers.
    Merging,
    Done,
}

impl WorkerState {
    /// Returns the state following this one.
    pub fn advance(self, is_root: bool, steps: usize) -> Self {
        let finish = if is_root { Self::Merging } else { Self::Sending };
        match self {
            Self::Idle => Self::Receiving,
            Self::Receiving if steps == 0 => finish,
            Self::Receiving => Self::Filtering { step: 0, steps },
            Self::Filtering { step, steps } if step + 1 < steps => {
                Self::Exchanging { step, steps }
            }
            Self::Filtering { .. } => finish,
            Self::Exchanging { step, steps } => Self::Filtering {
                step: step + 1,
                steps,
            },
            Self::Sending | Self::Merging | Self::Done => Self::Done,
        }
    }
}

/// One rank of a distributed convolution.
pub struct Worker<'a, C: Communicator> {
    comm: C,
    partitions: &'a [Partition],
    geometry: GridGeometry,
    chain: &'a [FilterKernel],
    edge_policy: EdgePolicy,
    state: WorkerState,
}

impl<'a, C: Communicator> Worker<'a, C> {
    pub fn new(
        comm: C,
        partitions: &'a [Partition],
        geometry: GridGeometry,
        chain: &'a [FilterKernel],
        edge_policy: EdgePolicy,
    ) -> Self {
        Self {
            comm,
            partitions,
            geometry,
            chain,
            edge_policy,
            state: WorkerState::Idle,
        }
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.comm.rank()
    }

    #[inline]
    pub fn state(&self) -> WorkerState {
        self.state
    }

    fn is_root(&self) -> bool {
        self.rank() == ROOT
    }

    fn partition(&self) -> Result<Partition, TransferError> {
        self.partitions
            .get(self.rank())
            .copied()
            .ok_or(TransferError::UnknownRank(self.rank()))
    }

    fn advance(&mut self) {
        let next = self.state.advance(self.is_root(), self.chain.len());
        trace!("Rank {}: {:?} -> {:?}", self.rank(), self.state, next);
        self.state = next;
    }

    /// Runs a non-root worker: receives the initial slice, filters it
    /// and sends the result back to the root.
    pub fn run(mut self) -> Result<(), ConvolveError> {
        let partition = self.partition()?;
        self.advance();
        let mut slice = distribution::receive_slice(&self.comm, self.geometry, &partition)?;
        self.advance();
        self.filter_slice(&partition, &mut slice)?;
        distribution::send_result(&self.comm, slice)?;
        self.advance();
        Ok(())
    }

    /// Runs the root: scatters `image`, filters its own slice and
    /// gathers the whole result.
    pub fn run_root(mut self, image: &PixelGrid) -> Result<PixelGrid, ConvolveError> {
        let partition = self.partition()?;
        self.advance();
        let slices = distribution::scatter(image, self.partitions)?;
        let mut own = distribution::send_slices(&self.comm, slices)?
            .ok_or(TransferError::MissingPart(self.rank()))?;
        self.advance();
        self.filter_slice(&partition, &mut own)?;

        let mut parts = distribution::collect_results(&self.comm)?;
        parts.push(own);
        let result = distribution::gather(&parts, self.partitions, self.geometry)?;
        self.advance();
        Ok(result)
    }

    /// Applies the whole chain to primary rows of the slice exchanging
    /// halo rows between steps.
    fn filter_slice(
        &mut self,
        partition: &Partition,
        slice: &mut LocalSlice,
    ) -> Result<(), TransferError> {
        let rows = partition.local_primary();
        let chain = self.chain;
        for (step, kernel) in chain.iter().enumerate() {
            trace!(
                "Rank {}: apply {:?} to rows {:?}",
                self.rank(),
                kernel.name(),
                partition.primary
            );
            slice.grid = apply_kernel(&slice.grid, kernel, rows, self.edge_policy);
            self.advance();
            if let WorkerState::Exchanging { .. } = self.state {
                exchange_halos(&self.comm, partition, &mut slice.grid, step)?;
                self.advance();
            }
        }
        Ok(())
    }
}
