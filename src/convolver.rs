use std::thread;

use log::debug;

use crate::convolution::{self, EdgePolicy, FilterKernel, KernelRegistry};
use crate::transport::{Capacity, ChannelCommunicator};
use crate::worker::Worker;
use crate::{compute_ranges, ConvolveError, PixelGrid, TransferError};

/// Options of distributed convolution.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ConvolveOptions {
    /// Count of workers, each worker runs in its own thread.
    pub workers: usize,
    pub edge_policy: EdgePolicy,
    /// Capacity of channels between workers.
    pub capacity: Capacity,
    /// Registry used to resolve filter names.
    pub registry: KernelRegistry,
}

impl Default for ConvolveOptions {
    fn default() -> Self {
        Self {
            workers: 1,
            edge_policy: EdgePolicy::default(),
            capacity: Capacity::default(),
            registry: KernelRegistry::default(),
        }
    }
}

impl ConvolveOptions {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn edge_policy(mut self, edge_policy: EdgePolicy) -> Self {
        self.edge_policy = edge_policy;
        self
    }

    pub fn capacity(mut self, capacity: Capacity) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn registry(mut self, registry: KernelRegistry) -> Self {
        self.registry = registry;
        self
    }
}

/// Applies chains of filters to images split between workers.
#[derive(Debug, Clone, Default)]
pub struct Convolver {
    options: ConvolveOptions,
}

impl Convolver {
    pub fn new(options: ConvolveOptions) -> Self {
        Self { options }
    }

    #[inline]
    pub fn options(&self) -> &ConvolveOptions {
        &self.options
    }

    /// Resolves filter names with the registry of options and
    /// convolves the image with the resulting chain.
    ///
    /// Unknown names are replaced with the identity filter.
    pub fn convolve_by_names<S: AsRef<str>>(
        &self,
        image: &PixelGrid,
        names: &[S],
    ) -> Result<PixelGrid, ConvolveError> {
        let chain = self.options.registry.resolve(names);
        self.convolve(image, &chain)
    }

    /// Applies all kernels of `chain` one after another.
    ///
    /// The image is split by rows between workers. Result is identical
    /// to [Convolver::convolve_single] for any valid count of workers.
    pub fn convolve(
        &self,
        image: &PixelGrid,
        chain: &[FilterKernel],
    ) -> Result<PixelGrid, ConvolveError> {
        let workers = self.options.workers;
        let partitions = compute_ranges(image.height(), workers)?;
        debug!(
            "Convolve {}x{} image with {} filters using {} workers",
            image.width(),
            image.height(),
            chain.len(),
            workers
        );

        let geometry = image.geometry();
        let edge_policy = self.options.edge_policy;
        let mut endpoints = ChannelCommunicator::mesh(workers, self.options.capacity).into_iter();
        let root_comm = endpoints
            .next()
            .ok_or(TransferError::UnknownRank(crate::ROOT))?;
        let partitions = partitions.as_slice();

        thread::scope(|s| {
            let handles: Vec<_> = endpoints
                .map(|comm| {
                    s.spawn(move || {
                        Worker::new(comm, partitions, geometry, chain, edge_policy).run()
                    })
                })
                .collect();

            let root_result =
                Worker::new(root_comm, partitions, geometry, chain, edge_policy).run_root(image);

            let mut failure: Option<ConvolveError> = None;
            for (i, handle) in handles.into_iter().enumerate() {
                let rank = i + 1;
                let error = match handle.join() {
                    Ok(Ok(())) => continue,
                    Ok(Err(err)) => err,
                    Err(_) => ConvolveError::WorkerPanicked(rank),
                };
                debug!("Worker {} has failed: {}", rank, error);
                let replace = failure
                    .as_ref()
                    .map_or(true, |current| is_hang_up(current) && !is_hang_up(&error));
                if replace {
                    failure = Some(error);
                }
            }
            match (root_result, failure) {
                (Ok(result), None) => Ok(result),
                (Err(err), Some(worker_err)) if is_hang_up(&err) => Err(worker_err),
                (Err(err), _) | (Ok(_), Some(err)) => Err(err),
            }
        })
    }

    /// Applies the chain to the whole image in the calling thread.
    pub fn convolve_single(&self, image: &PixelGrid, chain: &[FilterKernel]) -> PixelGrid {
        convolution::apply_chain(image, chain, self.options.edge_policy)
    }
}

/// Hang-up of a peer is a consequence of a failure of another worker.
fn is_hang_up(error: &ConvolveError) -> bool {
    matches!(
        error,
        ConvolveError::Transfer(TransferError::Disconnected { .. })
    )
}
