#![doc = include_str!("../README.md")]
//!
//! ## Feature flags
#![doc = document_features::document_features!()]

pub use convolution::{
    apply_chain, apply_kernel, EdgePolicy, FilterKernel, FilterType, KernelRegistry,
    KernelRegistryBuilder, Weights,
};
pub use convolver::{ConvolveOptions, Convolver};
pub use distribution::{gather, scatter, LocalSlice, ROOT};
pub use errors::*;
pub use halo::exchange_halos;
pub use images::*;
pub use partition::{compute_ranges, Partition, RowRange};
pub use pixels::Channels;
pub use transport::{Capacity, ChannelCommunicator, Communicator, Message};
pub use worker::{Worker, WorkerState};

mod convolution;
mod convolver;
pub mod distribution;
mod errors;
mod halo;
mod images;
mod partition;
mod pixels;
#[cfg(feature = "rayon")]
mod threading;
pub mod transport;
mod worker;
