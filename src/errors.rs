use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    #[error("Width and height of the grid must be greater than zero")]
    ZeroDimension,
    #[error("Size of buffer doesn't match to grid dimensions")]
    InvalidBufferSize,
    #[error("Count of channels {0} is not supported, only 1 or 3 channels allowed")]
    UnsupportedChannels(usize),
    #[error("Rows {start}..{end} are out of the grid with height {height}")]
    RowsOutOfBounds {
        start: usize,
        end: usize,
        height: usize,
    },
    #[error("Only 8-bit gray and 8-bit RGB images are supported")]
    UnsupportedImageType,
    #[error("Max sample value must be in range 1..=255")]
    InvalidMaxValue,
    #[error("Sample {value} at index {index} is greater than max sample value {max_value}")]
    SampleOutOfRange {
        index: usize,
        value: u8,
        max_value: u8,
    },
}

#[cfg(feature = "pnm")]
#[derive(Error, Debug)]
pub enum PnmError {
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("Max sample value {0} isn't supported, only 8-bit images allowed")]
    UnsupportedMaxValue(u32),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidPartitionError {
    #[error("Count of workers must be greater than zero")]
    ZeroWorkers,
    #[error("Can't split {height} rows between {workers} workers")]
    TooManyWorkers { height: usize, workers: usize },
}

/// Failures of moving data between workers.
///
/// A lost or malformed message is never retried.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferError {
    #[error("Worker {rank} has returned {actual} but {expected} was expected")]
    DimensionMismatch {
        rank: usize,
        expected: SliceShape,
        actual: SliceShape,
    },
    #[error("Rows of worker {rank} end at {end} but the image has {height} rows")]
    PartitionMismatch {
        rank: usize,
        end: usize,
        height: usize,
    },
    #[error("Result from worker {0} is missing")]
    MissingPart(usize),
    #[error("Result from worker {0} was received twice")]
    DuplicatePart(usize),
    #[error("Rank {rank} has received unexpected {kind} message from rank {from}")]
    UnexpectedMessage {
        rank: usize,
        from: usize,
        kind: &'static str,
    },
    #[error("Rank {rank} expected halo row of step {expected} from rank {from}, got step {actual}")]
    HaloStepMismatch {
        rank: usize,
        from: usize,
        expected: usize,
        actual: usize,
    },
    #[error("Rank {rank} has received halo row with {actual} samples from rank {from}, expected {expected}")]
    HaloRowSize {
        rank: usize,
        from: usize,
        expected: usize,
        actual: usize,
    },
    #[error("Rank {rank} can't reach rank {peer}, the peer has hung up")]
    Disconnected { rank: usize, peer: usize },
    #[error("Rank {0} doesn't exist in the topology")]
    UnknownRank(usize),
}

/// Geometry of a worker slice used to report mismatches at gather time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceShape {
    pub width: usize,
    pub rows: usize,
    pub channels: usize,
    pub max_value: u8,
    pub origin: usize,
}

impl std::fmt::Display for SliceShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{}x{} (max {}) at row {}",
            self.width, self.rows, self.channels, self.max_value, self.origin
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvolveError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    InvalidPartition(#[from] InvalidPartitionError),
    #[error(transparent)]
    Transfer(#[from] TransferError),
    #[error("Worker {0} has panicked")]
    WorkerPanicked(usize),
}
