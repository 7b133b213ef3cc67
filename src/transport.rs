//! Point-to-point message passing between worker ranks.
//!
//! Workers don't share memory, every payload is moved or copied
//! into the message.
use crossbeam::channel::{self, Receiver, Sender};

use crate::distribution::LocalSlice;
use crate::TransferError;

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Initial slice of the image sent by the root.
    Slice(LocalSlice),
    /// Boundary row computed by a neighbor during filter step `step`.
    Halo { step: usize, row: Vec<u8> },
    /// Final slice sent back to the root.
    Result(LocalSlice),
}

impl Message {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Slice(_) => "slice",
            Self::Halo { .. } => "halo",
            Self::Result(_) => "result",
        }
    }
}

/// Endpoint of one rank in a group of communicating workers.
pub trait Communicator {
    /// Rank of this endpoint, `0` is the root.
    fn rank(&self) -> usize;

    /// Count of ranks in the group.
    fn size(&self) -> usize;

    /// Sends a message to rank `to`.
    fn send(&self, to: usize, message: Message) -> Result<(), TransferError>;

    /// Waits for the next message from rank `from`.
    fn recv(&self, from: usize) -> Result<Message, TransferError>;
}

/// Capacity of channels between two ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Capacity {
    /// Sending never blocks.
    #[default]
    Unbounded,
    /// Sending blocks until the peer receives the message.
    Rendezvous,
}

/// [Communicator] built on top of `crossbeam` channels.
///
/// Every ordered pair of ranks has its own channel, so messages
/// from one sender are received in the order they were sent.
#[derive(Debug)]
pub struct ChannelCommunicator {
    rank: usize,
    senders: Vec<Option<Sender<Message>>>,
    receivers: Vec<Option<Receiver<Message>>>,
}

impl ChannelCommunicator {
    /// Creates fully connected endpoints for `size` ranks.
    /// Endpoint with index `i` has rank `i`.
    pub fn mesh(size: usize, capacity: Capacity) -> Vec<ChannelCommunicator> {
        let mut endpoints: Vec<ChannelCommunicator> = (0..size)
            .map(|rank| ChannelCommunicator {
                rank,
                senders: (0..size).map(|_| None).collect(),
                receivers: (0..size).map(|_| None).collect(),
            })
            .collect();
        for from in 0..size {
            for to in 0..size {
                if from == to {
                    continue;
                }
                let (tx, rx) = match capacity {
                    Capacity::Unbounded => channel::unbounded(),
                    Capacity::Rendezvous => channel::bounded(0),
                };
                endpoints[from].senders[to] = Some(tx);
                endpoints[to].receivers[from] = Some(rx);
            }
        }
        endpoints
    }
}

impl Communicator for ChannelCommunicator {
    #[inline]
    fn rank(&self) -> usize {
        self.rank
    }

    #[inline]
    fn size(&self) -> usize {
        self.senders.len()
    }

    fn send(&self, to: usize, message: Message) -> Result<(), TransferError> {
        let sender = self
            .senders
            .get(to)
            .and_then(Option::as_ref)
            .ok_or(TransferError::UnknownRank(to))?;
        sender.send(message).map_err(|_| TransferError::Disconnected {
            rank: self.rank,
            peer: to,
        })
    }

    fn recv(&self, from: usize) -> Result<Message, TransferError> {
        let receiver = self
            .receivers
            .get(from)
            .and_then(Option::as_ref)
            .ok_or(TransferError::UnknownRank(from))?;
        receiver.recv().map_err(|_| TransferError::Disconnected {
            rank: self.rank,
            peer: from,
        })
    }
}
