use std::collections::VecDeque;
use crate::kdtree::NodeId;

/// FIFO of leaves that still hold more than `bucket_size` particles.
#[derive(Debug)]
pub struct SplitQueue {
    bucket_size: usize,
    pending: VecDeque<NodeId>,
}

impl SplitQueue {
    pub fn new(bucket_size: usize) -> Self {
        SplitQueue {
            bucket_size,
            pending: VecDeque::new(),
        }
    }

    /// Queues `leaf` only if it is oversized. Returns whether it was queued.
    pub fn enqueue_if_oversized(&mut self, leaf: NodeId, size: usize) -> bool {
        if size > self.bucket_size {
            self.pending.push_back(leaf);
            true
        } else {
            false
        }
    }

    pub fn dequeue(&mut self) -> Option<NodeId> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
