/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

//! Two-lane bounded mailbox.
//!
//! Each agent inbox is a pair of MPSC lanes, one per [`Priority`]. The
//! receiving side always prefers an envelope already waiting in the high
//! lane, so high-priority messages become eligible for delivery before
//! normal ones regardless of arrival order. Within one lane, envelopes
//! from the same sender keep their send-call order.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use crate::message::{Envelope, Priority};

/// Creates a linked mailbox pair with `capacity` slots per lane.
pub(crate) fn channel(capacity: usize) -> (MailboxSender, Mailbox) {
    let (normal_tx, normal_rx) = mpsc::channel(capacity);
    let (high_tx, high_rx) = mpsc::channel(capacity);
    (
        MailboxSender {
            normal: normal_tx,
            high: high_tx,
        },
        Mailbox {
            normal: normal_rx,
            high: high_rx,
            normal_done: false,
            high_done: false,
        },
    )
}

/// The sender half of an agent's mailbox.
#[derive(Debug, Clone)]
pub(crate) struct MailboxSender {
    normal: mpsc::Sender<Envelope>,
    high: mpsc::Sender<Envelope>,
}

impl MailboxSender {
    /// The lane serving the given priority.
    pub(crate) fn lane(&self, priority: Priority) -> &mpsc::Sender<Envelope> {
        match priority {
            Priority::Normal => &self.normal,
            Priority::High => &self.high,
        }
    }

    /// Whether the receiving side is gone.
    pub(crate) fn is_closed(&self) -> bool {
        self.normal.is_closed()
    }
}

/// The receiver half of an agent's mailbox.
#[derive(Debug)]
pub(crate) struct Mailbox {
    normal: mpsc::Receiver<Envelope>,
    high: mpsc::Receiver<Envelope>,
    normal_done: bool,
    high_done: bool,
}

impl Mailbox {
    /// Receives the next envelope, yielding `None` once both lanes are
    /// closed and drained.
    ///
    /// A queued high-priority envelope always wins over queued normal
    /// ones; with the high lane empty the call waits on both lanes at
    /// once, still preferring the high lane when both become ready.
    pub(crate) async fn recv(&mut self) -> Option<Envelope> {
        loop {
            match self.high.try_recv() {
                Ok(envelope) => return Some(envelope),
                Err(TryRecvError::Disconnected) => self.high_done = true,
                Err(TryRecvError::Empty) => {}
            }
            tokio::select! {
                biased;
                high = self.high.recv(), if !self.high_done => match high {
                    Some(envelope) => return Some(envelope),
                    None => self.high_done = true,
                },
                normal = self.normal.recv(), if !self.normal_done => match normal {
                    Some(envelope) => return Some(envelope),
                    None => self.normal_done = true,
                },
                else => return None,
            }
        }
    }

    /// Stops the lanes from accepting new envelopes; already-queued
    /// envelopes remain receivable.
    pub(crate) fn close(&mut self) {
        self.normal.close();
        self.high.close();
    }

    /// Whether both lanes hold no envelopes.
    pub(crate) fn is_empty(&self) -> bool {
        self.normal.is_empty() && self.high.is_empty()
    }

    /// Whether both lanes have been closed.
    pub(crate) fn is_closed(&self) -> bool {
        self.normal.is_closed() && self.high.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::message::{MessageAddress, MessageId};

    fn envelope(priority: Priority, tag: u32) -> Envelope {
        Envelope::new(
            MessageId::of(priority),
            Arc::new(tag),
            None,
            MessageAddress::default(),
        )
    }

    #[tokio::test]
    async fn queued_high_priority_wins_over_earlier_normal() {
        let (sender, mut mailbox) = channel(8);
        sender
            .lane(Priority::Normal)
            .send(envelope(Priority::Normal, 1))
            .await
            .unwrap();
        sender
            .lane(Priority::High)
            .send(envelope(Priority::High, 2))
            .await
            .unwrap();

        let first = mailbox.recv().await.unwrap();
        assert_eq!(first.priority(), Priority::High);
        let second = mailbox.recv().await.unwrap();
        assert_eq!(second.priority(), Priority::Normal);
    }

    #[tokio::test]
    async fn same_lane_preserves_send_order() {
        let (sender, mut mailbox) = channel(8);
        for tag in 0..4u32 {
            sender
                .lane(Priority::Normal)
                .send(envelope(Priority::Normal, tag))
                .await
                .unwrap();
        }
        for expected in 0..4u32 {
            let received = mailbox.recv().await.unwrap();
            let tag = received.message.as_any().downcast_ref::<u32>().unwrap();
            assert_eq!(*tag, expected);
        }
    }

    #[tokio::test]
    async fn drained_and_closed_lanes_end_the_stream() {
        let (sender, mut mailbox) = channel(8);
        sender
            .lane(Priority::Normal)
            .send(envelope(Priority::Normal, 7))
            .await
            .unwrap();
        drop(sender);

        assert!(mailbox.recv().await.is_some());
        assert!(mailbox.recv().await.is_none());
    }
}
