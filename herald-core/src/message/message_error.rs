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

use std::time::Duration;

/// Represents errors that can occur when sending messages in the agent system.
#[derive(Debug)]
pub enum MessageError {
    /// Indicates that sending a message failed.
    SendFailed(String),
    /// The recipient's mailbox has been closed.
    ChannelClosed,
    /// The recipient's mailbox lane is at capacity (non-blocking sends only).
    MailboxFull,
    /// The sending agent was cancelled before the message could be handed off.
    Cancelled,
    /// Represents other types of errors.
    OtherError(String),
}

impl std::fmt::Display for MessageError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            MessageError::SendFailed(msg) => write!(f, "Failed to send message: {}", msg),
            MessageError::ChannelClosed => write!(f, "Recipient mailbox is closed"),
            MessageError::MailboxFull => write!(f, "Recipient mailbox is full"),
            MessageError::Cancelled => write!(f, "Send cancelled"),
            MessageError::OtherError(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for MessageError {}

/// Converts a `SendError` from Tokio's MPSC channel to a `MessageError`.
impl<T> From<tokio::sync::mpsc::error::SendError<T>> for MessageError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        MessageError::ChannelClosed
    }
}

/// Represents failures of a request awaiting exactly one response.
#[derive(Debug)]
pub enum RequestError {
    /// No response arrived within the allotted time. Late responses are
    /// discarded as stale.
    Timeout(Duration),
    /// The destination is null or can no longer receive messages.
    Unreachable,
    /// The requesting agent was cancelled before dispatch.
    Cancelled,
    /// A response arrived but its payload was not of the expected type.
    UnexpectedResponse(&'static str),
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            RequestError::Timeout(after) => {
                write!(f, "Request timed out after {:?}", after)
            }
            RequestError::Unreachable => write!(f, "Request destination is unreachable"),
            RequestError::Cancelled => write!(f, "Request cancelled"),
            RequestError::UnexpectedResponse(expected) => {
                write!(f, "Response payload was not of the expected type {}", expected)
            }
        }
    }
}

impl std::error::Error for RequestError {}
