use std::fmt::Display;

use async_trait::async_trait;
use bytes::Bytes;
use futures_core::Stream;
use futures_util::StreamExt;

use crate::TransferError;

/// One message of the upload stream.
///
/// A valid stream reads `OwnerId Filename Chunk* (Filename Chunk*)*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    OwnerId(u64),
    Filename(String),
    Chunk(Bytes),
}

/// Pull-based source of inbound frames.
///
/// `Ok(None)` is end of stream. Each call may wait on the network.
#[async_trait]
pub trait FrameSource: Send {
    async fn next_frame(&mut self) -> Result<Option<Frame>, TransferError>;
}

/// Any stream of fallible frames is a source; transport errors become
/// [`TransferError::Receive`].
#[async_trait]
impl<S, E> FrameSource for S
where
    S: Stream<Item = Result<Frame, E>> + Unpin + Send,
    E: Display + Send,
{
    async fn next_frame(&mut self) -> Result<Option<Frame>, TransferError> {
        match self.next().await {
            Some(Ok(frame)) => Ok(Some(frame)),
            Some(Err(err)) => Err(TransferError::Receive(err.to_string())),
            None => Ok(None),
        }
    }
}
