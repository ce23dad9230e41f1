use std::convert::Infallible;
use std::pin::Pin;

use bytes::Bytes;
use futures_core::Stream;

use crate::Frame;

/// Stream of outbound frames
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<Frame, Infallible>> + Send>>;

/// Client side of the upload protocol: splits files into frames.
#[derive(Debug, Clone)]
pub struct FrameEncoder {
    chunk_size: usize,
}

impl FrameEncoder {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Encode `owner_id` and `files` as `OwnerId (Filename Chunk*)*`.
    ///
    /// Chunks are slices of the original buffers, no copying.
    pub fn encode<I, S>(&self, owner_id: u64, files: I) -> FrameStream
    where
        I: IntoIterator<Item = (S, Bytes)>,
        S: Into<String>,
    {
        let files: Vec<(String, Bytes)> = files
            .into_iter()
            .map(|(name, data)| (name.into(), data))
            .collect();
        let chunk_size = self.chunk_size;

        let stream = async_stream::stream! {
            yield Ok::<_, Infallible>(Frame::OwnerId(owner_id));
            for (filename, data) in files {
                yield Ok(Frame::Filename(filename));
                let mut offset = 0;
                while offset < data.len() {
                    let end = (offset + chunk_size).min(data.len());
                    yield Ok(Frame::Chunk(data.slice(offset..end)));
                    offset = end;
                }
            }
        };
        Box::pin(stream)
    }
}

impl Default for FrameEncoder {
    fn default() -> Self {
        Self::new(crate::AssetConfig::default().chunk_size)
    }
}
