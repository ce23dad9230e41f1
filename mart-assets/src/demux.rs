use bytes::{Bytes, BytesMut};
use tracing::debug;

use crate::{AssetError, AssetResult, Frame, FrameSource, TransferError};

/// One file reassembled from the frame stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBuffer {
    filename: String,
    data: BytesMut,
}

impl FileBuffer {
    pub fn new<S: Into<String>>(filename: S) -> Self {
        Self {
            filename: filename.into(),
            data: BytesMut::new(),
        }
    }

    /// Build a complete buffer from bytes already in memory
    pub fn from_bytes<S: Into<String>>(filename: S, data: impl AsRef<[u8]>) -> Self {
        Self {
            filename: filename.into(),
            data: BytesMut::from(data.as_ref()),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Bytes accumulated so far
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn append(&mut self, chunk: &[u8]) {
        self.data.extend_from_slice(chunk);
    }

    pub fn into_parts(self) -> (String, Bytes) {
        (self.filename, self.data.freeze())
    }
}

/// Where the demultiplexer is in the frame grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemuxPhase {
    AwaitOwner,
    AwaitFilename,
    Accumulating,
    Done,
    Failed,
}

#[derive(Debug)]
enum State {
    AwaitOwner,
    AwaitFilename,
    Accumulating(FileBuffer),
    Done,
    Failed,
}

/// Everything one upload stream carried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemuxedUpload {
    pub owner_id: u64,
    pub files: Vec<FileBuffer>,
}

/// Turns `OwnerId Filename Chunk* (Filename Chunk*)*` into whole files.
///
/// Every file is capped at `max_file_bytes`; the cap is checked on each
/// chunk, before the chunk is buffered. After any error the demuxer is
/// spent and keeps returning [`TransferError::Incomplete`].
pub struct StreamDemuxer<S> {
    source: S,
    max_file_bytes: u64,
    owner_id: Option<u64>,
    state: State,
}

impl<S: FrameSource> StreamDemuxer<S> {
    pub fn new(source: S, max_file_bytes: u64) -> Self {
        Self {
            source,
            max_file_bytes,
            owner_id: None,
            state: State::AwaitOwner,
        }
    }

    pub fn phase(&self) -> DemuxPhase {
        match self.state {
            State::AwaitOwner => DemuxPhase::AwaitOwner,
            State::AwaitFilename => DemuxPhase::AwaitFilename,
            State::Accumulating(_) => DemuxPhase::Accumulating,
            State::Done => DemuxPhase::Done,
            State::Failed => DemuxPhase::Failed,
        }
    }

    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_bytes
    }

    /// Read the opening owner frame, or return the one already read
    pub async fn owner_id(&mut self) -> AssetResult<u64> {
        if let Some(owner_id) = self.owner_id {
            return Ok(owner_id);
        }
        if !matches!(self.state, State::AwaitOwner) {
            return Err(TransferError::Incomplete.into());
        }

        let frame = self.pull().await?;
        match frame {
            Some(Frame::OwnerId(owner_id)) => {
                self.owner_id = Some(owner_id);
                self.state = State::AwaitFilename;
                Ok(owner_id)
            }
            Some(_) => self.fail(TransferError::MissingOwner),
            None => self.fail(TransferError::Incomplete),
        }
    }

    /// Next complete file, or `None` once the stream has ended cleanly
    pub async fn next_file(&mut self) -> AssetResult<Option<FileBuffer>> {
        self.owner_id().await?;

        loop {
            match self.state {
                State::Done => return Ok(None),
                State::Failed | State::AwaitOwner => return Err(TransferError::Incomplete.into()),
                State::AwaitFilename | State::Accumulating(_) => {}
            }

            let frame = self.pull().await?;
            let state = std::mem::replace(&mut self.state, State::Failed);

            match (state, frame) {
                (_, Some(Frame::OwnerId(_))) => return self.fail(TransferError::DuplicateOwner),
                (State::AwaitFilename, Some(Frame::Chunk(_))) => {
                    return self.fail(TransferError::ChunkWithoutFile)
                }
                (State::AwaitFilename, None) => return self.fail(TransferError::Incomplete),
                (State::AwaitFilename, Some(Frame::Filename(name))) => {
                    self.state = State::Accumulating(FileBuffer::new(name));
                }
                (State::Accumulating(mut file), Some(Frame::Chunk(chunk))) => {
                    let size = file.size() + chunk.len() as u64;
                    if size > self.max_file_bytes {
                        return Err(AssetError::SizeLimitExceeded {
                            filename: file.filename,
                            size,
                            limit: self.max_file_bytes,
                        });
                    }
                    file.append(&chunk);
                    self.state = State::Accumulating(file);
                }
                (State::Accumulating(file), Some(Frame::Filename(name))) => {
                    self.state = State::Accumulating(FileBuffer::new(name));
                    debug!(filename = %file.filename(), size = file.size(), "file received");
                    return Ok(Some(file));
                }
                (State::Accumulating(file), None) => {
                    self.state = State::Done;
                    debug!(filename = %file.filename(), size = file.size(), "last file received");
                    return Ok(Some(file));
                }
                (State::AwaitOwner | State::Done | State::Failed, _) => {
                    return self.fail(TransferError::Incomplete)
                }
            }
        }
    }

    /// Drain the whole stream
    pub async fn collect(mut self) -> AssetResult<DemuxedUpload> {
        let owner_id = self.owner_id().await?;
        let mut files = Vec::new();
        while let Some(file) = self.next_file().await? {
            files.push(file);
        }
        Ok(DemuxedUpload { owner_id, files })
    }

    async fn pull(&mut self) -> AssetResult<Option<Frame>> {
        match self.source.next_frame().await {
            Ok(frame) => Ok(frame),
            Err(err) => self.fail(err),
        }
    }

    fn fail<T>(&mut self, err: TransferError) -> AssetResult<T> {
        self.state = State::Failed;
        Err(err.into())
    }
}
