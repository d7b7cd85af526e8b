use bytes::Bytes;

use crate::transport::{TransportError, CODE_READ_OVERFLOW};
use crate::{FetchError, FetchResult, CHUNK_SIZE};

/// Growable body buffer that always keeps a free window ahead of the bytes received so far.
#[derive(Debug)]
pub(crate) struct DownloadBuffer {
    data: Vec<u8>,
    filled: usize,
    limit: usize,
}

impl DownloadBuffer {
    pub(crate) fn new(limit: usize) -> FetchResult<Self> {
        let mut buffer = Self {
            data: Vec::new(),
            filled: 0,
            limit,
        };
        buffer.grow()?;
        Ok(buffer)
    }

    pub(crate) fn len(&self) -> usize {
        self.filled
    }

    pub(crate) fn capacity(&self) -> usize {
        self.data.len()
    }

    /// The free space the next read may write into.
    pub(crate) fn window(&mut self) -> &mut [u8] {
        &mut self.data[self.filled..]
    }

    /// Accounts for `read` bytes written into the window, failing once the limit is exceeded.
    ///
    /// A `read` larger than the window is a transport fault and is rejected, never truncated.
    pub(crate) fn advance(&mut self, read: usize) -> FetchResult<()> {
        let room = self.data.len() - self.filled;
        if read > room {
            return Err(FetchError::Transport(TransportError::new(
                CODE_READ_OVERFLOW,
                format!("transport reported {read} bytes for a {room} byte window"),
            )));
        }
        self.filled += read;

        if self.filled > self.limit {
            return Err(FetchError::ResponseTooLarge {
                limit: self.limit,
                received: self.filled,
            });
        }
        Ok(())
    }

    /// Extends the allocation so a full chunk fits after the received bytes.
    pub(crate) fn grow(&mut self) -> FetchResult<()> {
        let target = self.filled + CHUNK_SIZE;
        if target <= self.data.len() {
            return Ok(());
        }

        self.data
            .try_reserve_exact(target - self.data.len())
            .map_err(|_| FetchError::OutOfMemory { requested: target })?;
        self.data.resize(target, 0);
        Ok(())
    }

    pub(crate) fn into_bytes(mut self) -> Bytes {
        self.data.truncate(self.filled);
        Bytes::from(self.data)
    }
}
