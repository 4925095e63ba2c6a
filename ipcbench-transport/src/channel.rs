//! Channel capabilities shared by shared memory and pipes.
//!
//! The process roles are written against these traits, so they can run
//! in-process over any channel pair as well as across a fork.

use crate::error::Result;
use crate::ipc::pipe::{PipeReader, PipeWriter};
use crate::ipc::shm::ShmAttachment;

/// Writing side of a channel.
pub trait PayloadSink {
    /// Writes the whole payload.
    ///
    /// # Errors
    /// Returns `TransportError` if the payload cannot be transferred in full.
    fn write_payload(&mut self, payload: &[u8]) -> Result<()>;

    /// Closes the channel from this side.
    fn close(self)
    where
        Self: Sized,
    {
        drop(self);
    }
}

/// Reading side of a channel.
pub trait PayloadSource {
    /// Reads the payload.
    ///
    /// # Errors
    /// Returns `TransportError` if the read fails.
    fn read_payload(&mut self) -> Result<Vec<u8>>;
}

impl PayloadSink for ShmAttachment<'_> {
    fn write_payload(&mut self, payload: &[u8]) -> Result<()> {
        self.write(payload)
    }
}

impl PayloadSource for ShmAttachment<'_> {
    fn read_payload(&mut self) -> Result<Vec<u8>> {
        Ok(self.read_bytes().to_vec())
    }
}

impl PayloadSink for PipeWriter {
    fn write_payload(&mut self, payload: &[u8]) -> Result<()> {
        self.write(payload)
    }
}

impl PayloadSource for PipeReader {
    fn read_payload(&mut self) -> Result<Vec<u8>> {
        self.read_to_end()
    }
}

impl<T: PayloadSink + ?Sized> PayloadSink for &mut T {
    fn write_payload(&mut self, payload: &[u8]) -> Result<()> {
        (**self).write_payload(payload)
    }
}

impl<T: PayloadSource + ?Sized> PayloadSource for &mut T {
    fn read_payload(&mut self) -> Result<Vec<u8>> {
        (**self).read_payload()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::ipc::pipe::pipe;
    use crate::ipc::shm::{SegmentKey, SharedMemoryConfig, SharedMemorySegment};

    fn transfer<W: PayloadSink, R: PayloadSource>(
        mut sink: W,
        mut source: R,
        payload: &[u8],
    ) -> Vec<u8> {
        sink.write_payload(payload).unwrap();
        sink.close();
        source.read_payload().unwrap()
    }

    #[test]
    fn test_pipe_channel() {
        let (reader, writer) = pipe().unwrap();
        assert_eq!(transfer(writer, reader, b"pipe payload"), b"pipe payload");
    }

    #[test]
    fn test_shm_channel() {
        let config = SharedMemoryConfig {
            size: 1024,
            key: SegmentKey::Private,
            ..SharedMemoryConfig::default()
        };
        let segment = SharedMemorySegment::create(&config).unwrap();
        let writer = segment.attach().unwrap();
        let reader = segment.attach().unwrap();

        assert_eq!(transfer(writer, reader, b"shm payload"), b"shm payload");
    }

    #[test]
    fn test_sink_by_reference() {
        let config = SharedMemoryConfig {
            size: 8,
            key: SegmentKey::Private,
            ..SharedMemoryConfig::default()
        };
        let segment = SharedMemorySegment::create(&config).unwrap();
        let mut shm = segment.attach().unwrap();

        fn write_via<S: PayloadSink>(mut sink: S, payload: &[u8]) -> crate::Result<()> {
            sink.write_payload(payload)
        }

        assert!(matches!(
            write_via(&mut shm, b"way too long"),
            Err(TransportError::OutOfBounds { .. })
        ));
        write_via(&mut shm, b"fits").unwrap();
        assert_eq!(shm.read_bytes(), b"fits");
    }
}
