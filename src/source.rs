// Pulls frames out of the shared memory segment the camera producer writes to.
// `acquire_frame()` hands back an owned copy, so the segment lock is released
// before any drawing or display happens.

use crate::error::{Error, Result};
use crate::shm::SharedMemory;
use crate::types::{frame_len, Frame};

// A small wrapper around the segment so the render loop stays clean.
pub struct SharedFrameSource<M> {
    memory: M,
    width: u32,
    height: u32,
}

impl<M: SharedMemory> SharedFrameSource<M> {
    /// Check the segment once at startup: it must be valid and large enough
    /// for one width x height BGRA frame.
    pub fn new(memory: M, width: u32, height: u32) -> Result<Self> {
        if !memory.valid() {
            return Err(Error::SharedMemoryUnavailable { name: memory.name().to_owned() });
        }

        let required = frame_len(width, height);
        if memory.size() < required {
            return Err(Error::SharedMemoryTooSmall {
                name: memory.name().to_owned(),
                width,
                height,
                required,
                available: memory.size(),
            });
        }

        log::info!("found shared memory '{}' ({} bytes)", memory.name(), memory.size());
        Ok(Self { memory, width, height })
    }

    /// Block until the producer signals a new frame, then copy it out.
    pub fn acquire_frame(&self) -> Frame {
        self.memory.wait();

        let bytes = {
            let data = self.memory.lock();
            data[..frame_len(self.width, self.height)].to_vec()
        }; // unlocked here

        Frame::from_raw(self.width, self.height, bytes).unwrap_or_else(|err| {
            // unreachable: the length was checked against the segment in `new`
            log::error!("{err}");
            Frame::blank(self.width, self.height)
        })
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn memory(&self) -> &M {
        &self.memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shm::LocalSharedMemory;

    #[test]
    fn rejects_undersized_segment() {
        let shm = LocalSharedMemory::new("cam0", 10);
        let err = SharedFrameSource::new(shm, 2, 2).err().unwrap();
        assert!(matches!(err, Error::SharedMemoryTooSmall { required: 16, available: 10, .. }));
    }

    #[test]
    fn frame_is_a_copy() {
        let shm = LocalSharedMemory::new("cam0", 8);
        let source = SharedFrameSource::new(shm, 2, 1).unwrap();
        source.memory().publish(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let frame = source.acquire_frame();

        source.memory().publish(&[0; 8]);
        assert_eq!(frame.as_bytes(), &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn larger_segment_copies_only_one_frame() {
        let shm = LocalSharedMemory::new("cam0", 12);
        let source = SharedFrameSource::new(shm, 1, 2).unwrap();
        source.memory().publish(&[9; 12]);
        let frame = source.acquire_frame();
        assert_eq!(frame.as_bytes().len(), 8);
        assert_eq!(source.resolution(), (1, 2));
        assert_eq!((frame.width(), frame.height()), source.resolution());
    }

    #[test]
    fn lock_is_released_after_acquire() {
        let shm = LocalSharedMemory::new("cam0", 4);
        let source = SharedFrameSource::new(shm, 1, 1).unwrap();
        source.memory().publish(&[1, 2, 3, 4]);
        let _frame = source.acquire_frame();
        // would deadlock if the copy still held the segment
        source.memory().publish(&[4, 3, 2, 1]);
        assert_eq!(source.memory().generation(), 2);
    }
}
