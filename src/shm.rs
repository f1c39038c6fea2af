//! Shared memory segments the frame producer writes into.
//!
//! The contract: `wait()` blocks until the producer signals a new frame,
//! `lock()` gives exclusive access to the data bytes until the guard drops.

use std::ops::Deref;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// A named segment with a "new data" signal and a data lock.
pub trait SharedMemory {
    /// Exclusive view of the data bytes; unlocks on drop.
    type Guard<'a>: Deref<Target = [u8]>
    where
        Self: 'a;

    fn valid(&self) -> bool;
    fn name(&self) -> &str;
    /// Data size in bytes (header excluded).
    fn size(&self) -> usize;
    /// Block until the producer signals new data. No timeout.
    fn wait(&self);
    fn lock(&self) -> Self::Guard<'_>;
}

impl<T: SharedMemory + ?Sized> SharedMemory for Arc<T> {
    type Guard<'a>
        = T::Guard<'a>
    where
        Self: 'a;

    fn valid(&self) -> bool {
        (**self).valid()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn size(&self) -> usize {
        (**self).size()
    }

    fn wait(&self) {
        (**self).wait()
    }

    fn lock(&self) -> Self::Guard<'_> {
        (**self).lock()
    }
}

/* ----------------------------- in-process segment ----------------------------- */

struct LocalState {
    data: Vec<u8>,
    // bumped on every publish
    generation: u64,
    // last generation a `wait` returned for
    seen: u64,
}

/// Segment living in this process. Producers call [`publish`](Self::publish);
/// the consumer side behaves like a real segment.
///
/// `wait` returns as soon as a frame newer than the one last waited for has
/// been published, so a publish racing ahead of the wait is not lost.
pub struct LocalSharedMemory {
    name: String,
    size: usize,
    state: Mutex<LocalState>,
    signal: Condvar,
}

impl LocalSharedMemory {
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            size,
            state: Mutex::new(LocalState { data: vec![0; size], generation: 0, seen: 0 }),
            signal: Condvar::new(),
        }
    }

    /// Copy `bytes` into the segment (truncated to its size) and wake the waiter.
    pub fn publish(&self, bytes: &[u8]) {
        let mut state = self.state();
        let n = bytes.len().min(state.data.len());
        state.data[..n].copy_from_slice(&bytes[..n]);
        state.generation += 1;
        drop(state);
        self.signal.notify_all();
    }

    /// Number of frames published so far.
    pub fn generation(&self) -> u64 {
        self.state().generation
    }

    fn state(&self) -> MutexGuard<'_, LocalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct LocalGuard<'a>(MutexGuard<'a, LocalState>);

impl Deref for LocalGuard<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0.data
    }
}

impl SharedMemory for LocalSharedMemory {
    type Guard<'a> = LocalGuard<'a>;

    fn valid(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> usize {
        self.size
    }

    fn wait(&self) {
        let mut state = self.state();
        while state.generation == state.seen {
            state = self.signal.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
        state.seen = state.generation;
    }

    fn lock(&self) -> LocalGuard<'_> {
        LocalGuard(self.state())
    }
}

/* ------------------------------- POSIX segment -------------------------------- */

#[cfg(unix)]
pub use posix::{PosixGuard, PosixSharedMemory};

#[cfg(unix)]
mod posix {
    use std::ffi::CString;
    use std::ops::Deref;
    use std::ptr::{self, NonNull};

    use super::SharedMemory;

    /// Layout at the start of the segment, written by the producer.
    #[repr(C)]
    struct Header {
        size: u32,
        mutex: libc::pthread_mutex_t,
        condition: libc::pthread_cond_t,
        #[allow(dead_code)]
        timestamp: libc::timeval,
    }

    struct Mapping {
        base: NonNull<Header>,
        len: usize,
        size: usize,
    }

    /// POSIX segment (`shm_open` + `mmap`) with a process-shared pthread
    /// mutex and condition variable in its header. Data follows the header.
    pub struct PosixSharedMemory {
        name: String,
        mapping: Option<Mapping>,
    }

    // The mapping is only touched through the pthread primitives in its header.
    unsafe impl Send for PosixSharedMemory {}

    impl PosixSharedMemory {
        /// Attach to an existing segment. Never fails outright: check
        /// [`valid`](SharedMemory::valid) afterwards.
        pub fn open(name: &str) -> Self {
            let name = if name.starts_with('/') { name.to_owned() } else { format!("/{name}") };
            let mapping = match Self::map(&name) {
                Ok(mapping) => Some(mapping),
                Err(err) => {
                    log::debug!("shared memory '{name}': {err}");
                    None
                }
            };
            Self { name, mapping }
        }

        fn map(name: &str) -> std::io::Result<Mapping> {
            use std::io::{Error, ErrorKind};

            let c_name =
                CString::new(name).map_err(|e| Error::new(ErrorKind::InvalidInput, e))?;
            // SAFETY: c_name is a valid NUL-terminated string.
            let fd = unsafe { libc::shm_open(c_name.as_ptr(), libc::O_RDWR, 0o600) };
            if fd < 0 {
                return Err(Error::last_os_error());
            }

            let mapped = Self::map_fd(fd);
            // SAFETY: fd came from shm_open above; the mapping keeps its own reference.
            unsafe { libc::close(fd) };
            mapped
        }

        fn map_fd(fd: libc::c_int) -> std::io::Result<Mapping> {
            use std::io::{Error, ErrorKind};

            // SAFETY: stat is plain data and fd is open.
            let mut stat: libc::stat = unsafe { std::mem::zeroed() };
            if unsafe { libc::fstat(fd, &mut stat) } != 0 {
                return Err(Error::last_os_error());
            }
            let len = stat.st_size as usize;
            let header_len = std::mem::size_of::<Header>();
            if len < header_len {
                return Err(Error::new(ErrorKind::InvalidData, "segment smaller than its header"));
            }

            // SAFETY: mapping `len` bytes of an open shm descriptor.
            let base = unsafe {
                libc::mmap(
                    ptr::null_mut(),
                    len,
                    libc::PROT_READ | libc::PROT_WRITE,
                    libc::MAP_SHARED,
                    fd,
                    0,
                )
            };
            if base == libc::MAP_FAILED {
                return Err(Error::last_os_error());
            }
            let base = NonNull::new(base.cast::<Header>())
                .ok_or_else(|| Error::new(ErrorKind::Other, "mmap returned null"))?;

            // SAFETY: at least header_len bytes are mapped.
            let size = unsafe { (*base.as_ptr()).size } as usize;
            let mapping = Mapping { base, len, size };
            if header_len + size > len {
                drop(mapping);
                return Err(Error::new(ErrorKind::InvalidData, "header size exceeds segment"));
            }
            Ok(mapping)
        }

        fn header(&self) -> Option<*mut Header> {
            self.mapping.as_ref().map(|m| m.base.as_ptr())
        }
    }

    impl Drop for Mapping {
        fn drop(&mut self) {
            // SAFETY: base/len describe a live mapping created by mmap.
            unsafe { libc::munmap(self.base.as_ptr().cast(), self.len) };
        }
    }

    /// Holds the segment mutex; unlocks on drop. Empty for an invalid segment.
    pub struct PosixGuard<'a> {
        header: Option<*mut Header>,
        data: &'a [u8],
    }

    impl Deref for PosixGuard<'_> {
        type Target = [u8];

        fn deref(&self) -> &[u8] {
            self.data
        }
    }

    impl Drop for PosixGuard<'_> {
        fn drop(&mut self) {
            if let Some(header) = self.header {
                // SAFETY: the mutex was locked by `lock` on this thread.
                unsafe { libc::pthread_mutex_unlock(ptr::addr_of_mut!((*header).mutex)) };
            }
        }
    }

    impl SharedMemory for PosixSharedMemory {
        type Guard<'a> = PosixGuard<'a>;

        fn valid(&self) -> bool {
            self.mapping.is_some()
        }

        fn name(&self) -> &str {
            &self.name
        }

        fn size(&self) -> usize {
            self.mapping.as_ref().map_or(0, |m| m.size)
        }

        fn wait(&self) {
            let Some(header) = self.header() else { return };
            // SAFETY: header points into a live mapping; the producer
            // initialised both primitives as process-shared.
            unsafe {
                let mutex = ptr::addr_of_mut!((*header).mutex);
                libc::pthread_mutex_lock(mutex);
                libc::pthread_cond_wait(ptr::addr_of_mut!((*header).condition), mutex);
                libc::pthread_mutex_unlock(mutex);
            }
        }

        fn lock(&self) -> PosixGuard<'_> {
            let Some(mapping) = self.mapping.as_ref() else {
                return PosixGuard { header: None, data: &[] };
            };
            let header = mapping.base.as_ptr();
            // SAFETY: the data region of `size` bytes directly follows the
            // header and stays mapped for the lifetime of &self.
            unsafe {
                libc::pthread_mutex_lock(ptr::addr_of_mut!((*header).mutex));
                let data = header.cast::<u8>().add(std::mem::size_of::<Header>());
                PosixGuard {
                    header: Some(header),
                    data: std::slice::from_raw_parts(data, mapping.size),
                }
            }
        }
    }

}
