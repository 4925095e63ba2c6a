//! System V shared memory segments.
//!
//! A [`SharedMemorySegment`] is created once, before the fork, by the process
//! that owns it. Each process then maps it with [`SharedMemorySegment::attach`]
//! and the owner releases it with [`SharedMemorySegment::destroy`], or on drop.

use crate::error::{Result, TransportError};
use std::ffi::CString;
use std::marker::PhantomData;
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;
use std::ptr::{self, NonNull};

/// How the system-wide key of a segment is obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKey {
    /// Key derived with `ftok` from an existing path and a project token.
    Path {
        /// Existing filesystem path.
        path: PathBuf,
        /// Application-specific token, only the low 8 bits are used.
        proj_id: u8,
    },
    /// `IPC_PRIVATE`: a fresh segment only reachable through its id.
    Private,
}

impl SegmentKey {
    /// Resolves the key to a `key_t`.
    ///
    /// # Errors
    /// Returns `TransportError::Resource` if the path contains a NUL byte or
    /// `ftok` fails (for instance because the path does not exist).
    pub fn resolve(&self) -> Result<libc::key_t> {
        match self {
            Self::Private => Ok(libc::IPC_PRIVATE),
            Self::Path { path, proj_id } => {
                let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|e| {
                    TransportError::Resource {
                        op: "ftok",
                        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
                    }
                })?;
                let key = unsafe { libc::ftok(c_path.as_ptr(), libc::c_int::from(*proj_id)) };
                if key == -1 {
                    return Err(TransportError::last_os_error("ftok"));
                }
                Ok(key)
            }
        }
    }
}

impl Default for SegmentKey {
    fn default() -> Self {
        Self::Path {
            path: PathBuf::from("/tmp"),
            proj_id: b'X',
        }
    }
}

/// Configuration for a shared memory segment.
#[derive(Debug, Clone)]
pub struct SharedMemoryConfig {
    /// Size of the segment in bytes.
    pub size: usize,
    /// Key the segment is looked up or created under.
    pub key: SegmentKey,
    /// Permission bits of a newly created segment.
    pub mode: u32,
}

impl Default for SharedMemoryConfig {
    fn default() -> Self {
        Self {
            size: 1024 * 1024, // 1MB
            key: SegmentKey::default(),
            mode: 0o666,
        }
    }
}

/// Handle to a System V shared memory segment.
///
/// The handle returned by [`create`](Self::create) owns the segment and
/// marks it for removal when dropped, unless it was destroyed explicitly or
/// [`disown`](Self::disown)ed.
#[derive(Debug)]
pub struct SharedMemorySegment {
    id: libc::c_int,
    size: usize,
    owned: bool,
    destroyed: bool,
}

impl SharedMemorySegment {
    /// Creates, or opens if the key already exists, a shared memory segment.
    ///
    /// # Errors
    /// Returns `TransportError::Resource` if the key cannot be resolved or
    /// the system is out of IPC resources.
    pub fn create(config: &SharedMemoryConfig) -> Result<Self> {
        let key = config.key.resolve()?;
        let flags = libc::IPC_CREAT | (config.mode & 0o777) as libc::c_int;
        let id = unsafe { libc::shmget(key, config.size, flags) };
        if id == -1 {
            return Err(TransportError::last_os_error("shmget"));
        }

        tracing::debug!("Created shared memory segment {} ({} bytes)", id, config.size);

        Ok(Self {
            id,
            size: config.size,
            owned: true,
            destroyed: false,
        })
    }

    /// Returns the system-wide segment identifier.
    #[must_use]
    pub fn id(&self) -> libc::c_int {
        self.id
    }

    /// Returns the size of the segment in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns true if dropping this handle releases the segment.
    #[must_use]
    pub fn is_owner(&self) -> bool {
        self.owned && !self.destroyed
    }

    /// Gives up ownership, so dropping this handle leaves the segment alone.
    ///
    /// Used by the forked child, which inherits a copy of the owner's handle.
    pub fn disown(&mut self) {
        self.owned = false;
    }

    /// Maps the segment into this process's address space.
    ///
    /// # Errors
    /// Returns `TransportError::AlreadyDestroyed` if this handle destroyed
    /// the segment, or `TransportError::Resource` if `shmat` fails.
    pub fn attach(&self) -> Result<ShmAttachment<'_>> {
        if self.destroyed {
            return Err(TransportError::AlreadyDestroyed { id: self.id });
        }

        let addr = unsafe { libc::shmat(self.id, ptr::null(), 0) };
        if addr as isize == -1 {
            return Err(TransportError::last_os_error("shmat"));
        }
        let ptr = NonNull::new(addr.cast::<u8>())
            .ok_or_else(|| TransportError::last_os_error("shmat"))?;

        tracing::debug!("Attached shared memory segment {} at {:p}", self.id, ptr);

        Ok(ShmAttachment {
            ptr,
            len: self.size,
            _segment: PhantomData,
        })
    }

    /// Releases the segment.
    ///
    /// Attachments still mapped elsewhere stay valid until they detach.
    ///
    /// # Errors
    /// Returns `TransportError::AlreadyDestroyed` on a second call, or
    /// `TransportError::Resource` if `shmctl` rejects the id.
    pub fn destroy(&mut self) -> Result<()> {
        if self.destroyed {
            return Err(TransportError::AlreadyDestroyed { id: self.id });
        }
        Self::remove(self.id)?;
        self.destroyed = true;
        tracing::debug!("Destroyed shared memory segment {}", self.id);
        Ok(())
    }

    /// Marks the segment `id` for removal.
    ///
    /// # Errors
    /// Returns `TransportError::Resource` if the id is not (or no longer) a
    /// valid segment.
    pub fn remove(id: libc::c_int) -> Result<()> {
        let rc = unsafe { libc::shmctl(id, libc::IPC_RMID, ptr::null_mut()) };
        if rc == -1 {
            return Err(TransportError::last_os_error("shmctl(IPC_RMID)"));
        }
        Ok(())
    }
}

impl Drop for SharedMemorySegment {
    fn drop(&mut self) {
        if self.is_owner() {
            if let Err(e) = self.destroy() {
                tracing::warn!("Failed to release shared memory segment {}: {}", self.id, e);
            }
        }
    }
}

/// A mapping of a shared memory segment into this process.
///
/// Detaches on drop. The mapping borrows its segment handle, so the owner
/// cannot destroy the segment through that handle while it is mapped here.
pub struct ShmAttachment<'a> {
    ptr: NonNull<u8>,
    len: usize,
    _segment: PhantomData<&'a SharedMemorySegment>,
}

impl ShmAttachment<'_> {
    /// Returns the size of the mapped region in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the mapped region is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns a slice of the mapped region.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Returns a mutable slice of the mapped region.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Copies `payload` to offset 0, followed by a NUL terminator when the
    /// region has room for one.
    ///
    /// # Errors
    /// Returns `TransportError::OutOfBounds` if the payload is larger than
    /// the region. Nothing is written in that case.
    pub fn write(&mut self, payload: &[u8]) -> Result<()> {
        if payload.len() > self.len {
            return Err(TransportError::out_of_bounds(payload.len(), self.len));
        }
        let region = self.as_mut_slice();
        region[..payload.len()].copy_from_slice(payload);
        if let Some(terminator) = region.get_mut(payload.len()) {
            *terminator = 0;
        }
        Ok(())
    }

    /// Returns the bytes from offset 0 up to the first NUL, or the whole
    /// region if there is none.
    #[must_use]
    pub fn read_bytes(&self) -> &[u8] {
        let region = self.as_slice();
        let end = region.iter().position(|&b| b == 0).unwrap_or(region.len());
        &region[..end]
    }

    /// Reads the NUL-terminated payload as a string.
    #[must_use]
    pub fn read_as_string(&self) -> String {
        String::from_utf8_lossy(self.read_bytes()).into_owned()
    }
}

impl Drop for ShmAttachment<'_> {
    fn drop(&mut self) {
        let rc = unsafe { libc::shmdt(self.ptr.as_ptr().cast::<libc::c_void>()) };
        if rc == -1 {
            tracing::warn!(
                "Failed to detach shared memory: {}",
                std::io::Error::last_os_error()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn private_config(size: usize) -> SharedMemoryConfig {
        SharedMemoryConfig {
            size,
            key: SegmentKey::Private,
            ..SharedMemoryConfig::default()
        }
    }

    // What the child holds after a fork: a second handle to the same id
    // that still believes it owns the segment.
    fn inherited_copy(segment: &SharedMemorySegment) -> SharedMemorySegment {
        SharedMemorySegment {
            id: segment.id,
            size: segment.size,
            owned: segment.owned,
            destroyed: segment.destroyed,
        }
    }

    #[test]
    fn test_shared_memory_config_default() {
        let config = SharedMemoryConfig::default();
        assert_eq!(config.size, 1024 * 1024);
        assert_eq!(config.mode, 0o666);
        assert_eq!(
            config.key,
            SegmentKey::Path {
                path: PathBuf::from("/tmp"),
                proj_id: b'X'
            }
        );
    }

    #[test]
    fn test_segment_key_resolve() {
        let dir = tempdir().unwrap();
        let key = SegmentKey::Path {
            path: dir.path().to_path_buf(),
            proj_id: b'T',
        };
        let first = key.resolve().unwrap();
        assert_eq!(first, key.resolve().unwrap());
        assert_ne!(first, libc::IPC_PRIVATE);

        assert_eq!(SegmentKey::Private.resolve().unwrap(), libc::IPC_PRIVATE);
    }

    #[test]
    fn test_segment_key_missing_path() {
        let key = SegmentKey::Path {
            path: PathBuf::from("/nonexistent/ipcbench/key"),
            proj_id: b'X',
        };
        assert!(matches!(
            key.resolve(),
            Err(TransportError::Resource { op: "ftok", .. })
        ));
    }

    #[test]
    fn test_write_then_read() {
        let segment = SharedMemorySegment::create(&private_config(4096)).unwrap();
        let mut shm = segment.attach().unwrap();
        assert_eq!(shm.len(), 4096);

        shm.write(b"Hello, shared memory!").unwrap();
        assert_eq!(shm.read_as_string(), "Hello, shared memory!");
    }

    #[test]
    fn test_two_attachments_share_region() {
        let segment = SharedMemorySegment::create(&private_config(4096)).unwrap();
        let mut writer = segment.attach().unwrap();
        let reader = segment.attach().unwrap();

        writer.write(b"abcXYZ123").unwrap();
        assert_eq!(reader.read_bytes(), b"abcXYZ123");
    }

    #[test]
    fn test_shorter_write_terminates() {
        let segment = SharedMemorySegment::create(&private_config(64)).unwrap();
        let mut shm = segment.attach().unwrap();

        shm.write(b"a longer first payload").unwrap();
        shm.write(b"short").unwrap();
        assert_eq!(shm.read_as_string(), "short");
    }

    #[test]
    fn test_payload_fills_region() {
        let segment = SharedMemorySegment::create(&private_config(16)).unwrap();
        let mut shm = segment.attach().unwrap();

        let payload = [b'q'; 16];
        shm.write(&payload).unwrap();
        assert_eq!(shm.read_bytes(), &payload);
    }

    #[test]
    fn test_payload_too_large() {
        let segment = SharedMemorySegment::create(&private_config(16)).unwrap();
        let mut shm = segment.attach().unwrap();
        shm.write(b"kept").unwrap();

        let err = shm.write(&[b'z'; 17]).unwrap_err();
        assert!(matches!(
            err,
            TransportError::OutOfBounds {
                len: 17,
                capacity: 16
            }
        ));
        assert_eq!(shm.read_as_string(), "kept");
    }

    #[test]
    fn test_destroy_twice() {
        let mut segment = SharedMemorySegment::create(&private_config(4096)).unwrap();
        let id = segment.id();

        segment.destroy().unwrap();
        assert!(!segment.is_owner());
        assert!(matches!(
            segment.destroy(),
            Err(TransportError::AlreadyDestroyed { id: got }) if got == id
        ));
        assert!(matches!(
            segment.attach(),
            Err(TransportError::AlreadyDestroyed { .. })
        ));
    }

    #[test]
    fn test_remove_stale_id() {
        let mut segment = SharedMemorySegment::create(&private_config(4096)).unwrap();
        let id = segment.id();
        segment.disown();

        SharedMemorySegment::remove(id).unwrap();
        assert!(matches!(
            SharedMemorySegment::remove(id),
            Err(TransportError::Resource { .. })
        ));
    }

    #[test]
    fn test_drop_releases_owned_segment() {
        let segment = SharedMemorySegment::create(&private_config(4096)).unwrap();
        let id = segment.id();
        drop(segment);

        assert!(SharedMemorySegment::remove(id).is_err());
    }

    #[test]
    fn test_disowned_handle_keeps_segment() {
        let owner = SharedMemorySegment::create(&private_config(4096)).unwrap();
        {
            let mut copy = inherited_copy(&owner);
            assert!(copy.is_owner());
            copy.disown();
            assert!(!copy.is_owner());
            let mut shm = copy.attach().unwrap();
            shm.write(b"still here").unwrap();
        }

        let shm = owner.attach().unwrap();
        assert_eq!(shm.read_as_string(), "still here");
    }

    #[test]
    fn test_attach_stale_id() {
        let mut segment = SharedMemorySegment::create(&private_config(4096)).unwrap();
        let mut stale = inherited_copy(&segment);
        stale.disown();
        segment.destroy().unwrap();

        assert!(matches!(
            stale.attach(),
            Err(TransportError::Resource { op: "shmat", .. })
        ));
    }

    #[test]
    fn test_create_fails() {
        let err = SharedMemorySegment::create(&private_config(0)).unwrap_err();
        assert!(matches!(err, TransportError::Resource { op: "shmget", .. }));
    }
}
