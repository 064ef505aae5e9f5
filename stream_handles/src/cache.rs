use crate::entry::HandleEntry;
use crate::error::HandleError;
use crate::native::NativeLibrary;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use derivative::Derivative;
use std::ops::Deref;
use std::sync::Arc;

/// A reference to the cached handle of one stream
///
/// Cheap to clone. Meant to be held for the duration of an operation, not stored.
#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct HandleRef<L: NativeLibrary> {
    entry: Arc<HandleEntry<L>>,
}

impl<L: NativeLibrary> Clone for HandleRef<L> {
    fn clone(&self) -> Self {
        Self {
            entry: self.entry.clone(),
        }
    }
}

impl<L: NativeLibrary> HandleRef<L> {
    pub fn handle(&self) -> &L::Handle {
        self.entry.handle()
    }

    pub fn stream(&self) -> L::Stream {
        self.entry.stream()
    }

    pub fn entry(&self) -> &HandleEntry<L> {
        &self.entry
    }

    /// Whether both references point at the same cached entry
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.entry, &b.entry)
    }
}

impl<L: NativeLibrary> Deref for HandleRef<L> {
    type Target = L::Handle;

    fn deref(&self) -> &Self::Target {
        self.handle()
    }
}

/// Keeps one initialized native handle per stream
///
/// Handles are created lazily on the first [`HandleCache::acquire`] of a stream and are shared
/// by every later acquisition on that stream. At most one handle is ever created per stream,
/// no matter how many threads race on the first acquisition.
///
/// The cache is meant to live as long as the native library is in use. Pass it by reference to
/// everything which needs a handle; if a process wide cache is wanted, store it in a
/// [`std::sync::OnceLock`].
///
/// # Locking
/// Lookup and insertion happen under the lock of the shard the stream hashes into. Creation of
/// a missing handle happens while that shard is write locked, so first use of streams which
/// share a shard is serialized, but lookups of already cached streams never wait on a
/// native call made for another shard.
#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct HandleCache<L: NativeLibrary> {
    #[derivative(Debug = "ignore")]
    library: Arc<L>,
    handles: DashMap<L::Stream, Arc<HandleEntry<L>>>,
}

impl<L: NativeLibrary> HandleCache<L> {
    pub fn new(library: L) -> Self {
        Self::from_shared(Arc::new(library))
    }

    /// Build a cache over a library which is also used elsewhere
    pub fn from_shared(library: Arc<L>) -> Self {
        Self {
            library,
            handles: DashMap::new(),
        }
    }

    /// Pre-size the cache for roughly `capacity` streams
    pub fn with_capacity(library: L, capacity: usize) -> Self {
        Self {
            library: Arc::new(library),
            handles: DashMap::with_capacity(capacity),
        }
    }

    pub fn library(&self) -> &Arc<L> {
        &self.library
    }

    /// Get the handle of `stream`, creating and binding one if this is the first time the stream
    /// is seen
    ///
    /// On failure nothing is cached, so the next call for the same stream tries again.
    pub fn acquire(&self, stream: L::Stream) -> Result<HandleRef<L>, HandleError> {
        if let Some(entry) = self.handles.get(&stream) {
            return Ok(HandleRef {
                entry: entry.value().clone(),
            });
        }

        match self.handles.entry(stream) {
            // lost the race to another thread between the lookup and the write lock
            Entry::Occupied(occupied) => Ok(HandleRef {
                entry: occupied.get().clone(),
            }),
            Entry::Vacant(vacant) => {
                tracing::info!("Creating native handles for stream {:?}", stream);
                let mut entry = HandleEntry::new(self.library.clone(), stream);
                entry.initialize()?;
                let entry = Arc::new(entry);
                vacant.insert(entry.clone());
                Ok(HandleRef { entry })
            }
        }
    }

    /// Get the handle of `stream` if one was already created
    pub fn get(&self, stream: L::Stream) -> Option<HandleRef<L>> {
        self.handles.get(&stream).map(|entry| HandleRef {
            entry: entry.value().clone(),
        })
    }

    pub fn contains(&self, stream: L::Stream) -> bool {
        self.handles.contains_key(&stream)
    }

    /// Number of streams with a cached handle
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Every stream with a cached handle, in no particular order
    pub fn streams(&self) -> Vec<L::Stream> {
        self.handles.iter().map(|entry| *entry.key()).collect()
    }
}
