use crate::error::{HandleError, HandleFault, InitStage};
use crate::native::NativeLibrary;
use crate::traits::Destructible;
use derivative::Derivative;
use std::sync::Arc;

/// One native library handle bound to one stream
///
/// The entry owns its native handle: dropping an initialized entry destroys the handle exactly
/// once. An entry which was never initialized, or whose handle was moved out with
/// [`HandleEntry::take`], issues no native calls when dropped.
#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct HandleEntry<L: NativeLibrary> {
    stream: L::Stream,
    /// `Some` if and only if the entry is initialized
    #[derivative(Debug = "ignore")]
    handle: Option<L::Handle>,
    #[derivative(Debug = "ignore")]
    library: Arc<L>,
}

impl<L: NativeLibrary> HandleEntry<L> {
    /// Makes an uninitialized entry. No native calls are made until [`HandleEntry::initialize`]
    pub fn new(library: Arc<L>, stream: L::Stream) -> Self {
        Self {
            stream,
            handle: None,
            library,
        }
    }

    /// Create the native handle and bind it to the entry's stream
    ///
    /// Does nothing if the entry is already initialized.
    pub fn initialize(&mut self) -> Result<(), HandleError> {
        if self.handle.is_some() {
            return Ok(());
        }
        let mut handle = self
            .library
            .create()
            .map_err(|status| self.init_error(InitStage::Create, status))?;
        if let Err(status) = self.library.set_stream(&mut handle, self.stream) {
            // never handed out, release it right away rather than leak it
            if let Err(destroy_status) = self.library.destroy(handle) {
                tracing::warn!(
                    "Failed to release unbound native handle for stream {:?}: {}",
                    self.stream,
                    destroy_status
                );
            }
            return Err(self.init_error(InitStage::BindStream, status));
        }

        #[cfg(feature = "log-lifetimes")]
        tracing::trace!("Created native handle for stream {:?}", self.stream);

        self.handle = Some(handle);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.handle.is_some()
    }

    pub fn stream(&self) -> L::Stream {
        self.stream
    }

    pub fn library(&self) -> &Arc<L> {
        &self.library
    }

    /// Get the native handle
    ///
    /// # Panics
    /// Panics if the entry is not initialized
    pub fn handle(&self) -> &L::Handle {
        match &self.handle {
            Some(handle) => handle,
            None => Self::contract_violation(self.stream),
        }
    }

    /// Get the native handle mutably
    ///
    /// # Panics
    /// Panics if the entry is not initialized
    pub fn handle_mut(&mut self) -> &mut L::Handle {
        let stream = self.stream;
        match &mut self.handle {
            Some(handle) => handle,
            None => Self::contract_violation(stream),
        }
    }

    /// Move the native handle into a new entry without any native calls
    ///
    /// `self` is left uninitialized.
    pub fn take(&mut self) -> Self {
        Self {
            stream: self.stream,
            handle: self.handle.take(),
            library: self.library.clone(),
        }
    }

    /// Destroy the current handle (if any) and adopt the handle of `source`
    ///
    /// Giving an entry back its own taken handle is a no-op as far as the native side goes.
    pub fn assign(&mut self, mut source: Self) {
        self.destroy();
        self.stream = source.stream;
        self.library = source.library.clone();
        self.handle = source.handle.take();
    }

    fn init_error(&self, stage: InitStage, status: crate::native::NativeStatus) -> HandleError {
        HandleError::Initialization {
            stream: format!("{:?}", self.stream),
            stage,
            status,
        }
    }

    fn contract_violation(stream: L::Stream) -> ! {
        let fault = HandleFault::ContractViolation {
            stream: format!("{:?}", stream),
        };
        tracing::error!("{fault}");
        panic!("{fault}");
    }
}

impl<L: NativeLibrary> Destructible for HandleEntry<L> {
    fn destroy(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        #[cfg(feature = "log-lifetimes")]
        tracing::trace!("Destroying native handle for stream {:?}", self.stream);

        if let Err(status) = self.library.destroy(handle) {
            let fault = HandleFault::ConsistencyFault {
                stream: format!("{:?}", self.stream),
                status,
            };
            tracing::error!("{fault}");
            panic!("{fault}");
        }
    }
}

impl<L: NativeLibrary> Drop for HandleEntry<L> {
    fn drop(&mut self) {
        self.destroy();
    }
}
