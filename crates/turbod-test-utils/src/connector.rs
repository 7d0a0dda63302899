//! Recording [`Connector`] for bootstrap tests.
//!
//! [`SpyConnector`] remembers every descriptor and cancellation token it is
//! handed, then echoes the descriptor back as the "client" (or fails, if told
//! to). Clones share the same record, so a test can keep one handle while the
//! bootstrapper owns another.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;
use turbod_core::{BoxFuture, ClientDescriptor, ConnectError, Connector};

/// One recorded `connect` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub descriptor: ClientDescriptor,
    pub cancel: CancellationToken,
}

#[derive(Debug, Default)]
struct SpyState {
    calls: Vec<RecordedCall>,
}

/// A connector that records its calls.
#[derive(Debug, Clone, Default)]
pub struct SpyConnector {
    state: Arc<Mutex<SpyState>>,
    failure: Option<String>,
}

impl SpyConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A spy whose every call fails with [`ConnectError::Other`] carrying
    /// `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn was_called(&self) -> bool {
        !self.lock().calls.is_empty()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, SpyState> {
        // A panicking test thread must not hide the record from the others.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Connector for SpyConnector {
    type Client = ClientDescriptor;

    fn connect(
        &self,
        cancel: CancellationToken,
        descriptor: ClientDescriptor,
    ) -> BoxFuture<'_, Result<ClientDescriptor, ConnectError>> {
        self.lock().calls.push(RecordedCall {
            descriptor: descriptor.clone(),
            cancel,
        });
        let failure = self.failure.clone();
        Box::pin(async move {
            match failure {
                Some(message) => Err(ConnectError::other(message)),
                None => Ok(descriptor),
            }
        })
    }
}
