//! Dial-only connector over a Unix domain socket.
//!
//! Connects to a daemon that is already listening on the descriptor's socket.
//! It never spawns, retries or handshakes, so `dont_start` is honoured
//! trivially; richer connectors layer those on top of the same descriptor.

use std::path::Path;

use tokio::net::UnixStream;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug};

use super::{ClientDescriptor, ConnectError, Connector};
use crate::BoxFuture;
use crate::paths::check_socket_path;

/// Connects to an already running daemon.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixSocketConnector;

/// An open stream to a daemon, along with the descriptor that located it.
#[derive(Debug)]
pub struct DaemonConnection {
    stream: UnixStream,
    descriptor: ClientDescriptor,
}

impl DaemonConnection {
    pub fn socket_path(&self) -> &Path {
        &self.descriptor.socket_path
    }

    pub fn descriptor(&self) -> &ClientDescriptor {
        &self.descriptor
    }

    pub fn stream_mut(&mut self) -> &mut UnixStream {
        &mut self.stream
    }

    pub fn into_stream(self) -> UnixStream {
        self.stream
    }
}

impl Connector for UnixSocketConnector {
    type Client = DaemonConnection;

    fn connect(
        &self,
        cancel: CancellationToken,
        descriptor: ClientDescriptor,
    ) -> BoxFuture<'_, Result<DaemonConnection, ConnectError>> {
        let span = descriptor.span.clone();
        Box::pin(
            async move {
                let socket = &descriptor.socket_path;
                check_socket_path(socket).map_err(ConnectError::other)?;
                if !socket.exists() {
                    return Err(ConnectError::NotRunning(socket.clone()));
                }

                debug!(socket = %socket.display(), "dialling daemon");
                let stream = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(ConnectError::Cancelled),
                    dialled = UnixStream::connect(socket) => {
                        dialled.map_err(|source| ConnectError::Dial {
                            path: socket.clone(),
                            source,
                        })?
                    }
                };
                debug!(socket = %socket.display(), "connected to daemon");

                Ok(DaemonConnection { stream, descriptor })
            }
            .instrument(span),
        )
    }
}
