// EventLoopBridge - Coordinates between the tokio runtime and the frame presenter
//
// Screens render on tokio tasks; frames are drawn by a single presenter thread
// that owns the output. The bridge provides:
// - Queuing rendered frames from any task without blocking it
// - Spawning async tasks onto the runtime from host code
// - An orderly shutdown that flushes every queued frame

use crate::ui::view::Screen;
use std::future::Future;
use std::io::Write;
use std::thread::JoinHandle;
use tokio::sync::mpsc;

/// Frames queued ahead of the presenter before new ones are dropped
pub const FRAME_CHANNEL_CAPACITY: usize = 100;

/// Coordinates between the tokio runtime and the presenter thread
///
/// # Example
/// ```ignore
/// let runtime = tokio::runtime::Runtime::new()?;
/// let bridge = EventLoopBridge::new(runtime.handle().clone(), Box::new(std::io::stdout()));
///
/// bridge.spawn_async(move || async move {
///     while let Some(frame) = screen.next_frame().await {
///         handle.present(&frame);
///     }
/// });
/// ```
pub struct EventLoopBridge {
    handle: EventLoopBridgeHandle,
    presenter: Option<JoinHandle<()>>,
}

impl EventLoopBridge {
    /// Create a bridge whose presenter thread writes frames to `output`.
    pub fn new(tokio_handle: tokio::runtime::Handle, output: Box<dyn Write + Send>) -> Self {
        // Bounded so a slow terminal cannot grow the queue without limit
        let (frame_tx, mut frame_rx) = mpsc::channel::<String>(FRAME_CHANNEL_CAPACITY);

        let presenter = std::thread::Builder::new()
            .name("countries-presenter".to_string())
            .spawn(move || {
                tracing::debug!("EventLoopBridge presenter thread started");
                let mut output = output;

                while let Some(frame) = frame_rx.blocking_recv() {
                    let result = writeln!(output, "{frame}").and_then(|()| output.flush());
                    if let Err(e) = result {
                        tracing::warn!("Failed to write frame: {}", e);
                        // Output is gone, nothing more can be shown
                        break;
                    }
                }

                tracing::debug!("EventLoopBridge presenter thread terminated");
            });

        let presenter = match presenter {
            Ok(join) => Some(join),
            Err(e) => {
                tracing::error!("Failed to start presenter thread: {}", e);
                None
            }
        };

        Self {
            handle: EventLoopBridgeHandle {
                tokio_handle,
                frame_tx,
            },
            presenter,
        }
    }

    /// Queue a frame for drawing. Never blocks the caller.
    pub fn present(&self, screen: &Screen) {
        self.handle.present(screen);
    }

    /// Spawn an async task on the tokio runtime.
    pub fn spawn_async<F, Fut>(&self, future_factory: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn_async(future_factory);
    }

    /// Cloneable handle for tasks that present frames.
    pub fn handle(&self) -> EventLoopBridgeHandle {
        self.handle.clone()
    }

    /// Stop accepting frames and wait until every queued frame is written.
    ///
    /// Handles still held elsewhere keep the presenter alive; drop them first.
    pub fn shutdown(self) {
        let Self { handle, presenter } = self;
        // Dropping our sender lets the presenter drain and exit
        drop(handle);

        if let Some(join) = presenter {
            if join.join().is_err() {
                tracing::warn!("Presenter thread panicked");
            }
        }
    }
}

/// Lightweight handle that can be cloned into tasks
#[derive(Clone)]
pub struct EventLoopBridgeHandle {
    tokio_handle: tokio::runtime::Handle,
    frame_tx: mpsc::Sender<String>,
}

impl EventLoopBridgeHandle {
    /// Queue a frame for drawing.
    ///
    /// Frames are rendered to text on the calling task so the presenter only
    /// does I/O. A full queue drops the frame; the next one supersedes it.
    pub fn present(&self, screen: &Screen) {
        match self.frame_tx.try_send(screen.to_string()) {
            Ok(_) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("Frame channel full - skipping frame to prevent backpressure");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!("Failed to send frame - presenter thread has stopped");
            }
        }
    }

    /// Spawn an async task on the tokio runtime.
    pub fn spawn_async<F, Fut>(&self, future_factory: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.tokio_handle.spawn(async move {
            future_factory().await;
        });
    }
}
