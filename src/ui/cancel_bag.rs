use crate::services::LoadHandle;

/// Holds the loads a screen started; dropping the bag cancels them.
#[derive(Debug, Default)]
pub struct CancelBag {
    handles: Vec<LoadHandle>,
}

impl CancelBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `handle` alive for as long as the bag. Finished handles are pruned.
    pub fn store(&mut self, handle: LoadHandle) {
        self.handles.retain(|h| !h.is_finished());
        self.handles.push(handle);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn cancel_all(&mut self) {
        if !self.handles.is_empty() {
            tracing::debug!(count = self.handles.len(), "Cancelling stored loads");
        }
        // Each handle cancels on drop
        self.handles.clear();
    }
}

impl Drop for CancelBag {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
