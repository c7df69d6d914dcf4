use thiserror::Error;

/// Error captured in [`Loadable::Failed`].
///
/// Compared by value so that two identical failures produce equal snapshots
/// and the change filter can suppress the second one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("The request timed out")]
    Timeout,

    #[error("Server responded with HTTP {status}")]
    Status { status: u16 },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Canceled by user")]
    Cancelled,
}

impl LoadError {
    /// Stable machine-readable code for this error.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Network(_) => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::Status { .. } => "HTTP_STATUS",
            Self::Decode(_) => "DECODE_ERROR",
            Self::Cancelled => "CANCELLED",
        }
    }
}

/// Lifecycle of an asynchronously loaded value.
///
/// `Loading` may carry the last successfully loaded value so a screen can keep
/// showing stale content while a refresh is in flight.
///
/// The expected lifecycle is `NotRequested -> Loading -> (Loaded | Failed)`,
/// with refresh and retry re-entering `Loading`. See
/// [`is_valid_transition`](Self::is_valid_transition).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Loadable<T> {
    #[default]
    NotRequested,
    Loading(Option<T>),
    Loaded(T),
    Failed(LoadError),
}

impl<T> Loadable<T> {
    /// The loaded value, or the value carried over into `Loading`.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::Loading(previous) => previous.as_ref(),
            Self::NotRequested | Self::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&LoadError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn is_not_requested(&self) -> bool {
        matches!(self, Self::NotRequested)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading(_))
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Short variant name for logging.
    pub fn state_name(&self) -> &'static str {
        match self {
            Self::NotRequested => "not_requested",
            Self::Loading(_) => "loading",
            Self::Loaded(_) => "loaded",
            Self::Failed(_) => "failed",
        }
    }

    /// Transform the payload while keeping the variant.
    pub fn map<U, F>(self, f: F) -> Loadable<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::NotRequested => Loadable::NotRequested,
            Self::Loading(previous) => Loadable::Loading(previous.map(f)),
            Self::Loaded(value) => Loadable::Loaded(f(value)),
            Self::Failed(error) => Loadable::Failed(error),
        }
    }

    /// Whether moving from `from` to `to` follows the load lifecycle.
    ///
    /// Any state may enter `Loading`; only `Loading` may end in `Loaded` or
    /// `Failed`. Nothing returns to `NotRequested`.
    pub fn is_valid_transition(from: &Self, to: &Self) -> bool {
        matches!(
            (from, to),
            (_, Self::Loading(_)) | (Self::Loading(_), Self::Loaded(_) | Self::Failed(_))
        )
    }
}

impl<T: Clone> Loadable<T> {
    /// The `Loading` state that should follow `self`, carrying forward the
    /// current value or `fallback` when `self` holds none.
    pub fn begin_loading(&self, fallback: Option<T>) -> Self {
        Self::Loading(self.value().cloned().or(fallback))
    }
}
