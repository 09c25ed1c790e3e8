//! Kernel spans and summary events, compiled out without the `tracing`
//! feature.
//!
//! Every kernel entry point opens one `kernel_span!` and emits one
//! `kernel_event!` after its loop, so per-pixel code never reaches the
//! subscriber. Both macros take `key = value` fields only.

#[cfg(feature = "tracing")]
macro_rules! kernel_span {
    ($name:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::info_span!($name $(, $key = $value)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! kernel_span {
    ($name:literal $(, $key:ident = $value:expr)* $(,)?) => {{
        let _ = ($($value,)*);
        $crate::trace::NoopSpan
    }};
}

/// The event name doubles as the message so plain `fmt` output stays
/// readable.
#[cfg(feature = "tracing")]
macro_rules! kernel_event {
    ($name:literal, $($key:ident = $value:expr),+ $(,)?) => {
        tracing::info!($($key = $value,)+ $name)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! kernel_event {
    ($name:literal, $($key:ident = $value:expr),+ $(,)?) => {
        let _ = ($($value,)+);
    };
}

pub(crate) use kernel_event;
pub(crate) use kernel_span;

/// Guard returned by `kernel_span!` when tracing is compiled out.
#[cfg(not(feature = "tracing"))]
#[must_use]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    #[inline]
    pub fn entered(self) -> Self {
        self
    }
}
