//! Span definitions per operation: queue flush, item request, refetch.

/// Create a write-queue flush span.
#[macro_export]
macro_rules! flush_span {
    ($key:expr, $items:expr) => {
        $crate::tracing::info_span!("buildcraft.flush", key = %$key, items = $items)
    };
}

/// Create a span for one HTTP item request.
#[macro_export]
macro_rules! request_span {
    ($method:expr, $path:expr, $request_id:expr) => {
        $crate::tracing::debug_span!(
            "buildcraft.request",
            method = %$method,
            path = %$path,
            request_id = %$request_id
        )
    };
}

/// Create a span for a server refetch of subproject totals.
#[macro_export]
macro_rules! refetch_span {
    ($subproject:expr) => {
        $crate::tracing::info_span!("buildcraft.refetch", subproject = %$subproject)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const FLUSH: &str = "buildcraft.flush";
    pub const REQUEST: &str = "buildcraft.request";
    pub const REFETCH: &str = "buildcraft.refetch";
}
