//! Logging macros.
//!
//! Thin wrappers over `tracing` so every crate logs the same way. `success!`
//! is an INFO event on its own target, which the terminal formatter renders
//! with a distinct symbol.

pub const SUCCESS_TARGET: &str = "lanscope::success";

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => {
        $crate::tracing::info!($($arg)+)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => {
        $crate::tracing::warn!($($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => {
        $crate::tracing::error!($($arg)+)
    };
}

#[macro_export]
macro_rules! success {
    ($($arg:tt)+) => {
        $crate::tracing::info!(target: "lanscope::success", $($arg)+)
    };
}
