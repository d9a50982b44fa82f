//! Status-line macros shared by every crate in the workspace.
//!
//! They are thin wrappers over `tracing`. `success!` is emitted at `INFO`
//! level under the [`SUCCESS_TARGET`] target so the terminal formatter can
//! tell a positive finding apart from plain progress output.

pub const SUCCESS_TARGET: &str = "mscheck::success";

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::__tracing::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::__tracing::info!(target: $crate::log::SUCCESS_TARGET, $($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::__tracing::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::__tracing::error!($($arg)*)
    };
}
