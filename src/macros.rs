//! Small crate-wide convenience macros.

/// Console logging that only reaches the browser console on wasm builds.
/// On native targets (unit tests) the format arguments are still evaluated
/// so type errors surface either way, but nothing is printed.
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {{
        #[cfg(target_arch = "wasm32")]
        web_sys::console::log_1(&format!($($arg)*).into());
        #[cfg(not(target_arch = "wasm32"))]
        let _ = format!($($arg)*);
    }};
}

/// Same idea for warnings - used at the channel boundary where dropped
/// frames must leave a trace without tearing anything down.
#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => {{
        #[cfg(target_arch = "wasm32")]
        web_sys::console::warn_1(&format!($($arg)*).into());
        #[cfg(not(target_arch = "wasm32"))]
        let _ = format!($($arg)*);
    }};
}

/// Error-level variant.
#[macro_export]
macro_rules! error_log {
    ($($arg:tt)*) => {{
        #[cfg(target_arch = "wasm32")]
        web_sys::console::error_1(&format!($($arg)*).into());
        #[cfg(not(target_arch = "wasm32"))]
        let _ = format!($($arg)*);
    }};
}
