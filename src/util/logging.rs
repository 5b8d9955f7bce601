//! Standardized logging utility for waydrv
//! 
//! This module provides the `wlog!` macro which ensures lifecycle logs
//! follow the `YYYY-MM-DD HH:MM:SS [MODULE] Message` format. Everything
//! finer grained goes through `tracing`.

#[macro_export]
macro_rules! wlog {
    ($module:expr, $($arg:tt)*) => {{
        let now = chrono::Local::now();
        eprintln!("{} [{}] {}", 
            now.format("%Y-%m-%d %H:%M:%S"),
            $module,
            format!($($arg)*)
        );
    }};
}

/// Standardized module identifiers
pub const MAIN: &str = "MAIN";
pub const DRIVER: &str = "DRIVER";
pub const REGISTRY: &str = "REGISTRY";
pub const WAYLAND: &str = "WAYLAND";
pub const CONFIG: &str = "CONFIG";
