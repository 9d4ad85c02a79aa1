// Logging macros over the process-wide logger.
//
//     rotolog::info!("Processing item", item_id = i, stage = "parse");

#[doc(hidden)]
#[macro_export]
macro_rules! __emit {
    ($func:ident, $msg:expr $(, $key:ident = $value:expr)* $(,)?) => {
        $crate::logger::global::$func(
            ::core::convert::AsRef::<str>::as_ref(&$msg),
            &[$($crate::Field::new(::core::stringify!($key), $value)),*],
        )
    };
}

/// Emit a debug record through the shared logger
#[macro_export]
macro_rules! debug {
    ($($args:tt)+) => { $crate::__emit!(debug, $($args)+) };
}

/// Emit an info record through the shared logger
#[macro_export]
macro_rules! info {
    ($($args:tt)+) => { $crate::__emit!(info, $($args)+) };
}

/// Emit a warn record through the shared logger
#[macro_export]
macro_rules! warn {
    ($($args:tt)+) => { $crate::__emit!(warn, $($args)+) };
}

/// Emit an error record through the shared logger
#[macro_export]
macro_rules! error {
    ($($args:tt)+) => { $crate::__emit!(error, $($args)+) };
}

/// Emit a fatal record through the shared logger, then terminate
#[macro_export]
macro_rules! fatal {
    ($($args:tt)+) => { $crate::__emit!(fatal, $($args)+) };
}
