// `slog!(level, ...)` forwards to `tracing::<level>!` under the "sliver" target when the
// `tracing` feature is on, and expands to nothing otherwise.

#[cfg(feature = "tracing")]
macro_rules! slog {
    ($level:ident, $($tt:tt)*) => {
        tracing::$level!(target: "sliver", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! slog {
    ($level:ident, $($tt:tt)*) => {};
}
