// Same shape as the core crate's logging shim, under the "sliver_dom" target.

#[cfg(feature = "tracing")]
macro_rules! dlog {
    ($level:ident, $($tt:tt)*) => {
        tracing::$level!(target: "sliver_dom", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! dlog {
    ($level:ident, $($tt:tt)*) => {};
}
