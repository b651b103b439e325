//! Diagnostics shim.
//!
//! With the `log` feature the macros forward to the `log` crate; without it
//! they expand to nothing and their arguments are never evaluated.
//!
//! The macros are defined under `__` names and re-exported, since a plain
//! `warn` re-export clashes with the built-in `#[warn]` attribute.

#[cfg(feature = "log")]
macro_rules! __trace {
    ($($arg:tt)+) => { ::log::trace!(target: "zenbmp", $($arg)+) };
}

#[cfg(not(feature = "log"))]
macro_rules! __trace {
    ($($arg:tt)+) => {};
}

#[cfg(feature = "log")]
macro_rules! __debug {
    ($($arg:tt)+) => { ::log::debug!(target: "zenbmp", $($arg)+) };
}

#[cfg(not(feature = "log"))]
macro_rules! __debug {
    ($($arg:tt)+) => {};
}

#[cfg(feature = "log")]
macro_rules! __warn {
    ($($arg:tt)+) => { ::log::warn!(target: "zenbmp", $($arg)+) };
}

#[cfg(not(feature = "log"))]
macro_rules! __warn {
    ($($arg:tt)+) => {};
}

pub(crate) use {__debug as debug, __trace as trace, __warn as warn};
