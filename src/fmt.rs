//! Logging shims.
//!
//! On target these forward to `defmt`. Host tests have no global logger, so the
//! macros only borrow their arguments there.

#![allow(unused_macros)]

macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(not(test))]
            ::defmt::debug!($s $(, $x)*);
            #[cfg(test)]
            let _ = ($( & $x ),*);
        }
    };
}

macro_rules! info {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(not(test))]
            ::defmt::info!($s $(, $x)*);
            #[cfg(test)]
            let _ = ($( & $x ),*);
        }
    };
}

macro_rules! warn {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(not(test))]
            ::defmt::warn!($s $(, $x)*);
            #[cfg(test)]
            let _ = ($( & $x ),*);
        }
    };
}
