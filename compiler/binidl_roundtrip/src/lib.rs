//! Codecs generated at build time from `schema.rs`, compiled as ordinary
//! Rust and exercised by the tests in `tests/`.
//!
//! The same schema is generated three times:
//!
//! - [`le`]: little-endian, default static threshold, pools on
//! - [`be`]: big-endian, otherwise the same
//! - [`stream`]: little-endian with every record forced onto the streaming
//!   strategy, pools off

pub mod stamp;

#[allow(clippy::all, clippy::pedantic, reason = "generated code")]
pub mod le {
    include!(concat!(env!("OUT_DIR"), "/le.rs"));
}

#[allow(clippy::all, clippy::pedantic, reason = "generated code")]
pub mod be {
    include!(concat!(env!("OUT_DIR"), "/be.rs"));
}

#[allow(clippy::all, clippy::pedantic, reason = "generated code")]
pub mod stream {
    include!(concat!(env!("OUT_DIR"), "/stream.rs"));
}
