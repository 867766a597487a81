//! Core of odbc-cover, a thin session/statement cover over ODBC.
//! Not intended to be used directly.
#![warn(future_incompatible, rust_2018_idioms)]
#![allow(clippy::needless_doctest_main, clippy::len_without_is_empty)]
//
// Positioned fetches talk to the driver manager directly. That unsafe code is
// contained to the ODBC bridge.
#![deny(unsafe_code)]

#[macro_use]
pub mod error;

mod logger;

pub mod odbc;

pub use error::{Error, Result};
