//! Block-device bridge between a littlefs-style flash filesystem engine and
//! its storage backends.
//!
//! The engine needs four synchronous operations from a device: `read`,
//! `program`, `erase` and `sync`. Backends implement them once through the
//! [`Storage`] trait; [`bridge`] forwards the engine's calls to the backend
//! bound as the device context and returns the backend's status as a signed
//! result code, untouched. [`raw`] exposes the same forwarding as a C-ABI
//! callback table for engines configured through an `lfs_config`-like struct.
//!
//! Backends shipped here:
//! - [`RamStorage`]: NOR flash emulated in memory.
//! - [`FileStorage`]: NOR flash emulated by a host file (`std` feature).
//! - [`FlashStorage`]: adapter for any byte-addressed [`Flash`].

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

pub mod bridge;
pub mod config;
pub mod error;
#[cfg(feature = "std")]
pub mod file;
pub mod flash;
pub mod ram;
pub mod raw;
pub mod storage;

#[cfg(test)]
mod tests_util;

pub use bridge::Bridge;
pub use config::{Config, Device, Geometry, Options};
pub use error::{Error, ErrorKind, Result, ResultCode};
#[cfg(feature = "std")]
pub use file::{FileFlash, FileFlashConfig, FileStorage};
pub use flash::{Flash, FlashStorage};
pub use ram::{RamFlash, RamStorage};
pub use raw::RawConfig;
pub use storage::{Block, Off, Size, Storage};
