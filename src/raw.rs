//! C-ABI callback table for engines that take an `lfs_config`-shaped struct.
//!
//! [`RawConfig::bind`] stores a type-erased pointer to the backend in `context`
//! and installs trampolines monomorphized for that backend type. Each
//! trampoline recovers the backend from `context`, wraps the engine's
//! pointer/length pair in a slice that lives only for the call, and forwards
//! through [`crate::bridge`].

use core::ffi::{c_int, c_void};
use core::ptr;

use crate::bridge;
use crate::config::Config;
use crate::error::Error;
use crate::storage::{Block, Off, Size, Storage};

pub type ReadFn = unsafe extern "C" fn(
    c: *const RawConfig,
    block: Block,
    off: Off,
    buffer: *mut c_void,
    size: Size,
) -> c_int;
pub type ProgFn = unsafe extern "C" fn(
    c: *const RawConfig,
    block: Block,
    off: Off,
    buffer: *const c_void,
    size: Size,
) -> c_int;
pub type EraseFn = unsafe extern "C" fn(c: *const RawConfig, block: Block) -> c_int;
pub type SyncFn = unsafe extern "C" fn(c: *const RawConfig) -> c_int;

#[repr(C)]
#[derive(Debug)]
pub struct RawConfig {
    /// Opaque device handle handed back to every callback.
    pub context: *mut c_void,
    pub read: Option<ReadFn>,
    pub prog: Option<ProgFn>,
    pub erase: Option<EraseFn>,
    pub sync: Option<SyncFn>,
    pub read_size: Size,
    pub prog_size: Size,
    pub block_size: Size,
    pub block_count: Size,
    pub block_cycles: i32,
    pub cache_size: Size,
    pub lookahead_size: Size,
}

impl RawConfig {
    /// Bind `storage` as the context of a new callback table.
    ///
    /// The table holds a raw pointer to `storage`: the backend must stay in
    /// place and outlive every callback made through the returned config, and
    /// must not be touched through other paths while the engine runs.
    pub fn bind<S: Storage>(storage: &mut S, config: &Config) -> Self {
        RawConfig {
            context: storage as *mut S as *mut c_void,
            read: Some(read_trampoline::<S>),
            prog: Some(prog_trampoline::<S>),
            erase: Some(erase_trampoline::<S>),
            sync: Some(sync_trampoline::<S>),
            read_size: config.read_size,
            prog_size: config.prog_size,
            block_size: config.geometry.block_size,
            block_count: config.geometry.block_count,
            block_cycles: config.block_cycles,
            cache_size: config.cache_size,
            lookahead_size: config.lookahead_size,
        }
    }

    /// Detach the context; further callbacks fail with [`Error::IO`].
    pub fn unbind(&mut self) {
        self.context = ptr::null_mut();
    }
}

/// Recover the backend bound to `c`.
///
/// Safety: a non-null `context` must have been produced by `bind::<S>` and the
/// backend must still be alive and not otherwise borrowed.
unsafe fn context<'a, S: Storage>(c: *const RawConfig) -> Option<&'a mut S> {
    if c.is_null() {
        return None;
    }
    let ctx = (*c).context;
    if ctx.is_null() {
        None
    } else {
        Some(&mut *(ctx as *mut S))
    }
}

unsafe extern "C" fn read_trampoline<S: Storage>(
    c: *const RawConfig,
    block: Block,
    off: Off,
    buffer: *mut c_void,
    size: Size,
) -> c_int {
    let Some(storage) = context::<S>(c) else {
        return Error::IO.code();
    };
    if size == 0 {
        return bridge::read(storage, block, off, &mut []);
    }
    if buffer.is_null() {
        return Error::INVALID.code();
    }
    let buffer = core::slice::from_raw_parts_mut(buffer as *mut u8, size as usize);
    bridge::read(storage, block, off, buffer)
}

unsafe extern "C" fn prog_trampoline<S: Storage>(
    c: *const RawConfig,
    block: Block,
    off: Off,
    buffer: *const c_void,
    size: Size,
) -> c_int {
    let Some(storage) = context::<S>(c) else {
        return Error::IO.code();
    };
    if size == 0 {
        return bridge::program(storage, block, off, &[]);
    }
    if buffer.is_null() {
        return Error::INVALID.code();
    }
    let buffer = core::slice::from_raw_parts(buffer as *const u8, size as usize);
    bridge::program(storage, block, off, buffer)
}

unsafe extern "C" fn erase_trampoline<S: Storage>(c: *const RawConfig, block: Block) -> c_int {
    match context::<S>(c) {
        Some(storage) => bridge::erase(storage, block),
        None => Error::IO.code(),
    }
}

unsafe extern "C" fn sync_trampoline<S: Storage>(c: *const RawConfig) -> c_int {
    match context::<S>(c) {
        Some(storage) => bridge::sync(storage),
        None => Error::IO.code(),
    }
}
