//! Pass-through from the filesystem engine's block callbacks to a [`Storage`].
//!
//! Every operation forwards its arguments unchanged to the backend bound as the
//! device context and hands the backend's status back as a [`ResultCode`]. No
//! validation, retry or reclassification happens here; the only conversion is
//! from `Result` to the signed code the engine expects.

use crate::error::{result_code, ResultCode};
use crate::storage::{Block, Off, Storage};
use log::trace;

pub fn read<S: Storage + ?Sized>(
    context: &mut S,
    block: Block,
    off: Off,
    buffer: &mut [u8],
) -> ResultCode {
    trace!("bridge rd block: {} off: {} len: {}", block, off, buffer.len());
    result_code(context.read(block, off, buffer))
}

pub fn program<S: Storage + ?Sized>(
    context: &mut S,
    block: Block,
    off: Off,
    buffer: &[u8],
) -> ResultCode {
    trace!("bridge wr block: {} off: {} len: {}", block, off, buffer.len());
    result_code(context.program(block, off, buffer))
}

pub fn erase<S: Storage + ?Sized>(context: &mut S, block: Block) -> ResultCode {
    trace!("bridge erase block: {}", block);
    result_code(context.erase(block))
}

pub fn sync<S: Storage + ?Sized>(context: &mut S) -> ResultCode {
    trace!("bridge sync");
    result_code(context.sync())
}

/// A device context borrowed for a run of engine operations.
///
/// Holding the exclusive borrow serializes every call made through it, which is
/// the ordering the engine's metadata log relies on.
pub struct Bridge<'a, S: Storage + ?Sized> {
    context: &'a mut S,
}

impl<'a, S: Storage + ?Sized> Bridge<'a, S> {
    pub fn new(context: &'a mut S) -> Self {
        Bridge { context }
    }

    pub fn read(&mut self, block: Block, off: Off, buffer: &mut [u8]) -> ResultCode {
        read(&mut *self.context, block, off, buffer)
    }

    pub fn program(&mut self, block: Block, off: Off, buffer: &[u8]) -> ResultCode {
        program(&mut *self.context, block, off, buffer)
    }

    pub fn erase(&mut self, block: Block) -> ResultCode {
        erase(&mut *self.context, block)
    }

    pub fn sync(&mut self) -> ResultCode {
        sync(&mut *self.context)
    }
}
