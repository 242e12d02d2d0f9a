use alloc::vec;
use alloc::vec::Vec;

use crate::error::{Error, Result};
use crate::flash::{can_program, Flash, FlashStorage};
use log::{trace, warn};

pub const DEFAULT_ERASED_VALUE: u8 = 0xFF;

/// Block storage held entirely in memory.
pub type RamStorage = FlashStorage<RamFlash>;

/// NOR-style flash emulated in RAM.
///
/// Programs may only move bits away from the erased value; anything else is
/// refused as a whole with [`Error::NOT_ERASED`].
#[derive(Clone)]
pub struct RamFlash {
    data: Vec<u8>,
    erase_block_bytes: u32,
    erased_value: u8,
}

impl RamFlash {
    /// A fully erased device of `size_bytes`.
    pub fn new(erase_block_bytes: u32, size_bytes: u32) -> Self {
        RamFlash {
            data: vec![DEFAULT_ERASED_VALUE; size_bytes as usize],
            erase_block_bytes,
            erased_value: DEFAULT_ERASED_VALUE,
        }
    }

    /// Switch the erased pattern; the whole device is erased to it.
    pub fn with_erased_value(mut self, erased_value: u8) -> Self {
        self.erased_value = erased_value;
        self.data.fill(erased_value);
        self
    }

    pub fn erased_value(&self) -> u8 {
        self.erased_value
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl Flash for RamFlash {
    fn size_bytes(&self) -> u32 {
        self.data.len() as u32
    }

    fn erase_block_bytes(&self) -> u32 {
        self.erase_block_bytes
    }

    fn read_at(&mut self, off: u32, data: &mut [u8]) -> Result<usize> {
        let off = off as usize;
        if off >= self.data.len() {
            return Err(Error::INVALID);
        }
        let n = core::cmp::min(data.len(), self.data.len() - off);
        data[..n].copy_from_slice(&self.data[off..off + n]);
        Ok(n)
    }

    fn write_at(&mut self, off: u32, data: &[u8]) -> Result<usize> {
        let off = off as usize;
        if off >= self.data.len() {
            return Err(Error::INVALID);
        }
        let n = core::cmp::min(data.len(), self.data.len() - off);
        let target = &mut self.data[off..off + n];
        let erased = self.erased_value;
        if !target
            .iter()
            .zip(&data[..n])
            .all(|(stored, new)| can_program(erased, *stored, *new))
        {
            warn!("ram flash write at 0x{:x} requires erase", off);
            return Err(Error::NOT_ERASED);
        }
        target.copy_from_slice(&data[..n]);
        Ok(n)
    }

    fn erase(&mut self, off: u32, len: u32) -> Result<()> {
        if len == 0 {
            return Ok(());
        }
        let block = self.erase_block_bytes;
        if block == 0 || off % block != 0 || len % block != 0 {
            return Err(Error::INVALID);
        }
        let (off, len) = (off as usize, len as usize);
        if off >= self.data.len() || len > self.data.len() - off {
            return Err(Error::INVALID);
        }
        trace!("ram flash erase 0x{:x} len: {}", off, len);
        self.data[off..off + len].fill(self.erased_value);
        Ok(())
    }
}
