//! Block storage on top of byte-addressed flash.

use crate::config::Geometry;
use crate::error::{Error, Result};
use crate::storage::{Block, Off, Storage};
use log::{debug, error, warn};

/// Raw access to non-volatile memory: byte addresses and erase blocks only.
pub trait Flash {
    fn size_bytes(&self) -> u32;

    fn erase_block_bytes(&self) -> u32;

    /// Read into `data` starting at `off`, returning how many bytes were read.
    fn read_at(&mut self, off: u32, data: &mut [u8]) -> Result<usize>;

    /// Write `data` starting at `off`, returning how many bytes were written.
    fn write_at(&mut self, off: u32, data: &[u8]) -> Result<usize>;

    /// Erase `len` bytes at `off`; both must be erase-block aligned.
    fn erase(&mut self, off: u32, len: u32) -> Result<()>;

    /// Push buffered writes to the medium.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// True when `data` can be programmed over `stored` on a medium whose erased
/// state is `erased`: every bit may only move away from its erased value.
pub(crate) fn can_program(erased: u8, stored: u8, data: u8) -> bool {
    let raised = data & !stored & erased;
    let lowered = stored & !data & !erased;
    (raised | lowered) == 0
}

/// Adapts a [`Flash`] to the block interface, translating block/offset pairs
/// into flash addresses.
#[derive(Clone)]
pub struct FlashStorage<F: Flash> {
    flash: F,
}

impl<F: Flash> FlashStorage<F> {
    pub fn new(flash: F) -> Self {
        debug!(
            "flash storage size: {} erase block: {}",
            flash.size_bytes(),
            flash.erase_block_bytes()
        );
        FlashStorage { flash }
    }

    /// Block geometry implied by the flash: one filesystem block per erase block.
    pub fn geometry(&self) -> Geometry {
        let block_size = self.flash.erase_block_bytes();
        let block_count = match block_size {
            0 => 0,
            n => self.flash.size_bytes() / n,
        };
        Geometry::new(block_size, block_count)
    }

    pub fn flash(&self) -> &F {
        &self.flash
    }

    pub fn flash_mut(&mut self) -> &mut F {
        &mut self.flash
    }

    pub fn into_inner(self) -> F {
        self.flash
    }

    fn block_addr(&self, block: Block, off: Off, size: usize) -> Result<u32> {
        let block_size = self.flash.erase_block_bytes();
        if block_size == 0 {
            return Err(Error::INVALID);
        }
        let addr = block as u64 * block_size as u64 + off as u64;
        let end = addr + size as u64;
        if addr > u32::MAX as u64 || end > u32::MAX as u64 {
            return Err(Error::INVALID);
        }
        if end > self.flash.size_bytes() as u64 {
            warn!(
                "flash access past end block: {} off: {} len: {}",
                block, off, size
            );
            return Err(Error::INVALID);
        }
        Ok(addr as u32)
    }
}

impl<F: Flash> Storage for FlashStorage<F> {
    fn read(&mut self, block: Block, off: Off, buffer: &mut [u8]) -> Result<()> {
        if buffer.is_empty() {
            return Ok(());
        }
        let addr = self.block_addr(block, off, buffer.len())?;
        let n = self.flash.read_at(addr, buffer)?;
        if n != buffer.len() {
            error!("short flash read at 0x{:x}: {} of {}", addr, n, buffer.len());
            return Err(Error::IO);
        }
        Ok(())
    }

    fn program(&mut self, block: Block, off: Off, buffer: &[u8]) -> Result<()> {
        if buffer.is_empty() {
            return Ok(());
        }
        let addr = self.block_addr(block, off, buffer.len())?;
        let n = self.flash.write_at(addr, buffer)?;
        if n != buffer.len() {
            error!("short flash write at 0x{:x}: {} of {}", addr, n, buffer.len());
            return Err(Error::IO);
        }
        Ok(())
    }

    fn erase(&mut self, block: Block) -> Result<()> {
        let block_size = self.flash.erase_block_bytes();
        if block_size == 0 {
            return Err(Error::INVALID);
        }
        let addr = block as u64 * block_size as u64;
        if addr > u32::MAX as u64 {
            return Err(Error::INVALID);
        }
        self.flash.erase(addr as u32, block_size)
    }

    fn sync(&mut self) -> Result<()> {
        self.flash.flush()
    }
}
