use crate::error::Result;

/// Index of one erase unit on the device.
pub type Block = u32;

/// Byte offset inside a block.
pub type Off = u32;

/// Length in bytes of a transfer or a device dimension.
pub type Size = u32;

/// The four operations a flash filesystem engine needs from a block device.
///
/// Implementors own all range checking: an access outside the device must be
/// reported as an error, never satisfied silently. Buffers are only borrowed
/// for the duration of the call.
pub trait Storage {
    /// Fill `buffer` with the bytes at `block[off..off + buffer.len()]`.
    ///
    /// On error the contents of `buffer` are unspecified.
    fn read(&mut self, block: Block, off: Off, buffer: &mut [u8]) -> Result<()>;

    /// Write `buffer` to `block[off..off + buffer.len()]`.
    ///
    /// The region must have been erased since it was last programmed. An error
    /// means the write must be treated as not applied.
    fn program(&mut self, block: Block, off: Off, buffer: &[u8]) -> Result<()>;

    /// Reset the whole block to the erased state.
    fn erase(&mut self, block: Block) -> Result<()>;

    /// Make every previously issued program and erase durable.
    fn sync(&mut self) -> Result<()>;
}

impl<S: Storage + ?Sized> Storage for &mut S {
    fn read(&mut self, block: Block, off: Off, buffer: &mut [u8]) -> Result<()> {
        (**self).read(block, off, buffer)
    }

    fn program(&mut self, block: Block, off: Off, buffer: &[u8]) -> Result<()> {
        (**self).program(block, off, buffer)
    }

    fn erase(&mut self, block: Block) -> Result<()> {
        (**self).erase(block)
    }

    fn sync(&mut self) -> Result<()> {
        (**self).sync()
    }
}
