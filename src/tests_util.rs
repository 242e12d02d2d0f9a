//! Fakes and helpers shared by the unit tests.

use crate::error::{Error, Result};
use crate::flash::FlashStorage;
use crate::ram::{RamFlash, RamStorage};
use crate::storage::{Block, Off, Storage};
use log::info;

pub(crate) fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// An erased RAM device with `block_count` blocks of `block_size` bytes.
pub(crate) fn ram_storage(block_size: u32, block_count: u32) -> RamStorage {
    FlashStorage::new(RamFlash::new(block_size, block_size * block_count))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Call {
    Read(Block, Off, usize),
    Program(Block, Off, usize),
    Erase(Block),
    Sync,
}

/// Records every call in arrival order and notes if one starts before the
/// previous one returned.
pub(crate) struct RecordingStorage<S: Storage> {
    inner: S,
    calls: Vec<Call>,
    in_flight: bool,
    overlapped: bool,
}

impl<S: Storage> RecordingStorage<S> {
    pub(crate) fn new(inner: S) -> Self {
        RecordingStorage {
            inner,
            calls: Vec::new(),
            in_flight: false,
            overlapped: false,
        }
    }

    pub(crate) fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub(crate) fn overlapped(&self) -> bool {
        self.overlapped
    }

    fn record<T>(&mut self, call: Call, op: impl FnOnce(&mut S) -> T) -> T {
        if self.in_flight {
            self.overlapped = true;
        }
        self.in_flight = true;
        self.calls.push(call);
        let result = op(&mut self.inner);
        self.in_flight = false;
        result
    }
}

impl<S: Storage> Storage for RecordingStorage<S> {
    fn read(&mut self, block: Block, off: Off, buffer: &mut [u8]) -> Result<()> {
        let call = Call::Read(block, off, buffer.len());
        self.record(call, |s| s.read(block, off, buffer))
    }

    fn program(&mut self, block: Block, off: Off, buffer: &[u8]) -> Result<()> {
        let call = Call::Program(block, off, buffer.len());
        self.record(call, |s| s.program(block, off, buffer))
    }

    fn erase(&mut self, block: Block) -> Result<()> {
        self.record(Call::Erase(block), |s| s.erase(block))
    }

    fn sync(&mut self) -> Result<()> {
        self.record(Call::Sync, |s| s.sync())
    }
}

/// Fails every operation with the same code.
pub(crate) struct FailingStorage(pub(crate) Error);

impl Storage for FailingStorage {
    fn read(&mut self, _block: Block, _off: Off, _buffer: &mut [u8]) -> Result<()> {
        Err(self.0)
    }

    fn program(&mut self, _block: Block, _off: Off, _buffer: &[u8]) -> Result<()> {
        Err(self.0)
    }

    fn erase(&mut self, _block: Block) -> Result<()> {
        Err(self.0)
    }

    fn sync(&mut self) -> Result<()> {
        Err(self.0)
    }
}

/// RAM device with a volatile write-back cache: programs and erases become
/// durable only at `sync`, and `power_loss` throws away everything since.
pub(crate) struct PowerLossStorage {
    live: RamStorage,
    durable: RamStorage,
}

impl PowerLossStorage {
    pub(crate) fn new(storage: RamStorage) -> Self {
        PowerLossStorage {
            durable: storage.clone(),
            live: storage,
        }
    }

    pub(crate) fn power_loss(&mut self) {
        info!("simulated power loss");
        self.live = self.durable.clone();
    }
}

impl Storage for PowerLossStorage {
    fn read(&mut self, block: Block, off: Off, buffer: &mut [u8]) -> Result<()> {
        self.live.read(block, off, buffer)
    }

    fn program(&mut self, block: Block, off: Off, buffer: &[u8]) -> Result<()> {
        self.live.program(block, off, buffer)
    }

    fn erase(&mut self, block: Block) -> Result<()> {
        self.live.erase(block)
    }

    fn sync(&mut self) -> Result<()> {
        self.live.sync()?;
        self.durable = self.live.clone();
        Ok(())
    }
}
