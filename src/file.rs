//! Flash emulated by a regular file on the host.

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::flash::{can_program, Flash, FlashStorage};
use log::{debug, error, info, warn};

pub const FLASH_PATH_ENV: &str = "LFS_FLASH_PATH";
pub const DEFAULT_FLASH_PATH: &str = "flash.img";
pub const DEFAULT_SIZE_BYTES: u32 = 2 * 1024 * 1024;
pub const DEFAULT_ERASE_BLOCK_BYTES: u32 = 4096;

const ERASED_VALUE: u8 = 0xFF;

/// Block storage backed by a host file.
pub type FileStorage = FlashStorage<FileFlash>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileFlashConfig {
    pub path: PathBuf,
    /// Size given to a new image. An existing non-empty image keeps its size.
    pub size_bytes: u32,
    pub erase_block_bytes: u32,
}

impl Default for FileFlashConfig {
    fn default() -> Self {
        FileFlashConfig {
            path: PathBuf::from(DEFAULT_FLASH_PATH),
            size_bytes: DEFAULT_SIZE_BYTES,
            erase_block_bytes: DEFAULT_ERASE_BLOCK_BYTES,
        }
    }
}

impl FileFlashConfig {
    pub fn new(path: impl AsRef<Path>) -> Self {
        FileFlashConfig {
            path: path.as_ref().into(),
            ..Self::default()
        }
    }

    /// Defaults, with the image path taken from `LFS_FLASH_PATH` when set.
    pub fn from_env() -> Self {
        Self::from_path_var(std::env::var_os(FLASH_PATH_ENV))
    }

    fn from_path_var(path: Option<OsString>) -> Self {
        match path {
            Some(path) if !path.is_empty() => Self::new(path),
            _ => Self::default(),
        }
    }
}

pub struct FileFlash {
    file: File,
    size: u32,
    erase_block_bytes: u32,
}

impl FileFlash {
    pub fn open(config: &FileFlashConfig) -> io::Result<Self> {
        if config.erase_block_bytes == 0 || config.size_bytes % config.erase_block_bytes != 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "flash size must be a non-zero multiple of the erase block",
            ));
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&config.path)?;

        let len = file.metadata()?.len();
        let size = if len > 0 {
            let size = u32::try_from(len).map_err(|_| {
                io::Error::new(io::ErrorKind::InvalidData, "flash image larger than 4 GiB")
            })?;
            if size % config.erase_block_bytes != 0 {
                error!(
                    "flash image size not multiple of erase block size: {} % {}",
                    size, config.erase_block_bytes
                );
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "flash image size must be a multiple of the erase block",
                ));
            }
            info!("using existing flash image: {:?} ({} bytes)", config.path, size);
            size
        } else {
            let erased = vec![ERASED_VALUE; config.erase_block_bytes as usize];
            for _ in 0..(config.size_bytes / config.erase_block_bytes) {
                file.write_all(&erased)?;
            }
            file.flush()?;
            info!(
                "created flash image: {:?} ({} bytes)",
                config.path, config.size_bytes
            );
            config.size_bytes
        };

        Ok(FileFlash {
            file,
            size,
            erase_block_bytes: config.erase_block_bytes,
        })
    }

    fn read_exact_at(&mut self, off: u32, data: &mut [u8]) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(off as u64))?;
        self.file.read_exact(data)
    }

    fn write_all_at(&mut self, off: u32, data: &[u8]) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(off as u64))?;
        self.file.write_all(data)
    }
}

fn io_error(op: &str, off: u32, err: io::Error) -> Error {
    error!("flash {} at 0x{:x}: {}", op, off, err);
    Error::IO
}

impl Flash for FileFlash {
    fn size_bytes(&self) -> u32 {
        self.size
    }

    fn erase_block_bytes(&self) -> u32 {
        self.erase_block_bytes
    }

    fn read_at(&mut self, off: u32, data: &mut [u8]) -> Result<usize> {
        if off >= self.size {
            return Err(Error::INVALID);
        }
        let n = core::cmp::min(data.len(), (self.size - off) as usize);
        self.read_exact_at(off, &mut data[..n])
            .map_err(|e| io_error("read", off, e))?;
        Ok(n)
    }

    fn write_at(&mut self, off: u32, data: &[u8]) -> Result<usize> {
        if off >= self.size {
            return Err(Error::INVALID);
        }
        let n = core::cmp::min(data.len(), (self.size - off) as usize);
        let data = &data[..n];

        let mut stored = vec![0u8; n];
        self.read_exact_at(off, &mut stored)
            .map_err(|e| io_error("read before write", off, e))?;
        if !stored
            .iter()
            .zip(data)
            .all(|(stored, new)| can_program(ERASED_VALUE, *stored, *new))
        {
            warn!("flash write at 0x{:x} requires erase", off);
            return Err(Error::NOT_ERASED);
        }

        self.write_all_at(off, data)
            .map_err(|e| io_error("write", off, e))?;
        Ok(n)
    }

    fn erase(&mut self, off: u32, len: u32) -> Result<()> {
        if len == 0 {
            return Ok(());
        }
        let block = self.erase_block_bytes;
        if off % block != 0 || len % block != 0 {
            return Err(Error::INVALID);
        }
        if off >= self.size || len > self.size - off {
            return Err(Error::INVALID);
        }

        let erased = vec![ERASED_VALUE; block as usize];
        let mut addr = off;
        while addr < off + len {
            self.write_all_at(addr, &erased)
                .map_err(|e| io_error("erase", addr, e))?;
            addr += block;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        debug!("flash sync");
        self.file
            .flush()
            .and_then(|_| self.file.sync_all())
            .map_err(|e| io_error("sync", 0, e))
    }
}
