use crate::bridge::Bridge;
use crate::error::{Error, Result};
use crate::storage::{Size, Storage};
use log::{debug, error};

const DEFAULT_READ_SIZE: Size = 256;
const DEFAULT_PROG_SIZE: Size = 256;
const DEFAULT_CACHE_SIZE: Size = 256;
const MIN_LOOKAHEAD_SIZE: Size = 64;
const DEFAULT_BLOCK_CYCLES: i32 = 500;

/// Physical layout of a device as seen by the engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Geometry {
    pub block_size: Size,
    pub block_count: Size,
}

impl Geometry {
    pub const fn new(block_size: Size, block_count: Size) -> Self {
        Geometry {
            block_size,
            block_count,
        }
    }

    pub const fn total_bytes(&self) -> u64 {
        self.block_size as u64 * self.block_count as u64
    }
}

/// Engine tuning. Zero fields take their defaults when the [`Config`] is built.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub read_size: Size,
    pub prog_size: Size,
    pub cache_size: Size,
    pub lookahead_size: Size,
    pub block_cycles: i32,
}

/// Everything the engine consumes at mount time, apart from the backend itself.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub geometry: Geometry,
    pub read_size: Size,
    pub prog_size: Size,
    pub cache_size: Size,
    pub lookahead_size: Size,
    pub block_cycles: i32,
}

impl Config {
    /// Describe a device of `total_bytes` split into blocks of `block_size`.
    pub fn new(block_size: Size, total_bytes: u32, options: Options) -> Result<Self> {
        if block_size == 0 {
            error!("erase block size is zero");
            return Err(Error::INVALID);
        }
        if total_bytes % block_size != 0 {
            error!(
                "flash size not multiple of erase block size: {} % {}",
                total_bytes, block_size
            );
            return Err(Error::INVALID);
        }
        Ok(Self::from_geometry(
            Geometry::new(block_size, total_bytes / block_size),
            options,
        ))
    }

    pub fn from_geometry(geometry: Geometry, options: Options) -> Self {
        let lookahead_size = match options.lookahead_size {
            0 => core::cmp::max((geometry.block_count + 7) / 8, MIN_LOOKAHEAD_SIZE),
            n => n,
        };
        let config = Config {
            geometry,
            read_size: or_default(options.read_size, DEFAULT_READ_SIZE),
            prog_size: or_default(options.prog_size, DEFAULT_PROG_SIZE),
            cache_size: or_default(options.cache_size, DEFAULT_CACHE_SIZE),
            lookahead_size,
            block_cycles: match options.block_cycles {
                0 => DEFAULT_BLOCK_CYCLES,
                n => n,
            },
        };
        debug!("{:?}", config);
        config
    }
}

fn or_default(value: Size, default: Size) -> Size {
    if value == 0 {
        default
    } else {
        value
    }
}

/// A configured device: the configuration plus the backend that serves as its
/// context for every operation.
pub struct Device<S: Storage> {
    config: Config,
    storage: S,
}

impl<S: Storage> Device<S> {
    pub fn new(config: Config, storage: S) -> Self {
        Device { config, storage }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Borrow the context for a run of operations.
    pub fn bridge(&mut self) -> Bridge<'_, S> {
        Bridge::new(&mut self.storage)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Hand the backend back once the engine no longer uses it.
    pub fn into_inner(self) -> S {
        self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests_util::*;

    #[test]
    fn defaults_fill_zero_options() {
        let config = Config::new(4096, 2 * 1024 * 1024, Options::default()).unwrap();
        assert_eq!(config.geometry, Geometry::new(4096, 512));
        assert_eq!(config.read_size, 256);
        assert_eq!(config.prog_size, 256);
        assert_eq!(config.cache_size, 256);
        assert_eq!(config.lookahead_size, 64);
        assert_eq!(config.block_cycles, 500);
    }

    #[test]
    fn lookahead_covers_every_block() {
        let config = Config::new(256, 256 * 1001, Options::default()).unwrap();
        assert_eq!(config.lookahead_size, 126);
    }

    #[test]
    fn explicit_options_are_kept() {
        let options = Options {
            read_size: 16,
            prog_size: 32,
            cache_size: 64,
            lookahead_size: 8,
            block_cycles: -1,
        };
        let config = Config::new(256, 4096, options).unwrap();
        assert_eq!(config.read_size, 16);
        assert_eq!(config.prog_size, 32);
        assert_eq!(config.cache_size, 64);
        assert_eq!(config.lookahead_size, 8);
        assert_eq!(config.block_cycles, -1);
    }

    #[test]
    fn rejects_unusable_geometry() {
        assert_eq!(
            Config::new(0, 4096, Options::default()),
            Err(Error::INVALID)
        );
        assert_eq!(
            Config::new(4096, 4096 * 3 + 1, Options::default()),
            Err(Error::INVALID)
        );
    }

    #[test]
    fn device_outlives_bridge_runs() {
        init();
        let storage = ram_storage(256, 16);
        let config = Config::from_geometry(storage.geometry(), Options::default());
        let mut device = Device::new(config, storage);
        assert_eq!(device.config().geometry.total_bytes(), 4096);

        assert_eq!(device.bridge().erase(0), 0);
        assert_eq!(device.bridge().program(0, 0, b"lfs"), 0);
        let mut data = [0u8; 3];
        assert_eq!(device.bridge().read(0, 0, &mut data), 0);
        assert_eq!(&data, b"lfs");

        let flash = device.into_inner().into_inner();
        assert_eq!(&flash.as_bytes()[..3], b"lfs");
    }
}
