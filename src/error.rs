use core::fmt;

/// Signed status returned across the bridge: zero on success, negative on error.
pub type ResultCode = i32;

pub type Result<T> = core::result::Result<T, Error>;

/// A negative result code reported by a storage backend.
///
/// The named constants follow the littlefs error numbering so that an engine
/// can classify them without knowing which backend produced them. Backends are
/// free to report other negative codes through [`Error::new`]; those travel
/// through the bridge untouched.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Error(i32);

impl Error {
    pub const IO: Error = Error(-5);
    pub const CORRUPT: Error = Error(-84);
    pub const NO_ENTRY: Error = Error(-2);
    pub const EXISTS: Error = Error(-17);
    pub const NOT_DIR: Error = Error(-20);
    pub const IS_DIR: Error = Error(-21);
    pub const NOT_EMPTY: Error = Error(-39);
    pub const INVALID: Error = Error(-22);
    pub const NO_SPACE: Error = Error(-28);
    pub const NO_MEMORY: Error = Error(-12);
    /// Program attempted on a region that is not in its erased state.
    pub const NOT_ERASED: Error = Error(-1001);

    /// Wrap a backend-specific code. Returns `None` for codes that do not
    /// denote an error (zero or positive).
    pub const fn new(code: i32) -> Option<Error> {
        if code < 0 {
            Some(Error(code))
        } else {
            None
        }
    }

    pub const fn code(self) -> ResultCode {
        self.0
    }

    pub fn kind(self) -> ErrorKind {
        match self {
            Error::IO => ErrorKind::Io,
            Error::CORRUPT => ErrorKind::Corrupt,
            Error::INVALID => ErrorKind::OutOfBounds,
            Error::NOT_ERASED => ErrorKind::NotErased,
            Error::NO_ENTRY => ErrorKind::NoEntry,
            Error::NO_SPACE => ErrorKind::OutOfSpace,
            other => ErrorKind::Other(other.0),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ErrorKind::Other(code) => write!(f, "storage error (code {})", code),
            kind => write!(f, "{:?} (code {})", kind, self.0),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The medium could not complete the operation.
    Io,
    /// Block or offset+size outside the device.
    OutOfBounds,
    NotErased,
    Corrupt,
    NoEntry,
    OutOfSpace,
    Other(i32),
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Io => Error::IO,
            ErrorKind::OutOfBounds => Error::INVALID,
            ErrorKind::NotErased => Error::NOT_ERASED,
            ErrorKind::Corrupt => Error::CORRUPT,
            ErrorKind::NoEntry => Error::NO_ENTRY,
            ErrorKind::OutOfSpace => Error::NO_SPACE,
            ErrorKind::Other(code) => Error::new(code).unwrap_or(Error::IO),
        }
    }
}

/// Collapse a backend result into the code handed back to the engine.
pub fn result_code(result: Result<()>) -> ResultCode {
    match result {
        Ok(()) => 0,
        Err(e) => e.code(),
    }
}
