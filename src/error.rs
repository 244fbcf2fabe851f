use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds {
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// # Error Categories
///
/// ## Class File Parsing Errors
/// - [`Error::Malformed`] - Corrupted or invalid class file structure
/// - [`Error::OutOfBounds`] - Attempted to read beyond the end of the buffer
/// - [`Error::InvalidMagic`] - The buffer does not start with `0xCAFEBABE`
/// - [`Error::UnsupportedVersion`] - Class file version newer than the reader understands
/// - [`Error::InvalidDescriptor`] - A field or method descriptor could not be decoded
/// - [`Error::Empty`] - Empty input provided
///
/// ## Resolution Errors
/// - [`Error::UnresolvableReference`] - A named type could not be obtained from its scope
/// - [`Error::CyclicHierarchy`] - A supertype chain loops back on itself
/// - [`Error::RecursionLimit`] - A hierarchy walk exceeded the configured depth
/// - [`Error::ScopeGone`] - The resolution scope was dropped or unregistered
///
/// # Examples
///
/// ```rust
/// use classscope::{Error, ClassReader};
///
/// match ClassReader::new(&[0xCA, 0xFE]) {
///     Err(Error::OutOfBounds { .. }) => {}
///     Err(Error::Malformed { message, .. }) => eprintln!("Malformed: {message}"),
///     other => panic!("unexpected: {:?}", other.map(|_| ())),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The class file is damaged and could not be parsed.
    ///
    /// The error includes the source location where the malformation was detected.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing the class file.
    #[error("Out of Bound read would have occurred - {file}:{line}")]
    OutOfBounds {
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// The buffer does not carry the class file magic number.
    #[error("Invalid class file magic: 0x{0:08X}")]
    InvalidMagic(u32),

    /// The class file major version is newer than this reader supports.
    #[error("Unsupported class file version {major}.{minor}")]
    UnsupportedVersion {
        /// Major version found in the header
        major: u16,
        /// Minor version found in the header
        minor: u16,
    },

    /// A field or method descriptor could not be decoded.
    #[error("Invalid descriptor - {0}")]
    InvalidDescriptor(String),

    /// A named type could not be obtained from its resolution scope.
    ///
    /// Only surfaced when placeholder substitution is disabled, see
    /// [`crate::RepositoryConfig::strict`].
    #[error("Could not resolve class [{name}] in loader [{loader}]")]
    UnresolvableReference {
        /// The dot-normalized name of the missing type
        name: String,
        /// Diagnostic identity of the scope that was asked
        loader: String,
    },

    /// A supertype chain loops back to a type that was already visited.
    #[error("Cyclic type hierarchy detected at {0}")]
    CyclicHierarchy(String),

    /// A hierarchy walk went deeper than allowed.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// The resolution scope backing a lookup no longer exists.
    #[error("The resolution scope has been dropped or unregistered")]
    ScopeGone,

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),
}
