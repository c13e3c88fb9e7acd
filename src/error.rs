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

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Note that "not found" conditions in the workspace layer (unknown identities, unresolved
/// dependency indices, missing schema entries, absent managed directories) are deliberately
/// *not* errors — those lookups return [`Option`] and degrade per the schema fallback rules.
/// This enum covers the conditions that genuinely cannot produce a result: byte-level access
/// violations, malformed record data, I/O failures and workspace misconfiguration.
///
/// # Error Categories
///
/// ## Data Access Errors
/// - [`Error::OutOfBounds`] - Attempted to read beyond a data source's boundaries
/// - [`Error::Malformed`] - Record bytes inconsistent with their resolved field layout
/// - [`Error::Empty`] - Empty input provided
///
/// ## I/O and External Errors
/// - [`Error::FileError`] - Filesystem I/O errors
///
/// ## Workspace Errors
/// - [`Error::Configuration`] - Invalid workspace construction or duplicate registration
///
/// # Examples
///
/// ```rust,no_run
/// use assetscope::{Error, file::Physical};
/// use assetscope::file::DataSource;
/// use std::path::Path;
///
/// match Physical::new(Path::new("resources.assets")) {
///     Ok(source) => println!("Mapped {} bytes", source.len()),
///     Err(Error::FileError(io_err)) => eprintln!("I/O error: {}", io_err),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// An out of bound access was attempted while reading record data.
    ///
    /// This error occurs when trying to read data beyond the end of a file
    /// or overlay buffer. It's a safety check to prevent buffer overruns
    /// during materialization.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// The record data is inconsistent with its resolved field layout.
    ///
    /// This error indicates that a record's bytes could not be parsed
    /// against the template produced by schema resolution, e.g. a string or
    /// array whose declared length exceeds the remaining record bytes. The
    /// error includes the source location where the mismatch was detected.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Provided input was empty.
    ///
    /// This error occurs when an empty buffer is provided where actual
    /// record or container data was expected.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur during file operations
    /// such as memory-mapping a container file, permission issues, or
    /// filesystem errors.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Invalid workspace configuration or usage.
    ///
    /// Returned for caller errors such as registering the same container
    /// file twice or building a workspace without a class database.
    #[error("{0}")]
    Configuration(String),

    /// Generic error for miscellaneous failures.
    ///
    /// Used for errors that don't fit into other categories or for
    /// wrapping collaborator errors with additional context.
    #[error("{0}")]
    Error(String),
}
