use crate::handle::HandleId;
use crate::node::FileType;
use thiserror::Error;

pub type FsResult<T> = Result<T, FsError>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FsError {
    #[error("no such file or directory: {0}")]
    NotFound(String),
    #[error("not a directory: {0}")]
    NotADirectory(String),
    #[error("wrong file type: expected {expected}, found {found}")]
    WrongType { expected: FileType, found: FileType },
    #[error("file exists: {0}")]
    AlreadyExists(String),
    #[error("no file descriptors available (capacity {0})")]
    NoDescriptorsAvailable(usize),
    #[error("unknown file handle: {0}")]
    UnknownHandle(HandleId),
    #[error("no file handles available")]
    NoHandlesAvailable,
    #[error("offset is bigger than file size: [offset = {offset}, filesize = {size}]")]
    OffsetOutOfRange { offset: usize, size: usize },
    #[error("too many levels of symbolic links: {0}")]
    SymlinkLoop(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("file system is already initialized")]
    AlreadyInitialized,
    #[error("file system is not initialized")]
    NotInitialized,
}

impl FsError {
    /// Lifecycle misuse leaves no usable file system behind, callers should stop
    /// issuing commands once one of these is returned.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FsError::AlreadyInitialized | FsError::NotInitialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_lifecycle_errors_are_fatal() {
        assert!(FsError::AlreadyInitialized.is_fatal());
        assert!(FsError::NotInitialized.is_fatal());
        assert!(!FsError::NotFound("a".to_string()).is_fatal());
        assert!(!FsError::UnknownHandle(3).is_fatal());
    }

    #[test]
    fn offset_error_reports_both_values() {
        let err = FsError::OffsetOutOfRange { offset: 70, size: 64 };
        assert_eq!(
            err.to_string(),
            "offset is bigger than file size: [offset = 70, filesize = 64]"
        );
    }
}
