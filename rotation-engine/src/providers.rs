// Local filesystem facts consumed by the validators
use std::path::Path;

/// Answers whether a configured path exists on the invoking host.
pub trait PathChecker {
    /// `false` for the empty path; never an error.
    fn exists(&self, path: &str) -> bool;
}

/// `PathChecker` backed by the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalPathChecker;

impl PathChecker for LocalPathChecker {
    fn exists(&self, path: &str) -> bool {
        !path.is_empty() && Path::new(path).exists()
    }
}

impl<P: PathChecker + ?Sized> PathChecker for &P {
    fn exists(&self, path: &str) -> bool {
        (**self).exists(path)
    }
}
