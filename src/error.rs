//! Error types.

use thiserror::Error;

/// Errors surfaced while building context or mounting a tree.
///
/// Nothing in this crate catches these: they bubble straight to the test.
#[derive(Debug, Error)]
pub enum Error {
    /// The ambient context shape was neither passed explicitly nor declared
    /// by the root element handed back from the watcher's builder.
    #[error(
        "ambient context shape unknown: render a provider that declares a ContextShape \
         or pass one explicitly when creating the ContextWatcher"
    )]
    ContextShapeUnknown,

    #[error("a provider element must be passed, got `{0}`")]
    NotAProvider(String),

    /// Raised by a plugin body. The pipeline returns it untouched.
    #[error("plugin failed: {0}")]
    Plugin(String),
}

impl Error {
    pub fn plugin(message: impl Into<String>) -> Self {
        Error::Plugin(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
