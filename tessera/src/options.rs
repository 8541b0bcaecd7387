//! Per-call options.

use alloc::string::String;
use alloc::vec::Vec;

/// Depth limit used when neither the engine nor the call sets one.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Options for one serialize call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Active scopes. Empty means every non-excluded field is written.
    pub scopes: Vec<String>,
    /// Overrides the engine's depth limit.
    pub max_depth: Option<usize>,
}

impl SerializeOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an active scope.
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scopes.push(scope.into());
        self
    }

    /// Adds several active scopes.
    pub fn scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes.extend(scopes.into_iter().map(Into::into));
        self
    }

    /// Sets the depth limit for this call.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }
}

/// Options for one deserialize call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeserializeOptions {
    /// Active scopes. Fields outside them are treated as absent.
    pub scopes: Vec<String>,
    /// Overrides the engine's depth limit.
    pub max_depth: Option<usize>,
}

impl DeserializeOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an active scope.
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scopes.push(scope.into());
        self
    }

    /// Adds several active scopes.
    pub fn scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes.extend(scopes.into_iter().map(Into::into));
        self
    }

    /// Sets the depth limit for this call.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }
}
