// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Call-site configuration for encode/decode.

use crate::coder::CoderRegistry;

/// Default reserved envelope key carrying the coder tag.
pub const TYPE_KEY: &str = "~#type";

/// Configuration shared by one encode/decode call (or many; it is immutable
/// once built and safe to share across threads).
///
/// The type key must match between the encode and decode of the same
/// payload. A user mapping that happens to contain the type key with an
/// unrecognized tag decodes to an inert mapping, not an error; pick a
/// different key via [`Config::with_type_key`] if that ambiguity matters.
#[derive(Debug)]
pub struct Config {
    registry: CoderRegistry,
    allow_opaque_fallback: bool,
    type_key: String,
}

impl Config {
    /// Default coder registry, opaque fallback disabled, default type key.
    pub fn new() -> Self {
        Self {
            registry: CoderRegistry::with_default_coders(),
            allow_opaque_fallback: false,
            type_key: TYPE_KEY.to_string(),
        }
    }

    /// Replace the coder registry.
    pub fn with_registry(mut self, registry: CoderRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Enable or disable the opaque fallback for unclaimed values.
    pub fn with_opaque_fallback(mut self, allow: bool) -> Self {
        self.allow_opaque_fallback = allow;
        self
    }

    /// Override the reserved envelope key.
    pub fn with_type_key(mut self, key: impl Into<String>) -> Self {
        self.type_key = key.into();
        self
    }

    pub fn registry(&self) -> &CoderRegistry {
        &self.registry
    }

    pub fn allow_opaque_fallback(&self) -> bool {
        self.allow_opaque_fallback
    }

    pub fn type_key(&self) -> &str {
        &self.type_key
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
