// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Ordered coder registry.

use std::collections::HashSet;
use std::fmt;

use crate::coder::{
    DateTimeCoder, FrameCoder, MaskedArrayCoder, NdArrayCoder, SetCoder, TimeDeltaCoder, TypeCoder,
};
use crate::error::CoderError;
use crate::value::Value;

/// Ordered collection of type coders.
///
/// Value lookup is first-match-wins in registration order, so coders with
/// stricter predicates must precede more general ones (the default registry
/// puts the masked-array coder before the plain array coder for exactly this
/// reason). Tag lookup is injective: construction rejects duplicate tags.
///
/// The registry is immutable once built; sharing one across threads and
/// in-flight encode/decode calls is safe by construction.
pub struct CoderRegistry {
    coders: Vec<Box<dyn TypeCoder>>,
}

impl CoderRegistry {
    /// Build a registry from an explicit ordered coder list.
    pub fn new(coders: Vec<Box<dyn TypeCoder>>) -> Result<Self, CoderError> {
        let mut seen = HashSet::new();
        for coder in &coders {
            if !seen.insert(coder.tag()) {
                return Err(CoderError::DuplicateTag {
                    tag: coder.tag().to_string(),
                });
            }
            log::debug!("[REGISTRY] Registered coder: {}", coder.tag());
        }
        Ok(Self { coders })
    }

    /// The default coder set: datetime, timedelta, set, masked array,
    /// array, frame.
    pub fn with_default_coders() -> Self {
        let coders: Vec<Box<dyn TypeCoder>> = vec![
            Box::new(DateTimeCoder),
            Box::new(TimeDeltaCoder),
            Box::new(SetCoder),
            Box::new(MaskedArrayCoder),
            Box::new(NdArrayCoder),
            Box::new(FrameCoder),
        ];
        log::debug!("[REGISTRY] Default registry with {} coders", coders.len());
        Self { coders }
    }

    /// First coder claiming the value, in registration order.
    pub fn coder_for(&self, value: &Value) -> Option<&dyn TypeCoder> {
        self.coders
            .iter()
            .find(|c| c.claims(value))
            .map(Box::as_ref)
    }

    /// The coder owning a tag, if any.
    pub fn coder_by_tag(&self, tag: &str) -> Option<&dyn TypeCoder> {
        self.coders
            .iter()
            .find(|c| c.tag() == tag)
            .map(Box::as_ref)
    }

    /// Registered tags in registration order.
    pub fn tags(&self) -> Vec<&'static str> {
        self.coders.iter().map(|c| c.tag()).collect()
    }

    pub fn len(&self) -> usize {
        self.coders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coders.is_empty()
    }
}

impl Default for CoderRegistry {
    fn default() -> Self {
        Self::with_default_coders()
    }
}

impl fmt::Debug for CoderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoderRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueSet;

    #[test]
    fn test_default_registry_order() {
        let registry = CoderRegistry::with_default_coders();
        assert_eq!(
            registry.tags(),
            vec![
                "datetime",
                "timedelta",
                "unique_set",
                "maskedarray",
                "ndarray",
                "dataframe"
            ]
        );
        assert_eq!(registry.len(), 6);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_duplicate_tags_rejected() {
        let err = CoderRegistry::new(vec![Box::new(SetCoder), Box::new(SetCoder)]).unwrap_err();
        match err {
            CoderError::DuplicateTag { tag } => assert_eq!(tag, "unique_set"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_value_lookup_first_match() {
        let registry = CoderRegistry::with_default_coders();
        let set = Value::Set(ValueSet::new());
        let coder = registry.coder_for(&set).expect("set coder claims sets");
        assert_eq!(coder.tag(), "unique_set");
        assert!(registry.coder_for(&Value::Int(1)).is_none());
    }

    #[test]
    fn test_tag_lookup() {
        let registry = CoderRegistry::with_default_coders();
        assert!(registry.coder_by_tag("ndarray").is_some());
        assert!(registry.coder_by_tag("color").is_none());
    }
}
