// Cepstra
// Copyright (c) 2026 The Project Cepstra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `registry` module supports lookup and instantiation of transforms dynamically at run time.
//!
//! A registry is populated explicitly during program startup (see the facade crate's
//! `register_enabled_transforms`) rather than by static initializers, so unknown or duplicate
//! registrations surface eagerly.

use std::collections::HashMap;

use log::warn;

use crate::errors::{CepstraError, Result};
use crate::transform::Transform;

/// A `TransformDescriptor` stores a description of a single transform: its registered name, a
/// longer description, and an instantiation function producing a fresh unbound instance.
#[derive(Copy, Clone)]
pub struct TransformDescriptor {
    /// The name the transform is invoked by in a feature pipeline.
    pub short_name: &'static str,
    /// A longer, more descriptive, string identifying the transform.
    pub long_name: &'static str,
    /// An instantiation function for the transform.
    pub inst_func: fn() -> Box<dyn Transform>,
}

/// To support registration in a transform registry, a `Transform` must implement the
/// `RegisterableTransform` trait.
pub trait RegisterableTransform: Transform {
    /// Gets a list of descriptors for the transforms provided by this implementation.
    fn supported_transforms() -> &'static [TransformDescriptor]
    where
        Self: Sized;
}

/// A `TransformRegistry` allows the registration of transforms, and provides a method to
/// instantiate a fresh `Transform` given its registered name.
pub struct TransformRegistry {
    transforms: HashMap<&'static str, TransformDescriptor>,
}

impl TransformRegistry {
    /// Instantiate a new `TransformRegistry`.
    pub fn new() -> Self {
        TransformRegistry { transforms: HashMap::new() }
    }

    /// Gets the `TransformDescriptor` for a registered transform.
    pub fn get_transform(&self, name: &str) -> Option<&TransformDescriptor> {
        self.transforms.get(name)
    }

    /// Iterates over all registered descriptors.
    pub fn descriptors(&self) -> impl Iterator<Item = &TransformDescriptor> {
        self.transforms.values()
    }

    /// Registers all transforms provided by `T`. If a transform was previously registered under
    /// the same name it will be replaced within the registry.
    pub fn register_all<T: RegisterableTransform>(&mut self) {
        for descriptor in T::supported_transforms() {
            self.register(descriptor);
        }
    }

    /// Register a single transform. If the transform was previously registered it will be
    /// replaced within the registry.
    pub fn register(&mut self, descriptor: &TransformDescriptor) {
        if self.transforms.insert(descriptor.short_name, *descriptor).is_some() {
            warn!("replacing previously registered transform '{}'", descriptor.short_name);
        }
    }

    /// Searches the registry for a transform with the given name. If one is found, a fresh
    /// unbound instance is returned; otherwise the lookup fails with `TransformNotRegistered`.
    pub fn make(&self, name: &str) -> Result<Box<dyn Transform>> {
        match self.transforms.get(name) {
            Some(descriptor) => Ok((descriptor.inst_func)()),
            None => Err(CepstraError::TransformNotRegistered(name.to_string())),
        }
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience macro for declaring a `TransformDescriptor`.
#[macro_export]
macro_rules! support_transform {
    ($t:ty, $short_name:expr, $long_name:expr) => {
        $crate::registry::TransformDescriptor {
            short_name: $short_name,
            long_name: $long_name,
            inst_func: || Box::new(<$t>::default()),
        }
    };
}
