// Cepstra
// Copyright (c) 2026 The Project Cepstra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `transform` module provides the trait and support structures necessary to implement
//! feature-extraction transforms.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::buffers::{Buffers, BuffersMut};
use crate::errors::{CepstraError, Result};
use crate::formats::BufferFormat;

/// `BuffersCountChange` describes how a transform scales the number of parallel buffer instances
/// from its input to its output.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BuffersCountChange {
    /// One output instance per input instance.
    Identity,
    /// Each input instance yields the given number of output instances (e.g. windowing).
    Multiply(usize),
    /// The output instance count is constant regardless of the input (e.g. aggregation).
    Fixed(usize),
}

impl BuffersCountChange {
    /// Applies the change to an input instance count.
    pub fn apply(&self, count: usize) -> usize {
        match *self {
            BuffersCountChange::Identity => count,
            BuffersCountChange::Multiply(k) => count * k,
            BuffersCountChange::Fixed(n) => n,
        }
    }
}

/// Declaration of a single transform parameter.
#[derive(Copy, Clone)]
pub struct ParameterInfo {
    /// The parameter name as it appears in a parameters string.
    pub name: &'static str,
    /// A short description of the parameter.
    pub description: &'static str,
    /// The default value, in string form.
    pub default: &'static str,
}

/// A dependency parameter: the declaring transform inherits the value of `parameter` from the
/// nearest ancestor in its chain whose transform is named `transform`.
#[derive(Copy, Clone)]
pub struct DependencyParameter {
    /// The name of the producer transform.
    pub transform: &'static str,
    /// The name of the inherited parameter.
    pub parameter: &'static str,
}

/// `ParameterSet` stores a transform's current parameter values, validated against its declared
/// schema. Values are kept in string form, sorted by name, so the set doubles as the canonical
/// parameter part of a transform fingerprint.
#[derive(Clone)]
pub struct ParameterSet {
    transform: &'static str,
    schema: &'static [ParameterInfo],
    values: BTreeMap<&'static str, String>,
}

impl ParameterSet {
    /// Instantiate a set for `transform`, populated with the schema's default values.
    pub fn new(transform: &'static str, schema: &'static [ParameterInfo]) -> Self {
        let values = schema.iter().map(|info| (info.name, info.default.to_string())).collect();
        ParameterSet { transform, schema, values }
    }

    /// Gets the declared schema.
    pub fn schema(&self) -> &'static [ParameterInfo] {
        self.schema
    }

    /// Records a value for a declared parameter. Fails with `InvalidParameter` for names outside
    /// the schema.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        match self.schema.iter().find(|info| info.name == name) {
            Some(info) => {
                self.values.insert(info.name, value.to_string());
                Ok(())
            }
            None => Err(CepstraError::InvalidParameter {
                transform: self.transform.to_string(),
                name: name.to_string(),
            }),
        }
    }

    /// Gets the current value of a declared parameter.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(|value| value.as_str())
    }

    /// Gets the current values, sorted by parameter name.
    pub fn values(&self) -> &BTreeMap<&'static str, String> {
        &self.values
    }
}

/// Parses a parameter value, mapping a parse failure to `InvalidParameterValue`.
pub fn parse_param<T: FromStr>(transform: &str, name: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| CepstraError::InvalidParameterValue {
        transform: transform.to_string(),
        name: name.to_string(),
        value: value.to_string(),
    })
}

/// A `Transform` implements one elementary signal-processing operation of a feature pipeline. It
/// consumes the parallel buffer instances produced by its parent node and fills its own.
///
/// The tree drives a transform through a fixed lifecycle: parameters are set, dependency
/// parameters are resolved, the input format is bound (which recomputes the output format),
/// `initialize` runs one-shot precomputation, and `process` fires once per tree execution.
pub trait Transform {
    /// Gets the name the transform is registered under.
    fn name(&self) -> &'static str;

    /// Gets a short description of the transform.
    fn description(&self) -> &'static str;

    /// Gets the current parameter values.
    fn parameters(&self) -> &ParameterSet;

    /// Sets a declared parameter from its string form.
    ///
    /// Fails with `InvalidParameter` for unknown names and `InvalidParameterValue` for values
    /// that do not parse.
    fn set_parameter(&mut self, name: &str, value: &str) -> Result<()>;

    /// Gets the dependency parameters this transform inherits from ancestors in its chain.
    fn dependencies(&self) -> &'static [DependencyParameter] {
        &[]
    }

    /// Binds the input format, validating compatibility and recomputing the output format.
    ///
    /// Fails with `IncompatibleTransformFormat` if the transform cannot consume `format`.
    fn bind_input_format(&mut self, format: &BufferFormat) -> Result<()>;

    /// Gets the bound input format.
    fn input_format(&self) -> &BufferFormat;

    /// Gets the output format derived from the bound input format.
    fn output_format(&self) -> &BufferFormat;

    /// Gets how the transform scales the number of parallel buffer instances. Only meaningful
    /// once the input format is bound.
    fn buffers_count_change(&self) -> BuffersCountChange {
        BuffersCountChange::Identity
    }

    /// Performs one-shot precomputation (FFT plans, filter banks, window tables). Idempotent;
    /// called after the input format is bound and before the first `process`.
    fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    /// Runs the transform: reads every input instance, writes every output instance.
    ///
    /// `process` must be pure with respect to the input bytes and must not retain borrows.
    fn process(&mut self, input: &Buffers<'_>, output: &mut BuffersMut<'_>) -> Result<()>;

    /// Gets the canonical fingerprint of this instance: the name, the sorted parameter values
    /// (the inverse flag, where supported, is one of them), and the bound input format id. Two
    /// transform instances are interchangeable iff their fingerprints are equal; the tree
    /// deduplicates nodes on this string.
    fn fingerprint(&self) -> String {
        let mut params = String::new();
        for (name, value) in self.parameters().values() {
            if !params.is_empty() {
                params.push(',');
            }
            params.push_str(name);
            params.push('=');
            params.push_str(value);
        }
        format!("{}({})<{}", self.name(), params, self.input_format().id())
    }
}
