// Cepstra
// Copyright (c) 2026 The Project Cepstra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `errors` module defines the common error type.

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::result;

/// `CepstraError` provides an enumeration of all possible errors reported by Cepstra.
#[derive(Debug)]
pub enum CepstraError {
    /// The transform tree has already been prepared for execution and may not be mutated.
    TreeAlreadyPrepared,
    /// The transform tree has not been prepared for execution yet.
    TreeIsNotPrepared,
    /// The transform tree has no features.
    TreeIsEmpty,
    /// No transform with the given name exists in the registry.
    TransformNotRegistered(String),
    /// A transform was given a parameter it does not declare.
    InvalidParameter {
        /// The transform the parameter was addressed to.
        transform: String,
        /// The offending parameter name.
        name: String,
    },
    /// A declared parameter was given a value that could not be parsed.
    InvalidParameterValue {
        /// The transform the parameter was addressed to.
        transform: String,
        /// The parameter name.
        name: String,
        /// The value that failed to parse.
        value: String,
    },
    /// A transform cannot consume the output format of its parent.
    IncompatibleTransformFormat {
        /// The transform that rejected the format.
        transform: String,
        /// The canonical id of the rejected format.
        format: String,
    },
    /// A transform depends on a parameter its producer does not declare.
    DependencyParameterUnknown {
        /// The producer transform that was expected to carry the parameter.
        producer: String,
        /// The depended-upon parameter name.
        parameter: String,
        /// The transform that declared the dependency.
        consumer: String,
    },
    /// A feature with the same name has already been added.
    ChainNameAlreadyExists(String),
    /// An identical pipeline has already been added under a different name.
    ChainAlreadyExists {
        /// The name the pipeline was first added under.
        existing: String,
        /// The name of the rejected duplicate.
        new: String,
    },
    /// The arena backing the intermediate buffers could not be allocated.
    FailedToAllocateBuffers(String),
    /// A transform produced buffers that failed validation.
    TransformResultedInInvalidBuffers {
        /// The offending transform.
        transform: String,
        /// The inner validator message.
        reason: String,
    },
    /// The input supplied to `execute` was unusable.
    InvalidInputBuffers(String),
    /// A buffers-to-buffers copy would overflow the destination. Indicates an allocator bug or
    /// misuse.
    InsufficientAllocatedMemory {
        /// Bytes the copy requires.
        required: usize,
        /// Bytes the destination provides.
        available: usize,
    },
    /// An IO error occurred while writing a graph dump.
    IoError(io::Error),
    Other(&'static str),
}

impl fmt::Display for CepstraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            CepstraError::TreeAlreadyPrepared => {
                write!(f, "transform tree has already been prepared for execution")
            }
            CepstraError::TreeIsNotPrepared => {
                write!(f, "transform tree has not been prepared for execution")
            }
            CepstraError::TreeIsEmpty => {
                write!(f, "transform tree is empty")
            }
            CepstraError::TransformNotRegistered(ref name) => {
                write!(f, "transform \"{}\" is not registered", name)
            }
            CepstraError::InvalidParameter { ref transform, ref name } => {
                write!(f, "transform \"{}\" has no parameter \"{}\"", transform, name)
            }
            CepstraError::InvalidParameterValue { ref transform, ref name, ref value } => {
                write!(
                    f,
                    "\"{}\" is not a valid value for parameter \"{}\" of transform \"{}\"",
                    value, name, transform
                )
            }
            CepstraError::IncompatibleTransformFormat { ref transform, ref format } => {
                write!(f, "transform \"{}\" is incompatible with format \"{}\"", transform, format)
            }
            CepstraError::DependencyParameterUnknown {
                ref producer,
                ref parameter,
                ref consumer,
            } => {
                write!(
                    f,
                    "transform \"{}\" does not have a registered parameter \"{}\" checked by \
                     transform \"{}\"",
                    producer, parameter, consumer
                )
            }
            CepstraError::ChainNameAlreadyExists(ref name) => {
                write!(f, "chain name \"{}\" already exists", name)
            }
            CepstraError::ChainAlreadyExists { ref existing, ref new } => {
                write!(f, "chain \"{}\" is identical to previously added \"{}\"", new, existing)
            }
            CepstraError::FailedToAllocateBuffers(ref reason) => {
                write!(f, "failed to allocate buffers: {}", reason)
            }
            CepstraError::TransformResultedInInvalidBuffers { ref transform, ref reason } => {
                write!(f, "transform \"{}\" resulted in invalid buffers: {}", transform, reason)
            }
            CepstraError::InvalidInputBuffers(ref reason) => {
                write!(f, "invalid input data: {}", reason)
            }
            CepstraError::InsufficientAllocatedMemory { required, available } => {
                write!(
                    f,
                    "attempted to assign {} bytes to buffers holding {} bytes",
                    required, available
                )
            }
            CepstraError::IoError(ref err) => {
                write!(f, "io error: {}", err)
            }
            CepstraError::Other(msg) => {
                write!(f, "{}", msg)
            }
        }
    }
}

impl StdError for CepstraError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            CepstraError::IoError(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for CepstraError {
    fn from(err: io::Error) -> CepstraError {
        CepstraError::IoError(err)
    }
}

pub type Result<T> = result::Result<T, CepstraError>;

/// Convenience function to create an incompatible-format error.
pub fn incompatible_format_error<T>(transform: &str, format: &str) -> Result<T> {
    Err(CepstraError::IncompatibleTransformFormat {
        transform: transform.to_string(),
        format: format.to_string(),
    })
}

/// Convenience function to create an invalid-parameter-value error.
pub fn invalid_value_error<T>(transform: &str, name: &str, value: &str) -> Result<T> {
    Err(CepstraError::InvalidParameterValue {
        transform: transform.to_string(),
        name: name.to_string(),
        value: value.to_string(),
    })
}

/// Convenience function to create an invalid-input error.
pub fn invalid_input_error<T>(reason: String) -> Result<T> {
    Err(CepstraError::InvalidInputBuffers(reason))
}
