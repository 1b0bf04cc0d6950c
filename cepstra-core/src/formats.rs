// Cepstra
// Copyright (c) 2026 The Project Cepstra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `formats` module provides the structural description of buffer contents.
//!
//! A [`BufferFormat`] describes one buffer instance on an edge of the transform tree: the element
//! kind, the number of elements, and the sampling rate the elements were derived from. Formats are
//! plain values. A transform owns and mutates its own copies while parameters and the input format
//! are being bound; once a format is attached to an edge it is only ever read.

use std::fmt;

/// `ElementKind` enumerates the kinds of elements a buffer may hold.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Signed 16-bit PCM samples.
    Int16,
    /// 32-bit floating point samples of a raw (un-windowed) signal.
    Float32,
    /// 32-bit floating point samples cut and weighted by a window function, or any per-window
    /// derivative thereof (spectra, filter-bank energies, cepstra).
    WindowedFloat,
    /// Fixed-length arrays of 32-bit floats, e.g. a tuple of statistics per instance.
    FixedArrayF32(u32),
}

impl ElementKind {
    /// Gets the number of bytes one element occupies.
    pub fn bytes_per_element(&self) -> usize {
        match *self {
            ElementKind::Int16 => 2,
            ElementKind::Float32 => 4,
            ElementKind::WindowedFloat => 4,
            ElementKind::FixedArrayF32(len) => 4 * len as usize,
        }
    }

    /// Returns `true` if elements of this kind are built from 32-bit floats.
    pub fn is_float(&self) -> bool {
        !matches!(*self, ElementKind::Int16)
    }

    /// Returns `true` for scalar (non-array) float kinds.
    pub fn is_scalar_float(&self) -> bool {
        matches!(*self, ElementKind::Float32 | ElementKind::WindowedFloat)
    }

    /// Gets the number of 32-bit floats one element expands to. Zero for integer kinds.
    pub fn floats_per_element(&self) -> usize {
        match *self {
            ElementKind::Int16 => 0,
            ElementKind::Float32 | ElementKind::WindowedFloat => 1,
            ElementKind::FixedArrayF32(len) => len as usize,
        }
    }
}

/// `BufferFormat` is the structural description of the buffers travelling along one edge of the
/// transform tree. Two formats are equal iff all attributes match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BufferFormat {
    kind: ElementKind,
    length: usize,
    sample_rate: u32,
}

impl BufferFormat {
    pub fn new(kind: ElementKind, length: usize, sample_rate: u32) -> Self {
        BufferFormat { kind, length, sample_rate }
    }

    /// A raw signed 16-bit signal of `length` samples.
    pub fn raw_int16(length: usize, sample_rate: u32) -> Self {
        BufferFormat::new(ElementKind::Int16, length, sample_rate)
    }

    /// A raw 32-bit float signal of `length` samples.
    pub fn raw_float(length: usize, sample_rate: u32) -> Self {
        BufferFormat::new(ElementKind::Float32, length, sample_rate)
    }

    /// A windowed float signal of `length` samples per window.
    pub fn windowed_float(length: usize, sample_rate: u32) -> Self {
        BufferFormat::new(ElementKind::WindowedFloat, length, sample_rate)
    }

    /// Arrays of `width` floats, `length` arrays per instance.
    pub fn fixed_array(width: u32, length: usize, sample_rate: u32) -> Self {
        BufferFormat::new(ElementKind::FixedArrayF32(width), length, sample_rate)
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Gets the logical element count of one buffer instance (samples per window, frequency bins,
    /// subbands, ...).
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Gets the size of one buffer instance in bytes.
    pub fn size_in_bytes(&self) -> usize {
        self.length * self.kind.bytes_per_element()
    }

    /// Replaces the element kind, preserving length and sampling rate.
    pub fn set_kind(&mut self, kind: ElementKind) {
        self.kind = kind;
    }

    /// Replaces the logical element count.
    pub fn set_length(&mut self, length: usize) {
        self.length = length;
    }

    /// Gets the canonical identifier of this format, used for logging and dot export.
    pub fn id(&self) -> String {
        match self.kind {
            ElementKind::Int16 => format!("R16<{}>@{}", self.length, self.sample_rate),
            ElementKind::Float32 => format!("RF<{}>@{}", self.length, self.sample_rate),
            ElementKind::WindowedFloat => format!("WF<{}>@{}", self.length, self.sample_rate),
            ElementKind::FixedArrayF32(len) => {
                format!("FA{}<{}>@{}", len, self.length, self.sample_rate)
            }
        }
    }
}

impl fmt::Display for BufferFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}
