// Cepstra
// Copyright (c) 2026 The Project Cepstra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `buffers` module provides views over the parallel buffer instances a tree node produces.
//!
//! A node's output is `count` instances of one [`BufferFormat`], packed back to back inside the
//! tree's arena. [`Buffers`] and [`BuffersMut`] borrow that region; the arena itself stays owned
//! by the tree. Regions handed out by the tree start on a 32-byte boundary, which makes the typed
//! accessors below panic-free.

use std::fmt;
use std::fmt::Write;

use crate::errors::{CepstraError, Result};
use crate::formats::BufferFormat;

/// An immutable view over the `count` parallel buffer instances of one node.
pub struct Buffers<'a> {
    format: BufferFormat,
    count: usize,
    data: &'a [u8],
}

impl<'a> Buffers<'a> {
    /// Instantiate a view over `data`, which must hold exactly `count` instances of `format`.
    pub fn new(format: BufferFormat, count: usize, data: &'a [u8]) -> Self {
        assert_eq!(data.len(), count * format.size_in_bytes());
        Buffers { format, count, data }
    }

    /// Gets the format of every instance in the view.
    pub fn format(&self) -> &BufferFormat {
        &self.format
    }

    /// Gets the number of parallel instances.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Gets the total size of the view in bytes.
    pub fn size_in_bytes(&self) -> usize {
        self.data.len()
    }

    /// Gets the raw bytes of the `index`-th instance.
    pub fn bytes(&self, index: usize) -> &[u8] {
        let stride = self.format.size_in_bytes();
        &self.data[index * stride..(index + 1) * stride]
    }

    /// Views the whole region as 16-bit samples. The element kind must be an integer kind.
    pub fn as_i16(&self) -> &[i16] {
        assert!(!self.format.kind().is_float());
        bytemuck::cast_slice(self.data)
    }

    /// Views the whole region as 32-bit floats. The element kind must be a float kind.
    pub fn as_f32(&self) -> &[f32] {
        assert!(self.format.kind().is_float());
        bytemuck::cast_slice(self.data)
    }

    /// Views the `index`-th instance as 16-bit samples.
    pub fn instance_i16(&self, index: usize) -> &[i16] {
        bytemuck::cast_slice(self.bytes(index))
    }

    /// Views the `index`-th instance as 32-bit floats.
    pub fn instance_f32(&self, index: usize) -> &[f32] {
        bytemuck::cast_slice(self.bytes(index))
    }

    /// Validates every element of every instance.
    ///
    /// Float elements must be finite (no NaN, no infinities); integer elements pass
    /// unconditionally.
    pub fn validate(&self) -> Result<()> {
        if !self.format.kind().is_float() {
            return Ok(());
        }

        let floats_per_instance = self.format.length() * self.format.kind().floats_per_element();

        for (i, &value) in self.as_f32().iter().enumerate() {
            if !value.is_finite() {
                return Err(CepstraError::InvalidInputBuffers(format!(
                    "element {} of instance {} is {}",
                    i % floats_per_instance,
                    i / floats_per_instance,
                    value
                )));
            }
        }

        Ok(())
    }

    /// Formats the full contents of the view, one line per instance.
    pub fn dump(&self) -> String {
        let mut out = format!("{} x{}\n", self.format.id(), self.count);

        for index in 0..self.count {
            let _ = write!(out, "[{}]", index);
            if self.format.kind().is_float() {
                for value in self.instance_f32(index) {
                    let _ = write!(out, "\t{}", value);
                }
            }
            else {
                for value in self.instance_i16(index) {
                    let _ = write!(out, "\t{}", value);
                }
            }
            out.push('\n');
        }

        out
    }
}

impl fmt::Display for Buffers<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{}", self.format.id(), self.count)
    }
}

/// A mutable view over the `count` parallel buffer instances of one node.
pub struct BuffersMut<'a> {
    format: BufferFormat,
    count: usize,
    data: &'a mut [u8],
}

impl<'a> BuffersMut<'a> {
    /// Instantiate a view over `data`, which must hold exactly `count` instances of `format`.
    pub fn new(format: BufferFormat, count: usize, data: &'a mut [u8]) -> Self {
        assert_eq!(data.len(), count * format.size_in_bytes());
        BuffersMut { format, count, data }
    }

    /// Gets the format of every instance in the view.
    pub fn format(&self) -> &BufferFormat {
        &self.format
    }

    /// Gets the number of parallel instances.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Reborrows the view immutably.
    pub fn as_buffers(&self) -> Buffers<'_> {
        Buffers::new(self.format.clone(), self.count, self.data)
    }

    /// Views the whole region as mutable 16-bit samples.
    pub fn as_i16_mut(&mut self) -> &mut [i16] {
        assert!(!self.format.kind().is_float());
        bytemuck::cast_slice_mut(self.data)
    }

    /// Views the whole region as mutable 32-bit floats.
    pub fn as_f32_mut(&mut self) -> &mut [f32] {
        assert!(self.format.kind().is_float());
        bytemuck::cast_slice_mut(self.data)
    }

    /// Views the `index`-th instance as mutable 16-bit samples.
    pub fn instance_i16_mut(&mut self, index: usize) -> &mut [i16] {
        let stride = self.format.size_in_bytes();
        bytemuck::cast_slice_mut(&mut self.data[index * stride..(index + 1) * stride])
    }

    /// Views the `index`-th instance as mutable 32-bit floats.
    pub fn instance_f32_mut(&mut self, index: usize) -> &mut [f32] {
        let stride = self.format.size_in_bytes();
        bytemuck::cast_slice_mut(&mut self.data[index * stride..(index + 1) * stride])
    }

    /// Copies the contents of `src` into this view.
    ///
    /// The destination capacity must cover the source; otherwise the copy fails with
    /// `InsufficientAllocatedMemory` and the destination is untouched.
    pub fn copy_from(&mut self, src: &Buffers<'_>) -> Result<()> {
        let required = src.size_in_bytes();

        if required > self.data.len() {
            return Err(CepstraError::InsufficientAllocatedMemory {
                required,
                available: self.data.len(),
            });
        }

        self.data[..required].copy_from_slice(src.data);
        Ok(())
    }
}

impl fmt::Display for BuffersMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{}", self.format.id(), self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::BufferFormat;

    #[test]
    fn verify_instance_access() {
        let format = BufferFormat::windowed_float(4, 8000);
        let floats: Vec<f32> = (0..8).map(|v| v as f32).collect();
        let bytes: &[u8] = bytemuck::cast_slice(&floats);

        let buffers = Buffers::new(format, 2, bytes);
        assert_eq!(buffers.count(), 2);
        assert_eq!(buffers.instance_f32(0), &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(buffers.instance_f32(1), &[4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn verify_validation_soundness() {
        let format = BufferFormat::windowed_float(4, 8000);

        let finite = [1.0f32, -2.0, 0.5, 1e30, 0.0, -1e-30, 3.0, 4.0];
        let bytes: &[u8] = bytemuck::cast_slice(&finite);
        assert!(Buffers::new(format.clone(), 2, bytes).validate().is_ok());

        let mut poisoned = finite;
        poisoned[5] = f32::NAN;
        let bytes: &[u8] = bytemuck::cast_slice(&poisoned);
        assert!(Buffers::new(format.clone(), 2, bytes).validate().is_err());

        poisoned[5] = f32::INFINITY;
        let bytes: &[u8] = bytemuck::cast_slice(&poisoned);
        assert!(Buffers::new(format.clone(), 2, bytes).validate().is_err());

        poisoned[5] = f32::NEG_INFINITY;
        let bytes: &[u8] = bytemuck::cast_slice(&poisoned);
        assert!(Buffers::new(format, 2, bytes).validate().is_err());
    }

    #[test]
    fn verify_int16_always_valid() {
        let format = BufferFormat::raw_int16(4, 8000);
        let samples = [i16::MIN, -1, 0, i16::MAX];
        let bytes: &[u8] = bytemuck::cast_slice(&samples);
        assert!(Buffers::new(format, 1, bytes).validate().is_ok());
    }

    #[test]
    fn verify_copy_overflow_is_rejected() {
        let format = BufferFormat::raw_float(4, 8000);
        let src_floats = [0.0f32; 8];
        let src_bytes: &[u8] = bytemuck::cast_slice(&src_floats);
        let src = Buffers::new(format.clone(), 2, src_bytes);

        let mut dst_bytes = vec![0u8; 16];
        let mut dst = BuffersMut::new(format, 1, &mut dst_bytes);

        match dst.copy_from(&src) {
            Err(CepstraError::InsufficientAllocatedMemory { required: 32, available: 16 }) => (),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }
}
