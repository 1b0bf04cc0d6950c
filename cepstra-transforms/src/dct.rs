// Cepstra
// Copyright (c) 2026 The Project Cepstra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `dct` module implements the Discrete Cosine Transform (DCT-II).
//!
//! Feature pipelines apply the DCT to short filter-bank outputs of arbitrary length, so the
//! transform multiplies by a precomputed cosine table instead of requiring a power-of-two fast
//! path. No scaling is applied.

use std::f64;

use cepstra_core::buffers::{Buffers, BuffersMut};
use cepstra_core::errors::{incompatible_format_error, Result};
use cepstra_core::formats::BufferFormat;
use cepstra_core::registry::{RegisterableTransform, TransformDescriptor};
use cepstra_core::support_transform;
use cepstra_core::transform::{ParameterSet, Transform};

/// The Discrete Cosine Transform: `out[i] = sum_j in[j] * cos(pi / N * i * (j + 0.5))`.
pub struct Dct {
    params: ParameterSet,
    /// Row-major `N x N` cosine table.
    table: Vec<f32>,
    input: BufferFormat,
    output: BufferFormat,
}

impl Default for Dct {
    fn default() -> Self {
        Dct {
            params: ParameterSet::new("DCT", &[]),
            table: Vec::new(),
            input: BufferFormat::windowed_float(0, 0),
            output: BufferFormat::windowed_float(0, 0),
        }
    }
}

impl Transform for Dct {
    fn name(&self) -> &'static str {
        "DCT"
    }

    fn description(&self) -> &'static str {
        "Calculates the Discrete Cosine Transform"
    }

    fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> Result<()> {
        self.params.set(name, value)
    }

    fn bind_input_format(&mut self, format: &BufferFormat) -> Result<()> {
        if !format.kind().is_scalar_float() || format.length() == 0 {
            return incompatible_format_error(self.name(), &format.id());
        }
        self.input = format.clone();
        self.output = format.clone();
        Ok(())
    }

    fn input_format(&self) -> &BufferFormat {
        &self.input
    }

    fn output_format(&self) -> &BufferFormat {
        &self.output
    }

    fn initialize(&mut self) -> Result<()> {
        let n = self.input.length();
        let freq = f64::consts::PI / n as f64;

        self.table = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                self.table.push((freq * i as f64 * (j as f64 + 0.5)).cos() as f32);
            }
        }
        Ok(())
    }

    fn process(&mut self, input: &Buffers<'_>, output: &mut BuffersMut<'_>) -> Result<()> {
        let n = self.input.length();

        for index in 0..input.count() {
            let samples = input.instance_f32(index);
            for (i, out) in output.instance_f32_mut(index).iter_mut().enumerate() {
                let row = &self.table[i * n..(i + 1) * n];
                *out = row.iter().zip(samples).map(|(&c, &x)| c * x).sum();
            }
        }

        Ok(())
    }
}

impl RegisterableTransform for Dct {
    fn supported_transforms() -> &'static [TransformDescriptor] {
        &[support_transform!(Dct, "DCT", "Calculates the Discrete Cosine Transform")]
    }
}
