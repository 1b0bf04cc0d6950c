// Cepstra
// Copyright (c) 2026 The Project Cepstra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `spectral` module collapses interleaved complex spectra to real per-bin values.
//!
//! The input of both transforms is the `re, im` interleaved layout the RDFT transform produces:
//! an instance of `2·M` floats describing `M` complex bins. The output is `M` floats per
//! instance.

use cepstra_core::buffers::{Buffers, BuffersMut};
use cepstra_core::errors::{incompatible_format_error, Result};
use cepstra_core::formats::BufferFormat;
use cepstra_core::registry::{RegisterableTransform, TransformDescriptor};
use cepstra_core::support_transform;
use cepstra_core::transform::{ParameterSet, Transform};

macro_rules! complex_to_real_transform {
    ($name:ident, $short_name:literal, $description:literal, $op:expr) => {
        #[doc = $description]
        #[doc = "."]
        pub struct $name {
            params: ParameterSet,
            input: BufferFormat,
            output: BufferFormat,
        }

        impl Default for $name {
            fn default() -> Self {
                $name {
                    params: ParameterSet::new($short_name, &[]),
                    input: BufferFormat::windowed_float(0, 0),
                    output: BufferFormat::windowed_float(0, 0),
                }
            }
        }

        impl Transform for $name {
            fn name(&self) -> &'static str {
                $short_name
            }

            fn description(&self) -> &'static str {
                $description
            }

            fn parameters(&self) -> &ParameterSet {
                &self.params
            }

            fn set_parameter(&mut self, name: &str, value: &str) -> Result<()> {
                self.params.set(name, value)
            }

            fn bind_input_format(&mut self, format: &BufferFormat) -> Result<()> {
                if !format.kind().is_scalar_float() || format.length() < 2 || format.length() % 2 != 0 {
                    return incompatible_format_error(self.name(), &format.id());
                }
                self.input = format.clone();
                self.output = format.clone();
                self.output.set_length(format.length() / 2);
                Ok(())
            }

            fn input_format(&self) -> &BufferFormat {
                &self.input
            }

            fn output_format(&self) -> &BufferFormat {
                &self.output
            }

            fn process(&mut self, input: &Buffers<'_>, output: &mut BuffersMut<'_>) -> Result<()> {
                let op = $op;
                for index in 0..input.count() {
                    let bins = input.instance_f32(index);
                    for (out, pair) in
                        output.instance_f32_mut(index).iter_mut().zip(bins.chunks_exact(2))
                    {
                        *out = op(pair[0], pair[1]);
                    }
                }
                Ok(())
            }
        }

        impl RegisterableTransform for $name {
            fn supported_transforms() -> &'static [TransformDescriptor] {
                &[support_transform!($name, $short_name, $description)]
            }
        }
    };
}

complex_to_real_transform!(
    SpectralEnergy,
    "SpectralEnergy",
    "Calculates the squared magnitude of each complex bin",
    |re: f32, im: f32| re * re + im * im
);

complex_to_real_transform!(
    Magnitude,
    "Magnitude",
    "Calculates the magnitude of each complex bin",
    |re: f32, im: f32| (re * re + im * im).sqrt()
);
