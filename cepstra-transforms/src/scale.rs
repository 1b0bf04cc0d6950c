// Cepstra
// Copyright (c) 2026 The Project Cepstra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `scale` module provides the element-wise value maps: logarithm, square, rectification.

use cepstra_core::buffers::{Buffers, BuffersMut};
use cepstra_core::errors::{incompatible_format_error, Result};
use cepstra_core::formats::BufferFormat;
use cepstra_core::registry::{RegisterableTransform, TransformDescriptor};
use cepstra_core::support_transform;
use cepstra_core::transform::{ParameterSet, Transform};

macro_rules! elementwise_transform {
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
                    input: BufferFormat::raw_float(0, 0),
                    output: BufferFormat::raw_float(0, 0),
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
                if !format.kind().is_float() {
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

            fn process(&mut self, input: &Buffers<'_>, output: &mut BuffersMut<'_>) -> Result<()> {
                let op = $op;
                for (out, &value) in output.as_f32_mut().iter_mut().zip(input.as_f32()) {
                    *out = op(value);
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

elementwise_transform!(
    Log,
    "Log",
    "Takes the natural logarithm of every element, clamping the argument away from zero",
    |value: f32| value.max(f32::EPSILON).ln()
);

elementwise_transform!(Square, "Square", "Squares every element", |value: f32| value * value);

elementwise_transform!(
    Rectify,
    "Rectify",
    "Replaces every element with its absolute value",
    |value: f32| value.abs()
);
