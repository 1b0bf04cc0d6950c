// Cepstra
// Copyright (c) 2026 The Project Cepstra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `convert` module provides the raw sample format converters.

use cepstra_core::buffers::{Buffers, BuffersMut};
use cepstra_core::errors::{incompatible_format_error, Result};
use cepstra_core::formats::{BufferFormat, ElementKind};
use cepstra_core::registry::{RegisterableTransform, TransformDescriptor};
use cepstra_core::support_transform;
use cepstra_core::transform::{ParameterSet, Transform};

/// Converts raw signed 16-bit samples to raw floats. The sample values are preserved, not
/// normalized.
pub struct Int16ToFloat {
    params: ParameterSet,
    input: BufferFormat,
    output: BufferFormat,
}

impl Default for Int16ToFloat {
    fn default() -> Self {
        Int16ToFloat {
            params: ParameterSet::new("Int16ToFloat", &[]),
            input: BufferFormat::raw_int16(0, 0),
            output: BufferFormat::raw_float(0, 0),
        }
    }
}

impl Transform for Int16ToFloat {
    fn name(&self) -> &'static str {
        "Int16ToFloat"
    }

    fn description(&self) -> &'static str {
        "Converts raw 16-bit samples to raw floats"
    }

    fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> Result<()> {
        self.params.set(name, value)
    }

    fn bind_input_format(&mut self, format: &BufferFormat) -> Result<()> {
        if format.kind() != ElementKind::Int16 {
            return incompatible_format_error(self.name(), &format.id());
        }
        self.input = format.clone();
        self.output = BufferFormat::raw_float(format.length(), format.sample_rate());
        Ok(())
    }

    fn input_format(&self) -> &BufferFormat {
        &self.input
    }

    fn output_format(&self) -> &BufferFormat {
        &self.output
    }

    fn process(&mut self, input: &Buffers<'_>, output: &mut BuffersMut<'_>) -> Result<()> {
        for (out, &sample) in output.as_f32_mut().iter_mut().zip(input.as_i16()) {
            *out = f32::from(sample);
        }
        Ok(())
    }
}

impl RegisterableTransform for Int16ToFloat {
    fn supported_transforms() -> &'static [TransformDescriptor] {
        &[support_transform!(
            Int16ToFloat,
            "Int16ToFloat",
            "Converts raw 16-bit samples to raw floats"
        )]
    }
}

/// Converts raw floats back to signed 16-bit samples, saturating out-of-range values.
pub struct FloatToInt16 {
    params: ParameterSet,
    input: BufferFormat,
    output: BufferFormat,
}

impl Default for FloatToInt16 {
    fn default() -> Self {
        FloatToInt16 {
            params: ParameterSet::new("FloatToInt16", &[]),
            input: BufferFormat::raw_float(0, 0),
            output: BufferFormat::raw_int16(0, 0),
        }
    }
}

impl Transform for FloatToInt16 {
    fn name(&self) -> &'static str {
        "FloatToInt16"
    }

    fn description(&self) -> &'static str {
        "Converts raw floats to 16-bit samples, saturating"
    }

    fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> Result<()> {
        self.params.set(name, value)
    }

    fn bind_input_format(&mut self, format: &BufferFormat) -> Result<()> {
        if format.kind() != ElementKind::Float32 {
            return incompatible_format_error(self.name(), &format.id());
        }
        self.input = format.clone();
        self.output = BufferFormat::raw_int16(format.length(), format.sample_rate());
        Ok(())
    }

    fn input_format(&self) -> &BufferFormat {
        &self.input
    }

    fn output_format(&self) -> &BufferFormat {
        &self.output
    }

    fn process(&mut self, input: &Buffers<'_>, output: &mut BuffersMut<'_>) -> Result<()> {
        for (out, &sample) in output.as_i16_mut().iter_mut().zip(input.as_f32()) {
            *out = sample.round().clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16;
        }
        Ok(())
    }
}

impl RegisterableTransform for FloatToInt16 {
    fn supported_transforms() -> &'static [TransformDescriptor] {
        &[support_transform!(
            FloatToInt16,
            "FloatToInt16",
            "Converts raw floats to 16-bit samples, saturating"
        )]
    }
}
