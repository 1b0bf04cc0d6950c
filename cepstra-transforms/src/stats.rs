// Cepstra
// Copyright (c) 2026 The Project Cepstra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `stats` module collapses each instance to a tuple of summary statistics.

use cepstra_core::buffers::{Buffers, BuffersMut};
use cepstra_core::errors::{incompatible_format_error, invalid_value_error, Result};
use cepstra_core::formats::BufferFormat;
use cepstra_core::registry::{RegisterableTransform, TransformDescriptor};
use cepstra_core::support_transform;
use cepstra_core::transform::{ParameterInfo, ParameterSet, Transform};

const MEAN_PARAMS: &[ParameterInfo] = &[ParameterInfo {
    name: "types",
    description: "comma-separated list of means to calculate (arithmetic, geometric)",
    default: "arithmetic",
}];

#[derive(Copy, Clone, PartialEq, Eq)]
enum MeanKind {
    Arithmetic,
    Geometric,
}

impl MeanKind {
    fn calculate(&self, values: &[f32]) -> f32 {
        let n = values.len() as f64;
        match *self {
            MeanKind::Arithmetic => {
                (values.iter().map(|&v| f64::from(v)).sum::<f64>() / n) as f32
            }
            MeanKind::Geometric => {
                // The geometric mean of the absolute values, clamped away from zero so a silent
                // input stays finite.
                let log_sum: f64 = values
                    .iter()
                    .map(|&v| f64::from(v.abs().max(f32::EPSILON)).ln())
                    .sum();
                (log_sum / n).exp() as f32
            }
        }
    }
}

/// Calculates the selected means of each instance, emitting one fixed-size array per instance.
pub struct Mean {
    params: ParameterSet,
    kinds: Vec<MeanKind>,
    input: BufferFormat,
    output: BufferFormat,
}

impl Default for Mean {
    fn default() -> Self {
        Mean {
            params: ParameterSet::new("Mean", MEAN_PARAMS),
            kinds: vec![MeanKind::Arithmetic],
            input: BufferFormat::windowed_float(0, 0),
            output: BufferFormat::fixed_array(1, 1, 0),
        }
    }
}

impl Transform for Mean {
    fn name(&self) -> &'static str {
        "Mean"
    }

    fn description(&self) -> &'static str {
        "Calculates the selected means of each instance"
    }

    fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> Result<()> {
        if name == "types" {
            let mut kinds = Vec::new();
            for token in value.split(',') {
                let kind = match token.trim() {
                    "arithmetic" => MeanKind::Arithmetic,
                    "geometric" => MeanKind::Geometric,
                    _ => return invalid_value_error(self.name(), name, value),
                };
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
            if kinds.is_empty() {
                return invalid_value_error(self.name(), name, value);
            }
            self.kinds = kinds;
        }
        self.params.set(name, value)
    }

    fn bind_input_format(&mut self, format: &BufferFormat) -> Result<()> {
        if !format.kind().is_scalar_float() || format.length() == 0 {
            return incompatible_format_error(self.name(), &format.id());
        }
        self.input = format.clone();
        self.output = BufferFormat::fixed_array(self.kinds.len() as u32, 1, format.sample_rate());
        Ok(())
    }

    fn input_format(&self) -> &BufferFormat {
        &self.input
    }

    fn output_format(&self) -> &BufferFormat {
        &self.output
    }

    fn process(&mut self, input: &Buffers<'_>, output: &mut BuffersMut<'_>) -> Result<()> {
        for index in 0..input.count() {
            let values = input.instance_f32(index);
            for (out, kind) in output.instance_f32_mut(index).iter_mut().zip(&self.kinds) {
                *out = kind.calculate(values);
            }
        }
        Ok(())
    }
}

impl RegisterableTransform for Mean {
    fn supported_transforms() -> &'static [TransformDescriptor] {
        &[support_transform!(Mean, "Mean", "Calculates the selected means of each instance")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cepstra_core::formats::ElementKind;

    #[test]
    fn verify_means() {
        let format = BufferFormat::windowed_float(4, 8000);
        let mut mean = Mean::default();
        mean.set_parameter("types", "arithmetic,geometric").unwrap();
        mean.bind_input_format(&format).unwrap();

        assert_eq!(mean.output_format().kind(), ElementKind::FixedArrayF32(2));
        assert_eq!(mean.output_format().length(), 1);

        let values = [1.0f32, 4.0, 1.0, 4.0];
        let input_bytes: &[u8] = bytemuck::cast_slice(&values);
        let input = Buffers::new(format, 1, input_bytes);

        let mut storage = vec![0f32; 2];
        let mut output = BuffersMut::new(
            mean.output_format().clone(),
            1,
            bytemuck::cast_slice_mut(&mut storage),
        );

        mean.process(&input, &mut output).unwrap();

        let out = output.as_buffers().instance_f32(0).to_vec();
        assert!((out[0] - 2.5).abs() < 1e-6);
        assert!((out[1] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn verify_silence_stays_finite() {
        let format = BufferFormat::windowed_float(8, 8000);
        let mut mean = Mean::default();
        mean.set_parameter("types", "geometric").unwrap();
        mean.bind_input_format(&format).unwrap();

        let values = [0.0f32; 8];
        let input_bytes: &[u8] = bytemuck::cast_slice(&values);
        let input = Buffers::new(format, 1, input_bytes);

        let mut storage = vec![0f32; 1];
        let mut output = BuffersMut::new(
            mean.output_format().clone(),
            1,
            bytemuck::cast_slice_mut(&mut storage),
        );

        mean.process(&input, &mut output).unwrap();
        assert!(output.as_buffers().instance_f32(0)[0].is_finite());
    }

    #[test]
    fn verify_types_validation() {
        let mut mean = Mean::default();
        assert!(mean.set_parameter("types", "harmonic").is_err());
        assert!(mean.set_parameter("types", "").is_err());
        assert!(mean.set_parameter("types", "geometric,arithmetic").is_ok());
    }
}
