// Cepstra
// Copyright (c) 2026 The Project Cepstra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `select` module provides the element-count reshaping transforms: truncation to a leading
//! or trailing range, and zero padding to a power of two.

use cepstra_core::buffers::{Buffers, BuffersMut};
use cepstra_core::errors::{incompatible_format_error, invalid_value_error, Result};
use cepstra_core::formats::BufferFormat;
use cepstra_core::registry::{RegisterableTransform, TransformDescriptor};
use cepstra_core::support_transform;
use cepstra_core::transform::{parse_param, ParameterInfo, ParameterSet, Transform};

const SELECTOR_PARAMS: &[ParameterInfo] = &[
    ParameterInfo { name: "length", description: "number of elements to keep", default: "12" },
    ParameterInfo {
        name: "from",
        description: "which end to keep the elements from (front or back)",
        default: "front",
    },
];

#[derive(Copy, Clone, PartialEq, Eq)]
enum SelectFrom {
    Front,
    Back,
}

/// Keeps the first or last `length` elements of every instance.
pub struct Selector {
    params: ParameterSet,
    length: usize,
    from: SelectFrom,
    input: BufferFormat,
    output: BufferFormat,
}

impl Default for Selector {
    fn default() -> Self {
        Selector {
            params: ParameterSet::new("Selector", SELECTOR_PARAMS),
            length: 12,
            from: SelectFrom::Front,
            input: BufferFormat::windowed_float(0, 0),
            output: BufferFormat::windowed_float(0, 0),
        }
    }
}

impl Transform for Selector {
    fn name(&self) -> &'static str {
        "Selector"
    }

    fn description(&self) -> &'static str {
        "Keeps the first or last elements of every instance"
    }

    fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "length" => {
                self.length = parse_param(self.name(), name, value)?;
                if self.length == 0 {
                    return invalid_value_error(self.name(), name, value);
                }
            }
            "from" => {
                self.from = match value {
                    "front" => SelectFrom::Front,
                    "back" => SelectFrom::Back,
                    _ => return invalid_value_error(self.name(), name, value),
                };
            }
            _ => (),
        }
        self.params.set(name, value)
    }

    fn bind_input_format(&mut self, format: &BufferFormat) -> Result<()> {
        if !format.kind().is_scalar_float() || format.length() < self.length {
            return incompatible_format_error(self.name(), &format.id());
        }
        self.input = format.clone();
        self.output = format.clone();
        self.output.set_length(self.length);
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
            let samples = input.instance_f32(index);
            let kept = match self.from {
                SelectFrom::Front => &samples[..self.length],
                SelectFrom::Back => &samples[samples.len() - self.length..],
            };
            output.instance_f32_mut(index).copy_from_slice(kept);
        }
        Ok(())
    }
}

impl RegisterableTransform for Selector {
    fn supported_transforms() -> &'static [TransformDescriptor] {
        &[support_transform!(
            Selector,
            "Selector",
            "Keeps the first or last elements of every instance"
        )]
    }
}

/// Pads every instance with zeros up to the next power of two.
pub struct ZeroPadding {
    params: ParameterSet,
    input: BufferFormat,
    output: BufferFormat,
}

impl Default for ZeroPadding {
    fn default() -> Self {
        ZeroPadding {
            params: ParameterSet::new("ZeroPadding", &[]),
            input: BufferFormat::windowed_float(0, 0),
            output: BufferFormat::windowed_float(0, 0),
        }
    }
}

impl Transform for ZeroPadding {
    fn name(&self) -> &'static str {
        "ZeroPadding"
    }

    fn description(&self) -> &'static str {
        "Pads every instance with zeros up to the next power of two"
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
        self.output.set_length(format.length().next_power_of_two());
        Ok(())
    }

    fn input_format(&self) -> &BufferFormat {
        &self.input
    }

    fn output_format(&self) -> &BufferFormat {
        &self.output
    }

    fn process(&mut self, input: &Buffers<'_>, output: &mut BuffersMut<'_>) -> Result<()> {
        let length = self.input.length();

        for index in 0..input.count() {
            let out = output.instance_f32_mut(index);
            out[..length].copy_from_slice(input.instance_f32(index));
            // Arena slots are reused across nodes, so the tail must be cleared on every call.
            out[length..].fill(0.0);
        }
        Ok(())
    }
}

impl RegisterableTransform for ZeroPadding {
    fn supported_transforms() -> &'static [TransformDescriptor] {
        &[support_transform!(
            ZeroPadding,
            "ZeroPadding",
            "Pads every instance with zeros up to the next power of two"
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run<T: Transform>(transform: &mut T, values: &[f32]) -> Vec<f32> {
        let input_bytes: &[u8] = bytemuck::cast_slice(values);
        let input = Buffers::new(transform.input_format().clone(), 1, input_bytes);

        let out_format = transform.output_format().clone();
        let mut storage = vec![0f32; out_format.size_in_bytes() / 4];
        let mut output = BuffersMut::new(out_format, 1, bytemuck::cast_slice_mut(&mut storage));

        transform.process(&input, &mut output).unwrap();
        output.as_buffers().instance_f32(0).to_vec()
    }

    #[test]
    fn verify_selector_front_and_back() {
        let format = BufferFormat::windowed_float(5, 8000);
        let values = [1.0f32, 2.0, 3.0, 4.0, 5.0];

        let mut selector = Selector::default();
        selector.set_parameter("length", "2").unwrap();
        selector.bind_input_format(&format).unwrap();
        assert_eq!(run(&mut selector, &values), vec![1.0, 2.0]);

        let mut selector = Selector::default();
        selector.set_parameter("length", "2").unwrap();
        selector.set_parameter("from", "back").unwrap();
        selector.bind_input_format(&format).unwrap();
        assert_eq!(run(&mut selector, &values), vec![4.0, 5.0]);
    }

    #[test]
    fn verify_selector_validation() {
        let mut selector = Selector::default();
        assert!(selector.set_parameter("from", "middle").is_err());
        assert!(selector.set_parameter("length", "0").is_err());

        selector.set_parameter("length", "32").unwrap();
        assert!(selector.bind_input_format(&BufferFormat::windowed_float(16, 8000)).is_err());
    }

    #[test]
    fn verify_zero_padding() {
        let format = BufferFormat::windowed_float(5, 8000);
        let mut padding = ZeroPadding::default();
        padding.bind_input_format(&format).unwrap();

        assert_eq!(padding.output_format().length(), 8);
        assert_eq!(
            run(&mut padding, &[1.0, 2.0, 3.0, 4.0, 5.0]),
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn verify_power_of_two_input_is_unchanged() {
        let format = BufferFormat::windowed_float(8, 8000);
        let mut padding = ZeroPadding::default();
        padding.bind_input_format(&format).unwrap();
        assert_eq!(padding.output_format().length(), 8);
    }
}
