// Cepstra
// Copyright (c) 2026 The Project Cepstra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `window` module splits a raw signal into overlapping, weighted windows.

use std::f64;

use cepstra_core::buffers::{Buffers, BuffersMut};
use cepstra_core::errors::{incompatible_format_error, invalid_value_error, Result};
use cepstra_core::formats::{BufferFormat, ElementKind};
use cepstra_core::registry::{RegisterableTransform, TransformDescriptor};
use cepstra_core::support_transform;
use cepstra_core::transform::{
    parse_param, BuffersCountChange, ParameterInfo, ParameterSet, Transform,
};

/// The supported window functions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WindowType {
    Rectangular,
    Hamming,
    Hanning,
    Blackman,
    /// The falling half of a Hanning window; 1 at the left edge, 0 at the right.
    HalfHanningRight,
}

impl WindowType {
    fn parse(token: &str) -> Option<WindowType> {
        match token {
            "rectangular" => Some(WindowType::Rectangular),
            "hamming" => Some(WindowType::Hamming),
            "hanning" => Some(WindowType::Hanning),
            "blackman" => Some(WindowType::Blackman),
            "half-hanning-right" => Some(WindowType::HalfHanningRight),
            _ => None,
        }
    }
}

/// Computes the `index`-th element of a window function of the given length.
pub fn window_element(window: WindowType, length: usize, index: usize) -> f32 {
    if length < 2 {
        return 1.0;
    }

    // All the cosine windows below are defined over [0, 1] in units of i / (N - 1).
    let x = index as f64 / (length - 1) as f64;

    let value = match window {
        WindowType::Rectangular => 1.0,
        WindowType::Hamming => 0.54 - 0.46 * (2.0 * f64::consts::PI * x).cos(),
        WindowType::Hanning => 0.5 - 0.5 * (2.0 * f64::consts::PI * x).cos(),
        WindowType::Blackman => {
            0.42 - 0.5 * (2.0 * f64::consts::PI * x).cos()
                + 0.08 * (4.0 * f64::consts::PI * x).cos()
        }
        WindowType::HalfHanningRight => 0.5 * (1.0 + (f64::consts::PI * x).cos()),
    };

    value as f32
}

const WINDOW_PARAMS: &[ParameterInfo] = &[
    ParameterInfo { name: "length", description: "window length in samples", default: "512" },
    ParameterInfo {
        name: "step",
        description: "hop between consecutive windows in samples (0 = half the window length)",
        default: "0",
    },
    ParameterInfo { name: "type", description: "window function", default: "hamming" },
];

/// Splits each raw input instance into overlapping windows, converting the samples to floats and
/// weighting them by the window function. The instance count multiplies by the number of windows.
pub struct Window {
    params: ParameterSet,
    length: usize,
    step: usize,
    window: WindowType,
    windows: usize,
    table: Vec<f32>,
    input: BufferFormat,
    output: BufferFormat,
}

impl Default for Window {
    fn default() -> Self {
        Window {
            params: ParameterSet::new("Window", WINDOW_PARAMS),
            length: 512,
            step: 0,
            window: WindowType::Hamming,
            windows: 0,
            table: Vec::new(),
            input: BufferFormat::raw_int16(0, 0),
            output: BufferFormat::windowed_float(0, 0),
        }
    }
}

impl Window {
    fn effective_step(&self) -> usize {
        if self.step == 0 {
            self.length / 2
        }
        else {
            self.step
        }
    }
}

impl Transform for Window {
    fn name(&self) -> &'static str {
        "Window"
    }

    fn description(&self) -> &'static str {
        "Splits the raw signal into overlapping windows weighted by a window function"
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
            "step" => self.step = parse_param(self.name(), name, value)?,
            "type" => {
                self.window = match WindowType::parse(value) {
                    Some(window) => window,
                    None => return invalid_value_error(self.name(), name, value),
                };
            }
            _ => (),
        }
        self.params.set(name, value)
    }

    fn bind_input_format(&mut self, format: &BufferFormat) -> Result<()> {
        let raw = matches!(format.kind(), ElementKind::Int16 | ElementKind::Float32);
        if !raw || format.length() < self.length {
            return incompatible_format_error(self.name(), &format.id());
        }

        self.windows = (format.length() - self.length) / self.effective_step() + 1;
        self.input = format.clone();
        self.output = BufferFormat::windowed_float(self.length, format.sample_rate());
        Ok(())
    }

    fn input_format(&self) -> &BufferFormat {
        &self.input
    }

    fn output_format(&self) -> &BufferFormat {
        &self.output
    }

    fn buffers_count_change(&self) -> BuffersCountChange {
        BuffersCountChange::Multiply(self.windows)
    }

    fn initialize(&mut self) -> Result<()> {
        self.table =
            (0..self.length).map(|i| window_element(self.window, self.length, i)).collect();
        Ok(())
    }

    fn process(&mut self, input: &Buffers<'_>, output: &mut BuffersMut<'_>) -> Result<()> {
        let step = self.effective_step();
        let int_input = self.input.kind() == ElementKind::Int16;

        for index in 0..input.count() {
            for window in 0..self.windows {
                let start = window * step;
                let out = output.instance_f32_mut(index * self.windows + window);

                if int_input {
                    let samples = &input.instance_i16(index)[start..start + self.length];
                    for ((out, &sample), &weight) in
                        out.iter_mut().zip(samples).zip(self.table.iter())
                    {
                        *out = f32::from(sample) * weight;
                    }
                }
                else {
                    let samples = &input.instance_f32(index)[start..start + self.length];
                    for ((out, &sample), &weight) in
                        out.iter_mut().zip(samples).zip(self.table.iter())
                    {
                        *out = sample * weight;
                    }
                }
            }
        }

        Ok(())
    }
}

impl RegisterableTransform for Window {
    fn supported_transforms() -> &'static [TransformDescriptor] {
        &[support_transform!(
            Window,
            "Window",
            "Splits the raw signal into overlapping windows weighted by a window function"
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn assert_window(window: WindowType, expected: &[f32]) {
        for (i, &value) in expected.iter().enumerate() {
            let actual = window_element(window, expected.len(), i);
            assert!(
                (actual - value).abs() < EPSILON,
                "{:?}[{}/{}]: {} != {}",
                window,
                i,
                expected.len(),
                actual,
                value
            );
        }
    }

    #[test]
    fn verify_rectangular() {
        assert_eq!(window_element(WindowType::Rectangular, 4, 0), 1.0);
        assert_eq!(window_element(WindowType::Rectangular, 5, 2), 1.0);
        assert_eq!(window_element(WindowType::Rectangular, 10, 8), 1.0);
    }

    #[test]
    fn verify_hamming() {
        assert_window(WindowType::Hamming, &[0.0800, 0.7700, 0.7700, 0.0800]);
        assert_window(WindowType::Hamming, &[0.0800, 0.5400, 1.0000, 0.5400, 0.0800]);
        assert_window(
            WindowType::Hamming,
            &[
                0.0800, 0.1077, 0.1876, 0.3100, 0.4601, 0.6199, 0.7700, 0.8924, 0.9723, 1.0000,
                0.9723, 0.8924, 0.7700, 0.6199, 0.4601, 0.3100, 0.1876, 0.1077, 0.0800,
            ],
        );
        assert_window(
            WindowType::Hamming,
            &[
                0.0800, 0.1049, 0.1770, 0.2884, 0.4271, 0.5780, 0.7248, 0.8515, 0.9446, 0.9937,
                0.9937, 0.9446, 0.8515, 0.7248, 0.5780, 0.4271, 0.2884, 0.1770, 0.1049, 0.0800,
            ],
        );
    }

    #[test]
    fn verify_hanning() {
        assert_window(WindowType::Hanning, &[0.0, 0.7500, 0.7500, 0.0]);
        assert_window(WindowType::Hanning, &[0.0, 0.5000, 1.0000, 0.5000, 0.0]);
        assert_window(
            WindowType::Hanning,
            &[
                0.0000, 0.0301, 0.1169, 0.2500, 0.4131, 0.5868, 0.7500, 0.8830, 0.9698, 1.0000,
                0.9698, 0.8830, 0.7500, 0.5868, 0.4131, 0.2500, 0.1169, 0.0301, 0.0000,
            ],
        );
    }

    #[test]
    fn verify_half_hanning_right() {
        assert_window(WindowType::HalfHanningRight, &[1.0000, 0.7500, 0.2500, 0.0000]);
        assert_window(WindowType::HalfHanningRight, &[1.0000, 0.8535, 0.5000, 0.1464, 0.0000]);
        assert_window(
            WindowType::HalfHanningRight,
            &[
                1.0000, 0.9931, 0.9729, 0.9397, 0.8945, 0.8386, 0.7734, 0.7008, 0.6227, 0.5412,
                0.4587, 0.3772, 0.2991, 0.2265, 0.1613, 0.1054, 0.0602, 0.0270, 0.0068, 0.0000,
            ],
        );
    }

    #[test]
    fn verify_blackman() {
        assert_window(
            WindowType::Blackman,
            &[
                0.0, 0.0102, 0.0451, 0.1144, 0.2269, 0.3824, 0.5667, 0.7520, 0.9035, 0.9888,
                0.9888, 0.9035, 0.7520, 0.5667, 0.3824, 0.2269, 0.1144, 0.0451, 0.0102, 0.0,
            ],
        );
    }

    #[test]
    fn verify_windowing() {
        let mut window = Window::default();
        window.set_parameter("length", "4").unwrap();
        window.set_parameter("step", "2").unwrap();
        window.set_parameter("type", "rectangular").unwrap();
        window.bind_input_format(&BufferFormat::raw_int16(8, 8000)).unwrap();
        window.initialize().unwrap();

        assert_eq!(window.buffers_count_change(), BuffersCountChange::Multiply(3));
        assert_eq!(window.output_format(), &BufferFormat::windowed_float(4, 8000));

        let samples: [i16; 8] = [1, 2, 3, 4, 5, 6, 7, 8];
        let input_bytes: &[u8] = bytemuck::cast_slice(&samples);
        let input = Buffers::new(BufferFormat::raw_int16(8, 8000), 1, input_bytes);

        let mut storage = vec![0f32; 12];
        let mut output = BuffersMut::new(
            BufferFormat::windowed_float(4, 8000),
            3,
            bytemuck::cast_slice_mut(&mut storage),
        );

        window.process(&input, &mut output).unwrap();

        assert_eq!(output.as_buffers().instance_f32(0), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(output.as_buffers().instance_f32(1), &[3.0, 4.0, 5.0, 6.0]);
        assert_eq!(output.as_buffers().instance_f32(2), &[5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn verify_parameter_errors() {
        let mut window = Window::default();
        assert!(window.set_parameter("type", "triangular").is_err());
        assert!(window.set_parameter("length", "0").is_err());
        assert!(window.set_parameter("width", "3").is_err());
    }

    #[test]
    fn verify_short_input_is_rejected() {
        let mut window = Window::default();
        window.set_parameter("length", "512").unwrap();
        assert!(window.bind_input_format(&BufferFormat::raw_int16(100, 8000)).is_err());
        assert!(window.bind_input_format(&BufferFormat::windowed_float(1024, 8000)).is_err());
    }
}
