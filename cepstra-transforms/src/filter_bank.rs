// Cepstra
// Copyright (c) 2026 The Project Cepstra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `filter_bank` module applies a bank of triangular mel-spaced filters to a spectrum.
//!
//! The input is one per-bin spectrum instance (energies or magnitudes) covering 0 Hz to the
//! Nyquist frequency; the output holds one accumulated value per filter. Filter centres are
//! equidistant on the mel scale, `mel = 1127 * ln(1 + f / 700)`.

use log::debug;

use cepstra_core::buffers::{Buffers, BuffersMut};
use cepstra_core::errors::{incompatible_format_error, invalid_value_error, Result};
use cepstra_core::formats::BufferFormat;
use cepstra_core::registry::{RegisterableTransform, TransformDescriptor};
use cepstra_core::support_transform;
use cepstra_core::transform::{parse_param, ParameterInfo, ParameterSet, Transform};

const FILTER_BANK_PARAMS: &[ParameterInfo] = &[
    ParameterInfo { name: "number", description: "number of filters", default: "32" },
    ParameterInfo {
        name: "frequency_min",
        description: "lower bound of the covered band in Hz",
        default: "130",
    },
    ParameterInfo {
        name: "frequency_max",
        description: "upper bound of the covered band in Hz",
        default: "6854",
    },
    ParameterInfo { name: "squared", description: "square the filter weights", default: "false" },
];

struct Filter {
    start: usize,
    weights: Vec<f32>,
}

/// A bank of triangular filters equidistant on the mel scale.
pub struct FilterBank {
    params: ParameterSet,
    number: usize,
    frequency_min: f64,
    frequency_max: f64,
    squared: bool,
    filters: Vec<Filter>,
    input: BufferFormat,
    output: BufferFormat,
}

impl Default for FilterBank {
    fn default() -> Self {
        FilterBank {
            params: ParameterSet::new("FilterBank", FILTER_BANK_PARAMS),
            number: 32,
            frequency_min: 130.0,
            frequency_max: 6854.0,
            squared: false,
            filters: Vec::new(),
            input: BufferFormat::windowed_float(0, 0),
            output: BufferFormat::windowed_float(0, 0),
        }
    }
}

fn mel(frequency: f64) -> f64 {
    1127.0 * (1.0 + frequency / 700.0).ln()
}

impl Transform for FilterBank {
    fn name(&self) -> &'static str {
        "FilterBank"
    }

    fn description(&self) -> &'static str {
        "Applies a bank of triangular mel-spaced filters to the spectrum"
    }

    fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "number" => {
                self.number = parse_param(self.name(), name, value)?;
                if self.number == 0 {
                    return invalid_value_error(self.name(), name, value);
                }
            }
            "frequency_min" => self.frequency_min = parse_param(self.name(), name, value)?,
            "frequency_max" => self.frequency_max = parse_param(self.name(), name, value)?,
            "squared" => self.squared = parse_param(self.name(), name, value)?,
            _ => (),
        }
        self.params.set(name, value)
    }

    fn bind_input_format(&mut self, format: &BufferFormat) -> Result<()> {
        let nyquist = f64::from(format.sample_rate()) / 2.0;

        if !format.kind().is_scalar_float()
            || format.length() < 2
            || format.sample_rate() == 0
            || self.frequency_min < 0.0
            || self.frequency_min >= self.frequency_max
            || self.frequency_max > nyquist
        {
            return incompatible_format_error(self.name(), &format.id());
        }

        self.input = format.clone();
        self.output = format.clone();
        self.output.set_length(self.number);
        Ok(())
    }

    fn input_format(&self) -> &BufferFormat {
        &self.input
    }

    fn output_format(&self) -> &BufferFormat {
        &self.output
    }

    fn initialize(&mut self) -> Result<()> {
        let bins = self.input.length();
        let nyquist = f64::from(self.input.sample_rate()) / 2.0;

        // Filter edge positions: number + 2 points equidistant in mel, mapped back to
        // (fractional) spectrum bins.
        let mel_lo = mel(self.frequency_min);
        let mel_hi = mel(self.frequency_max);
        let edges: Vec<f64> = (0..self.number + 2)
            .map(|i| {
                let m = mel_lo + (mel_hi - mel_lo) * i as f64 / (self.number + 1) as f64;
                let frequency = 700.0 * ((m / 1127.0).exp() - 1.0);
                frequency / nyquist * (bins - 1) as f64
            })
            .collect();

        self.filters = edges
            .windows(3)
            .map(|edge| {
                let (left, centre, right) = (edge[0], edge[1], edge[2]);
                let start = left.ceil() as usize;
                let end = (right.floor() as usize).min(bins - 1);

                let weights = (start..=end)
                    .map(|bin| {
                        let bin = bin as f64;
                        let weight = if bin <= centre {
                            (bin - left) / (centre - left).max(1e-3)
                        }
                        else {
                            (right - bin) / (right - centre).max(1e-3)
                        };
                        let weight = weight.clamp(0.0, 1.0);
                        (if self.squared { weight * weight } else { weight }) as f32
                    })
                    .collect();

                Filter { start, weights }
            })
            .collect();

        debug!(
            "{} mel filters over {} bins, {:.0} Hz to {:.0} Hz",
            self.number, bins, self.frequency_min, self.frequency_max
        );
        Ok(())
    }

    fn process(&mut self, input: &Buffers<'_>, output: &mut BuffersMut<'_>) -> Result<()> {
        for index in 0..input.count() {
            let spectrum = input.instance_f32(index);
            for (out, filter) in output.instance_f32_mut(index).iter_mut().zip(&self.filters) {
                *out = filter
                    .weights
                    .iter()
                    .zip(&spectrum[filter.start..])
                    .map(|(&weight, &bin)| weight * bin)
                    .sum();
            }
        }
        Ok(())
    }
}

impl RegisterableTransform for FilterBank {
    fn supported_transforms() -> &'static [TransformDescriptor] {
        &[support_transform!(
            FilterBank,
            "FilterBank",
            "Applies a bank of triangular mel-spaced filters to the spectrum"
        )]
    }
}
