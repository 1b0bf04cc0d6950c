// Cepstra
// Copyright (c) 2026 The Project Cepstra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `dwpt` module implements the discrete wavelet packet transform and the subband energies
//! derived from it.
//!
//! A wavelet packet tree is described by the depths of its leaves, left to right; e.g. `1,2,2`
//! splits the signal once and splits the high half again. Each split convolves with the
//! quadrature mirror pair of a Daubechies filter (periodic extension) and downsamples by two.
//! Leaf coefficients are concatenated in description order, so the output length equals the input
//! length. `SubbandEnergy` consumes that layout and must agree with the producing `DWPT` on the
//! tree description, which it therefore inherits as a dependency parameter.

use cepstra_core::buffers::{Buffers, BuffersMut};
use cepstra_core::errors::{incompatible_format_error, invalid_value_error, Result};
use cepstra_core::formats::BufferFormat;
use cepstra_core::registry::{RegisterableTransform, TransformDescriptor};
use cepstra_core::support_transform;
use cepstra_core::transform::{
    parse_param, DependencyParameter, ParameterInfo, ParameterSet, Transform,
};

/// The default tree splits the band into 24 subbands, denser towards the low frequencies.
const DEFAULT_TREE: &str = "3,3,3,4,4,4,5,5,5,5,5,5,5,5,5,5,6,6,6,6,6,6,6,6";

fn default_tree() -> Vec<u32> {
    vec![3, 3, 3, 4, 4, 4, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 6, 6, 6, 6, 6, 6, 6, 6]
}

/// Parses a leaf-depth tree description, validating that the depths read left to right form a
/// complete binary tree.
fn parse_description(transform: &str, name: &str, value: &str) -> Result<Vec<u32>> {
    let mut depths = Vec::new();

    for token in value.split(',') {
        let depth: u32 = parse_param(transform, name, token.trim())?;
        if depth == 0 || depth > 16 {
            return invalid_value_error(transform, name, value);
        }
        depths.push(depth);
    }

    // Collapse sibling leaves bottom-up; a complete tree reduces to a single depth-0 node.
    let mut stack: Vec<u32> = Vec::new();
    for &depth in &depths {
        stack.push(depth);
        while stack.len() >= 2 && stack[stack.len() - 1] == stack[stack.len() - 2] {
            let merged = stack[stack.len() - 1] - 1;
            stack.truncate(stack.len() - 2);
            stack.push(merged);
        }
    }
    if stack != [0] {
        return invalid_value_error(transform, name, value);
    }

    Ok(depths)
}

fn max_depth(tree: &[u32]) -> u32 {
    tree.iter().copied().max().unwrap_or(0)
}

/// Gets the scaling (lowpass) coefficients of the Daubechies filter with `order` taps.
fn daubechies_filter(order: usize) -> Option<Vec<f32>> {
    match order {
        2 => Some(vec![std::f32::consts::FRAC_1_SQRT_2, std::f32::consts::FRAC_1_SQRT_2]),
        4 => {
            let sqrt3 = 3.0f64.sqrt();
            let norm = 4.0 * 2.0f64.sqrt();
            Some(
                [1.0 + sqrt3, 3.0 + sqrt3, 3.0 - sqrt3, 1.0 - sqrt3]
                    .iter()
                    .map(|&c| (c / norm) as f32)
                    .collect(),
            )
        }
        8 => Some(vec![
            0.23037781330885523,
            0.7148465705525415,
            0.6308807679295904,
            -0.02798376941698385,
            -0.18703481171888114,
            0.030841381835986965,
            0.032883011666982945,
            -0.010597401784997278,
        ]),
        _ => None,
    }
}

const DWPT_PARAMS: &[ParameterInfo] = &[
    ParameterInfo {
        name: "tree",
        description: "leaf depths of the wavelet packet tree, left to right",
        default: DEFAULT_TREE,
    },
    ParameterInfo { name: "type", description: "wavelet family", default: "daubechies" },
    ParameterInfo { name: "order", description: "number of filter taps (2, 4 or 8)", default: "8" },
];

/// The discrete wavelet packet transform.
pub struct Dwpt {
    params: ParameterSet,
    tree: Vec<u32>,
    order: usize,
    low: Vec<f32>,
    high: Vec<f32>,
    input: BufferFormat,
    output: BufferFormat,
}

impl Default for Dwpt {
    fn default() -> Self {
        Dwpt {
            params: ParameterSet::new("DWPT", DWPT_PARAMS),
            tree: default_tree(),
            order: 8,
            low: Vec::new(),
            high: Vec::new(),
            input: BufferFormat::windowed_float(0, 0),
            output: BufferFormat::windowed_float(0, 0),
        }
    }
}

impl Dwpt {
    /// One analysis split: periodic convolution with the filter pair, downsampled by two.
    fn split(&self, signal: &[f32]) -> (Vec<f32>, Vec<f32>) {
        let n = signal.len();
        let half = n / 2;
        let mut low = vec![0.0; half];
        let mut high = vec![0.0; half];

        for k in 0..half {
            let (mut l, mut h) = (0.0f32, 0.0f32);
            for (j, (&lo, &hi)) in self.low.iter().zip(&self.high).enumerate() {
                let x = signal[(2 * k + j) % n];
                l += lo * x;
                h += hi * x;
            }
            low[k] = l;
            high[k] = h;
        }

        (low, high)
    }

    /// Descends the packet tree, emitting leaf coefficients in description order.
    fn walk(
        &self,
        signal: Vec<f32>,
        depth: u32,
        position: &mut usize,
        out: &mut [f32],
        cursor: &mut usize,
    ) {
        if *position < self.tree.len() && self.tree[*position] == depth {
            out[*cursor..*cursor + signal.len()].copy_from_slice(&signal);
            *cursor += signal.len();
            *position += 1;
            return;
        }

        let (low, high) = self.split(&signal);
        self.walk(low, depth + 1, position, out, cursor);
        self.walk(high, depth + 1, position, out, cursor);
    }
}

impl Transform for Dwpt {
    fn name(&self) -> &'static str {
        "DWPT"
    }

    fn description(&self) -> &'static str {
        "Calculates the discrete wavelet packet transform"
    }

    fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "tree" => self.tree = parse_description(self.name(), name, value)?,
            "type" => {
                if value != "daubechies" {
                    return invalid_value_error(self.name(), name, value);
                }
            }
            "order" => {
                let order = parse_param(self.name(), name, value)?;
                if daubechies_filter(order).is_none() {
                    return invalid_value_error(self.name(), name, value);
                }
                self.order = order;
            }
            _ => (),
        }
        self.params.set(name, value)
    }

    fn bind_input_format(&mut self, format: &BufferFormat) -> Result<()> {
        let depth = max_depth(&self.tree);
        let divisor = 1usize << depth;

        if !format.kind().is_scalar_float()
            || format.length() < divisor
            || format.length() % divisor != 0
        {
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
        let low = match daubechies_filter(self.order) {
            Some(low) => low,
            None => return invalid_value_error(self.name(), "order", &self.order.to_string()),
        };

        // Quadrature mirror: g[j] = (-1)^j h[L - 1 - j].
        let taps = low.len();
        self.high = (0..taps)
            .map(|j| {
                let sign = if j % 2 == 0 { 1.0 } else { -1.0 };
                sign * low[taps - 1 - j]
            })
            .collect();
        self.low = low;
        Ok(())
    }

    fn process(&mut self, input: &Buffers<'_>, output: &mut BuffersMut<'_>) -> Result<()> {
        for index in 0..input.count() {
            let signal = input.instance_f32(index).to_vec();
            let out = output.instance_f32_mut(index);

            let mut position = 0;
            let mut cursor = 0;
            self.walk(signal, 0, &mut position, out, &mut cursor);
        }
        Ok(())
    }
}

impl RegisterableTransform for Dwpt {
    fn supported_transforms() -> &'static [TransformDescriptor] {
        &[support_transform!(Dwpt, "DWPT", "Calculates the discrete wavelet packet transform")]
    }
}

const SUBBAND_ENERGY_PARAMS: &[ParameterInfo] = &[ParameterInfo {
    name: "tree",
    description: "leaf depths of the wavelet packet tree the coefficients came from",
    default: DEFAULT_TREE,
}];

const SUBBAND_ENERGY_DEPS: &[DependencyParameter] =
    &[DependencyParameter { transform: "DWPT", parameter: "tree" }];

/// Calculates the mean-square energy of each wavelet subband.
pub struct SubbandEnergy {
    params: ParameterSet,
    tree: Vec<u32>,
    bands: Vec<(usize, usize)>,
    input: BufferFormat,
    output: BufferFormat,
}

impl Default for SubbandEnergy {
    fn default() -> Self {
        SubbandEnergy {
            params: ParameterSet::new("SubbandEnergy", SUBBAND_ENERGY_PARAMS),
            tree: default_tree(),
            bands: Vec::new(),
            input: BufferFormat::windowed_float(0, 0),
            output: BufferFormat::windowed_float(0, 0),
        }
    }
}

impl Transform for SubbandEnergy {
    fn name(&self) -> &'static str {
        "SubbandEnergy"
    }

    fn description(&self) -> &'static str {
        "Calculates the mean-square energy of each wavelet subband"
    }

    fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> Result<()> {
        if name == "tree" {
            self.tree = parse_description(self.name(), name, value)?;
        }
        self.params.set(name, value)
    }

    fn dependencies(&self) -> &'static [DependencyParameter] {
        SUBBAND_ENERGY_DEPS
    }

    fn bind_input_format(&mut self, format: &BufferFormat) -> Result<()> {
        let depth = max_depth(&self.tree);
        let divisor = 1usize << depth;

        if !format.kind().is_scalar_float()
            || format.length() < divisor
            || format.length() % divisor != 0
        {
            return incompatible_format_error(self.name(), &format.id());
        }

        self.input = format.clone();
        self.output = format.clone();
        self.output.set_length(self.tree.len());
        Ok(())
    }

    fn input_format(&self) -> &BufferFormat {
        &self.input
    }

    fn output_format(&self) -> &BufferFormat {
        &self.output
    }

    fn initialize(&mut self) -> Result<()> {
        let length = self.input.length();

        self.bands.clear();
        let mut offset = 0;
        for &depth in &self.tree {
            let width = length >> depth;
            self.bands.push((offset, width));
            offset += width;
        }
        Ok(())
    }

    fn process(&mut self, input: &Buffers<'_>, output: &mut BuffersMut<'_>) -> Result<()> {
        for index in 0..input.count() {
            let coefficients = input.instance_f32(index);
            for (out, &(offset, width)) in
                output.instance_f32_mut(index).iter_mut().zip(&self.bands)
            {
                let band = &coefficients[offset..offset + width];
                *out = band.iter().map(|&c| c * c).sum::<f32>() / width as f32;
            }
        }
        Ok(())
    }
}

impl RegisterableTransform for SubbandEnergy {
    fn supported_transforms() -> &'static [TransformDescriptor] {
        &[support_transform!(
            SubbandEnergy,
            "SubbandEnergy",
            "Calculates the mean-square energy of each wavelet subband"
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_description_parsing() {
        assert_eq!(parse_description("DWPT", "tree", "1,1").unwrap(), vec![1, 1]);
        assert_eq!(parse_description("DWPT", "tree", DEFAULT_TREE).unwrap(), default_tree());
        assert_eq!(parse_description("DWPT", "tree", "1, 2, 2").unwrap(), vec![1, 2, 2]);

        // Depths out of order, incomplete trees, and zero depths are rejected.
        assert!(parse_description("DWPT", "tree", "2,1,2").is_err());
        assert!(parse_description("DWPT", "tree", "1,2").is_err());
        assert!(parse_description("DWPT", "tree", "0").is_err());
        assert!(parse_description("DWPT", "tree", "1,x").is_err());
    }

    fn run_dwpt(dwpt: &mut Dwpt, signal: &[f32]) -> Vec<f32> {
        let format = BufferFormat::windowed_float(signal.len(), 8000);
        dwpt.bind_input_format(&format).unwrap();
        dwpt.initialize().unwrap();

        let input_bytes: &[u8] = bytemuck::cast_slice(signal);
        let input = Buffers::new(format.clone(), 1, input_bytes);

        let mut storage = vec![0f32; signal.len()];
        let mut output = BuffersMut::new(format, 1, bytemuck::cast_slice_mut(&mut storage));

        dwpt.process(&input, &mut output).unwrap();
        output.as_buffers().instance_f32(0).to_vec()
    }

    #[test]
    fn verify_haar_split() {
        let mut dwpt = Dwpt::default();
        dwpt.set_parameter("tree", "1,1").unwrap();
        dwpt.set_parameter("order", "2").unwrap();

        let out = run_dwpt(&mut dwpt, &[1.0, 1.0, 2.0, 2.0]);

        let sqrt2 = std::f32::consts::SQRT_2;
        let expected = [sqrt2, 2.0 * sqrt2, 0.0, 0.0];
        for (actual, expected) in out.iter().zip(&expected) {
            assert!((actual - expected).abs() < 1e-5, "{} != {}", actual, expected);
        }
    }

    #[test]
    fn verify_energy_is_preserved() {
        // Orthogonal filters with periodic extension preserve the signal energy at every split.
        let signal: Vec<f32> = (0..64).map(|i| ((i * 37 + 11) % 23) as f32 / 7.0 - 1.5).collect();
        let input_energy: f32 = signal.iter().map(|&x| x * x).sum();

        for order in [2, 4, 8] {
            let mut dwpt = Dwpt::default();
            dwpt.set_parameter("order", &order.to_string()).unwrap();

            let out = run_dwpt(&mut dwpt, &signal);
            let output_energy: f32 = out.iter().map(|&x| x * x).sum();

            assert!(
                (output_energy - input_energy).abs() / input_energy < 1e-3,
                "order {}: {} != {}",
                order,
                output_energy,
                input_energy
            );
        }
    }

    #[test]
    fn verify_filters_are_normalized() {
        for order in [2, 4, 8] {
            let low = daubechies_filter(order).unwrap();
            let sum: f64 = low.iter().map(|&c| f64::from(c)).sum();
            let energy: f64 = low.iter().map(|&c| f64::from(c) * f64::from(c)).sum();

            assert!((sum - std::f64::consts::SQRT_2).abs() < 1e-6);
            assert!((energy - 1.0).abs() < 1e-6);
        }
        assert!(daubechies_filter(6).is_none());
    }

    #[test]
    fn verify_dwpt_validation() {
        let mut dwpt = Dwpt::default();
        assert!(dwpt.set_parameter("type", "coiflet").is_err());
        assert!(dwpt.set_parameter("order", "6").is_err());

        // The default tree is 6 levels deep; the length must divide by 64.
        assert!(dwpt.bind_input_format(&BufferFormat::windowed_float(96, 8000)).is_err());
        assert!(dwpt.bind_input_format(&BufferFormat::windowed_float(128, 8000)).is_ok());
    }

    #[test]
    fn verify_subband_energies() {
        let format = BufferFormat::windowed_float(4, 8000);
        let mut energy = SubbandEnergy::default();
        energy.set_parameter("tree", "1,1").unwrap();
        energy.bind_input_format(&format).unwrap();
        energy.initialize().unwrap();

        assert_eq!(energy.output_format().length(), 2);

        let coefficients = [1.0f32, 2.0, 3.0, 4.0];
        let input_bytes: &[u8] = bytemuck::cast_slice(&coefficients);
        let input = Buffers::new(format, 1, input_bytes);

        let mut storage = vec![0f32; 2];
        let mut output = BuffersMut::new(
            energy.output_format().clone(),
            1,
            bytemuck::cast_slice_mut(&mut storage),
        );

        energy.process(&input, &mut output).unwrap();
        assert_eq!(output.as_buffers().instance_f32(0), &[2.5, 12.5]);
    }
}
