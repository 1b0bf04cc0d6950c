// Cepstra
// Copyright (c) 2026 The Project Cepstra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `rdft` module implements the real discrete Fourier transform.
//!
//! The forward direction turns an instance of `N` real samples into `N/2 + 1` complex bins,
//! stored `re, im` interleaved as `N + 2` floats. The inverse direction consumes that layout,
//! reconstructs the negative frequencies by Hermitian symmetry, and emits `N` real samples scaled
//! by `1/N`, so a forward/inverse pair is the identity.

use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use cepstra_core::buffers::{Buffers, BuffersMut};
use cepstra_core::errors::{incompatible_format_error, CepstraError, Result};
use cepstra_core::formats::BufferFormat;
use cepstra_core::registry::{RegisterableTransform, TransformDescriptor};
use cepstra_core::support_transform;
use cepstra_core::transform::{parse_param, ParameterInfo, ParameterSet, Transform};

const RDFT_PARAMS: &[ParameterInfo] = &[ParameterInfo {
    name: "inverse",
    description: "run the inverse transform",
    default: "false",
}];

/// The real discrete Fourier transform, forward or inverse.
pub struct Rdft {
    params: ParameterSet,
    inverse: bool,
    /// Transform length on the real side.
    n: usize,
    plan: Option<Arc<dyn Fft<f32>>>,
    buf: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    input: BufferFormat,
    output: BufferFormat,
}

impl Default for Rdft {
    fn default() -> Self {
        Rdft {
            params: ParameterSet::new("RDFT", RDFT_PARAMS),
            inverse: false,
            n: 0,
            plan: None,
            buf: Vec::new(),
            scratch: Vec::new(),
            input: BufferFormat::windowed_float(0, 0),
            output: BufferFormat::windowed_float(0, 0),
        }
    }
}

impl Transform for Rdft {
    fn name(&self) -> &'static str {
        "RDFT"
    }

    fn description(&self) -> &'static str {
        "Calculates the real discrete Fourier transform"
    }

    fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> Result<()> {
        if name == "inverse" {
            self.inverse = parse_param(self.name(), name, value)?;
        }
        self.params.set(name, value)
    }

    fn bind_input_format(&mut self, format: &BufferFormat) -> Result<()> {
        if !format.kind().is_scalar_float() {
            return incompatible_format_error(self.name(), &format.id());
        }

        self.n = if self.inverse {
            // The interleaved complex layout always holds N + 2 floats for an even N.
            if format.length() < 4 {
                return incompatible_format_error(self.name(), &format.id());
            }
            format.length() - 2
        }
        else {
            format.length()
        };

        if self.n < 2 || self.n % 2 != 0 {
            return incompatible_format_error(self.name(), &format.id());
        }

        self.input = format.clone();
        self.output = format.clone();
        self.output.set_length(if self.inverse { self.n } else { self.n + 2 });
        Ok(())
    }

    fn input_format(&self) -> &BufferFormat {
        &self.input
    }

    fn output_format(&self) -> &BufferFormat {
        &self.output
    }

    fn initialize(&mut self) -> Result<()> {
        let mut planner = FftPlanner::new();
        let plan = if self.inverse {
            planner.plan_fft_inverse(self.n)
        }
        else {
            planner.plan_fft_forward(self.n)
        };

        self.buf = vec![Complex::new(0.0, 0.0); self.n];
        self.scratch = vec![Complex::new(0.0, 0.0); plan.get_inplace_scratch_len()];
        self.plan = Some(plan);
        Ok(())
    }

    fn process(&mut self, input: &Buffers<'_>, output: &mut BuffersMut<'_>) -> Result<()> {
        let plan = match &self.plan {
            Some(plan) => Arc::clone(plan),
            None => return Err(CepstraError::Other("RDFT was not initialized")),
        };
        let half = self.n / 2;

        for index in 0..input.count() {
            if self.inverse {
                let bins = input.instance_f32(index);
                for k in 0..=half {
                    self.buf[k] = Complex::new(bins[2 * k], bins[2 * k + 1]);
                }
                for k in 1..half {
                    self.buf[self.n - k] = self.buf[k].conj();
                }

                plan.process_with_scratch(&mut self.buf, &mut self.scratch);

                let scale = 1.0 / self.n as f32;
                for (out, bin) in output.instance_f32_mut(index).iter_mut().zip(&self.buf) {
                    *out = bin.re * scale;
                }
            }
            else {
                for (bin, &sample) in self.buf.iter_mut().zip(input.instance_f32(index)) {
                    *bin = Complex::new(sample, 0.0);
                }

                plan.process_with_scratch(&mut self.buf, &mut self.scratch);

                let out = output.instance_f32_mut(index);
                for k in 0..=half {
                    out[2 * k] = self.buf[k].re;
                    out[2 * k + 1] = self.buf[k].im;
                }
            }
        }

        Ok(())
    }
}

impl RegisterableTransform for Rdft {
    fn supported_transforms() -> &'static [TransformDescriptor] {
        &[support_transform!(Rdft, "RDFT", "Calculates the real discrete Fourier transform")]
    }
}
