//! Population count of the bitwise AND of a filter and a query mask.
//!
//! [`MaskedPopcount`] evaluates `popcount(filter & mask)` over the first
//! `num_bits` bits of both buffers, either by offloading the work to an
//! [`OffloadDevice`] or with portable word-at-a-time code. Both paths give the
//! same count for the same input.

use std::{fmt, str::FromStr};

use crate::offload::{JobStatus, OffloadDevice, OffloadJob, SimdDevice};
use crate::{Error, Result};

/// Requested execution path, as configured by the user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Always use the accelerator; fail when it is unavailable or a job fails.
    Hardware,
    /// Always use the portable implementation.
    Software,
    /// Use the accelerator when it probes successfully, and fall back to
    /// software whenever it fails.
    #[default]
    Auto,
}

impl ExecutionMode {
    /// Environment variable read by [`ExecutionMode::from_env`].
    pub const ENV: &'static str = "NTHASH_FILTER_EXECUTION_PATH";

    /// Read the mode from `NTHASH_FILTER_EXECUTION_PATH`, defaulting to `auto` when unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var(Self::ENV) {
            Ok(value) => value.parse(),
            Err(_) => Ok(Self::default()),
        }
    }
}

impl FromStr for ExecutionMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hardware" | "hw" => Ok(Self::Hardware),
            "software" | "sw" => Ok(Self::Software),
            "auto" => Ok(Self::Auto),
            _ => Err(Error::UnknownExecutionPath(s.to_string())),
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hardware => "hardware",
            Self::Software => "software",
            Self::Auto => "auto",
        })
    }
}

/// The path an engine actually runs on, fixed at construction.
#[derive(Clone, Debug)]
pub enum ExecutionPath<D = SimdDevice> {
    Hardware(D),
    Software,
}

/// Portable AND-popcount over the first `num_bits` bits of `filter` and `mask`.
///
/// When `out` is given, the AND is written to its first `ceil(num_bits / 8)` bytes,
/// with bits past `num_bits` cleared.
/// Panics when any buffer is shorter than that.
pub fn and_popcount(filter: &[u8], mask: &[u8], num_bits: u32, mut out: Option<&mut [u8]>) -> u32 {
    let num_bits = num_bits as usize;
    let whole = num_bits / 8;
    let words = whole / 8 * 8;

    let mut sum = 0;
    for i in (0..words).step_by(8) {
        let a = u64::from_le_bytes(std::array::from_fn(|j| filter[i + j]));
        let b = u64::from_le_bytes(std::array::from_fn(|j| mask[i + j]));
        let and = a & b;
        sum += and.count_ones();
        if let Some(out) = out.as_deref_mut() {
            out[i..i + 8].copy_from_slice(&and.to_le_bytes());
        }
    }
    for i in words..whole {
        let and = filter[i] & mask[i];
        sum += and.count_ones();
        if let Some(out) = out.as_deref_mut() {
            out[i] = and;
        }
    }
    if num_bits % 8 != 0 {
        let and = filter[whole] & mask[whole] & ((1 << (num_bits % 8)) - 1);
        sum += and.count_ones();
        if let Some(out) = out.as_deref_mut() {
            out[whole] = and;
        }
    }
    sum
}

/// Run one select job on `device`.
///
/// The job working memory is allocated here and dropped before returning, on success and failure alike.
fn offload_and_popcount<D: OffloadDevice>(
    device: &D,
    filter: &[u8],
    mask: &[u8],
    num_bits: u32,
    out: Option<&mut [u8]>,
) -> Result<u32> {
    let job_size = device.job_size().map_err(Error::OffloadInit)?;
    let mut job_buffer = vec![0u8; job_size];
    let mut job = OffloadJob::select(filter, mask, num_bits, out);
    match device.execute(&mut job, &mut job_buffer) {
        JobStatus::Ok => Ok(job.sum_value),
        status => Err(Error::OffloadExecution(status)),
    }
}

/// Computes `popcount(filter & mask)`, on an accelerator or in software.
///
/// The engine holds no mutable state; concurrent `evaluate` calls are independent.
#[derive(Clone, Debug)]
pub struct MaskedPopcount<D = SimdDevice> {
    path: ExecutionPath<D>,
    /// Retry failed accelerator jobs in software.
    fallback: bool,
}

impl MaskedPopcount<SimdDevice> {
    /// Build an engine for `mode`, probing the built-in [`SimdDevice`].
    pub fn new(mode: ExecutionMode) -> Result<Self> {
        Self::with_device(mode, SimdDevice::probe())
    }

    /// Build an engine for the mode configured in the environment.
    pub fn from_env() -> Result<Self> {
        Self::new(ExecutionMode::from_env()?)
    }
}

impl<D: OffloadDevice> MaskedPopcount<D> {
    /// Build an engine for `mode`, given the outcome of probing `D`.
    ///
    /// `Hardware` fails when the probe failed; `Auto` then uses software instead.
    pub fn with_device(mode: ExecutionMode, probe: std::result::Result<D, JobStatus>) -> Result<Self> {
        match (mode, probe) {
            (ExecutionMode::Software, _) => Ok(Self::software()),
            (ExecutionMode::Hardware, probe) => {
                let device = probe.map_err(Error::OffloadInit)?;
                log::info!("AND-popcount runs on the {} accelerator", device.name());
                Ok(Self {
                    path: ExecutionPath::Hardware(device),
                    fallback: false,
                })
            }
            (ExecutionMode::Auto, Ok(device)) => {
                log::info!(
                    "AND-popcount runs on the {} accelerator with software fallback",
                    device.name()
                );
                Ok(Self {
                    path: ExecutionPath::Hardware(device),
                    fallback: true,
                })
            }
            (ExecutionMode::Auto, Err(status)) => {
                log::info!("Accelerator unavailable ({status}), AND-popcount runs in software");
                Ok(Self::software())
            }
        }
    }

    /// An engine that always runs in software.
    pub fn software() -> Self {
        Self {
            path: ExecutionPath::Software,
            fallback: false,
        }
    }

    pub fn path(&self) -> &ExecutionPath<D> {
        &self.path
    }

    pub fn is_accelerated(&self) -> bool {
        matches!(self.path, ExecutionPath::Hardware(_))
    }

    /// Population count of `filter & mask` over the first `num_bits` bits,
    /// optionally writing the AND to `out`.
    ///
    /// Buffers shorter than `ceil(num_bits / 8)` bytes are rejected.
    /// On the hardware path without fallback, a failed job is an error and
    /// its count must not be used; retry with [`and_popcount`].
    pub fn evaluate(
        &self,
        filter: &[u8],
        mask: &[u8],
        num_bits: u32,
        mut out: Option<&mut [u8]>,
    ) -> Result<u32> {
        let needed = (num_bits as usize).div_ceil(8);
        let out_len = out.as_ref().map(|out| out.len());
        for got in [filter.len(), mask.len()].into_iter().chain(out_len) {
            if got < needed {
                return Err(Error::BufferTooShort {
                    needed,
                    got,
                    num_bits,
                });
            }
        }

        match &self.path {
            ExecutionPath::Software => Ok(and_popcount(filter, mask, num_bits, out)),
            ExecutionPath::Hardware(device) => {
                match offload_and_popcount(device, filter, mask, num_bits, out.as_deref_mut()) {
                    Ok(sum) => Ok(sum),
                    Err(err) if self.fallback => {
                        log::warn!("{err}; retrying AND-popcount in software");
                        Ok(and_popcount(filter, mask, num_bits, out))
                    }
                    Err(err) => Err(err),
                }
            }
        }
    }
}
