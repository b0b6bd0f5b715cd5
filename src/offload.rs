//! Offloading the AND-popcount to an accelerator.
//!
//! An accelerator is driven through jobs: the caller asks the device how much
//! working memory a job needs, fills in an [`OffloadJob`] descriptor, and
//! executes it synchronously. The device reports a [`JobStatus`] and, on
//! success, leaves the population count in [`OffloadJob::sum_value`].
//!
//! [`SimdDevice`] is the built-in accelerator, running the job with CPU SIMD
//! lanes when the CPU supports them.

use crate::simd_types::{count_ones, load_u64s, store_u64s, VU64_BYTES};

/// Result code of an offload job.
#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobStatus {
    #[error("ok")]
    Ok,
    #[error("accelerator not available")]
    NotAvailable,
    #[error("operation not supported")]
    UnsupportedOp,
    #[error("invalid job parameter")]
    InvalidParameter,
    #[error("input or output buffer too small")]
    BufferTooSmall,
    #[error("job working memory too small")]
    JobBufferTooSmall,
    #[error("device error {0}")]
    Device(i32),
}

impl JobStatus {
    #[inline(always)]
    pub fn is_ok(self) -> bool {
        self == JobStatus::Ok
    }
}

/// Operation performed by an offload job.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobOp {
    /// Keep the elements of `src1` whose bit in `src2` is set.
    /// With 1-bit elements this is a bitwise AND, and `sum_value` is its popcount.
    Select,
}

/// Descriptor of a single offload job.
#[derive(Debug)]
pub struct OffloadJob<'a> {
    pub op: JobOp,
    pub src1: &'a [u8],
    /// Bytes of `src1` the job may read.
    pub available_in: usize,
    pub src1_bit_width: u8,
    pub src2: &'a [u8],
    /// Bytes of `src2` the job may read.
    pub available_src2: usize,
    pub src2_bit_width: u8,
    pub num_input_elements: u32,
    /// Destination of the selected bits, if the caller wants them.
    pub out: Option<&'a mut [u8]>,
    /// Population count of the result, valid after a successful execution.
    pub sum_value: u32,
}

impl<'a> OffloadJob<'a> {
    /// A 1-bit select job over the first `num_bits` bits of `src1` and `src2`.
    pub fn select(src1: &'a [u8], src2: &'a [u8], num_bits: u32, out: Option<&'a mut [u8]>) -> Self {
        let bytes = (num_bits as usize).div_ceil(8);
        Self {
            op: JobOp::Select,
            src1,
            available_in: bytes,
            src1_bit_width: 1,
            src2,
            available_src2: bytes,
            src2_bit_width: 1,
            num_input_elements: num_bits,
            out,
            sum_value: 0,
        }
    }
}

/// An accelerator that runs [`OffloadJob`]s.
///
/// `execute` is synchronous: when it returns, the job has completed or failed.
/// `job_buffer` is working memory of at least `job_size()` bytes that the caller
/// owns and releases after the call.
pub trait OffloadDevice {
    fn name(&self) -> &'static str;

    /// Working memory needed per job.
    fn job_size(&self) -> Result<usize, JobStatus>;

    fn execute(&self, job: &mut OffloadJob<'_>, job_buffer: &mut [u8]) -> JobStatus;
}

/// Runs select jobs with `wide` SIMD lanes.
///
/// Construct it with [`SimdDevice::probe`], which checks CPU support.
#[derive(Clone, Copy, Debug)]
pub struct SimdDevice {
    _probed: (),
}

cfg_if::cfg_if! {
    if #[cfg(target_arch = "x86_64")] {
        fn cpu_supported() -> bool {
            is_x86_feature_detected!("avx2") && is_x86_feature_detected!("popcnt")
        }
    } else if #[cfg(target_arch = "aarch64")] {
        fn cpu_supported() -> bool {
            std::arch::is_aarch64_feature_detected!("neon")
        }
    } else {
        fn cpu_supported() -> bool {
            false
        }
    }
}

impl SimdDevice {
    /// Set to `1` to make [`SimdDevice::probe`] fail.
    pub const DISABLE_ENV: &'static str = "NTHASH_FILTER_DISABLE_OFFLOAD";

    /// Detect whether the CPU can run select jobs.
    ///
    /// Environment variable override for testing/debugging:
    /// - `NTHASH_FILTER_DISABLE_OFFLOAD=1`: report the device as unavailable.
    pub fn probe() -> Result<Self, JobStatus> {
        if std::env::var(Self::DISABLE_ENV)
            .map(|v| v == "1")
            .unwrap_or(false)
        {
            log::info!("{}=1: SIMD offload disabled", Self::DISABLE_ENV);
            return Err(JobStatus::NotAvailable);
        }
        if !cpu_supported() {
            log::info!("CPU lacks the SIMD features needed for offload");
            return Err(JobStatus::NotAvailable);
        }
        Ok(Self { _probed: () })
    }

    /// Skip the CPU check; `wide` falls back to scalar code where SIMD is missing.
    #[cfg(test)]
    pub(crate) fn unprobed() -> Self {
        Self { _probed: () }
    }
}

impl OffloadDevice for SimdDevice {
    fn name(&self) -> &'static str {
        "simd"
    }

    /// Two staging lanes for the zero-padded tail of both inputs.
    fn job_size(&self) -> Result<usize, JobStatus> {
        Ok(2 * VU64_BYTES)
    }

    fn execute(&self, job: &mut OffloadJob<'_>, job_buffer: &mut [u8]) -> JobStatus {
        if job.op != JobOp::Select {
            return JobStatus::UnsupportedOp;
        }
        if job.src1_bit_width != 1 || job.src2_bit_width != 1 {
            return JobStatus::InvalidParameter;
        }
        let num_bits = job.num_input_elements as usize;
        let bytes = num_bits.div_ceil(8);
        if job.available_in < bytes
            || job.available_src2 < bytes
            || job.src1.len() < bytes
            || job.src2.len() < bytes
            || job.out.as_ref().is_some_and(|out| out.len() < bytes)
        {
            return JobStatus::BufferTooSmall;
        }
        if job_buffer.len() < 2 * VU64_BYTES {
            return JobStatus::JobBufferTooSmall;
        }

        let src1 = &job.src1[..bytes];
        let src2 = &job.src2[..bytes];
        // Whole lanes only cover complete bytes; the partial byte is masked in the tail.
        let full = num_bits / 8 / VU64_BYTES * VU64_BYTES;

        let mut sum = 0;
        for (i, (a, b)) in src1[..full]
            .chunks_exact(VU64_BYTES)
            .zip(src2[..full].chunks_exact(VU64_BYTES))
            .enumerate()
        {
            let and = load_u64s(a) & load_u64s(b);
            sum += count_ones(and);
            if let Some(out) = job.out.as_deref_mut() {
                store_u64s(and, &mut out[i * VU64_BYTES..(i + 1) * VU64_BYTES]);
            }
        }

        let tail = bytes - full;
        if tail > 0 {
            let (stage1, stage2) = job_buffer.split_at_mut(VU64_BYTES);
            let stage2 = &mut stage2[..VU64_BYTES];
            stage1.fill(0);
            stage2.fill(0);
            stage1[..tail].copy_from_slice(&src1[full..]);
            stage2[..tail].copy_from_slice(&src2[full..]);
            if num_bits % 8 != 0 {
                stage2[tail - 1] &= (1 << (num_bits % 8)) - 1;
            }
            let and = load_u64s(stage1) & load_u64s(stage2);
            sum += count_ones(and);
            if let Some(out) = job.out.as_deref_mut() {
                store_u64s(and, stage1);
                out[full..bytes].copy_from_slice(&stage1[..tail]);
            }
        }

        job.sum_value = sum;
        JobStatus::Ok
    }
}
