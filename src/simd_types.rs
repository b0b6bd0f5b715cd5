//! SIMD lane types for the accelerated AND-popcount, sized per target.

cfg_if::cfg_if! {
    if #[cfg(target_feature = "avx2")] {
        /// SIMD vector of `u64`
        pub type VU64 = wide::u64x4;
        /// Number of 64-bit SIMD lanes
        pub const L64: usize = 4;
    } else {
        /// SIMD vector of `u64`
        pub type VU64 = wide::u64x2;
        /// Number of 64-bit SIMD lanes
        pub const L64: usize = 2;
    }
}

/// Bytes covered by one `VU64`.
pub const VU64_BYTES: usize = 8 * L64;

/// Load `VU64_BYTES` little-endian bytes.
#[inline(always)]
pub fn load_u64s(bytes: &[u8]) -> VU64 {
    debug_assert!(bytes.len() >= VU64_BYTES);
    VU64::new(std::array::from_fn(|l| {
        u64::from_le_bytes(std::array::from_fn(|i| bytes[8 * l + i]))
    }))
}

/// Store a `VU64` as `VU64_BYTES` little-endian bytes.
#[inline(always)]
pub fn store_u64s(v: VU64, bytes: &mut [u8]) {
    for (l, word) in v.to_array().iter().enumerate() {
        bytes[8 * l..8 * l + 8].copy_from_slice(&word.to_le_bytes());
    }
}

/// Total number of set bits over all lanes.
#[inline(always)]
pub fn count_ones(v: VU64) -> u32 {
    v.to_array().iter().map(|x| x.count_ones()).sum()
}
