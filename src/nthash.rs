//! ntHash: a rolling hash over the DNA alphabet.
//!
//! Each base maps to a random 64-bit seed. The forward hash of a k-mer XORs
//! the seeds rotated by their distance to the end of the window, the reverse
//! hash does the same for the reverse complement. Both can be updated in O(1)
//! when the window slides by one base.
//!
//! Any character outside `ACGTacgt` maps to seed `0`, the ambiguous class.
//! Windows containing such a character are never hashed.

use crate::complement_char;

const SEED_A: u64 = 0x3c8b_fbb3_95c6_0474;
const SEED_C: u64 = 0x3193_c185_62a0_2b4c;
const SEED_G: u64 = 0x2032_3ed0_8257_2324;
const SEED_T: u64 = 0x2955_49f5_4be2_4456;
/// Seed of the ambiguous class.
pub const SEED_N: u64 = 0;

/// Multiplier used to derive the extra hashes of a k-mer.
const MULTI_SEED: u64 = 0x90b4_5d39_fb6d_a1fa;
const MULTI_SHIFT: u32 = 27;

const fn seed(base: u8) -> u64 {
    match base {
        b'A' | b'a' => SEED_A,
        b'C' | b'c' => SEED_C,
        b'G' | b'g' => SEED_G,
        b'T' | b't' => SEED_T,
        _ => SEED_N,
    }
}

/// Seed of every ASCII character.
static SEED_TAB: [u64; 256] = {
    let mut tab = [SEED_N; 256];
    let mut c = 0;
    while c < 256 {
        tab[c] = seed(c as u8);
        c += 1;
    }
    tab
};

/// Seed of the complement of every ASCII character.
static RC_SEED_TAB: [u64; 256] = {
    let mut tab = [SEED_N; 256];
    let mut c = 0;
    while c < 256 {
        tab[c] = seed(complement_char(c as u8));
        c += 1;
    }
    tab
};

/// Returns `true` if `base` falls in the ambiguous seed class.
#[inline(always)]
pub fn is_ambiguous(base: u8) -> bool {
    SEED_TAB[base as usize] == SEED_N
}

/// Forward and reverse-complement hash of a k-mer, computed from scratch.
///
/// The caller guarantees that `kmer` contains no ambiguous characters.
#[inline(always)]
pub fn hash_pair(kmer: impl Iterator<Item = u8>) -> (u64, u64) {
    let mut fwd = 0u64;
    let mut rev = 0u64;
    for (i, base) in kmer.enumerate() {
        fwd = fwd.rotate_left(1) ^ SEED_TAB[base as usize];
        rev ^= RC_SEED_TAB[base as usize].rotate_left(i as u32);
    }
    (fwd, rev)
}

/// Slide the forward hash by one base.
#[inline(always)]
pub fn roll_forward(fwd: u64, k: usize, out: u8, inc: u8) -> u64 {
    fwd.rotate_left(1)
        ^ SEED_TAB[out as usize].rotate_left(k as u32)
        ^ SEED_TAB[inc as usize]
}

/// Slide the reverse-complement hash by one base.
#[inline(always)]
pub fn roll_reverse(rev: u64, k: usize, out: u8, inc: u8) -> u64 {
    rev.rotate_right(1)
        ^ RC_SEED_TAB[out as usize].rotate_right(1)
        ^ RC_SEED_TAB[inc as usize].rotate_left(k as u32 - 1)
}

/// Derives the `out.len()` hash values of a k-mer from its forward and
/// reverse-complement hash.
///
/// `filter_bits` is the size of the filter the hashes are meant for.
/// Implementations may use it, but are not required to reduce their output.
pub trait MultiHash {
    fn derive(&self, fwd: u64, rev: u64, k: usize, filter_bits: usize, out: &mut [u64]);
}

/// The ntHash multi-hash: the canonical (strand independent) hash
/// `min(fwd, rev)` followed by `h - 1` multiplicative remixes of it.
/// Values are not reduced modulo the filter size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NtMultiHash;

impl MultiHash for NtMultiHash {
    #[inline(always)]
    fn derive(&self, fwd: u64, rev: u64, k: usize, _filter_bits: usize, out: &mut [u64]) {
        let Some((first, rest)) = out.split_first_mut() else {
            return;
        };
        let canonical = fwd.min(rev);
        *first = canonical;
        for (i, h) in rest.iter_mut().enumerate() {
            let i = i as u64 + 1;
            let mut t = canonical.wrapping_mul(i ^ (k as u64).wrapping_mul(MULTI_SEED));
            t ^= t >> MULTI_SHIFT;
            *h = t;
        }
    }
}

/// All `h` hashes of an explicit k-mer, computed directly.
/// Returns `None` if the k-mer is empty or contains an ambiguous character.
pub fn kmer_hashes(kmer: &[u8], h: usize, filter_bits: usize) -> Option<Vec<u64>> {
    if kmer.is_empty() || kmer.iter().any(|&c| is_ambiguous(c)) {
        return None;
    }
    let (fwd, rev) = hash_pair(kmer.iter().copied());
    let mut out = vec![0; h];
    NtMultiHash.derive(fwd, rev, kmer.len(), filter_bits, &mut out);
    Some(out)
}
