use super::*;

/// A 2-bit packed non-owned slice of DNA bases.
#[derive(Copy, Clone, Debug, Default, MemSize, MemDbg)]
pub struct PackedSeq<'s> {
    /// Packed data, 4 bases per byte, first base in the low bits.
    seq: &'s [u8],
    /// Length of the sequence in bp.
    len: usize,
}

/// A 2-bit packed owned sequence of DNA bases.
#[derive(Clone, Debug, Default, MemSize, MemDbg)]
pub struct PackedSeqVec {
    pub(crate) seq: Vec<u8>,

    /// The length, in bp, of the underlying sequence. See `.len()`.
    len: usize,
}

/// Pack an ASCII `ACTGactg` character into its 2-bit representation, and panic for anything else.
#[inline(always)]
pub fn pack_char(base: u8) -> u8 {
    match base {
        b'a' | b'A' => 0,
        b'c' | b'C' => 1,
        b'g' | b'G' => 3,
        b't' | b'T' => 2,
        _ => panic!(
            "Unexpected character '{}' with ASCII value {base}. Expected one of ACTGactg.",
            base as char
        ),
    }
}

/// Pack an ASCII `ACTGactg` character into its 2-bit representation, and silently convert other characters into 0..4 as well.
#[inline(always)]
pub fn pack_char_lossy(base: u8) -> u8 {
    (base >> 1) & 3
}

/// Unpack a 2-bit DNA base into the corresponding `ACTG` character.
#[inline(always)]
pub fn unpack_base(base: u8) -> u8 {
    debug_assert!(base < 4, "Base {base} is not <4.");
    b"ACTG"[base as usize]
}

/// Complement an ASCII character: `A<>T` and `C<>G`, preserving case.
/// Any other character is returned unchanged.
#[inline(always)]
pub const fn complement_char(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' => b'A',
        b'a' => b't',
        b'c' => b'g',
        b'g' => b'c',
        b't' => b'a',
        _ => base,
    }
}

impl<'s> PackedSeq<'s> {
    /// The length of the sequence in bp.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the 2-bit base at the given index.
    #[inline(always)]
    pub fn get(&self, index: usize) -> u8 {
        debug_assert!(
            index < self.len,
            "Index out of bounds: {index} >= {}",
            self.len
        );
        (self.seq[index / 4] >> (2 * (index % 4))) & 3
    }

    /// Iterate over the 2-bit bases.
    #[inline(always)]
    pub fn iter_bp(self) -> impl ExactSizeIterator<Item = u8> + 's {
        (0..self.len).map(move |i| self.get(i))
    }

    /// Return a `Vec<u8>` of ASCII `ACTG` characters.
    #[inline(always)]
    pub fn unpack(&self) -> Vec<u8> {
        self.iter_bp().map(unpack_base).collect()
    }
}

impl PackedSeqVec {
    #[inline(always)]
    pub fn as_slice(&self) -> PackedSeq<'_> {
        PackedSeq {
            seq: &self.seq,
            len: self.len,
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub fn clear(&mut self) {
        self.seq.clear();
        self.len = 0;
    }

    /// Push an ASCII sequence to a `PackedSeqVec`.
    /// `Aa` map to `0`, `Cc` to `1`, `Gg` to `3`, and `Tt` to `2`.
    /// Other characters are silently mapped into `0..4`; track them separately in a `BitSeqVec`.
    pub fn push_ascii(&mut self, seq: &[u8]) -> Range<usize> {
        let start = self.len;
        self.seq.resize((self.len + seq.len()).div_ceil(4), 0);
        for &base in seq {
            self.seq[self.len / 4] |= pack_char_lossy(base) << (2 * (self.len % 4));
            self.len += 1;
        }
        start..self.len
    }

    #[inline(always)]
    pub fn from_ascii(seq: &[u8]) -> Self {
        let mut packed = Self::default();
        packed.push_ascii(seq);
        packed
    }

    #[cfg(feature = "rand")]
    pub fn random(n: usize) -> Self {
        use rand::{RngCore, SeedableRng};

        let byte_len = n.div_ceil(4);
        let mut seq = vec![0; byte_len];
        rand::rngs::SmallRng::from_os_rng().fill_bytes(&mut seq);
        // Ensure that the last byte is padded with zeros.
        if n % 4 != 0 {
            seq[byte_len - 1] &= (1 << (2 * (n % 4))) - 1;
        }

        Self { seq, len: n }
    }
}
