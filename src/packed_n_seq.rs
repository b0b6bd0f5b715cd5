use super::*;

/// A 2-bit packed sequence together with a 1-bit mask of ambiguous positions.
///
/// `get_ascii` returns `N` for every masked position, so hashing a
/// `PackedNSeq` skips exactly the windows that hashing the original ASCII
/// input would skip.
#[derive(Clone, Copy, Debug, Default, MemSize, MemDbg)]
pub struct PackedNSeq<'s> {
    pub seq: PackedSeq<'s>,
    pub ambiguous: BitSeq<'s>,
}

#[derive(Clone, Debug, Default, MemSize, MemDbg)]
pub struct PackedNSeqVec {
    pub seq: PackedSeqVec,
    pub ambiguous: BitSeqVec,
}

impl<'s> Seq<'s> for PackedNSeq<'s> {
    type SeqVec = PackedNSeqVec;

    #[inline(always)]
    fn len(&self) -> usize {
        self.seq.len()
    }

    #[inline(always)]
    fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    #[inline(always)]
    fn get_ascii(&self, index: usize) -> u8 {
        if self.ambiguous.get(index) == 1 {
            b'N'
        } else {
            unpack_base(self.seq.get(index))
        }
    }

    fn to_vec(&self) -> PackedNSeqVec {
        let ascii: Vec<u8> = self.iter_ascii(0..self.len()).collect();
        PackedNSeqVec::from_ascii(&ascii)
    }
}

impl SeqVec for PackedNSeqVec {
    type Seq<'s> = PackedNSeq<'s>;

    #[inline(always)]
    fn as_slice(&self) -> PackedNSeq<'_> {
        PackedNSeq {
            seq: self.seq.as_slice(),
            ambiguous: self.ambiguous.as_slice(),
        }
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.seq.len()
    }

    #[inline(always)]
    fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    fn clear(&mut self) {
        self.seq.clear();
        self.ambiguous.clear();
    }

    fn push_ascii(&mut self, seq: &[u8]) -> Range<usize> {
        let r1 = self.seq.push_ascii(seq);
        let r2 = self.ambiguous.push_ascii(seq);
        assert_eq!(r1, r2);
        r1
    }

    #[cfg(feature = "rand")]
    fn random(n: usize) -> Self {
        Self {
            seq: PackedSeqVec::random(n),
            ambiguous: BitSeqVec::with_len(n),
        }
    }
}

impl PackedNSeqVec {
    /// A random sequence where each position is ambiguous with probability `n_frac`.
    #[cfg(feature = "rand")]
    pub fn random_with_n(len: usize, n_frac: f32) -> Self {
        Self {
            seq: PackedSeqVec::random(len),
            ambiguous: BitSeqVec::random(len, n_frac),
        }
    }
}
