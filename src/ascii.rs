use super::*;

/// Plain ASCII input. Every byte is one symbol; anything outside `ACGTacgt`
/// is ambiguous for hashing purposes.
impl<'s> Seq<'s> for &'s [u8] {
    type SeqVec = Vec<u8>;

    #[inline(always)]
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    #[inline(always)]
    fn is_empty(&self) -> bool {
        <[u8]>::is_empty(self)
    }

    #[inline(always)]
    fn get_ascii(&self, index: usize) -> u8 {
        self[index]
    }

    /// Iter the ASCII characters directly, without going through `get_ascii`.
    #[inline(always)]
    fn iter_ascii(self, range: Range<usize>) -> impl ExactSizeIterator<Item = u8> {
        self[range].iter().copied()
    }

    fn to_vec(&self) -> Vec<u8> {
        <[u8]>::to_vec(self)
    }
}

impl SeqVec for Vec<u8> {
    type Seq<'s> = &'s [u8];

    #[inline(always)]
    fn as_slice(&self) -> Self::Seq<'_> {
        self.as_slice()
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.len()
    }

    #[inline(always)]
    fn is_empty(&self) -> bool {
        self.is_empty()
    }

    #[inline(always)]
    fn clear(&mut self) {
        self.clear()
    }

    fn push_ascii(&mut self, seq: &[u8]) -> Range<usize> {
        let start = self.len();
        let end = start + seq.len();
        self.extend_from_slice(seq);
        start..end
    }

    #[cfg(feature = "rand")]
    fn random(n: usize) -> Self {
        use rand::{Rng, SeedableRng};

        let mut rng = rand::rngs::SmallRng::from_os_rng();
        (0..n).map(|_| b"ACGT"[rng.random_range(0..4)]).collect()
    }
}
