use std::time::{Duration, Instant};

use crate::nthash::{hash_pair, is_ambiguous, roll_forward, roll_reverse, MultiHash, NtMultiHash};
use crate::Seq;

/// Iterates the hash values of all valid k-mers of a sequence.
///
/// Windows containing an ambiguous character (anything outside `ACGTacgt`)
/// are skipped. Within a run of valid bases, hashes are updated in O(1) per
/// position; after a skip they are recomputed from scratch.
///
/// The iterator is a cursor: `pos()` and `hashes()` describe the current
/// k-mer and `advance()` moves to the next valid one. Once `pos()` equals
/// [`KmerHashIt::END`] it stays there.
///
/// ```
/// use nthash_filter::KmerHashIt;
///
/// let seq = b"ACGTNACGT";
/// let mut it = KmerHashIt::new(&seq[..], 1, 3, 1024);
/// let mut positions = vec![];
/// while it != KmerHashIt::end() {
///     assert_eq!(it.hashes().len(), 1);
///     positions.push(it.pos());
///     it.advance();
/// }
/// assert_eq!(positions, vec![0, 1, 5, 6]);
/// ```
#[derive(Clone, Debug)]
pub struct KmerHashIt<'s, S: Seq<'s>, H: MultiHash = NtMultiHash> {
    seq: S,
    k: usize,
    filter_bits: usize,
    pos: usize,
    fwd: u64,
    rev: u64,
    /// Owned by this iterator; clones get their own copy.
    hashes: Vec<u64>,
    hasher: H,
    _marker: std::marker::PhantomData<&'s ()>,
}

impl<'s, S: Seq<'s>> KmerHashIt<'s, S> {
    /// Iterate the `h` hashes of every valid `k`-mer of `seq`, for a filter of `filter_bits` bits.
    pub fn new(seq: S, h: usize, k: usize, filter_bits: usize) -> Self {
        Self::with_start(seq, h, k, filter_bits, 0)
    }

    /// Like [`KmerHashIt::new`], but start scanning at `pos`.
    pub fn with_start(seq: S, h: usize, k: usize, filter_bits: usize, pos: usize) -> Self {
        Self::with_hasher(seq, h, k, filter_bits, pos, NtMultiHash)
    }
}

impl<'s, S: Seq<'s> + Default, H: MultiHash + Default> KmerHashIt<'s, S, H> {
    /// The canonical exhausted iterator.
    /// Any iterator that has run off the end of its sequence compares equal to it.
    pub fn end() -> Self {
        Self {
            seq: S::default(),
            k: 0,
            filter_bits: 0,
            pos: Self::END,
            fwd: 0,
            rev: 0,
            hashes: vec![],
            hasher: H::default(),
            _marker: std::marker::PhantomData,
        }
    }
}

impl<'s, S: Seq<'s>, H: MultiHash> KmerHashIt<'s, S, H> {
    /// Position of an exhausted iterator.
    pub const END: usize = usize::MAX;

    /// Start scanning at `pos`, deriving the per-k-mer hashes with `hasher`.
    ///
    /// The iterator is exhausted right away when `k == 0`, `k > seq.len()`,
    /// or no window at or after `pos` is free of ambiguous characters.
    pub fn with_hasher(seq: S, h: usize, k: usize, filter_bits: usize, pos: usize, hasher: H) -> Self {
        let mut it = Self {
            seq,
            k,
            filter_bits,
            pos,
            fwd: 0,
            rev: 0,
            hashes: vec![0; h],
            hasher,
            _marker: std::marker::PhantomData,
        };
        it.init();
        it
    }

    /// Move `pos` forward to the first valid window and hash it from scratch.
    fn init(&mut self) {
        let len = self.seq.len();
        if self.k == 0 || self.k > len {
            self.pos = Self::END;
            return;
        }
        let last = len - self.k;
        while self.pos <= last {
            match self.last_ambiguous(self.pos) {
                // Every window overlapping the ambiguous base is invalid too.
                Some(offset) => self.pos += offset + 1,
                None => {
                    let (fwd, rev) = hash_pair(self.seq.iter_ascii(self.pos..self.pos + self.k));
                    self.fwd = fwd;
                    self.rev = rev;
                    self.derive();
                    return;
                }
            }
        }
        self.pos = Self::END;
    }

    /// Offset of the right-most ambiguous character in the window at `pos`.
    #[inline(always)]
    fn last_ambiguous(&self, pos: usize) -> Option<usize> {
        (0..self.k)
            .rev()
            .find(|&i| is_ambiguous(self.seq.get_ascii(pos + i)))
    }

    #[inline(always)]
    fn derive(&mut self) {
        self.hasher
            .derive(self.fwd, self.rev, self.k, self.filter_bits, &mut self.hashes);
    }

    /// Advance to the next valid k-mer, or to [`KmerHashIt::END`].
    pub fn advance(&mut self) {
        if self.pos == Self::END {
            return;
        }
        self.pos += 1;
        if self.pos > self.seq.len() - self.k {
            self.pos = Self::END;
            return;
        }
        let inc = self.seq.get_ascii(self.pos + self.k - 1);
        if is_ambiguous(inc) {
            // No window containing `inc` is valid.
            self.pos += self.k;
            self.init();
            return;
        }
        let out = self.seq.get_ascii(self.pos - 1);
        self.fwd = roll_forward(self.fwd, self.k, out, inc);
        self.rev = roll_reverse(self.rev, self.k, out, inc);
        self.derive();
    }

    /// The hashes of the current k-mer.
    ///
    /// Panics when the iterator is exhausted.
    #[inline(always)]
    pub fn hashes(&self) -> &[u64] {
        assert!(
            self.pos != Self::END,
            "Hashes of an exhausted k-mer iterator were requested."
        );
        &self.hashes
    }

    /// The hashes of the current k-mer, or `None` when exhausted.
    #[inline(always)]
    pub fn try_hashes(&self) -> Option<&[u64]> {
        (self.pos != Self::END).then_some(self.hashes.as_slice())
    }

    /// Start of the current k-mer, or [`KmerHashIt::END`].
    #[inline(always)]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline(always)]
    pub fn is_end(&self) -> bool {
        self.pos == Self::END
    }

    /// Forward-strand hash of the current k-mer.
    #[inline(always)]
    pub fn forward_hash(&self) -> u64 {
        self.fwd
    }

    /// Reverse-complement hash of the current k-mer.
    #[inline(always)]
    pub fn reverse_hash(&self) -> u64 {
        self.rev
    }

    #[inline(always)]
    pub fn k(&self) -> usize {
        self.k
    }

    #[inline(always)]
    pub fn filter_bits(&self) -> usize {
        self.filter_bits
    }

    /// Call `f(pos, hashes)` for the current and every following valid k-mer.
    pub fn for_each(mut self, mut f: impl FnMut(usize, &[u64])) {
        while self.pos != Self::END {
            f(self.pos, &self.hashes);
            self.advance();
        }
    }
}

/// Iterators are identified by their position only, so that any exhausted
/// iterator equals [`KmerHashIt::end`].
impl<'s, S: Seq<'s>, H: MultiHash> PartialEq for KmerHashIt<'s, S, H> {
    fn eq(&self, other: &Self) -> bool {
        self.pos == other.pos
    }
}

impl<'s, S: Seq<'s>, H: MultiHash> Eq for KmerHashIt<'s, S, H> {}

/// Times every `advance()` of a wrapped [`KmerHashIt`].
///
/// Each step is logged at `trace` level.
pub struct Timed<'a, 's, S: Seq<'s>, H: MultiHash = NtMultiHash> {
    it: &'a mut KmerHashIt<'s, S, H>,
    steps: u64,
    elapsed: Duration,
}

impl<'a, 's, S: Seq<'s>, H: MultiHash> Timed<'a, 's, S, H> {
    pub fn new(it: &'a mut KmerHashIt<'s, S, H>) -> Self {
        Self {
            it,
            steps: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn advance(&mut self) {
        let start = Instant::now();
        self.it.advance();
        let d = start.elapsed();
        self.steps += 1;
        self.elapsed += d;
        log::trace!(
            "k-mer hash step {} to pos {} took {} ns",
            self.steps,
            self.it.pos(),
            d.as_nanos()
        );
    }

    /// The wrapped iterator.
    pub fn inner(&self) -> &KmerHashIt<'s, S, H> {
        self.it
    }

    /// Number of timed `advance()` calls.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Total time spent in `advance()`.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}
