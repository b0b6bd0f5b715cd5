#![feature(test)]

use std::hint::black_box;

use nthash_filter::*;
use rand::Rng;
use test::Bencher;

extern crate test;

fn random_bytes(len: usize) -> Vec<u8> {
    let mut rng = rand::rng();
    (0..len).map(|_| rng.random::<u8>()).collect()
}

fn hash_it(b: &mut Bencher, len: usize, h: usize) {
    let len = black_box(len);
    let rep = 1_000_000 / len;
    let seq = black_box(PackedNSeqVec::random_with_n(len, 0.01));

    b.iter(|| {
        for _ in 0..rep {
            KmerHashIt::new(seq.as_slice(), h, 31, 1 << 20).for_each(
                #[inline(always)]
                |_, hashes| {
                    black_box(hashes);
                },
            );
        }
    });
}

#[bench]
fn hash_it_150(b: &mut Bencher) {
    hash_it(b, 150, 1);
}
#[bench]
fn hash_it_1K(b: &mut Bencher) {
    hash_it(b, 1000, 1);
}
#[bench]
fn hash_it_1M(b: &mut Bencher) {
    hash_it(b, 1_000_000, 1);
}
#[bench]
fn hash_it_1M_h4(b: &mut Bencher) {
    hash_it(b, 1_000_000, 4);
}

fn ascii_hash_it(b: &mut Bencher, len: usize) {
    let len = black_box(len);
    let rep = 1_000_000 / len;
    let seq = black_box(Vec::<u8>::random(len));

    b.iter(|| {
        for _ in 0..rep {
            KmerHashIt::new(&seq[..], 1, 31, 1 << 20).for_each(|_, hashes| {
                black_box(hashes);
            });
        }
    });
}

#[bench]
fn ascii_hash_it_1K(b: &mut Bencher) {
    ascii_hash_it(b, 1000);
}
#[bench]
fn ascii_hash_it_1M(b: &mut Bencher) {
    ascii_hash_it(b, 1_000_000);
}

fn and_popcount(b: &mut Bencher, bits: usize, mode: ExecutionMode) {
    let Ok(engine) = MaskedPopcount::new(mode) else {
        eprintln!("No accelerator; skipping {mode} bench.");
        return;
    };
    let filter = black_box(random_bytes(bits / 8));
    let mask = black_box(random_bytes(bits / 8));

    b.iter(|| black_box(engine.evaluate(&filter, &mask, bits as u32, None)));
}

#[bench]
fn and_popcount_sw_64K(b: &mut Bencher) {
    and_popcount(b, 1 << 16, ExecutionMode::Software);
}
#[bench]
fn and_popcount_hw_64K(b: &mut Bencher) {
    and_popcount(b, 1 << 16, ExecutionMode::Hardware);
}
#[bench]
fn and_popcount_sw_16M(b: &mut Bencher) {
    and_popcount(b, 1 << 24, ExecutionMode::Software);
}
#[bench]
fn and_popcount_hw_16M(b: &mut Bencher) {
    and_popcount(b, 1 << 24, ExecutionMode::Hardware);
}
