// Cepstra
// Copyright (c) 2026 The Project Cepstra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `alloc` module implements the "sliding blocks" buffer allocation strategy.
//!
//! Every node of a prepared transform tree needs a slot in the tree's arena for the lifetime of
//! its output buffers: from the execution step that writes them until the last execution step
//! that reads them. Because lifetimes are short and staggered, slots can be reused aggressively.
//! The allocator places each block at the lowest offset that is free for the whole of the block's
//! lifetime, scanning the skyline of already-placed, lifetime-overlapping blocks; the resulting
//! peak offset is the arena size.

use smallvec::SmallVec;

/// Alignment of the arena base and of every slot inside it, as required by SIMD loads.
pub const ARENA_ALIGNMENT: usize = 32;

/// Rounds a size up to the arena alignment.
pub fn align_up(size: usize) -> usize {
    (size + ARENA_ALIGNMENT - 1) & !(ARENA_ALIGNMENT - 1)
}

/// A block to place: a size in bytes plus the `[birth, death]` interval (inclusive, in execution
/// order) during which the block's bytes must remain untouched by other blocks.
#[derive(Copy, Clone, Debug)]
pub struct Block {
    /// Size of the block in bytes.
    pub size: usize,
    /// Execution index at which the block is written.
    pub birth: usize,
    /// Last execution index at which the block is read.
    pub death: usize,
}

impl Block {
    fn overlaps(&self, other: &Block) -> bool {
        self.birth <= other.death && other.birth <= self.death
    }
}

/// The solved placement: one offset per input block, in input order, plus the arena size.
#[derive(Clone, Debug)]
pub struct Placement {
    /// Byte offset assigned to each block.
    pub offsets: Vec<usize>,
    /// Peak extent over all blocks; the number of bytes the arena must provide.
    pub arena_size: usize,
}

/// Solves the placement problem for `blocks`.
///
/// Blocks are processed by birth ascending, size descending among equal births, which keeps the
/// skyline flat when several blocks appear at the same execution step. The solution is
/// deterministic for a given block list. If the caller wants aligned offsets, all sizes must be
/// multiples of [`ARENA_ALIGNMENT`]; the first-fit scan then never produces an unaligned offset.
pub fn solve(blocks: &[Block]) -> Placement {
    let mut order: Vec<usize> = (0..blocks.len()).collect();
    order.sort_by(|&a, &b| {
        blocks[a]
            .birth
            .cmp(&blocks[b].birth)
            .then(blocks[b].size.cmp(&blocks[a].size))
            .then(a.cmp(&b))
    });

    let mut offsets = vec![0; blocks.len()];
    let mut placed: Vec<usize> = Vec::with_capacity(blocks.len());
    let mut arena_size = 0;

    for &idx in &order {
        let block = &blocks[idx];

        if block.size == 0 {
            continue;
        }

        // The skyline: occupied [lo, hi) offset intervals within this block's lifetime window.
        let mut skyline: SmallVec<[(usize, usize); 16]> = placed
            .iter()
            .filter(|&&p| blocks[p].overlaps(block))
            .map(|&p| (offsets[p], offsets[p] + blocks[p].size))
            .collect();
        skyline.sort_unstable();

        // First-fit: the lowest gap large enough, including the gap above the topmost interval.
        let mut offset = 0;
        for &(lo, hi) in &skyline {
            if offset + block.size <= lo {
                break;
            }
            offset = offset.max(hi);
        }

        offsets[idx] = offset;
        arena_size = arena_size.max(offset + block.size);
        placed.push(idx);
    }

    Placement { offsets, arena_size }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    /// Builds the block list of a straight-line pipeline: block `i` is written at step `i` and
    /// read at step `i + 1`.
    fn chain(sizes: &[usize]) -> Vec<Block> {
        let last = sizes.len() - 1;
        sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| Block { size, birth: i, death: if i < last { i + 1 } else { i } })
            .collect()
    }

    fn assert_disjoint(blocks: &[Block], placement: &Placement) {
        for i in 0..blocks.len() {
            for j in 0..i {
                if blocks[i].size == 0 || blocks[j].size == 0 {
                    continue;
                }
                if !blocks[i].overlaps(&blocks[j]) {
                    continue;
                }
                let (ai, bi) = (placement.offsets[i], placement.offsets[i] + blocks[i].size);
                let (aj, bj) = (placement.offsets[j], placement.offsets[j] + blocks[j].size);
                assert!(bi <= aj || bj <= ai, "blocks {} and {} overlap", i, j);
            }
        }
    }

    #[test]
    fn verify_chain_is_tight() {
        let sizes = [100, 200, 50, 300];
        let blocks = chain(&sizes);
        let placement = solve(&blocks);

        assert_disjoint(&blocks, &placement);

        // A straight line keeps exactly two buffers live at any step.
        let expected = sizes.windows(2).map(|w| w[0] + w[1]).max().unwrap();
        assert_eq!(placement.arena_size, expected);
    }

    #[test]
    fn verify_disjoint_lifetimes_share_offsets() {
        let blocks = [
            Block { size: 64, birth: 0, death: 1 },
            Block { size: 64, birth: 2, death: 3 },
            Block { size: 64, birth: 4, death: 4 },
        ];
        let placement = solve(&blocks);

        assert_eq!(placement.offsets, vec![0, 0, 0]);
        assert_eq!(placement.arena_size, 64);
    }

    #[test]
    fn verify_equal_birth_places_largest_first() {
        // Two blocks born at the same step: the larger one goes to the bottom of the arena.
        let blocks = [
            Block { size: 32, birth: 0, death: 1 },
            Block { size: 128, birth: 0, death: 1 },
        ];
        let placement = solve(&blocks);

        assert_eq!(placement.offsets[1], 0);
        assert_eq!(placement.offsets[0], 128);
        assert_eq!(placement.arena_size, 160);
    }

    #[test]
    fn verify_gap_reuse() {
        // Block 3 must slide into the hole left by block 0 instead of growing the arena.
        let blocks = [
            Block { size: 100, birth: 0, death: 1 },
            Block { size: 100, birth: 0, death: 5 },
            Block { size: 100, birth: 1, death: 5 },
            Block { size: 100, birth: 2, death: 5 },
        ];
        let placement = solve(&blocks);

        assert_disjoint(&blocks, &placement);
        assert_eq!(placement.offsets[3], 0);
        assert_eq!(placement.arena_size, 300);
    }

    #[test]
    fn verify_empty_and_zero_sized_blocks() {
        assert_eq!(solve(&[]).arena_size, 0);

        let blocks = [
            Block { size: 0, birth: 0, death: 1 },
            Block { size: 96, birth: 0, death: 1 },
        ];
        let placement = solve(&blocks);
        assert_eq!(placement.arena_size, 96);
        assert_eq!(placement.offsets[1], 0);
    }

    #[test]
    fn verify_determinism() {
        let blocks = [
            Block { size: 96, birth: 0, death: 2 },
            Block { size: 32, birth: 1, death: 3 },
            Block { size: 64, birth: 1, death: 2 },
            Block { size: 128, birth: 3, death: 3 },
        ];

        let first = solve(&blocks);
        let second = solve(&blocks);
        assert_eq!(first.offsets, second.offsets);
        assert_eq!(first.arena_size, second.arena_size);
    }

    #[test]
    fn verify_random_blocks_never_overlap() {
        let mut rng = SmallRng::seed_from_u64(0x5EED);

        for _ in 0..200 {
            let count = rng.gen_range(1..24);
            let blocks: Vec<Block> = (0..count)
                .map(|_| {
                    let birth = rng.gen_range(0..16);
                    Block {
                        size: rng.gen_range(0..8) * ARENA_ALIGNMENT,
                        birth,
                        death: birth + rng.gen_range(0..6),
                    }
                })
                .collect();

            let placement = solve(&blocks);
            assert_disjoint(&blocks, &placement);

            for (block, &offset) in blocks.iter().zip(placement.offsets.iter()) {
                assert!(offset + block.size <= placement.arena_size);
                assert_eq!(offset % ARENA_ALIGNMENT, 0);
            }
        }
    }
}
