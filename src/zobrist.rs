// Zobrist hashing with precomputed tables
use std::sync::OnceLock;

use crate::board::{Piece, Side, Square};

/// Largest supported board (12x12)
pub const MAX_SQUARES: usize = 144;
/// Largest kind table of any variant
pub const MAX_KINDS: usize = 8;

pub struct ZobristKeys {
    pub piece: [[[u64; MAX_SQUARES]; MAX_KINDS]; 2],
    pub side: u64,
    pub castling: [u64; 16],
    pub ep: [u64; MAX_SQUARES],
    pub chain: [u64; MAX_SQUARES],
}

// Built once, read-only afterwards
static KEYS: OnceLock<ZobristKeys> = OnceLock::new();

fn split_mix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9e3779b97f4a7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

fn build() -> ZobristKeys {
    let mut keys = ZobristKeys {
        piece: [[[0; MAX_SQUARES]; MAX_KINDS]; 2],
        side: split_mix64(0xdeadbeefdeadbeef),
        castling: [0; 16],
        ep: [0; MAX_SQUARES],
        chain: [0; MAX_SQUARES],
    };
    for side in 0..2 {
        for kind in 0..MAX_KINDS {
            for sq in 0..MAX_SQUARES {
                let seed = ((side * MAX_KINDS + kind) as u64).wrapping_mul(0xad3)
                    + (sq as u64).wrapping_mul(0x47a1)
                    + ((side as u64) << 40);
                keys.piece[side][kind][sq] = split_mix64(seed);
            }
        }
    }
    for (i, key) in keys.castling.iter_mut().enumerate() {
        *key = split_mix64((i as u64).wrapping_mul(0x1234_abcd) ^ 0x5151);
    }
    for sq in 0..MAX_SQUARES {
        keys.ep[sq] = split_mix64((sq as u64).wrapping_mul(0x3333_5555) ^ 0xe9);
        keys.chain[sq] = split_mix64((sq as u64).wrapping_mul(0x7777_1111) ^ 0xc4a1);
    }
    keys
}

pub fn keys() -> &'static ZobristKeys {
    KEYS.get_or_init(build)
}

#[inline]
pub fn piece_key(piece: Piece, sq: Square) -> u64 {
    keys().piece[piece.side.index()][piece.kind.index()][sq]
}

/// Hash contribution of everything that is not a piece placement
pub fn state_key(side: Side, castling: u8, ep: Option<Square>, chain: Option<Square>) -> u64 {
    let keys = keys();
    let mut h = keys.castling[(castling & 0xF) as usize];
    if side == Side::Far {
        h ^= keys.side;
    }
    if let Some(sq) = ep {
        h ^= keys.ep[sq];
    }
    if let Some(sq) = chain {
        h ^= keys.chain[sq];
    }
    h
}
