// Square notation, move text parsing and direction tables shared by the variants

use crate::board::Square;

pub const FILES: &str = "abcdefghijkl";

// Direction deltas as (file, rank)
pub const ORTHOGONAL: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
pub const DIAGONAL: [(i8, i8); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];
pub const KING_STEPS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (-1, 1),
    (1, -1),
    (-1, -1),
];
pub const KNIGHT_LEAPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// Convert a square index to its name on a board of `width` files (e.g. 0 -> "a1")
pub fn square_name(sq: Square, width: usize) -> String {
    let file = sq % width;
    let rank = sq / width;
    let file_char = FILES.as_bytes()[file] as char;
    format!("{}{}", file_char, rank + 1)
}

/// Split a leading square token ("e4", "b10") off `text`.
/// Returns (file, rank, rest) with zero-based coordinates.
pub fn split_square(text: &str) -> Option<(usize, usize, &str)> {
    let bytes = text.as_bytes();
    let file_byte = *bytes.first()?;
    let file = FILES.bytes().position(|b| b == file_byte.to_ascii_lowercase())?;
    let digits = bytes[1..].iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let rank: usize = text[1..1 + digits].parse().ok()?;
    if rank == 0 {
        return None;
    }
    Some((file, rank - 1, &text[1 + digits..]))
}

/// Parse a square name for a board of the given shape
pub fn parse_square(text: &str, width: usize, height: usize) -> Result<Square, &'static str> {
    let (file, rank, rest) = split_square(text.trim()).ok_or("invalid square notation")?;
    if !rest.is_empty() {
        return Err("trailing characters after square");
    }
    if file >= width || rank >= height {
        return Err("square outside the board");
    }
    Ok(rank * width + file)
}

/// Parsed pieces of a move string: from, to and an optional promotion symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveText {
    pub from: (usize, usize),
    pub to: (usize, usize),
    pub promotion: Option<char>,
}

/// Parse "e2e4", "e2-e4", "c3xe5", "e7e8q" or "e7-e8=Q"
pub fn parse_move_text(text: &str) -> Option<MoveText> {
    let text = text.trim();
    let (ff, fr, rest) = split_square(text)?;
    let rest = rest
        .strip_prefix(|c: char| matches!(c, '-' | 'x' | ':'))
        .unwrap_or(rest);
    let (tf, tr, rest) = split_square(rest)?;
    let rest = rest.strip_prefix('=').unwrap_or(rest);
    let mut chars = rest.chars();
    let promotion = chars.next().map(|c| c.to_ascii_lowercase());
    if chars.next().is_some() {
        return None;
    }
    Some(MoveText {
        from: (ff, fr),
        to: (tf, tr),
        promotion,
    })
}

#[inline]
pub fn manhattan(a: (usize, usize), b: (usize, usize)) -> i32 {
    (a.0 as i32 - b.0 as i32).abs() + (a.1 as i32 - b.1 as i32).abs()
}

#[inline]
pub fn chebyshev(a: (usize, usize), b: (usize, usize)) -> i32 {
    (a.0 as i32 - b.0 as i32)
        .abs()
        .max((a.1 as i32 - b.1 as i32).abs())
}
