use serde::{Deserialize, Serialize};

use crate::rng::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    UsQwerty,
    UkQwerty,
    Qwertz,
    Azerty,
}

/// Physical key geometry as three row strings. Neighbor-key typos pick
/// from the keys grid-adjacent to the intended one, so the substitutions
/// a given layout produces match what a hand on that layout would fat-finger
/// (QWERTZ swaps y/z, AZERTY moves a/q/z/w and m).
#[derive(Debug, Clone, Copy)]
pub struct KeyboardLayout {
    rows: [&'static str; 3],
}

impl KeyboardLayout {
    pub fn new(kind: LayoutKind) -> Self {
        let rows = match kind {
            LayoutKind::UsQwerty | LayoutKind::UkQwerty => {
                ["qwertyuiop", "asdfghjkl", "zxcvbnm"]
            }
            LayoutKind::Qwertz => ["qwertzuiop", "asdfghjkl", "yxcvbnm"],
            LayoutKind::Azerty => ["azertyuiop", "qsdfghjklm", "wxcvbn"],
        };
        Self { rows }
    }

    pub fn is_letter(c: char) -> bool {
        c.is_alphabetic()
    }

    /// Pick a key adjacent to `c` on this layout, preserving case.
    ///
    /// Characters not present in the row grid (digits, punctuation,
    /// whitespace) are returned unchanged, as is a key with no valid
    /// neighbors.
    pub fn neighbor_key(&self, c: char, rng: &mut RandomSource) -> char {
        let upper = c.is_uppercase();
        let lower = c.to_ascii_lowercase();

        let Some((row, col)) = self.locate(lower) else {
            return c;
        };

        let mut candidates: Vec<char> = Vec::with_capacity(8);
        let offsets: [(i32, i32); 8] = [
            (0, -1),
            (0, 1),
            (-1, 0),
            (1, 0),
            (-1, -1),
            (-1, 1),
            (1, -1),
            (1, 1),
        ];
        for (dr, dc) in offsets {
            let r = row as i32 + dr;
            let col = col as i32 + dc;
            if !(0..3).contains(&r) || col < 0 {
                continue;
            }
            let bytes = self.rows[r as usize].as_bytes();
            if let Some(&b) = bytes.get(col as usize) {
                let ch = b as char;
                if !candidates.contains(&ch) {
                    candidates.push(ch);
                }
            }
        }

        if candidates.is_empty() {
            return c;
        }

        let pick = candidates[rng.range(0, candidates.len() as i64 - 1) as usize];
        if upper {
            pick.to_ascii_uppercase()
        } else {
            pick
        }
    }

    fn locate(&self, lower: char) -> Option<(usize, usize)> {
        for (row, keys) in self.rows.iter().enumerate() {
            if let Some(col) = keys.find(lower) {
                return Some((row, col));
            }
        }
        None
    }
}
