use std::ops::Deref;

use super::error::{QRError, QRResult};

// Mask pattern
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Hash)]
pub struct MaskPattern(u8);

impl MaskPattern {
    pub const COUNT: u8 = 8;

    pub(crate) fn new(pattern: u8) -> Self {
        debug_assert!(pattern < Self::COUNT, "Invalid masking pattern");
        Self(pattern)
    }

    pub fn try_new(pattern: u8) -> QRResult<Self> {
        if pattern < Self::COUNT {
            Ok(Self(pattern))
        } else {
            Err(QRError::InvalidMaskPattern)
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (0..Self::COUNT).map(Self)
    }
}

impl Deref for MaskPattern {
    type Target = u8;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

mod mask_functions {
    pub fn checkerboard(r: i32, c: i32) -> bool {
        (r + c) & 1 == 0
    }

    pub fn horizontal_lines(r: i32, _: i32) -> bool {
        r & 1 == 0
    }

    pub fn vertical_lines(_: i32, c: i32) -> bool {
        c % 3 == 0
    }

    pub fn diagonal_lines(r: i32, c: i32) -> bool {
        (r + c) % 3 == 0
    }

    pub fn large_checkerboard(r: i32, c: i32) -> bool {
        ((r >> 1) + (c / 3)) & 1 == 0
    }

    pub fn fields(r: i32, c: i32) -> bool {
        ((r * c) & 1) + ((r * c) % 3) == 0
    }

    pub fn diamonds(r: i32, c: i32) -> bool {
        (((r * c) & 1) + ((r * c) % 3)) & 1 == 0
    }

    pub fn meadow(r: i32, c: i32) -> bool {
        (((r + c) & 1) + ((r * c) % 3)) & 1 == 0
    }
}

impl MaskPattern {
    pub fn mask_functions(self) -> fn(i32, i32) -> bool {
        debug_assert!(*self < Self::COUNT, "Invalid pattern");

        match *self {
            0b000 => mask_functions::checkerboard,
            0b001 => mask_functions::horizontal_lines,
            0b010 => mask_functions::vertical_lines,
            0b011 => mask_functions::diagonal_lines,
            0b100 => mask_functions::large_checkerboard,
            0b101 => mask_functions::fields,
            0b110 => mask_functions::diamonds,
            0b111 => mask_functions::meadow,
            _ => unreachable!(),
        }
    }

    /// Flips `bit` wherever the pattern is set at (r, c).
    #[inline]
    pub fn apply(self, r: i32, c: i32, bit: bool) -> bool {
        bit ^ (self.mask_functions())(r, c)
    }
}

#[cfg(test)]
mod mask_tests {
    use test_case::test_case;

    use super::MaskPattern;
    use crate::common::error::QRError;

    #[test]
    fn test_try_new() {
        assert_eq!(MaskPattern::try_new(7).unwrap(), MaskPattern::new(7));
        assert!(matches!(MaskPattern::try_new(8), Err(QRError::InvalidMaskPattern)));
        assert_eq!(MaskPattern::all().count(), 8);
    }

    #[test]
    fn test_mask_is_toggle() {
        for m in MaskPattern::all() {
            for r in 0..30 {
                for c in 0..30 {
                    for bit in [false, true] {
                        assert_eq!(m.apply(r, c, m.apply(r, c, bit)), bit);
                    }
                }
            }
        }
    }

    // First row and first column of each pattern on a 6x6 patch
    #[test_case(0, "101010", "101010")]
    #[test_case(1, "111111", "101010")]
    #[test_case(2, "100100", "111111")]
    #[test_case(3, "100100", "100100")]
    #[test_case(4, "111000", "110011")]
    #[test_case(5, "111111", "111111")]
    #[test_case(6, "111111", "111111")]
    #[test_case(7, "101010", "101010")]
    fn test_mask_functions(pattern: u8, first_row: &str, first_col: &str) {
        let f = MaskPattern::new(pattern).mask_functions();
        let row = (0..6).map(|c| if f(0, c) { '1' } else { '0' }).collect::<String>();
        let col = (0..6).map(|r| if f(r, 0) { '1' } else { '0' }).collect::<String>();
        assert_eq!(row, first_row);
        assert_eq!(col, first_col);
    }

    #[test]
    fn test_mask_interior() {
        // Row 1 tells the product based patterns apart
        let row = |p: u8| {
            let f = MaskPattern::new(p).mask_functions();
            (0..6).map(|c| f(1, c)).collect::<Vec<_>>()
        };
        assert_eq!(row(5), vec![true, false, false, false, false, false]);
        assert_eq!(row(6), vec![true, true, true, false, false, false]);
        assert_eq!(row(7), vec![false, false, false, true, true, true]);
    }
}

// Penalty scoring
//------------------------------------------------------------------------------

static FINDER_LIKE_PATTERNS: [[bool; 11]; 2] = [
    [true, false, true, true, true, false, true, false, false, false, false],
    [false, false, false, false, true, false, true, true, true, false, true],
];

/// Sum of the four penalty rules over a `w` x `w` grid stored row major. `dark` is the number
/// of dark modules in the grid.
pub fn compute_total_penalty(grid: &[bool], w: usize, dark: usize) -> u32 {
    debug_assert!(grid.len() == w * w, "Grid isn't square: Len {}, Width {w}", grid.len());
    let adj_pen = compute_adjacent_penalty(grid, w);
    let blk_pen = compute_block_penalty(grid, w);
    let fp_pen_h = compute_finder_pattern_penalty(grid, w, true);
    let fp_pen_v = compute_finder_pattern_penalty(grid, w, false);
    let bal_pen = compute_balance_penalty(dark, w * w);
    adj_pen + blk_pen + fp_pen_h + fp_pen_v + bal_pen
}

// Rule 1: 3 for a run of 5 same colored modules, 1 more per extra module
fn compute_adjacent_penalty(grid: &[bool], w: usize) -> u32 {
    let mut pen = 0;
    let mut cols = vec![(false, 0u32); w];
    for r in 0..w {
        let mut last = false;
        let mut consec_row_len = 0u32;
        for (c, col) in cols.iter_mut().enumerate() {
            let clr = grid[r * w + c];
            if c == 0 || last != clr {
                last = clr;
                consec_row_len = 0;
            }
            consec_row_len += 1;
            pen += run_penalty(consec_row_len);

            if r == 0 || col.0 != clr {
                *col = (clr, 0);
            }
            col.1 += 1;
            pen += run_penalty(col.1);
        }
    }
    pen
}

#[inline]
fn run_penalty(len: u32) -> u32 {
    match len {
        0..=4 => 0,
        5 => 3,
        _ => 1,
    }
}

// Rule 2: 3 for each 2x2 block of one color
fn compute_block_penalty(grid: &[bool], w: usize) -> u32 {
    let mut pen = 0;
    for r in 0..w.saturating_sub(1) {
        for c in 0..w - 1 {
            let clr = grid[r * w + c];
            if clr == grid[r * w + c + 1]
                && clr == grid[(r + 1) * w + c]
                && clr == grid[(r + 1) * w + c + 1]
            {
                pen += 3;
            }
        }
    }
    pen
}

// Rule 3: 40 for each 1:1:3:1:1 finder look-alike with 4 light modules on one side
fn compute_finder_pattern_penalty(grid: &[bool], w: usize, is_hor: bool) -> u32 {
    let mut pen = 0;
    let get = |i: usize, j: usize| if is_hor { grid[i * w + j] } else { grid[j * w + i] };
    for i in 0..w {
        for j in 0..w.saturating_sub(10) {
            for pat in FINDER_LIKE_PATTERNS.iter() {
                if pat.iter().enumerate().all(|(k, &p)| get(i, j + k) == p) {
                    pen += 40;
                }
            }
        }
    }
    pen
}

// Rule 4: 10 per 5% step of deviation from an even split, using the closer of the two
// multiples of 5 that bracket the dark percentage
fn compute_balance_penalty(dark: usize, total: usize) -> u32 {
    let scaled = dark * 100;
    let step = total * 5;
    let prev5 = scaled / step * 5;
    let next5 = if scaled % step == 0 { prev5 } else { prev5 + 5 };
    let dev = |p: usize| p.abs_diff(50) / 5;
    (dev(prev5).min(dev(next5)) * 10) as u32
}

#[cfg(test)]
mod penalty_tests {
    use test_case::test_case;

    use super::{
        compute_adjacent_penalty, compute_balance_penalty, compute_block_penalty,
        compute_finder_pattern_penalty, compute_total_penalty,
    };

    fn parse(rows: &[&str]) -> (Vec<bool>, usize) {
        let w = rows.len();
        let grid = rows.iter().flat_map(|r| r.chars().map(|c| c == '#')).collect::<Vec<_>>();
        assert_eq!(grid.len(), w * w);
        (grid, w)
    }

    #[test]
    fn test_adjacent_penalty_runs() {
        // Alternating rows so that columns never run
        let rows = ["#####.", "......", "######", ".#.#.#", "#.#.#.", ".#.#.#"];
        let (grid, w) = parse(&rows);
        // Row 0: run of 5 -> 3; Row 1: run of 6 -> 4; Row 2: run of 6 -> 4
        assert_eq!(compute_adjacent_penalty(&grid, w), 11);
    }

    #[test]
    fn test_adjacent_penalty_columns() {
        let rows = ["#.#.#.", "#.#.#.", "#.#.#.", "#.#.#.", "#.#.#.", ".#.#.#"];
        let (grid, w) = parse(&rows);
        // 6 columns, each with a run of 5
        assert_eq!(compute_adjacent_penalty(&grid, w), 18);
    }

    #[test]
    fn test_block_penalty() {
        let (grid, w) = parse(&["##..", "##..", "..##", "..##"]);
        assert_eq!(compute_block_penalty(&grid, w), 3 * 4);
        let (grid, w) = parse(&["####", "####", "####", "####"]);
        assert_eq!(compute_block_penalty(&grid, w), 3 * 9);
    }

    #[test]
    fn test_finder_pattern_penalty() {
        let mut rows = vec![".#.#.#.#.#.#"; 12];
        rows[0] = "#.###.#.....";
        rows[1] = "....#.###.#.";
        let (grid, w) = parse(&rows);
        assert_eq!(compute_finder_pattern_penalty(&grid, w, true), 80);

        // Transposed
        let t = (0..w).flat_map(|r| (0..w).map(move |c| (r, c))).map(|(r, c)| grid[c * w + r]);
        let t = t.collect::<Vec<_>>();
        assert_eq!(compute_finder_pattern_penalty(&t, w, false), 80);
    }

    #[test_case(50, 100, 0)]
    #[test_case(52, 100, 0)]
    #[test_case(55, 100, 10)]
    #[test_case(43, 100, 10)]
    #[test_case(41, 100, 10)]
    #[test_case(40, 100, 20)]
    #[test_case(61, 100, 20)]
    #[test_case(0, 100, 100)]
    #[test_case(100, 100, 100)]
    #[test_case(220, 441, 0)]
    fn test_balance_penalty(dark: usize, total: usize, exp: u32) {
        assert_eq!(compute_balance_penalty(dark, total), exp);
    }

    #[test]
    fn test_total_penalty_is_deterministic() {
        let w = 21;
        let grid = (0..w * w).map(|i| (i * 7 + i / 3) % 5 < 2).collect::<Vec<_>>();
        let dark = grid.iter().filter(|&&b| b).count();
        let first = compute_total_penalty(&grid, w, dark);
        assert_eq!(first, compute_total_penalty(&grid, w, dark));
    }
}
