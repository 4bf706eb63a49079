use std::ops::{Deref, Not};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::common::{
    iter::EncRegionIter,
    mask::{compute_total_penalty, MaskPattern},
    metadata::{format_info, ECLevel, Version, FORMAT_INFO_BIT_LEN, VERSION_INFO_BIT_LEN},
};

// Module
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Color {
    Light,
    Dark,
}

impl Color {
    pub fn select<T>(&self, light: T, dark: T) -> T {
        match self {
            Self::Light => light,
            Self::Dark => dark,
        }
    }
}

impl Not for Color {
    type Output = Self;
    fn not(self) -> Self::Output {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl From<bool> for Color {
    fn from(dark: bool) -> Self {
        if dark {
            Self::Dark
        } else {
            Self::Light
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Module {
    Empty,
    Func(Color),
    Version(Color),
    Format(Color),
    Data(Color),
}

impl Deref for Module {
    type Target = Color;
    fn deref(&self) -> &Self::Target {
        match self {
            Module::Empty => &Color::Light,
            Module::Func(c) => c,
            Module::Version(c) => c,
            Module::Format(c) => c,
            Module::Data(c) => c,
        }
    }
}

#[cfg(test)]
fn module_char(m: Module) -> char {
    match m {
        Module::Empty => '.',
        Module::Func(Color::Dark) => 'f',
        Module::Func(Color::Light) => 'F',
        Module::Version(Color::Dark) => 'v',
        Module::Version(Color::Light) => 'V',
        Module::Format(Color::Dark) => 'm',
        Module::Format(Color::Light) => 'M',
        Module::Data(Color::Dark) => 'd',
        Module::Data(Color::Light) => 'D',
    }
}

fn coord_to_index(w: usize, r: i16, c: i16) -> usize {
    let w = w as i16;
    debug_assert!(-w <= r && r < w, "row should be greater than or equal to w");
    debug_assert!(-w <= c && c < w, "column should be greater than or equal to w");

    let r = if r < 0 { r + w } else { r };
    let c = if c < 0 { c + w } else { c };
    (r * w + c) as _
}

// Layout: function patterns and reserved areas of a version, shared by all mask candidates
//------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub(crate) struct Layout {
    grid: Vec<Module>,
    w: usize,
    ver: Version,
}

impl Layout {
    fn empty(ver: Version) -> Self {
        let w = ver.width();
        Self { grid: vec![Module::Empty; w * w], w, ver }
    }

    pub fn new(ver: Version) -> Self {
        let mut layout = Self::empty(ver);
        layout.draw_all_function_patterns();
        layout.reserve_format_area();
        layout.reserve_version_area();
        layout
    }

    pub fn get(&self, r: i16, c: i16) -> Module {
        self.grid[coord_to_index(self.w, r, c)]
    }

    pub fn set(&mut self, r: i16, c: i16, module: Module) {
        let index = coord_to_index(self.w, r, c);
        self.grid[index] = module;
    }

    /// Dark modules that every candidate shares, i.e. function patterns and the dark module.
    pub fn common_dark_modules(&self) -> usize {
        self.grid.iter().filter(|m| !matches!(m, Module::Data(_)) && ***m == Color::Dark).count()
    }

    /// Grid indices of the data modules in placement order.
    pub fn data_path(&self) -> Vec<usize> {
        let path = EncRegionIter::new(self.ver)
            .filter(|&(r, c)| self.get(r, c) == Module::Empty)
            .map(|(r, c)| coord_to_index(self.w, r, c))
            .collect::<Vec<_>>();
        debug_assert!(
            path.len() == self.ver.raw_data_modules(),
            "Data path length mismatch: Path {}, Raw data modules {}",
            path.len(),
            self.ver.raw_data_modules()
        );
        path
    }

    #[cfg(test)]
    pub fn to_debug_str(&self) -> String {
        to_debug_str(&self.grid, self.w)
    }
}

#[cfg(test)]
fn to_debug_str(grid: &[Module], w: usize) -> String {
    let mut res = String::with_capacity(w * (w + 1) + 1);
    res.push('\n');
    for row in grid.chunks(w) {
        res.extend(row.iter().copied().map(module_char));
        res.push('\n');
    }
    res
}


// Finder pattern
//------------------------------------------------------------------------------

impl Layout {
    fn draw_finder_patterns(&mut self) {
        self.draw_finder_pattern_at(3, 3);
        self.draw_finder_pattern_at(3, -4);
        self.draw_finder_pattern_at(-4, 3);
    }

    // Finder pattern with its separator, 8x8 in total
    fn draw_finder_pattern_at(&mut self, r: i16, c: i16) {
        let (dr_left, dr_right) = if r > 0 { (-3, 4) } else { (-4, 3) };
        let (dc_top, dc_bottom) = if c > 0 { (-3, 4) } else { (-4, 3) };
        for i in dr_left..=dr_right {
            for j in dc_top..=dc_bottom {
                self.set(
                    r + i,
                    c + j,
                    match (i, j) {
                        (4 | -4, _) | (_, 4 | -4) => Module::Func(Color::Light),
                        (3 | -3, _) | (_, 3 | -3) => Module::Func(Color::Dark),
                        (2 | -2, _) | (_, 2 | -2) => Module::Func(Color::Light),
                        _ => Module::Func(Color::Dark),
                    },
                );
            }
        }
    }
}


// Timing pattern
//------------------------------------------------------------------------------

impl Layout {
    fn draw_timing_pattern(&mut self) {
        let w = self.w as i16;
        let (off, last) = (6, w - 9);
        self.draw_line(off, 8, off, last);
        self.draw_line(8, off, last, off);
    }

    fn draw_line(&mut self, r1: i16, c1: i16, r2: i16, c2: i16) {
        debug_assert!(r1 == r2 || c1 == c2, "Line is neither vertical nor horizontal");

        if r1 == r2 {
            for j in c1..=c2 {
                self.set(r1, j, Module::Func(Color::from(j & 1 == 0)));
            }
        } else {
            for i in r1..=r2 {
                self.set(i, c1, Module::Func(Color::from(i & 1 == 0)));
            }
        }
    }
}

#[cfg(test)]
mod timing_pattern_tests {
    use super::Layout;
    use crate::common::metadata::Version;

    #[test]
    fn test_timing_pattern_1() {
        let mut layout = Layout::empty(Version(1));
        layout.draw_timing_pattern();
        assert_eq!(
            layout.to_debug_str(),
            "\n\
             .....................\n\
             .....................\n\
             .....................\n\
             .....................\n\
             .....................\n\
             .....................\n\
             ........fFfFf........\n\
             .....................\n\
             ......f..............\n\
             ......F..............\n\
             ......f..............\n\
             ......F..............\n\
             ......f..............\n\
             .....................\n\
             .....................\n\
             .....................\n\
             .....................\n\
             .....................\n\
             .....................\n\
             .....................\n\
             .....................\n"
        );
    }
}

// Alignment pattern
//------------------------------------------------------------------------------

impl Layout {
    fn draw_alignment_patterns(&mut self) {
        let poses = self.ver.alignment_pattern();
        for &r in poses {
            for &c in poses {
                self.draw_alignment_pattern_at(r as i16, c as i16)
            }
        }
    }

    fn draw_alignment_pattern_at(&mut self, r: i16, c: i16) {
        let w = self.w as i16;
        // Centers that collide with a finder pattern
        if (r == 6 && (c == 6 || c - w == -7)) || (r - w == -7 && c == 6) {
            return;
        }
        for i in -2..=2 {
            for j in -2..=2 {
                self.set(
                    r + i,
                    c + j,
                    match (i, j) {
                        (-2 | 2, _) | (_, -2 | 2) | (0, 0) => Module::Func(Color::Dark),
                        _ => Module::Func(Color::Light),
                    },
                )
            }
        }
    }
}


// All function patterns
//------------------------------------------------------------------------------

impl Layout {
    fn draw_all_function_patterns(&mut self) {
        self.draw_finder_patterns();
        self.draw_timing_pattern();
        self.draw_alignment_patterns();
    }
}

// Format & version info
//------------------------------------------------------------------------------

impl Layout {
    fn reserve_format_area(&mut self) {
        self.draw_format_info(0);
    }

    fn reserve_version_area(&mut self) {
        if *self.ver >= 7 {
            self.draw_version_info(0);
        }
    }

    fn draw_format_info(&mut self, format_info: u32) {
        for coords in [&FORMAT_INFO_COORDS_QR_MAIN, &FORMAT_INFO_COORDS_QR_SIDE] {
            self.draw_number(
                format_info,
                FORMAT_INFO_BIT_LEN,
                Module::Format(Color::Light),
                Module::Format(Color::Dark),
                coords,
            );
        }
        self.set(-8, 8, Module::Format(Color::Dark));
    }

    fn draw_version_info(&mut self, ver_info: u32) {
        debug_assert!(*self.ver >= 7, "Version info is drawn only from version 7");
        for coords in [&VERSION_INFO_COORDS_BL, &VERSION_INFO_COORDS_TR] {
            self.draw_number(
                ver_info,
                VERSION_INFO_BIT_LEN,
                Module::Version(Color::Light),
                Module::Version(Color::Dark),
                coords,
            );
        }
    }

    // Draws `number` most significant bit first over `coords`
    fn draw_number(
        &mut self,
        number: u32,
        bit_len: usize,
        off_clr: Module,
        on_clr: Module,
        coords: &[(i16, i16)],
    ) {
        debug_assert!(coords.len() == bit_len, "Coordinate count doesn't match bit length");
        let mut mask = 1 << (bit_len - 1);
        for (r, c) in coords {
            if number & mask == 0 {
                self.set(*r, *c, off_clr);
            } else {
                self.set(*r, *c, on_clr);
            }
            mask >>= 1;
        }
    }
}

#[cfg(test)]
mod qr_information_tests {
    use super::{Color, Layout, Module};
    use crate::common::metadata::Version;

    #[test]
    fn test_reserve_version_area_1() {
        let mut layout = Layout::empty(Version(1));
        layout.reserve_version_area();
        assert!(layout.grid.iter().all(|m| *m == Module::Empty));
    }

    #[test]
    fn test_version_info_7() {
        let mut layout = Layout::empty(Version(7));
        layout.draw_version_info(Version(7).info());
        let tr = "\n\
                  ..................................VVv........\n\
                  ..................................VvV........\n\
                  ..................................VvV........\n\
                  ..................................Vvv........\n\
                  ..................................vvv........\n\
                  ..................................VVV........\n";
        assert_eq!(&layout.to_debug_str()[..tr.len()], tr);
        // Bottom left block is the transpose of the top right one
        for r in 0..6 {
            for c in 34..37 {
                assert_eq!(layout.get(r, c), layout.get(c, r));
            }
        }
    }

    #[test]
    fn test_reserve_format_area() {
        let mut layout = Layout::empty(Version(1));
        layout.reserve_format_area();
        assert_eq!(
            layout.to_debug_str(),
            "\n\
             ........M............\n\
             ........M............\n\
             ........M............\n\
             ........M............\n\
             ........M............\n\
             ........M............\n\
             .....................\n\
             ........M............\n\
             MMMMMM.MM....MMMMMMMM\n\
             .....................\n\
             .....................\n\
             .....................\n\
             .....................\n\
             ........m............\n\
             ........M............\n\
             ........M............\n\
             ........M............\n\
             ........M............\n\
             ........M............\n\
             ........M............\n\
             ........M............\n"
        );
    }

    #[test]
    fn test_format_info_placement() {
        // L, mask 4 => 110011000101111
        let mut layout = Layout::empty(Version(1));
        layout.draw_format_info(0b110011000101111);
        let bit = |r, c| layout.get(r, c) == Module::Format(Color::Dark);
        let main = [(8, 0), (8, 1), (8, 2), (8, 3), (8, 4), (8, 5), (8, 7), (8, 8)];
        let bits = main.iter().map(|&(r, c)| bit(r, c)).collect::<Vec<_>>();
        assert_eq!(bits, vec![true, true, false, false, true, true, false, false]);
        let side = [(20, 8), (19, 8), (18, 8), (17, 8), (16, 8), (15, 8), (14, 8)];
        let bits = side.iter().map(|&(r, c)| bit(r, c)).collect::<Vec<_>>();
        assert_eq!(bits, vec![true, true, false, false, true, true, false]);
        assert!(bit(13, 8));
        assert!(bit(0, 8) && bit(8, 20));
    }
}

// Mask candidates
//------------------------------------------------------------------------------

/// One fully masked symbol, function patterns included and format areas left light.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub mask: MaskPattern,
    pub grid: Vec<bool>,
    // Dark data modules after masking
    pub dark: usize,
}

impl Candidate {
    fn new(layout: &Layout, path: &[usize], codewords: &[u8], mask: MaskPattern) -> Self {
        let w = layout.w;
        let mut grid = layout.grid.iter().map(|m| **m == Color::Dark).collect::<Vec<_>>();
        let dark = path.iter().enumerate().fold(0, |dark, (k, &idx)| {
            let (r, c) = ((idx / w) as i32, (idx % w) as i32);
            let bit = mask.apply(r, c, codeword_bit(codewords, k));
            grid[idx] = bit;
            dark + bit as usize
        });
        Self { mask, grid, dark }
    }

    fn penalty(&self, w: usize, common_dark: usize) -> u32 {
        compute_total_penalty(&self.grid, w, self.dark + common_dark)
    }
}

// Bit `k` of the codeword stream, MSB first. Zero past the end.
fn codeword_bit(codewords: &[u8], k: usize) -> bool {
    codewords.get(k >> 3).is_some_and(|b| (b >> (7 - (k & 7))) & 1 == 1)
}

fn build_candidates(
    layout: &Layout,
    path: &[usize],
    codewords: &[u8],
    masks: Vec<MaskPattern>,
) -> Vec<Candidate> {
    #[cfg(feature = "parallel")]
    let masks = masks.into_par_iter();
    #[cfg(not(feature = "parallel"))]
    let masks = masks.into_iter();

    masks.map(|m| Candidate::new(layout, path, codewords, m)).collect::<Vec<_>>()
}

// Lowest penalty wins, ties go to the lowest mask index
fn select_best(candidates: Vec<Candidate>, w: usize, common_dark: usize) -> Option<Candidate> {
    #[cfg(feature = "parallel")]
    let scores = candidates.par_iter().map(|c| c.penalty(w, common_dark)).collect::<Vec<_>>();
    #[cfg(not(feature = "parallel"))]
    let scores = candidates.iter().map(|c| c.penalty(w, common_dark)).collect::<Vec<_>>();

    for (c, s) in candidates.iter().zip(scores.iter()) {
        trace!(mask = *c.mask, score = *s, "Scored mask candidate");
    }
    candidates.into_iter().zip(scores).min_by_key(|(_, s)| *s).map(|(c, _)| c)
}


// QR
//------------------------------------------------------------------------------

/// A finished symbol. The module grid excludes the outline, which is added on read.
#[derive(Debug, Clone)]
pub struct QR {
    grid: Vec<Module>,
    w: usize,
    ver: Version,
    ecl: ECLevel,
    mask: MaskPattern,
    outline: usize,
}

impl QR {
    /// Lays out the interleaved codewords for `ver`, picks a mask unless one is forced and
    /// writes the format & version info.
    pub(crate) fn new(
        ver: Version,
        ecl: ECLevel,
        codewords: &[u8],
        mask: Option<MaskPattern>,
        outline: usize,
    ) -> Self {
        debug_assert!(
            codewords.len() == ver.total_codewords(),
            "Codeword count mismatch: Codewords {}, Total codewords {}",
            codewords.len(),
            ver.total_codewords()
        );

        let mut layout = Layout::new(ver);
        let path = layout.data_path();
        let common_dark = layout.common_dark_modules();
        debug!(
            version = *ver,
            data_modules = path.len(),
            remainder_bits = ver.remainder_bits(),
            common_dark,
            "Reserved function modules"
        );

        let w = layout.w;
        let winner = match mask {
            Some(m) => {
                debug!(mask = *m, "Applying requested mask");
                Candidate::new(&layout, &path, codewords, m)
            }
            None => {
                let masks = MaskPattern::all().collect();
                let candidates = build_candidates(&layout, &path, codewords, masks);
                select_best(candidates, w, common_dark).unwrap_or_else(|| {
                    Candidate::new(&layout, &path, codewords, MaskPattern::new(0))
                })
            }
        };
        debug!(mask = *winner.mask, dark = winner.dark + common_dark, "Selected mask");

        for &idx in path.iter() {
            layout.grid[idx] = Module::Data(Color::from(winner.grid[idx]));
        }
        layout.draw_format_info(format_info(ecl, winner.mask));
        if *ver >= 7 {
            layout.draw_version_info(ver.info());
        }
        debug_assert!(!layout.grid.contains(&Module::Empty), "Empty module found in debug");

        Self { grid: layout.grid, w, ver, ecl, mask: winner.mask, outline }
    }

    pub fn version(&self) -> Version {
        self.ver
    }

    /// Modules per side, outline excluded.
    pub fn width(&self) -> usize {
        self.w
    }

    /// Modules per side, outline included.
    pub fn size(&self) -> usize {
        self.w + 2 * self.outline
    }

    pub fn ec_level(&self) -> ECLevel {
        self.ecl
    }

    pub fn mask(&self) -> MaskPattern {
        self.mask
    }

    pub fn outline_width(&self) -> usize {
        self.outline
    }

    pub fn metadata(&self) -> String {
        format!(
            "{{ Version: {}, Ec level: {:?}, Mask: {}, Outline: {} }}",
            *self.ver, self.ecl, *self.mask, self.outline
        )
    }

    pub fn get(&self, r: i16, c: i16) -> Module {
        self.grid[coord_to_index(self.w, r, c)]
    }

    /// Color at (r, c) of the outlined symbol.
    pub fn is_dark(&self, r: usize, c: usize) -> bool {
        let o = self.outline;
        if r < o || c < o || r >= o + self.w || c >= o + self.w {
            return false;
        }
        *self.grid[(r - o) * self.w + (c - o)] == Color::Dark
    }

    /// Outlined symbol, row major, dark as true.
    pub fn to_matrix(&self) -> Vec<Vec<bool>> {
        let sz = self.size();
        (0..sz).map(|r| (0..sz).map(|c| self.is_dark(r, c)).collect()).collect()
    }

    pub fn count_dark_modules(&self) -> usize {
        self.grid.iter().filter(|m| ***m == Color::Dark).count()
    }

    /// Text rendering of the outlined symbol. Light modules are drawn solid to suit dark
    /// terminals.
    pub fn to_str(&self, module_sz: usize) -> String {
        let sz = self.size() * module_sz;
        let mut canvas = String::with_capacity(sz * (sz + 1) * 3);
        for i in 0..sz {
            for j in 0..sz {
                let clr = Color::from(self.is_dark(i / module_sz, j / module_sz));
                canvas.push(clr.select('█', ' '));
            }
            canvas.push('\n');
        }
        canvas
    }

    #[cfg(test)]
    pub fn to_debug_str(&self) -> String {
        to_debug_str(&self.grid, self.w)
    }
}

#[cfg(test)]
mod qr_tests {
    use super::{Color, Module, QR};
    use crate::common::{
        codec::encode,
        ec::{ecc, interleave_blocks},
        mask::MaskPattern,
        metadata::{ECLevel, Version},
    };

    fn build(data: &[u8], ecl: ECLevel, mask: Option<MaskPattern>, outline: usize) -> QR {
        let (bs, ver) = encode(data, ecl).unwrap();
        let codewords = interleave_blocks(&ecc(bs.data(), ver, ecl));
        QR::new(ver, ecl, &codewords, mask, outline)
    }

    #[test]
    fn test_hello_world() {
        let qr = build(b"HELLO WORLD", ECLevel::Q, None, 0);
        assert_eq!(qr.version(), Version(1));
        assert_eq!(qr.width(), 21);
        assert_eq!(qr.size(), 21);
        assert_eq!(qr.get(13, 8), Module::Format(Color::Dark));
        for (r, c) in [(0, 0), (0, 14), (14, 0)] {
            assert_eq!(qr.get(r, c), Module::Func(Color::Dark));
            assert_eq!(qr.get(r + 3, c + 3), Module::Func(Color::Dark));
            assert_eq!(qr.get(r + 1, c + 1), Module::Func(Color::Light));
        }
    }

    #[test]
    fn test_forced_mask() {
        let qr = build(b"HELLO WORLD", ECLevel::Q, Some(MaskPattern::new(5)), 0);
        assert_eq!(qr.mask(), MaskPattern::new(5));
        // Format info main copy holds the mask bits at positions 10..13
        let fi = crate::common::metadata::format_info(ECLevel::Q, MaskPattern::new(5));
        let got = [(8, 0), (8, 1), (8, 2), (8, 3), (8, 4)]
            .iter()
            .fold(0, |acc, &(r, c)| (acc << 1) | (*qr.get(r, c) == Color::Dark) as u32);
        assert_eq!(got, fi >> 10);
    }

    #[test]
    fn test_outline() {
        let qr = build(b"HELLO WORLD", ECLevel::Q, None, 4);
        assert_eq!(qr.size(), 29);
        let m = qr.to_matrix();
        assert_eq!(m.len(), 29);
        assert!(m[..4].iter().all(|row| row.iter().all(|&b| !b)));
        assert!(m.iter().all(|row| row[..4].iter().all(|&b| !b) && row[25..].iter().all(|&b| !b)));
        assert!(m[4][4] && qr.is_dark(4, 4));
        assert_eq!(qr.count_dark_modules(), m.iter().flatten().filter(|&&b| b).count());
    }

    #[test]
    fn test_version_info_drawn() {
        let data = "a".repeat(150);
        let qr = build(data.as_bytes(), ECLevel::M, None, 0);
        assert!(*qr.version() >= 7);
        let info = qr.version().info();
        let w = qr.width() as i16;
        // Bit 0 sits at the top right corner of the top right block
        assert_eq!(*qr.get(0, w - 11) == Color::Dark, info & 1 == 1);
        assert_eq!(*qr.get(5, w - 9) == Color::Dark, (info >> 17) & 1 == 1);
    }

    #[test]
    fn test_to_str() {
        let qr = build(b"1", ECLevel::L, None, 1);
        let s = qr.to_str(1);
        let lines = s.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 23);
        assert!(lines[0].chars().all(|c| c == '█'));
        assert_eq!(lines[1].chars().nth(1), Some(' '));
        assert!(qr.to_debug_str().contains('d') || qr.to_debug_str().contains('D'));
    }
}

// Global constants
//------------------------------------------------------------------------------

// Most significant bit first
static FORMAT_INFO_COORDS_QR_MAIN: [(i16, i16); 15] = [
    (8, 0),
    (8, 1),
    (8, 2),
    (8, 3),
    (8, 4),
    (8, 5),
    (8, 7),
    (8, 8),
    (7, 8),
    (5, 8),
    (4, 8),
    (3, 8),
    (2, 8),
    (1, 8),
    (0, 8),
];

static FORMAT_INFO_COORDS_QR_SIDE: [(i16, i16); 15] = [
    (-1, 8),
    (-2, 8),
    (-3, 8),
    (-4, 8),
    (-5, 8),
    (-6, 8),
    (-7, 8),
    (8, -8),
    (8, -7),
    (8, -6),
    (8, -5),
    (8, -4),
    (8, -3),
    (8, -2),
    (8, -1),
];

static VERSION_INFO_COORDS_BL: [(i16, i16); 18] = [
    (-9, 5),
    (-10, 5),
    (-11, 5),
    (-9, 4),
    (-10, 4),
    (-11, 4),
    (-9, 3),
    (-10, 3),
    (-11, 3),
    (-9, 2),
    (-10, 2),
    (-11, 2),
    (-9, 1),
    (-10, 1),
    (-11, 1),
    (-9, 0),
    (-10, 0),
    (-11, 0),
];

static VERSION_INFO_COORDS_TR: [(i16, i16); 18] = [
    (5, -9),
    (5, -10),
    (5, -11),
    (4, -9),
    (4, -10),
    (4, -11),
    (3, -9),
    (3, -10),
    (3, -11),
    (2, -9),
    (2, -10),
    (2, -11),
    (1, -9),
    (1, -10),
    (1, -11),
    (0, -9),
    (0, -10),
    (0, -11),
];
