use std::ops::{Add, AddAssign, Mul, MulAssign};

// Galois field GF(256) under the reducing polynomial x^8 + x^4 + x^3 + x^2 + 1
//------------------------------------------------------------------------------

const PRIMITIVE: u16 = 0x11D;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct G(pub u8);

impl G {
    /// α^i where α = 2 is the generator of the field.
    pub fn gen_pow(i: usize) -> Self {
        G(EXP_TABLE[i % 255])
    }

    pub fn log(self) -> usize {
        debug_assert!(self.0 != 0, "Log of zero is undefined");
        LOG_TABLE[self.0 as usize] as usize
    }
}

impl From<G> for u8 {
    fn from(g: G) -> Self {
        g.0
    }
}

#[allow(clippy::suspicious_arithmetic_impl)]
impl Add for G {
    type Output = G;

    fn add(self, rhs: Self) -> Self::Output {
        G(self.0 ^ rhs.0)
    }
}

impl AddAssign for G {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Mul for G {
    type Output = G;

    fn mul(self, rhs: Self) -> Self::Output {
        if self.0 == 0 || rhs.0 == 0 {
            return G(0);
        }
        G::gen_pow(self.log() + rhs.log())
    }
}

impl MulAssign for G {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

// Generator polynomial
//------------------------------------------------------------------------------

/// Coefficients of (x - α^0)(x - α^1)...(x - α^(degree - 1)), highest power first. The leading
/// coefficient is always 1 and is dropped.
pub fn generator_polynomial(degree: usize) -> Vec<G> {
    let mut poly = vec![G(0); degree];
    if degree == 0 {
        return poly;
    }
    poly[degree - 1] = G(1);

    // Multiply the running product by (x - α^i), keeping it in descending order with an
    // implicit leading 1
    let mut root = G(1);
    for _ in 0..degree {
        for j in 0..degree {
            poly[j] *= root;
            if j + 1 < degree {
                let next = poly[j + 1];
                poly[j] += next;
            }
        }
        root *= G(2);
    }
    poly
}

// Lookup tables
//------------------------------------------------------------------------------

pub static EXP_TABLE: [u8; 255] = build_exp_table();

pub static LOG_TABLE: [u8; 256] = build_log_table();

const fn build_exp_table() -> [u8; 255] {
    let mut table = [0u8; 255];
    let mut x: u16 = 1;
    let mut i = 0;
    while i < 255 {
        table[i] = x as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= PRIMITIVE;
        }
        i += 1;
    }
    table
}

const fn build_log_table() -> [u8; 256] {
    let exp = build_exp_table();
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 255 {
        table[exp[i] as usize] = i as u8;
        i += 1;
    }
    table
}
