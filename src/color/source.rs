//! Enumerates the target color set for a given bit depth and orders it
//! (§4.A).

use std::cmp::Ordering;

use crate::config::OrderMode;
use crate::error::{ErrorKind, Result};
use crate::rng::KdRng;

use super::space::{pack, unpack, Color};

/// Per-channel bit counts `[b_G, b_R, b_B]`, allocated most-to-least
/// perceptually important (green first, then red, then blue):
/// `bits[i] = (B + 2 - i) div 3`.
fn channel_bits(bit_depth: u32) -> [u32; 3] {
    [
        (bit_depth + 2) / 3,
        (bit_depth + 1) / 3,
        bit_depth / 3,
    ]
}

/// A channel's 8-bit stride for `bits` significant bits: the channel value
/// is left-shifted into the high bits of the byte.
fn stride(bits: u32) -> u32 {
    1 << (8 - bits)
}

fn channel_values_to_color(g: u32, r: u32, b: u32, bits: [u32; 3]) -> Color {
    pack(
        (r * stride(bits[1])) as u8,
        (g * stride(bits[0])) as u8,
        (b * stride(bits[2])) as u8,
    )
}

fn enumerate_sequential(bits: [u32; 3]) -> Vec<Color> {
    let (ng, nr, nb) = (1u32 << bits[0], 1u32 << bits[1], 1u32 << bits[2]);
    let mut colors = Vec::with_capacity((ng * nr * nb) as usize);
    // Natural lexicographic order over (b_B, b_R, b_G): B changes slowest.
    for b in 0..nb {
        for r in 0..nr {
            for g in 0..ng {
                colors.push(channel_values_to_color(g, r, b, bits));
            }
        }
    }
    colors
}

/// Distributes the bits of `idx` (an index into the box `bits[0] x bits[1]
/// x bits[2]`) round-robin across the three channels, most significant bit
/// first, skipping any channel once its own budget is exhausted. This is
/// the natural generalization of bit-interleaved (Morton) order to
/// unequal per-channel bit counts.
fn morton_channels(idx: u32, bits: [u32; 3]) -> [u32; 3] {
    let mut values = [0u32; 3];
    let mut remaining = bits;
    let total_bits: u32 = bits.iter().sum();
    let mut bit_pos = total_bits;
    let mut channel = 0usize;
    while bit_pos > 0 {
        while remaining[channel] == 0 {
            channel = (channel + 1) % 3;
        }
        bit_pos -= 1;
        let bit = (idx >> bit_pos) & 1;
        values[channel] = (values[channel] << 1) | bit;
        remaining[channel] -= 1;
        channel = (channel + 1) % 3;
    }
    values
}

fn enumerate_morton(bits: [u32; 3]) -> Vec<Color> {
    let n: u32 = 1 << bits.iter().sum::<u32>();
    (0..n)
        .map(|idx| {
            let [g, r, b] = morton_channels(idx, bits);
            channel_values_to_color(g, r, b, bits)
        })
        .collect()
}

/// Skilling's Hilbert-curve transpose representation: undoes the Gray
/// encoding and the excess per-level mixing, turning an index's transpose
/// form back into axis coordinates. `x` has one entry per axis, each a
/// `b`-bit value; all axes share the same bit depth `b` here (the caller
/// pads to `max(bits)` and filters out-of-box points).
fn transpose_to_axes(x: &mut [u32; 3], b: u32) {
    let n = x.len();
    let hi: u32 = 2 << (b - 1);
    let mut t = x[n - 1] >> 1;
    for i in (1..n).rev() {
        x[i] ^= x[i - 1];
    }
    x[0] ^= t;
    let mut q = 2u32;
    while q != hi {
        let p = q - 1;
        for i in (0..n).rev() {
            if x[i] & q != 0 {
                x[0] ^= p;
            } else {
                t = (x[0] ^ x[i]) & p;
                x[0] ^= t;
                x[i] ^= t;
            }
        }
        q <<= 1;
    }
}

/// Splits a Hilbert distance `d` (an `n*b`-bit integer) into its transpose
/// form: level `0` (the most significant bits) fills bit `b-1` of each
/// axis, one axis-bit per level.
fn deinterleave_to_transpose(d: u64, b: u32) -> [u32; 3] {
    let n = 3usize;
    let mut x = [0u32; 3];
    let total_bits = b as usize * n;
    for k in 0..total_bits {
        let shift = total_bits - 1 - k;
        let bit = ((d >> shift) & 1) as u32;
        let level = (k / n) as u32;
        let axis = k % n;
        x[axis] |= bit << (b - 1 - level);
    }
    x
}

fn hilbert_point(d: u64, b: u32) -> [u32; 3] {
    let mut x = deinterleave_to_transpose(d, b);
    transpose_to_axes(&mut x, b);
    x
}

/// Walks the standard (equal-bit-depth) 3-D Hilbert curve over a cube of
/// side `2^max(bits)` and keeps only the points that land inside our
/// `bits[0] x bits[1] x bits[2]` box, in curve order. Every point in the
/// box is visited exactly once, so this is a permutation of the sequential
/// enumeration (only the relative order differs) even though per-channel
/// bit counts are not all equal.
fn enumerate_hilbert(bits: [u32; 3]) -> Vec<Color> {
    let b = *bits.iter().max().unwrap();
    let total = 1u64 << (3 * b);
    let want = 1usize << bits.iter().sum::<u32>();
    let mut colors = Vec::with_capacity(want);
    let (gmax, rmax, bmax) = (1u32 << bits[0], 1u32 << bits[1], 1u32 << bits[2]);
    for d in 0..total {
        let [g, r, bl] = hilbert_point(d, b);
        if g < gmax && r < rmax && bl < bmax {
            colors.push(channel_values_to_color(g, r, bl, bits));
        }
    }
    debug_assert_eq!(colors.len(), want);
    colors
}

/// Which of the comparator's three strictly-ordered regions a color's
/// `(d, n)` pair falls into: `d>=0 && n>=0` before `d<0` before
/// `d>=0 && n<0`.
fn hue_region(d: i64, n: i64) -> u8 {
    if d >= 0 && n >= 0 {
        0
    } else if d < 0 {
        1
    } else {
        2
    }
}

/// Total order on 24-bit colors that agrees with
/// `atan2(sqrt(3)*(G-B), 2R-G-B) mod 2*pi`, computed without calling
/// `atan2` or any other trig function (§4.A, tested by S4).
fn cmp_hue(a: Color, b: Color) -> Ordering {
    let (ar, ag, ab) = unpack(a);
    let (br, bg, bb) = unpack(b);
    let na = ag as i64 - ab as i64;
    let da = 2 * ar as i64 - ag as i64 - ab as i64;
    let nb = bg as i64 - bb as i64;
    let db = 2 * br as i64 - bg as i64 - bb as i64;

    let ra = hue_region(da, na);
    let rb = hue_region(db, nb);
    if ra != rb {
        return ra.cmp(&rb);
    }
    // Within a region both denominators share a sign, so the cross
    // products compare the same way a ratio comparison would. This also
    // handles the n=0 "angle zero" point directly: no division ever
    // happens, so there is no 0/0 to special-case.
    (na * db).cmp(&(nb * da))
}

/// Enumerates the `2^bit_depth` colors for a run and orders them per
/// `order`. The multiset of colors depends only on `bit_depth` (property
/// 8); `order` only changes the sequence they come out in.
pub fn enumerate(bit_depth: u32, order: OrderMode, rng: &mut KdRng) -> Result<Vec<Color>> {
    if bit_depth < 2 || bit_depth > 24 {
        return Err(ErrorKind::InvalidBitDepth(bit_depth).into());
    }
    let bits = channel_bits(bit_depth);
    let mut colors = match order {
        OrderMode::Sequential => enumerate_sequential(bits),
        OrderMode::Morton => enumerate_morton(bits),
        OrderMode::Hilbert => enumerate_hilbert(bits),
        OrderMode::HueSort => {
            let mut colors = enumerate_sequential(bits);
            colors.sort_by(|&a, &b| cmp_hue(a, b));
            colors
        }
        OrderMode::Random => enumerate_sequential(bits),
    };
    if order == OrderMode::Random {
        rng.shuffle(&mut colors);
    }
    Ok(colors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn channel_bits_split_evenly_at_24() {
        assert_eq!(channel_bits(24), [8, 8, 8]);
    }

    #[test]
    fn enumeration_count_matches_bit_depth() {
        for b in 2..=16u32 {
            let bits = channel_bits(b);
            assert_eq!(enumerate_sequential(bits).len(), 1usize << b);
        }
    }

    #[test]
    fn sequential_colors_are_unique() {
        let bits = channel_bits(10);
        let colors = enumerate_sequential(bits);
        let set: HashSet<_> = colors.iter().copied().collect();
        assert_eq!(set.len(), colors.len());
    }

    #[test]
    fn morton_and_hilbert_are_permutations_of_sequential() {
        for b in [2, 5, 8, 10] {
            let bits = channel_bits(b);
            let mut seq = enumerate_sequential(bits);
            let mut morton = enumerate_morton(bits);
            let mut hilbert = enumerate_hilbert(bits);
            seq.sort_unstable();
            morton.sort_unstable();
            hilbert.sort_unstable();
            assert_eq!(seq, morton, "morton mismatch at bit depth {}", b);
            assert_eq!(seq, hilbert, "hilbert mismatch at bit depth {}", b);
        }
    }

    #[test]
    fn hue_primary_colors_in_expected_order() {
        let red = pack(0xFF, 0, 0);
        let green = pack(0, 0xFF, 0);
        let blue = pack(0, 0, 0xFF);
        assert_eq!(cmp_hue(red, green), Ordering::Less);
        assert_eq!(cmp_hue(green, blue), Ordering::Less);
        assert_eq!(cmp_hue(red, blue), Ordering::Less);
    }

    #[test]
    fn invalid_bit_depth_is_rejected() {
        let mut rng = KdRng::seed_from_u32(0);
        assert!(enumerate(1, OrderMode::Sequential, &mut rng).is_err());
        assert!(enumerate(25, OrderMode::Sequential, &mut rng).is_err());
    }

    #[test]
    fn random_order_is_seed_reproducible() {
        let mut rng_a = KdRng::seed_from_u32(99);
        let mut rng_b = KdRng::seed_from_u32(99);
        let a = enumerate(8, OrderMode::Random, &mut rng_a).unwrap();
        let b = enumerate(8, OrderMode::Random, &mut rng_b).unwrap();
        assert_eq!(a, b);
    }
}
