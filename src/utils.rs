//! Common small functions used throughout the crate
//!
//! These are left public for the convenience of the user. For example naming
//! family members or prettier formatting for scientific numbers.

use std::fmt::LowerExp;

// external crates
use rand::Rng;

// Alias for the format! macro out of laziness
pub use std::format as f;

/// Extends primitives with more specific formatting options
pub trait NumberFmt {
    /// Better scientific number formatting
    ///
    /// Works for anything that can be represented as scientific using the
    /// LowerExp trait.
    ///
    /// ```rust
    /// # use mili::utils::NumberFmt;
    /// assert_eq!((2.5e-3).sci(3, 2), "2.500e-03".to_string());
    /// assert_eq!((1.0).sci(5, 2), "1.00000e+00".to_string());
    /// ```
    fn sci(&self, precision: usize, exp_pad: usize) -> String;
}

impl<T: LowerExp> NumberFmt for T {
    fn sci(&self, precision: usize, exp_pad: usize) -> String {
        let num = f!("{:.precision$e}", &self, precision = precision);
        let (mantissa, exp) = num.split_at(num.find('e').unwrap_or(num.len()));
        let (sign, exp) = match exp.strip_prefix("e-") {
            Some(exp) => ('-', exp),
            None => ('+', exp.trim_start_matches('e')),
        };
        f!("{mantissa}e{sign}{exp:0>exp_pad$}")
    }
}

/// Name of a domain file within a multi-domain family
///
/// ```rust
/// # use mili::utils::family_member;
/// assert_eq!(family_member("d3samp", 7, 3), "d3samp007");
/// assert_eq!(family_member("d3samp", 12, 5), "d3samp00012");
/// ```
pub fn family_member(root: &str, domain: usize, width: usize) -> String {
    f!("{root}{domain:0width$}")
}

/// Convert an RGB triplet in the `[0, 1]` range to a `#rrggbb` string
///
/// ```rust
/// # use mili::utils::rgb_to_hex;
/// assert_eq!(rgb_to_hex([1.0, 0.5, 0.0]), "#ff7f00");
/// assert_eq!(rgb_to_hex([2.0, -1.0, 0.0]), "#ff0000");
/// ```
pub fn rgb_to_hex(rgb: [f64; 3]) -> String {
    let [r, g, b] = rgb.map(|c| (c.clamp(0.0, 1.0) * 255.0) as u8);
    f!("#{r:02x}{g:02x}{b:02x}")
}

/// A random `#rrggbb` colour for materials that do not define one
pub fn random_hex_colour() -> String {
    let mut rng = rand::thread_rng();
    f!("#{:02x}{:02x}{:02x}", rng.gen::<u8>(), rng.gen::<u8>(), rng.gen::<u8>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_colours_are_well_formed() {
        let colour = random_hex_colour();
        assert_eq!(colour.len(), 7);
        assert!(colour.starts_with('#'));
        assert!(colour[1..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn negative_exponents_keep_their_sign() {
        assert_eq!((-1.5e-12).sci(2, 3), "-1.50e-012");
    }
}
