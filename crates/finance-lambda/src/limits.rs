//! Limits imposed by the storage engine's attribute format.
//!
//! Decoding of stored attributes rejects input that exceeds these limits;
//! encoding rejects numbers the engine cannot hold.

/// Maximum significant digits in a stored number.
pub const MAX_DECIMAL_DIGITS: usize = 38;

/// Smallest allowed decimal exponent of the most significant digit
/// (magnitudes down to 1E-130).
pub const MIN_DECIMAL_MAGNITUDE: i32 = -130;

/// Largest allowed decimal exponent of the most significant digit
/// (magnitudes up to 9.99...E+125).
pub const MAX_DECIMAL_MAGNITUDE: i32 = 125;

/// Maximum nesting depth accepted when untagging stored attributes.
pub const MAX_NESTING_DEPTH: usize = 32;

/// Decimal exponents with absolute value up to this bound render in plain
/// notation; larger ones use `E` notation.
pub const MAX_PLAIN_EXPONENT: i32 = 20;
