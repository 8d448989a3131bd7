//! Build-wide floating-point precision.

/// Floating-point type used by every buffer and kernel in this build.
#[cfg(not(feature = "single-precision"))]
pub type Real = f64;

/// Floating-point type used by every buffer and kernel in this build.
#[cfg(feature = "single-precision")]
pub type Real = f32;

/// Complex number over [`Real`].
pub type Complex = num_complex::Complex<Real>;

/// Name of [`Real`] in C-family kernel languages.
#[cfg(not(feature = "single-precision"))]
pub const REAL_C_NAME: &str = "double";

/// Name of [`Real`] in C-family kernel languages.
#[cfg(feature = "single-precision")]
pub const REAL_C_NAME: &str = "float";
