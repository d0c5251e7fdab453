//! Macros for building fingerprints at call sites.
//!
//! This module provides a call-syntax shorthand for [`crate::Fingerprint`],
//! covering the positional-plus-named argument shape of a construction call.

/// Builds a [`Fingerprint`](crate::Fingerprint) from positional and named
/// arguments.
///
/// Positional arguments come first, in call order. Named arguments follow
/// after a `;`, in any order (they are canonicalized by name).
///
/// # Examples
///
/// ```rust
/// use resident_registry::{fingerprint, Fingerprint};
///
/// // No arguments
/// assert_eq!(fingerprint!(), Fingerprint::new());
///
/// // Positional only
/// let fp = fingerprint!(7, "llama");
/// assert_eq!(fp, Fingerprint::new().arg(7).arg("llama"));
///
/// // Positional and named; named order does not matter
/// let a = fingerprint!(7; beta = 0.5, device = "gpu0");
/// let b = fingerprint!(7; device = "gpu0", beta = 0.5);
/// assert_eq!(a, b);
///
/// // Named only
/// let fp = fingerprint!(; beta = 0.5);
/// assert_eq!(fp, Fingerprint::new().kwarg("beta", 0.5));
/// ```
#[macro_export]
macro_rules! fingerprint {
    () => {
        $crate::Fingerprint::new()
    };
    ($($arg:expr),+ $(,)?) => {{
        let fp = $crate::Fingerprint::new();
        $(let fp = fp.arg($arg);)+
        fp
    }};
    ($($arg:expr),* ; $($name:ident = $value:expr),+ $(,)?) => {{
        let fp = $crate::Fingerprint::new();
        $(let fp = fp.arg($arg);)*
        $(let fp = fp.kwarg(stringify!($name), $value);)+
        fp
    }};
}

#[cfg(test)]
mod tests {
    use crate::Fingerprint;

    #[test]
    fn test_empty_fingerprint() {
        assert_eq!(fingerprint!(), Fingerprint::new());
    }

    #[test]
    fn test_positional_only() {
        let fp = fingerprint!(1, "x", 2.5);
        assert_eq!(fp, Fingerprint::new().arg(1).arg("x").arg(2.5));
    }

    #[test]
    fn test_trailing_comma() {
        assert_eq!(fingerprint!(1, 2,), fingerprint!(1, 2));
    }

    #[test]
    fn test_positional_and_named() {
        let fp = fingerprint!(1; beta = 0.5, gamma = 2);
        assert_eq!(
            fp,
            Fingerprint::new().arg(1).kwarg("beta", 0.5).kwarg("gamma", 2)
        );
    }

    #[test]
    fn test_named_only() {
        let fp = fingerprint!(; beta = 0.5);
        assert_eq!(fp, Fingerprint::new().kwarg("beta", 0.5));
    }

    #[test]
    fn test_named_order_is_canonicalized() {
        assert_eq!(
            fingerprint!(; b = 2, a = 1),
            fingerprint!(; a = 1, b = 2)
        );
    }

    #[test]
    fn test_cross_type_values_match() {
        assert_eq!(fingerprint!(1, 2.0), fingerprint!(1.0, 2));
    }
}
