//! Canonical argument identity for cache-hit decisions.
//!
//! A [`Fingerprint`] captures the construction arguments of one `get` call:
//! positional values in call order plus named values sorted by name. Two
//! calls hit the same cache entry exactly when their fingerprints compare
//! equal.
//!
//! Values are compared by canonical form, not by source type: every integer
//! type and every finite float with a zero fractional part canonicalize to
//! the same [`ArgValue::Int`], so `1i32`, `1u64` and `1.0f64` produce equal
//! fingerprints.

/// Canonical form of a single construction argument.
///
/// Conversions are type-insensitive for numbers: integers of any width map
/// to `Int`, and a finite float with no fractional part folds into `Int` as
/// well. `NaN` never compares equal to itself, so a `NaN` argument never
/// produces a cache hit.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// Absent optional argument.
    None,
    Bool(bool),
    Int(i128),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Seq(Vec<ArgValue>),
}

impl ArgValue {
    /// Canonical form for raw byte payloads.
    ///
    /// `Vec<u8>` converts element-wise into a `Seq` of integers like any
    /// other vector; use this when the bytes are one opaque value.
    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        ArgValue::Bytes(value.into())
    }
}

macro_rules! impl_argvalue_from_int {
    ($($t:ty),+ $(,)?) => {
        $(
            impl From<$t> for ArgValue {
                fn from(value: $t) -> Self {
                    ArgValue::Int(value as i128)
                }
            }
        )+
    };
}

impl_argvalue_from_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        // Integral floats share a canonical form with integers; the range
        // guard keeps the cast lossless.
        if value.is_finite()
            && value.fract() == 0.0
            && value >= -(2f64.powi(127))
            && value < 2f64.powi(127)
        {
            ArgValue::Int(value as i128)
        } else {
            ArgValue::Float(value)
        }
    }
}

impl From<f32> for ArgValue {
    fn from(value: f32) -> Self {
        ArgValue::from(value as f64)
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Bool(value)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Str(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Str(value)
    }
}

impl From<&[u8]> for ArgValue {
    fn from(value: &[u8]) -> Self {
        ArgValue::Bytes(value.to_vec())
    }
}

impl<T: Into<ArgValue>> From<Option<T>> for ArgValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => inner.into(),
            None => ArgValue::None,
        }
    }
}

impl<T: Into<ArgValue>> From<Vec<T>> for ArgValue {
    fn from(value: Vec<T>) -> Self {
        ArgValue::Seq(value.into_iter().map(Into::into).collect())
    }
}

/// Canonical identity of one construction call.
///
/// Positional arguments keep call order; named arguments are kept sorted by
/// name, so the order they are supplied in does not matter. Equality of
/// fingerprints is the cache-hit test.
///
/// # Examples
///
/// ```rust
/// use resident_registry::Fingerprint;
///
/// let a = Fingerprint::new().arg(1).kwarg("beta", 0.5);
/// let b = Fingerprint::new().arg(1.0).kwarg("beta", 0.5);
/// assert_eq!(a, b);
///
/// let c = Fingerprint::new().arg(2).kwarg("beta", 0.5);
/// assert_ne!(a, c);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fingerprint {
    args: Vec<ArgValue>,
    kwargs: Vec<(String, ArgValue)>,
}

impl Fingerprint {
    /// An empty fingerprint (a zero-argument construction call).
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<ArgValue>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Add a named argument.
    ///
    /// Supplying the same name twice keeps the last value.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        let name = name.into();
        let value = value.into();
        match self
            .kwargs
            .binary_search_by(|(existing, _)| existing.as_str().cmp(name.as_str()))
        {
            Ok(index) => self.kwargs[index].1 = value,
            Err(index) => self.kwargs.insert(index, (name, value)),
        }
        self
    }

    /// Whether the fingerprint carries no arguments at all.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty() && self.kwargs.is_empty()
    }
}

/// Conversion into a [`Fingerprint`], implemented for argument tuples.
///
/// Lets call sites pass plain tuples of values where a fingerprint is
/// expected; use [`Fingerprint`] directly (or the [`fingerprint!`] macro)
/// when named arguments are involved.
///
/// [`fingerprint!`]: macro@crate::fingerprint
pub trait ToFingerprint {
    fn to_fingerprint(&self) -> Fingerprint;
}

impl ToFingerprint for Fingerprint {
    fn to_fingerprint(&self) -> Fingerprint {
        self.clone()
    }
}

impl ToFingerprint for () {
    fn to_fingerprint(&self) -> Fingerprint {
        Fingerprint::new()
    }
}

macro_rules! impl_to_fingerprint_for_tuple {
    ($($name:ident : $index:tt),+) => {
        impl<$($name),+> ToFingerprint for ($($name,)+)
        where
            $($name: Clone + Into<ArgValue>,)+
        {
            fn to_fingerprint(&self) -> Fingerprint {
                Fingerprint {
                    args: vec![$(self.$index.clone().into(),)+],
                    kwargs: Vec::new(),
                }
            }
        }
    };
}

impl_to_fingerprint_for_tuple!(A: 0);
impl_to_fingerprint_for_tuple!(A: 0, B: 1);
impl_to_fingerprint_for_tuple!(A: 0, B: 1, C: 2);
impl_to_fingerprint_for_tuple!(A: 0, B: 1, C: 2, D: 3);
impl_to_fingerprint_for_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_to_fingerprint_for_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
impl_to_fingerprint_for_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
impl_to_fingerprint_for_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);
