use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

/// A numeric type that can live in a [`ScalarCell`] and be interpolated.
///
/// Implemented for the value types the animation wrapper supports:
/// `f64`, `f32`, `i32` and `i64`.
pub trait Scalar: Copy + PartialEq + fmt::Debug + Send + Sync + 'static {
    fn to_bits(self) -> u64;
    fn from_bits(bits: u64) -> Self;

    /// Linear interpolation between `from` and `to`. `fraction` is in `[0, 1]`;
    /// the endpoints are returned exactly.
    fn lerp(from: Self, to: Self, fraction: f64) -> Self;

    /// Whether this value can be used as an animation target.
    fn is_usable(self) -> bool {
        true
    }
}

impl Scalar for f64 {
    fn to_bits(self) -> u64 {
        f64::to_bits(self)
    }

    fn from_bits(bits: u64) -> Self {
        f64::from_bits(bits)
    }

    fn lerp(from: Self, to: Self, fraction: f64) -> Self {
        if fraction >= 1.0 {
            to
        } else {
            from + (to - from) * fraction
        }
    }

    fn is_usable(self) -> bool {
        self.is_finite()
    }
}

impl Scalar for f32 {
    fn to_bits(self) -> u64 {
        f32::to_bits(self) as u64
    }

    fn from_bits(bits: u64) -> Self {
        f32::from_bits(bits as u32)
    }

    fn lerp(from: Self, to: Self, fraction: f64) -> Self {
        if fraction >= 1.0 {
            to
        } else {
            (from as f64 + (to as f64 - from as f64) * fraction) as f32
        }
    }

    fn is_usable(self) -> bool {
        self.is_finite()
    }
}

impl Scalar for i32 {
    fn to_bits(self) -> u64 {
        self as u32 as u64
    }

    fn from_bits(bits: u64) -> Self {
        bits as u32 as i32
    }

    fn lerp(from: Self, to: Self, fraction: f64) -> Self {
        if fraction >= 1.0 {
            return to;
        }
        let delta = (to as i64 - from as i64) as f64;
        (from as f64 + delta * fraction).round() as i32
    }
}

impl Scalar for i64 {
    fn to_bits(self) -> u64 {
        self as u64
    }

    fn from_bits(bits: u64) -> Self {
        bits as i64
    }

    fn lerp(from: Self, to: Self, fraction: f64) -> Self {
        if fraction >= 1.0 {
            return to;
        }
        let delta = (to as i128 - from as i128) as f64;
        from.saturating_add((delta * fraction).round() as i64)
    }
}

/// A scalar shared between the frame thread and the animation thread.
///
/// Reads and writes are single relaxed atomic operations: a reader sees either
/// the old or the new value, never a mix. Composite values built from several
/// cells (vectors, colors) may be observed mid-update.
pub struct ScalarCell<T: Scalar> {
    bits: AtomicU64,
    _marker: PhantomData<T>,
}

impl<T: Scalar> ScalarCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            bits: AtomicU64::new(value.to_bits()),
            _marker: PhantomData,
        }
    }

    pub fn get(&self) -> T {
        T::from_bits(self.bits.load(Ordering::Relaxed))
    }

    pub fn set(&self, value: T) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }
}

impl<T: Scalar + Default> Default for ScalarCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Scalar> fmt::Debug for ScalarCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.get().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_stores_each_scalar_kind() {
        let f = ScalarCell::new(-12.5f64);
        assert_eq!(f.get(), -12.5);
        let g = ScalarCell::new(3.25f32);
        assert_eq!(g.get(), 3.25);
        let i = ScalarCell::new(-7i32);
        assert_eq!(i.get(), -7);
        let l = ScalarCell::new(99_999_999_999i64);
        assert_eq!(l.get(), 99_999_999_999);
        l.set(i64::MIN);
        assert_eq!(l.get(), i64::MIN);
    }

    #[test]
    fn lerp_hits_endpoints_exactly() {
        assert_eq!(<f64 as Scalar>::lerp(0.0, 60.5, 0.0), 0.0);
        assert_eq!(<f64 as Scalar>::lerp(0.0, 60.5, 1.0), 60.5);
        assert_eq!(<f32 as Scalar>::lerp(0.1, 0.7, 1.0), 0.7);
        assert_eq!(<i32 as Scalar>::lerp(0, 456, 1.0), 456);
        assert_eq!(<i64 as Scalar>::lerp(0, 99_999_999_999, 1.0), 99_999_999_999);
    }

    #[test]
    fn lerp_midpoints() {
        assert_eq!(<f64 as Scalar>::lerp(0.0, 10.0, 0.5), 5.0);
        assert_eq!(<i32 as Scalar>::lerp(0, 10, 0.25), 3);
        assert_eq!(<i32 as Scalar>::lerp(10, 0, 0.5), 5);
        assert_eq!(<i64 as Scalar>::lerp(-100, 100, 0.5), 0);
    }

    #[test]
    fn non_finite_floats_are_unusable() {
        assert!(!f64::NAN.is_usable());
        assert!(!f32::INFINITY.is_usable());
        assert!(1.0f64.is_usable());
        assert!(i32::MAX.is_usable());
    }
}
