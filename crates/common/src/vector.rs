use std::fmt;
use std::sync::Arc;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::scalar::ScalarCell;

/// X/Y/Z axis, used by the per-component [`Vector3`] helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// A vector with this axis's component set to 1 and the others 0.
    pub fn unit_vector(self) -> DVec3 {
        match self {
            Self::X => DVec3::X,
            Self::Y => DVec3::Y,
            Self::Z => DVec3::Z,
        }
    }

    /// Next axis in the cycle X, Y, Z, X, ...
    pub fn next(self) -> Self {
        match self {
            Self::X => Self::Y,
            Self::Y => Self::Z,
            Self::Z => Self::X,
        }
    }
}

/// A mutable x/y/z triple that can be shared with the animation engine.
///
/// Components are individually atomic, so every mutator takes `&self` and the
/// vector is normally held as `Arc<Vector3>`. Mutators return `&Self` for
/// chaining. Hand out a [`ReadonlyVector3`] where callers must not mutate.
#[derive(Default)]
pub struct Vector3 {
    x: ScalarCell<f64>,
    y: ScalarCell<f64>,
    z: ScalarCell<f64>,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: ScalarCell::new(x),
            y: ScalarCell::new(y),
            z: ScalarCell::new(z),
        }
    }

    pub fn shared(x: f64, y: f64, z: f64) -> Arc<Self> {
        Arc::new(Self::new(x, y, z))
    }

    /// Snapshot of the current components.
    pub fn get(&self) -> DVec3 {
        DVec3::new(self.x.get(), self.y.get(), self.z.get())
    }

    pub fn x(&self) -> f64 {
        self.x.get()
    }

    pub fn y(&self) -> f64 {
        self.y.get()
    }

    pub fn z(&self) -> f64 {
        self.z.get()
    }

    pub fn component(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x(),
            Axis::Y => self.y(),
            Axis::Z => self.z(),
        }
    }

    /// Independent mutable vector with the same components.
    pub fn copy(&self) -> Vector3 {
        Vector3::from(self.get())
    }

    pub fn readonly(self: &Arc<Self>) -> ReadonlyVector3 {
        ReadonlyVector3(Arc::clone(self))
    }

    // --- mutators ---

    pub fn set(&self, v: DVec3) -> &Self {
        self.x.set(v.x);
        self.y.set(v.y);
        self.z.set(v.z);
        self
    }

    pub fn set_x(&self, x: f64) -> &Self {
        self.x.set(x);
        self
    }

    pub fn set_y(&self, y: f64) -> &Self {
        self.y.set(y);
        self
    }

    pub fn set_z(&self, z: f64) -> &Self {
        self.z.set(z);
        self
    }

    pub fn set_component(&self, axis: Axis, value: f64) -> &Self {
        match axis {
            Axis::X => self.set_x(value),
            Axis::Y => self.set_y(value),
            Axis::Z => self.set_z(value),
        }
    }

    pub fn add(&self, v: DVec3) -> &Self {
        self.set(self.get() + v)
    }

    pub fn subtract(&self, v: DVec3) -> &Self {
        self.set(self.get() - v)
    }

    pub fn scale(&self, factor: f64) -> &Self {
        self.set(self.get() * factor)
    }

    pub fn negate(&self) -> &Self {
        self.set(-self.get())
    }

    /// Scale to unit length. A zero vector stays zero.
    pub fn normalize(&self) -> &Self {
        self.set(self.get().normalize_or_zero())
    }

    /// Replace with the cross product `self × v`.
    pub fn cross(&self, v: DVec3) -> &Self {
        self.set(self.get().cross(v))
    }

    /// Replace with the point halfway between `self` and `v`.
    pub fn midpoint(&self, v: DVec3) -> &Self {
        self.set(self.get().lerp(v, 0.5))
    }

    /// Move `alpha` of the way towards `v`.
    pub fn interpolate(&self, v: DVec3, alpha: f64) -> &Self {
        self.set(self.get().lerp(v, alpha))
    }

    pub fn zero(&self) -> &Self {
        self.set(DVec3::ZERO)
    }

    // --- queries ---

    pub fn dot(&self, v: DVec3) -> f64 {
        self.get().dot(v)
    }

    pub fn length(&self) -> f64 {
        self.get().length()
    }

    pub fn distance(&self, v: DVec3) -> f64 {
        self.get().distance(v)
    }

    pub fn is_zero(&self) -> bool {
        self.get() == DVec3::ZERO
    }

    pub fn approx_eq(&self, v: DVec3, epsilon: f64) -> bool {
        self.get().abs_diff_eq(v, epsilon)
    }
}

impl From<DVec3> for Vector3 {
    fn from(v: DVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl fmt::Debug for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.get();
        write!(f, "({}, {}, {})", v.x, v.y, v.z)
    }
}

/// Read-only view of a shared [`Vector3`].
///
/// Observes later mutations of the underlying vector (including animation),
/// but exposes no way to make them.
#[derive(Clone)]
pub struct ReadonlyVector3(Arc<Vector3>);

impl ReadonlyVector3 {
    pub fn get(&self) -> DVec3 {
        self.0.get()
    }

    pub fn x(&self) -> f64 {
        self.0.x()
    }

    pub fn y(&self) -> f64 {
        self.0.y()
    }

    pub fn z(&self) -> f64 {
        self.0.z()
    }

    pub fn component(&self, axis: Axis) -> f64 {
        self.0.component(axis)
    }

    /// New mutable vector with the same components; shares nothing.
    pub fn copy(&self) -> Vector3 {
        self.0.copy()
    }

    /// Whether this view observes the given vector.
    pub fn views(&self, vector: &Arc<Vector3>) -> bool {
        Arc::ptr_eq(&self.0, vector)
    }
}

impl fmt::Debug for ReadonlyVector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutators_chain() {
        let v = Vector3::new(1.0, 2.0, 3.0);
        v.add(DVec3::ONE).scale(2.0).set_y(-1.0);
        assert_eq!(v.get(), DVec3::new(4.0, -1.0, 8.0));
    }

    #[test]
    fn normalize_zero_stays_zero() {
        let v = Vector3::default();
        v.normalize();
        assert!(v.is_zero());

        let w = Vector3::new(0.0, 3.0, 4.0);
        w.normalize();
        assert!(w.approx_eq(DVec3::new(0.0, 0.6, 0.8), 1e-12));
    }

    #[test]
    fn cross_and_midpoint() {
        let v = Vector3::from(DVec3::X);
        v.cross(DVec3::Y);
        assert_eq!(v.get(), DVec3::Z);

        let m = Vector3::new(0.0, 0.0, 0.0);
        m.midpoint(DVec3::new(2.0, 4.0, -6.0));
        assert_eq!(m.get(), DVec3::new(1.0, 2.0, -3.0));
    }

    #[test]
    fn components_by_axis() {
        let v = Vector3::new(1.0, 2.0, 3.0);
        v.set_component(Axis::Z, 9.0);
        assert_eq!(v.component(Axis::X), 1.0);
        assert_eq!(v.component(Axis::Z), 9.0);
        assert_eq!(Axis::Z.next(), Axis::X);
        assert_eq!(Axis::Y.unit_vector(), DVec3::Y);
    }

    #[test]
    fn readonly_observes_but_copy_detaches() {
        let owner = Vector3::shared(1.0, 1.0, 1.0);
        let view = owner.readonly();
        let copy = view.copy();

        owner.set_x(5.0);
        assert_eq!(view.x(), 5.0);
        assert_eq!(copy.x(), 1.0);

        copy.set_y(7.0);
        assert_eq!(owner.y(), 1.0);
        assert!(view.views(&owner));
    }

    #[test]
    fn display_format() {
        let v = Vector3::new(1.5, -2.0, 0.0);
        assert_eq!(v.to_string(), "(1.5, -2, 0)");
    }
}
