use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShapeDrawError};
use crate::scalar::ScalarCell;

/// Plain red/green/blue/alpha value, each channel nominally in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    pub const RED: Rgba = Rgba::new(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Rgba = Rgba::new(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Rgba = Rgba::new(0.0, 0.0, 1.0, 1.0);
    pub const YELLOW: Rgba = Rgba::new(1.0, 1.0, 0.0, 1.0);
    pub const CYAN: Rgba = Rgba::new(0.0, 1.0, 1.0, 1.0);
    pub const MAGENTA: Rgba = Rgba::new(1.0, 0.0, 1.0, 1.0);
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Unpack a 32-bit value laid out (from most significant byte) as
    /// red, green, blue, alpha.
    pub fn from_packed(rgba: u32) -> Self {
        let channel = |shift: u32| ((rgba >> shift) & 0xff) as f64 / 255.0;
        Self::new(channel(24), channel(16), channel(8), channel(0))
    }

    /// Inverse of [`Rgba::from_packed`]; channels are clamped then rounded.
    pub fn packed(&self) -> u32 {
        let byte = |c: f64| (clamp(c) * 255.0).round() as u32;
        (byte(self.r) << 24) | (byte(self.g) << 16) | (byte(self.b) << 8) | byte(self.a)
    }

    pub fn is_valid(&self) -> bool {
        [self.r, self.g, self.b, self.a]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }

    fn clamped(self) -> Self {
        Self::new(clamp(self.r), clamp(self.g), clamp(self.b), clamp(self.a))
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.packed())
    }
}

fn clamp(c: f64) -> f64 {
    if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) }
}

fn check_channel(name: &'static str, value: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ShapeDrawError::invalid_argument(
            name,
            format!("must be within [0.0, 1.0], got {value}"),
        ))
    }
}

/// A mutable color shared with the animation engine.
///
/// Channels are individually atomic; mutators take `&self`. Explicit setters
/// reject out-of-range channels, derived operations (`scale_*`, `blend`)
/// clamp their results.
pub struct Color {
    r: ScalarCell<f64>,
    g: ScalarCell<f64>,
    b: ScalarCell<f64>,
    a: ScalarCell<f64>,
}

impl Color {
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Result<Self> {
        Ok(Self::from_valid(Rgba::new(
            check_channel("red", r)?,
            check_channel("green", g)?,
            check_channel("blue", b)?,
            check_channel("alpha", a)?,
        )))
    }

    pub fn from_rgba(rgba: u32) -> Self {
        Self::from_valid(Rgba::from_packed(rgba))
    }

    pub fn shared(rgba: Rgba) -> Arc<Self> {
        Arc::new(Self::from(rgba))
    }

    fn from_valid(v: Rgba) -> Self {
        Self {
            r: ScalarCell::new(v.r),
            g: ScalarCell::new(v.g),
            b: ScalarCell::new(v.b),
            a: ScalarCell::new(v.a),
        }
    }

    pub fn get(&self) -> Rgba {
        Rgba::new(self.r.get(), self.g.get(), self.b.get(), self.a.get())
    }

    pub fn red(&self) -> f64 {
        self.r.get()
    }

    pub fn green(&self) -> f64 {
        self.g.get()
    }

    pub fn blue(&self) -> f64 {
        self.b.get()
    }

    pub fn alpha(&self) -> f64 {
        self.a.get()
    }

    pub fn rgba(&self) -> u32 {
        self.get().packed()
    }

    /// Independent mutable color with the same channels.
    pub fn copy(&self) -> Color {
        Self::from_valid(self.get())
    }

    pub fn readonly(self: &Arc<Self>) -> ReadonlyColor {
        ReadonlyColor(Arc::clone(self))
    }

    // --- mutators ---

    pub fn set(&self, v: Rgba) -> Result<&Self> {
        if !v.is_valid() {
            return Err(ShapeDrawError::invalid_argument(
                "color",
                format!("channels must be within [0.0, 1.0], got {v:?}"),
            ));
        }
        Ok(self.store(v))
    }

    pub fn set_red(&self, r: f64) -> Result<&Self> {
        self.r.set(check_channel("red", r)?);
        Ok(self)
    }

    pub fn set_green(&self, g: f64) -> Result<&Self> {
        self.g.set(check_channel("green", g)?);
        Ok(self)
    }

    pub fn set_blue(&self, b: f64) -> Result<&Self> {
        self.b.set(check_channel("blue", b)?);
        Ok(self)
    }

    pub fn set_alpha(&self, a: f64) -> Result<&Self> {
        self.a.set(check_channel("alpha", a)?);
        Ok(self)
    }

    pub fn set_rgba(&self, rgba: u32) -> &Self {
        self.store(Rgba::from_packed(rgba))
    }

    /// Multiply red, green and blue by `factor`, clamping to `[0, 1]`.
    pub fn scale_rgb(&self, factor: f64) -> &Self {
        let v = self.get();
        self.store(Rgba::new(v.r * factor, v.g * factor, v.b * factor, v.a).clamped())
    }

    /// Multiply alpha by `factor`, clamping to `[0, 1]`.
    pub fn scale_alpha(&self, factor: f64) -> &Self {
        let v = self.get();
        self.store(Rgba::new(v.r, v.g, v.b, v.a * factor).clamped())
    }

    /// Move every channel `percent` of the way towards `other`.
    pub fn blend(&self, other: Rgba, percent: f64) -> &Self {
        let v = self.get();
        let mix = |from: f64, to: f64| from + (to - from) * percent;
        self.store(
            Rgba::new(
                mix(v.r, other.r),
                mix(v.g, other.g),
                mix(v.b, other.b),
                mix(v.a, other.a),
            )
            .clamped(),
        )
    }

    /// Write channels that are already known to be in range.
    pub fn store(&self, v: Rgba) -> &Self {
        self.r.set(v.r);
        self.g.set(v.g);
        self.b.set(v.b);
        self.a.set(v.a);
        self
    }
}

/// Out-of-range channels are clamped. Use [`Color::new`] to reject them instead.
impl From<Rgba> for Color {
    fn from(v: Rgba) -> Self {
        Self::from_valid(v.clamped())
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.get(), f)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.get(), f)
    }
}

/// Read-only view of a shared [`Color`].
#[derive(Clone)]
pub struct ReadonlyColor(Arc<Color>);

impl ReadonlyColor {
    pub fn get(&self) -> Rgba {
        self.0.get()
    }

    pub fn red(&self) -> f64 {
        self.0.red()
    }

    pub fn green(&self) -> f64 {
        self.0.green()
    }

    pub fn blue(&self) -> f64 {
        self.0.blue()
    }

    pub fn alpha(&self) -> f64 {
        self.0.alpha()
    }

    pub fn rgba(&self) -> u32 {
        self.0.rgba()
    }

    /// New mutable color with the same channels; shares nothing.
    pub fn copy(&self) -> Color {
        self.0.copy()
    }
}

impl fmt::Debug for ReadonlyColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}
