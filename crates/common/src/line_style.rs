use std::sync::Arc;

use crate::color::{Color, Rgba};
use crate::error::{Result, ShapeDrawError};

/// Colors and widths used to draw wireframe lines.
///
/// The main color is always present. When a secondary color is set, shapes
/// draw a second "x-ray" pass with it so the line stays visible behind
/// terrain. Colors are shared handles: mutating one (or animating it) is seen
/// by every style holding it.
#[derive(Debug, Clone)]
pub struct LineStyle {
    main_color: Arc<Color>,
    main_width: f32,
    secondary_color: Option<Arc<Color>>,
    secondary_width: f32,
}

/// Alpha factor applied to the main color when deriving a secondary color.
const SECONDARY_ALPHA: f64 = 0.25;

fn check_width(name: &'static str, width: f32) -> Result<f32> {
    if width >= 0.0 && width.is_finite() {
        Ok(width)
    } else {
        Err(ShapeDrawError::invalid_argument(
            name,
            format!("line width must be >= 0, got {width}"),
        ))
    }
}

impl LineStyle {
    /// Build a style from one color. With `has_secondary`, the secondary is a
    /// detached copy of `color` at a quarter of its alpha.
    pub fn new(color: Arc<Color>, width: f32, has_secondary: bool) -> Result<Self> {
        let width = check_width("main_width", width)?;
        let secondary_color = has_secondary.then(|| {
            let secondary = color.copy();
            secondary.scale_alpha(SECONDARY_ALPHA);
            Arc::new(secondary)
        });
        Ok(Self {
            main_color: color,
            main_width: width,
            secondary_color,
            secondary_width: width,
        })
    }

    pub fn with_colors(
        main_color: Arc<Color>,
        main_width: f32,
        secondary_color: Option<Arc<Color>>,
        secondary_width: f32,
    ) -> Result<Self> {
        Ok(Self {
            main_color,
            main_width: check_width("main_width", main_width)?,
            secondary_color,
            secondary_width: check_width("secondary_width", secondary_width)?,
        })
    }

    /// Magenta at 80% alpha, width 3, with an x-ray secondary.
    pub fn default_style() -> Self {
        let main = Color::shared(Rgba::new(1.0, 0.0, 1.0, 0.8));
        let secondary = main.copy();
        secondary.scale_alpha(SECONDARY_ALPHA);
        Self {
            main_color: main,
            main_width: 3.0,
            secondary_color: Some(Arc::new(secondary)),
            secondary_width: 3.0,
        }
    }

    /// New style sharing this style's colors.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// New style with its own copies of the colors.
    pub fn deep_copy(&self) -> Self {
        Self {
            main_color: Arc::new(self.main_color.copy()),
            main_width: self.main_width,
            secondary_color: self.secondary_color.as_ref().map(|c| Arc::new(c.copy())),
            secondary_width: self.secondary_width,
        }
    }

    pub fn main_color(&self) -> &Arc<Color> {
        &self.main_color
    }

    pub fn main_width(&self) -> f32 {
        self.main_width
    }

    pub fn secondary_color(&self) -> Option<&Arc<Color>> {
        self.secondary_color.as_ref()
    }

    pub fn secondary_width(&self) -> f32 {
        self.secondary_width
    }

    pub fn has_secondary(&self) -> bool {
        self.secondary_color.is_some()
    }

    pub fn set_main_color(&mut self, color: Arc<Color>) -> &mut Self {
        self.main_color = color;
        self
    }

    pub fn set_main_width(&mut self, width: f32) -> Result<&mut Self> {
        self.main_width = check_width("main_width", width)?;
        Ok(self)
    }

    /// `None` disables the x-ray pass.
    pub fn set_secondary_color(&mut self, color: Option<Arc<Color>>) -> &mut Self {
        self.secondary_color = color;
        self
    }

    pub fn set_secondary_width(&mut self, width: f32) -> Result<&mut Self> {
        self.secondary_width = check_width("secondary_width", width)?;
        Ok(self)
    }
}

impl Default for LineStyle {
    fn default() -> Self {
        Self::default_style()
    }
}
