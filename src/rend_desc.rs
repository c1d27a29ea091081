use kurbo::Point;

use crate::error::{VectraError, VectraResult};

/// Inclusive antialias domain accepted by the parametric renderer.
pub const ANTIALIAS_MIN: u32 = 1;
pub const ANTIALIAS_MAX: u32 = 30;

/// A document-unit instant, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
pub struct Time(pub f64);

impl Time {
    pub fn as_secs(self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Frame rate as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRate {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl FrameRate {
    /// Create a validated frame rate.
    pub fn new(num: u32, den: u32) -> VectraResult<Self> {
        if den == 0 {
            return Err(VectraError::invalid_parameter("FrameRate den must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }
}

/// Straight-alpha RGBA color with f32 channels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn white() -> Self {
        Self::rgba(1.0, 1.0, 1.0, 1.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::white()
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} {}", self.r, self.g, self.b, self.a)
    }
}

/// Resolved geometric/temporal parameters of one render.
///
/// A description starts as a copy of the document's stored defaults, is
/// mutated field by field during parameter resolution, and is frozen once
/// bound into a job. Aspect ratios, span, focus and physical dimensions are
/// derived on demand rather than stored, so they can never go stale.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RendDesc {
    /// Pixel width; 0 means "use document default" until resolution.
    pub width: u32,
    /// Pixel height; 0 means "use document default" until resolution.
    pub height: u32,
    pub time_start: Time,
    pub time_end: Time,
    pub frame_rate: FrameRate,
    /// Antialias amount, 1..=30.
    pub antialias: u32,
    /// Top-left corner of the visible coordinate window, document units.
    pub top_left: Point,
    /// Bottom-right corner of the visible coordinate window, document units.
    pub bottom_right: Point,
    /// Horizontal print resolution, dots per inch.
    pub x_res: f64,
    /// Vertical print resolution, dots per inch.
    pub y_res: f64,
    pub interlaced: bool,
    pub clamp: bool,
    /// Backend-interpreted flag bits, preserved verbatim through resolution.
    pub flags: u32,
    pub bg_color: Color,
}

impl Default for RendDesc {
    fn default() -> Self {
        Self {
            width: 480,
            height: 270,
            time_start: Time(0.0),
            time_end: Time(5.0),
            frame_rate: FrameRate { num: 24, den: 1 },
            antialias: 1,
            top_left: Point::new(-4.0, 2.25),
            bottom_right: Point::new(4.0, -2.25),
            x_res: 72.0,
            y_res: 72.0,
            interlaced: false,
            clamp: false,
            flags: 0,
            bg_color: Color::white(),
        }
    }
}

impl RendDesc {
    /// Width of one pixel in document units. Sign follows the window axis.
    pub fn pw(&self) -> f64 {
        (self.bottom_right.x - self.top_left.x) / f64::from(self.width.max(1))
    }

    /// Height of one pixel in document units. Sign follows the window axis.
    pub fn ph(&self) -> f64 {
        (self.bottom_right.y - self.top_left.y) / f64::from(self.height.max(1))
    }

    pub fn pixel_aspect(&self) -> f64 {
        (self.pw() / self.ph()).abs()
    }

    pub fn image_aspect(&self) -> f64 {
        ((self.bottom_right.x - self.top_left.x) / (self.bottom_right.y - self.top_left.y)).abs()
    }

    /// Diagonal size of the visible coordinate window.
    pub fn span(&self) -> f64 {
        (self.bottom_right - self.top_left).hypot()
    }

    /// Center point of the visible coordinate window.
    pub fn focus(&self) -> Point {
        self.top_left.midpoint(self.bottom_right)
    }

    /// Physical print width in inches, derived from pixel width and `x_res`.
    pub fn physical_w(&self) -> f64 {
        f64::from(self.width) / self.x_res
    }

    /// Physical print height in inches, derived from pixel height and `y_res`.
    pub fn physical_h(&self) -> f64 {
        f64::from(self.height) / self.y_res
    }

    pub fn frame_start(&self) -> i64 {
        (self.time_start.0 * self.frame_rate.as_f64()).round() as i64
    }

    pub fn frame_end(&self) -> i64 {
        (self.time_end.0 * self.frame_rate.as_f64()).round() as i64
    }

    /// Number of frames in the render, single-frame renders included.
    pub fn frame_count(&self) -> u64 {
        (self.frame_end() - self.frame_start()).max(0) as u64 + 1
    }

    /// Rescale the window to the given diagonal span, keeping the focus point
    /// and the window aspect ratio fixed.
    pub fn set_span(&mut self, span: f64) -> VectraResult<()> {
        if !(span > 0.0) {
            return Err(VectraError::invalid_parameter("span must be > 0"));
        }
        let current = self.span();
        if !(current > 0.0) {
            return Err(VectraError::invalid_parameter(
                "cannot rescale a degenerate (zero-span) window",
            ));
        }
        let focus = self.focus();
        let factor = span / current;
        self.top_left = focus + (self.top_left - focus) * factor;
        self.bottom_right = focus + (self.bottom_right - focus) * factor;
        Ok(())
    }

    /// Validate a finalized description, i.e. one about to be frozen into a
    /// render job. Metadata-only queries skip this.
    pub fn validate_finalized(&self) -> VectraResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(VectraError::invalid_parameter(
                "finalized width and height must be > 0",
            ));
        }
        if !(ANTIALIAS_MIN..=ANTIALIAS_MAX).contains(&self.antialias) {
            return Err(VectraError::invalid_parameter(format!(
                "antialias must be in {ANTIALIAS_MIN}..={ANTIALIAS_MAX}, got {}",
                self.antialias
            )));
        }
        if self.frame_rate.den == 0 {
            return Err(VectraError::invalid_parameter("frame rate den must be > 0"));
        }
        if self.time_end < self.time_start {
            return Err(VectraError::invalid_parameter(
                "time_end must be >= time_start",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Vec2;

    #[test]
    fn default_window_is_square_pixels() {
        let d = RendDesc::default();
        assert!((d.pixel_aspect() - 1.0).abs() < 1e-9);
        assert!((d.image_aspect() - 16.0 / 9.0).abs() < 1e-9);
        assert_eq!(d.focus(), Point::new(0.0, 0.0));
    }

    #[test]
    fn span_is_window_diagonal() {
        let d = RendDesc::default();
        let expected = Vec2::new(8.0, -4.5).hypot();
        assert!((d.span() - expected).abs() < 1e-9);
    }

    #[test]
    fn set_span_preserves_focus_and_aspect() {
        let mut d = RendDesc::default();
        let focus = d.focus();
        let aspect = d.image_aspect();
        d.set_span(2.0 * d.span()).unwrap();
        assert!((d.focus() - focus).hypot() < 1e-9);
        assert!((d.image_aspect() - aspect).abs() < 1e-9);
        assert!((d.span() - 2.0 * RendDesc::default().span()).abs() < 1e-9);
    }

    #[test]
    fn set_span_rejects_non_positive() {
        let mut d = RendDesc::default();
        assert!(d.set_span(0.0).is_err());
        assert!(d.set_span(-1.0).is_err());
        assert!(d.set_span(f64::NAN).is_err());
    }

    #[test]
    fn physical_dimensions_follow_resolution() {
        let mut d = RendDesc::default();
        d.width = 720;
        d.x_res = 144.0;
        assert!((d.physical_w() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn frame_bounds_round_from_time() {
        let d = RendDesc {
            time_start: Time(1.0),
            time_end: Time(2.5),
            frame_rate: FrameRate { num: 24, den: 1 },
            ..RendDesc::default()
        };
        assert_eq!(d.frame_start(), 24);
        assert_eq!(d.frame_end(), 60);
        assert_eq!(d.frame_count(), 37);
    }

    #[test]
    fn finalized_validation_rejects_bad_fields() {
        let mut d = RendDesc::default();
        d.width = 0;
        assert!(d.validate_finalized().is_err());

        let mut d = RendDesc::default();
        d.antialias = 31;
        assert!(d.validate_finalized().is_err());

        let mut d = RendDesc::default();
        d.time_end = Time(-1.0);
        assert!(d.validate_finalized().is_err());

        assert!(RendDesc::default().validate_finalized().is_ok());
    }

    #[test]
    fn json_roundtrip() {
        let d = RendDesc::default();
        let s = serde_json::to_string(&d).unwrap();
        let de: RendDesc = serde_json::from_str(&s).unwrap();
        assert_eq!(de, d);
    }
}
