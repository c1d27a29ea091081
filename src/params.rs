//! Merging of user-supplied render overrides with a document's stored
//! defaults.
//!
//! Resolution is a pure function: the same defaults and overrides always
//! produce the same finalized description, and nothing outside the returned
//! value is touched.

use crate::error::{VectraError, VectraResult};
use crate::rend_desc::{ANTIALIAS_MAX, ANTIALIAS_MIN, FrameRate, RendDesc, Time};

/// Default quality when the caller does not override it.
pub const DEFAULT_QUALITY: u32 = 2;

/// Default gamma when the caller does not override it.
pub const DEFAULT_GAMMA: f64 = 2.2;

/// Inclusive quality domain.
pub const QUALITY_MIN: u32 = 0;
pub const QUALITY_MAX: u32 = 10;

/// Loosely-specified render parameters as they arrive from the shell.
///
/// Every field is optional; `None` means "keep the document default". A width
/// or height of `Some(0)` also means "keep the document default", never a
/// literal zero-sized render.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderOverrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Diagonal size of the visible window, document units.
    pub span: Option<f64>,
    pub antialias: Option<u32>,
    pub quality: Option<u32>,
    pub gamma: Option<f64>,
    /// Worker threads the bound target may use internally.
    pub threads: Option<usize>,
    pub fps: Option<u32>,
    /// Render a single frame at this instant. Takes precedence over
    /// `begin_time`/`end_time` when both are supplied.
    pub time: Option<f64>,
    pub begin_time: Option<f64>,
    pub end_time: Option<f64>,
    /// Sets both `x_res` and `y_res`; `dpi_x`/`dpi_y` override individually
    /// afterwards.
    pub dpi: Option<f64>,
    pub dpi_x: Option<f64>,
    pub dpi_y: Option<f64>,
}

/// A finalized description plus the non-geometry settings that travel with it
/// into the bound target.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedRender {
    pub desc: RendDesc,
    pub quality: u32,
    pub gamma: f64,
    pub threads: Option<usize>,
}

/// Merge `overrides` over `defaults` according to the fixed precedence rules.
///
/// Out-of-domain overrides fail with `InvalidParameter`; nothing is ever
/// silently clamped.
pub fn resolve_params(
    defaults: &RendDesc,
    overrides: &RenderOverrides,
) -> VectraResult<ResolvedRender> {
    validate_domains(overrides)?;

    let mut desc = defaults.clone();

    // Width/height. 0 keeps the default; a single overridden axis rescales
    // the other to preserve the document's pixel aspect ratio.
    let width = overrides.width.filter(|&w| w != 0);
    let height = overrides.height.filter(|&h| h != 0);
    match (width, height) {
        (Some(w), Some(h)) => {
            desc.width = w;
            desc.height = h;
        }
        (Some(w), None) => {
            if defaults.width == 0 || defaults.height == 0 {
                return Err(VectraError::invalid_parameter(
                    "cannot derive height: document default dimensions are zero",
                ));
            }
            desc.width = w;
            desc.height = rescaled(defaults.height, w, defaults.width);
        }
        (None, Some(h)) => {
            if defaults.width == 0 || defaults.height == 0 {
                return Err(VectraError::invalid_parameter(
                    "cannot derive width: document default dimensions are zero",
                ));
            }
            desc.height = h;
            desc.width = rescaled(defaults.width, h, defaults.height);
        }
        (None, None) => {}
    }

    if let Some(span) = overrides.span {
        desc.set_span(span)?;
    }

    if let Some(aa) = overrides.antialias {
        desc.antialias = aa;
    }

    if let Some(fps) = overrides.fps {
        desc.frame_rate = FrameRate::new(fps, 1)?;
    }

    // Time. A single instant forces a one-frame render and wins over the
    // range fields.
    if let Some(t) = overrides.time {
        if overrides.begin_time.is_some() || overrides.end_time.is_some() {
            tracing::warn!(
                time = t,
                "--time given together with a time range; the range is ignored"
            );
        }
        desc.time_start = Time(t);
        desc.time_end = Time(t);
    } else {
        if let Some(t) = overrides.begin_time {
            desc.time_start = Time(t);
        }
        if let Some(t) = overrides.end_time {
            desc.time_end = Time(t);
        }
        if desc.time_end < desc.time_start {
            return Err(VectraError::invalid_parameter(
                "end time must be >= start time",
            ));
        }
    }

    // DPI. `dpi` sets both axes, then per-axis values override. Physical
    // dimensions are derived from the finalized pixel dimensions.
    if let Some(dpi) = overrides.dpi {
        desc.x_res = dpi;
        desc.y_res = dpi;
    }
    if let Some(dpi) = overrides.dpi_x {
        desc.x_res = dpi;
    }
    if let Some(dpi) = overrides.dpi_y {
        desc.y_res = dpi;
    }

    Ok(ResolvedRender {
        desc,
        quality: overrides.quality.unwrap_or(DEFAULT_QUALITY),
        gamma: overrides.gamma.unwrap_or(DEFAULT_GAMMA),
        threads: overrides.threads,
    })
}

fn rescaled(other: u32, new: u32, old: u32) -> u32 {
    let scaled = (f64::from(other) * f64::from(new) / f64::from(old)).round();
    (scaled as u32).max(1)
}

fn validate_domains(ov: &RenderOverrides) -> VectraResult<()> {
    if let Some(aa) = ov.antialias
        && !(ANTIALIAS_MIN..=ANTIALIAS_MAX).contains(&aa)
    {
        return Err(VectraError::invalid_parameter(format!(
            "antialias must be in {ANTIALIAS_MIN}..={ANTIALIAS_MAX}, got {aa}"
        )));
    }
    if let Some(q) = ov.quality
        && !(QUALITY_MIN..=QUALITY_MAX).contains(&q)
    {
        return Err(VectraError::invalid_parameter(format!(
            "quality must be in {QUALITY_MIN}..={QUALITY_MAX}, got {q}"
        )));
    }
    if let Some(g) = ov.gamma
        && !(g > 0.0)
    {
        return Err(VectraError::invalid_parameter("gamma must be > 0"));
    }
    if let Some(t) = ov.threads
        && t == 0
    {
        return Err(VectraError::invalid_parameter(
            "threads must be >= 1 when set",
        ));
    }
    if let Some(fps) = ov.fps
        && fps == 0
    {
        return Err(VectraError::invalid_parameter(
            "frame rate must be > 0 when overridden",
        ));
    }
    for dpi in [ov.dpi, ov.dpi_x, ov.dpi_y].into_iter().flatten() {
        if !(dpi > 0.0) {
            return Err(VectraError::invalid_parameter("dpi must be > 0"));
        }
    }
    Ok(())
}
