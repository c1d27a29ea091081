//! Metadata query mode: flat `key=value` reports over a resolved render
//! description plus document metadata.

use crate::canvas::Canvas;
use crate::rend_desc::RendDesc;

/// One reportable field. The declaration order here is the fixed output
/// order; the order selectors arrive in does not matter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InfoField {
    TimeStart,
    TimeEnd,
    FrameRate,
    FrameStart,
    FrameEnd,
    W,
    H,
    ImageAspect,
    Pw,
    Ph,
    PixelAspect,
    Tl,
    Br,
    PhysicalW,
    PhysicalH,
    XRes,
    YRes,
    Span,
    Interlaced,
    Antialias,
    Clamp,
    Flags,
    Focus,
    BgColor,
    Metadata,
}

/// Every field, in report order.
pub const ALL_FIELDS: [InfoField; 25] = [
    InfoField::TimeStart,
    InfoField::TimeEnd,
    InfoField::FrameRate,
    InfoField::FrameStart,
    InfoField::FrameEnd,
    InfoField::W,
    InfoField::H,
    InfoField::ImageAspect,
    InfoField::Pw,
    InfoField::Ph,
    InfoField::PixelAspect,
    InfoField::Tl,
    InfoField::Br,
    InfoField::PhysicalW,
    InfoField::PhysicalH,
    InfoField::XRes,
    InfoField::YRes,
    InfoField::Span,
    InfoField::Interlaced,
    InfoField::Antialias,
    InfoField::Clamp,
    InfoField::Flags,
    InfoField::Focus,
    InfoField::BgColor,
    InfoField::Metadata,
];

impl InfoField {
    pub fn key(self) -> &'static str {
        match self {
            Self::TimeStart => "time_start",
            Self::TimeEnd => "time_end",
            Self::FrameRate => "frame_rate",
            Self::FrameStart => "frame_start",
            Self::FrameEnd => "frame_end",
            Self::W => "w",
            Self::H => "h",
            Self::ImageAspect => "image_aspect",
            Self::Pw => "pw",
            Self::Ph => "ph",
            Self::PixelAspect => "pixel_aspect",
            Self::Tl => "tl",
            Self::Br => "br",
            Self::PhysicalW => "physical_w",
            Self::PhysicalH => "physical_h",
            Self::XRes => "x_res",
            Self::YRes => "y_res",
            Self::Span => "span",
            Self::Interlaced => "interlaced",
            Self::Antialias => "antialias",
            Self::Clamp => "clamp",
            Self::Flags => "flags",
            Self::Focus => "focus",
            Self::BgColor => "bg_color",
            Self::Metadata => "metadata",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        ALL_FIELDS.iter().copied().find(|f| f.key() == s)
    }
}

/// Parsed field-selector list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InfoSelection {
    all: bool,
    fields: Vec<InfoField>,
    /// Selectors that matched no field. Reported as warnings, never fatal.
    pub unknown: Vec<String>,
}

impl InfoSelection {
    /// Parse a comma-separated selector list. `all` short-circuits: every
    /// field is enabled and the remaining selectors are not examined.
    /// Unrecognized selectors are logged and collected in `unknown`.
    pub fn parse(selectors: &str) -> Self {
        let mut sel = Self::default();
        for raw in selectors.split(',') {
            let value = raw.trim();
            if value.is_empty() {
                continue;
            }
            if value == "all" {
                sel.all = true;
                return sel;
            }
            match InfoField::parse(value) {
                Some(field) => {
                    if !sel.fields.contains(&field) {
                        sel.fields.push(field);
                    }
                }
                None => {
                    tracing::warn!(selector = value, "unrecognized canvas variable");
                    sel.unknown.push(value.to_string());
                }
            }
        }
        sel
    }

    pub fn contains(&self, field: InfoField) -> bool {
        self.all || self.fields.contains(&field)
    }

    pub fn is_empty(&self) -> bool {
        !self.all && self.fields.is_empty()
    }
}

/// Produce the `key=value` report lines for the selected fields, in the
/// fixed field order. `metadata` expands to one line per document metadata
/// entry.
pub fn canvas_info_lines(
    canvas: &dyn Canvas,
    desc: &RendDesc,
    selection: &InfoSelection,
) -> Vec<String> {
    let mut lines = Vec::new();
    for field in ALL_FIELDS {
        if !selection.contains(field) {
            continue;
        }
        match field {
            InfoField::Metadata => {
                for (key, value) in canvas.meta_data() {
                    lines.push(format!("{key}={value}"));
                }
            }
            _ => lines.push(format!("{}={}", field.key(), field_value(field, desc))),
        }
    }
    lines
}

fn field_value(field: InfoField, desc: &RendDesc) -> String {
    match field {
        InfoField::TimeStart => desc.time_start.to_string(),
        InfoField::TimeEnd => desc.time_end.to_string(),
        InfoField::FrameRate => format!("{}", desc.frame_rate.as_f64()),
        InfoField::FrameStart => desc.frame_start().to_string(),
        InfoField::FrameEnd => desc.frame_end().to_string(),
        InfoField::W => desc.width.to_string(),
        InfoField::H => desc.height.to_string(),
        InfoField::ImageAspect => format!("{}", desc.image_aspect()),
        InfoField::Pw => format!("{}", desc.pw()),
        InfoField::Ph => format!("{}", desc.ph()),
        InfoField::PixelAspect => format!("{}", desc.pixel_aspect()),
        InfoField::Tl => format!("{} {}", desc.top_left.x, desc.top_left.y),
        InfoField::Br => format!("{} {}", desc.bottom_right.x, desc.bottom_right.y),
        InfoField::PhysicalW => format!("{}", desc.physical_w()),
        InfoField::PhysicalH => format!("{}", desc.physical_h()),
        InfoField::XRes => format!("{}", desc.x_res),
        InfoField::YRes => format!("{}", desc.y_res),
        InfoField::Span => format!("{}", desc.span()),
        InfoField::Interlaced => desc.interlaced.to_string(),
        InfoField::Antialias => desc.antialias.to_string(),
        InfoField::Clamp => desc.clamp.to_string(),
        InfoField::Flags => desc.flags.to_string(),
        InfoField::Focus => format!("{} {}", desc.focus().x, desc.focus().y),
        InfoField::BgColor => desc.bg_color.to_string(),
        InfoField::Metadata => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::MemoryCanvas;

    #[test]
    fn selector_with_unknown_field_warns_and_continues() {
        let sel = InfoSelection::parse("w,h,bogus");
        assert!(sel.contains(InfoField::W));
        assert!(sel.contains(InfoField::H));
        assert_eq!(sel.unknown, vec!["bogus".to_string()]);

        let canvas = MemoryCanvas::new("root", RendDesc::default());
        let lines = canvas_info_lines(&canvas, canvas.rend_desc(), &sel);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("w="));
        assert!(lines[1].starts_with("h="));
    }

    #[test]
    fn all_short_circuits_other_selectors() {
        let sel = InfoSelection::parse("w,all,bogus");
        assert!(sel.contains(InfoField::BgColor));
        // Short-circuit means nothing after "all" is examined.
        assert!(sel.unknown.is_empty());
    }

    #[test]
    fn output_follows_fixed_order_not_selector_order() {
        let sel = InfoSelection::parse("h,w");
        let canvas = MemoryCanvas::new("root", RendDesc::default());
        let lines = canvas_info_lines(&canvas, canvas.rend_desc(), &sel);
        assert!(lines[0].starts_with("w="));
        assert!(lines[1].starts_with("h="));
    }

    #[test]
    fn all_emits_every_field_plus_metadata() {
        let sel = InfoSelection::parse("all");
        let canvas = MemoryCanvas::new("root", RendDesc::default())
            .with_meta("author", "a")
            .with_meta("title", "t");
        let lines = canvas_info_lines(&canvas, canvas.rend_desc(), &sel);
        // 24 scalar fields plus one line per metadata entry.
        assert_eq!(lines.len(), 24 + 2);
        assert!(lines.iter().any(|l| l == "author=a"));
    }

    #[test]
    fn every_key_parses_back_to_its_field() {
        for field in ALL_FIELDS {
            assert_eq!(InfoField::parse(field.key()), Some(field));
        }
        assert_eq!(InfoField::parse("nope"), None);
    }
}
