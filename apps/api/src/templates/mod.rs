//! Preview template catalogue.
//!
//! The three variants share one preview builder (`view::preview`); everything
//! that differs between them (palette, regions, section order, export
//! capture settings, required form fields) lives in a `TemplateConfig`.

use serde::{Deserialize, Serialize};

use crate::layout::font_metrics::FontFamily;
use crate::render::rasterizer::CaptureStrategy;
use crate::view::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Creative,
    Professional,
    Simple,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 3] = [
        TemplateKind::Creative,
        TemplateKind::Professional,
        TemplateKind::Simple,
    ];

    /// Matches the lowercase kind name used in routes (`creative`, ...).
    pub fn from_slug(slug: &str) -> Option<TemplateKind> {
        match slug.trim().to_ascii_lowercase().as_str() {
            "creative" => Some(TemplateKind::Creative),
            "professional" => Some(TemplateKind::Professional),
            "simple" => Some(TemplateKind::Simple),
            _ => None,
        }
    }

    pub fn default_title(self) -> &'static str {
        self.config().title
    }

    /// Best-effort match of a free-form template title. Unknown titles render creative.
    pub fn from_title(title: &str) -> TemplateKind {
        let title = title.to_lowercase();
        if ["simple", "classic", "ats"].iter().any(|k| title.contains(k)) {
            TemplateKind::Simple
        } else if ["professional", "corporate", "executive"]
            .iter()
            .any(|k| title.contains(k))
        {
            TemplateKind::Professional
        } else {
            TemplateKind::Creative
        }
    }

    pub fn config(self) -> &'static TemplateConfig {
        match self {
            TemplateKind::Creative => &CREATIVE,
            TemplateKind::Professional => &PROFESSIONAL,
            TemplateKind::Simple => &SIMPLE,
        }
    }
}

/// Content blocks a template can place in one of its regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionSlot {
    Contact,
    Summary,
    Education,
    Experience,
    Skills,
    Projects,
    Certifications,
    Socials,
}

/// How the page is split into regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Arrangement {
    /// Full-width banner header, narrow sidebar on the left, main column right.
    BannerWithLeftSidebar,
    /// Main column left with the identity block on top, dark sidebar right.
    MainWithRightSidebar,
    /// Centered header and one column.
    SingleColumn,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Palette {
    pub page: Color,
    pub accent: Color,
    pub accent_text: Color,
    pub heading: Color,
    pub body: Color,
    pub muted: Color,
    pub sidebar: Color,
    pub sidebar_text: Color,
    pub track: Color,
}

/// Inline geometry of the mounted preview root, as it sits on screen.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScreenGeometry {
    pub width: f32,
    pub min_height: Option<f32>,
    /// Fixed on-screen height; taller content is clipped when `clip` is set.
    pub viewport_height: Option<f32>,
    pub clip: bool,
    pub shadow: bool,
    pub border_radius: f32,
    pub zoom: f32,
}

#[derive(Debug, Serialize)]
pub struct TemplateConfig {
    pub kind: TemplateKind,
    pub title: &'static str,
    pub description: &'static str,
    pub preview_route: &'static str,
    /// Base of the exported file name when the resume has no name.
    pub fallback_label: &'static str,
    /// Heading shown above the form's name field when no name was entered.
    pub placeholder_name: &'static str,
    pub font: FontFamily,
    pub arrangement: Arrangement,
    pub sidebar: &'static [SectionSlot],
    pub main: &'static [SectionSlot],
    pub palette: Palette,
    pub screen: ScreenGeometry,
    pub capture: CaptureStrategy,
    /// Supersampling factor for export rasterization.
    pub export_scale: f32,
    /// Minimum export height in CSS px, if the variant forces one.
    pub export_min_height: Option<f32>,
    pub required_personal: &'static [&'static str],
}

impl TemplateConfig {
    pub fn heading(&self, slot: SectionSlot) -> &'static str {
        match (self.kind, slot) {
            (TemplateKind::Professional, SectionSlot::Contact) => "CONTACT ME",
            (TemplateKind::Professional, SectionSlot::Skills) => "PRO SKILLS",
            (TemplateKind::Professional, SectionSlot::Summary) => "ABOUT ME",
            (TemplateKind::Professional, SectionSlot::Education) => "EDUCATION",
            (TemplateKind::Professional, SectionSlot::Experience) => "EXPERIENCE",
            (TemplateKind::Professional, SectionSlot::Projects) => "PROJECTS",
            (TemplateKind::Simple, SectionSlot::Summary) => "Professional Summary",
            (_, SectionSlot::Summary) => "About Me",
            (_, SectionSlot::Contact) => "Contact",
            (_, SectionSlot::Education) => "Education",
            (_, SectionSlot::Experience) => "Experience",
            (_, SectionSlot::Skills) => "Skills",
            (_, SectionSlot::Projects) => "Projects",
            (_, SectionSlot::Certifications) => "Certifications",
            (_, SectionSlot::Socials) => "Social",
        }
    }
}

/// A4 width at 96 DPI.
pub const A4_WIDTH_PX: f32 = 794.0;
/// A4 height at 96 DPI.
pub const A4_HEIGHT_PX: f32 = 1123.0;

static CREATIVE: TemplateConfig = TemplateConfig {
    kind: TemplateKind::Creative,
    title: "Creative Resume",
    description: "Bold banner header with a contact and skills sidebar.",
    preview_route: "/creativePreview",
    fallback_label: "Modern_Resume",
    placeholder_name: "Your Name",
    font: FontFamily::Inter,
    arrangement: Arrangement::BannerWithLeftSidebar,
    sidebar: &[SectionSlot::Contact, SectionSlot::Skills, SectionSlot::Socials],
    main: &[
        SectionSlot::Summary,
        SectionSlot::Education,
        SectionSlot::Experience,
        SectionSlot::Projects,
    ],
    palette: Palette {
        page: Color::WHITE,
        accent: Color(0x1d, 0x4e, 0xd8),
        accent_text: Color(0xdb, 0xea, 0xfe),
        heading: Color(0x1d, 0x4e, 0xd8),
        body: Color(0x37, 0x41, 0x51),
        muted: Color(0x4b, 0x55, 0x63),
        sidebar: Color(0xef, 0xf6, 0xff),
        sidebar_text: Color(0x1f, 0x29, 0x37),
        track: Color(0xd1, 0xd5, 0xdb),
    },
    screen: ScreenGeometry {
        width: A4_WIDTH_PX,
        min_height: Some(A4_HEIGHT_PX),
        viewport_height: Some(A4_HEIGHT_PX),
        clip: true,
        shadow: true,
        border_radius: 12.0,
        zoom: 1.0,
    },
    capture: CaptureStrategy::OffscreenClone,
    export_scale: 3.0,
    export_min_height: None,
    required_personal: &["name"],
};

static PROFESSIONAL: TemplateConfig = TemplateConfig {
    kind: TemplateKind::Professional,
    title: "Professional Resume",
    description: "Two-tone layout with an orange accent and dark contact column.",
    preview_route: "/professionalPreview",
    fallback_label: "My_Resume",
    placeholder_name: "Your Name",
    font: FontFamily::Lato,
    arrangement: Arrangement::MainWithRightSidebar,
    sidebar: &[SectionSlot::Contact, SectionSlot::Skills, SectionSlot::Socials],
    main: &[
        SectionSlot::Education,
        SectionSlot::Experience,
        SectionSlot::Summary,
        SectionSlot::Projects,
    ],
    palette: Palette {
        page: Color::WHITE,
        accent: Color(0xf9, 0x73, 0x16),
        accent_text: Color::WHITE,
        heading: Color(0x1f, 0x29, 0x37),
        body: Color(0x37, 0x41, 0x51),
        muted: Color(0x4b, 0x55, 0x63),
        sidebar: Color(0x1f, 0x29, 0x37),
        sidebar_text: Color(0xd1, 0xd5, 0xdb),
        track: Color(0x37, 0x41, 0x51),
    },
    screen: ScreenGeometry {
        width: 900.0,
        min_height: None,
        viewport_height: None,
        clip: true,
        shadow: true,
        border_radius: 8.0,
        zoom: 0.9,
    },
    capture: CaptureStrategy::InPlace,
    export_scale: 4.0,
    export_min_height: Some(A4_HEIGHT_PX),
    required_personal: &["name"],
};

static SIMPLE: TemplateConfig = TemplateConfig {
    kind: TemplateKind::Simple,
    title: "Simple ATS Resume",
    description: "Plain single-column layout that parses cleanly in applicant tracking systems.",
    preview_route: "/simplePreview",
    fallback_label: "Simple_Resume",
    placeholder_name: "Your Name",
    font: FontFamily::ComputerModern,
    arrangement: Arrangement::SingleColumn,
    sidebar: &[],
    main: &[
        SectionSlot::Summary,
        SectionSlot::Education,
        SectionSlot::Experience,
        SectionSlot::Skills,
        SectionSlot::Certifications,
        SectionSlot::Projects,
    ],
    palette: Palette {
        page: Color::WHITE,
        accent: Color(0x25, 0x63, 0xeb),
        accent_text: Color::WHITE,
        heading: Color(0x11, 0x18, 0x27),
        body: Color(0x37, 0x41, 0x51),
        muted: Color(0x4b, 0x55, 0x63),
        sidebar: Color(0xf3, 0xf4, 0xf6),
        sidebar_text: Color(0x1f, 0x29, 0x37),
        track: Color(0xd1, 0xd5, 0xdb),
    },
    screen: ScreenGeometry {
        width: A4_WIDTH_PX,
        min_height: None,
        viewport_height: None,
        clip: false,
        shadow: true,
        border_radius: 12.0,
        zoom: 1.0,
    },
    capture: CaptureStrategy::OffscreenClone,
    export_scale: 3.0,
    export_min_height: None,
    required_personal: &["name"],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_title_keywords() {
        assert_eq!(TemplateKind::from_title("Simple ATS Resume"), TemplateKind::Simple);
        assert_eq!(TemplateKind::from_title("Simple Classic"), TemplateKind::Simple);
        assert_eq!(TemplateKind::from_title("Corporate Resume"), TemplateKind::Professional);
        assert_eq!(TemplateKind::from_title("Modern Executive"), TemplateKind::Professional);
        assert_eq!(TemplateKind::from_title("Creative Designer"), TemplateKind::Creative);
        assert_eq!(TemplateKind::from_title(""), TemplateKind::Creative);
    }

    #[test]
    fn test_from_slug() {
        assert_eq!(TemplateKind::from_slug("creative"), Some(TemplateKind::Creative));
        assert_eq!(TemplateKind::from_slug("Professional"), Some(TemplateKind::Professional));
        assert_eq!(TemplateKind::from_slug("simple"), Some(TemplateKind::Simple));
        assert_eq!(TemplateKind::from_slug("modern"), None);
    }

    #[test]
    fn test_every_kind_has_matching_config() {
        for kind in TemplateKind::ALL {
            let config = kind.config();
            assert_eq!(config.kind, kind);
            assert_eq!(TemplateKind::from_title(config.title), kind);
            assert!(config.export_scale >= 3.0);
            assert!(config.required_personal.contains(&"name"));
        }
    }

    #[test]
    fn test_export_strategies_cover_both_capture_modes() {
        assert_eq!(TemplateKind::Creative.config().capture, CaptureStrategy::OffscreenClone);
        assert_eq!(TemplateKind::Professional.config().capture, CaptureStrategy::InPlace);
    }
}
