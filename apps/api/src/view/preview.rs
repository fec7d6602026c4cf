//! Builds the styled preview tree of a resume for one template.
//!
//! Region ids (`resume-root`, `header`, `sidebar`, `main`, `name`, `title`,
//! `section-<slot>`) are stable so callers and tests can look parts up.
//! Sections with nothing to show are left out entirely.

use crate::models::resume::ResumeDocument;
use crate::templates::{Arrangement, Palette, SectionSlot, TemplateConfig, TemplateKind};
use crate::view::node::{NodeKind, ViewNode};
use crate::view::style::{
    Border, Color, Dimension, Edges, Overflow, Shadow, TextStyle, Transform,
};

const SHADOW: Shadow = Shadow {
    spread: 12.0,
    offset_y: 6.0,
    color: Color(0xd1, 0xd5, 0xdb),
};
const PROFILE_PIC_PX: f32 = 128.0;
const SIDEBAR_PX: f32 = 265.0;
const PRO_SIDEBAR_PX: f32 = 300.0;

/// Text colors of the region a section lands in.
#[derive(Clone, Copy)]
struct Ink {
    heading: Color,
    body: Color,
    muted: Color,
    accent: Color,
}

impl Ink {
    fn main(p: &Palette) -> Ink {
        Ink {
            heading: p.heading,
            body: p.body,
            muted: p.muted,
            accent: p.accent,
        }
    }

    fn sidebar(p: &Palette, kind: TemplateKind) -> Ink {
        let heading = match kind {
            TemplateKind::Professional => p.accent,
            _ => p.heading,
        };
        Ink {
            heading,
            body: p.sidebar_text,
            muted: p.sidebar_text,
            accent: p.accent,
        }
    }
}

/// The preview of `doc` as it is mounted on screen.
pub fn build_preview(doc: &ResumeDocument, config: &TemplateConfig) -> ViewNode {
    let body = match config.arrangement {
        Arrangement::BannerWithLeftSidebar => banner_with_left_sidebar(doc, config),
        Arrangement::MainWithRightSidebar => main_with_right_sidebar(doc, config),
        Arrangement::SingleColumn => single_column(doc, config),
    };

    let screen = &config.screen;
    ViewNode::stack(body).with_id("resume-root").styled(|s| {
        s.width = Dimension::Px(screen.width);
        s.min_height = screen.min_height;
        if let Some(h) = screen.viewport_height {
            s.height = Dimension::Px(h);
        }
        if screen.clip {
            s.overflow = Overflow::Hidden;
        }
        if screen.shadow {
            s.box_shadow = Some(SHADOW);
        }
        s.border_radius = screen.border_radius;
        if screen.zoom != 1.0 {
            s.transform = Transform::Scale(screen.zoom);
        }
        s.background = Some(config.palette.page);
    })
}

fn display_name<'a>(doc: &'a ResumeDocument, config: &'a TemplateConfig) -> &'a str {
    let name = doc.personal.name.trim();
    if name.is_empty() {
        config.placeholder_name
    } else {
        name
    }
}

fn profile_pic(doc: &ResumeDocument, size: f32, ring: Color) -> Option<ViewNode> {
    let source = doc.personal.profile_pic.trim();
    if source.is_empty() {
        return None;
    }
    Some(
        ViewNode::image(source, size, true)
            .with_ring(ring)
            .with_id("profile-pic")
            .styled(|s| s.width = Dimension::Px(size)),
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Arrangements
// ────────────────────────────────────────────────────────────────────────────

fn banner_with_left_sidebar(doc: &ResumeDocument, config: &TemplateConfig) -> Vec<ViewNode> {
    let p = &config.palette;

    let mut identity = vec![
        ViewNode::text(display_name(doc, config), TextStyle::new(30.0, p.accent_text).bold())
            .with_id("name")
            .styled(|s| s.margin_bottom = 4.0),
    ];
    if !doc.personal.title.trim().is_empty() {
        identity.push(
            ViewNode::text(doc.personal.title.trim(), TextStyle::new(18.0, p.accent_text))
                .with_id("title"),
        );
    }
    let mut header = vec![ViewNode::stack(identity).styled(|s| s.flex = 1.0)];
    if let Some(pic) = profile_pic(doc, PROFILE_PIC_PX, Color::WHITE) {
        header.push(pic);
    }
    let header = ViewNode::row(header).with_id("header").styled(|s| {
        s.padding = Edges::symmetric(32.0, 40.0);
        s.gap = 24.0;
        s.background = Some(p.accent);
    });

    let sidebar = region(doc, config, config.sidebar, Ink::sidebar(p, config.kind))
        .with_id("sidebar")
        .styled(|s| {
            s.width = Dimension::Px(SIDEBAR_PX);
            s.padding = Edges::all(32.0);
            s.gap = 28.0;
            s.background = Some(p.sidebar);
            s.overflow = Overflow::Hidden;
        });
    let main = region(doc, config, config.main, Ink::main(p))
        .with_id("main")
        .styled(|s| {
            s.padding = Edges::all(40.0);
            s.gap = 24.0;
        });

    vec![header, ViewNode::row(vec![sidebar, main])]
}

fn main_with_right_sidebar(doc: &ResumeDocument, config: &TemplateConfig) -> Vec<ViewNode> {
    let p = &config.palette;

    let title = match doc.personal.title.trim() {
        "" => "Professional",
        t => t,
    };
    let badge = ViewNode::stack(vec![
        ViewNode::text(display_name(doc, config), TextStyle::new(28.0, p.accent_text).bold())
            .with_id("name"),
        ViewNode::text(title, TextStyle::new(17.0, Color(0xff, 0xf6, 0xe0)).bold()).with_id("title"),
    ])
    .styled(|s| {
        s.padding = Edges::symmetric(16.0, 24.0);
        s.gap = 4.0;
        s.background = Some(p.accent);
        s.border_radius = 8.0;
    });

    let mut identity = Vec::new();
    if let Some(pic) = profile_pic(doc, 160.0, p.heading) {
        identity.push(pic);
    }
    identity.push(ViewNode::stack(vec![badge]).styled(|s| s.padding.top = 16.0));
    let identity = ViewNode::row(identity).with_id("header").styled(|s| {
        s.gap = 24.0;
        s.margin_bottom = 32.0;
    });

    let mut main = region(doc, config, config.main, Ink::main(p));
    if let NodeKind::Stack(children) = &mut main.kind {
        children.insert(0, identity);
    }
    let main = main.with_id("main").styled(|s| {
        s.padding = Edges::all(32.0);
        s.gap = 24.0;
    });

    let sidebar = region(doc, config, config.sidebar, Ink::sidebar(p, config.kind))
        .with_id("sidebar")
        .styled(|s| {
            s.width = Dimension::Px(PRO_SIDEBAR_PX);
            s.padding = Edges::all(32.0);
            s.gap = 28.0;
            s.background = Some(p.sidebar);
        });

    vec![ViewNode::row(vec![main, sidebar])]
}

fn single_column(doc: &ResumeDocument, config: &TemplateConfig) -> Vec<ViewNode> {
    let p = &config.palette;
    let personal = &doc.personal;

    let mut header = vec![
        ViewNode::text(display_name(doc, config), TextStyle::new(28.0, p.heading).bold().centered())
            .with_id("name"),
    ];
    if !personal.title.trim().is_empty() {
        header.push(
            ViewNode::text(personal.title.trim(), TextStyle::new(16.0, p.muted).centered())
                .with_id("title"),
        );
    }
    let contact: Vec<&str> = [&personal.email, &personal.phone, &personal.address, &personal.website]
        .into_iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect();
    if !contact.is_empty() {
        header.push(
            ViewNode::text(contact.join("  |  "), TextStyle::new(12.0, p.body).centered())
                .with_id("contact"),
        );
    }
    let header = ViewNode::stack(header).with_id("header").styled(|s| {
        s.gap = 6.0;
        s.padding = Edges {
            bottom: 16.0,
            ..Edges::default()
        };
        s.border_bottom = Some(Border {
            width: 2.0,
            color: p.heading,
        });
    });

    let main = region(doc, config, config.main, Ink::main(p))
        .with_id("main")
        .styled(|s| s.gap = 20.0);

    vec![ViewNode::stack(vec![header, main]).styled(|s| {
        s.padding = Edges::symmetric(48.0, 56.0);
        s.gap = 24.0;
    })]
}

fn region(doc: &ResumeDocument, config: &TemplateConfig, slots: &[SectionSlot], ink: Ink) -> ViewNode {
    let sections = slots
        .iter()
        .filter_map(|&slot| {
            section(doc, config, slot, ink).map(|body| {
                let mut children = vec![heading(config, slot, ink)];
                children.extend(body);
                ViewNode::stack(children)
                    .with_id(format!("section-{}", slot_name(slot)))
                    .styled(|s| s.gap = 8.0)
            })
        })
        .collect();
    ViewNode::stack(sections)
}

fn slot_name(slot: SectionSlot) -> &'static str {
    match slot {
        SectionSlot::Contact => "contact",
        SectionSlot::Summary => "summary",
        SectionSlot::Education => "education",
        SectionSlot::Experience => "experience",
        SectionSlot::Skills => "skills",
        SectionSlot::Projects => "projects",
        SectionSlot::Certifications => "certifications",
        SectionSlot::Socials => "socials",
    }
}

fn heading(config: &TemplateConfig, slot: SectionSlot, ink: Ink) -> ViewNode {
    let label = config.heading(slot);
    match config.kind {
        TemplateKind::Professional => {
            ViewNode::text(label, TextStyle::new(16.0, config.palette.accent_text).bold()).styled(|s| {
                s.padding = Edges::symmetric(6.0, 14.0);
                s.background = Some(config.palette.accent);
                s.border_radius = 4.0;
                s.margin_bottom = 4.0;
            })
        }
        TemplateKind::Simple => ViewNode::text(label, TextStyle::new(15.0, ink.heading).bold().uppercase())
            .styled(|s| {
                s.padding.bottom = 2.0;
                s.border_bottom = Some(Border {
                    width: 1.0,
                    color: Color(0x9c, 0xa3, 0xaf),
                });
            }),
        TemplateKind::Creative => ViewNode::text(label, TextStyle::new(20.0, ink.heading).bold()),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

fn section(doc: &ResumeDocument, config: &TemplateConfig, slot: SectionSlot, ink: Ink) -> Option<Vec<ViewNode>> {
    let body = TextStyle::new(13.0, ink.body);
    let small = TextStyle::new(12.0, ink.muted);
    let strong = TextStyle::new(14.0, ink.heading).bold();
    let personal = &doc.personal;

    let nodes: Vec<ViewNode> = match slot {
        SectionSlot::Contact => [&personal.email, &personal.phone, &personal.address, &personal.website]
            .into_iter()
            .filter(|v| !v.trim().is_empty())
            .map(|v| ViewNode::text(v.trim(), body))
            .collect(),
        SectionSlot::Summary => {
            if doc.summary.trim().is_empty() {
                Vec::new()
            } else {
                vec![ViewNode::text(doc.summary.trim(), body.with_line_height(1.6))]
            }
        }
        SectionSlot::Education => doc
            .education
            .iter()
            .map(|edu| {
                entry(
                    config,
                    ink,
                    vec![
                        ViewNode::text(&edu.degree, strong),
                        ViewNode::text(&edu.school, small),
                        ViewNode::text(edu.period(), TextStyle::new(12.0, ink.accent)),
                    ],
                )
            })
            .collect(),
        SectionSlot::Experience => doc
            .experience
            .iter()
            .map(|exp| {
                let mut lines = vec![
                    ViewNode::text(&exp.role, strong),
                    ViewNode::text(&exp.company, body),
                    ViewNode::text(exp.period(), TextStyle::new(12.0, ink.accent)),
                ];
                if !exp.details.trim().is_empty() {
                    lines.push(ViewNode::text(exp.details.trim(), small));
                }
                entry(config, ink, lines)
            })
            .collect(),
        SectionSlot::Skills if config.kind == TemplateKind::Simple => {
            let names: Vec<&str> = doc.skills.iter().map(|s| s.name.trim()).collect();
            if names.is_empty() {
                Vec::new()
            } else {
                vec![ViewNode::text(names.join(", "), body)]
            }
        }
        SectionSlot::Skills => doc
            .skills
            .iter()
            .map(|skill| {
                ViewNode::stack(vec![
                    ViewNode::text(skill.name.trim(), TextStyle::new(13.0, ink.body).bold()),
                    ViewNode::bar(skill.fraction(), config.palette.track, config.palette.accent, 8.0),
                ])
                .styled(|s| s.gap = 4.0)
            })
            .collect(),
        SectionSlot::Projects => doc
            .projects
            .iter()
            .map(|proj| {
                let mut lines = vec![ViewNode::text(&proj.title, strong)];
                if !proj.description.trim().is_empty() {
                    lines.push(ViewNode::text(proj.description.trim(), small));
                }
                if !proj.link.trim().is_empty() {
                    lines.push(ViewNode::text(
                        proj.href(),
                        TextStyle::new(12.0, ink.accent).underline(),
                    ));
                }
                entry(config, ink, lines)
            })
            .collect(),
        SectionSlot::Certifications => doc
            .certifications
            .iter()
            .map(|cert| {
                let mut line = cert.title.trim().to_string();
                if !cert.issuer.trim().is_empty() {
                    line = format!("{line}, {}", cert.issuer.trim());
                }
                if !cert.year.trim().is_empty() {
                    line = format!("{line} ({})", cert.year.trim());
                }
                ViewNode::text(line, body)
            })
            .collect(),
        SectionSlot::Socials => personal
            .socials()
            .into_iter()
            .map(|(label, handle)| {
                ViewNode::row(vec![
                    ViewNode::text(label, TextStyle::new(11.0, ink.accent).bold())
                        .styled(|s| s.width = Dimension::Px(86.0)),
                    ViewNode::text(handle.trim(), small),
                ])
            })
            .collect(),
    };

    (!nodes.is_empty()).then_some(nodes)
}

/// One education, experience or project row.
fn entry(config: &TemplateConfig, ink: Ink, lines: Vec<ViewNode>) -> ViewNode {
    let lines: Vec<ViewNode> = lines
        .into_iter()
        .filter(|n| n.text_content().iter().any(|t| !t.trim().is_empty()))
        .collect();
    let node = ViewNode::stack(lines).styled(|s| {
        s.gap = 2.0;
        s.margin_bottom = 6.0;
    });
    match config.kind {
        TemplateKind::Simple => node,
        _ => node.styled(|s| {
            s.padding.left = 14.0;
            s.border_left = Some(Border {
                width: 4.0,
                color: ink.accent,
            });
        }),
    }
}
