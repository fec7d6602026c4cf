//! Writes a paginated snapshot as a PDF.
//!
//! The bitmap is embedded once as a JPEG image XObject and drawn on every
//! page at the page width. Each page clips to its media box before drawing,
//! then shifts the image up by the page's offset.

use chrono::{DateTime, Utc};
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use thiserror::Error;

use crate::render::paginator::Pagination;

const JPEG_QUALITY: u8 = 92;
const IMAGE_NAME: &str = "Im0";

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("failed to encode page image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("failed to assemble document: {0}")]
    Document(#[from] lopdf::Error),

    #[error("failed to write document: {0}")]
    Io(#[from] std::io::Error),
}

/// Document info entries.
#[derive(Debug, Clone)]
pub struct PdfMeta {
    pub title: String,
    pub created_at: DateTime<Utc>,
}

pub fn write_pdf(image: &RgbaImage, pagination: &Pagination, meta: &PdfMeta) -> Result<Vec<u8>, PdfError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY).encode(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        ColorType::Rgb8,
    )?;

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(image.width()),
            "Height" => i64::from(image.height()),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        jpeg,
    ));

    let resources_id = doc.add_object(dictionary! {
        "XObject" => dictionary! { IMAGE_NAME => image_id },
    });

    let page_w = pagination.page.width as f32;
    let page_h = pagination.page.height as f32;
    let scaled_h = pagination.scaled_height as f32;

    let mut kids = Vec::with_capacity(pagination.pages.len());
    for placement in &pagination.pages {
        // PDF space grows upwards: the image's bottom edge sits at
        // page_h - scaled_h from the top offset.
        let y = page_h - scaled_h - placement.offset_y as f32;
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "re",
                    vec![0.into(), 0.into(), page_w.into(), page_h.into()],
                ),
                Operation::new("W", vec![]),
                Operation::new("n", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        page_w.into(),
                        0.into(),
                        0.into(),
                        scaled_h.into(),
                        0.into(),
                        y.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), page_w.into(), page_h.into()],
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(meta.title.as_str()),
        "Producer" => Object::string_literal(concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"))),
        "CreationDate" => Object::string_literal(pdf_date(meta.created_at)),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

fn pdf_date(at: DateTime<Utc>) -> String {
    at.format("D:%Y%m%d%H%M%S+00'00'").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::paginator::{paginate, PageFormat};
    use chrono::TimeZone;
    use image::Rgba;

    fn meta() -> PdfMeta {
        PdfMeta {
            title: "Ada Lovelace".into(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    fn write(width: u32, height: u32) -> (Document, usize) {
        let image = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
        let pagination = paginate(width, height, PageFormat::A4.size()).unwrap();
        let bytes = write_pdf(&image, &pagination, &meta()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        (Document::load_mem(&bytes).unwrap(), pagination.page_count())
    }

    #[test]
    fn test_page_tree_matches_pagination() {
        let (doc, expected) = write(200, 900);
        assert!(expected > 1);
        assert_eq!(doc.get_pages().len(), expected);
    }

    #[test]
    fn test_single_short_page() {
        let (doc, expected) = write(200, 20);
        assert_eq!(expected, 1);
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_info_dictionary_is_set() {
        let (doc, _) = write(100, 100);
        let info_ref = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let info = doc.get_dictionary(info_ref).unwrap();
        assert_eq!(info.get(b"Title").unwrap().as_str().unwrap(), b"Ada Lovelace");
        assert_eq!(
            info.get(b"CreationDate").unwrap().as_str().unwrap(),
            b"D:20240301120000+00'00'"
        );
    }

    #[test]
    fn test_pages_share_one_image() {
        let (doc, _) = write(200, 900);
        let images = doc
            .objects
            .values()
            .filter(|o| match o {
                Object::Stream(s) => s
                    .dict
                    .get(b"Subtype")
                    .and_then(|v| v.as_name())
                    .map(|n| n == b"Image")
                    .unwrap_or(false),
                _ => false,
            })
            .count();
        assert_eq!(images, 1);
    }
}
