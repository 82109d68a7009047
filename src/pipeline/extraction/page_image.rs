//! First-page raster extraction for the vision fallback tier.
//!
//! Scanned lab reports carry each page as an embedded image XObject
//! (JPEG or raw pixel data). The fallback tier only needs page 1, so this
//! walks page 1's resources, takes the largest image, and re-encodes it as
//! PNG for the inference request.

use image::ImageOutputFormat;
use lopdf::{Document, Object, ObjectId};

use super::types::PageRenderer;
use super::ExtractionError;

/// Extracts page 1's embedded scan image via lopdf.
pub struct FirstPageImager;

impl PageRenderer for FirstPageImager {
    fn render_first_page(&self, pdf_bytes: &[u8]) -> Result<Vec<u8>, ExtractionError> {
        let doc = Document::load_mem(pdf_bytes)
            .map_err(|e| ExtractionError::PdfParsing(format!("Failed to parse PDF: {e}")))?;

        let page_id = doc.page_iter().next().ok_or(ExtractionError::EmptyDocument)?;

        let image_bytes = largest_page_image(&doc, page_id)?;

        // Validate and re-encode to PNG for the inference request.
        let img = image::load_from_memory(&image_bytes).map_err(|e| {
            ExtractionError::ImageProcessing(format!("Failed to decode page image: {e}"))
        })?;

        let mut png_buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut png_buf, ImageOutputFormat::Png)
            .map_err(|e| ExtractionError::ImageProcessing(format!("PNG encode failed: {e}")))?;

        tracing::debug!(
            raw_size = image_bytes.len(),
            png_size = png_buf.get_ref().len(),
            "Rendered first page for vision fallback"
        );

        Ok(png_buf.into_inner())
    }
}

/// Walk page dict → /Resources → /XObject and return the raw bytes of the
/// largest /Subtype /Image entry (the main page scan).
fn largest_page_image(doc: &Document, page_id: ObjectId) -> Result<Vec<u8>, ExtractionError> {
    let page_dict = doc
        .get_object(page_id)
        .and_then(|obj| obj.as_dict())
        .map_err(|e| ExtractionError::PdfParsing(format!("Page object error: {e}")))?;

    let resources = resolve_dict_entry(doc, page_dict, b"Resources")?;
    let xobjects = resolve_dict_entry(doc, resources, b"XObject")?;

    let mut largest: Option<Vec<u8>> = None;

    for (_name, obj_ref) in xobjects.iter() {
        let xobj = resolve_object(doc, obj_ref);
        let stream = match xobj {
            Object::Stream(ref s) => s,
            _ => continue,
        };
        if !is_image_subtype(&stream.dict) {
            continue;
        }

        let image_bytes = stream_image_bytes(stream)?;
        if largest
            .as_ref()
            .map_or(true, |prev| image_bytes.len() > prev.len())
        {
            largest = Some(image_bytes);
        }
    }

    largest
        .ok_or_else(|| ExtractionError::PdfParsing("No scan image found on page 1".into()))
}

fn is_image_subtype(dict: &lopdf::Dictionary) -> bool {
    dict.get(b"Subtype")
        .map(|obj| matches!(obj, Object::Name(ref n) if n == b"Image"))
        .unwrap_or(false)
}

/// Extract decodable image bytes from a PDF image stream.
///
/// DCTDecode streams are JPEG files as-is. Other filters are decompressed
/// and, failing a direct decode, reconstructed from raw pixel data.
fn stream_image_bytes(stream: &lopdf::Stream) -> Result<Vec<u8>, ExtractionError> {
    let is_dct = stream
        .dict
        .get(b"Filter")
        .map(|f| match f {
            Object::Name(n) => n == b"DCTDecode",
            Object::Array(arr) => arr
                .iter()
                .any(|o| matches!(o, Object::Name(ref n) if n == b"DCTDecode")),
            _ => false,
        })
        .unwrap_or(false);

    let content = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());

    if is_dct || image::load_from_memory(&content).is_ok() {
        return Ok(content);
    }

    reconstruct_raw_image(&stream.dict, &content)
}

/// Reconstruct an image from raw pixel data using /Width, /Height and
/// /ColorSpace metadata, re-encoded as PNG.
fn reconstruct_raw_image(
    dict: &lopdf::Dictionary,
    raw_pixels: &[u8],
) -> Result<Vec<u8>, ExtractionError> {
    let width = get_int(dict, b"Width")? as u32;
    let height = get_int(dict, b"Height")? as u32;

    let channels: u32 = match dict.get(b"ColorSpace") {
        Ok(Object::Name(ref n)) if n == b"DeviceGray" => 1,
        Ok(Object::Name(ref n)) if n == b"DeviceCMYK" => 4,
        _ => 3,
    };

    let expected = (width * height * channels) as usize;
    if raw_pixels.len() < expected {
        return Err(ExtractionError::ImageProcessing(format!(
            "Raw pixel buffer too small: {} bytes, expected {} ({}x{}x{})",
            raw_pixels.len(),
            expected,
            width,
            height,
            channels
        )));
    }

    let img = match channels {
        1 => image::GrayImage::from_raw(width, height, raw_pixels[..expected].to_vec())
            .map(image::DynamicImage::ImageLuma8),
        3 => image::RgbImage::from_raw(width, height, raw_pixels[..expected].to_vec())
            .map(image::DynamicImage::ImageRgb8),
        // CMYK scan data is rare; treat as RGBA — the vision model does not
        // care about color accuracy.
        _ => image::RgbaImage::from_raw(width, height, raw_pixels[..expected].to_vec())
            .map(image::DynamicImage::ImageRgba8),
    }
    .ok_or_else(|| ExtractionError::ImageProcessing("Failed to assemble raw image".into()))?;

    let mut png_buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut png_buf, ImageOutputFormat::Png)
        .map_err(|e| ExtractionError::ImageProcessing(format!("PNG encode failed: {e}")))?;
    Ok(png_buf.into_inner())
}

fn resolve_object<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

fn resolve_dict_entry<'a>(
    doc: &'a Document,
    dict: &'a lopdf::Dictionary,
    key: &[u8],
) -> Result<&'a lopdf::Dictionary, ExtractionError> {
    let obj = dict.get(key).map_err(|_| {
        ExtractionError::PdfParsing(format!(
            "Missing /{} in dictionary",
            String::from_utf8_lossy(key)
        ))
    })?;

    resolve_object(doc, obj).as_dict().map_err(|_| {
        ExtractionError::PdfParsing(format!(
            "/{} is not a dictionary",
            String::from_utf8_lossy(key)
        ))
    })
}

fn get_int(dict: &lopdf::Dictionary, key: &[u8]) -> Result<i64, ExtractionError> {
    dict.get(key)
        .and_then(|obj| obj.as_i64())
        .map_err(|_| {
            ExtractionError::PdfParsing(format!(
                "Missing or non-integer /{} in image dictionary",
                String::from_utf8_lossy(key)
            ))
        })
}
