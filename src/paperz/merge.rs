//! Batch merge pipeline.
//!
//! Combines an ordered batch of previously exported artifacts — all PDFs
//! or all raster images, never mixed — into one composite output, then
//! deletes the inputs. The cleanup is deliberately last: any failure
//! during assembly returns before it, leaving every input untouched.
//!
//! PDF mode concatenates pages in input order. Image mode loads each
//! raster, stretches its contrast, burns the item label into the top-left
//! and the date annotation into the top-center, and assembles the frames
//! into one multi-frame GIF.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, Frame, Rgb, RgbImage};
use lopdf::{Document as PdfDocument, Object, ObjectId};
use tracing::{debug, info};

use crate::error::{PaperzError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    Pdf,
    Images,
}

/// Merge `files` into `output` and delete the inputs.
///
/// `dates` annotate items in image mode (one per file, empty string for
/// none); `labels` defaults to each file's stem when absent. Inputs are
/// only removed after the output has been fully written.
pub fn merge(
    files: &[PathBuf],
    dates: &[String],
    labels: Option<&[String]>,
    output: &Path,
    mode: MergeMode,
) -> Result<()> {
    if files.is_empty() {
        return Err(PaperzError::Merge("nothing to merge".into()));
    }
    match mode {
        MergeMode::Pdf => merge_pdfs(files, output)?,
        MergeMode::Images => merge_images(files, dates, labels, output)?,
    }
    info!(output = %output.display(), inputs = files.len(), "merged");
    for file in files {
        fs::remove_file(file)?;
    }
    Ok(())
}

fn merge_pdfs(files: &[PathBuf], output: &Path) -> Result<()> {
    let mut max_id = 1;
    // page order must equal input order, so pages are collected in a Vec
    let mut pages: Vec<(ObjectId, Object)> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for path in files {
        let mut doc = PdfDocument::load(path)?;
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;
        for (_, object_id) in doc.get_pages() {
            pages.push((object_id, doc.get_object(object_id)?.to_owned()));
        }
        objects.extend(doc.objects);
    }

    let mut merged = PdfDocument::with_version("1.5");
    let mut catalog: Option<(ObjectId, Object)> = None;
    let mut page_tree: Option<(ObjectId, Object)> = None;

    for (object_id, object) in objects.iter() {
        match object.type_name().unwrap_or("") {
            "Catalog" => {
                let id = catalog.as_ref().map(|(id, _)| *id).unwrap_or(*object_id);
                catalog = Some((id, object.clone()));
            }
            "Pages" => {
                if let Ok(dict) = object.as_dict() {
                    let mut dict = dict.clone();
                    if let Some((_, ref existing)) = page_tree {
                        if let Ok(old) = existing.as_dict() {
                            dict.extend(old);
                        }
                    }
                    let id = page_tree.as_ref().map(|(id, _)| *id).unwrap_or(*object_id);
                    page_tree = Some((id, Object::Dictionary(dict)));
                }
            }
            // page objects are re-inserted below with their new parent;
            // outlines are dropped from the composite
            "Page" | "Outlines" | "Outline" => {}
            _ => {
                merged.objects.insert(*object_id, object.clone());
            }
        }
    }

    let (pages_id, pages_obj) =
        page_tree.ok_or_else(|| PaperzError::Merge("no page tree in inputs".into()))?;
    let (catalog_id, catalog_obj) =
        catalog.ok_or_else(|| PaperzError::Merge("no catalog in inputs".into()))?;

    for (object_id, object) in &pages {
        if let Ok(dict) = object.as_dict() {
            let mut dict = dict.clone();
            dict.set("Parent", pages_id);
            merged.objects.insert(*object_id, Object::Dictionary(dict));
        }
    }

    if let Ok(dict) = pages_obj.as_dict() {
        let mut dict = dict.clone();
        dict.set("Count", pages.len() as i64);
        dict.set(
            "Kids",
            pages
                .iter()
                .map(|(id, _)| Object::Reference(*id))
                .collect::<Vec<_>>(),
        );
        merged.objects.insert(pages_id, Object::Dictionary(dict));
    }

    if let Ok(dict) = catalog_obj.as_dict() {
        let mut dict = dict.clone();
        dict.set("Pages", pages_id);
        dict.remove(b"Outlines");
        merged.objects.insert(catalog_id, Object::Dictionary(dict));
    }

    merged.trailer.set("Root", catalog_id);
    merged.max_id = merged.objects.len() as u32;
    merged.renumber_objects();
    merged.compress();
    merged.save(output)?;
    debug!(pages = pages.len(), "wrote composite pdf");
    Ok(())
}

fn merge_images(
    files: &[PathBuf],
    dates: &[String],
    labels: Option<&[String]>,
    output: &Path,
) -> Result<()> {
    let mut frames = Vec::with_capacity(files.len());
    for (i, path) in files.iter().enumerate() {
        let mut rgb = image::open(path)?.to_rgb8();
        stretch_contrast(&mut rgb);

        let label = labels
            .and_then(|l| l.get(i).cloned())
            .unwrap_or_else(|| file_stem(path));
        let date = dates.get(i).map(String::as_str).unwrap_or("");
        annotate(&mut rgb, &label, date);

        let rgba = DynamicImage::ImageRgb8(rgb).to_rgba8();
        frames.push(Frame::from_parts(
            rgba,
            0,
            0,
            Delay::from_numer_denom_ms(1000, 1),
        ));
    }

    let file = File::create(output)?;
    let mut encoder = GifEncoder::new(file);
    encoder.set_repeat(Repeat::Infinite)?;
    encoder.encode_frames(frames)?;
    debug!(frames = files.len(), "wrote composite image");
    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Linear contrast stretch over all channels: maps the darkest observed
/// value to 0 and the brightest to 255.
fn stretch_contrast(img: &mut RgbImage) {
    let (mut lo, mut hi) = (u8::MAX, u8::MIN);
    for pixel in img.pixels() {
        for &v in pixel.0.iter() {
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    if hi <= lo {
        return;
    }
    let span = (hi - lo) as f32;
    for pixel in img.pixels_mut() {
        for v in pixel.0.iter_mut() {
            *v = (((*v - lo) as f32 / span) * 255.0).round() as u8;
        }
    }
}

const STAMP_COLOR: Rgb<u8> = Rgb([200, 20, 20]);
const STAMP_MARGIN: u32 = 4;

/// Burn the label into the top-left and the date into the top-center.
fn annotate(img: &mut RgbImage, label: &str, date: &str) {
    stamp_text(img, STAMP_MARGIN, STAMP_MARGIN, label, STAMP_COLOR);
    if !date.is_empty() {
        let text = format!("Date: {}", date);
        let x = img.width().saturating_sub(text_width(&text)) / 2;
        stamp_text(img, x, STAMP_MARGIN, &text, STAMP_COLOR);
    }
}

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
const GLYPH_TRACKING: u32 = 1;
const GLYPH_SCALE: u32 = 2;

fn text_width(text: &str) -> u32 {
    text.chars().count() as u32 * (GLYPH_WIDTH + GLYPH_TRACKING) * GLYPH_SCALE
}

/// Stamp text onto the raster with the built-in 5x7 dot-matrix face.
/// Letters render uppercase; characters without a glyph advance blank.
fn stamp_text(img: &mut RgbImage, x: u32, y: u32, text: &str, color: Rgb<u8>) {
    let mut cx = x;
    for ch in text.chars() {
        if let Some(rows) = glyph(ch.to_ascii_uppercase()) {
            for (gy, row) in rows.iter().enumerate() {
                for gx in 0..GLYPH_WIDTH {
                    if row & (0x10 >> gx) == 0 {
                        continue;
                    }
                    for sy in 0..GLYPH_SCALE {
                        for sx in 0..GLYPH_SCALE {
                            let px = cx + gx * GLYPH_SCALE + sx;
                            let py = y + gy as u32 * GLYPH_SCALE + sy;
                            if px < img.width() && py < img.height() {
                                img.put_pixel(px, py, color);
                            }
                        }
                    }
                }
            }
        }
        cx += (GLYPH_WIDTH + GLYPH_TRACKING) * GLYPH_SCALE;
    }
}

// 5x7 dot-matrix glyphs, one row per byte, bit 4 = leftmost column.
#[rustfmt::skip]
const FONT: &[(char, [u8; 7])] = &[
    ('0', [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E]),
    ('1', [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E]),
    ('2', [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F]),
    ('3', [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E]),
    ('4', [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02]),
    ('5', [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E]),
    ('6', [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E]),
    ('7', [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08]),
    ('8', [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E]),
    ('9', [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C]),
    ('A', [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11]),
    ('B', [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E]),
    ('C', [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E]),
    ('D', [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C]),
    ('E', [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F]),
    ('F', [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10]),
    ('G', [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F]),
    ('H', [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11]),
    ('I', [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E]),
    ('J', [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C]),
    ('K', [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11]),
    ('L', [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F]),
    ('M', [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11]),
    ('N', [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11]),
    ('O', [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E]),
    ('P', [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10]),
    ('Q', [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D]),
    ('R', [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11]),
    ('S', [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E]),
    ('T', [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04]),
    ('U', [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E]),
    ('V', [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04]),
    ('W', [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A]),
    ('X', [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11]),
    ('Y', [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04]),
    ('Z', [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F]),
    ('-', [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00]),
    ('.', [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C]),
    (':', [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00]),
    ('/', [0x01, 0x02, 0x02, 0x04, 0x08, 0x08, 0x10]),
];

fn glyph(c: char) -> Option<[u8; 7]> {
    FONT.iter().find(|(g, _)| *g == c).map(|(_, rows)| *rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifDecoder;
    use image::AnimationDecoder;
    use std::io::BufReader;

    fn write_png(dir: &Path, name: &str, shade: u8) -> PathBuf {
        let path = dir.join(name);
        let img = RgbImage::from_pixel(64, 48, Rgb([shade, shade, shade]));
        img.save(&path).unwrap();
        path
    }

    fn write_pdf(dir: &Path, name: &str) -> PathBuf {
        use lopdf::dictionary;
        use lopdf::Stream;

        let path = dir.join(name);
        let mut doc = PdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content = Stream::new(dictionary! {}, Vec::new());
        let content_id = doc.add_object(content);
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(&path).unwrap();
        path
    }

    #[test]
    fn image_merge_produces_frames_and_deletes_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let f1 = write_png(dir.path(), "a.png", 40);
        let f2 = write_png(dir.path(), "b.png", 200);
        let output = dir.path().join("merged.gif");

        merge(
            &[f1.clone(), f2.clone()],
            &["2020-01-01".into(), "2020-02-01".into()],
            None,
            &output,
            MergeMode::Images,
        )
        .unwrap();

        assert!(output.exists());
        assert!(!f1.exists());
        assert!(!f2.exists());

        let decoder = GifDecoder::new(BufReader::new(File::open(&output).unwrap())).unwrap();
        let frames = decoder.into_frames().collect_frames().unwrap();
        assert_eq!(frames.len(), 2);
    }

    #[test]
    fn pdf_merge_concatenates_pages_in_order_and_deletes_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let f1 = write_pdf(dir.path(), "a.pdf");
        let f2 = write_pdf(dir.path(), "b.pdf");
        let output = dir.path().join("merged.pdf");

        merge(
            &[f1.clone(), f2.clone()],
            &[String::new(), String::new()],
            None,
            &output,
            MergeMode::Pdf,
        )
        .unwrap();

        assert!(output.exists());
        assert!(!f1.exists());
        assert!(!f2.exists());

        let merged = PdfDocument::load(&output).unwrap();
        assert_eq!(merged.get_pages().len(), 2);
    }

    #[test]
    fn failed_merge_preserves_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_png(dir.path(), "a.png", 40);
        let missing = dir.path().join("missing.png");
        let output = dir.path().join("merged.gif");

        let result = merge(
            &[good.clone(), missing],
            &[String::new(), String::new()],
            None,
            &output,
            MergeMode::Images,
        );

        assert!(result.is_err());
        assert!(good.exists());
    }

    #[test]
    fn contrast_stretch_expands_range() {
        let mut img = RgbImage::from_pixel(4, 4, Rgb([100, 100, 100]));
        img.put_pixel(0, 0, Rgb([60, 60, 60]));
        img.put_pixel(1, 0, Rgb([140, 140, 140]));
        stretch_contrast(&mut img);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(img.get_pixel(1, 0).0, [255, 255, 255]);
    }

    #[test]
    fn stamp_marks_pixels() {
        let mut img = RgbImage::from_pixel(64, 32, Rgb([255, 255, 255]));
        stamp_text(&mut img, 2, 2, "A1", STAMP_COLOR);
        let marked = img.pixels().filter(|p| p.0 == STAMP_COLOR.0).count();
        assert!(marked > 0);
    }
}
