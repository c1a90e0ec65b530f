// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF assembler — builds one PDF page per scanned page bitmap using
// `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use std::path::Path;

use image::DynamicImage;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use quire_core::PaperSize;
use quire_core::error::QuireError;
use tracing::{debug, info, instrument};

/// Assembles scanned page bitmaps into a single PDF document.
pub struct PdfAssembler {
    /// Paper size for every page.
    paper_size: PaperSize,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl PdfAssembler {
    /// Create an assembler targeting the given paper size.
    pub fn new(paper_size: PaperSize) -> Self {
        Self {
            paper_size,
            title: None,
        }
    }

    /// Create an assembler defaulting to A4.
    pub fn a4() -> Self {
        Self::new(PaperSize::A4)
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Paper dimensions in printpdf's Mm units.
    fn page_dimensions(&self) -> (Mm, Mm) {
        let (w_mm, h_mm) = self.paper_size.dimensions_mm();
        (Mm(w_mm as f32), Mm(h_mm as f32))
    }

    /// Assemble the ordered page bitmaps into one PDF byte stream.
    ///
    /// Each bitmap becomes one page, scaled to fit within the page margins
    /// while preserving its aspect ratio (never upscaled), and centered.
    /// An empty sequence is an error — there is nothing to assemble.
    #[instrument(skip_all)]
    pub fn assemble<'a>(
        &self,
        pages: impl IntoIterator<Item = &'a DynamicImage>,
    ) -> Result<Vec<u8>, QuireError> {
        let (page_w, page_h) = self.page_dimensions();
        let title = self.title.as_deref().unwrap_or("Quire Scan");

        info!(paper = ?self.paper_size, title, "Assembling PDF");

        let mut doc = PdfDocument::new(title);
        let mut pdf_pages: Vec<PdfPage> = Vec::new();

        for (index, bitmap) in pages.into_iter().enumerate() {
            let ops = place_image(&mut doc, bitmap, page_w, page_h);
            debug!(page = index + 1, "Page placed");
            pdf_pages.push(PdfPage::new(page_w, page_h, ops));
        }

        if pdf_pages.is_empty() {
            return Err(QuireError::NoPages);
        }

        let page_count = pdf_pages.len();
        doc.with_pages(pdf_pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);

        info!(page_count, bytes = output.len(), "PDF assembled");
        Ok(output)
    }

    /// Assemble and write the PDF directly to a file.
    pub fn write_to_file<'a>(
        &self,
        pages: impl IntoIterator<Item = &'a DynamicImage>,
        path: impl AsRef<Path>,
    ) -> Result<(), QuireError> {
        let bytes = self.assemble(pages)?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!("Wrote PDF to {}", path.as_ref().display());
        Ok(())
    }
}

/// Register a bitmap with the document and emit the ops placing it on a
/// page, scaled to fit the margins and centered.
fn place_image(doc: &mut PdfDocument, bitmap: &DynamicImage, page_w: Mm, page_h: Mm) -> Vec<Op> {
    let img_width = bitmap.width() as usize;
    let img_height = bitmap.height() as usize;

    // Convert to RGB8 for printpdf.
    let rgb = bitmap.to_rgb8();
    let raw = RawImage {
        pixels: RawImageData::U8(rgb.into_raw()),
        width: img_width,
        height: img_height,
        data_format: RawImageFormat::RGB8,
        tag: Vec::new(),
    };
    let xobject_id = doc.add_image(&raw);

    let margin_mm: f32 = 15.0;
    let usable_w_pt = Mm(page_w.0 - 2.0 * margin_mm).into_pt().0;
    let usable_h_pt = Mm(page_h.0 - 2.0 * margin_mm).into_pt().0;

    // Image native size at 150 DPI (reasonable for print).
    let dpi: f32 = 150.0;
    let img_w_pt = img_width as f32 / dpi * 72.0;
    let img_h_pt = img_height as f32 / dpi * 72.0;

    // Scale to fit while preserving aspect ratio; do not upscale.
    let scale_x = usable_w_pt / img_w_pt;
    let scale_y = usable_h_pt / img_h_pt;
    let scale = scale_x.min(scale_y).min(1.0);

    let rendered_w_pt = img_w_pt * scale;
    let rendered_h_pt = img_h_pt * scale;

    let margin_pt = Mm(margin_mm).into_pt().0;
    let x_offset = margin_pt + (usable_w_pt - rendered_w_pt) / 2.0;
    let y_offset = margin_pt + (usable_h_pt - rendered_h_pt) / 2.0;

    vec![Op::UseXobject {
        id: xobject_id,
        transform: XObjectTransform {
            translate_x: Some(Pt(x_offset)),
            translate_y: Some(Pt(y_offset)),
            scale_x: Some(scale),
            scale_y: Some(scale),
            dpi: Some(dpi),
            rotate: None,
        },
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn gray_page(w: u32, h: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(w, h, Luma([value])))
    }

    #[test]
    fn assembles_multiple_pages_into_one_pdf() {
        let pages = [gray_page(200, 280, 200), gray_page(200, 280, 90)];
        let assembler = PdfAssembler::a4();
        let bytes = assembler.assemble(pages.iter()).unwrap();

        assert!(bytes.starts_with(b"%PDF-"), "output should be a PDF");
        assert!(bytes.len() > 1000);
    }

    #[test]
    fn empty_page_list_is_an_error() {
        let assembler = PdfAssembler::a4();
        let result = assembler.assemble(std::iter::empty());
        assert!(matches!(result, Err(QuireError::NoPages)));
    }

    #[test]
    fn writes_pdf_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        let pages = [gray_page(100, 140, 180)];

        let mut assembler = PdfAssembler::new(PaperSize::Letter);
        assembler.set_title("Test Scan");
        assembler.write_to_file(pages.iter(), &path).unwrap();

        let written = std::fs::read(&path).unwrap();
        assert!(written.starts_with(b"%PDF-"));
    }
}
