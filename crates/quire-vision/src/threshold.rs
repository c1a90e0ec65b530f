// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Locally-normalized (adaptive) thresholding over a summed-area table.
//
// A single global cutoff fails on unevenly lit photographs, so both the
// detection pass and the black-and-white filter threshold each pixel against
// the mean of its own neighbourhood. The two passes differ only in polarity
// and tuning: detection wants a mask of locally-dark pixels (edge bands),
// the filter wants readable black ink on white paper.

use image::{GrayImage, Luma};

/// Summed-area table over a grayscale image, for O(1) regional means.
///
/// The table is `(width + 1) x (height + 1)` with a zero border, so the sum
/// of the rectangle `[x1, x2) x [y1, y2)` is a four-corner lookup.
pub struct IntegralImage {
    sums: Vec<u64>,
    width: u32,
    height: u32,
}

impl IntegralImage {
    pub fn new(gray: &GrayImage) -> Self {
        let (w, h) = gray.dimensions();
        let stride = (w + 1) as usize;
        let mut sums = vec![0u64; stride * (h + 1) as usize];

        for y in 0..h {
            let mut row_sum: u64 = 0;
            for x in 0..w {
                row_sum += gray.get_pixel(x, y).0[0] as u64;
                let idx = (y + 1) as usize * stride + (x + 1) as usize;
                sums[idx] = row_sum + sums[idx - stride];
            }
        }

        Self {
            sums,
            width: w,
            height: h,
        }
    }

    /// Mean pixel value of the square neighbourhood centred on `(cx, cy)`
    /// with the given radius, clipped to image bounds.
    pub fn region_mean(&self, cx: u32, cy: u32, radius: u32) -> f64 {
        let stride = (self.width + 1) as usize;

        let x1 = cx.saturating_sub(radius) as usize;
        let y1 = cy.saturating_sub(radius) as usize;
        let x2 = ((cx + radius + 1) as usize).min(self.width as usize);
        let y2 = ((cy + radius + 1) as usize).min(self.height as usize);

        let area = ((x2 - x1) * (y2 - y1)) as f64;
        if area == 0.0 {
            return 128.0;
        }

        let sum = self.sums[y2 * stride + x2] as f64 - self.sums[y1 * stride + x2] as f64
            - self.sums[y2 * stride + x1] as f64
            + self.sums[y1 * stride + x1] as f64;

        sum / area
    }
}

/// Readability binarization: pixels darker than their local mean minus
/// `bias` become black, everything else white. This is the scan-style
/// black-and-white rendition.
pub fn binarize(gray: &GrayImage, block_radius: u32, bias: i32) -> GrayImage {
    threshold_with(gray, block_radius, bias, 0, 255)
}

/// Detection mask: pixels darker than their local mean minus `bias` become
/// white (foreground), everything else black. Uniform regions — bright or
/// dark — drop out entirely; what remains are the bands where intensity
/// falls off against its surroundings, i.e. edges.
pub fn dark_mask(gray: &GrayImage, block_radius: u32, bias: i32) -> GrayImage {
    threshold_with(gray, block_radius, bias, 255, 0)
}

fn threshold_with(
    gray: &GrayImage,
    block_radius: u32,
    bias: i32,
    below: u8,
    above: u8,
) -> GrayImage {
    let (width, height) = gray.dimensions();
    let integral = IntegralImage::new(gray);
    let mut output = GrayImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let local_mean = integral.region_mean(x, y, block_radius);
            let cutoff = (local_mean as i32 - bias).clamp(0, 255) as u8;
            let value = gray.get_pixel(x, y).0[0];
            let out = if value < cutoff { below } else { above };
            output.put_pixel(x, y, Luma([out]));
        }
    }

    output
}
