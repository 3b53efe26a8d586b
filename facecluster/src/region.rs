//! Crop geometry for face thumbnails.
//!
//! A face box is widened by one box-width to each side and one box-height
//! above and below, so the crop shows head and shoulders. Whatever falls
//! outside the frame is recorded as padding instead of being cut off, which
//! keeps the face centred in the thumbnail. Only coordinates are computed;
//! cropping pixels is left to the caller.

use serde::{Deserialize, Serialize};

/// A detected face box in frame pixel coordinates, in the
/// `(top, right, bottom, left)` order face detectors report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct FaceBox {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl From<[i32; 4]> for FaceBox {
    fn from([top, right, bottom, left]: [i32; 4]) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

impl From<FaceBox> for [i32; 4] {
    fn from(b: FaceBox) -> Self {
        [b.top, b.right, b.bottom, b.left]
    }
}

/// Half-open pixel rectangle `[top, bottom) x [left, right)` inside a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub top: u32,
    pub left: u32,
    pub bottom: u32,
    pub right: u32,
}

impl Rect {
    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }
}

/// Constant border to add around a crop, per edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Padding {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

/// The frame region to cut out for a face, and the border to add around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropPlan {
    pub crop: Rect,
    pub pad: Padding,
}

impl CropPlan {
    pub fn needs_padding(&self) -> bool {
        self.pad != Padding::default()
    }
}

impl FaceBox {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Computes the thumbnail crop for this box inside a
    /// `frame_width x frame_height` frame.
    ///
    /// The far edges clamp to `height - 1` and `width - 1`. Returns `None`
    /// for degenerate boxes and empty frames.
    pub fn crop_plan(&self, frame_width: u32, frame_height: u32) -> Option<CropPlan> {
        let (w, h) = (self.width() as i64, self.height() as i64);
        if w <= 0 || h <= 0 || frame_width == 0 || frame_height == 0 {
            return None;
        }
        let (fw, fh) = (frame_width as i64, frame_height as i64);
        let (top, bottom) = (self.top as i64 - h, self.bottom as i64 + h);
        let (left, right) = (self.left as i64 - w, self.right as i64 + w);

        let crop = Rect {
            top: top.clamp(0, fh - 1) as u32,
            left: left.clamp(0, fw - 1) as u32,
            bottom: bottom.clamp(0, fh - 1) as u32,
            right: right.clamp(0, fw - 1) as u32,
        };
        let pad = Padding {
            top: (-top).max(0) as u32,
            bottom: (bottom - fh).max(0) as u32,
            left: (-left).max(0) as u32,
            right: (right - fw).max(0) as u32,
        };
        Some(CropPlan { crop, pad })
    }
}
