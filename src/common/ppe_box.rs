use serde::{Deserialize, Serialize};

/// Axis-aligned box in frame pixel coordinates.
///
/// Degenerate boxes (non-positive width or height) are allowed; every measure on them
/// collapses to zero instead of failing.
#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize, PartialOrd)]
pub struct PpeBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub w: f32,
    pub h: f32,
}

impl PpeBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            w: x2 - x1,
            h: y2 - y1,
        }
    }

    /// Returns the width of the bounding box, never negative.
    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.)
    }

    /// Returns the height of the bounding box, never negative.
    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.)
    }

    /// Returns the center x-coordinate of the bounding box.
    pub fn cx(&self) -> f32 {
        (self.x1 + self.x2) / 2.
    }

    /// Returns the center y-coordinate of the bounding box.
    pub fn cy(&self) -> f32 {
        (self.y1 + self.y2) / 2.
    }

    /// Returns the center point as `(cx, cy)`.
    pub fn center(&self) -> (f32, f32) {
        (self.cx(), self.cy())
    }

    /// Returns the bounding box coordinates as `(x1, y1, x2, y2)`.
    pub fn xy1_xy2(&self) -> (f32, f32, f32, f32) {
        (self.x1, self.y1, self.x2, self.y2)
    }

    /// Computes the area of the bounding box. Zero for degenerate boxes.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.area() > 0.)
    }

    /// Computes the intersection area between this bounding box and another.
    pub fn intersect(&self, other: &PpeBox) -> f32 {
        let left = self.x1.max(other.x1);
        let right = self.x2.min(other.x2);
        let top = self.y1.max(other.y1);
        let bottom = self.y2.min(other.y2);
        (right - left).max(0.) * (bottom - top).max(0.)
    }

    /// Computes the union area between this bounding box and another.
    pub fn union(&self, other: &PpeBox) -> f32 {
        self.area() + other.area() - self.intersect(other)
    }

    /// Computes the intersection over union (IoU) between this bounding box and another.
    ///
    /// Symmetric and bounded to `[0, 1]`; zero whenever the union is empty.
    pub fn iou(&self, other: &PpeBox) -> f32 {
        let union = self.union(other);
        if !(union > 0.) {
            return 0.;
        }
        let iou = self.intersect(other) / union;
        if iou.is_finite() {
            iou.clamp(0., 1.)
        } else {
            0.
        }
    }

    /// Fraction of `other`'s area that lies inside this box.
    pub fn coverage_of(&self, other: &PpeBox) -> f32 {
        let area = other.area();
        if !(area > 0.) {
            return 0.;
        }
        (self.intersect(other) / area).clamp(0., 1.)
    }

    /// Checks whether the point lies inside the box, edges included.
    pub fn contains_point(&self, (x, y): (f32, f32)) -> bool {
        self.x1 <= x && x <= self.x2 && self.y1 <= y && y <= self.y2
    }

    /// Checks if this bounding box completely contains another bounding box `other`.
    pub fn contains(&self, other: &PpeBox) -> bool {
        self.x1 <= other.x1
            && self.x2 >= other.x2
            && self.y1 <= other.y1
            && self.y2 >= other.y2
    }

    /// Clamps the box to a `width` x `height` frame.
    pub fn clamped(&self, width: u32, height: u32) -> Self {
        let (w, h) = (width as f32, height as f32);
        Self::new(
            self.x1.clamp(0., w),
            self.y1.clamp(0., h),
            self.x2.clamp(0., w),
            self.y2.clamp(0., h),
        )
    }

    pub fn as_xy_wh_i32(&self) -> (i32, i32, i32, i32) {
        (self.x1.round() as i32,
         self.y1.round() as i32,
         self.width().round() as i32,
         self.height().round() as i32)
    }

    /// Sets the bounding box's coordinates and dimensions using `(cx, cy, w, h)`.
    ///
    /// # Arguments
    ///
    /// * `cx` - The x-coordinate of the horizontal center.
    /// * `cy` - The y-coordinate of the vertical center.
    /// * `w` - The width of the bounding box.
    /// * `h` - The height of the bounding box.
    pub fn with_cxcy_wh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.x1 = cx - (w / 2.0);
        self.y1 = cy - (h / 2.0);

        self.x2 = cx + (w / 2.0);
        self.y2 = cy + (h / 2.0);

        self.w = self.x2 - self.x1;
        self.h = self.y2 - self.y1;
        self
    }
}

/// Area of `b`; zero for degenerate boxes.
pub fn area(b: &PpeBox) -> f32 {
    b.area()
}

/// Intersection over union of two boxes.
pub fn iou(a: &PpeBox, b: &PpeBox) -> f32 {
    a.iou(b)
}

pub fn center(b: &PpeBox) -> (f32, f32) {
    b.center()
}

/// Whether `point` lies inside `b`, edges included.
pub fn contains(b: &PpeBox, point: (f32, f32)) -> bool {
    b.contains_point(point)
}
