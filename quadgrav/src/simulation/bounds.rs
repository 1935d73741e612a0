//! Axis-aligned rectangles and the per-step bounding box
//!
//! A [`Rect`] is half-open: it owns `[x, x + width) × [y, y + height)`, so a
//! point on an edge shared by two neighbours belongs to exactly one of them.
//! `y` grows "south", matching the screen coordinates of the driving loop.

use serde::Deserialize;

use super::states::NVec2;

/// Quadrant of a rectangle, in child-slot order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    Nw = 0,
    Ne = 1,
    Sw = 2,
    Se = 3,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [Quadrant::Nw, Quadrant::Ne, Quadrant::Sw, Quadrant::Se];

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Extent used in place of the bodies' when no body has a finite position
    pub const FALLBACK: Rect = Rect { x: 0.0, y: 0.0, width: 100.0, height: 100.0 };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Smallest rectangle around the finite `points`, grown by `padding` on
    /// every side. With no finite point the `fallback` extent is padded
    /// instead.
    pub fn enclosing<I>(points: I, padding: f64, fallback: Rect) -> Rect
    where
        I: IntoIterator<Item = NVec2>,
    {
        let mut min = NVec2::new(f64::INFINITY, f64::INFINITY);
        let mut max = NVec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        let mut any = false;

        for p in points {
            if !(p.x.is_finite() && p.y.is_finite()) {
                continue;
            }
            any = true;
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }

        if !any {
            min = NVec2::new(fallback.x, fallback.y);
            max = NVec2::new(fallback.x + fallback.width, fallback.y + fallback.height);
        }

        Rect {
            x: min.x - padding,
            y: min.y - padding,
            width: (max.x - min.x) + padding * 2.0,
            height: (max.y - min.y) + padding * 2.0,
        }
    }

    pub fn contains(&self, p: &NVec2) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }

    /// Larger side, the `s` of the opening criterion
    pub fn size(&self) -> f64 {
        self.width.max(self.height)
    }

    pub fn center(&self) -> NVec2 {
        NVec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Quadrant holding `p`, split at the midpoint with the same half-open rule
    pub fn quadrant_of(&self, p: &NVec2) -> Quadrant {
        let mid = self.center();
        match (p.x >= mid.x, p.y >= mid.y) {
            (false, false) => Quadrant::Nw,
            (true, false) => Quadrant::Ne,
            (false, true) => Quadrant::Sw,
            (true, true) => Quadrant::Se,
        }
    }

    pub fn quadrant(&self, q: Quadrant) -> Rect {
        let hw = self.width * 0.5;
        let hh = self.height * 0.5;
        match q {
            Quadrant::Nw => Rect::new(self.x, self.y, hw, hh),
            Quadrant::Ne => Rect::new(self.x + hw, self.y, hw, hh),
            Quadrant::Sw => Rect::new(self.x, self.y + hh, hw, hh),
            Quadrant::Se => Rect::new(self.x + hw, self.y + hh, hw, hh),
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}
