//! Marker symbols and per-curve colours.

use plotters::style::RGBColor;
use std::f64::consts::PI;
use std::fmt;

/// Marker symbols available to curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Square,
    Diamond,
    Point,
    Circle,
    TriangleUp,
    TriangleDown,
    Star,
    Octagon,
    Cross,
}

/// Order in which markers are handed out to curves.
pub const MARKERS: [MarkerShape; 9] = [
    MarkerShape::Square,
    MarkerShape::Diamond,
    MarkerShape::Point,
    MarkerShape::Circle,
    MarkerShape::TriangleUp,
    MarkerShape::TriangleDown,
    MarkerShape::Star,
    MarkerShape::Octagon,
    MarkerShape::Cross,
];

impl MarkerShape {
    /// Single character symbol, as used by common plotting conventions.
    pub fn symbol(&self) -> char {
        match self {
            MarkerShape::Square => 's',
            MarkerShape::Diamond => 'D',
            MarkerShape::Point => '.',
            MarkerShape::Circle => 'o',
            MarkerShape::TriangleUp => '^',
            MarkerShape::TriangleDown => 'v',
            MarkerShape::Star => '*',
            MarkerShape::Octagon => '8',
            MarkerShape::Cross => 'x',
        }
    }

    /// Outline of the marker as a pixel path centred on (0, 0), y pointing down.
    ///
    /// Every shape except the cross is a closed polygon, so drawing the path
    /// with a plain stroke gives an unfilled marker face.
    pub fn outline(&self, radius: i32) -> Vec<(i32, i32)> {
        let r = radius.max(1);
        match self {
            MarkerShape::Square => {
                let s = (r as f64 * 0.8).round() as i32;
                vec![(-s, -s), (s, -s), (s, s), (-s, s), (-s, -s)]
            }
            MarkerShape::Diamond => vec![(0, -r), (r, 0), (0, r), (-r, 0), (0, -r)],
            MarkerShape::Point => regular_polygon(8, r as f64 * 0.4, 0.0),
            MarkerShape::Circle => regular_polygon(16, r as f64, 0.0),
            MarkerShape::TriangleUp => regular_polygon(3, r as f64, -90.0),
            MarkerShape::TriangleDown => regular_polygon(3, r as f64, 90.0),
            MarkerShape::Star => star(r as f64),
            MarkerShape::Octagon => regular_polygon(8, r as f64, 22.5),
            // Passing through the centre twice draws both diagonals in one path
            MarkerShape::Cross => vec![(-r, -r), (r, r), (0, 0), (-r, r), (r, -r)],
        }
    }
}

impl fmt::Display for MarkerShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

fn regular_polygon(sides: usize, radius: f64, start_deg: f64) -> Vec<(i32, i32)> {
    let mut points: Vec<(i32, i32)> = (0..sides)
        .map(|i| {
            let angle = (start_deg + 360.0 * i as f64 / sides as f64) * PI / 180.0;
            (
                (radius * angle.cos()).round() as i32,
                (radius * angle.sin()).round() as i32,
            )
        })
        .collect();
    points.push(points[0]);
    points
}

fn star(radius: f64) -> Vec<(i32, i32)> {
    let inner = radius * 0.38;
    let mut points: Vec<(i32, i32)> = (0..10)
        .map(|i| {
            let r = if i % 2 == 0 { radius } else { inner };
            let angle = (-90.0 + 36.0 * i as f64) * PI / 180.0;
            ((r * angle.cos()).round() as i32, (r * angle.sin()).round() as i32)
        })
        .collect();
    points.push(points[0]);
    points
}

/// Marker sequence, recycling after the last table entry.
#[derive(Debug, Clone, Default)]
pub struct MarkerCycle {
    count: usize,
}

impl MarkerCycle {
    pub fn new() -> Self {
        Self { count: 0 }
    }

    pub fn next_marker(&mut self) -> MarkerShape {
        let marker = MARKERS[self.count % MARKERS.len()];
        self.count += 1;
        marker
    }
}

/// Ten-colour qualitative palette used for curves in addition order.
pub fn palette_color(index: usize) -> RGBColor {
    const PALETTE: [(u8, u8, u8); 10] = [
        (31, 119, 180),
        (255, 127, 14),
        (44, 160, 44),
        (214, 39, 40),
        (148, 103, 189),
        (140, 86, 75),
        (227, 119, 194),
        (127, 127, 127),
        (188, 189, 34),
        (23, 190, 207),
    ];
    let (r, g, b) = PALETTE[index % PALETTE.len()];
    RGBColor(r, g, b)
}
