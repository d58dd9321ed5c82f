//! Hex grid geometry with odd-row offset and cube coordinates
//!
//! Offset coordinates (column, row) are what the board, the wire protocol and
//! the UI speak. Cube coordinates are used internally for distance, neighbor
//! and interpolation math.

use serde::{Deserialize, Serialize};

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Offset hex coordinate in the odd-row ("odd-r") layout
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

/// Cube hex coordinate, always with x + y + z == 0
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cube {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// The six cube unit vectors, indexed by direction 0-5
pub const CUBE_DIRECTIONS: [Cube; 6] = [
    Cube::new(1, -1, 0),
    Cube::new(1, 0, -1),
    Cube::new(0, 1, -1),
    Cube::new(-1, 1, 0),
    Cube::new(-1, 0, 1),
    Cube::new(0, -1, 1),
];

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn to_cube(self) -> Cube {
        let x = self.x - (self.y - (self.y & 1)) / 2;
        let z = self.y;
        Cube::new(x, -x - z, z)
    }

    /// Distance in hex steps
    pub fn distance_to(self, other: Coord) -> u32 {
        self.to_cube().distance_to(other.to_cube())
    }

    /// Get neighbor in direction (0-5)
    pub fn neighbor(self, direction: usize) -> Coord {
        self.to_cube().neighbor(direction).to_offset()
    }

    pub fn neighbors(self) -> impl Iterator<Item = Coord> {
        (0..6).map(move |d| self.neighbor(d))
    }

    /// Cells on the straight line from `self` to `other`, both ends included
    pub fn line_to(self, other: Coord) -> Vec<Coord> {
        let n = self.distance_to(other);
        if n == 0 {
            return vec![self];
        }

        let a = self.to_cube();
        let b = other.to_cube();
        (0..=n)
            .map(|i| {
                let t = f64::from(i) / f64::from(n);
                cube_round(
                    lerp(a.x, b.x, t),
                    lerp(a.y, b.y, t),
                    lerp(a.z, b.z, t),
                )
                .to_offset()
            })
            .collect()
    }
}

impl Cube {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn to_offset(self) -> Coord {
        Coord::new(self.x + (self.z - (self.z & 1)) / 2, self.z)
    }

    pub fn distance_to(self, other: Cube) -> u32 {
        ((self.x - other.x).unsigned_abs()
            + (self.y - other.y).unsigned_abs()
            + (self.z - other.z).unsigned_abs())
            / 2
    }

    pub fn neighbor(self, direction: usize) -> Cube {
        self + CUBE_DIRECTIONS[direction % 6]
    }
}

impl std::ops::Add for Cube {
    type Output = Cube;

    fn add(self, rhs: Cube) -> Cube {
        Cube::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

fn lerp(a: i32, b: i32, t: f64) -> f64 {
    f64::from(a) + f64::from(b - a) * t
}

/// Round fractional cube components to the nearest valid cube.
///
/// The component with the largest rounding error is recomputed from the other
/// two so that x + y + z == 0 holds.
fn cube_round(x: f64, y: f64, z: f64) -> Cube {
    let mut rx = x.round();
    let mut ry = y.round();
    let mut rz = z.round();

    let dx = (rx - x).abs();
    let dy = (ry - y).abs();
    let dz = (rz - z).abs();

    if dx > dy && dx > dz {
        rx = -ry - rz;
    } else if dy > dz {
        ry = -rx - rz;
    } else {
        rz = -rx - ry;
    }

    Cube::new(rx as i32, ry as i32, rz as i32)
}

// ============================================================================
// PIXEL LAYOUT
// ============================================================================

/// A point on the drawing surface
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Pointy-top hex layout: hex radius in pixels plus the pixel position of
/// cell (0, 0)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub size: f64,
    pub origin: Point,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            size: 25.0,
            origin: Point::new(80.0, 50.0),
        }
    }
}

impl Layout {
    pub fn new(size: f64, origin: Point) -> Self {
        Self { size, origin }
    }

    /// Centre of a hex on the drawing surface
    pub fn hex_to_pixel(&self, hex: Coord) -> Point {
        let x = self.size * SQRT_3 * (f64::from(hex.x) + 0.5 * f64::from(hex.y & 1));
        let y = self.size * 1.5 * f64::from(hex.y);
        Point::new(self.origin.x + x, self.origin.y + y)
    }

    /// Hex containing a point on the drawing surface
    pub fn pixel_to_hex(&self, point: Point) -> Coord {
        let px = point.x - self.origin.x;
        let py = point.y - self.origin.y;
        let q = (SQRT_3 / 3.0 * px - py / 3.0) / self.size;
        let r = (2.0 / 3.0 * py) / self.size;
        cube_round(q, -q - r, r).to_offset()
    }

    /// The six corners of the hex centred at `center`
    pub fn corners(&self, center: Point) -> [Point; 6] {
        std::array::from_fn(|i| {
            let angle = (60.0 * i as f64 - 30.0).to_radians();
            Point::new(
                center.x + self.size * angle.cos(),
                center.y + self.size * angle.sin(),
            )
        })
    }
}
