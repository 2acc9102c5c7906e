use nalgebra::{
    Point2,
    Vector2,
};

/// World-space bounding rectangle of the solved region.
///
/// `top_left` carries the smaller x and the larger y; the y axis points
/// up, as on the board cross-section.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Area {
    pub top_left: Point2<f64>,
    pub bottom_right: Point2<f64>,
}

impl Area {
    pub fn new(top_left: Point2<f64>, bottom_right: Point2<f64>) -> Self {
        Self {
            top_left,
            bottom_right,
        }
    }

    pub fn width(&self) -> f64 {
        self.bottom_right.x - self.top_left.x
    }

    pub fn height(&self) -> f64 {
        self.top_left.y - self.bottom_right.y
    }

    /// World position of the bottom-left corner, the origin of the
    /// solver grid.
    pub fn bottom_left(&self) -> Point2<f64> {
        Point2::new(self.top_left.x, self.bottom_right.y)
    }

    /// Whether `point` lies on one of the four edges, within
    /// `tolerance` in either coordinate.
    pub fn on_edge(&self, point: &Point2<f64>, tolerance: f64) -> bool {
        (point.x - self.top_left.x).abs() <= tolerance
            || (point.x - self.bottom_right.x).abs() <= tolerance
            || (point.y - self.top_left.y).abs() <= tolerance
            || (point.y - self.bottom_right.y).abs() <= tolerance
    }
}

/// A simple polygon over world coordinates.
///
/// There is no explicit closing vertex; the edge from the last vertex
/// back to the first is implied everywhere.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point2<f64>>,
}

impl Polygon {
    pub fn new(vertices: Vec<Point2<f64>>) -> Self {
        Self { vertices }
    }

    /// Axis-aligned rectangle from two opposite corners, in
    /// counter-clockwise order.
    pub fn rectangle(a: Point2<f64>, b: Point2<f64>) -> Self {
        let (x0, x1) = (a.x.min(b.x), a.x.max(b.x));
        let (y0, y1) = (a.y.min(b.y), a.y.max(b.y));
        Self::new(vec![
            Point2::new(x0, y0),
            Point2::new(x1, y0),
            Point2::new(x1, y1),
            Point2::new(x0, y1),
        ])
    }

    pub fn vertices(&self) -> &[Point2<f64>] {
        &self.vertices
    }

    pub fn vertices_mut(&mut self) -> &mut Vec<Point2<f64>> {
        &mut self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Iterates over the edges as (previous, current) vertex pairs,
    /// starting with the implied last-to-first edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point2<f64>, Point2<f64>)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[(i + n - 1) % n], self.vertices[i]))
    }

    /// Odd-even containment test. Points exactly on an edge resolve to
    /// a consistent side (bottom/left edges in, top/right edges out).
    pub fn contains(&self, point: &Point2<f64>) -> bool {
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > point.y) != (b.y > point.y) {
                let x = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if point.x < x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Twice the shoelace sum; positive for counter-clockwise winding
    /// with the y axis pointing up.
    pub fn signed_area(&self) -> f64 {
        let mut area = 0.0;
        for (a, b) in self.edges() {
            area += a.x * b.y - b.x * a.y;
        }
        area / 2.0
    }

    pub fn is_clockwise(&self) -> bool {
        self.signed_area() < 0.0
    }

    /// Translates every edge outward along its normal by `distance`
    /// and reconnects consecutive edges at their intersection.
    ///
    /// The input winding is preserved; polygons with fewer than three
    /// vertices are returned unchanged.
    pub fn offset(&self, distance: f64) -> Polygon {
        let n = self.vertices.len();
        if n < 3 {
            return self.clone();
        }

        // outward is to the right of the edge direction for
        // counter-clockwise polygons, to the left for clockwise ones
        let sign = if self.is_clockwise() { -1.0 } else { 1.0 };

        let mut shifted = Vec::with_capacity(n);
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            let edge = b - a;
            let length = edge.norm();
            if length == 0.0 {
                continue;
            }
            let unit = edge / length;
            let normal = Vector2::new(unit.y, -unit.x) * sign;
            shifted.push((a + normal * distance, b + normal * distance));
        }

        let m = shifted.len();
        let mut vertices = Vec::with_capacity(m);
        for i in 0..m {
            let (p1, p2) = shifted[(i + m - 1) % m];
            let (q1, q2) = shifted[i];
            vertices.push(line_intersection(&p1, &p2, &q1, &q2).unwrap_or(q1));
        }
        Polygon::new(vertices)
    }

    /// O(n²) pairwise edge test over all non-adjacent edges.
    pub fn self_intersects(&self) -> bool {
        let n = self.vertices.len();
        if n < 4 {
            return false;
        }
        for i in 0..n {
            for j in (i + 1)..n {
                // edges sharing a vertex always "intersect" there
                if j == i + 1 || (j + 1) % n == i {
                    continue;
                }
                let (a, b) = (self.vertices[i], self.vertices[(i + 1) % n]);
                let (c, d) = (self.vertices[j], self.vertices[(j + 1) % n]);
                if segments_intersect(&a, &b, &c, &d) {
                    return true;
                }
            }
        }
        false
    }

    /// Index of the edge closest to `point` and the distance to it.
    ///
    /// Edge `i` runs from vertex `i` to vertex `i + 1` (wrapping).
    pub fn closest_edge(&self, point: &Point2<f64>) -> Option<(usize, f64)> {
        let n = self.vertices.len();
        if n < 2 {
            return None;
        }
        let mut best = None;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            let distance = distance_to_segment(point, &a, &b);
            match best {
                Some((_, d)) if d <= distance => {}
                _ => best = Some((i, distance)),
            }
        }
        best
    }

    /// Whether the outlines or interiors of `self` and `other` touch.
    pub fn touches(&self, other: &Polygon) -> bool {
        for (a, b) in self.edges() {
            for (c, d) in other.edges() {
                if segments_intersect(&a, &b, &c, &d) {
                    return true;
                }
            }
        }
        self.contains_polygon(other) || other.contains_polygon(self)
    }

    /// Whether the interiors of `self` and `other` share area, as
    /// opposed to merely touching along edges or at vertices.
    pub fn interior_overlaps(&self, other: &Polygon) -> bool {
        for (a, b) in self.edges() {
            for (c, d) in other.edges() {
                if segments_cross(&a, &b, &c, &d) {
                    return true;
                }
            }
        }
        self.contains_interior_of(other) || other.contains_interior_of(self)
    }

    fn contains_polygon(&self, other: &Polygon) -> bool {
        other.vertices.iter().any(|v| self.contains(v))
    }

    /// Containment test that is robust against vertices lying exactly
    /// on an edge of `self`: each vertex of `other` is nudged a hair
    /// towards the vertex mean before testing.
    fn contains_interior_of(&self, other: &Polygon) -> bool {
        let Some(centroid) = other.vertex_mean() else {
            return false;
        };
        other.vertices.iter().any(|vertex| {
            let sample = vertex + (centroid - vertex) * 1e-6;
            self.contains(&sample)
        })
    }

    fn vertex_mean(&self) -> Option<Point2<f64>> {
        if self.vertices.is_empty() {
            return None;
        }
        let sum = self
            .vertices
            .iter()
            .fold(Vector2::zeros(), |sum, vertex| sum + vertex.coords);
        Some(Point2::from(sum / self.vertices.len() as f64))
    }
}

/// Euclidean distance from `point` to the segment `a`-`b`.
pub fn distance_to_segment(point: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    let ab = b - a;
    let length_squared = ab.norm_squared();
    if length_squared == 0.0 {
        return (point - a).norm();
    }
    let t = ((point - a).dot(&ab) / length_squared).clamp(0.0, 1.0);
    (point - (a + ab * t)).norm()
}

/// Intersection of the infinite lines through `p1`-`p2` and `q1`-`q2`,
/// or `None` when they are (nearly) parallel.
fn line_intersection(
    p1: &Point2<f64>,
    p2: &Point2<f64>,
    q1: &Point2<f64>,
    q2: &Point2<f64>,
) -> Option<Point2<f64>> {
    let r = p2 - p1;
    let s = q2 - q1;
    let denominator = r.x * s.y - r.y * s.x;
    if denominator.abs() <= 1e-9 * r.norm() * s.norm() {
        return None;
    }
    let qp = q1 - p1;
    let t = (qp.x * s.y - qp.y * s.x) / denominator;
    Some(p1 + r * t)
}

fn orientation(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn on_segment(a: &Point2<f64>, b: &Point2<f64>, p: &Point2<f64>) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Inclusive segment intersection: shared endpoints and collinear
/// touches count.
fn segments_intersect(
    a: &Point2<f64>,
    b: &Point2<f64>,
    c: &Point2<f64>,
    d: &Point2<f64>,
) -> bool {
    let d1 = orientation(c, d, a);
    let d2 = orientation(c, d, b);
    let d3 = orientation(a, b, c);
    let d4 = orientation(a, b, d);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(c, d, a))
        || (d2 == 0.0 && on_segment(c, d, b))
        || (d3 == 0.0 && on_segment(a, b, c))
        || (d4 == 0.0 && on_segment(a, b, d))
}

/// Strict segment crossing: the segments pass through each other,
/// endpoint contacts and collinear overlap excluded.
fn segments_cross(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>, d: &Point2<f64>) -> bool {
    let d1 = orientation(c, d, a);
    let d2 = orientation(c, d, b);
    let d3 = orientation(a, b, c);
    let d4 = orientation(a, b, d);

    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}
