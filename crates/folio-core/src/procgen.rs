//! Seeded point/line fields.
//!
//! Everything here is a pure function of its parameters: the same seed gives
//! bit-identical output. Hash sets are only used for membership tests, never
//! for iteration order.

use fnv::FnvHashSet;
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smallvec::SmallVec;
use thiserror::Error;

use crate::constants::CONSTELLATION_SEED;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProcgenError {
    #[error("{requested} edges requested but {points} points allow at most {max}")]
    TooManyEdges {
        requested: usize,
        points: usize,
        max: usize,
    },
    #[error("aspect must be finite and positive, got {0}")]
    InvalidAspect(f32),
    #[error("texture size {width}x{height} is empty")]
    EmptyTexture { width: u32, height: u32 },
    #[error("texture size mismatch: expected {expected:?}, got {actual:?}")]
    SizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

/// Deterministic `[0, 1)` float source.
pub struct SeededRng(StdRng);

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        self.0.gen::<f32>()
    }

    #[inline]
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }

    /// Uniform index below `n`; `0` when `n == 0`.
    #[inline]
    pub fn index(&mut self, n: usize) -> usize {
        if n == 0 {
            0
        } else {
            self.0.gen_range(0..n)
        }
    }

    #[inline]
    pub fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }
}

/// Axis-aligned rounded rectangle centered on the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoundedRect {
    pub half: Vec2,
    pub radius: f32,
}

impl RoundedRect {
    /// Height `1.0`, width `aspect`; `corner` is a fraction of the shorter side.
    pub fn with_aspect(aspect: f32, corner: f32) -> Self {
        let half = Vec2::new(aspect * 0.5, 0.5);
        let radius = (corner.clamp(0.0, 0.5) * 2.0 * half.min_element()).min(half.min_element());
        Self { half, radius }
    }

    /// Signed distance to the boundary, negative inside.
    pub fn sdf(&self, p: Vec2) -> f32 {
        let q = p.abs() - self.half + Vec2::splat(self.radius);
        q.max(Vec2::ZERO).length() + q.x.max(q.y).min(0.0) - self.radius
    }

    pub fn contains(&self, p: Vec2) -> bool {
        self.sdf(p) <= 0.0
    }

    pub fn size(&self) -> Vec2 {
        self.half * 2.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstellationParams {
    pub seed: u64,
    pub points: usize,
    pub edges: usize,
    /// Width over height of the bounding rounded rect.
    pub aspect: f32,
    pub corner_radius: f32,
    /// Share of points placed in the band along the boundary.
    pub edge_fraction: f32,
    /// Band thickness, in rect-height units.
    pub edge_band: f32,
    /// Longest nearest-neighbour link.
    pub max_link: f32,
}

impl Default for ConstellationParams {
    fn default() -> Self {
        Self {
            seed: CONSTELLATION_SEED,
            points: 1220,
            edges: 814,
            aspect: 0.5,
            corner_radius: 0.18,
            edge_fraction: 0.35,
            edge_band: 0.06,
            max_link: 0.09,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub a: u32,
    pub b: u32,
    pub length: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PointField {
    pub bounds: RoundedRect,
    pub points: Vec<Vec2>,
    /// Sorted shortest first; `a < b` and no duplicates.
    pub edges: Vec<Edge>,
}

const SCATTER_TRIES: usize = 48;
const TOP_UP_TRIES_PER_EDGE: usize = 24;

fn scatter_edge(rng: &mut SeededRng, rect: &RoundedRect, band: f32) -> Vec2 {
    for _ in 0..SCATTER_TRIES {
        let p = Vec2::new(
            rng.range(-rect.half.x, rect.half.x),
            rng.range(-rect.half.y, rect.half.y),
        );
        let d = rect.sdf(p);
        if d <= 0.0 && d >= -band {
            return p;
        }
    }
    // Straight side segment, always inside the band.
    let side = if rng.chance(0.5) { 1.0 } else { -1.0 };
    let y_span = (rect.half.y - rect.radius).max(0.0);
    Vec2::new(
        side * (rect.half.x - band * 0.5).max(0.0),
        rng.range(-y_span, y_span),
    )
}

fn scatter_interior(rng: &mut SeededRng, rect: &RoundedRect, band: f32) -> Vec2 {
    for _ in 0..SCATTER_TRIES {
        // Average of two uniforms: denser toward the middle.
        let u = (rng.next_f32() + rng.next_f32()) - 1.0;
        let v = (rng.next_f32() + rng.next_f32()) - 1.0;
        let p = Vec2::new(u * rect.half.x, v * rect.half.y);
        if rect.sdf(p) <= -band * 0.5 {
            return p;
        }
    }
    Vec2::new(
        rng.range(-0.5, 0.5) * rect.half.x,
        rng.range(-0.5, 0.5) * rect.half.y,
    )
}

fn key(a: usize, b: usize) -> (u32, u32) {
    if a < b {
        (a as u32, b as u32)
    } else {
        (b as u32, a as u32)
    }
}

struct EdgeSet<'a> {
    points: &'a [Vec2],
    seen: FnvHashSet<(u32, u32)>,
    edges: Vec<Edge>,
}

impl EdgeSet<'_> {
    fn insert(&mut self, a: usize, b: usize) -> bool {
        if a == b {
            return false;
        }
        let k = key(a, b);
        if !self.seen.insert(k) {
            return false;
        }
        self.edges.push(Edge {
            a: k.0,
            b: k.1,
            length: self.points[a].distance(self.points[b]),
        });
        true
    }
}

/// Scatter points in a rounded rect, link near neighbours, then top up and
/// trim so exactly `params.edges` edges remain, shortest first.
pub fn generate_point_field(params: &ConstellationParams) -> Result<PointField, ProcgenError> {
    if !params.aspect.is_finite() || params.aspect <= 0.0 {
        return Err(ProcgenError::InvalidAspect(params.aspect));
    }
    let n = params.points;
    let max_edges = n.saturating_mul(n.saturating_sub(1)) / 2;
    if params.edges > max_edges {
        return Err(ProcgenError::TooManyEdges {
            requested: params.edges,
            points: n,
            max: max_edges,
        });
    }
    let finite_or = |v: f32, d: f32| if v.is_finite() { v } else { d };
    let band = finite_or(params.edge_band, 0.0).max(0.0);
    let max_link = finite_or(params.max_link, 0.0).max(0.0);
    let edge_fraction = finite_or(params.edge_fraction, 0.0).clamp(0.0, 1.0);

    let bounds = RoundedRect::with_aspect(params.aspect, finite_or(params.corner_radius, 0.0));
    let mut rng = SeededRng::new(params.seed);

    let points: Vec<Vec2> = (0..n)
        .map(|_| {
            if rng.chance(edge_fraction) {
                scatter_edge(&mut rng, &bounds, band)
            } else {
                scatter_interior(&mut rng, &bounds, band)
            }
        })
        .collect();

    let mut set = EdgeSet {
        points: &points,
        seen: FnvHashSet::default(),
        edges: Vec::with_capacity(n * 2),
    };

    // Nearest one or two neighbours under the link threshold.
    let max_link_sq = max_link * max_link;
    for i in 0..n {
        let mut near: SmallVec<[(f32, usize); 2]> = SmallVec::new();
        for j in 0..n {
            if i == j {
                continue;
            }
            let d = points[i].distance_squared(points[j]);
            if d > max_link_sq {
                continue;
            }
            if near.len() < 2 {
                near.push((d, j));
                near.sort_by(|x, y| x.0.total_cmp(&y.0));
            } else if d < near[1].0 {
                near[1] = (d, j);
                near.sort_by(|x, y| x.0.total_cmp(&y.0));
            }
        }
        let links = if rng.chance(0.5) { 2 } else { 1 };
        for &(_, j) in near.iter().take(links) {
            set.insert(i, j);
        }
    }

    // Random short links while below target.
    let mut tries = params.edges.saturating_mul(TOP_UP_TRIES_PER_EDGE);
    while set.edges.len() < params.edges && tries > 0 && n > 1 {
        tries -= 1;
        let a = rng.index(n);
        let b = rng.index(n);
        if a != b && points[a].distance(points[b]) <= max_link * 2.0 {
            set.insert(a, b);
        }
    }
    // Deterministic fill so the count is always met.
    'fill: for a in 0..n {
        for b in (a + 1)..n {
            if set.edges.len() >= params.edges {
                break 'fill;
            }
            set.insert(a, b);
        }
    }

    let mut edges = set.edges;
    edges.sort_by(|x, y| {
        x.length
            .total_cmp(&y.length)
            .then(x.a.cmp(&y.a))
            .then(x.b.cmp(&y.b))
    });
    edges.truncate(params.edges);
    log::debug!(
        "[procgen] point field seed={} points={} edges={}",
        params.seed,
        points.len(),
        edges.len()
    );
    Ok(PointField {
        bounds,
        points,
        edges,
    })
}
