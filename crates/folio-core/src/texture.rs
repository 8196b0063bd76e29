//! RGBA8 decoration textures painted from arithmetic and a seeded RNG.

use crate::procgen::{PointField, ProcgenError, SeededRng};
use bytemuck::{Pod, Zeroable};
use glam::Vec2;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const TRANSPARENT: Rgba8 = Rgba8::new(0, 0, 0, 0);
    pub const BLACK: Rgba8 = Rgba8::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// From linear-ish `[0, 1]` channels; out-of-range values are clamped.
    pub fn from_f32(rgba: [f32; 4]) -> Self {
        let q = |v: f32| (crate::ease::clamp01(v) * 255.0 + 0.5) as u8;
        Self::new(q(rgba[0]), q(rgba[1]), q(rgba[2]), q(rgba[3]))
    }

    pub fn to_f32(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    /// Source-over composite of `self` on top of `dst`.
    pub fn over(self, dst: Rgba8) -> Rgba8 {
        let s = self.to_f32();
        let d = dst.to_f32();
        let a = s[3] + d[3] * (1.0 - s[3]);
        if a <= 0.0 {
            return Rgba8::TRANSPARENT;
        }
        let c = |i: usize| (s[i] * s[3] + d[i] * d[3] * (1.0 - s[3])) / a;
        Rgba8::from_f32([c(0), c(1), c(2), a])
    }
}

/// Row-major pixel buffer, top row first.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba8>,
}

impl TextureBuffer {
    pub fn new(width: u32, height: u32) -> Result<Self, ProcgenError> {
        Self::filled(width, height, Rgba8::TRANSPARENT)
    }

    pub fn filled(width: u32, height: u32, color: Rgba8) -> Result<Self, ProcgenError> {
        if width == 0 || height == 0 {
            return Err(ProcgenError::EmptyTexture { width, height });
        }
        Ok(Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Rgba8] {
        &self.pixels
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Rgba8> {
        (x < self.width && y < self.height)
            .then(|| self.pixels[(y * self.width + x) as usize])
    }

    pub fn set(&mut self, x: u32, y: u32, c: Rgba8) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = c;
        }
    }

    /// Composite `c` over the pixel at `(x, y)`.
    pub fn blend(&mut self, x: u32, y: u32, c: Rgba8) {
        if x < self.width && y < self.height {
            let i = (y * self.width + x) as usize;
            self.pixels[i] = c.over(self.pixels[i]);
        }
    }

    /// Composite `top` over this buffer. Both must be the same size.
    pub fn blend_over(&mut self, top: &TextureBuffer) -> Result<(), ProcgenError> {
        if top.width != self.width || top.height != self.height {
            return Err(ProcgenError::SizeMismatch {
                expected: (self.width, self.height),
                actual: (top.width, top.height),
            });
        }
        for (d, s) in self.pixels.iter_mut().zip(&top.pixels) {
            *d = s.over(*d);
        }
        Ok(())
    }

    /// Normalized pixel-center coordinates in `[0, 1]`.
    fn uv(&self, x: u32, y: u32) -> Vec2 {
        Vec2::new(
            (x as f32 + 0.5) / self.width as f32,
            (y as f32 + 0.5) / self.height as f32,
        )
    }

    fn paint(&mut self, mut f: impl FnMut(Vec2) -> Rgba8) {
        for y in 0..self.height {
            for x in 0..self.width {
                let c = f(self.uv(x, y));
                self.pixels[(y * self.width + x) as usize] = c;
            }
        }
    }
}

/// Opaque radial gradient from `inner` at `center` (uv) to `outer` at
/// distance `radius`.
pub fn radial_gradient(
    width: u32,
    height: u32,
    center: Vec2,
    radius: f32,
    inner: [f32; 4],
    outer: [f32; 4],
) -> Result<TextureBuffer, ProcgenError> {
    let mut tex = TextureBuffer::new(width, height)?;
    let r = radius.abs().max(1e-4);
    tex.paint(|uv| {
        let t = crate::ease::clamp01(uv.distance(center) / r);
        let mix = |i: usize| inner[i] + (outer[i] - inner[i]) * t;
        Rgba8::from_f32([mix(0), mix(1), mix(2), mix(3)])
    });
    Ok(tex)
}

/// Black edges fading to transparent in the middle.
pub fn vignette(width: u32, height: u32, strength: f32, softness: f32) -> Result<TextureBuffer, ProcgenError> {
    let mut tex = TextureBuffer::new(width, height)?;
    let soft = softness.abs().max(1e-3);
    tex.paint(|uv| {
        let d = (uv - Vec2::splat(0.5)).length() * std::f32::consts::SQRT_2;
        let a = crate::ease::smoothstep(1.0 - soft, 1.0, d) * crate::ease::clamp01(strength);
        Rgba8::from_f32([0.0, 0.0, 0.0, a])
    });
    Ok(tex)
}

/// Dark horizontal lines every `period` pixels.
pub fn scanlines(width: u32, height: u32, period: u32, alpha: f32) -> Result<TextureBuffer, ProcgenError> {
    let mut tex = TextureBuffer::new(width, height)?;
    let period = period.max(2);
    let line = Rgba8::from_f32([0.0, 0.0, 0.0, alpha]);
    for y in (0..height).filter(|y| y % period == 0) {
        for x in 0..width {
            tex.set(x, y, line);
        }
    }
    Ok(tex)
}

/// Monochrome noise with per-pixel alpha up to `amount`.
pub fn film_grain(width: u32, height: u32, seed: u64, amount: f32) -> Result<TextureBuffer, ProcgenError> {
    let mut tex = TextureBuffer::new(width, height)?;
    let mut rng = SeededRng::new(seed);
    let amount = crate::ease::clamp01(amount);
    tex.paint(|_| {
        let v = rng.next_f32();
        Rgba8::from_f32([v, v, v, amount * rng.next_f32()])
    });
    Ok(tex)
}

/// Scattered single-pixel stars with a few brighter two-pixel ones.
pub fn starfield(width: u32, height: u32, seed: u64, count: usize) -> Result<TextureBuffer, ProcgenError> {
    let mut tex = TextureBuffer::new(width, height)?;
    let mut rng = SeededRng::new(seed);
    for _ in 0..count {
        let x = rng.index(width as usize) as u32;
        let y = rng.index(height as usize) as u32;
        let b = rng.range(0.35, 1.0);
        let tint = rng.range(0.85, 1.0);
        let star = Rgba8::from_f32([b * tint, b * tint, b, b]);
        tex.blend(x, y, star);
        if rng.chance(0.08) {
            tex.blend(x + 1, y, Rgba8::from_f32([b, b, b, b * 0.5]));
        }
    }
    Ok(tex)
}

/// Composed scene backdrop: gradient, stars, grain, vignette.
pub fn backdrop(seed: u64, width: u32, height: u32) -> Result<TextureBuffer, ProcgenError> {
    let mut base = radial_gradient(
        width,
        height,
        Vec2::new(0.5, 0.42),
        0.85,
        [0.11, 0.12, 0.16, 1.0],
        [0.02, 0.02, 0.03, 1.0],
    )?;
    let stars = (width as usize * height as usize) / 900;
    base.blend_over(&starfield(width, height, seed, stars)?)?;
    base.blend_over(&film_grain(width, height, seed.wrapping_add(1), 0.06)?)?;
    base.blend_over(&vignette(width, height, 0.7, 0.45)?)?;
    Ok(base)
}

/// Draw a point field into a buffer: edges as faint lines, points as dots.
pub fn rasterize_point_field(
    field: &PointField,
    width: u32,
    height: u32,
    line: Rgba8,
    dot: Rgba8,
) -> Result<TextureBuffer, ProcgenError> {
    let mut tex = TextureBuffer::new(width, height)?;
    let size = field.bounds.size();
    let to_px = |p: Vec2| {
        let u = (p.x / size.x) + 0.5;
        let v = 0.5 - (p.y / size.y);
        Vec2::new(u * (width - 1) as f32, v * (height - 1) as f32)
    };
    for e in &field.edges {
        let (Some(a), Some(b)) = (
            field.points.get(e.a as usize),
            field.points.get(e.b as usize),
        ) else {
            continue;
        };
        let (pa, pb) = (to_px(*a), to_px(*b));
        let steps = pa.distance(pb).ceil().max(1.0) as u32;
        for s in 0..=steps {
            let p = pa.lerp(pb, s as f32 / steps as f32);
            tex.blend(p.x.round() as u32, p.y.round() as u32, line);
        }
    }
    for p in &field.points {
        let px = to_px(*p);
        tex.blend(px.x.round() as u32, px.y.round() as u32, dot);
    }
    Ok(tex)
}
