//! Phase-driven style of a single composed 2D layer.
//!
//! Each phase names a target [`LayerStyle`] and the curve/duration used to
//! reach it. Changing phase starts a new transition from whatever style is
//! showing at that instant, so interrupted transitions never jump.

use crate::ease::{lerp, progress, Ease};
use glam::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StagePhase {
    Bg,
    Constellation,
    Compress,
    Reveal,
    Live,
}

impl StagePhase {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bg" => Some(StagePhase::Bg),
            "constellation" => Some(StagePhase::Constellation),
            "compress" => Some(StagePhase::Compress),
            "reveal" => Some(StagePhase::Reveal),
            "live" => Some(StagePhase::Live),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StagePhase::Bg => "bg",
            StagePhase::Constellation => "constellation",
            StagePhase::Compress => "compress",
            StagePhase::Reveal => "reveal",
            StagePhase::Live => "live",
        }
    }
}

/// Plain style values the host applies to the layer (CSS opacity,
/// translate in pixels, uniform scale, blur radius in pixels).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerStyle {
    pub opacity: f32,
    pub translate: Vec2,
    pub scale: f32,
    pub blur_px: f32,
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            opacity: 0.0,
            translate: Vec2::ZERO,
            scale: 1.0,
            blur_px: 0.0,
        }
    }
}

impl LayerStyle {
    pub fn lerp(a: &LayerStyle, b: &LayerStyle, t: f32) -> LayerStyle {
        LayerStyle {
            opacity: lerp(a.opacity, b.opacity, t),
            translate: a.translate.lerp(b.translate, t),
            scale: lerp(a.scale, b.scale, t),
            blur_px: lerp(a.blur_px, b.blur_px, t),
        }
    }

    /// Same style with NaNs replaced and opacity/scale/blur kept in range.
    pub fn sanitized(self) -> LayerStyle {
        let or = |v: f32, d: f32| if v.is_finite() { v } else { d };
        LayerStyle {
            opacity: or(self.opacity, 0.0).clamp(0.0, 1.0),
            translate: if self.translate.is_finite() {
                self.translate
            } else {
                Vec2::ZERO
            },
            scale: or(self.scale, 1.0).max(0.0),
            blur_px: or(self.blur_px, 0.0).max(0.0),
        }
    }
}

/// Target and transition for one phase. `collapse` is the share of the
/// collapse offset (collapse target minus layer center) applied as
/// translation; `0.0` ignores the collapse target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StageStep {
    pub opacity: f32,
    pub scale: f32,
    pub blur_px: f32,
    pub collapse: f32,
    pub ease: Ease,
    pub duration_ms: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StageConfig {
    pub bg: StageStep,
    pub constellation: StageStep,
    pub compress: StageStep,
    pub reveal: StageStep,
    pub live: StageStep,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            bg: StageStep {
                opacity: 0.35,
                scale: 1.04,
                blur_px: 6.0,
                collapse: 0.0,
                ease: Ease::OutCubic,
                duration_ms: 900.0,
            },
            constellation: StageStep {
                opacity: 1.0,
                scale: 1.0,
                blur_px: 0.0,
                collapse: 0.0,
                ease: Ease::InOutCubic,
                duration_ms: 1200.0,
            },
            compress: StageStep {
                opacity: 1.0,
                scale: 0.55,
                blur_px: 0.0,
                collapse: 0.5,
                ease: Ease::InCubic,
                duration_ms: 700.0,
            },
            reveal: StageStep {
                opacity: 0.85,
                scale: 0.12,
                blur_px: 1.5,
                collapse: 1.0,
                ease: Ease::OutQuint,
                duration_ms: 650.0,
            },
            live: StageStep {
                opacity: 0.0,
                scale: 0.06,
                blur_px: 4.0,
                collapse: 1.0,
                ease: Ease::OutCubic,
                duration_ms: 500.0,
            },
        }
    }
}

impl StageConfig {
    pub fn step(&self, phase: StagePhase) -> &StageStep {
        match phase {
            StagePhase::Bg => &self.bg,
            StagePhase::Constellation => &self.constellation,
            StagePhase::Compress => &self.compress,
            StagePhase::Reveal => &self.reveal,
            StagePhase::Live => &self.live,
        }
    }
}

#[derive(Clone, Debug)]
pub struct StageAnimator {
    config: StageConfig,
    phase: StagePhase,
    from: LayerStyle,
    started_ms: f64,
    collapse_target: Option<Vec2>,
    layer_size: Vec2,
}

impl StageAnimator {
    pub fn new(config: StageConfig) -> Self {
        Self {
            config,
            phase: StagePhase::Bg,
            from: LayerStyle::default(),
            started_ms: 0.0,
            collapse_target: None,
            layer_size: Vec2::ZERO,
        }
    }

    pub fn phase(&self) -> StagePhase {
        self.phase
    }

    pub fn collapse_target(&self) -> Option<Vec2> {
        self.collapse_target
    }

    /// Start the transition to `phase` from the style showing at `now_ms`.
    /// Re-selecting the current phase does nothing.
    pub fn set_phase(&mut self, phase: StagePhase, now_ms: f64) {
        if phase == self.phase {
            return;
        }
        self.from = self.sample(now_ms);
        self.phase = phase;
        self.started_ms = now_ms;
    }

    /// Collapse point in layer coordinates. Non-finite points clear it.
    pub fn set_collapse_target(&mut self, target: Option<Vec2>) {
        self.collapse_target = target.filter(|p| p.is_finite());
    }

    pub fn set_layer_size(&mut self, size: Vec2) {
        if size.is_finite() && size.x >= 0.0 && size.y >= 0.0 {
            self.layer_size = size;
        }
    }

    /// Resting style of `phase` with the current collapse target.
    pub fn target(&self, phase: StagePhase) -> LayerStyle {
        let step = self.config.step(phase);
        let offset = match self.collapse_target {
            Some(p) => p - self.layer_size * 0.5,
            None => Vec2::ZERO,
        };
        LayerStyle {
            opacity: step.opacity,
            translate: offset * step.collapse,
            scale: step.scale,
            blur_px: step.blur_px,
        }
        .sanitized()
    }

    pub fn sample(&self, now_ms: f64) -> LayerStyle {
        let step = self.config.step(self.phase);
        let elapsed = (now_ms - self.started_ms) as f32;
        let t = step.ease.apply(progress(elapsed, step.duration_ms));
        LayerStyle::lerp(&self.from, &self.target(self.phase), t).sanitized()
    }

    pub fn is_settled(&self, now_ms: f64) -> bool {
        let step = self.config.step(self.phase);
        progress((now_ms - self.started_ms) as f32, step.duration_ms) >= 1.0
    }
}
