//! The intro: a fixed run of labelled phases that plays once.
//!
//! Every phase fades its label in, holds it, and fades it out before the
//! next label takes over.  After the last fade-out the completion callback
//! fires, exactly once.  Tearing the intro down first (explicitly or through
//! its section's liveness) drops the callback unfired.  Time left over at
//! the end of a stage rolls into the next one, so a long frame never drops a
//! phase.

use super::easing::Easing;
use super::error::EngineError;
use super::scope::Liveness;
use super::surface::{ElementId, Write, WriteBatch};
use super::timeline::{Tween, TweenStep};

#[derive(Debug, Clone, PartialEq)]
pub struct IntroPhase {
    pub label: String,
    pub fade_in: f64,
    pub hold: f64,
    pub fade_out: f64,
}

impl IntroPhase {
    pub fn new(label: impl Into<String>, fade_in: f64, hold: f64, fade_out: f64) -> Self {
        Self {
            label: label.into(),
            fade_in,
            hold,
            fade_out,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    FadeIn,
    Hold,
    FadeOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntroStatus {
    Playing,
    Complete,
    TornDown,
}

pub struct IntroSequencer {
    phases: Vec<IntroPhase>,
    label_element: ElementId,
    index: usize,
    stage: Stage,
    fade: Tween,
    hold_left: f64,
    status: IntroStatus,
    on_complete: Option<Box<dyn FnOnce()>>,
    liveness: Liveness,
}

impl std::fmt::Debug for IntroSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntroSequencer")
            .field("index", &self.index)
            .field("stage", &self.stage)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl IntroSequencer {
    pub fn new(
        phases: Vec<IntroPhase>,
        label_element: ElementId,
        liveness: Liveness,
        on_complete: impl FnOnce() + 'static,
    ) -> Result<Self, EngineError> {
        if phases.is_empty() {
            return Err(EngineError::InvalidTimeline("no phases".into()));
        }
        for (i, p) in phases.iter().enumerate() {
            let durations = [p.fade_in, p.hold, p.fade_out];
            if durations.iter().any(|d| !d.is_finite() || *d < 0.0) {
                return Err(EngineError::InvalidTimeline(format!(
                    "phase {i} ({:?}) has a negative or non-finite duration",
                    p.label
                )));
            }
        }
        let fade = Tween::new(0.0, 1.0, phases[0].fade_in, Easing::Power2Out);
        Ok(Self {
            phases,
            label_element,
            index: 0,
            stage: Stage::FadeIn,
            fade,
            hold_left: 0.0,
            status: IntroStatus::Playing,
            on_complete: Some(Box::new(on_complete)),
            liveness,
        })
    }

    pub fn status(&self) -> IntroStatus {
        self.status
    }

    pub fn is_playing(&self) -> bool {
        self.status == IntroStatus::Playing
    }

    /// Label currently on screen, `None` once the intro is over.
    pub fn current_label(&self) -> Option<&str> {
        if !self.is_playing() {
            return None;
        }
        self.phases.get(self.index).map(|p| p.label.as_str())
    }

    pub fn current_phase(&self) -> Option<usize> {
        self.is_playing().then_some(self.index)
    }

    pub fn opacity(&self) -> f64 {
        match (self.status, self.stage) {
            (IntroStatus::Playing, Stage::Hold) => 1.0,
            (IntroStatus::Playing, _) => self.fade.value(),
            _ => 0.0,
        }
    }

    /// Stop for good.  Pending fades are cancelled and the completion
    /// callback is dropped without running.
    pub fn teardown(&mut self) {
        if self.status == IntroStatus::Playing {
            tracing::debug!(phase = self.index, "intro torn down before completion");
        }
        self.fade.cancel();
        self.on_complete = None;
        if self.status != IntroStatus::Complete {
            self.status = IntroStatus::TornDown;
        }
    }

    pub fn tick(&mut self, dt: f64, batch: &mut WriteBatch) {
        if !self.liveness.is_alive() {
            self.teardown();
            return;
        }
        let mut budget = dt.max(0.0);
        while self.status == IntroStatus::Playing {
            match self.stage {
                Stage::FadeIn | Stage::FadeOut => {
                    let (step, leftover) = self.fade.advance(budget);
                    if !matches!(step, TweenStep::Completed(_)) {
                        break;
                    }
                    budget = leftover;
                    self.next_stage();
                }
                Stage::Hold => {
                    if budget < self.hold_left {
                        self.hold_left -= budget;
                        break;
                    }
                    budget -= self.hold_left;
                    self.next_stage();
                }
            }
        }
        batch.push(self.label_element, Write::Opacity(self.opacity()));
    }

    fn next_stage(&mut self) {
        let phase = &self.phases[self.index];
        match self.stage {
            Stage::FadeIn => {
                self.stage = Stage::Hold;
                self.hold_left = phase.hold;
            }
            Stage::Hold => {
                self.stage = Stage::FadeOut;
                self.fade = Tween::new(1.0, 0.0, phase.fade_out, Easing::Power2In);
            }
            Stage::FadeOut => {
                self.index += 1;
                match self.phases.get(self.index) {
                    Some(next) => {
                        tracing::debug!(phase = self.index, label = %next.label, "intro phase");
                        self.stage = Stage::FadeIn;
                        self.fade = Tween::new(0.0, 1.0, next.fade_in, Easing::Power2Out);
                    }
                    None => {
                        self.status = IntroStatus::Complete;
                        tracing::debug!("intro complete");
                        if let Some(done) = self.on_complete.take() {
                            done();
                        }
                    }
                }
            }
        }
    }
}
