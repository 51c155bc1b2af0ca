//! Deterministic tween executor for previews and tests.
//!
//! [`PreviewPlayer`] keeps a clock that only moves when [`PreviewPlayer::advance`]
//! is called, so playback can be sampled frame by frame without a real
//! animation runtime. Tweens are composed in issue order on top of each
//! element's base state, which gives later-issued tweens precedence on shared
//! properties and keeps finished tweens holding their end values.

use std::collections::HashMap;

use crate::animation::{self, AnimationIntent, Phase, PropertySet, TweenExecutor, VisualState};
use crate::{ElementId, GraphicDocument};

/// An issued tween.
#[derive(Debug, Clone)]
struct Track {
    intent: AnimationIntent,
    /// Clock value when the tween was issued.
    issued_at: f32,
    /// Start values captured when the delay elapsed, for tweens without `from`.
    captured: Option<PropertySet>,
}

impl Track {
    fn start_time(&self) -> f32 {
        self.issued_at + self.intent.delay
    }

    fn end_time(&self) -> f32 {
        self.issued_at + self.intent.end_time()
    }

    fn awaits_capture(&self) -> bool {
        self.intent.from.is_none() && self.captured.is_none()
    }

    /// Write this track's contribution at `clock` over `state`.
    fn contribute(&self, clock: f32, state: &mut VisualState) {
        let local = clock - self.start_time();
        let mut start = *state;
        if let Some(from) = &self.intent.from {
            start.apply(from);
        } else if local >= 0.0 {
            match &self.captured {
                Some(captured) => start.apply(captured),
                None => return,
            }
        }
        if local < 0.0 {
            *state = start;
            return;
        }

        let progress = if self.intent.duration <= 0.0 || clock >= self.end_time() {
            1.0
        } else {
            (local / self.intent.duration).min(1.0)
        };
        let t = self.intent.easing.apply(progress);
        // Finished tweens sit exactly on their end values.
        let lerp = |from: f32, to: Option<f32>| {
            to.map_or(from, |to| if t >= 1.0 { to } else { from + (to - from) * t })
        };

        let to = &self.intent.to;
        *state = VisualState {
            x: lerp(start.x, to.x),
            opacity: lerp(start.opacity, to.opacity),
            scale: lerp(start.scale, to.scale),
        };
    }
}

/// In-memory tween executor with an explicit clock.
#[derive(Debug, Clone, Default)]
pub struct PreviewPlayer {
    /// Seconds since the player was created.
    clock: f32,
    /// State each element shows when no tween touches it.
    base: HashMap<ElementId, VisualState>,
    /// Tweens in issue order.
    tracks: Vec<Track>,
}

impl PreviewPlayer {
    /// Create a player for elements with the given resting states.
    #[must_use]
    pub fn new(resting: impl IntoIterator<Item = (ElementId, VisualState)>) -> Self {
        Self {
            clock: 0.0,
            base: resting.into_iter().collect(),
            tracks: Vec::new(),
        }
    }

    /// Create a player for a document, with pre-enter defaults applied.
    #[must_use]
    pub fn for_document(document: &GraphicDocument) -> Self {
        let mut player = Self::new(
            document
                .elements
                .iter()
                .map(|e| (e.id, VisualState::resting(e))),
        );
        animation::prepare(document, &mut player);
        player
    }

    /// Trigger a phase for every animated element of `document`.
    pub fn play(&mut self, document: &GraphicDocument, phase: Phase) {
        animation::play(document, phase, self);
    }

    /// Move the clock forward by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        let target = self.clock + dt.max(0.0);
        // Stop at each pending capture point so "from current" tweens see
        // the state exactly when their delay elapses.
        while let Some(at) = self
            .tracks
            .iter()
            .filter(|t| t.awaits_capture() && t.start_time() <= target)
            .map(Track::start_time)
            .reduce(f32::min)
        {
            self.clock = self.clock.max(at);
            self.capture_due();
        }
        self.clock = target;
    }

    /// Advance until every issued tween has finished.
    pub fn settle(&mut self) {
        let finish = self.finish_time();
        self.advance(finish - self.clock);
        self.clock = self.clock.max(finish);
    }

    /// Current clock in seconds.
    #[must_use]
    pub fn clock(&self) -> f32 {
        self.clock
    }

    /// Clock value at which the last issued tween finishes.
    #[must_use]
    pub fn finish_time(&self) -> f32 {
        self.tracks
            .iter()
            .map(Track::end_time)
            .fold(self.clock, f32::max)
    }

    /// Whether any tween is still interpolating.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.finish_time() > self.clock
    }

    /// Effective state of an element at the current clock.
    #[must_use]
    pub fn state(&self, id: ElementId) -> Option<VisualState> {
        self.base.contains_key(&id).then(|| self.compose(id, self.tracks.len()))
    }

    /// Effective states of every known element.
    #[must_use]
    pub fn states(&self) -> HashMap<ElementId, VisualState> {
        self.base
            .keys()
            .map(|&id| (id, self.compose(id, self.tracks.len())))
            .collect()
    }

    /// State of `id` from its base and the first `upto` tracks.
    fn compose(&self, id: ElementId, upto: usize) -> VisualState {
        let mut state = self.base.get(&id).copied().unwrap_or(VisualState {
            x: 0.0,
            opacity: 1.0,
            scale: 1.0,
        });
        for track in self.tracks[..upto]
            .iter()
            .filter(|t| t.intent.element == id)
        {
            track.contribute(self.clock, &mut state);
        }
        state
    }

    fn capture_due(&mut self) {
        for i in 0..self.tracks.len() {
            let track = &self.tracks[i];
            if track.awaits_capture() && track.start_time() <= self.clock {
                let state = self.compose(track.intent.element, i);
                let captured = state.project(&track.intent.to);
                self.tracks[i].captured = Some(captured);
            }
        }
    }
}

impl TweenExecutor for PreviewPlayer {
    fn set(&mut self, element: ElementId, props: PropertySet) {
        match self.base.get_mut(&element) {
            Some(state) => state.apply(&props),
            None => tracing::trace!("Preview set for unknown element {element}"),
        }
    }

    fn tween(&mut self, intent: AnimationIntent) {
        if !self.base.contains_key(&intent.element) {
            tracing::trace!("Preview tween for unknown element {}", intent.element);
            return;
        }
        self.tracks
            .retain(|t| !(t.intent.element == intent.element && t.intent.phase == intent.phase));
        self.tracks.push(Track {
            intent,
            issued_at: self.clock,
            captured: None,
        });
        self.capture_due();
    }
}
