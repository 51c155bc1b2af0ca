//! Enter/exit animation timeline.
//!
//! Animation presets are resolved into data: for each element and phase,
//! [`plan`] yields an [`AnimationIntent`] holding start values, end values,
//! timing and easing. Playback is delegated to a [`TweenExecutor`], so the
//! same plans drive the in-app preview and the exported artifact.
//!
//! Property values are relative to the element's resting state: `x` is a
//! horizontal offset in pixels, `scale` multiplies the element's own scale,
//! and `opacity` is absolute.

use serde::{Deserialize, Serialize};

use crate::{AnimationType, Element, ElementId, GraphicDocument};

/// Horizontal travel of the slide presets, in pixels.
pub const SLIDE_DISTANCE: f32 = 100.0;

/// The two playback phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Bring elements from hidden to their resting state.
    Enter,
    /// Take elements from their resting state to hidden.
    Exit,
}

impl Phase {
    /// Lowercase name, used as the artifact trigger name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Exit => "exit",
        }
    }
}

impl std::str::FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enter" | "in" => Ok(Self::Enter),
            "exit" | "out" => Ok(Self::Exit),
            other => Err(format!("unknown phase: {other}")),
        }
    }
}

/// Exit motion implied by an animation tag used as an out-animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExitMotion {
    /// Fade to transparent (`fadeIn` tag).
    FadeOut,
    /// Slide further right while fading (`slideRight` tag).
    SlideOutRight,
    /// Slide further left while fading (`slideLeft` tag).
    SlideOutLeft,
    /// Shrink to nothing while fading (`scaleUp` tag).
    ScaleDown,
}

impl AnimationType {
    /// The exit motion this tag stands for on an out-animation.
    #[must_use]
    pub const fn exit_motion(self) -> Option<ExitMotion> {
        match self {
            Self::None => None,
            Self::FadeIn => Some(ExitMotion::FadeOut),
            Self::SlideRight => Some(ExitMotion::SlideOutRight),
            Self::SlideLeft => Some(ExitMotion::SlideOutLeft),
            Self::ScaleUp => Some(ExitMotion::ScaleDown),
        }
    }
}

/// Easing curve (cubic).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    /// Fast start, slow finish. Used by the enter phase.
    EaseOut,
    /// Slow start, fast finish. Used by the exit phase.
    EaseIn,
}

impl Easing {
    /// Map linear progress `t` in `[0, 1]` to eased progress.
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::EaseOut => 1.0 - (1.0 - t).powi(3),
            Self::EaseIn => t.powi(3),
        }
    }

    /// Easing used for a phase.
    #[must_use]
    pub const fn for_phase(phase: Phase) -> Self {
        match phase {
            Phase::Enter => Self::EaseOut,
            Phase::Exit => Self::EaseIn,
        }
    }
}

/// A set of animated property values; absent keys are left alone.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PropertySet {
    /// Horizontal offset from the resting position, in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    /// Absolute opacity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    /// Uniform scale multiplier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
}

impl PropertySet {
    /// Only opacity.
    #[must_use]
    pub const fn opacity(opacity: f32) -> Self {
        Self {
            x: None,
            opacity: Some(opacity),
            scale: None,
        }
    }

    /// Horizontal offset and opacity.
    #[must_use]
    pub const fn offset(x: f32, opacity: f32) -> Self {
        Self {
            x: Some(x),
            opacity: Some(opacity),
            scale: None,
        }
    }

    /// Scale and opacity.
    #[must_use]
    pub const fn scaled(scale: f32, opacity: f32) -> Self {
        Self {
            x: None,
            opacity: Some(opacity),
            scale: Some(scale),
        }
    }

    /// Every key at its resting value: in place, unscaled, at `opacity`.
    #[must_use]
    pub const fn resting(opacity: f32) -> Self {
        Self {
            x: Some(0.0),
            opacity: Some(opacity),
            scale: Some(1.0),
        }
    }
}

/// Effective animated state of one element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualState {
    /// Horizontal offset from the resting position, in pixels.
    pub x: f32,
    /// Absolute opacity.
    pub opacity: f32,
    /// Uniform scale multiplier.
    pub scale: f32,
}

impl VisualState {
    /// Resting state of an element: in place, at its own opacity, unscaled.
    #[must_use]
    pub fn resting(element: &Element) -> Self {
        Self {
            x: 0.0,
            opacity: element.opacity,
            scale: 1.0,
        }
    }

    /// Overwrite the keys present in `props`.
    pub fn apply(&mut self, props: &PropertySet) {
        if let Some(x) = props.x {
            self.x = x;
        }
        if let Some(opacity) = props.opacity {
            self.opacity = opacity;
        }
        if let Some(scale) = props.scale {
            self.scale = scale;
        }
    }

    /// Current values for the keys present in `keys`.
    #[must_use]
    pub fn project(&self, keys: &PropertySet) -> PropertySet {
        PropertySet {
            x: keys.x.map(|_| self.x),
            opacity: keys.opacity.map(|_| self.opacity),
            scale: keys.scale.map(|_| self.scale),
        }
    }
}

/// Everything a tween executor needs to animate one element in one phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationIntent {
    /// Target element.
    pub element: ElementId,
    /// Phase this intent belongs to.
    pub phase: Phase,
    /// Start values, applied immediately when the tween is issued.
    /// `None` means start from whatever values are current when the delay elapses.
    pub from: Option<PropertySet>,
    /// End values.
    pub to: PropertySet,
    /// Delay before interpolation starts, in seconds.
    pub delay: f32,
    /// Interpolation time, in seconds.
    pub duration: f32,
    /// Easing curve.
    pub easing: Easing,
}

impl AnimationIntent {
    /// Time from issue until the tween reaches its end values.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.delay + self.duration
    }
}

/// Capability that interpolates element properties over time.
///
/// Contract: [`TweenExecutor::tween`] restarts the element's tween for the same
/// phase if one is in flight (no queuing). Tweens of different phases run
/// independently; where they write the same property, the later-issued one wins.
pub trait TweenExecutor {
    /// Jump an element's properties to `props` immediately.
    fn set(&mut self, element: ElementId, props: PropertySet);

    /// Start or restart a tween.
    fn tween(&mut self, intent: AnimationIntent);
}

/// Resolve an element's animation for `phase`, or `None` if it does not animate.
#[must_use]
pub fn plan(element: &Element, phase: Phase) -> Option<AnimationIntent> {
    let (config, from, to) = match phase {
        Phase::Enter => {
            let config = element.in_animation();
            // Enter always lands on the full resting state, whatever an
            // earlier exit left behind.
            let from = match config.kind {
                AnimationType::None => return None,
                AnimationType::FadeIn => PropertySet::opacity(0.0),
                AnimationType::SlideRight => PropertySet::offset(-SLIDE_DISTANCE, 0.0),
                AnimationType::SlideLeft => PropertySet::offset(SLIDE_DISTANCE, 0.0),
                AnimationType::ScaleUp => PropertySet::scaled(0.0, 0.0),
            };
            let to = PropertySet::resting(element.opacity);
            (config, Some(from), to)
        }
        Phase::Exit => {
            let config = element.out_animation();
            let to = match config.kind.exit_motion()? {
                ExitMotion::FadeOut => PropertySet::opacity(0.0),
                ExitMotion::SlideOutRight => PropertySet::offset(SLIDE_DISTANCE, 0.0),
                ExitMotion::SlideOutLeft => PropertySet::offset(-SLIDE_DISTANCE, 0.0),
                ExitMotion::ScaleDown => PropertySet::scaled(0.0, 0.0),
            };
            (config, None, to)
        }
    };

    Some(AnimationIntent {
        element: element.id,
        phase,
        from,
        to,
        delay: config.delay.max(0.0),
        duration: config.duration.max(0.0),
        easing: Easing::for_phase(phase),
    })
}

/// Values an element shows before any enter trigger: hidden if it has an
/// entry animation, otherwise `None` (left at rest).
#[must_use]
pub fn initial_state(element: &Element) -> Option<PropertySet> {
    element
        .in_animation()
        .is_active()
        .then_some(PropertySet::opacity(0.0))
}

/// Plans for every animated element of `document`, in document order.
#[must_use]
pub fn plan_document(document: &GraphicDocument, phase: Phase) -> Vec<AnimationIntent> {
    document
        .elements
        .iter()
        .filter_map(|e| plan(e, phase))
        .collect()
}

/// Apply the pre-enter defaults of every element.
pub fn prepare<E: TweenExecutor + ?Sized>(document: &GraphicDocument, executor: &mut E) {
    for element in &document.elements {
        if let Some(props) = initial_state(element) {
            executor.set(element.id, props);
        }
    }
}

/// Trigger a phase for every animated element. Never mutates the document.
pub fn play<E: TweenExecutor + ?Sized>(document: &GraphicDocument, phase: Phase, executor: &mut E) {
    let intents = plan_document(document, phase);
    tracing::debug!("Playing {} phase for {} element(s)", phase.as_str(), intents.len());
    for intent in intents {
        executor.tween(intent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AnimationConfig;

    fn with_in(kind: AnimationType) -> Element {
        Element::rectangle(0)
            .with_opacity(0.8)
            .with_in_animation(AnimationConfig::new(kind, 1.0, 0.25))
    }

    fn with_out(kind: AnimationType) -> Element {
        Element::rectangle(0).with_out_animation(AnimationConfig::new(kind, 0.5, 0.0))
    }

    #[test]
    fn test_enter_table() {
        let fade = plan(&with_in(AnimationType::FadeIn), Phase::Enter).expect("plan");
        assert_eq!(fade.from, Some(PropertySet::opacity(0.0)));
        assert_eq!(fade.to, PropertySet::resting(0.8));
        assert_eq!(fade.easing, Easing::EaseOut);
        assert!((fade.end_time() - 1.25).abs() < f32::EPSILON);

        let right = plan(&with_in(AnimationType::SlideRight), Phase::Enter).expect("plan");
        assert_eq!(right.from, Some(PropertySet::offset(-100.0, 0.0)));
        assert_eq!(right.to, PropertySet::resting(0.8));

        let left = plan(&with_in(AnimationType::SlideLeft), Phase::Enter).expect("plan");
        assert_eq!(left.from, Some(PropertySet::offset(100.0, 0.0)));

        let scale = plan(&with_in(AnimationType::ScaleUp), Phase::Enter).expect("plan");
        assert_eq!(scale.from, Some(PropertySet::scaled(0.0, 0.0)));
        assert_eq!(scale.to, PropertySet::resting(0.8));

        assert!(plan(&with_in(AnimationType::None), Phase::Enter).is_none());
    }

    #[test]
    fn test_exit_table() {
        let fade = plan(&with_out(AnimationType::FadeIn), Phase::Exit).expect("plan");
        assert!(fade.from.is_none());
        assert_eq!(fade.to, PropertySet::opacity(0.0));
        assert_eq!(fade.easing, Easing::EaseIn);

        let right = plan(&with_out(AnimationType::SlideRight), Phase::Exit).expect("plan");
        assert_eq!(right.to, PropertySet::offset(100.0, 0.0));

        let left = plan(&with_out(AnimationType::SlideLeft), Phase::Exit).expect("plan");
        assert_eq!(left.to, PropertySet::offset(-100.0, 0.0));

        let scale = plan(&with_out(AnimationType::ScaleUp), Phase::Exit).expect("plan");
        assert_eq!(scale.to, PropertySet::scaled(0.0, 0.0));

        assert!(plan(&with_out(AnimationType::None), Phase::Exit).is_none());
    }

    #[test]
    fn test_phases_use_their_own_config() {
        let el = with_in(AnimationType::FadeIn);
        assert!(plan(&el, Phase::Exit).is_none());
        let el = with_out(AnimationType::FadeIn);
        assert!(plan(&el, Phase::Enter).is_none());
    }

    #[test]
    fn test_initial_state_hides_entering_elements() {
        assert_eq!(
            initial_state(&with_in(AnimationType::SlideLeft)),
            Some(PropertySet::opacity(0.0))
        );
        assert_eq!(initial_state(&Element::rectangle(0)), None);
    }

    #[test]
    fn test_easing_endpoints() {
        for easing in [Easing::EaseIn, Easing::EaseOut] {
            assert!(easing.apply(0.0).abs() < f32::EPSILON);
            assert!((easing.apply(1.0) - 1.0).abs() < f32::EPSILON);
            assert!((easing.apply(2.0) - 1.0).abs() < f32::EPSILON);
        }
        assert!(Easing::EaseOut.apply(0.5) > 0.5);
        assert!(Easing::EaseIn.apply(0.5) < 0.5);
    }

    #[test]
    fn test_phase_parse() {
        assert_eq!("enter".parse::<Phase>(), Ok(Phase::Enter));
        assert_eq!("out".parse::<Phase>(), Ok(Phase::Exit));
        assert!("sideways".parse::<Phase>().is_err());
    }

    #[derive(Default)]
    struct Recorder {
        sets: Vec<ElementId>,
        tweens: Vec<AnimationIntent>,
    }

    impl TweenExecutor for Recorder {
        fn set(&mut self, element: ElementId, _props: PropertySet) {
            self.sets.push(element);
        }

        fn tween(&mut self, intent: AnimationIntent) {
            self.tweens.push(intent);
        }
    }

    #[test]
    fn test_play_and_prepare_leave_document_alone() {
        let mut doc = GraphicDocument::default();
        doc.elements.push(with_in(AnimationType::FadeIn));
        doc.elements.push(Element::circle(1));
        doc.elements.push(with_out(AnimationType::ScaleUp));
        let before = doc.clone();

        let mut recorder = Recorder::default();
        prepare(&doc, &mut recorder);
        play(&doc, Phase::Enter, &mut recorder);
        play(&doc, Phase::Exit, &mut recorder);

        assert_eq!(recorder.sets, vec![doc.elements[0].id]);
        assert_eq!(recorder.tweens.len(), 2);
        assert_eq!(recorder.tweens[1].element, doc.elements[2].id);
        assert_eq!(doc, before);
    }
}
