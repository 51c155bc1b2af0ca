//! Standalone artifact export.
//!
//! [`export`] projects a document into an [`Artifact`]: per element, a resting
//! style, the pre-enter initial values and one program per animation phase.
//! The artifact needs nothing from the store to replay. It can drive any
//! [`TweenExecutor`] directly, or be rendered by [`Artifact::to_html`] into a
//! single HTML page whose embedded runtime follows the same tween semantics
//! as [`crate::preview::PreviewPlayer`].

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::animation::{
    self, AnimationIntent, Easing, Phase, PropertySet, TweenExecutor, VisualState,
};
use crate::{CanvasConfig, Element, ElementId, ElementKind, GraphicDocument, OverlayResult};

/// Configuration for artifact rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Page title. Defaults to the document name when `None`.
    pub title: Option<String>,
    /// Render the page background transparent instead of the canvas color.
    pub transparent_background: bool,
    /// Key that triggers the enter phase.
    pub enter_key: char,
    /// Key that triggers the exit phase.
    pub exit_key: char,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            title: None,
            transparent_background: false,
            enter_key: '1',
            exit_key: '2',
        }
    }
}

/// Static style an element rests at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestingStyle {
    /// Left edge in canvas pixels.
    pub left: f32,
    /// Top edge in canvas pixels.
    pub top: f32,
    /// Box width.
    pub width: f32,
    /// Box height.
    pub height: f32,
    /// Rotation in degrees.
    pub rotation: f32,
    /// Horizontal scale.
    pub scale_x: f32,
    /// Vertical scale.
    pub scale_y: f32,
    /// Resting opacity.
    pub opacity: f32,
    /// Stacking order.
    pub z_index: i32,
    /// Whether the element is shown at all.
    pub visible: bool,
}

impl RestingStyle {
    fn of(element: &Element) -> Self {
        let t = &element.transform;
        let (width, height) = match &element.kind {
            ElementKind::Circle { radius, .. } => (radius * 2.0, radius * 2.0),
            _ => (t.width, t.height),
        };
        Self {
            left: t.x,
            top: t.y,
            width,
            height,
            rotation: t.rotation,
            scale_x: t.scale_x,
            scale_y: t.scale_y,
            opacity: element.opacity,
            z_index: element.z_index,
            visible: element.visible,
        }
    }
}

/// One phase of an element's animation, detached from the element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseProgram {
    /// Start values, or `None` to start from the current values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<PropertySet>,
    /// End values.
    pub to: PropertySet,
    /// Delay in seconds.
    pub delay: f32,
    /// Duration in seconds.
    pub duration: f32,
    /// Easing curve.
    pub easing: Easing,
}

impl From<AnimationIntent> for PhaseProgram {
    fn from(intent: AnimationIntent) -> Self {
        Self {
            from: intent.from,
            to: intent.to,
            delay: intent.delay,
            duration: intent.duration,
            easing: intent.easing,
        }
    }
}

impl PhaseProgram {
    /// Rebuild the intent for `element` in `phase`.
    #[must_use]
    pub fn intent(&self, element: ElementId, phase: Phase) -> AnimationIntent {
        AnimationIntent {
            element,
            phase,
            from: self.from,
            to: self.to,
            delay: self.delay,
            duration: self.duration,
            easing: self.easing,
        }
    }
}

/// An exported element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactElement {
    /// Stable identity, copied from the document.
    pub id: ElementId,
    /// Display name.
    pub name: String,
    /// Resting style.
    pub style: RestingStyle,
    /// What to draw.
    pub content: ElementKind,
    /// Values shown before the first enter trigger.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<PropertySet>,
    /// Enter program.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enter: Option<PhaseProgram>,
    /// Exit program.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit: Option<PhaseProgram>,
}

impl ArtifactElement {
    /// Program for a phase, if the element animates in it.
    #[must_use]
    pub fn program(&self, phase: Phase) -> Option<&PhaseProgram> {
        match phase {
            Phase::Enter => self.enter.as_ref(),
            Phase::Exit => self.exit.as_ref(),
        }
    }
}

/// Self-contained replayable representation of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    /// Document name.
    pub name: String,
    /// Canvas size and background.
    pub canvas: CanvasConfig,
    /// Elements in paint order.
    pub elements: Vec<ArtifactElement>,
}

/// Project a document into an artifact.
#[must_use]
pub fn export(document: &GraphicDocument) -> Artifact {
    let elements = document
        .paint_order()
        .into_iter()
        .map(|element| ArtifactElement {
            id: element.id,
            name: element.name.clone(),
            style: RestingStyle::of(element),
            content: element.kind.clone(),
            initial: animation::initial_state(element),
            enter: animation::plan(element, Phase::Enter).map(PhaseProgram::from),
            exit: animation::plan(element, Phase::Exit).map(PhaseProgram::from),
        })
        .collect();

    Artifact {
        name: document.name.clone(),
        canvas: document.canvas.clone(),
        elements,
    }
}

impl Artifact {
    /// Resting state of every element, for seeding an executor.
    pub fn resting_states(&self) -> impl Iterator<Item = (ElementId, VisualState)> + '_ {
        self.elements.iter().map(|e| {
            (
                e.id,
                VisualState {
                    x: 0.0,
                    opacity: e.style.opacity,
                    scale: 1.0,
                },
            )
        })
    }

    /// Apply the pre-enter initial values.
    pub fn prepare<E: TweenExecutor + ?Sized>(&self, executor: &mut E) {
        for element in &self.elements {
            if let Some(initial) = element.initial {
                executor.set(element.id, initial);
            }
        }
    }

    /// Fire a phase trigger.
    pub fn trigger<E: TweenExecutor + ?Sized>(&self, phase: Phase, executor: &mut E) {
        for element in &self.elements {
            if let Some(program) = element.program(phase) {
                executor.tween(program.intent(element.id, phase));
            }
        }
    }

    /// Serialize to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> OverlayResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Render a standalone HTML page that plays this artifact.
    ///
    /// # Errors
    ///
    /// Returns an error if the timeline cannot be serialized.
    pub fn to_html(&self, config: &ExportConfig) -> OverlayResult<String> {
        let title = config.title.as_deref().unwrap_or(&self.name);
        let background = if config.transparent_background {
            "transparent"
        } else {
            self.canvas.background_color.as_str()
        };

        let mut html = String::with_capacity(8192);
        writeln!(html, "<!DOCTYPE html>")?;
        writeln!(html, "<html lang=\"en\">")?;
        writeln!(html, "<head>")?;
        writeln!(html, "<meta charset=\"UTF-8\">")?;
        writeln!(html, "<title>{}</title>", escape_html(title))?;
        writeln!(html, "<style>")?;
        writeln!(
            html,
            "html, body {{ margin: 0; padding: 0; overflow: hidden; background: {}; }}",
            escape_html(background)
        )?;
        writeln!(
            html,
            "#stage {{ position: relative; width: {}px; height: {}px; }}",
            self.canvas.width, self.canvas.height
        )?;
        writeln!(
            html,
            ".element {{ position: absolute; box-sizing: border-box; transform-origin: 0 0; }}"
        )?;
        writeln!(html, "</style>")?;
        writeln!(html, "</head>")?;
        writeln!(html, "<body>")?;
        writeln!(html, "<div id=\"stage\">")?;
        for element in &self.elements {
            render_element_html(&mut html, element)?;
        }
        writeln!(html, "</div>")?;

        let timeline = EmbeddedTimeline {
            keys: TriggerKeys {
                enter: config.enter_key,
                exit: config.exit_key,
            },
            elements: &self.elements,
        };
        let json = serde_json::to_string(&timeline)?.replace('<', "\\u003c");
        writeln!(
            html,
            "<script type=\"application/json\" id=\"overlay-timeline\">{json}</script>"
        )?;
        writeln!(html, "<script>{RUNTIME_JS}</script>")?;
        writeln!(html, "</body>")?;
        writeln!(html, "</html>")?;
        Ok(html)
    }
}

/// Exports documents with a fixed rendering configuration.
#[derive(Debug, Clone, Default)]
pub struct ArtifactExporter {
    config: ExportConfig,
}

impl ArtifactExporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Rendering configuration.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export a document to a standalone HTML page.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be rendered.
    pub fn export_html(&self, document: &GraphicDocument) -> OverlayResult<String> {
        let artifact = export(document);
        let html = artifact.to_html(&self.config)?;
        tracing::info!(
            "Exported '{}' with {} element(s) ({} bytes)",
            artifact.name,
            artifact.elements.len(),
            html.len()
        );
        Ok(html)
    }
}

#[derive(Serialize)]
struct TriggerKeys {
    enter: char,
    exit: char,
}

#[derive(Serialize)]
struct EmbeddedTimeline<'a> {
    keys: TriggerKeys,
    elements: &'a [ArtifactElement],
}

fn render_element_html(html: &mut String, element: &ArtifactElement) -> std::fmt::Result {
    let s = &element.style;
    let opacity = element
        .initial
        .and_then(|initial| initial.opacity)
        .unwrap_or(s.opacity);

    let mut style = format!(
        "left:{}px;top:{}px;width:{}px;height:{}px;z-index:{};opacity:{};transform:rotate({}deg) scale({},{});",
        s.left, s.top, s.width, s.height, s.z_index, opacity, s.rotation, s.scale_x, s.scale_y
    );
    if !s.visible {
        style.push_str("visibility:hidden;");
    }

    let content = match &element.content {
        ElementKind::Text {
            text,
            font_size,
            font_family,
            font_style,
            fill,
            align,
        } => {
            write!(
                style,
                "color:{fill};font-size:{font_size}px;font-family:{font_family};text-align:{};white-space:pre-wrap;{}",
                align.as_str(),
                font_style.css()
            )?;
            escape_html(text)
        }
        ElementKind::Rectangle {
            fill,
            stroke,
            stroke_width,
            corner_radius,
        } => {
            write!(
                style,
                "background:{fill};border:{stroke_width}px solid {stroke};border-radius:{corner_radius}px;"
            )?;
            String::new()
        }
        ElementKind::Circle {
            fill,
            stroke,
            stroke_width,
            ..
        } => {
            write!(
                style,
                "background:{fill};border:{stroke_width}px solid {stroke};border-radius:50%;"
            )?;
            String::new()
        }
        ElementKind::Image { src } => format!(
            "<img src=\"{}\" alt=\"\" style=\"display:block;width:100%;height:100%;\">",
            escape_html(src)
        ),
    };

    writeln!(
        html,
        "<div class=\"element\" id=\"el-{}\" style=\"{}\">{content}</div>",
        element.id,
        escape_html(&style)
    )
}

/// Escape special HTML characters.
fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Playback runtime embedded in exported pages.
///
/// Tweens compose in issue order over each element's base values; retriggering
/// a phase replaces that phase's tween. Tweens without start values sample the
/// composed state at the instant their delay elapsed, even when the frame that
/// notices it lands later. Rendering itself only happens once per frame.
const RUNTIME_JS: &str = r"
(function () {
  'use strict';
  var timeline = JSON.parse(document.getElementById('overlay-timeline').textContent);
  var KEYS = ['x', 'opacity', 'scale'];
  var nodes = {}, styles = {}, base = {}, tracks = [];
  var clock = 0, last = null;

  function assign(state, props) {
    KEYS.forEach(function (k) { if (props[k] !== undefined && props[k] !== null) state[k] = props[k]; });
  }
  function copy(state) { return { x: state.x, opacity: state.opacity, scale: state.scale }; }
  function ease(kind, t) {
    t = Math.min(Math.max(t, 0), 1);
    return kind === 'easeIn' ? t * t * t : 1 - Math.pow(1 - t, 3);
  }

  timeline.elements.forEach(function (el) {
    nodes[el.id] = document.getElementById('el-' + el.id);
    styles[el.id] = el.style;
    base[el.id] = { x: 0, opacity: el.style.opacity, scale: 1 };
    if (el.initial) assign(base[el.id], el.initial);
  });

  function contribute(track, state, at) {
    var p = track.program, local = at - track.start;
    var start = copy(state);
    if (p.from) {
      assign(start, p.from);
    } else if (local >= 0) {
      if (!track.captured) return;
      assign(start, track.captured);
    }
    if (local < 0) { assign(state, start); return; }
    var done = p.duration <= 0 || local >= p.duration;
    var t = done ? 1 : ease(p.easing, local / p.duration);
    KEYS.forEach(function (k) {
      var to = p.to[k];
      if (to === undefined || to === null) state[k] = start[k];
      else state[k] = done ? to : start[k] + (to - start[k]) * t;
    });
  }

  function compose(id, upto, at) {
    var state = copy(base[id]);
    for (var i = 0; i < upto; i++) {
      if (tracks[i].id === id) contribute(tracks[i], state, at);
    }
    return state;
  }

  function captureDue() {
    var due = [];
    tracks.forEach(function (track, i) {
      if (!track.program.from && !track.captured && track.start <= clock) due.push(i);
    });
    due.sort(function (a, b) { return tracks[a].start - tracks[b].start; });
    due.forEach(function (i) {
      var track = tracks[i], captured = {};
      var state = compose(track.id, i, track.start);
      KEYS.forEach(function (k) { if (track.program.to[k] !== undefined) captured[k] = state[k]; });
      track.captured = captured;
    });
  }

  function trigger(phase) {
    timeline.elements.forEach(function (el) {
      var program = el[phase];
      if (!program) return;
      tracks = tracks.filter(function (t) { return !(t.id === el.id && t.phase === phase); });
      tracks.push({ id: el.id, phase: phase, program: program, start: clock + program.delay, captured: null });
    });
    captureDue();
  }

  function render() {
    Object.keys(nodes).forEach(function (id) {
      var node = nodes[id], s = styles[id];
      if (!node) return;
      var state = compose(id, tracks.length, clock);
      node.style.opacity = state.opacity;
      node.style.transform = 'translateX(' + state.x + 'px) rotate(' + s.rotation + 'deg) scale(' +
        (s.scaleX * state.scale) + ',' + (s.scaleY * state.scale) + ')';
    });
  }

  function frame(ts) {
    if (last !== null) clock += (ts - last) / 1000;
    last = ts;
    captureDue();
    render();
    window.requestAnimationFrame(frame);
  }

  window.addEventListener('keydown', function (e) {
    if (e.key === timeline.keys.enter) trigger('enter');
    if (e.key === timeline.keys.exit) trigger('exit');
  });
  window.overlay = {
    enter: function () { trigger('enter'); },
    exit: function () { trigger('exit'); }
  };
  render();
  window.requestAnimationFrame(frame);
})();
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::PreviewPlayer;
    use crate::{AnimationConfig, AnimationType, FontStyle};

    fn sample_document() -> GraphicDocument {
        let mut doc = GraphicDocument::default();
        doc.elements.push(
            Element::text(2)
                .with_in_animation(AnimationConfig::new(AnimationType::SlideRight, 0.8, 0.2))
                .with_out_animation(AnimationConfig::new(AnimationType::FadeIn, 0.5, 0.0)),
        );
        doc.elements.push(
            Element::rectangle(0)
                .with_opacity(0.6)
                .with_in_animation(AnimationConfig::new(AnimationType::ScaleUp, 1.0, 0.0)),
        );
        doc.elements.push(
            Element::circle(1)
                .with_out_animation(AnimationConfig::new(AnimationType::SlideLeft, 0.4, 0.3)),
        );
        doc
    }

    #[test]
    fn test_export_uses_paint_order_and_keeps_ids() {
        let doc = sample_document();
        let artifact = export(&doc);
        let ids: Vec<_> = artifact.elements.iter().map(|e| e.id).collect();
        assert_eq!(
            ids,
            vec![doc.elements[1].id, doc.elements[2].id, doc.elements[0].id]
        );
        assert_eq!(artifact.canvas, doc.canvas);
    }

    #[test]
    fn test_programs_follow_declared_animations() {
        let artifact = export(&sample_document());
        let rect = &artifact.elements[0];
        assert_eq!(rect.initial, Some(PropertySet::opacity(0.0)));
        assert!(rect.enter.is_some());
        assert!(rect.exit.is_none());

        let circle = &artifact.elements[1];
        assert_eq!(circle.initial, None);
        assert!(circle.enter.is_none());
        let exit = circle.exit.as_ref().expect("exit program");
        assert!(exit.from.is_none());
        assert_eq!(exit.to, PropertySet::offset(-100.0, 0.0));
        assert!((circle.style.width - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_replay_matches_preview() {
        let doc = sample_document();
        let artifact = export(&doc);

        let mut direct = PreviewPlayer::for_document(&doc);
        let mut replay = PreviewPlayer::new(artifact.resting_states());
        artifact.prepare(&mut replay);
        assert_eq!(direct.states(), replay.states());

        for phase in [Phase::Enter, Phase::Exit] {
            direct.play(&doc, phase);
            artifact.trigger(phase, &mut replay);
            for _ in 0..10 {
                direct.advance(0.15);
                replay.advance(0.15);
                assert_eq!(direct.states(), replay.states());
            }
            direct.settle();
            replay.settle();
            assert_eq!(direct.states(), replay.states());
        }
    }

    #[test]
    fn test_html_contains_elements_and_triggers() {
        let doc = sample_document();
        let html = export(&doc)
            .to_html(&ExportConfig::default())
            .expect("render");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Untitled Graphic</title>"));
        assert!(html.contains("Double click to edit"));
        assert!(html.contains(&format!("id=\"el-{}\"", doc.elements[0].id)));
        assert!(html.contains("\"keys\":{\"enter\":\"1\",\"exit\":\"2\"}"));
        assert!(html.contains("requestAnimationFrame"));
        assert!(html.contains("background: #000000"));
    }

    #[test]
    fn test_html_hides_entering_elements_initially() {
        let mut doc = GraphicDocument::default();
        let el = Element::rectangle(0)
            .with_in_animation(AnimationConfig::new(AnimationType::FadeIn, 1.0, 0.0));
        doc.elements.push(el);
        doc.elements.push(Element::circle(1).with_opacity(0.5));
        let html = export(&doc)
            .to_html(&ExportConfig::default())
            .expect("render");
        assert!(html.contains("z-index:0;opacity:0;"));
        assert!(html.contains("z-index:1;opacity:0.5;"));
    }

    #[test]
    fn test_runtime_samples_exit_start_at_delay_end() {
        let html = export(&sample_document())
            .to_html(&ExportConfig::default())
            .expect("render");
        // Capture composes at the track's own start time, earliest first.
        assert!(html.contains("var state = compose(track.id, i, track.start);"));
        assert!(html.contains("return tracks[a].start - tracks[b].start;"));
        assert!(html.contains("var state = compose(id, tracks.length, clock);"));
        assert!(!html.contains("compose(track.id, i)"));
    }

    #[test]
    fn test_html_renders_font_style() {
        let mut doc = GraphicDocument::default();
        let mut bold = Element::text(0);
        let mut italic = Element::text(1);
        if let ElementKind::Text { font_style, .. } = &mut bold.kind {
            *font_style = FontStyle::Bold;
        }
        if let ElementKind::Text { font_style, .. } = &mut italic.kind {
            *font_style = FontStyle::Italic;
        }
        doc.elements.push(bold);
        doc.elements.push(italic);
        doc.elements.push(Element::text(2));

        let html = export(&doc)
            .to_html(&ExportConfig::default())
            .expect("render");
        assert_eq!(html.matches("white-space:pre-wrap;font-weight:bold;").count(), 1);
        assert_eq!(html.matches("white-space:pre-wrap;font-style:italic;").count(), 1);
        assert_eq!(html.matches("white-space:pre-wrap;").count(), 3);
    }

    #[test]
    fn test_html_escapes_user_text() {
        let mut doc = GraphicDocument::default();
        doc.name = "A & B".to_string();
        let mut el = Element::text(0);
        if let ElementKind::Text { text, .. } = &mut el.kind {
            *text = "<script>alert('x')</script>".to_string();
        }
        doc.elements.push(el);

        let html = export(&doc)
            .to_html(&ExportConfig::default())
            .expect("render");
        assert!(html.contains("<title>A &amp; B</title>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(!html.contains("<script>alert"));
        assert!(!html.contains("</script>alert"));
    }

    #[test]
    fn test_config_overrides() {
        let doc = sample_document();
        let config = ExportConfig {
            title: Some("Lower third".to_string()),
            transparent_background: true,
            enter_key: 'i',
            exit_key: 'o',
        };
        let html = ArtifactExporter::new(config)
            .export_html(&doc)
            .expect("render");
        assert!(html.contains("<title>Lower third</title>"));
        assert!(html.contains("background: transparent"));
        assert!(html.contains("\"keys\":{\"enter\":\"i\",\"exit\":\"o\"}"));
    }

    #[test]
    fn test_artifact_json_round_trip() {
        let artifact = export(&sample_document());
        let json = artifact.to_json().expect("json");
        let back: Artifact = serde_json::from_str(&json).expect("parse");
        assert_eq!(back, artifact);
    }
}
