//! Graphic elements - the building blocks of an overlay.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{OverlayError, OverlayResult};

/// Unique identifier for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an element ID from its string form.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::InvalidElementId`] if `s` is not a UUID.
    pub fn parse(s: &str) -> OverlayResult<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| OverlayError::InvalidElementId(format!("{s}: {e}")))
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Element type discriminant, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// Text label.
    Text,
    /// Rectangle, optionally rounded.
    Rectangle,
    /// Circle.
    Circle,
    /// Bitmap or vector image.
    Image,
}

/// Font style of a text element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    /// Upright, regular weight.
    #[default]
    Normal,
    /// Italic.
    Italic,
    /// Bold.
    Bold,
}

impl FontStyle {
    /// CSS declaration for this style, empty for `Normal`.
    #[must_use]
    pub const fn css(self) -> &'static str {
        match self {
            Self::Normal => "",
            Self::Italic => "font-style:italic;",
            Self::Bold => "font-weight:bold;",
        }
    }
}

/// Horizontal alignment of a text element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Left aligned.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Right aligned.
    Right,
}

impl TextAlign {
    /// CSS keyword for this alignment.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Variant-specific content of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    /// A text label.
    #[serde(rename_all = "camelCase")]
    Text {
        /// Text content.
        text: String,
        /// Font size in pixels.
        font_size: f32,
        /// Font family name.
        font_family: String,
        /// Font style.
        font_style: FontStyle,
        /// Text color as hex.
        fill: String,
        /// Horizontal alignment.
        align: TextAlign,
    },

    /// A filled rectangle.
    #[serde(rename_all = "camelCase")]
    Rectangle {
        /// Fill color as hex.
        fill: String,
        /// Stroke color as hex.
        stroke: String,
        /// Stroke width in pixels.
        stroke_width: f32,
        /// Corner radius in pixels.
        corner_radius: f32,
    },

    /// A filled circle. The element's `x`/`y` is the top-left of its bounding box.
    #[serde(rename_all = "camelCase")]
    Circle {
        /// Radius in pixels.
        radius: f32,
        /// Fill color as hex.
        fill: String,
        /// Stroke color as hex.
        stroke: String,
        /// Stroke width in pixels.
        stroke_width: f32,
    },

    /// An image.
    Image {
        /// Image source URI or data URL.
        src: String,
    },
}

impl ElementKind {
    /// The payload-free discriminant.
    #[must_use]
    pub const fn element_type(&self) -> ElementType {
        match self {
            Self::Text { .. } => ElementType::Text,
            Self::Rectangle { .. } => ElementType::Rectangle,
            Self::Circle { .. } => ElementType::Circle,
            Self::Image { .. } => ElementType::Image,
        }
    }
}

/// Position, size, rotation and scale of an element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    /// X position (pixels from left).
    pub x: f32,
    /// Y position (pixels from top).
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Rotation in degrees.
    pub rotation: f32,
    /// Horizontal scale factor.
    pub scale_x: f32,
    /// Vertical scale factor.
    pub scale_y: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

impl Transform {
    /// Transform at the given position and size, unrotated and unscaled.
    #[must_use]
    pub fn at(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            ..Self::default()
        }
    }
}

/// Animation preset tag.
///
/// The same tags are used for both phases. On exit they name the mirrored
/// motion; see [`crate::animation::ExitMotion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnimationType {
    /// No animation.
    #[default]
    None,
    /// Opacity fade.
    FadeIn,
    /// Horizontal slide, entering from the left and leaving to the right.
    SlideRight,
    /// Horizontal slide, entering from the right and leaving to the left.
    SlideLeft,
    /// Scale from/to zero.
    ScaleUp,
}

/// Per-phase animation settings of an element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Preset to play.
    #[serde(rename = "type")]
    pub kind: AnimationType,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: f32,
    /// Delay before the animation starts, in seconds.
    #[serde(default)]
    pub delay: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self::NONE
    }
}

impl AnimationConfig {
    /// The inert configuration.
    pub const NONE: Self = Self {
        kind: AnimationType::None,
        duration: 0.0,
        delay: 0.0,
    };

    /// Create a configuration; negative timings are clamped to zero.
    #[must_use]
    pub fn new(kind: AnimationType, duration: f32, delay: f32) -> Self {
        Self {
            kind,
            duration: duration.max(0.0),
            delay: delay.max(0.0),
        }
    }

    /// Whether this configuration animates anything.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.kind != AnimationType::None
    }
}

/// A graphic element with shared attributes and variant content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Unique identifier.
    pub id: ElementId,
    /// Display name shown in the layer list.
    pub name: String,
    /// Position, size, rotation and scale.
    #[serde(flatten)]
    pub transform: Transform,
    /// Whether the element is rendered.
    pub visible: bool,
    /// Whether the element is protected from pointer edits.
    pub locked: bool,
    /// Resting opacity in `[0, 1]`.
    pub opacity: f32,
    /// Stacking key; higher paints later. Not required to be unique.
    pub z_index: i32,
    /// Whether the rendering surface offers drag handles.
    pub draggable: bool,
    /// Entry animation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_animation: Option<AnimationConfig>,
    /// Exit animation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_animation: Option<AnimationConfig>,
    /// Variant content, tagged by `type`.
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    /// Create a new element with a fresh id and default shared attributes.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ElementKind, z_index: i32) -> Self {
        Self {
            id: ElementId::new(),
            name: name.into(),
            transform: Transform::default(),
            visible: true,
            locked: false,
            opacity: 1.0,
            z_index,
            draggable: true,
            in_animation: Some(AnimationConfig::NONE),
            out_animation: Some(AnimationConfig::NONE),
            kind,
        }
    }

    /// Default text element.
    #[must_use]
    pub fn text(z_index: i32) -> Self {
        Self::new(
            "Text",
            ElementKind::Text {
                text: "Double click to edit".to_string(),
                font_size: 24.0,
                font_family: "Arial".to_string(),
                font_style: FontStyle::Normal,
                fill: "#ffffff".to_string(),
                align: TextAlign::Left,
            },
            z_index,
        )
        .with_transform(Transform::at(100.0, 100.0, 200.0, 50.0))
    }

    /// Default rectangle element.
    #[must_use]
    pub fn rectangle(z_index: i32) -> Self {
        Self::new(
            "Rectangle",
            ElementKind::Rectangle {
                fill: "#3b82f6".to_string(),
                stroke: "#1e40af".to_string(),
                stroke_width: 2.0,
                corner_radius: 0.0,
            },
            z_index,
        )
        .with_transform(Transform::at(150.0, 150.0, 200.0, 100.0))
    }

    /// Default circle element.
    #[must_use]
    pub fn circle(z_index: i32) -> Self {
        Self::new(
            "Circle",
            ElementKind::Circle {
                radius: 50.0,
                fill: "#ef4444".to_string(),
                stroke: "#991b1b".to_string(),
                stroke_width: 2.0,
            },
            z_index,
        )
        .with_transform(Transform::at(200.0, 200.0, 100.0, 100.0))
    }

    /// Default image element showing `src`.
    #[must_use]
    pub fn image(src: impl Into<String>, z_index: i32) -> Self {
        Self::new("Image", ElementKind::Image { src: src.into() }, z_index)
            .with_transform(Transform::at(100.0, 100.0, 200.0, 200.0))
    }

    /// Set the transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Set the entry animation.
    #[must_use]
    pub fn with_in_animation(mut self, config: AnimationConfig) -> Self {
        self.in_animation = Some(config);
        self
    }

    /// Set the exit animation.
    #[must_use]
    pub fn with_out_animation(mut self, config: AnimationConfig) -> Self {
        self.out_animation = Some(config);
        self
    }

    /// Set the resting opacity, clamped to `[0, 1]`.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// The payload-free discriminant.
    #[must_use]
    pub const fn element_type(&self) -> ElementType {
        self.kind.element_type()
    }

    /// Entry animation, `none` when absent.
    #[must_use]
    pub fn in_animation(&self) -> AnimationConfig {
        self.in_animation.unwrap_or_default()
    }

    /// Exit animation, `none` when absent.
    #[must_use]
    pub fn out_animation(&self) -> AnimationConfig {
        self.out_animation.unwrap_or_default()
    }

    /// Copy with a fresh id, shifted by `offset` on both axes and renamed "<name> Copy".
    #[must_use]
    pub fn duplicate(&self, offset: f32) -> Self {
        let mut copy = self.clone();
        copy.id = ElementId::new();
        copy.transform.x += offset;
        copy.transform.y += offset;
        copy.name = format!("{} Copy", self.name);
        copy
    }
}

/// A partial attribute update, merged into an element by [`ElementPatch::apply`].
///
/// Fields that do not exist on the target variant are ignored. Identity and
/// type cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct ElementPatch {
    pub name: Option<String>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub rotation: Option<f32>,
    pub scale_x: Option<f32>,
    pub scale_y: Option<f32>,
    pub visible: Option<bool>,
    pub locked: Option<bool>,
    pub opacity: Option<f32>,
    pub z_index: Option<i32>,
    pub draggable: Option<bool>,
    pub in_animation: Option<AnimationConfig>,
    pub out_animation: Option<AnimationConfig>,
    pub text: Option<String>,
    pub font_size: Option<f32>,
    pub font_family: Option<String>,
    pub font_style: Option<FontStyle>,
    pub fill: Option<String>,
    pub align: Option<TextAlign>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f32>,
    pub corner_radius: Option<f32>,
    pub radius: Option<f32>,
    pub src: Option<String>,
}

impl ElementPatch {
    /// Patch that moves an element.
    #[must_use]
    pub fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Patch that sets the stacking key.
    #[must_use]
    pub fn z_index(z_index: i32) -> Self {
        Self {
            z_index: Some(z_index),
            ..Self::default()
        }
    }

    /// Whether the patch carries no changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge this patch into `element`.
    ///
    /// Opacity is clamped to `[0, 1]` and sizes to non-negative values.
    /// Practical minimums (e.g. 10px boxes) are left to the gesture boundary.
    pub fn apply(&self, element: &mut Element) {
        fn set<T: Clone>(slot: &mut T, value: Option<&T>) {
            if let Some(v) = value {
                slot.clone_from(v);
            }
        }
        fn set_len(slot: &mut f32, value: Option<f32>) {
            if let Some(v) = value {
                *slot = v.max(0.0);
            }
        }

        set(&mut element.name, self.name.as_ref());
        let t = &mut element.transform;
        set(&mut t.x, self.x.as_ref());
        set(&mut t.y, self.y.as_ref());
        set_len(&mut t.width, self.width);
        set_len(&mut t.height, self.height);
        set(&mut t.rotation, self.rotation.as_ref());
        set(&mut t.scale_x, self.scale_x.as_ref());
        set(&mut t.scale_y, self.scale_y.as_ref());
        set(&mut element.visible, self.visible.as_ref());
        set(&mut element.locked, self.locked.as_ref());
        if let Some(opacity) = self.opacity {
            element.opacity = opacity.clamp(0.0, 1.0);
        }
        set(&mut element.z_index, self.z_index.as_ref());
        set(&mut element.draggable, self.draggable.as_ref());
        if let Some(c) = self.in_animation {
            element.in_animation = Some(AnimationConfig::new(c.kind, c.duration, c.delay));
        }
        if let Some(c) = self.out_animation {
            element.out_animation = Some(AnimationConfig::new(c.kind, c.duration, c.delay));
        }

        match &mut element.kind {
            ElementKind::Text {
                text,
                font_size,
                font_family,
                font_style,
                fill,
                align,
            } => {
                set(text, self.text.as_ref());
                set_len(font_size, self.font_size);
                set(font_family, self.font_family.as_ref());
                set(font_style, self.font_style.as_ref());
                set(fill, self.fill.as_ref());
                set(align, self.align.as_ref());
            }
            ElementKind::Rectangle {
                fill,
                stroke,
                stroke_width,
                corner_radius,
            } => {
                set(fill, self.fill.as_ref());
                set(stroke, self.stroke.as_ref());
                set_len(stroke_width, self.stroke_width);
                set_len(corner_radius, self.corner_radius);
            }
            ElementKind::Circle {
                radius,
                fill,
                stroke,
                stroke_width,
            } => {
                set_len(radius, self.radius);
                set(fill, self.fill.as_ref());
                set(stroke, self.stroke.as_ref());
                set_len(stroke_width, self.stroke_width);
            }
            ElementKind::Image { src } => set(src, self.src.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factories_assign_fresh_ids() {
        let a = Element::rectangle(0);
        let b = Element::rectangle(0);
        assert_ne!(a.id, b.id);
        assert_eq!(a.element_type(), ElementType::Rectangle);
        assert_eq!(a.in_animation(), AnimationConfig::NONE);
    }

    #[test]
    fn test_factory_defaults() {
        let text = Element::text(3);
        assert_eq!(text.z_index, 3);
        assert!((text.transform.width - 200.0).abs() < f32::EPSILON);
        assert!(text.visible && !text.locked && text.draggable);

        let circle = Element::circle(0);
        match circle.kind {
            ElementKind::Circle { radius, .. } => assert!((radius - 50.0).abs() < f32::EPSILON),
            _ => panic!("expected circle"),
        }
    }

    #[test]
    fn test_duplicate_offsets_and_renames() {
        let original = Element::rectangle(0);
        let copy = original.duplicate(20.0);
        assert_ne!(copy.id, original.id);
        assert!((copy.transform.x - 170.0).abs() < f32::EPSILON);
        assert!((copy.transform.y - 170.0).abs() < f32::EPSILON);
        assert_eq!(copy.name, "Rectangle Copy");
        assert_eq!(copy.kind, original.kind);
    }

    #[test]
    fn test_patch_merges_shared_and_variant_fields() {
        let mut el = Element::circle(0);
        let patch = ElementPatch {
            x: Some(5.0),
            radius: Some(80.0),
            font_size: Some(99.0),
            opacity: Some(1.7),
            ..ElementPatch::default()
        };
        patch.apply(&mut el);

        assert!((el.transform.x - 5.0).abs() < f32::EPSILON);
        assert!((el.opacity - 1.0).abs() < f32::EPSILON);
        match el.kind {
            ElementKind::Circle { radius, .. } => assert!((radius - 80.0).abs() < f32::EPSILON),
            _ => panic!("expected circle"),
        }
    }

    #[test]
    fn test_patch_clamps_negative_sizes_only_to_zero() {
        let mut el = Element::rectangle(0);
        let patch = ElementPatch {
            width: Some(-4.0),
            height: Some(3.0),
            ..ElementPatch::default()
        };
        patch.apply(&mut el);
        assert!(el.transform.width.abs() < f32::EPSILON);
        assert!((el.transform.height - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_element_json_shape() {
        let el = Element::rectangle(2)
            .with_in_animation(AnimationConfig::new(AnimationType::FadeIn, 1.0, 0.5));
        let json = serde_json::to_value(&el).expect("serialize");

        assert_eq!(json["type"], "rectangle");
        assert_eq!(json["zIndex"], 2);
        assert_eq!(json["scaleX"], 1.0);
        assert_eq!(json["cornerRadius"], 0.0);
        assert_eq!(json["inAnimation"]["type"], "fadeIn");

        let back: Element = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, el);
    }

    #[test]
    fn test_missing_animations_default_to_none() {
        let mut el = Element::image("logo.png", 0);
        el.in_animation = None;
        let json = serde_json::to_string(&el).expect("serialize");
        assert!(!json.contains("inAnimation"));

        let back: Element = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.in_animation(), AnimationConfig::NONE);
    }

    #[test]
    fn test_element_id_parse() {
        let id = ElementId::new();
        assert_eq!(ElementId::parse(&id.to_string()).expect("parse"), id);
        assert!(matches!(
            ElementId::parse("not-a-uuid"),
            Err(OverlayError::InvalidElementId(_))
        ));
    }

    #[test]
    fn test_font_style_css() {
        assert_eq!(FontStyle::Normal.css(), "");
        assert_eq!(FontStyle::Italic.css(), "font-style:italic;");
        assert_eq!(FontStyle::Bold.css(), "font-weight:bold;");
    }
}
