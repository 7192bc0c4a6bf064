//! Canvas handle: one scene at one format, owned by an editor session.

use crate::format::Format;
use crate::layers::{Layer, LayerId, LayerTrait, SerializableColor};
use crate::scene::{Placement, Scene};
use kurbo::{Point, Size, Vec2};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one canvas instance.
///
/// Every canvas gets a fresh token, so asynchronous work can tell whether
/// the canvas it was issued against is still the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanvasToken(u64);

impl CanvasToken {
    fn next() -> Self {
        static GENERATION: AtomicU64 = AtomicU64::new(1);
        Self(GENERATION.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for CanvasToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Notifications emitted by the canvas as its scene changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneEvent {
    /// A layer was stacked on top.
    Added(LayerId),
    /// A layer was removed.
    Removed(LayerId),
    /// A layer moved in the z-order.
    Reordered(LayerId),
    /// A layer's geometry or content changed.
    Modified(LayerId),
    /// A layer became the canvas's active object.
    Selected(LayerId),
    /// A new background image was installed.
    BackgroundChanged(LayerId),
}

impl SceneEvent {
    /// Whether this event changes what the layers panel shows.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            SceneEvent::Added(_)
                | SceneEvent::Removed(_)
                | SceneEvent::Reordered(_)
                | SceneEvent::Modified(_)
        )
    }
}

/// A canvas of fixed pixel dimensions holding a scene.
///
/// All scene mutations go through the canvas so that each one is reported
/// as a [`SceneEvent`].
#[derive(Debug)]
pub struct Canvas {
    token: CanvasToken,
    format: Format,
    /// Color behind the background image and layers.
    pub background_color: SerializableColor,
    scene: Scene,
    events: Vec<SceneEvent>,
}

impl Canvas {
    /// Default canvas background.
    pub const DEFAULT_BACKGROUND: SerializableColor = SerializableColor {
        r: 0xae,
        g: 0xae,
        b: 0xae,
        a: 0xff,
    };

    /// Create a new empty canvas at the given format.
    pub fn new(format: Format, background_color: SerializableColor) -> Self {
        let token = CanvasToken::next();
        log::debug!("Created canvas {token} at {format} ({:?})", format.dimensions());
        Self {
            token,
            format,
            background_color,
            scene: Scene::new(),
            events: Vec::new(),
        }
    }

    pub fn token(&self) -> CanvasToken {
        self.token
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Canvas size in pixels.
    pub fn size(&self) -> Size {
        self.format.size()
    }

    pub fn width(&self) -> f64 {
        self.size().width
    }

    pub fn height(&self) -> f64 {
        self.size().height
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Add a layer. Image layers are installed as the background.
    pub fn add(&mut self, layer: Layer) -> LayerId {
        log::debug!("Adding {} layer {} to canvas {}", layer.kind(), layer.id(), self.token);
        match self.scene.add_layer(layer) {
            Placement::Stacked(id) => {
                self.events.push(SceneEvent::Added(id));
                id
            }
            Placement::Background { id, replaced } => {
                if let Some(old) = replaced {
                    self.events.push(SceneEvent::Removed(old));
                }
                self.events.push(SceneEvent::BackgroundChanged(id));
                id
            }
        }
    }

    /// Remove a layer.
    pub fn remove(&mut self, id: LayerId) -> Option<Layer> {
        let removed = self.scene.remove_layer(id);
        if removed.is_some() {
            log::debug!("Removed layer {id} from canvas {}", self.token);
            self.events.push(SceneEvent::Removed(id));
        }
        removed
    }

    /// Move a layer one step towards the front.
    pub fn bring_forward(&mut self, id: LayerId) -> bool {
        let moved = self.scene.bring_forward(id);
        if moved {
            self.events.push(SceneEvent::Reordered(id));
        }
        moved
    }

    /// Move a layer one step towards the back.
    pub fn send_backward(&mut self, id: LayerId) -> bool {
        let moved = self.scene.send_backward(id);
        if moved {
            self.events.push(SceneEvent::Reordered(id));
        }
        moved
    }

    /// Translate a layer.
    pub fn move_layer(&mut self, id: LayerId, offset: Vec2) -> bool {
        match self.scene.get_layer_mut(id) {
            Some(layer) => {
                layer.translate(offset);
                self.events.push(SceneEvent::Modified(id));
                true
            }
            None => false,
        }
    }

    /// Make a layer the active object. Unknown IDs are ignored.
    pub fn select(&mut self, id: LayerId) -> bool {
        if self.scene.get_layer(id).is_none() {
            return false;
        }
        self.events.push(SceneEvent::Selected(id));
        true
    }

    /// Select the frontmost layer under a point, as a pointer click would.
    pub fn click(&mut self, point: Point) -> Option<LayerId> {
        let id = self.scene.layers_at_point(point, 0.0).into_iter().next()?;
        self.select(id);
        Some(id)
    }

    /// Drain pending scene events in emission order.
    pub fn take_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    /// Horizontal offset that centers something of `width` on this canvas.
    pub fn centered_left(&self, width: f64) -> f64 {
        (self.width() - width) / 2.0
    }

    /// Vertical offset that centers something of `height` on this canvas.
    pub fn centered_top(&self, height: f64) -> f64 {
        (self.height() - height) / 2.0
    }

    /// Current bounds of a layer.
    pub fn layer_bounds(&self, id: LayerId) -> Option<kurbo::Rect> {
        self.scene.get_layer(id).map(|layer| layer.bounds())
    }}

impl Drop for Canvas {
    fn drop(&mut self) {
        log::debug!(
            "Disposing canvas {} with {} layer(s)",
            self.token,
            self.scene.len()
        );
    }
}
