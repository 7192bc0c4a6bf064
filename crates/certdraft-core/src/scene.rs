//! Scene: ordered layers plus an optional background image.

use crate::layers::{ImageLayer, Layer, LayerId, LayerTrait};
use kurbo::Point;
use std::collections::HashMap;

/// The layers of one canvas.
///
/// Text layers live in `z_order` (back to front). The background image is
/// held apart and never takes part in the z-order.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// All non-background layers, keyed by ID.
    layers: HashMap<LayerId, Layer>,
    /// Z-order of layers (back to front).
    z_order: Vec<LayerId>,
    /// Full-canvas background image.
    background: Option<ImageLayer>,
}

/// Where an added layer ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Appended on top of the z-order.
    Stacked(LayerId),
    /// Installed as the background, replacing `replaced` if there was one.
    Background { id: LayerId, replaced: Option<LayerId> },
}

impl Scene {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer on top. Image layers become the background instead.
    pub fn add_layer(&mut self, layer: Layer) -> Placement {
        match layer {
            Layer::Image(image) => {
                let id = image.id();
                let replaced = self.set_background(image).map(|old| old.id());
                Placement::Background { id, replaced }
            }
            layer => {
                let id = layer.id();
                self.z_order.push(id);
                self.layers.insert(id, layer);
                Placement::Stacked(id)
            }
        }
    }

    /// Install a background image, returning the previous one.
    pub fn set_background(&mut self, image: ImageLayer) -> Option<ImageLayer> {
        self.background.replace(image)
    }

    /// Get the background image.
    pub fn background(&self) -> Option<&ImageLayer> {
        self.background.as_ref()
    }

    /// Remove a layer. Removing the background's ID clears the background.
    pub fn remove_layer(&mut self, id: LayerId) -> Option<Layer> {
        if self.background.as_ref().is_some_and(|bg| bg.id() == id) {
            return self.background.take().map(Layer::Image);
        }
        self.z_order.retain(|&layer_id| layer_id != id);
        self.layers.remove(&id)
    }

    /// Get a layer by ID.
    pub fn get_layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    /// Get a mutable reference to a layer by ID.
    pub fn get_layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.get_mut(&id)
    }

    /// Get layers in z-order (back to front).
    pub fn layers_ordered(&self) -> impl Iterator<Item = &Layer> {
        self.z_order.iter().filter_map(|id| self.layers.get(id))
    }

    /// Z-order of layer IDs (back to front).
    pub fn z_order(&self) -> &[LayerId] {
        &self.z_order
    }

    /// Move a layer one step forward (towards front).
    /// Returns true if the layer was moved, false if already at front.
    pub fn bring_forward(&mut self, id: LayerId) -> bool {
        if let Some(pos) = self.z_order.iter().position(|&layer_id| layer_id == id) {
            if pos + 1 < self.z_order.len() {
                self.z_order.swap(pos, pos + 1);
                return true;
            }
        }
        false
    }

    /// Move a layer one step backward (towards back).
    /// Returns true if the layer was moved, false if already at back.
    pub fn send_backward(&mut self, id: LayerId) -> bool {
        if let Some(pos) = self.z_order.iter().position(|&layer_id| layer_id == id) {
            if pos > 0 {
                self.z_order.swap(pos, pos - 1);
                return true;
            }
        }
        false
    }

    /// Find layers at a point, front to back. The background is never hit.
    pub fn layers_at_point(&self, point: Point, tolerance: f64) -> Vec<LayerId> {
        self.z_order
            .iter()
            .rev()
            .filter_map(|&id| {
                self.layers
                    .get(&id)
                    .filter(|layer| layer.hit_test(point, tolerance))
                    .map(|_| id)
            })
            .collect()
    }

    /// Check if the scene has no layers and no background.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty() && self.background.is_none()
    }

    /// Number of non-background layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }
}
