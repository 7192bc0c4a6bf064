//! Layers panel: a read-only projection of the scene.

use crate::layers::LayerId;
use crate::scene::Scene;
use serde::{Deserialize, Serialize};

/// One row of the layers panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerEntry {
    pub id: LayerId,
    pub label: String,
}

/// Rows in z-order (back to front), rebuilt whenever the scene changes.
#[derive(Debug, Clone, Default)]
pub struct LayersPanel {
    entries: Vec<LayerEntry>,
}

impl LayersPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-project the scene.
    pub fn refresh(&mut self, scene: &Scene) {
        self.entries = scene
            .layers_ordered()
            .map(|layer| LayerEntry {
                id: layer.id(),
                label: layer.label(),
            })
            .collect();
    }

    pub fn entries(&self) -> &[LayerEntry] {
        &self.entries
    }

    /// ID of the row at `index`.
    pub fn id_at(&self, index: usize) -> Option<LayerId> {
        self.entries.get(index).map(|entry| entry.id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::{Layer, TextLayer};
    use kurbo::Point;

    #[test]
    fn test_projection_follows_z_order() {
        let mut scene = Scene::new();
        let a = Layer::Text(TextLayer::new(Point::ZERO, "first".to_string()));
        let b = Layer::Text(TextLayer::new(Point::ZERO, String::new()));
        let (a_id, b_id) = (a.id(), b.id());
        scene.add_layer(a);
        scene.add_layer(b);
        scene.bring_forward(a_id);

        let mut panel = LayersPanel::new();
        panel.refresh(&scene);
        let labels: Vec<_> = panel.entries().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["?", "first"]);
        assert_eq!(panel.id_at(0), Some(b_id));
        assert_eq!(panel.id_at(2), None);
    }
}
