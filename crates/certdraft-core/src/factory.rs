//! Layer factory: builds new layers and centers them on the canvas.

use crate::canvas::Canvas;
use crate::layers::{
    DecodedImage, ImageLayer, Layer, LayerId, LayerStyle, SerializableColor, TextAlign,
    TextLayer, TextMeasure, TextboxLayer,
};
use kurbo::Point;

/// Where new layers are created before centering.
pub const DEFAULT_POSITION: Point = Point::new(100.0, 100.0);

/// Fill for user-added text.
pub const DEFAULT_FILL: SerializableColor = SerializableColor {
    r: 0x33,
    g: 0x33,
    b: 0x33,
    a: 0xff,
};

/// Text used for an empty text box.
pub const TEXTBOX_PLACEHOLDER: &str = "lorem ipsum";

/// One block of the starter layout.
struct SampleBlock {
    text: &'static str,
    font_size: f64,
    top: f64,
}

const SAMPLE_LAYOUT: [SampleBlock; 4] = [
    SampleBlock { text: "CERTIFICATE OF PARTICIPATION", font_size: 16.0, top: 100.0 },
    SampleBlock { text: "This is to certify that", font_size: 14.0, top: 150.0 },
    SampleBlock { text: "Jane Doe", font_size: 28.0, top: 190.0 },
    SampleBlock { text: "Successfully completed the course", font_size: 16.0, top: 230.0 },
];

/// Creates layers and inserts them into a canvas.
pub struct LayerFactory<'a> {
    measure: &'a dyn TextMeasure,
}

impl<'a> LayerFactory<'a> {
    pub fn new(measure: &'a dyn TextMeasure) -> Self {
        Self { measure }
    }

    /// Build a non-wrapping text layer, horizontally centered for `canvas_width`.
    pub fn text_layer(&self, value: &str, canvas_width: f64) -> TextLayer {
        let mut layer = TextLayer::new(DEFAULT_POSITION, value.to_string())
            .with_font_size(TextLayer::DEFAULT_FONT_SIZE)
            .with_style(LayerStyle::with_fill(DEFAULT_FILL));
        layer.relayout(self.measure);
        layer.position.x = (canvas_width - layer.width()) / 2.0;
        layer
    }

    /// Build a wrapped text box, horizontally centered for `canvas_width`.
    pub fn textbox_layer(&self, value: &str, canvas_width: f64) -> TextboxLayer {
        let value = if value.is_empty() { TEXTBOX_PLACEHOLDER } else { value };
        let width = TextboxLayer::DEFAULT_WIDTH;
        let mut layer = TextboxLayer::new(DEFAULT_POSITION, value.to_string(), width)
            .with_font_size(TextLayer::DEFAULT_FONT_SIZE)
            .with_style(LayerStyle::with_fill(DEFAULT_FILL));
        layer.relayout(self.measure);
        layer.position.x = (canvas_width - layer.width()) / 2.0;
        layer
    }

    /// Add a centered text layer to the canvas.
    pub fn add_text(&self, canvas: &mut Canvas, value: &str) -> LayerId {
        let layer = self.text_layer(value, canvas.width());
        canvas.add(Layer::Text(layer))
    }

    /// Add a centered text box to the canvas.
    pub fn add_textbox(&self, canvas: &mut Canvas, value: &str) -> LayerId {
        let layer = self.textbox_layer(value, canvas.width());
        canvas.add(Layer::Textbox(layer))
    }

    /// Install a decoded image as the canvas background, stretched to fit.
    pub fn add_image_background(&self, canvas: &mut Canvas, decoded: DecodedImage) -> LayerId {
        let layer = ImageLayer::covering(decoded, canvas.size());
        canvas.add(Layer::Image(layer))
    }

    /// Draw the starter certificate layout.
    pub fn draw_sample(&self, canvas: &mut Canvas) -> Vec<LayerId> {
        let width = canvas.width();
        SAMPLE_LAYOUT
            .iter()
            .map(|block| {
                let origin = Point::new(250.0, block.top);
                let mut layer = TextboxLayer::new(origin, block.text.to_string(), width / 2.0)
                    .with_font_size(block.font_size)
                    .with_align(TextAlign::Center)
                    .with_style(LayerStyle::with_fill(SerializableColor::black()));
                layer.relayout(self.measure);
                layer.position.x = (width - layer.width()) / 2.0;
                canvas.add(Layer::Textbox(layer))
            })
            .collect()
    }
}
