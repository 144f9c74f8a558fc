mod buffer;
mod layer;
mod point_layer;
mod program;
mod sprite_atlas;
mod sprite_layer;

pub use layer::{CustomLayer, LAYER_KIND};
pub use point_layer::{PointLayer, PointLayerBuilder};
pub use program::ShaderSource;
pub(crate) use program::ShaderProgram;
pub use sprite_atlas::{Sprite, SpriteAtlas, SpriteRect};
pub use sprite_layer::SpriteLayer;

pub(crate) type GL = web_sys::WebGl2RenderingContext;
