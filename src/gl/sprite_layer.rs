use compact_str::CompactString;

use crate::{
    error::Error,
    gl::{CustomLayer, GL, SpriteAtlas},
};

/// Renders oriented sprites from a [`SpriteAtlas`] in the map's
/// projected coordinate space.
///
/// Skeleton layer: it participates in the custom-layer lifecycle and
/// manages its atlas texture, but draws nothing yet.
#[derive(Debug)]
pub struct SpriteLayer {
    id: CompactString,
    atlas: SpriteAtlas,
}

impl SpriteLayer {
    /// Creates a sprite layer over the given atlas.
    pub fn new(id: impl Into<CompactString>, atlas: SpriteAtlas) -> Self {
        Self { id: id.into(), atlas }
    }

    /// The atlas the layer draws from.
    pub fn atlas(&self) -> &SpriteAtlas {
        &self.atlas
    }
}

impl CustomLayer for SpriteLayer {
    fn id(&self) -> &str {
        &self.id
    }

    fn attach(&mut self, gl: &GL) -> Result<(), Error> {
        self.atlas.initialize(gl)
    }

    fn detach(&mut self, gl: &GL) -> Result<(), Error> {
        self.atlas.delete(gl);
        Ok(())
    }

    fn prepare(&mut self, _gl: &GL) -> Result<(), Error> {
        Ok(())
    }

    fn draw(&mut self, _gl: &GL, _matrix: &[f32; 16]) -> Result<(), Error> {
        // TODO: draw one oriented quad per sprite once the vertex
        // layout for anchor + rotation is settled
        Ok(())
    }
}
