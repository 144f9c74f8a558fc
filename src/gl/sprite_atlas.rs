use std::collections::HashMap;

use compact_str::CompactString;
use web_sys::{HtmlImageElement, WebGlTexture};

use crate::{error::Error, gl::GL};

/// Normalized texture-space rectangle of a sprite within an atlas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteRect {
    /// Left edge.
    pub x1: f32,
    /// Top edge.
    pub y1: f32,
    /// Right edge.
    pub x2: f32,
    /// Bottom edge.
    pub y2: f32,
}

/// Stores a sprite sheet image on the GPU, with sub-rectangles looked
/// up by sprite name.
///
/// The atlas is created CPU-side from an image and a name-to-rectangle
/// mapping supplied entirely by the caller; `initialize` uploads the
/// image once a device context is available.
#[derive(Debug)]
pub struct SpriteAtlas {
    image: HtmlImageElement,
    sprites: HashMap<CompactString, SpriteRect>,
    texture: Option<WebGlTexture>,
}

/// A named sprite resolved from an atlas: its rectangle plus a
/// non-owning reference back to the atlas holding the texture.
#[derive(Debug, Clone, Copy)]
pub struct Sprite<'a> {
    /// Where the sprite sits in the atlas texture.
    pub rect: SpriteRect,
    /// The atlas the rectangle indexes into.
    pub atlas: &'a SpriteAtlas,
}

impl SpriteAtlas {
    /// Creates an atlas from a sprite sheet image and its sprite table.
    pub fn new<N, I>(image: HtmlImageElement, sprites: I) -> Self
    where
        N: Into<CompactString>,
        I: IntoIterator<Item = (N, SpriteRect)>,
    {
        Self {
            image,
            sprites: sprites
                .into_iter()
                .map(|(name, rect)| (name.into(), rect))
                .collect(),
            texture: None,
        }
    }

    /// Creates the device texture and uploads the sprite sheet image.
    ///
    /// # Errors
    /// [`Error::Resource`] when texture creation or the image upload
    /// fails.
    pub fn initialize(&mut self, gl: &GL) -> Result<(), Error> {
        let texture = gl.create_texture().ok_or(Error::texture_creation_failed())?;
        gl.bind_texture(GL::TEXTURE_2D, Some(&texture));

        gl.tex_image_2d_with_u32_and_u32_and_html_image_element(
            GL::TEXTURE_2D,
            0, // level
            GL::RGBA as i32,
            GL::RGBA,
            GL::UNSIGNED_BYTE,
            &self.image,
        )
        .map_err(|_| Error::image_upload_failed())?;

        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MIN_FILTER, GL::LINEAR as i32);
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MAG_FILTER, GL::LINEAR as i32);
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_S, GL::CLAMP_TO_EDGE as i32);
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_T, GL::CLAMP_TO_EDGE as i32);

        self.texture = Some(texture);
        Ok(())
    }

    /// Makes the atlas the active texture on `unit`.
    pub fn bind(&self, gl: &GL, unit: u32) {
        gl.active_texture(GL::TEXTURE0 + unit);
        gl.bind_texture(GL::TEXTURE_2D, self.texture.as_ref());
    }

    /// Returns the named sprite, borrowing the atlas; the atlas
    /// outlives any lookup result.
    pub fn get(&self, name: &str) -> Option<Sprite<'_>> {
        self.sprites
            .get(name)
            .copied()
            .map(|rect| Sprite { rect, atlas: self })
    }

    /// Releases the device texture.
    pub fn delete(&mut self, gl: &GL) {
        if let Some(texture) = self.texture.take() {
            gl.delete_texture(Some(&texture));
        }
    }
}
