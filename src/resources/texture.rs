use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use crate::{
    config::AssetSource,
    error::LoadError,
    render::TextureHandle,
    resources::load_binary,
};

/// The texture upload interface of the graphics layer.
pub trait TextureFactory {
    /// Uploads `image` and returns its handle. Colour maps are sRGB, normal
    /// maps linear.
    fn create_texture(&mut self, image: &DynamicImage, label: &str, is_normal_map: bool) -> TextureHandle;
}

pub fn decode_image(bytes: &[u8], label: &str, format: Option<ImageFormat>) -> Result<DynamicImage, LoadError> {
    let decoded = match format {
        Some(format) => image::load_from_memory_with_format(bytes, format),
        None => image::load_from_memory(bytes),
    };
    decoded.map_err(|source| LoadError::Image {
        path: label.to_string(),
        source,
    })
}

pub fn texture_from_bytes(
    bytes: &[u8],
    label: &str,
    format: Option<ImageFormat>,
    is_normal_map: bool,
    textures: &mut dyn TextureFactory,
) -> Result<TextureHandle, LoadError> {
    let img = decode_image(bytes, label, format)?;
    Ok(textures.create_texture(&img, label, is_normal_map))
}

pub async fn load_texture(
    file_name: &str,
    is_normal_map: bool,
    assets: &AssetSource,
    textures: &mut dyn TextureFactory,
) -> Result<TextureHandle, LoadError> {
    let data = load_binary(file_name, assets).await?;
    texture_from_bytes(&data, file_name, None, is_normal_map, textures)
}

/// A 1x1 texture of a single colour, used where an asset has a colour factor
/// but no image.
pub fn solid_color_texture(
    rgba: [u8; 4],
    label: &str,
    is_normal_map: bool,
    textures: &mut dyn TextureFactory,
) -> TextureHandle {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba(rgba)));
    textures.create_texture(&img, label, is_normal_map)
}

/// Encodes a linear `[0, 1]` colour factor as 8-bit sRGB (alpha stays linear).
pub fn color_factor_to_srgb(factor: [f32; 4]) -> [u8; 4] {
    let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    let encode = |c: f32| {
        let c = c.clamp(0.0, 1.0);
        if c <= 0.003_130_8 {
            c * 12.92
        } else {
            1.055 * c.powf(1.0 / 2.4) - 0.055
        }
    };
    [
        to_u8(encode(factor[0])),
        to_u8(encode(factor[1])),
        to_u8(encode(factor[2])),
        to_u8(factor[3]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_and_black_factors_map_to_extremes() {
        assert_eq!(color_factor_to_srgb([1.0, 1.0, 1.0, 1.0]), [255, 255, 255, 255]);
        assert_eq!(color_factor_to_srgb([0.0, 0.0, 0.0, 0.5]), [0, 0, 0, 128]);
    }

    #[test]
    fn mid_grey_is_brightened() {
        let [r, g, b, _] = color_factor_to_srgb([0.5, 0.5, 0.5, 1.0]);
        assert_eq!((r, g, b), (188, 188, 188));
    }
}
