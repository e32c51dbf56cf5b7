use crate::{error::ImageError, Image, ImageSize};

/// Pixel depths accepted at the boundary of the morphology engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelDepth {
    /// 8-bit unsigned grayscale.
    Gray8,
    /// 16-bit unsigned grayscale.
    Gray16,
    /// 32-bit float grayscale.
    Gray32,
    /// 8-bit RGB, processed as three independent planes.
    Rgb,
}

impl PixelDepth {
    /// Resolve a raw format descriptor into a supported pixel depth.
    ///
    /// # Arguments
    ///
    /// * `bits` - Bits per channel.
    /// * `channels` - Number of interleaved channels.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::UnsupportedDepth`] for any other combination.
    ///
    /// # Examples
    ///
    /// ```
    /// use morpho_image::PixelDepth;
    ///
    /// assert_eq!(PixelDepth::from_format(16, 1).unwrap(), PixelDepth::Gray16);
    /// assert!(PixelDepth::from_format(16, 3).is_err());
    /// ```
    pub fn from_format(bits: u8, channels: u8) -> Result<Self, ImageError> {
        match (bits, channels) {
            (8, 1) => Ok(PixelDepth::Gray8),
            (16, 1) => Ok(PixelDepth::Gray16),
            (32, 1) => Ok(PixelDepth::Gray32),
            (8, 3) => Ok(PixelDepth::Rgb),
            _ => Err(ImageError::UnsupportedDepth { bits, channels }),
        }
    }

    /// Number of independent planes the engine processes for this depth.
    pub fn num_planes(&self) -> usize {
        match self {
            PixelDepth::Rgb => 3,
            _ => 1,
        }
    }

    /// Clip a real valued sample into the representable range of this depth.
    pub fn clip(&self, value: f32) -> f32 {
        match self {
            PixelDepth::Gray8 | PixelDepth::Rgb => value.round().clamp(0.0, u8::MAX as f32),
            PixelDepth::Gray16 => value.round().clamp(0.0, u16::MAX as f32),
            PixelDepth::Gray32 => value,
        }
    }
}

/// An image of one of the supported pixel depths.
#[derive(Debug, Clone, PartialEq)]
pub enum DepthImage {
    /// 8-bit grayscale image.
    Gray8(Image<u8, 1>),
    /// 16-bit grayscale image.
    Gray16(Image<u16, 1>),
    /// 32-bit float grayscale image.
    Gray32(Image<f32, 1>),
    /// 8-bit RGB image.
    Rgb(Image<u8, 3>),
}

impl DepthImage {
    /// The pixel depth of the image.
    pub fn depth(&self) -> PixelDepth {
        match self {
            DepthImage::Gray8(_) => PixelDepth::Gray8,
            DepthImage::Gray16(_) => PixelDepth::Gray16,
            DepthImage::Gray32(_) => PixelDepth::Gray32,
            DepthImage::Rgb(_) => PixelDepth::Rgb,
        }
    }

    /// The size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        match self {
            DepthImage::Gray8(img) => img.size(),
            DepthImage::Gray16(img) => img.size(),
            DepthImage::Gray32(img) => img.size(),
            DepthImage::Rgb(img) => img.size(),
        }
    }

    /// Split the image into real valued single channel planes.
    ///
    /// Grayscale depths give one plane, RGB gives the red, green and blue planes.
    pub fn to_planes(&self) -> Result<Vec<Image<f32, 1>>, ImageError> {
        match self {
            DepthImage::Gray8(img) => Ok(vec![img.cast()?]),
            DepthImage::Gray16(img) => Ok(vec![img.cast()?]),
            DepthImage::Gray32(img) => Ok(vec![img.clone()]),
            DepthImage::Rgb(img) => img
                .split_channels()?
                .iter()
                .map(|plane| plane.cast())
                .collect(),
        }
    }

    /// Reassemble planes into an image of the given depth.
    ///
    /// Samples are rounded and clamped to the range of integer depths, float
    /// planes are kept as they are.
    ///
    /// # Errors
    ///
    /// Returns an error if the plane count does not match the depth or the
    /// planes differ in size.
    ///
    /// # Examples
    ///
    /// ```
    /// use morpho_image::{DepthImage, Image, PixelDepth};
    ///
    /// let plane = Image::<f32, 1>::new([2, 1].into(), vec![-3.0, 300.2]).unwrap();
    /// let image = DepthImage::from_planes(PixelDepth::Gray8, vec![plane]).unwrap();
    ///
    /// assert_eq!(image, DepthImage::Gray8(Image::new([2, 1].into(), vec![0, 255]).unwrap()));
    /// ```
    pub fn from_planes(depth: PixelDepth, planes: Vec<Image<f32, 1>>) -> Result<Self, ImageError> {
        if planes.len() != depth.num_planes() {
            return Err(ImageError::InvalidPlaneCount {
                depth,
                expected: depth.num_planes(),
                actual: planes.len(),
            });
        }

        let clipped = planes
            .into_iter()
            .map(|plane| {
                let size = plane.size();
                let data = plane.into_vec().into_iter().map(|v| depth.clip(v)).collect();
                Image::<f32, 1>::new(size, data)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut planes = clipped.into_iter();
        let image = match depth {
            PixelDepth::Gray8 => DepthImage::Gray8(next_plane(&mut planes)?.cast()?),
            PixelDepth::Gray16 => DepthImage::Gray16(next_plane(&mut planes)?.cast()?),
            PixelDepth::Gray32 => DepthImage::Gray32(next_plane(&mut planes)?),
            PixelDepth::Rgb => {
                let channels = planes
                    .map(|plane| plane.cast::<u8>())
                    .collect::<Result<Vec<_>, _>>()?;
                DepthImage::Rgb(Image::from_channels(&channels)?)
            }
        };

        Ok(image)
    }
}

fn next_plane(
    planes: &mut impl Iterator<Item = Image<f32, 1>>,
) -> Result<Image<f32, 1>, ImageError> {
    planes
        .next()
        .ok_or(ImageError::InvalidChannelShape(0, 1))
}
