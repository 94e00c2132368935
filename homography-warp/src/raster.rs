use crate::RasterError;
use derive_more::From;
use image::{DynamicImage, ImageBuffer, Pixel};

/// A single channel value of a [`Raster`].
pub trait Sample: Copy + Default + Send + Sync + 'static {
    fn to_f64(self) -> f64;

    /// Rounds (for integer samples) and saturates into the representable range.
    fn from_f64(value: f64) -> Self;
}

macro_rules! integer_sample {
    ($($t:ty),*) => {
        $(
            impl Sample for $t {
                fn to_f64(self) -> f64 {
                    f64::from(self)
                }

                fn from_f64(value: f64) -> Self {
                    // `as` saturates and maps NaN to zero.
                    value.round() as $t
                }
            }
        )*
    };
}

integer_sample!(u8, u16);

impl Sample for f32 {
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

/// The shape of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dims {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
}

impl Dims {
    pub fn new(width: usize, height: usize, channels: usize) -> Self {
        Self {
            width,
            height,
            channels,
        }
    }

    /// The number of samples a raster of this shape holds.
    pub fn len(&self) -> usize {
        self.width * self.height * self.channels
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A pixel buffer with interleaved channels.
///
/// Channel `c` of pixel `(x, y)` lives at `(x + y * width) * channels + c`, which
/// is the layout of the `image` crate's buffers, so conversions are plain copies.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T> {
    dims: Dims,
    data: Vec<T>,
}

impl<T: Sample> Raster<T> {
    /// A raster of the given shape filled with the background value (zero).
    pub fn new(dims: Dims) -> Self {
        Self {
            dims,
            data: vec![T::default(); dims.len()],
        }
    }

    /// Wraps an interleaved buffer, checking that its length matches `dims`.
    pub fn from_raw(dims: Dims, data: Vec<T>) -> Result<Self, RasterError> {
        if data.len() != dims.len() {
            return Err(RasterError::BufferSize {
                expected: dims.len(),
                actual: data.len(),
            });
        }
        Ok(Self { dims, data })
    }

    /// Builds a raster by evaluating `f(x, y, channel)` for every sample.
    pub fn from_fn(dims: Dims, mut f: impl FnMut(usize, usize, usize) -> T) -> Self {
        let mut raster = Self::new(dims);
        for y in 0..dims.height {
            for x in 0..dims.width {
                for c in 0..dims.channels {
                    let ix = raster.index(x, y, c);
                    raster.data[ix] = f(x, y, c);
                }
            }
        }
        raster
    }

    /// Copies an `image` crate buffer.
    pub fn from_image_buffer<P>(buffer: &ImageBuffer<P, Vec<T>>) -> Self
    where
        P: Pixel<Subpixel = T>,
    {
        let dims = Dims::new(
            buffer.width() as usize,
            buffer.height() as usize,
            usize::from(P::CHANNEL_COUNT),
        );
        Self {
            dims,
            data: buffer.as_raw().clone(),
        }
    }

    /// Moves the samples into an `image` crate buffer.
    ///
    /// Fails if `P` does not have the same number of channels as the raster.
    pub fn into_image_buffer<P>(self) -> Result<ImageBuffer<P, Vec<T>>, RasterError>
    where
        P: Pixel<Subpixel = T>,
    {
        let expected = self.dims.width * self.dims.height * usize::from(P::CHANNEL_COUNT);
        let actual = self.data.len();
        ImageBuffer::from_raw(self.dims.width as u32, self.dims.height as u32, self.data)
            .filter(|_| actual == expected)
            .ok_or(RasterError::BufferSize { expected, actual })
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn width(&self) -> usize {
        self.dims.width
    }

    pub fn height(&self) -> usize {
        self.dims.height
    }

    pub fn channels(&self) -> usize {
        self.dims.channels
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<T> {
        self.data
    }

    fn index(&self, x: usize, y: usize, c: usize) -> usize {
        (x + y * self.dims.width) * self.dims.channels + c
    }

    /// All channels of pixel `(x, y)`.
    ///
    /// Panics if the pixel is outside the raster.
    pub fn pixel(&self, x: usize, y: usize) -> &[T] {
        let start = self.index(x, y, 0);
        &self.data[start..start + self.dims.channels]
    }

    pub fn get(&self, x: usize, y: usize, c: usize) -> Option<T> {
        if x < self.dims.width && y < self.dims.height && c < self.dims.channels {
            Some(self.data[self.index(x, y, c)])
        } else {
            None
        }
    }

    pub fn put(&mut self, x: usize, y: usize, c: usize, value: T) {
        let ix = self.index(x, y, c);
        self.data[ix] = value;
    }
}

/// A [`Raster`] of any sample type the `image` crate can decode.
#[derive(Debug, Clone, PartialEq, From)]
pub enum DynamicRaster {
    U8(Raster<u8>),
    U16(Raster<u16>),
    F32(Raster<f32>),
}

impl DynamicRaster {
    /// Copies a decoded image, keeping its sample type and channel count.
    pub fn from_dynamic(image: &DynamicImage) -> Result<Self, RasterError> {
        Ok(match image {
            DynamicImage::ImageLuma8(b) => Raster::from_image_buffer(b).into(),
            DynamicImage::ImageLumaA8(b) => Raster::from_image_buffer(b).into(),
            DynamicImage::ImageRgb8(b) => Raster::from_image_buffer(b).into(),
            DynamicImage::ImageRgba8(b) => Raster::from_image_buffer(b).into(),
            DynamicImage::ImageLuma16(b) => Raster::from_image_buffer(b).into(),
            DynamicImage::ImageLumaA16(b) => Raster::from_image_buffer(b).into(),
            DynamicImage::ImageRgb16(b) => Raster::from_image_buffer(b).into(),
            DynamicImage::ImageRgba16(b) => Raster::from_image_buffer(b).into(),
            DynamicImage::ImageRgb32F(b) => Raster::from_image_buffer(b).into(),
            DynamicImage::ImageRgba32F(b) => Raster::from_image_buffer(b).into(),
            other => return Err(RasterError::UnsupportedImage(format!("{:?}", other.color()))),
        })
    }

    /// Converts back into a `DynamicImage` chosen by sample type and channel count.
    pub fn into_dynamic(self) -> Result<DynamicImage, RasterError> {
        use image::{Luma, LumaA, Rgb, Rgba};
        Ok(match self {
            Self::U8(r) => match r.channels() {
                1 => DynamicImage::ImageLuma8(r.into_image_buffer::<Luma<u8>>()?),
                2 => DynamicImage::ImageLumaA8(r.into_image_buffer::<LumaA<u8>>()?),
                3 => DynamicImage::ImageRgb8(r.into_image_buffer::<Rgb<u8>>()?),
                4 => DynamicImage::ImageRgba8(r.into_image_buffer::<Rgba<u8>>()?),
                n => return Err(unsupported("u8", n)),
            },
            Self::U16(r) => match r.channels() {
                1 => DynamicImage::ImageLuma16(r.into_image_buffer::<Luma<u16>>()?),
                2 => DynamicImage::ImageLumaA16(r.into_image_buffer::<LumaA<u16>>()?),
                3 => DynamicImage::ImageRgb16(r.into_image_buffer::<Rgb<u16>>()?),
                4 => DynamicImage::ImageRgba16(r.into_image_buffer::<Rgba<u16>>()?),
                n => return Err(unsupported("u16", n)),
            },
            Self::F32(r) => match r.channels() {
                3 => DynamicImage::ImageRgb32F(r.into_image_buffer::<Rgb<f32>>()?),
                4 => DynamicImage::ImageRgba32F(r.into_image_buffer::<Rgba<f32>>()?),
                n => return Err(unsupported("f32", n)),
            },
        })
    }

    pub fn dims(&self) -> Dims {
        match self {
            Self::U8(r) => r.dims(),
            Self::U16(r) => r.dims(),
            Self::F32(r) => r.dims(),
        }
    }
}

fn unsupported(sample: &str, channels: usize) -> RasterError {
    RasterError::UnsupportedImage(format!("{} channels of {}", channels, sample))
}
