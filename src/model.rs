use std::io::Cursor;
use std::path::Path;

use image::{imageops, imageops::FilterType, DynamicImage, ImageFormat, Rgb};
use ndarray::prelude::*;
use nshare::AsNdarray3;
use ort::value::TensorRef;
use ort::{
    execution_providers::{CUDAExecutionProvider, TensorRTExecutionProvider},
    session::{builder::SessionBuilder, Session},
};
use parking_lot::Mutex;

use crate::{
    errors::{ProductCropError, Result},
    imageops_ext::{self, AlphaMask},
    traits::Segmenter,
};

/// Production [`Segmenter`] backed by a pretrained ONNX matting model.
///
/// The model takes a square RGB tensor and returns a per-pixel foreground
/// probability mask, which becomes the alpha channel of the output image.
/// The session is locked per inference; concurrency lives at the batch
/// level where whole images are independent.
pub struct OnnxSegmenter {
    pub image_size: u32,
    input_name: String,
    output_name: String,
    session: Mutex<Session>,
}

impl OnnxSegmenter {
    pub fn new(model_path: &Path, device_id: i32) -> Result<Self> {
        let mut session = SessionBuilder::new()
            .map_err(|e| ProductCropError::Segmentation {
                operation: "session builder initialization".to_string(),
                source: Box::new(e),
            })?
            .with_execution_providers([
                TensorRTExecutionProvider::default()
                    .with_device_id(device_id)
                    .build(),
                CUDAExecutionProvider::default()
                    .with_device_id(device_id)
                    .build(),
            ])
            .map_err(|e| ProductCropError::Segmentation {
                operation: "execution provider setup".to_string(),
                source: Box::new(e),
            })?
            .with_memory_pattern(true)
            .map_err(|e| ProductCropError::Segmentation {
                operation: "memory pattern setup".to_string(),
                source: Box::new(e),
            })?
            .commit_from_file(model_path)
            .map_err(|e| ProductCropError::Segmentation {
                operation: format!("model file loading: {}", model_path.display()),
                source: Box::new(e),
            })?;

        let input_name = session.inputs[0].name.clone();
        let output_name = session.outputs[0].name.clone();
        let image_size = session.inputs[0]
            .input_type
            .tensor_shape()
            .ok_or_else(|| ProductCropError::Segmentation {
                operation: "model input shape lookup".to_string(),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "tensor shape is not available",
                )),
            })?[2] as u32;

        // initialize model
        let data = Array4::<f32>::zeros((1, 3, image_size as usize, image_size as usize));
        session
            .run(ort::inputs![input_name.as_str() => TensorRef::from_array_view(&data).map_err(|e| ProductCropError::Segmentation {
                operation: "warm-up tensor creation".to_string(),
                source: Box::new(e),
            })?])
            .map_err(|e| ProductCropError::Segmentation {
                operation: "model warm-up run".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            image_size,
            input_name,
            output_name,
            session: Mutex::new(session),
        })
    }

    pub fn predict(&self, tensor: ArrayView4<f32>) -> Result<Array4<f32>> {
        let mut binding = self.session.lock();
        let outputs = binding.run(
            ort::inputs![self.input_name.as_str() => TensorRef::from_array_view(&tensor.as_standard_layout())?],
        )?;
        Ok(outputs[self.output_name.as_str()]
            .try_extract_array::<f32>()?
            .into_dimensionality::<Ix4>()?
            .to_owned())
    }

    /// Resize into the model square, pad with black, build an NCHW tensor.
    ///
    /// The returned crop `[x, y, w, h]` records where the resized image sits
    /// inside the padded square so the mask can be cut back out.
    fn preprocess(&self, img: &DynamicImage) -> Result<(Array4<f32>, [u32; 4])> {
        let resized = img
            .resize(self.image_size, self.image_size, FilterType::Lanczos3)
            .into_rgb8();
        let (w, h) = resized.dimensions();

        let (padded, (x, y)) =
            imageops_ext::pad_center(&resized, self.image_size, self.image_size, Rgb([0, 0, 0]))
                .ok_or_else(|| ProductCropError::Segmentation {
                    operation: "input padding".to_string(),
                    source: Box::new(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        "resized image exceeds the model input square",
                    )),
                })?;

        let view = padded.as_ndarray3();
        let tensor = view
            .slice(s![NewAxis, ..;-1, .., ..])
            .map(|v| f32::from(*v) / 255.0);

        Ok((tensor, [x, y, w, h]))
    }

    /// Cut the mask back out of the model square and resize it to the
    /// original image dimensions.
    fn postprocess_mask(
        &self,
        mask: Array4<f32>,
        crop: [u32; 4],
        width: u32,
        height: u32,
    ) -> Result<AlphaMask> {
        let [x, y, w, h] = crop;
        let mask = AlphaMask::from_raw(
            self.image_size,
            self.image_size,
            mask.into_raw_vec_and_offset().0,
        )
        .ok_or_else(|| ProductCropError::Segmentation {
            operation: "mask buffer conversion".to_string(),
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "mask tensor does not match the model input square",
            )),
        })?;

        let mask = imageops::crop_imm(&mask, x, y, w, h).to_image();
        Ok(imageops::resize(&mask, width, height, FilterType::Lanczos3))
    }
}

impl Segmenter for OnnxSegmenter {
    fn segment(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let img = image::load_from_memory(bytes).map_err(|e| ProductCropError::Segmentation {
            operation: "input decoding".to_string(),
            source: Box::new(e),
        })?;
        let (width, height) = (img.width(), img.height());

        let (tensor, crop) = self.preprocess(&img)?;
        let mask = self.predict(tensor.view())?;
        let mask = self.postprocess_mask(mask, crop, width, height)?;

        let rgba = imageops_ext::apply_alpha_mask(&img.into_rgb8(), &mask)?;

        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(rgba)
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| ProductCropError::Segmentation {
                operation: "output encoding".to_string(),
                source: Box::new(e),
            })?;
        Ok(buffer.into_inner())
    }
}
