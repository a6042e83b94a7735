use std::fs::File;
use std::io::Read;

use flate2::read::GzDecoder;

use crate::tensor::Tensor;

const IMAGE_MAGIC: u32 = 2051;
const LABEL_MAGIC: u32 = 2049;

/// MNIST idx dataset, pixels normalized to roughly [-0.5, 0.5) by
/// v/256 - 0.5. Paths ending in .gz are gunzipped on the fly.
#[derive(Debug)]
pub struct MnistData {
    pub images: Vec<Vec<f64>>,
    pub labels: Vec<u8>,
}

impl MnistData {
    pub fn load_from_files(
        images_path: &str,
        labels_path: &str,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let images = Self::load_images(images_path)?;
        let labels = Self::load_labels(labels_path)?;

        if images.len() != labels.len() {
            return Err(format!(
                "Number of images ({}) and labels ({}) don't match",
                images.len(),
                labels.len()
            )
            .into());
        }

        Ok(MnistData { images, labels })
    }

    fn open_reader(path: &str) -> Result<Box<dyn Read>, Box<dyn std::error::Error>> {
        let file = File::open(path).map_err(|e| format!("Failed to open '{}': {}", path, e))?;
        if path.ends_with(".gz") {
            Ok(Box::new(GzDecoder::new(file)))
        } else {
            Ok(Box::new(file))
        }
    }

    fn read_u32(reader: &mut dyn Read) -> Result<u32, Box<dyn std::error::Error>> {
        let mut bytes = [0u8; 4];
        reader.read_exact(&mut bytes)?;
        Ok(u32::from_be_bytes(bytes))
    }

    pub fn load_images(path: &str) -> Result<Vec<Vec<f64>>, Box<dyn std::error::Error>> {
        let mut reader = Self::open_reader(path)?;

        let magic = Self::read_u32(reader.as_mut())?;
        if magic != IMAGE_MAGIC {
            return Err(format!(
                "Invalid magic number for images: {} (expected {})",
                magic, IMAGE_MAGIC
            )
            .into());
        }

        let num_images = Self::read_u32(reader.as_mut())? as usize;
        let rows = Self::read_u32(reader.as_mut())? as usize;
        let cols = Self::read_u32(reader.as_mut())? as usize;

        let image_size = rows * cols;
        let mut images = Vec::with_capacity(num_images);
        for i in 0..num_images {
            let mut image_data = vec![0u8; image_size];
            reader
                .read_exact(&mut image_data)
                .map_err(|e| format!("Failed to read image {}: {}", i, e))?;

            let image: Vec<f64> = image_data
                .iter()
                .map(|&pixel| pixel as f64 / 256.0 - 0.5)
                .collect();
            images.push(image);
        }

        Ok(images)
    }

    pub fn load_labels(path: &str) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        let mut reader = Self::open_reader(path)?;

        let magic = Self::read_u32(reader.as_mut())?;
        if magic != LABEL_MAGIC {
            return Err(format!(
                "Invalid magic number for labels: {} (expected {})",
                magic, LABEL_MAGIC
            )
            .into());
        }

        let num_labels = Self::read_u32(reader.as_mut())? as usize;
        let mut labels = vec![0u8; num_labels];
        reader.read_exact(&mut labels)?;

        Ok(labels)
    }

    /// Groups the samples into (input, one-hot label) tensor pairs of
    /// `batch_size` rows each. A trailing partial batch is dropped.
    pub fn batches(
        &self,
        batch_size: usize,
        num_classes: usize,
    ) -> Result<Vec<(Tensor, Tensor)>, Box<dyn std::error::Error>> {
        if batch_size == 0 {
            return Err("Batch size must be at least 1".into());
        }
        let num_batches = self.images.len() / batch_size;
        let mut batches = Vec::with_capacity(num_batches);

        for batch_idx in 0..num_batches {
            let start = batch_idx * batch_size;
            let mut input_data = Vec::with_capacity(batch_size * self.images[start].len());
            let mut label_data = vec![0.0; batch_size * num_classes];

            for sample_idx in 0..batch_size {
                let image = &self.images[start + sample_idx];
                input_data.extend_from_slice(image);

                let class = self.labels[start + sample_idx] as usize;
                if class >= num_classes {
                    return Err(format!(
                        "Label {} out of range for {} classes",
                        class, num_classes
                    )
                    .into());
                }
                label_data[sample_idx * num_classes + class] = 1.0;
            }

            let width = input_data.len() / batch_size;
            let inputs = Tensor::new(input_data, batch_size, width)?;
            let labels = Tensor::new(label_data, batch_size, num_classes)?;
            batches.push((inputs, labels));
        }

        Ok(batches)
    }
}
