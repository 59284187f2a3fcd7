use crate::dataset::{FileRange, SlicedData};
use crate::driver::{Channel, Split};
use crate::error::{PrepError, Result};
use crate::slicer::{WindowConfig, WindowTable};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const DATASET_EXTENSION: &str = "bin";

/// On-disk layout of one (split, channel) artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetFile {
    pub split: String,
    pub channel: String,
    pub sample_rate: u32,
    pub window_size: u64,
    pub stride: f64,
    pub minlength: u64,
    pub rows: u64,
    /// Row-major `rows x window_size` windows.
    pub feat_data: Vec<f32>,
    /// `[begin, end)` window rows per input file.
    pub dfi: Vec<[u64; 2]>,
}

impl DatasetFile {
    pub fn new(
        split: Split,
        channel: Channel,
        sample_rate: u32,
        window: &WindowConfig,
        windows: &WindowTable,
        dfi: &[FileRange],
    ) -> Self {
        Self {
            split: split.as_str().to_string(),
            channel: channel.as_str().to_string(),
            sample_rate,
            window_size: window.window_size as u64,
            stride: window.stride,
            minlength: window.minlength as u64,
            rows: windows.rows() as u64,
            feat_data: windows.as_slice().to_vec(),
            dfi: dfi.iter().map(|r| [r.begin as u64, r.end as u64]).collect(),
        }
    }

    fn check_shape(&self, path: &Path) -> Result<()> {
        let expected = self.rows.checked_mul(self.window_size).ok_or_else(|| PrepError::Decode {
            path: path.to_path_buf(),
            msg: format!("shape {} x {} overflows", self.rows, self.window_size),
        })?;
        if self.feat_data.len() as u64 != expected {
            return Err(PrepError::Decode {
                path: path.to_path_buf(),
                msg: format!(
                    "feat_data holds {} values, expected {} x {}",
                    self.feat_data.len(),
                    self.rows,
                    self.window_size
                ),
            });
        }
        let rows = self.rows as usize;
        let declared = self.dfi.last().map_or(0, |r| r[1] as usize);
        if declared != rows {
            return Err(PrepError::SizeMismatch {
                split: self.split.clone(),
                channel: self.channel.clone(),
                rows,
                declared,
            });
        }
        Ok(())
    }

    pub fn into_sliced(self) -> SlicedData {
        let window_size = self.window_size as usize;
        SlicedData {
            windows: WindowTable::from_raw(window_size, self.feat_data),
            dfi: self
                .dfi
                .into_iter()
                .map(|[begin, end]| FileRange {
                    begin: begin as usize,
                    end: end as usize,
                })
                .collect(),
        }
    }
}

/// `<dir>/<channel>_<split>_<tag>_<window_size>.bin`
pub fn output_path(dir: &Path, channel: Channel, split: Split, tag: &str, window_size: usize) -> PathBuf {
    dir.join(format!(
        "{}_{}_{}_{}.{}",
        channel.as_str(),
        split.as_str(),
        tag,
        window_size,
        DATASET_EXTENSION
    ))
}

pub fn save_dataset<P: AsRef<Path>>(path: P, dataset: &DatasetFile) -> Result<()> {
    let path = path.as_ref();
    info!(
        "Saving {} windows of {} samples to {}",
        dataset.rows,
        dataset.window_size,
        path.display()
    );
    let mut writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut writer, dataset)?;
    writer.flush()?;
    Ok(())
}

pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<DatasetFile> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let dataset: DatasetFile = bincode::deserialize_from(reader)?;
    dataset.check_shape(path)?;
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slicer::slice_signal;
    use tempfile::TempDir;

    fn sample() -> DatasetFile {
        let window = WindowConfig {
            window_size: 4,
            stride: 0.5,
            minlength: 2,
        };
        let signal: Vec<f32> = (1..=10).map(|x| x as f32).collect();
        let windows = slice_signal(&signal, &window);
        let dfi = [FileRange { begin: 0, end: 5 }];
        DatasetFile::new(Split::Test, Channel::Noisy, 16_000, &window, &windows, &dfi)
    }

    #[test]
    fn test_output_path_naming() {
        let path = output_path(Path::new("/data"), Channel::Clean, Split::Train, "segan1d", 256);
        assert_eq!(path, PathBuf::from("/data/clean_train_segan1d_256.bin"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("noisy_test_segan1d_4.bin");
        let dataset = sample();
        save_dataset(&path, &dataset).unwrap();

        let loaded = load_dataset(&path).unwrap();
        assert_eq!(loaded, dataset);
        assert_eq!(loaded.dfi, vec![[0, 5]]);

        let sliced = loaded.into_sliced();
        assert_eq!(sliced.rows(), 5);
        assert_eq!(sliced.windows.row(4), &[9.0, 10.0, 0.0, 0.0]);
    }

    #[test]
    fn test_load_rejects_inconsistent_index() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.bin");
        let mut dataset = sample();
        dataset.dfi = vec![[0, 4]];
        save_dataset(&path, &dataset).unwrap();

        let err = load_dataset(&path).unwrap_err();
        assert!(matches!(err, PrepError::SizeMismatch { rows: 5, declared: 4, .. }));
    }

    #[test]
    fn test_load_rejects_overflowing_shape() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corrupt.bin");
        let mut dataset = sample();
        dataset.rows = u64::MAX;
        dataset.window_size = 2;
        save_dataset(&path, &dataset).unwrap();

        let err = load_dataset(&path).unwrap_err();
        assert!(matches!(err, PrepError::Decode { .. }));
    }

    #[test]
    fn test_load_rejects_short_feat_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("short.bin");
        let mut dataset = sample();
        dataset.feat_data.truncate(7);
        save_dataset(&path, &dataset).unwrap();

        let err = load_dataset(&path).unwrap_err();
        assert!(matches!(err, PrepError::Decode { .. }));
    }
}
