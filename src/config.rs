use crate::audio::SampleScale;
use crate::slicer::{default_minlength, WindowConfig};
use knuffel::Decode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Contents of `config.kdl`. Every field is optional and overrides the defaults.
#[derive(Decode, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[knuffel(child)]
    pub general: Option<GeneralConfig>,
    #[knuffel(child)]
    pub window: Option<WindowSection>,
}

#[derive(Decode, Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[knuffel(property(name = "data-folder"))]
    pub data_folder: Option<String>,
    #[knuffel(property(name = "out-dir"))]
    pub out_dir: Option<String>,
    #[knuffel(property)]
    pub tag: Option<String>,
    #[knuffel(property)]
    pub normalize: Option<bool>,
}

#[derive(Decode, Debug, Clone, Default, Serialize, Deserialize)]
pub struct WindowSection {
    #[knuffel(property)]
    pub size: Option<u32>,
    #[knuffel(property)]
    pub stride: Option<f64>,
    #[knuffel(property)]
    pub minlength: Option<u32>,
}

impl ConfigFile {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config = knuffel::parse("config.kdl", content)?;
        Ok(config)
    }
}

/// Resolved settings for a full four-way batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepConfig {
    pub data_folder: PathBuf,
    pub out_dir: PathBuf,
    pub tag: String,
    pub window_size: usize,
    pub stride: f64,
    /// `None` follows `window_size` (half a window, rounded up).
    pub minlength: Option<usize>,
    pub normalize: bool,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            data_folder: PathBuf::from("./data/"),
            out_dir: PathBuf::from("./data/"),
            tag: "segan1d".to_string(),
            window_size: 256,
            stride: 0.5,
            minlength: None,
            normalize: false,
        }
    }
}

impl PrepConfig {
    /// Layers a parsed config file over the defaults.
    pub fn from_file(file: ConfigFile) -> Self {
        let mut config = Self::default();
        if let Some(general) = file.general {
            if let Some(dir) = general.data_folder {
                config.data_folder = PathBuf::from(dir);
            }
            if let Some(dir) = general.out_dir {
                config.out_dir = PathBuf::from(dir);
            }
            if let Some(tag) = general.tag {
                config.tag = tag;
            }
            if let Some(normalize) = general.normalize {
                config.normalize = normalize;
            }
        }
        if let Some(window) = file.window {
            if let Some(size) = window.size {
                config.window_size = size as usize;
            }
            if let Some(stride) = window.stride {
                config.stride = stride;
            }
            if let Some(minlength) = window.minlength {
                config.minlength = Some(minlength as usize);
            }
        }
        config
    }

    pub fn window(&self) -> WindowConfig {
        WindowConfig {
            window_size: self.window_size,
            stride: self.stride,
            minlength: self.minlength.unwrap_or_else(|| default_minlength(self.window_size)),
        }
    }

    pub fn scale(&self) -> SampleScale {
        if self.normalize {
            SampleScale::Normalized
        } else {
            SampleScale::Raw
        }
    }
}
