//! Runs the assembler over every (split, channel) pair and writes the results.

use crate::audio::REQUIRED_SAMPLE_RATE;
use crate::config::PrepConfig;
use crate::dataset::{self, SliceJob, SlicedData};
use crate::error::{PrepError, Result};
use crate::storage::{self, DatasetFile};
use log::info;
use std::fmt;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Test,
}

impl Split {
    /// Processing order of the batch.
    pub const ALL: [Split; 2] = [Split::Test, Split::Train];

    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Clean,
    Noisy,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Clean => "clean",
            Channel::Noisy => "noisy",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to produce the two artifacts of one split.
#[derive(Debug, Clone)]
pub struct SplitPlan {
    pub split: Split,
    pub clean: SliceJob,
    pub noisy: SliceJob,
    pub clean_out: PathBuf,
    pub noisy_out: PathBuf,
}

/// What was written for one split.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitSummary {
    pub split: Split,
    pub windows: usize,
    pub files: usize,
    pub clean_out: PathBuf,
    pub noisy_out: PathBuf,
}

/// `<data_folder>/<channel>_<split>set_wav_16kHz`
pub fn wav_folder(config: &PrepConfig, split: Split, channel: Channel) -> PathBuf {
    config
        .data_folder
        .join(format!("{}_{}set_wav_16kHz", channel.as_str(), split.as_str()))
}

/// `<data_folder>/<split>_wav.txt`, shared by both channels of a split.
pub fn file_list(config: &PrepConfig, split: Split) -> PathBuf {
    config.data_folder.join(format!("{}_wav.txt", split.as_str()))
}

pub fn plan(config: &PrepConfig) -> Vec<SplitPlan> {
    let window = config.window();
    let job = |split: Split, channel: Channel| SliceJob {
        wavfolder: wav_folder(config, split, channel),
        filenames: file_list(config, split),
        window,
        sample_rate: REQUIRED_SAMPLE_RATE,
        scale: config.scale(),
    };
    let out = |split: Split, channel: Channel| {
        storage::output_path(&config.out_dir, channel, split, &config.tag, window.window_size)
    };

    Split::ALL
        .iter()
        .map(|&split| SplitPlan {
            split,
            clean: job(split, Channel::Clean),
            noisy: job(split, Channel::Noisy),
            clean_out: out(split, Channel::Clean),
            noisy_out: out(split, Channel::Noisy),
        })
        .collect()
}

fn check_declared(split: Split, channel: Channel, data: &SlicedData) -> Result<()> {
    if data.rows() != data.declared_rows() {
        return Err(PrepError::SizeMismatch {
            split: split.to_string(),
            channel: channel.to_string(),
            rows: data.rows(),
            declared: data.declared_rows(),
        });
    }
    Ok(())
}

/// Checks that both channels of a split line up before anything is written.
pub fn validate_split(split: Split, clean: &SlicedData, noisy: &SlicedData) -> Result<()> {
    if clean.rows() != noisy.rows() {
        return Err(PrepError::ChannelSizeMismatch {
            split: split.to_string(),
            clean: clean.rows(),
            noisy: noisy.rows(),
        });
    }
    check_declared(split, Channel::Clean, clean)?;
    check_declared(split, Channel::Noisy, noisy)?;
    Ok(())
}

pub fn run_split(plan: &SplitPlan) -> Result<SplitSummary> {
    info!("Preparing {} split", plan.split);
    let clean = dataset::prepare_sliced_data(&plan.clean)?;
    let noisy = dataset::prepare_sliced_data(&plan.noisy)?;
    validate_split(plan.split, &clean, &noisy)?;

    // Both artifacts carry the index of the last run.
    let dfi = &noisy.dfi;
    let window = &plan.noisy.window;
    let rate = plan.noisy.sample_rate;

    for (channel, data, out) in [
        (Channel::Clean, &clean, &plan.clean_out),
        (Channel::Noisy, &noisy, &plan.noisy_out),
    ] {
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = DatasetFile::new(plan.split, channel, rate, window, &data.windows, dfi);
        storage::save_dataset(out, &file)?;
    }

    info!(
        "{}: {} windows from {} files",
        plan.split,
        noisy.rows(),
        dfi.len()
    );
    Ok(SplitSummary {
        split: plan.split,
        windows: noisy.rows(),
        files: dfi.len(),
        clean_out: plan.clean_out.clone(),
        noisy_out: plan.noisy_out.clone(),
    })
}

/// Runs the test split, then the train split. Stops at the first error.
pub fn run_all(config: &PrepConfig) -> Result<Vec<SplitSummary>> {
    config.window().validate()?;
    plan(config).iter().map(run_split).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::FileRange;
    use crate::slicer::WindowTable;
    use std::path::Path;

    fn sliced(rows: usize, dfi: &[(usize, usize)]) -> SlicedData {
        SlicedData {
            windows: WindowTable::from_raw(2, vec![0.5; rows * 2]),
            dfi: dfi.iter().map(|&(begin, end)| FileRange { begin, end }).collect(),
        }
    }

    #[test]
    fn test_plan_layout() {
        let config = PrepConfig {
            data_folder: PathBuf::from("/d"),
            out_dir: PathBuf::from("/o"),
            ..PrepConfig::default()
        };
        let plans = plan(&config);
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].split, Split::Test);
        assert_eq!(plans[1].split, Split::Train);

        let test = &plans[0];
        assert_eq!(test.clean.wavfolder, Path::new("/d/clean_testset_wav_16kHz"));
        assert_eq!(test.noisy.wavfolder, Path::new("/d/noisy_testset_wav_16kHz"));
        assert_eq!(test.clean.filenames, Path::new("/d/test_wav.txt"));
        assert_eq!(test.clean.filenames, test.noisy.filenames);
        assert_eq!(test.clean_out, Path::new("/o/clean_test_segan1d_256.bin"));
        assert_eq!(plans[1].noisy_out, Path::new("/o/noisy_train_segan1d_256.bin"));
        assert_eq!(test.clean.sample_rate, 16_000);
    }

    #[test]
    fn test_validate_accepts_matching_channels() {
        let a = sliced(8, &[(0, 5), (5, 8)]);
        let b = sliced(8, &[(0, 5), (5, 8)]);
        assert!(validate_split(Split::Train, &a, &b).is_ok());
    }

    #[test]
    fn test_validate_channel_mismatch() {
        let a = sliced(8, &[(0, 5), (5, 8)]);
        let b = sliced(7, &[(0, 5), (5, 7)]);
        let err = validate_split(Split::Test, &a, &b).unwrap_err();
        assert!(matches!(err, PrepError::ChannelSizeMismatch { clean: 8, noisy: 7, .. }));
    }

    #[test]
    fn test_validate_size_mismatch() {
        let a = sliced(8, &[(0, 5), (5, 8)]);
        let b = sliced(8, &[(0, 5), (5, 6)]);
        let err = validate_split(Split::Test, &a, &b).unwrap_err();
        match err {
            PrepError::SizeMismatch { channel, rows, declared, .. } => {
                assert_eq!(channel, "noisy");
                assert_eq!(rows, 8);
                assert_eq!(declared, 6);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_window_rejected_before_reading() {
        let config = PrepConfig {
            data_folder: PathBuf::from("/nonexistent"),
            stride: 0.0,
            ..PrepConfig::default()
        };
        assert!(matches!(run_all(&config), Err(PrepError::InvalidConfig(_))));
    }
}
