use crate::audio::{self, SampleScale};
use crate::error::{PrepError, Result};
use crate::slicer::{self, WindowConfig, WindowTable};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Half-open range of window table rows belonging to one input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRange {
    pub begin: usize,
    pub end: usize,
}

impl FileRange {
    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }
}

/// Windows of every file of a list, plus where each file's windows live.
#[derive(Debug, Clone, PartialEq)]
pub struct SlicedData {
    pub windows: WindowTable,
    pub dfi: Vec<FileRange>,
}

impl SlicedData {
    pub fn rows(&self) -> usize {
        self.windows.rows()
    }

    /// Row count the file index claims, i.e. the last range's end.
    pub fn declared_rows(&self) -> usize {
        self.dfi.last().map_or(0, |r| r.end)
    }

    /// Windows that came from the `index`-th file.
    pub fn file_windows(&self, index: usize) -> impl Iterator<Item = &[f32]> {
        let range = self.dfi[index];
        (range.begin..range.end).map(move |row| self.windows.row(row))
    }
}

/// One assembler run: which folder to read and which names to read from it.
#[derive(Debug, Clone)]
pub struct SliceJob {
    pub wavfolder: PathBuf,
    pub filenames: PathBuf,
    pub window: WindowConfig,
    pub sample_rate: u32,
    pub scale: SampleScale,
}

/// Reads a file list, one waveform name per line.
pub fn read_file_list<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    content
        .lines()
        .enumerate()
        .map(|(i, line)| {
            let name = line.trim_end_matches('\r');
            if name.trim().is_empty() {
                Err(PrepError::InvalidFileList {
                    path: path.to_path_buf(),
                    line: i + 1,
                })
            } else {
                Ok(name.to_string())
            }
        })
        .collect()
}

/// Windows every waveform `load` returns for `names`, in order.
pub fn assemble<F>(names: &[String], window: &WindowConfig, mut load: F) -> Result<SlicedData>
where
    F: FnMut(&str) -> Result<Vec<f32>>,
{
    window.validate()?;

    let mut windows = WindowTable::new(window.window_size);
    let mut dfi = Vec::with_capacity(names.len());
    let mut dfi_begin = 0;

    for (ind, name) in names.iter().enumerate() {
        if ind % 10 == 0 {
            info!("Processing {} of {} files.", ind, names.len());
        }
        let signal = load(name)?;
        let produced = slicer::slice_into(&signal, window, &mut windows);
        dfi.push(FileRange {
            begin: dfi_begin,
            end: dfi_begin + produced,
        });
        dfi_begin += produced;
    }

    Ok(SlicedData { windows, dfi })
}

/// Reads and slices every waveform of `job.filenames` from `job.wavfolder`.
pub fn prepare_sliced_data(job: &SliceJob) -> Result<SlicedData> {
    let names = read_file_list(&job.filenames)?;
    info!("Reading from {}", job.wavfolder.display());
    info!("The folder has {} files.", names.len());

    assemble(&names, &job.window, |name| {
        audio::load_waveform(job.wavfolder.join(name), job.sample_rate, job.scale)
    })
}
