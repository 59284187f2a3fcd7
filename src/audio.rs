use crate::error::{PrepError, Result};
use log::{debug, warn};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use symphonia::core::audio::{AudioBufferRef, SampleBuffer, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, ReadOnlySource};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};

/// Sample rate every input waveform must have.
pub const REQUIRED_SAMPLE_RATE: u32 = 16_000;

/// How decoded samples are turned into `f32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleScale {
    /// Keep the stored sample value: a 16-bit `-1234` stays `-1234.0`.
    #[default]
    Raw,
    /// Scale integer PCM into `[-1, 1]`.
    Normalized,
}

fn decode_err(path: &Path, msg: impl Into<String>) -> PrepError {
    PrepError::Decode {
        path: path.to_path_buf(),
        msg: msg.into(),
    }
}

/// Loads a mono waveform, failing before any decoding if its rate is not `required_rate`.
pub fn load_waveform<P: AsRef<Path>>(path: P, required_rate: u32, scale: SampleScale) -> Result<Vec<f32>> {
    let path = path.as_ref();
    debug!("Loading audio from {}", path.display());

    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(ReadOnlySource::new(BufReader::new(file))), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let meta_opts: MetadataOptions = Default::default();
    let fmt_opts: FormatOptions = Default::default();

    let probed = get_probe()
        .format(&hint, mss, &fmt_opts, &meta_opts)
        .map_err(|e| decode_err(path, format!("failed to probe audio format: {}", e)))?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| decode_err(path, "no supported audio tracks found"))?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let sample_rate = codec_params
        .sample_rate
        .ok_or_else(|| decode_err(path, "sample rate is not declared"))?;
    if sample_rate != required_rate {
        return Err(PrepError::SampleRateMismatch {
            path: path.to_path_buf(),
            expected: required_rate,
            found: sample_rate,
        });
    }
    if let Some(channels) = codec_params.channels {
        if channels.count() != 1 {
            return Err(PrepError::UnsupportedChannels {
                path: path.to_path_buf(),
                channels: channels.count(),
            });
        }
    }

    let dec_opts: DecoderOptions = Default::default();
    let mut decoder = get_codecs()
        .make(&codec_params, &dec_opts)
        .map_err(|e| decode_err(path, format!("failed to create decoder: {}", e)))?;

    let mut samples = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => {
                debug!("Decoder reset required");
                decoder.reset();
                continue;
            }
            Err(e) => return Err(decode_err(path, e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder
            .decode(&packet)
            .map_err(|e| decode_err(path, format!("decode error: {}", e)))?;

        let channels = decoded.spec().channels.count();
        if channels != 1 {
            return Err(PrepError::UnsupportedChannels {
                path: path.to_path_buf(),
                channels,
            });
        }
        if decoded.frames() == 0 {
            continue;
        }

        match scale {
            SampleScale::Raw => push_raw(decoded, &mut samples),
            SampleScale::Normalized => {
                let spec = *decoded.spec();
                let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                sample_buf.copy_interleaved_ref(decoded);
                samples.extend_from_slice(sample_buf.samples());
            }
        }
    }

    if samples.is_empty() {
        warn!("{} decoded to zero samples", path.display());
    }
    debug!("Loaded {} samples", samples.len());
    Ok(samples)
}

/// Appends the first channel of `decoded` keeping stored sample values.
fn push_raw(decoded: AudioBufferRef<'_>, out: &mut Vec<f32>) {
    match decoded {
        AudioBufferRef::U8(buf) => out.extend(buf.chan(0).iter().map(|&s| s as f32)),
        AudioBufferRef::U16(buf) => out.extend(buf.chan(0).iter().map(|&s| s as f32)),
        AudioBufferRef::U24(buf) => out.extend(buf.chan(0).iter().map(|s| s.inner() as f32)),
        AudioBufferRef::U32(buf) => out.extend(buf.chan(0).iter().map(|&s| s as f32)),
        AudioBufferRef::S8(buf) => out.extend(buf.chan(0).iter().map(|&s| s as f32)),
        AudioBufferRef::S16(buf) => out.extend(buf.chan(0).iter().map(|&s| s as f32)),
        AudioBufferRef::S24(buf) => out.extend(buf.chan(0).iter().map(|s| s.inner() as f32)),
        AudioBufferRef::S32(buf) => out.extend(buf.chan(0).iter().map(|&s| s as f32)),
        AudioBufferRef::F32(buf) => out.extend_from_slice(buf.chan(0)),
        AudioBufferRef::F64(buf) => out.extend(buf.chan(0).iter().map(|&s| s as f32)),
    }
}
