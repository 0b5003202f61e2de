//! Microphone capture and WAV encoding.
//!
//! Captures PCM audio from a named or default input device, folds
//! multi-channel frames to mono, and encodes the result as an uncompressed
//! WAV for upload. The input stream exists only between `start` and `stop`;
//! both `stop` and drop release the device.

use crate::session::{CaptureSource, CapturedAudio};
use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use hound::WavWriter;
use std::io::Cursor;
use std::path::Path;
use std::sync::{Arc, Mutex};

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Records mono audio from the configured input device.
///
/// The device is acquired lazily on `start`, so constructing a recorder never
/// touches the hardware and a failed acquisition surfaces through the session
/// state machine rather than at startup.
pub struct AudioRecorder {
    /// Actual capture sample rate, updated from the device on start
    sample_rate: u32,
    /// Captured mono samples
    samples: Arc<Mutex<Vec<i16>>>,
    /// Live input stream; `None` whenever not recording
    stream: Option<cpal::Stream>,
    /// First runtime error reported by the stream, if any
    stream_error: Arc<Mutex<Option<String>>>,
    /// Device name, index, or "default"
    device_name: String,
}

impl AudioRecorder {
    /// Creates a recorder for the given device spec and requested rate.
    /// The actual rate may differ; it is read back from the device on start.
    pub fn new(requested_sample_rate: u32, device_name: String) -> Self {
        Self {
            sample_rate: requested_sample_rate,
            samples: Arc::new(Mutex::new(Vec::new())),
            stream: None,
            stream_error: Arc::new(Mutex::new(None)),
            device_name,
        }
    }

    /// Drops the input stream, releasing the capture device.
    fn release(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!("Capture stream released");
        }
    }
}

impl CaptureSource for AudioRecorder {
    fn start(&mut self) -> Result<()> {
        // A new recording starts from an empty buffer
        self.samples.lock().unwrap().clear();
        *self.stream_error.lock().unwrap() = None;

        let device = suppress_alsa_warnings(|| {
            let host = cpal::default_host();
            if self.device_name == "default" {
                host.default_input_device()
                    .ok_or_else(|| anyhow!("no audio input device available"))
            } else {
                find_device_by_name(&host, &self.device_name)
            }
        })?;

        let device_label = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());
        tracing::info!("Recording device: {}", device_label);

        let device_config = device.default_input_config()?;
        let device_sample_rate = device_config.sample_rate().0;
        let num_channels = device_config.channels() as usize;

        if device_sample_rate != self.sample_rate {
            tracing::warn!(
                "Requested sample rate {}Hz but device uses {}Hz. Recording at device rate.",
                self.sample_rate,
                device_sample_rate
            );
        }
        self.sample_rate = device_sample_rate;

        let samples_arc = Arc::clone(&self.samples);
        let error_arc = Arc::clone(&self.stream_error);

        let stream = device.build_input_stream(
            &device_config.into(),
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                let mut samples = samples_arc.lock().unwrap();
                fold_to_mono(data, num_channels, &mut samples);
            },
            move |err| {
                tracing::error!("Audio stream error: {}", err);
                let mut slot = error_arc.lock().unwrap();
                if slot.is_none() {
                    *slot = Some(err.to_string());
                }
            },
            None,
        )?;

        stream.play()?;
        self.stream = Some(stream);

        tracing::debug!(
            "Capture started: {}Hz, {} channels folded to mono",
            device_sample_rate,
            num_channels
        );
        Ok(())
    }

    fn stop(&mut self) -> Result<CapturedAudio> {
        self.release();

        if let Some(err) = self.stream_error.lock().unwrap().take() {
            return Err(anyhow!("audio stream failed: {err}"));
        }

        let samples = self.samples.lock().unwrap().clone();
        let duration_secs = samples.len() as f32 / self.sample_rate as f32;
        tracing::info!(
            "Capture stopped: {:.2}s ({} samples at {}Hz)",
            duration_secs,
            samples.len(),
            self.sample_rate
        );

        Ok(CapturedAudio {
            samples,
            sample_rate: self.sample_rate,
        })
    }

    fn samples(&self) -> Vec<i16> {
        self.samples.lock().unwrap().clone()
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl Drop for AudioRecorder {
    fn drop(&mut self) {
        self.release();
    }
}

/// Folds interleaved frames down to mono by averaging the channels of each
/// frame, appending to `out`.
fn fold_to_mono(data: &[i16], num_channels: usize, out: &mut Vec<i16>) {
    match num_channels {
        0 => {}
        1 => out.extend_from_slice(data),
        2 => {
            for chunk in data.chunks_exact(2) {
                let left = chunk[0] as i32;
                let right = chunk[1] as i32;
                out.push(((left + right) / 2) as i16);
            }
        }
        _ => {
            for chunk in data.chunks_exact(num_channels) {
                let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
                out.push((sum / num_channels as i32) as i16);
            }
        }
    }
}

/// Encodes mono i16 samples as an in-memory PCM WAV, ready for upload.
///
/// # Errors
/// - If no samples were captured
/// - If WAV encoding fails
pub fn encode_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>> {
    if samples.is_empty() {
        return Err(anyhow!("recording contains no audio"));
    }

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

/// Writes already-encoded WAV bytes to disk (kept for `retry`).
pub fn write_wav(path: &Path, wav: &[u8]) -> Result<()> {
    std::fs::write(path, wav)?;
    tracing::debug!("Recording saved: {} ({} bytes)", path.display(), wav.len());
    Ok(())
}

/// Finds an audio input device by name or numeric index.
fn find_device_by_name(host: &cpal::Host, device_spec: &str) -> Result<cpal::Device> {
    if let Ok(index) = device_spec.parse::<usize>() {
        let devices: Vec<_> = host
            .input_devices()
            .map_err(|e| anyhow!("failed to enumerate devices: {e}"))?
            .collect();

        if index < devices.len() {
            return Ok(devices.into_iter().nth(index).unwrap());
        }
        return Err(anyhow!(
            "device index {} is out of range (0-{})",
            index,
            devices.len().saturating_sub(1)
        ));
    }

    let devices = host
        .input_devices()
        .map_err(|e| anyhow!("failed to enumerate devices: {e}"))?;

    for device in devices {
        if let Ok(name) = device.name() {
            if name == device_spec {
                return Ok(device);
            }
        }
    }

    Err(anyhow!(
        "audio input device '{device_spec}' not found. Use 'ovt list-devices' to see available devices."
    ))
}

/// Temporarily redirects stderr to /dev/null to suppress ALSA library warnings on Linux.
/// On non-Linux platforms, this is a no-op since ALSA doesn't exist.
#[cfg(target_os = "linux")]
pub(crate) fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let dev_null = OpenOptions::new()
        .write(true)
        .open("/dev/null")
        .map_err(|e| anyhow!("failed to open /dev/null: {e}"))?;

    let dev_null_fd = dev_null.as_raw_fd();

    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return Err(anyhow!("failed to duplicate stderr"));
    }

    let redirect_result = unsafe { libc::dup2(dev_null_fd, libc::STDERR_FILENO) };
    if redirect_result == -1 {
        unsafe { libc::close(old_stderr) };
        return Err(anyhow!("failed to redirect stderr"));
    }

    let result = f();

    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_passes_mono_through() {
        let mut out = Vec::new();
        fold_to_mono(&[1, 2, 3], 1, &mut out);
        assert_eq!(out, vec![1, 2, 3]);
    }

    #[test]
    fn fold_averages_stereo_pairs() {
        let mut out = Vec::new();
        fold_to_mono(&[100, 200, -50, 50], 2, &mut out);
        assert_eq!(out, vec![150, 0]);
    }

    #[test]
    fn fold_averages_multichannel_frames() {
        let mut out = Vec::new();
        fold_to_mono(&[30, 60, 90], 3, &mut out);
        assert_eq!(out, vec![60]);
    }

    #[test]
    fn encode_produces_readable_wav() {
        let wav = encode_wav(&[0, 1000, -1000, 32767], 16000).unwrap();
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");

        let reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 16000);
        assert_eq!(reader.len(), 4);
    }

    #[test]
    fn encode_rejects_empty_recording() {
        assert!(encode_wav(&[], 16000).is_err());
    }
}
