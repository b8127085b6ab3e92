//! Channel mixing and sample-rate conversion for captured audio

use rubato::{FftFixedIn, Resampler};

use super::flac_encoder::TARGET_SAMPLE_RATE;

const CHUNK_FRAMES: usize = 1024;

/// Average interleaved channels into one
pub fn mix_to_mono(samples: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks(usize::from(channels))
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| i32::from(s)).sum();
            (sum / frame.len() as i32) as i16
        })
        .collect()
}

/// Convert mono samples from `source_rate` to [`TARGET_SAMPLE_RATE`]
pub fn to_target_rate(samples: &[i16], source_rate: u32) -> Result<Vec<i16>, String> {
    if source_rate == TARGET_SAMPLE_RATE || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let input: Vec<f32> = samples.iter().map(|&s| f32::from(s) / 32768.0).collect();
    let expected_len =
        (input.len() as f64 * f64::from(TARGET_SAMPLE_RATE) / f64::from(source_rate)).ceil() as usize;

    let mut resampler = FftFixedIn::<f32>::new(
        source_rate as usize,
        TARGET_SAMPLE_RATE as usize,
        CHUNK_FRAMES,
        2,
        1,
    )
    .map_err(|e| format!("Resampler init failed: {}", e))?;

    let mut output = Vec::with_capacity(expected_len);
    let mut pos = 0;

    while pos < input.len() {
        let needed = resampler.input_frames_next();
        let end = (pos + needed).min(input.len());

        let mut chunk = input[pos..end].to_vec();
        chunk.resize(needed, 0.0);

        let resampled = resampler
            .process(&[chunk], None)
            .map_err(|e| format!("Resampling failed: {}", e))?;

        output.extend(resampled[0].iter().map(|&s| (s * 32767.0) as i16));
        pos = end;
    }

    output.truncate(expected_len);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_passes_through() {
        assert_eq!(mix_to_mono(&[1, 2, 3], 1), vec![1, 2, 3]);
    }

    #[test]
    fn stereo_is_averaged() {
        assert_eq!(mix_to_mono(&[100, 200, 300, 400], 2), vec![150, 350]);
    }

    #[test]
    fn target_rate_is_untouched() {
        let samples = vec![5i16; 100];
        assert_eq!(to_target_rate(&samples, TARGET_SAMPLE_RATE).unwrap(), samples);
    }

    #[test]
    fn downsample_halves_length() {
        let samples = vec![0i16; 32000];
        let out = to_target_rate(&samples, 32000).unwrap();
        assert_eq!(out.len(), 16000);
    }
}
