//! Stream selection: encoder outputs -> ordered package inputs.

use packline_models::{
    AudioStream, EncodeJob, JobStatus, Output, OutputType, PackageInput, StreamKeyTemplates,
    VideoStream,
};

use crate::error::{CoreError, CoreResult};
use crate::template::{stream_key, KeyValues};

/// Transform a successful encode job's outputs into an ordered list of typed,
/// keyed package inputs.
///
/// Selection policy:
/// - every `VideoFile` output is a video candidate, in input order;
/// - audio candidates are `AudioFile` outputs whose first audio stream has
///   exactly 2 channels;
/// - when no dedicated stereo audio output exists, the first `VideoFile`
///   output carrying an embedded stereo stream is taken as the sole audio
///   candidate (encoders that mux audio into one rendition);
/// - video inputs always precede audio inputs, and audio indices are assigned
///   after all video indices are known.
pub fn select_inputs(
    job: &EncodeJob,
    templates: &StreamKeyTemplates,
) -> CoreResult<Vec<PackageInput>> {
    if job.status != JobStatus::Successful {
        return Err(CoreError::invalid_job_state("encode job is not successful"));
    }
    let outputs = job
        .output
        .as_deref()
        .filter(|outputs| !outputs.is_empty())
        .ok_or_else(|| CoreError::invalid_job_state("encode job has no output"))?;

    let video: Vec<(&Output, Option<&VideoStream>)> = outputs
        .iter()
        .filter(|output| output.kind == OutputType::VideoFile)
        .map(|output| (output, output.video_streams.first()))
        .collect();

    let mut audio: Vec<(&Output, Option<&AudioStream>)> = outputs
        .iter()
        .filter(|output| output.kind == OutputType::AudioFile)
        .map(|output| (output, output.audio_streams.first()))
        .filter(|(_, stream)| stream.is_some_and(|s| s.channels == 2))
        .collect();

    if audio.is_empty() {
        // Fallback: first video rendition with muxed stereo audio, if any.
        let muxed = outputs
            .iter()
            .filter(|output| output.kind == OutputType::VideoFile)
            .find(|output| output.has_stereo_audio());
        if let Some(output) = muxed {
            audio.push((output, output.audio_streams.iter().find(|a| a.channels == 2)));
        }
    }

    let video_count = video.len();
    let mut inputs = Vec::with_capacity(video_count + audio.len());

    for (video_idx, (output, stream)) in video.into_iter().enumerate() {
        let bitrate_kb = stream.map_or(0, |s| round_kb(s.bitrate));
        let key = stream_key(
            &templates.video,
            KeyValues {
                video_idx,
                audio_idx: 0,
                total_idx: video_idx,
                bitrate_kb,
            },
        );
        inputs.push(PackageInput::video(key, output.file.clone()));
    }

    for (audio_idx, (output, stream)) in audio.into_iter().enumerate() {
        let bitrate_kb = stream.map_or(0, |s| round_kb(s.bitrate));
        let key = stream_key(
            &templates.audio,
            KeyValues {
                video_idx: video_count,
                audio_idx,
                total_idx: video_count + audio_idx,
                bitrate_kb,
            },
        );
        inputs.push(PackageInput::audio(key, output.file.clone()));
    }

    Ok(inputs)
}

fn round_kb(bitrate: u64) -> u64 {
    (bitrate as f64 / 1000.0).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use packline_models::EncodeInput;

    fn video_output(file: &str, bitrate: u64) -> Output {
        Output {
            kind: OutputType::VideoFile,
            format: "mp4".to_string(),
            file: file.to_string(),
            file_size: 3_757_912,
            overall_bitrate: bitrate,
            video_streams: vec![VideoStream {
                codec: "h264".to_string(),
                bitrate,
            }],
            audio_streams: vec![],
        }
    }

    fn audio_output(file: &str, channels: u32) -> Output {
        Output {
            kind: OutputType::AudioFile,
            format: "mp4".to_string(),
            file: file.to_string(),
            file_size: 3000,
            overall_bitrate: 29_800,
            video_streams: vec![],
            audio_streams: vec![AudioStream {
                codec: "aac".to_string(),
                bitrate: 128_000,
                channels,
            }],
        }
    }

    fn job_with(outputs: Vec<Output>) -> EncodeJob {
        EncodeJob {
            id: "e5e76304-744c-41d6-85f7-69007b3b1a65".to_string(),
            external_id: None,
            status: JobStatus::Successful,
            output: Some(outputs),
            inputs: vec![EncodeInput {
                uri: "https://assets.test.com/test-asset.mp4".to_string(),
            }],
        }
    }

    #[test]
    fn no_audio_output_yields_no_audio_input() {
        let job = job_with(vec![video_output("/data/out/test3_x264_3100.mp4", 2_979_615)]);
        let inputs = select_inputs(&job, &StreamKeyTemplates::default()).unwrap();
        assert_eq!(
            inputs,
            vec![PackageInput::video("0_2980", "/data/out/test3_x264_3100.mp4")]
        );
    }

    #[test]
    fn video_idx_and_audio_idx_templates() {
        let job = job_with(vec![
            video_output("/data/out/test3_x264_3100.mp4", 2_979_615),
            video_output("/data/out/test3_x264_2300.mp4", 2_379_615),
            audio_output("/data/out/test3_STEREO.mp4", 2),
        ]);
        let templates = StreamKeyTemplates {
            video: "$VIDEOIDX$".to_string(),
            audio: "audio-$AUDIOIDX$".to_string(),
        };
        let inputs = select_inputs(&job, &templates).unwrap();
        assert_eq!(
            inputs,
            vec![
                PackageInput::video("0", "/data/out/test3_x264_3100.mp4"),
                PackageInput::video("1", "/data/out/test3_x264_2300.mp4"),
                PackageInput::audio("audio-0", "/data/out/test3_STEREO.mp4"),
            ]
        );
    }

    #[test]
    fn total_idx_and_bitrate_templates() {
        let job = job_with(vec![
            video_output("/data/out/test3_x264_3100.mp4", 2_979_615),
            video_output("/data/out/test3_x264_2300.mp4", 2_379_615),
            audio_output("/data/out/test3_STEREO.mp4", 2),
        ]);
        let templates = StreamKeyTemplates {
            video: "$VIDEOIDX$_$BITRATE$".to_string(),
            audio: "$TOTALIDX$".to_string(),
        };
        let keys: Vec<String> = select_inputs(&job, &templates)
            .unwrap()
            .into_iter()
            .map(|i| i.key)
            .collect();
        assert_eq!(keys, vec!["0_2980", "1_2380", "2"]);
    }

    #[test]
    fn non_stereo_audio_outputs_are_skipped() {
        let job = job_with(vec![
            video_output("/data/out/v.mp4", 2_000_000),
            audio_output("/data/out/surround.mp4", 6),
        ]);
        let inputs = select_inputs(&job, &StreamKeyTemplates::default()).unwrap();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].kind, packline_models::InputType::Video);
    }

    #[test]
    fn multiple_stereo_audio_outputs_are_all_kept() {
        let job = job_with(vec![
            audio_output("/data/out/a0.mp4", 2),
            audio_output("/data/out/a1.mp4", 2),
        ]);
        let inputs = select_inputs(&job, &StreamKeyTemplates::default()).unwrap();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].key, "0");
        assert_eq!(inputs[1].key, "1");
    }

    #[test]
    fn fallback_takes_first_muxed_stereo_video_only() {
        let mut muxed_a = video_output("/data/out/muxed_a.mp4", 2_979_615);
        muxed_a.audio_streams = vec![AudioStream {
            codec: "aac".to_string(),
            bitrate: 96_000,
            channels: 2,
        }];
        let mut muxed_b = video_output("/data/out/muxed_b.mp4", 2_379_615);
        muxed_b.audio_streams = muxed_a.audio_streams.clone();

        let job = job_with(vec![muxed_a, muxed_b]);
        let templates = StreamKeyTemplates {
            video: "$VIDEOIDX$".to_string(),
            audio: "audio-$AUDIOIDX$".to_string(),
        };
        let inputs = select_inputs(&job, &templates).unwrap();
        // Two video inputs, exactly one fallback audio input from the first match.
        assert_eq!(
            inputs,
            vec![
                PackageInput::video("0", "/data/out/muxed_a.mp4"),
                PackageInput::video("1", "/data/out/muxed_b.mp4"),
                PackageInput::audio("audio-0", "/data/out/muxed_a.mp4"),
            ]
        );
    }

    #[test]
    fn fallback_skips_first_stream_when_not_stereo() {
        let mut muxed = video_output("/data/out/muxed.mp4", 2_979_615);
        muxed.audio_streams = vec![
            AudioStream {
                codec: "aac".to_string(),
                bitrate: 256_000,
                channels: 6,
            },
            AudioStream {
                codec: "aac".to_string(),
                bitrate: 96_000,
                channels: 2,
            },
        ];
        let job = job_with(vec![muxed]);
        let templates = StreamKeyTemplates {
            video: "$VIDEOIDX$".to_string(),
            audio: "$BITRATE$".to_string(),
        };
        let inputs = select_inputs(&job, &templates).unwrap();
        // Key bitrate comes from the stereo stream, not the surround one.
        assert_eq!(inputs[1].key, "96");
    }

    #[test]
    fn output_without_streams_yields_bitrate_zero() {
        let mut output = video_output("/data/out/v.mp4", 1_000_000);
        output.video_streams.clear();
        let job = job_with(vec![output]);
        let inputs = select_inputs(&job, &StreamKeyTemplates::default()).unwrap();
        assert_eq!(inputs[0].key, "0_0");
    }

    #[test]
    fn fails_when_job_not_successful() {
        let mut job = job_with(vec![video_output("/data/out/v.mp4", 1)]);
        job.status = JobStatus::Failed;
        assert!(matches!(
            select_inputs(&job, &StreamKeyTemplates::default()),
            Err(CoreError::InvalidJobState(_))
        ));
    }

    #[test]
    fn fails_when_output_missing_or_empty() {
        let mut job = job_with(vec![]);
        assert!(matches!(
            select_inputs(&job, &StreamKeyTemplates::default()),
            Err(CoreError::InvalidJobState(_))
        ));
        job.output = None;
        assert!(matches!(
            select_inputs(&job, &StreamKeyTemplates::default()),
            Err(CoreError::InvalidJobState(_))
        ));
    }
}
