// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Audio analysis: musical key, tempo and loudness of a waveform.

pub mod key;
pub mod loudness;
pub mod onset;
pub mod spectrum;
pub mod tempo;

use std::fmt;

use stratum_dsp::{analyze_audio, AnalysisConfig, AnalysisResult};
use tracing::debug;

use crate::audio::Waveform;

pub use key::KeyEstimate;
pub use loudness::DEFAULT_QUIET_THRESHOLD_DB;

/// Default STFT hop length in samples.
pub const DEFAULT_HOP_LENGTH: usize = 512;

/// Detects the tempo of the waveform in BPM. 0 if there is no detectable tempo.
///
/// Clips too short for stratum-dsp to settle on a tempo get the onset envelope
/// estimate instead.
pub fn detect_tempo(waveform: &Waveform) -> u32 {
    let mono = waveform.to_mono();
    let detected = run_detection(&mono, waveform.sample_rate())
        .and_then(|result| tempo::from_bpm(result.bpm));
    match detected {
        Some(bpm) => bpm,
        None => {
            let bpm = tempo::estimate_tempo(&mono, waveform.sample_rate(), DEFAULT_HOP_LENGTH);
            debug!(bpm, "Estimated tempo from the onset envelope");
            bpm
        }
    }
}

/// Detects the musical key of the waveform.
pub fn detect_key(waveform: &Waveform) -> KeyEstimate {
    run_detection(&waveform.to_mono(), waveform.sample_rate())
        .map(|result| key::from_detected(&result.key, result.key_confidence))
        .unwrap_or(KeyEstimate::Unknown)
}

/// Whether the waveform's overall level is below the threshold in dBFS.
pub fn is_quiet(waveform: &Waveform, threshold_db: f32) -> bool {
    loudness::is_quiet(waveform.samples(), threshold_db)
}

/// Runs stratum-dsp's key and BPM detection. The quiet check owns loudness, so the
/// signal is analyzed as is. None for silent input or when detection fails.
fn run_detection(mono: &[f32], sample_rate: u32) -> Option<AnalysisResult> {
    if loudness::dbfs(mono) == f32::NEG_INFINITY {
        return None;
    }
    let config = AnalysisConfig {
        enable_normalization: false,
        enable_silence_trimming: false,
        ..Default::default()
    };
    match analyze_audio(mono, sample_rate, config) {
        Ok(result) => Some(result),
        Err(e) => {
            debug!(err = %e, "Key and BPM detection failed");
            None
        }
    }
}

/// Everything the extraction pipeline needs to know about a stem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Analysis {
    pub key: KeyEstimate,
    pub tempo: u32,
    pub dbfs: f32,
    pub quiet: bool,
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "key {}, tempo {} BPM, loudness {:.1} dBFS{}",
            self.key,
            self.tempo,
            self.dbfs,
            if self.quiet { " (quiet)" } else { "" }
        )
    }
}

/// Runs key, tempo and loudness analysis with a fixed quiet threshold.
#[derive(Debug, Clone)]
pub struct Analyzer {
    quiet_threshold_db: f32,
}

impl Default for Analyzer {
    fn default() -> Self {
        Analyzer::new(DEFAULT_QUIET_THRESHOLD_DB)
    }
}

impl Analyzer {
    pub fn new(quiet_threshold_db: f32) -> Analyzer {
        Analyzer { quiet_threshold_db }
    }

    /// Analyzes the waveform. Key and tempo are only estimated for waveforms that are
    /// loud enough to be kept.
    pub fn analyze(&self, waveform: &Waveform) -> Analysis {
        let dbfs = loudness::dbfs(waveform.samples());
        if is_quiet(waveform, self.quiet_threshold_db) {
            debug!(dbfs, "Skipping key and tempo detection for quiet audio");
            return Analysis {
                key: KeyEstimate::Unknown,
                tempo: 0,
                dbfs,
                quiet: true,
            };
        }

        let analysis = Analysis {
            key: detect_key(waveform),
            tempo: detect_tempo(waveform),
            dbfs,
            quiet: false,
        };
        debug!(
            key = %analysis.key,
            tempo = analysis.tempo,
            dbfs = analysis.dbfs,
            "Analyzed audio"
        );
        analysis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::TempoRule;
    use crate::testutil::audio_test_utils::{generate_chord, generate_click_track};

    fn key(s: &str) -> KeyEstimate {
        KeyEstimate::Known(s.parse().unwrap())
    }

    #[test]
    fn test_free_functions() {
        let empty = Waveform::new(Vec::new(), 1, 44100);
        assert_eq!(detect_tempo(&empty), 0);
        assert_eq!(detect_key(&empty), KeyEstimate::Unknown);
        assert!(is_quiet(&empty, DEFAULT_QUIET_THRESHOLD_DB));

        let clicks = Waveform::new(generate_click_track(120.0, 44100, 6.0), 1, 44100);
        let tempo = detect_tempo(&clicks);
        assert!(TempoRule::default().matches(tempo, 120), "got {} BPM", tempo);
    }

    #[test]
    fn test_chord_keys() {
        // C6 E6 G6 C7
        let major = Waveform::new(generate_chord(&[84, 88, 91, 96], 0.2, 44100, 2.0), 1, 44100);
        assert_eq!(detect_key(&major), key("8B"));

        // A5 C6 E6 A6
        let minor = Waveform::new(generate_chord(&[81, 84, 88, 93], 0.2, 44100, 2.0), 1, 44100);
        assert_eq!(detect_key(&minor), key("8A"));
    }

    #[test]
    fn test_silence_has_no_key() {
        let silence = Waveform::new(vec![0.0; 22050], 1, 44100);
        assert_eq!(detect_key(&silence), KeyEstimate::Unknown);
        assert_eq!(detect_tempo(&silence), 0);
    }

    #[test]
    fn test_analyze_chord() {
        let chord = generate_chord(&[84, 88, 91, 96], 0.2, 44100, 2.0);
        // Duplicate into stereo.
        let stereo: Vec<f32> = chord.iter().flat_map(|s| [*s, *s]).collect();
        let analysis = Analyzer::default().analyze(&Waveform::new(stereo, 2, 44100));

        assert!(!analysis.quiet);
        assert_eq!(analysis.key, key("8B"));
        assert!(analysis.dbfs > -20.0);
    }

    #[test]
    fn test_short_rhythmic_clip_has_a_tempo() {
        let clicks = Waveform::new(generate_click_track(120.0, 44100, 0.5), 1, 44100);
        let analysis = Analyzer::default().analyze(&clicks);
        assert!(!analysis.quiet);
        assert!(analysis.tempo > 0);
    }

    #[test]
    fn test_analyze_quiet() {
        let silence = Waveform::new(vec![0.0; 44100], 1, 44100);
        let analysis = Analyzer::default().analyze(&silence);
        assert!(analysis.quiet);
        assert_eq!(analysis.key, KeyEstimate::Unknown);
        assert_eq!(analysis.tempo, 0);
        assert_eq!(analysis.to_string(), "key 0A, tempo 0 BPM, loudness -inf dBFS (quiet)");
    }

    #[test]
    fn test_custom_threshold() {
        let chord = generate_chord(&[84, 88, 91], 0.2, 44100, 1.0);
        let waveform = Waveform::new(chord, 1, 44100);
        assert!(!Analyzer::default().analyze(&waveform).quiet);
        assert!(Analyzer::new(0.0).analyze(&waveform).quiet);
    }
}
