//! Converts a period, in samples, to a musical pitch: a fractional MIDI
//! note number, and from there a note name/octave/cents display triple.

use crate::error::{ReceptError, ReceptResult};

const A4_MIDI_NOTE: f64 = 69.0;

const NOTE_NAMES: [&str; 12] = [
    "C /B#", "C#/Db", "D /D ", "D#/Eb", "E /Fb", "F /E#", "F#/Gb", "G /G ", "G#/Ab", "A /A ", "A#/Bb", "B /Cb",
];

/// Fractional MIDI note number for a period sampled at `sample_rate`,
/// relative to a reference pitch `a4` in Hz.
pub fn midi_note(sample_rate: f64, period: f64, a4: f64) -> ReceptResult<f64> {
    if period <= 0.0 {
        return Err(ReceptError::NumericEdge("period must be positive to derive a note"));
    }
    let hz = sample_rate / period;
    Ok(12.0 * (hz / a4).ln() / std::f64::consts::LN_2 + A4_MIDI_NOTE)
}

/// A musical pitch resolved to octave, name and cents offset from the
/// nearest semitone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub octave: i32,
    pub name: &'static str,
    pub cents: f64,
}

/// Resolve a period into a displayable note. Fails if the period is
/// non-positive, or if rounding pushes the note index outside the
/// chromatic scale.
pub fn note(sample_rate: f64, period: f64, a4: f64) -> ReceptResult<Note> {
    let n = midi_note(sample_rate, period, a4)?;
    let note_number = (n + 0.5).floor() as i32;
    let octave = note_number / 12 - 1;
    let octave_note = note_number % 12;
    let cents = 100.0 * (((n + 0.5) % 1.0) - 0.5);

    if !(0..12).contains(&octave_note) {
        return Err(ReceptError::NumericEdge("note index outside the chromatic scale"));
    }

    Ok(Note {
        octave,
        name: NOTE_NAMES[octave_note as usize],
        cents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_resolves_to_a_natural() {
        let n = note(44100.0, 44100.0 / 440.0, 440.0).unwrap();
        assert_eq!(n.octave, 4);
        assert_eq!(n.name, "A /A ");
        assert!(n.cents.abs() < 1e-6);
    }

    #[test]
    fn non_positive_period_is_rejected() {
        assert!(midi_note(44100.0, 0.0, 440.0).is_err());
        assert!(note(44100.0, -1.0, 440.0).is_err());
    }

    #[test]
    fn octave_up_doubles_frequency() {
        let a4 = note(44100.0, 44100.0 / 440.0, 440.0).unwrap();
        let a5 = note(44100.0, 44100.0 / 880.0, 440.0).unwrap();
        assert_eq!(a5.octave, a4.octave + 1);
        assert_eq!(a5.name, a4.name);
    }
}
