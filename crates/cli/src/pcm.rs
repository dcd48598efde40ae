//! Pull-based PCM sample source: a fixed-depth byte buffer in front of any
//! [`Read`]er, yielding one normalized `f64` sample at a time.

use std::io::{self, Read};

const SAMPLE_SIZE: usize = 2; // 16-bit little-endian signed PCM

/// One sample pulled from the stream, or the end of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub value: f64,
    pub eof: bool,
}

/// Buffers raw bytes out of `reader` and demultiplexes them into signed
/// 16-bit samples, normalized to `[-1, +1)`.
pub struct PcmSampler {
    reader: Box<dyn Read + Send>,
    sample_rate: u32,
    buf: Vec<u8>,
    filled: usize,
    taken: usize,
    hit_eof: bool,
    samples_read: u64,
}

impl PcmSampler {
    pub fn new(reader: Box<dyn Read + Send>, sample_rate: u32, chunk_size: usize) -> Self {
        Self {
            reader,
            sample_rate,
            buf: vec![0u8; SAMPLE_SIZE * chunk_size.max(1)],
            filled: 0,
            taken: 0,
            hit_eof: false,
            samples_read: 0,
        }
    }

    fn read_more(&mut self) -> io::Result<()> {
        if self.hit_eof {
            return Ok(());
        }
        let capacity = self.buf.len() - self.filled;
        if capacity == 0 {
            return Ok(());
        }
        let received = self.reader.read(&mut self.buf[self.filled..])?;
        if received == 0 {
            self.hit_eof = true;
        } else {
            self.filled += received;
        }
        Ok(())
    }

    fn supply(&mut self) -> io::Result<()> {
        if self.taken == self.filled {
            self.taken = 0;
            self.filled = 0;
        }
        if self.filled - self.taken < SAMPLE_SIZE {
            self.read_more()?;
        }
        Ok(())
    }

    /// Pull the next sample out of the stream. `eof` is set once the
    /// buffer can no longer assemble a whole sample from what's left.
    pub fn demand_next(&mut self) -> io::Result<Sample> {
        self.supply()?;

        if self.filled - self.taken >= SAMPLE_SIZE {
            let raw = i16::from_le_bytes([self.buf[self.taken], self.buf[self.taken + 1]]);
            self.taken += SAMPLE_SIZE;
            self.samples_read += 1;
            Ok(Sample {
                value: raw as f64 / 32768.0,
                eof: false,
            })
        } else {
            Ok(Sample { value: 0.0, eof: true })
        }
    }

    pub fn sample_time(&self) -> f64 {
        self.samples_read as f64 / self.sample_rate as f64
    }

    pub fn sample_count(&self) -> u64 {
        self.samples_read
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demand_next_decodes_little_endian_i16() {
        let bytes = 1000i16.to_le_bytes();
        let mut sampler = PcmSampler::new(Box::new(&bytes[..]), 44100, 8);
        let sample = sampler.demand_next().unwrap();
        assert!(!sample.eof);
        assert!((sample.value - 1000.0 / 32768.0).abs() < 1e-12);
    }

    #[test]
    fn demand_next_reports_eof_on_exhaustion() {
        let bytes = 1i16.to_le_bytes();
        let mut sampler = PcmSampler::new(Box::new(&bytes[..]), 44100, 8);
        sampler.demand_next().unwrap();
        let next = sampler.demand_next().unwrap();
        assert!(next.eof);
    }

    #[test]
    fn sample_count_and_time_track_reads() {
        let bytes = [0u8; 8]; // four samples of silence
        let mut sampler = PcmSampler::new(Box::new(&bytes[..]), 4, 8);
        for _ in 0..4 {
            sampler.demand_next().unwrap();
        }
        assert_eq!(sampler.sample_count(), 4);
        assert!((sampler.sample_time() - 1.0).abs() < 1e-12);
    }
}
