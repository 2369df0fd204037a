use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::export::write_file;

/// Dense `T x N` activity matrix `z[t][i]`, stored row-major in one flat buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    steps: usize,
    neurons: usize,
    data: Vec<f64>,
}

/// Summary of a trajectory, for logging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryStats {
    /// Number of `(t, i)` entries with strictly positive activity.
    pub active_events: usize,
    pub mean_activity: f64,
    pub peak_activity: f64,
    /// Rows in which no neuron is active.
    pub silent_steps: usize,
}

impl Trajectory {
    /// All-zero trajectory.
    pub fn zeros(steps: usize, neurons: usize) -> Self {
        Self {
            steps,
            neurons,
            data: vec![0.0; steps * neurons],
        }
    }

    /// Wrap an existing row-major buffer.
    pub fn from_vec(steps: usize, neurons: usize, data: Vec<f64>) -> Result<Self> {
        let expected = steps * neurons;
        if data.len() != expected {
            return Err(Error::ShapeMismatch {
                expected,
                found: data.len(),
            });
        }
        Ok(Self {
            steps,
            neurons,
            data,
        })
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn neurons(&self) -> usize {
        self.neurons
    }

    #[inline]
    pub fn get(&self, t: usize, i: usize) -> f64 {
        self.data[t * self.neurons + i]
    }

    #[inline]
    pub fn row(&self, t: usize) -> &[f64] {
        &self.data[t * self.neurons..(t + 1) * self.neurons]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        // chunks_exact(0) panics; a zero-width trajectory has no meaningful rows.
        self.data.chunks_exact(self.neurons.max(1))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Split into the completed row `t - 1` and the row `t` being written.
    pub(crate) fn previous_and_current_mut(&mut self, t: usize) -> (&[f64], &mut [f64]) {
        let n = self.neurons;
        let (done, rest) = self.data.split_at_mut(t * n);
        (&done[(t - 1) * n..], &mut rest[..n])
    }

    pub fn stats(&self) -> TrajectoryStats {
        let mut active_events = 0;
        let mut peak_activity: f64 = 0.0;
        let mut sum = 0.0;
        for &z in &self.data {
            if z > 0.0 {
                active_events += 1;
            }
            peak_activity = peak_activity.max(z);
            sum += z;
        }
        let silent_steps = self.rows().filter(|r| r.iter().all(|&z| z <= 0.0)).count();

        TrajectoryStats {
            active_events,
            mean_activity: if self.data.is_empty() {
                0.0
            } else {
                sum / self.data.len() as f64
            },
            peak_activity,
            silent_steps,
        }
    }

    /// Write one value per line, time-major then neuron index, six fractional digits.
    pub fn write_activity<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for &z in &self.data {
            writeln!(w, "{z:.6}")?;
        }
        Ok(())
    }

    /// Read a trajectory written by [`Trajectory::write_activity`].
    ///
    /// Exactly `steps * neurons` lines are expected; each must hold one finite,
    /// non-negative number. Anything else is rejected with the offending line number.
    pub fn read_activity<R: BufRead>(r: R, steps: usize, neurons: usize) -> Result<Self> {
        let expected = steps * neurons;
        let mut data = Vec::with_capacity(expected);
        let mut found = 0;

        for (idx, line) in r.lines().enumerate() {
            let line = line.map_err(|e| Error::io("<activity>", e))?;
            found += 1;
            if found > expected {
                // Keep counting so the error reports the real size.
                continue;
            }
            data.push(parse_value(&line, idx + 1)?);
        }

        if found != expected {
            return Err(Error::ShapeMismatch { expected, found });
        }
        Self::from_vec(steps, neurons, data)
    }

    pub fn save_activity(&self, path: impl AsRef<Path>) -> Result<()> {
        write_file(path.as_ref(), |w| self.write_activity(w))
    }

    pub fn load_activity(path: impl AsRef<Path>, steps: usize, neurons: usize) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        Self::read_activity(BufReader::new(file), steps, neurons).map_err(|e| match e {
            Error::Io { source, .. } => Error::io(path, source),
            other => other,
        })
    }
}

fn parse_value(line: &str, line_no: usize) -> Result<f64> {
    let token = line.trim();
    if token.is_empty() {
        return Err(Error::Malformed {
            line: line_no,
            reason: "blank line".into(),
        });
    }
    let value: f64 = token.parse().map_err(|_| Error::Malformed {
        line: line_no,
        reason: format!("not a number: {token:?}"),
    })?;
    if !value.is_finite() {
        return Err(Error::Malformed {
            line: line_no,
            reason: format!("not finite: {token}"),
        });
    }
    if value < 0.0 {
        return Err(Error::Malformed {
            line: line_no,
            reason: format!("negative activity: {token}"),
        });
    }
    Ok(value)
}
