//! Pairwise cosine similarity between time points of a trajectory.

use std::fs;
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use image::{GrayImage, ImageFormat, Luma};
use tracing::{debug, info};

use crate::dynamics::ExecutionTier;
use crate::error::{Error, Result};
use crate::trajectory::Trajectory;

/// Number of gray levels in the rendered matrix (8-bit).
pub const GRAY_LEVELS: usize = 256;

/// Default distance between plotted reference rows.
pub const DEFAULT_PROFILE_STRIDE: usize = 200;

/// Symmetric `T x T` matrix of cosine similarities, each in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    size: usize,
    data: Vec<f64>,
}

impl SimilarityMatrix {
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, t1: usize, t2: usize) -> f64 {
        self.data[t1 * self.size + t2]
    }

    #[inline]
    pub fn row(&self, t: usize) -> &[f64] {
        &self.data[t * self.size..(t + 1) * self.size]
    }

    /// Render as a `T x T` grayscale image; pixel `(x, y)` shows `S[x][y]`.
    pub fn to_image(&self) -> GrayImage {
        let size = self.size as u32;
        GrayImage::from_fn(size, size, |x, y| {
            Luma([gray_level(self.get(x as usize, y as usize))])
        })
    }

    /// Rows `0, stride, 2*stride, ...` below `T`.
    pub fn row_profiles(&self, stride: usize) -> Vec<RowProfile> {
        let stride = stride.max(1);
        (0..self.size)
            .step_by(stride)
            .map(|t| RowProfile {
                reference: t,
                values: self.row(t).to_vec(),
            })
            .collect()
    }
}

/// One similarity row, labeled with its reference time.
#[derive(Debug, Clone, PartialEq)]
pub struct RowProfile {
    pub reference: usize,
    pub values: Vec<f64>,
}

/// Write profiles as `"<t2> <value>"` lines, groups separated by a blank line.
pub fn write_profiles<W: Write>(profiles: &[RowProfile], w: &mut W) -> io::Result<()> {
    for p in profiles {
        for (t2, s) in p.values.iter().enumerate() {
            writeln!(w, "{t2} {s:.6}")?;
        }
        w.write_all(b"\n\n")?;
    }
    Ok(())
}

/// Map a similarity to a gray level in `0..GRAY_LEVELS`.
///
/// Input is clamped to `[0, 1]` first, so exactly `1.0` maps to `GRAY_LEVELS - 1`.
/// NaN maps to 0.
#[inline]
pub fn gray_level(similarity: f64) -> u8 {
    let s = if similarity.is_nan() {
        0.0
    } else {
        similarity.clamp(0.0, 1.0)
    };
    let level = ((GRAY_LEVELS - 1) as f64 * s).floor() as usize;
    level.min(GRAY_LEVELS - 1) as u8
}

/// Rows divided by their largest magnitude, with the norm of each scaled row.
///
/// Cosine similarity does not depend on scale, and scaled entries lie in
/// `[-1, 1]`, so squares and dot products stay finite for any finite input.
/// An all-zero row, or one holding a non-finite value, keeps norm 0.
struct UnitRows {
    neurons: usize,
    data: Vec<f64>,
    norms: Vec<f64>,
}

impl UnitRows {
    fn new(z: &Trajectory, tier: ExecutionTier) -> Self {
        let neurons = z.neurons();
        let mut data = z.as_slice().to_vec();
        let mut norms = vec![0.0; z.steps()];

        let scale = |row: &mut [f64], norm: &mut f64| {
            let peak = peak_magnitude(row);
            if !(peak > 0.0 && peak.is_finite()) {
                return;
            }
            row.iter_mut().for_each(|v| *v /= peak);
            let n = row.iter().map(|v| v * v).sum::<f64>().sqrt();
            *norm = if n.is_finite() { n } else { 0.0 };
        };

        if neurons > 0 {
            match tier.effective() {
                #[cfg(feature = "parallel")]
                ExecutionTier::Parallel => data
                    .par_chunks_mut(neurons)
                    .zip(norms.par_iter_mut())
                    .for_each(|(row, norm)| scale(row, norm)),
                _ => data
                    .chunks_mut(neurons)
                    .zip(norms.iter_mut())
                    .for_each(|(row, norm)| scale(row, norm)),
            }
        }

        Self {
            neurons,
            data,
            norms,
        }
    }

    #[inline]
    fn row(&self, t: usize) -> &[f64] {
        &self.data[t * self.neurons..(t + 1) * self.neurons]
    }

    #[inline]
    fn cosine(&self, t1: usize, t2: usize) -> f64 {
        let (na, nb) = (self.norms[t1], self.norms[t2]);
        if na == 0.0 || nb == 0.0 {
            return 0.0;
        }
        let dot: f64 = self.row(t1).iter().zip(self.row(t2)).map(|(x, y)| x * y).sum();
        let s = dot / (na * nb);
        if s.is_nan() {
            0.0
        } else {
            s.clamp(0.0, 1.0)
        }
    }
}

/// Euclidean norm of every row.
///
/// Computed on the scaled row and multiplied back, so it only overflows when
/// the true norm exceeds `f64::MAX`.
pub fn row_norms(z: &Trajectory, tier: ExecutionTier) -> Vec<f64> {
    let unit = UnitRows::new(z, tier);
    (0..z.steps())
        .map(|t| peak_magnitude(z.row(t)) * unit.norms[t])
        .collect()
}

#[inline]
fn peak_magnitude(row: &[f64]) -> f64 {
    row.iter().fold(0.0_f64, |m, v| m.max(v.abs()))
}

/// Compute the full similarity matrix.
///
/// Only the upper triangle (`t1 <= t2`) is computed; the lower one is mirrored,
/// so `S[t1][t2] == S[t2][t1]` holds exactly. A row with zero norm is similar to
/// nothing, itself included; every other diagonal entry is exactly 1.
pub fn similarity_matrix(z: &Trajectory, tier: ExecutionTier) -> SimilarityMatrix {
    let size = z.steps();
    let unit = UnitRows::new(z, tier);
    let mut data = vec![0.0; size * size];

    let fill_upper = |t1: usize, row: &mut [f64]| {
        if unit.norms[t1] == 0.0 {
            return;
        }
        row[t1] = 1.0;
        for t2 in (t1 + 1)..size {
            row[t2] = unit.cosine(t1, t2);
        }
    };

    if size > 0 {
        match tier.effective() {
            #[cfg(feature = "parallel")]
            ExecutionTier::Parallel => data
                .par_chunks_mut(size)
                .enumerate()
                .for_each(|(t1, row)| fill_upper(t1, row)),
            _ => data
                .chunks_mut(size)
                .enumerate()
                .for_each(|(t1, row)| fill_upper(t1, row)),
        }
    }

    for t1 in 1..size {
        for t2 in 0..t1 {
            data[t1 * size + t2] = data[t2 * size + t1];
        }
    }

    debug!(size, "similarity matrix computed");
    SimilarityMatrix { size, data }
}

/// Matrix, rendered image and selected rows of one trajectory.
#[derive(Debug, Clone)]
pub struct SimilarityAnalysis {
    pub matrix: SimilarityMatrix,
    pub image: GrayImage,
    pub profiles: Vec<RowProfile>,
}

pub fn analyze(z: &Trajectory, tier: ExecutionTier, profile_stride: usize) -> SimilarityAnalysis {
    let matrix = similarity_matrix(z, tier);
    let image = matrix.to_image();
    let profiles = matrix.row_profiles(profile_stride);
    SimilarityAnalysis {
        matrix,
        image,
        profiles,
    }
}

impl SimilarityAnalysis {
    /// Write `<prefix>.png` and `<prefix>.dat`. Returns both paths.
    ///
    /// Both files are rendered in memory first. If the second write fails the
    /// first file is removed again, so a failed call leaves no output behind.
    pub fn save(&self, prefix: impl AsRef<Path>) -> Result<(PathBuf, PathBuf)> {
        let prefix = prefix.as_ref();
        let png = with_suffix(prefix, "png");
        let dat = with_suffix(prefix, "dat");

        let mut png_bytes = Cursor::new(Vec::new());
        self.image.write_to(&mut png_bytes, ImageFormat::Png)?;
        let mut dat_bytes = Vec::new();
        write_profiles(&self.profiles, &mut dat_bytes).map_err(|e| Error::io(&dat, e))?;

        fs::write(&png, png_bytes.into_inner()).map_err(|e| Error::io(&png, e))?;
        if let Err(e) = fs::write(&dat, dat_bytes) {
            let _ = fs::remove_file(&png);
            return Err(Error::io(&dat, e));
        }

        info!(
            png = %png.display(),
            dat = %dat.display(),
            size = self.matrix.size(),
            profiles = self.profiles.len(),
            "similarity outputs written"
        );
        Ok((png, dat))
    }
}

// `with_extension` would eat a dotted prefix such as `run.v2`.
fn with_suffix(prefix: &Path, ext: &str) -> PathBuf {
    let mut s = prefix.as_os_str().to_owned();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}
