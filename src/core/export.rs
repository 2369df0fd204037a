use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Error, Result};
use crate::trajectory::Trajectory;

pub const ACTIVITY_FILE: &str = "activity.dat";
pub const RASTER_FILE: &str = "raster.dat";
pub const READOUT_FILE: &str = "readout.dat";

/// Readout weights for reference time `isi`.
///
/// Neurons already active at `isi` get weight 0, silent ones weight 1.
pub fn readout_weights(z: &Trajectory, isi: usize) -> Result<Vec<f64>> {
    check_reference(z, isi)?;
    Ok(z
        .row(isi)
        .iter()
        .map(|&v| if v > 0.0 { 0.0 } else { 1.0 })
        .collect())
}

/// Weighted population sum at every time step, one value per step.
pub fn readout_signal(z: &Trajectory, isi: usize) -> Result<Vec<f64>> {
    let w = readout_weights(z, isi)?;
    Ok(z
        .rows()
        .map(|row| row.iter().zip(&w).map(|(zi, wi)| wi * zi).sum::<f64>())
        .collect())
}

fn check_reference(z: &Trajectory, isi: usize) -> Result<()> {
    if isi >= z.steps() {
        return Err(Error::ReferenceIndexOutOfRange {
            index: isi as i64,
            steps: z.steps(),
        });
    }
    Ok(())
}

/// `"<t> <i>"` for every strictly positive entry, time-major.
pub fn write_raster<W: Write>(z: &Trajectory, w: &mut W) -> io::Result<()> {
    for (t, row) in z.rows().enumerate() {
        for (i, &v) in row.iter().enumerate() {
            if v > 0.0 {
                writeln!(w, "{t} {i}")?;
            }
        }
    }
    Ok(())
}

/// `"<t> <value>"` for every step.
pub fn write_readout<W: Write>(signal: &[f64], w: &mut W) -> io::Result<()> {
    for (t, r) in signal.iter().enumerate() {
        writeln!(w, "{t} {r:.6}")?;
    }
    Ok(())
}

/// Paths of the artifacts written by [`export`].
#[derive(Debug, Clone)]
pub struct ExportedArtifacts {
    pub activity: PathBuf,
    pub raster: PathBuf,
    pub readout: PathBuf,
    pub signal: Vec<f64>,
}

/// Write `activity.dat`, `raster.dat` and `readout.dat` into `dir`.
///
/// `isi` is checked before any file is created.
pub fn export(z: &Trajectory, isi: usize, dir: impl AsRef<Path>) -> Result<ExportedArtifacts> {
    let dir = dir.as_ref();
    let signal = readout_signal(z, isi)?;

    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

    let activity = dir.join(ACTIVITY_FILE);
    z.save_activity(&activity)?;

    let raster = dir.join(RASTER_FILE);
    write_file(&raster, |w| write_raster(z, w))?;

    let readout = dir.join(READOUT_FILE);
    write_file(&readout, |w| write_readout(&signal, w))?;

    info!(
        activity = %activity.display(),
        raster = %raster.display(),
        readout = %readout.display(),
        isi,
        "artifacts written"
    );

    Ok(ExportedArtifacts {
        activity,
        raster,
        readout,
        signal,
    })
}

pub(crate) fn write_file<F>(path: &Path, body: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut w = BufWriter::new(file);
    body(&mut w)
        .and_then(|_| w.flush())
        .map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Trajectory {
        // t=0 silent, t=1 neuron 0 at 0.3, t=2 both active.
        Trajectory::from_vec(3, 2, vec![0.0, 0.0, 0.3, 0.0, 0.5, 2.0]).unwrap()
    }

    #[test]
    fn weights_exclude_neurons_active_at_reference() {
        let w = readout_weights(&sample(), 1).unwrap();
        assert_eq!(w, vec![0.0, 1.0]);

        let w = readout_weights(&sample(), 0).unwrap();
        assert_eq!(w, vec![1.0, 1.0]);
    }

    #[test]
    fn signal_is_weighted_sum() {
        let r = readout_signal(&sample(), 1).unwrap();
        assert_eq!(r, vec![0.0, 0.0, 2.0]);
    }

    #[test]
    fn out_of_range_reference_is_rejected() {
        let err = readout_weights(&sample(), 3).unwrap_err();
        assert!(matches!(
            err,
            Error::ReferenceIndexOutOfRange { index: 3, steps: 3 }
        ));
    }

    #[test]
    fn raster_lists_positive_entries_in_order() {
        let mut out = Vec::new();
        write_raster(&sample(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1 0\n2 0\n2 1\n");
    }

    #[test]
    fn readout_format() {
        let mut out = Vec::new();
        write_readout(&[0.0, 1.5], &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0 0.000000\n1 1.500000\n");
    }

    #[test]
    fn bad_reference_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let err = export(&sample(), 10, dir.path()).unwrap_err();
        assert!(matches!(err, Error::ReferenceIndexOutOfRange { .. }));
        assert!(!dir.path().join(ACTIVITY_FILE).exists());
        assert!(!dir.path().join(RASTER_FILE).exists());
        assert!(!dir.path().join(READOUT_FILE).exists());
    }
}
