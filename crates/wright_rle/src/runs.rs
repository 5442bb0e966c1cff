//! Run-length reduction of pixel planes and its inverse.
//!
//! Monochrome planes reduce to bare run lengths of alternating color. The
//! sequence starts from a phantom black pixel that is not part of the
//! image, so the first run already counts toward black and no run is ever
//! empty. Multi-valued planes reduce to `(value, length)` pairs kept as two
//! parallel sequences.

use crate::{Result, RleError};

/// Run lengths of a 0/1 plane, counted from a leading phantom 0 pixel.
pub fn mono_runs(pixels: &[u8]) -> Vec<u64> {
    let mut runs = Vec::new();
    let mut current = 0u8;
    let mut count = 1u64;

    for &p in pixels {
        let bit = u8::from(p != 0);
        if bit == current {
            count += 1;
        } else {
            runs.push(count);
            current = bit;
            count = 1;
        }
    }
    runs.push(count);
    runs
}

/// Splits a plane into the value of each run and the run lengths.
pub fn value_runs(pixels: &[u8]) -> (Vec<u8>, Vec<u64>) {
    let mut values = Vec::new();
    let mut runs: Vec<u64> = Vec::new();

    for &p in pixels {
        if values.last() == Some(&p) {
            if let Some(count) = runs.last_mut() {
                *count += 1;
            }
        } else {
            values.push(p);
            runs.push(1);
        }
    }
    (values, runs)
}

fn checked_total(total: usize, run: u64, expected: usize) -> Result<usize> {
    let next = usize::try_from(run)
        .ok()
        .and_then(|r| total.checked_add(r))
        .filter(|&t| t <= expected);
    next.ok_or_else(|| {
        RleError::MalformedContainer(format!("runs overflow the {expected} pixel bitmap"))
    })
}

/// Expands monochrome runs back into exactly `expected` 0/1 pixels,
/// dropping the phantom pixel.
pub fn expand_mono_runs(runs: &[u64], expected: usize) -> Result<Vec<u8>> {
    let mut pixels = Vec::with_capacity(expected);
    let mut value = 0u8;

    for (idx, &run) in runs.iter().enumerate() {
        let run = if idx == 0 {
            // first run is never empty, it holds the phantom pixel
            run.checked_sub(1).ok_or_else(|| {
                RleError::MalformedContainer("empty leading run".to_string())
            })?
        } else {
            run
        };
        let end = checked_total(pixels.len(), run, expected)?;
        pixels.resize(end, value);
        value ^= 1;
    }

    if pixels.len() != expected {
        return Err(RleError::MalformedContainer(format!(
            "runs cover {} of {expected} pixels",
            pixels.len()
        )));
    }
    Ok(pixels)
}

/// Expands `(values[i], runs[i])` pairs back into exactly `expected`
/// pixels. Extra trailing values are padding and ignored.
pub fn expand_value_runs(values: &[u8], runs: &[u64], expected: usize) -> Result<Vec<u8>> {
    if values.len() < runs.len() {
        return Err(RleError::MalformedContainer(format!(
            "{} runs but only {} values",
            runs.len(),
            values.len()
        )));
    }

    let mut pixels = Vec::with_capacity(expected);
    for (&value, &run) in values.iter().zip(runs) {
        let end = checked_total(pixels.len(), run, expected)?;
        pixels.resize(end, value);
    }

    if pixels.len() != expected {
        return Err(RleError::MalformedContainer(format!(
            "runs cover {} of {expected} pixels",
            pixels.len()
        )));
    }
    Ok(pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mono_runs_phantom_pixel() {
        let mut pixels = vec![0u8; 5];
        pixels.extend([255; 5]);
        pixels.extend([0; 6]);
        // the phantom pixel joins the leading black run
        assert_eq!(mono_runs(&pixels), vec![6, 5, 6]);
    }

    #[test]
    fn test_mono_runs_leading_white() {
        assert_eq!(mono_runs(&[1, 1, 0]), vec![1, 2, 1]);
        assert_eq!(mono_runs(&[]), vec![1]);
    }

    #[test]
    fn test_expand_mono_runs() {
        assert_eq!(expand_mono_runs(&[1, 2, 1], 3).unwrap(), vec![1, 1, 0]);
        assert_eq!(expand_mono_runs(&[6, 5, 6], 16).unwrap().len(), 16);
        assert!(expand_mono_runs(&[1], 0).unwrap().is_empty());
    }

    #[test]
    fn test_expand_mono_runs_rejects_bad_totals() {
        assert!(expand_mono_runs(&[1, 2, 1], 4).is_err());
        assert!(expand_mono_runs(&[1, 2, 1], 2).is_err());
        assert!(expand_mono_runs(&[0, 3], 3).is_err());
        assert!(expand_mono_runs(&[1, u64::MAX], 3).is_err());
        assert!(expand_mono_runs(&[], 0).is_ok());
    }

    #[test]
    fn test_value_runs() {
        let (values, runs) = value_runs(&[7, 7, 3, 3, 3, 7, 0]);
        assert_eq!(values, vec![7, 3, 7, 0]);
        assert_eq!(runs, vec![2, 3, 1, 1]);

        let (values, runs) = value_runs(&[]);
        assert!(values.is_empty() && runs.is_empty());
    }

    #[test]
    fn test_expand_value_runs() {
        let plane = [7, 7, 3, 3, 3, 7, 0];
        let (values, runs) = value_runs(&plane);
        assert_eq!(expand_value_runs(&values, &runs, 7).unwrap(), plane.to_vec());

        // padding values past the last run are ignored
        let mut padded = values.clone();
        padded.extend([0, 0]);
        assert_eq!(expand_value_runs(&padded, &runs, 7).unwrap(), plane.to_vec());

        assert!(expand_value_runs(&values[..2], &runs, 7).is_err());
        assert!(expand_value_runs(&values, &runs, 8).is_err());
        assert!(expand_value_runs(&values, &runs, 6).is_err());
    }
}
