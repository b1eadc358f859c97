//! Seeded train/test partitioning.

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Output of [`train_test_split`].
#[derive(Debug, Clone)]
pub struct Split {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<usize>,
    pub y_test: Array1<usize>,
}

/// Number of test rows: `ceil(test_fraction * n)`, as scikit-learn rounds it.
pub fn test_count(n_samples: usize, test_fraction: f64) -> usize {
    (test_fraction * n_samples as f64).ceil() as usize
}

/// Shuffle row indices with `seed` and cut off `test_fraction` of them.
///
/// # Errors
/// Fails when the inputs disagree in length or either partition would be empty.
pub fn train_test_split(
    x: &Array2<f64>,
    y: &Array1<usize>,
    test_fraction: f64,
    seed: u64,
) -> Result<Split, String> {
    let n_samples = x.nrows();
    if n_samples != y.len() {
        return Err(format!(
            "feature rows ({}) and labels ({}) differ in length",
            n_samples,
            y.len()
        ));
    }
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(format!("test fraction {} must be in (0, 1)", test_fraction));
    }

    let n_test = test_count(n_samples, test_fraction);
    if n_test == 0 || n_test >= n_samples {
        return Err(format!(
            "cannot split {} samples with test fraction {}",
            n_samples, test_fraction
        ));
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(n_test);
    Ok(Split {
        x_train: x.select(Axis(0), train_idx),
        x_test: x.select(Axis(0), test_idx),
        y_train: y.select(Axis(0), train_idx),
        y_test: y.select(Axis(0), test_idx),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy(n: usize) -> (Array2<f64>, Array1<usize>) {
        let x = Array2::from_shape_fn((n, 2), |(i, j)| (i * (j + 1)) as f64);
        let y = Array1::from_shape_fn(n, |i| i % 2);
        (x, y)
    }

    #[test]
    fn test_eighty_twenty_shapes() {
        let (x, y) = toy(768);
        let split = train_test_split(&x, &y, 0.2, 0).unwrap();

        assert_eq!(split.x_test.nrows(), 154);
        assert_eq!(split.x_train.nrows(), 614);
        assert_eq!(split.y_train.len(), 614);
        assert_eq!(split.y_test.len(), 154);
    }

    #[test]
    fn test_same_seed_same_split() {
        let (x, y) = toy(50);
        let a = train_test_split(&x, &y, 0.2, 7).unwrap();
        let b = train_test_split(&x, &y, 0.2, 7).unwrap();

        assert_eq!(a.x_test, b.x_test);
        assert_eq!(a.y_train, b.y_train);
    }

    #[test]
    fn test_rows_stay_paired_with_labels() {
        let (x, y) = toy(40);
        let split = train_test_split(&x, &y, 0.25, 3).unwrap();

        for (row, label) in split.x_train.rows().into_iter().zip(split.y_train.iter()) {
            assert_eq!(row[0] as usize % 2, *label);
        }
    }

    #[test]
    fn test_rejects_degenerate_inputs() {
        let (x, y) = toy(10);
        let short = y.slice(ndarray::s![..9]).to_owned();
        assert!(train_test_split(&x, &short, 0.2, 0).is_err());
        assert!(train_test_split(&x, &y, 0.0, 0).is_err());
        assert!(train_test_split(&x, &y, 1.0, 0).is_err());

        let (one, one_y) = toy(1);
        assert!(train_test_split(&one, &one_y, 0.2, 0).is_err());
    }
}
