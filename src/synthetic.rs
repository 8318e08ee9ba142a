//! Sample result files for trying the tool without a training run.

use crate::error::ResultError;
use log::info;
use ndarray::Array1;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const MODELS: [&str; 4] = ["mlp", "convnet", "resnet", "lstm"];
const VALIDATION_EVERY: usize = 5;

#[derive(Debug, Serialize)]
struct Parameters {
    learning_rate: f64,
    batch_size: usize,
    epochs: usize,
}

#[derive(Debug, Serialize)]
struct SampleDocument {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    description: String,
    train_dataset: String,
    parameters: Parameters,
    info: String,
    loss: BTreeMap<String, (Vec<f64>, Vec<f64>)>,
}

/// Noisy exponential decay sampled at `time_axis`.
fn decay_curve(
    rng: &mut StdRng,
    time_axis: &Array1<f64>,
    start: f64,
    floor: f64,
    tau: f64,
    noise: f64,
) -> Array1<f64> {
    let clean = time_axis.mapv(|t| floor + (start - floor) * (-t / tau).exp());
    let jitter = Array1::random_using(time_axis.len(), Uniform::new(-noise, noise), rng);
    (clean + jitter).mapv(|v| v.max(floor * 0.5))
}

fn sample_document(rng: &mut StdRng, index: usize) -> SampleDocument {
    let model = MODELS[index % MODELS.len()];
    let epochs: usize = rng.gen_range(40..=120);
    let learning_rate = [0.1, 0.01, 0.001][rng.gen_range(0..3usize)];
    let start = rng.gen_range(1.5..3.0);
    let floor = rng.gen_range(0.05..0.4);
    let tau = epochs as f64 / rng.gen_range(3.0..8.0);

    let train_time = Array1::range(0.0, epochs as f64, 1.0);
    let valid_time = Array1::range(0.0, epochs as f64, VALIDATION_EVERY as f64);
    let train = decay_curve(rng, &train_time, start, floor, tau, 0.05);
    let valid = decay_curve(rng, &valid_time, start * 1.05, floor * 1.3, tau, 0.03);

    let mut loss = BTreeMap::new();
    loss.insert("train".to_string(), (train.to_vec(), train_time.to_vec()));
    loss.insert("valid".to_string(), (valid.to_vec(), valid_time.to_vec()));

    SampleDocument {
        name: format!("{}-{}", model, index + 1),
        kind: model.to_string(),
        description: format!("synthetic {} run", model),
        train_dataset: "synthetic".to_string(),
        parameters: Parameters {
            learning_rate,
            batch_size: 32 << rng.gen_range(0..3u32),
            epochs,
        },
        info: format!("generated sample {}", index + 1),
        loss,
    }
}

/// File name in the `<model>_<date>_<time>.yml` pattern the listing sorts on.
pub fn sample_file_name(index: usize) -> String {
    let model = MODELS[index % MODELS.len()];
    format!(
        "{}_2024-{:02}-{:02}_{:02}00.yml",
        model,
        index / 28 % 12 + 1,
        index % 28 + 1,
        (9 + index) % 24
    )
}

/// Writes `count` result files into `dir`, creating it when needed.
/// The same seed always gives the same files.
pub fn write_samples<P: AsRef<Path>>(
    dir: P,
    count: usize,
    seed: u64,
) -> Result<Vec<PathBuf>, ResultError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|source| ResultError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut written = Vec::with_capacity(count);
    for index in 0..count {
        let path = dir.join(sample_file_name(index));
        let document = sample_document(&mut rng, index);
        let yaml = serde_yaml::to_string(&document).map_err(|source| ResultError::Yaml {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, yaml).map_err(|source| ResultError::Io {
            path: path.clone(),
            source,
        })?;
        written.push(path);
    }
    info!("Wrote {} sample result files to {}", count, dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{list_result_files, ResultRecord};
    use tempfile::TempDir;

    #[test]
    fn samples_load_as_result_files() {
        let dir = TempDir::new().unwrap();
        let written = write_samples(dir.path(), 3, 7).unwrap();
        assert_eq!(written.len(), 3);

        for path in &written {
            let record = ResultRecord::load(path).unwrap();
            assert_eq!(record.series_names(), ["train", "valid"]);
            let train = record.get("train").unwrap();
            assert_eq!(train.time_axis[1], 1.0);
            assert!(train.values.iter().all(|v| *v > 0.0));
            assert!(record.info_text().contains("train_dataset: synthetic"));
        }
        assert_eq!(list_result_files(dir.path()).unwrap().len(), 3);
    }

    #[test]
    fn same_seed_same_contents() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        let pa = write_samples(a.path(), 2, 42).unwrap();
        let pb = write_samples(b.path(), 2, 42).unwrap();
        for (x, y) in pa.iter().zip(&pb) {
            assert_eq!(fs::read_to_string(x).unwrap(), fs::read_to_string(y).unwrap());
        }
    }

    #[test]
    fn file_names_are_unique() {
        let mut names: Vec<String> = (0..50).map(sample_file_name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 50);
    }
}
