//! Integration tests for the kernelmachines library
//!
//! End-to-end scenarios across modules: density estimators and classifiers
//! on synthetic Gaussian data, projections, and file-format workflows.

use kernelmachines::data::{read_fvec, write_fvec, CsvDataset};
use kernelmachines::density::{
    GaussianMixtureConfig, GaussianMixtureModel, SdcaDensity, SmoDensity,
};
use kernelmachines::projection::Nystrom;
use kernelmachines::svm::{MulticlassSdca, MulticlassSdcaConfig, OneVsRest};
use kernelmachines::{
    Classifier, GaussianKernel, Kernel, MulticlassClassifier, Sample, SdcaSvm,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::io::Write;
use tempfile::NamedTempFile;

/// Sample `count` points from an isotropic Gaussian around `center`
fn gaussian_blob(rng: &mut StdRng, center: &[f64], sigma: f64, count: usize) -> Vec<Vec<f64>> {
    let noise = Normal::new(0.0, sigma).expect("valid sigma");
    (0..count)
        .map(|_| center.iter().map(|&c| c + noise.sample(rng)).collect())
        .collect()
}

/// Four well-separated Gaussian clusters in 10 dimensions, one per class
fn four_clusters(rng: &mut StdRng, per_class: usize) -> Vec<Sample<Vec<f64>>> {
    let mut samples = Vec::new();
    for class in 0..4 {
        let mut center = vec![0.0; 10];
        center[class] = 10.0;
        for input in gaussian_blob(rng, &center, 1.0, per_class) {
            samples.push(Sample::new(input, class as i32));
        }
    }
    samples
}

/// Two well-separated blobs with +1/-1 labels
fn two_blobs(rng: &mut StdRng, per_blob: usize) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let positive = gaussian_blob(rng, &[5.0, 5.0, 5.0], 1.0, per_blob);
    let negative = gaussian_blob(rng, &[-5.0, -5.0, -5.0], 1.0, per_blob);
    (positive, negative)
}

/// Every training point must score a positive margin under the two-density
/// difference decision
fn assert_blobs_separated<F: Fn(&Vec<f64>) -> f64>(
    decision: F,
    positive: &[Vec<f64>],
    negative: &[Vec<f64>],
    name: &str,
) {
    for x in positive {
        let value = decision(x);
        assert!(value > 0.0, "{}: positive sample scored {}", name, value);
    }
    for x in negative {
        let value = decision(x);
        assert!(value < 0.0, "{}: negative sample scored {}", name, value);
    }
}

#[test]
fn test_sdca_density_separates_blobs() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut rng = StdRng::seed_from_u64(101);
    let (positive, negative) = two_blobs(&mut rng, 25);

    let solver = SdcaDensity::with_kernel(GaussianKernel::new(0.1));
    let d_pos = solver.fit(&positive).unwrap();
    let d_neg = solver.fit(&negative).unwrap();

    assert_blobs_separated(
        |x| d_pos.value_of(x) - d_neg.value_of(x),
        &positive,
        &negative,
        "sdca density",
    );
}

#[test]
fn test_smo_density_separates_blobs() {
    let mut rng = StdRng::seed_from_u64(202);
    let (positive, negative) = two_blobs(&mut rng, 25);

    let solver = SmoDensity::with_kernel(GaussianKernel::new(0.1));
    let d_pos = solver.fit(&positive).unwrap();
    let d_neg = solver.fit(&negative).unwrap();

    assert_blobs_separated(
        |x| d_pos.value_of(x) - d_neg.value_of(x),
        &positive,
        &negative,
        "smo density",
    );
}

#[test]
fn test_gmm_density_separates_blobs() {
    let mut rng = StdRng::seed_from_u64(303);
    let (positive, negative) = two_blobs(&mut rng, 30);

    let fitter = GaussianMixtureModel::new(GaussianMixtureConfig {
        components: 2,
        ..Default::default()
    });
    let d_pos = fitter.fit(&positive).unwrap();
    let d_neg = fitter.fit(&negative).unwrap();

    assert_blobs_separated(
        |x| d_pos.value_of(x) - d_neg.value_of(x),
        &positive,
        &negative,
        "gmm density",
    );
}

#[test]
fn test_one_vs_rest_recovers_four_clusters_exactly() {
    let mut rng = StdRng::seed_from_u64(404);
    let samples = four_clusters(&mut rng, 15);

    let trainer = OneVsRest::with_kernel(GaussianKernel::new(0.05));
    let model = trainer.fit(&samples).unwrap();

    for sample in &samples {
        assert_eq!(
            model.predict(&sample.input),
            sample.label,
            "misclassified a training point of class {}",
            sample.label
        );
    }
}

#[test]
fn test_multiclass_sdca_recovers_four_clusters_exactly() {
    let mut rng = StdRng::seed_from_u64(505);
    let samples = four_clusters(&mut rng, 15);

    let solver = MulticlassSdca::with_kernel(GaussianKernel::new(0.05));
    let model = solver.fit(&samples).unwrap();

    for sample in &samples {
        assert_eq!(model.predict(&sample.input), sample.label);
    }

    // the structural zero-sum constraint survives training
    for row in model.alpha() {
        let sum: f64 = row.iter().sum();
        assert!(sum.abs() < 1e-9, "dual row sum drifted to {}", sum);
    }
}

#[test]
fn test_multiclass_sdca_respects_budget() {
    let mut rng = StdRng::seed_from_u64(606);
    let samples = four_clusters(&mut rng, 8);

    let config = MulticlassSdcaConfig {
        c: 0.5,
        ..Default::default()
    };
    let solver = MulticlassSdca::new(GaussianKernel::new(0.05), config);
    let model = solver.fit(&samples).unwrap();

    for row in model.alpha() {
        for &a in row {
            assert!(a <= 0.5 + 1e-12, "weight {} above the budget", a);
        }
    }
}

#[test]
fn test_nystrom_end_to_end_idempotence_and_accuracy() {
    let mut rng = StdRng::seed_from_u64(707);
    let (positive, _) = two_blobs(&mut rng, 20);

    // with the full sample set as landmarks the approximation is exact
    let full = Nystrom::fit(GaussianKernel::new(0.1), &positive, positive.len(), 1).unwrap();
    let kernel = GaussianKernel::new(0.1);
    for a in &positive {
        for b in &positive {
            let truth = kernel.similarity(a, b);
            let approx = full.approximate_similarity(a, b);
            assert!(
                (truth - approx).abs() < 1e-6,
                "kernel {} approximated as {}",
                truth,
                approx
            );
        }
    }

    // repeated projection of the same input is bit-identical
    let partial =
        Nystrom::fit_active(GaussianKernel::new(0.1), &positive, 8, 5, 11).unwrap();
    let probe = positive[3].clone();
    assert_eq!(partial.project(&probe), partial.project(&probe));
}

#[test]
fn test_csv_to_classifier_workflow() {
    let mut temp_file = NamedTempFile::new().expect("temp file");
    writeln!(temp_file, "x1,x2,label").expect("write");
    writeln!(temp_file, "2.0,1.0,1").expect("write");
    writeln!(temp_file, "1.8,1.1,1").expect("write");
    writeln!(temp_file, "2.2,0.9,1").expect("write");
    writeln!(temp_file, "-2.0,-1.0,-1").expect("write");
    writeln!(temp_file, "-1.8,-1.1,-1").expect("write");
    writeln!(temp_file, "-2.2,-0.9,-1").expect("write");
    temp_file.flush().expect("flush");

    let dataset = CsvDataset::from_file(temp_file.path()).expect("load");
    assert_eq!(dataset.len(), 6);

    let model = SdcaSvm::with_kernel(GaussianKernel::new(0.5))
        .fit(dataset.samples())
        .expect("train");

    let correct = dataset
        .samples()
        .iter()
        .filter(|s| model.predict(&s.input).label == s.label)
        .count();
    assert_eq!(correct, dataset.len());
}

#[test]
fn test_fvec_to_density_workflow() {
    let mut rng = StdRng::seed_from_u64(808);
    let blob = gaussian_blob(&mut rng, &[1.0, 2.0], 0.5, 16);
    // narrow to f32 first so the file round trip is exact
    let blob: Vec<Vec<f64>> = blob
        .iter()
        .map(|v| v.iter().map(|&x| x as f32 as f64).collect())
        .collect();

    let file = NamedTempFile::new().expect("temp file");
    write_fvec(file.path(), &blob).expect("write fvec");
    let restored = read_fvec(file.path()).expect("read fvec");
    assert_eq!(restored, blob);

    let density = SdcaDensity::with_kernel(GaussianKernel::new(1.0))
        .fit(&restored)
        .expect("fit density");
    assert!(density.value_of(&vec![1.0, 2.0]) > density.value_of(&vec![9.0, -4.0]));
}
