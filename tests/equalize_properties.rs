//! Properties of the equalization pipeline over random images.

use imagestag_equalize::filters::equalize::{EqualizeHistogram, EqualizeOptions, Lut};
use imagestag_equalize::{
    equalize_histogram_with, EqualizeError, RayonScheduler, Scheduler, SequentialScheduler,
};
use ndarray::{s, Array3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random image with intensities clustered in `[lo, hi]`.
fn random_image(seed: u64, height: usize, width: usize, lo: u8, hi: u8) -> Array3<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array3::from_shape_fn((height, width, 1), |_| rng.random_range(lo..=hi))
}

fn fine_partitions() -> EqualizeOptions {
    EqualizeOptions {
        min_rows_per_partition: 1,
        ..EqualizeOptions::default()
    }
}

struct RunResult {
    histogram: Vec<u64>,
    cdf: Vec<u64>,
    lut: Lut,
    output: Array3<u8>,
}

fn run_with<S: Scheduler>(input: &Array3<u8>, scheduler: S, options: EqualizeOptions) -> RunResult {
    let mut target = Array3::<u8>::zeros(input.raw_dim());
    let mut eq = EqualizeHistogram::with_options(scheduler, options);
    eq.configure(input.view(), target.view_mut()).unwrap();
    eq.run();

    let histogram = eq.histogram().bins().to_vec();
    let cdf = eq.cumulative_distribution().values().to_vec();
    let lut = eq.lut().clone();
    let output = eq.output().unwrap().to_owned();

    RunResult {
        histogram,
        cdf,
        lut,
        output,
    }
}

#[test]
fn test_histogram_sums_to_pixel_count() {
    for (seed, (h, w)) in [(1, (1, 16)), (2, (7, 48)), (3, (64, 128))].into_iter() {
        let input = random_image(seed, h, w, 0, 255);
        let result = run_with(&input, SequentialScheduler, fine_partitions());

        let sum: u64 = result.histogram.iter().sum();
        assert_eq!(sum, (h * w) as u64);
    }
}

#[test]
fn test_cdf_and_lut_are_non_decreasing() {
    let input = random_image(11, 40, 64, 30, 90);
    let result = run_with(&input, SequentialScheduler, fine_partitions());

    assert!(result.cdf.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(*result.cdf.last().unwrap(), 40 * 64);
    assert!(result.lut.table().windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_output_is_lut_of_input() {
    let input = random_image(5, 33, 32, 0, 255);
    let result = run_with(&input, SequentialScheduler, fine_partitions());

    for (&o, &i) in result.output.iter().zip(input.iter()) {
        assert_eq!(o, result.lut.get(i));
    }
}

#[test]
fn test_ordering_preserved_pixelwise() {
    let input = random_image(21, 16, 32, 50, 200);
    let result = run_with(&input, SequentialScheduler, fine_partitions());

    let flat_in: Vec<u8> = input.iter().copied().collect();
    let flat_out: Vec<u8> = result.output.iter().copied().collect();
    for a in 0..flat_in.len() {
        for b in 0..flat_in.len() {
            if flat_in[a] < flat_in[b] {
                assert!(flat_out[a] <= flat_out[b]);
            }
        }
    }
}

#[test]
fn test_partition_count_does_not_change_result() {
    let input = random_image(42, 97, 64, 10, 240);
    let reference = run_with(&input, SequentialScheduler, fine_partitions());

    for threads in [1, 2, 3, 8] {
        let scheduler = RayonScheduler::with_threads(threads).unwrap();
        let result = run_with(&input, &scheduler, fine_partitions());

        assert_eq!(result.histogram, reference.histogram, "threads = {threads}");
        assert_eq!(result.lut, reference.lut, "threads = {threads}");
        assert_eq!(result.output, reference.output, "threads = {threads}");
    }
}

#[test]
fn test_repeated_runs_identical() {
    let input = random_image(8, 24, 32, 0, 255);
    let mut output = Array3::<u8>::zeros(input.raw_dim());
    let scheduler = RayonScheduler::with_threads(4).unwrap();

    let mut eq = EqualizeHistogram::with_options(&scheduler, fine_partitions());
    eq.configure(input.view(), output.view_mut()).unwrap();
    eq.run();
    let first = eq.histogram();
    let first_lut = eq.lut().clone();
    for _ in 0..3 {
        eq.run();
        assert_eq!(eq.histogram(), first);
        assert_eq!(eq.lut(), &first_lut);
    }
    drop(eq);

    let again = equalize_histogram_with(input.view(), &scheduler, fine_partitions()).unwrap();
    assert_eq!(again, output);
}

#[test]
fn test_constant_image_collapses_to_single_value() {
    for v in [0u8, 1, 128, 255] {
        let input = Array3::<u8>::from_elem((5, 32, 1), v);
        let result = run_with(&input, SequentialScheduler, fine_partitions());

        assert!(result.output.iter().all(|&o| o == v));
    }
}

#[test]
fn test_width_17_fails_fast() {
    let input = random_image(3, 4, 17, 0, 255);
    let mut output = Array3::<u8>::from_elem((4, 17, 1), 1);

    let mut eq = EqualizeHistogram::new(SequentialScheduler);
    let err = eq.configure(input.view(), output.view_mut()).unwrap_err();
    drop(eq);

    assert_eq!(
        err,
        EqualizeError::UnalignedWidth {
            width: 17,
            stride: 16
        }
    );
    assert!(err.to_string().contains("multiple of 16"));
    assert!(output.iter().all(|&v| v == 1));
}

#[test]
fn test_border_stage_matches_aligned_equivalent() {
    // Same pixels laid out 16 wide and 17 wide must give the same histogram
    let input = random_image(13, 16, 17, 0, 255);
    let aligned = Array3::from_shape_vec((17, 16, 1), input.iter().copied().collect()).unwrap();
    let options = EqualizeOptions {
        border_histogram: true,
        ..fine_partitions()
    };

    let scheduler = RayonScheduler::with_threads(4).unwrap();
    let border = run_with(&input, &scheduler, options);
    let reference = run_with(&aligned, SequentialScheduler, fine_partitions());

    assert_eq!(border.histogram, reference.histogram);
    assert_eq!(border.lut, reference.lut);
}

#[test]
fn test_strided_views() {
    // Equalize the left half of a wider buffer into the right half of another
    let full = random_image(17, 12, 64, 40, 120);
    let window = full.slice(s![.., ..32, ..]);
    let mut target = Array3::<u8>::zeros((12, 64, 1));

    let mut eq = EqualizeHistogram::with_options(SequentialScheduler, fine_partitions());
    eq.configure(window, target.slice_mut(s![.., 32.., ..]))
        .unwrap();
    eq.run();
    let lut = eq.lut().clone();
    drop(eq);

    let owned = window.to_owned();
    let reference = run_with(&owned, SequentialScheduler, fine_partitions());
    assert_eq!(lut, reference.lut);
    assert_eq!(target.slice(s![.., 32.., ..]), reference.output);
    assert!(target.slice(s![.., ..32, ..]).iter().all(|&v| v == 0));
}

#[test]
fn test_rebound_input_matches_fresh_pipeline() {
    let frames: Vec<Array3<u8>> = (0..3).map(|seed| random_image(seed, 20, 48, 0, 255)).collect();
    let mut output = Array3::<u8>::zeros((20, 48, 1));
    let scheduler = RayonScheduler::with_threads(2).unwrap();

    let mut eq = EqualizeHistogram::with_options(&scheduler, fine_partitions());
    eq.configure(frames[0].view(), output.view_mut()).unwrap();
    for frame in &frames {
        eq.set_input(frame.view()).unwrap();
        eq.run();

        let reference = run_with(frame, SequentialScheduler, fine_partitions());
        assert_eq!(eq.lut(), &reference.lut);
        assert_eq!(eq.output().unwrap(), reference.output);
    }
}
