mod common;

use common::{sine_weights, toy_batch};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rustml_lstm::*;

fn zero_rows(matrix: &[f64], n_hid: usize) -> Vec<usize> {
    (0..n_hid)
        .filter(|&i| matrix[i * n_hid..(i + 1) * n_hid].iter().all(|&v| v == 0.0))
        .collect()
}

#[test]
fn test_random_masking_zeros_exactly_k_units() {
    let layout = WeightLayout::new(2, 6);
    let weights = sine_weights(&layout);
    let mut rng = StdRng::seed_from_u64(11);

    for k in 1..6 {
        let mask = DropoutPolicy::RandomMasking(k).draw(6, &mut rng).unwrap();
        let masked = masked_copy(&weights, &layout, &mask).unwrap();
        let views = layout.views(&masked).unwrap();
        let original = layout.views(&weights).unwrap();

        for gate in Gate::ALL {
            assert_eq!(zero_rows(views.gate(gate).r, 6), mask.dropped(), "R rows of {gate:?}");
            assert_eq!(views.gate(gate).w, original.gate(gate).w);
            assert_eq!(views.gate(gate).b, original.gate(gate).b);
        }
        let zeroed: Vec<usize> = (0..6).filter(|&i| views.proj_w[i] == 0.0).collect();
        assert_eq!(zeroed, mask.dropped());
        assert_eq!(views.proj_b, original.proj_b);
    }
}

#[test]
fn test_masked_gradient_is_zero_on_dropped_units() {
    let layout = WeightLayout::new(2, 5);
    let weights = sine_weights(&layout);
    let (inputs, targets) = toy_batch(2);
    let mut rng = StdRng::seed_from_u64(3);
    let mask = DropoutPolicy::RandomMasking(2).draw(5, &mut rng).unwrap();

    let grad = gradient(&weights, &layout, &mask, &inputs, &targets, &MseLoss, 8).unwrap();
    let views = layout.views(&grad).unwrap();
    for &unit in mask.dropped() {
        for gate in Gate::ALL {
            assert!(views.gate(gate).r[unit * 5..(unit + 1) * 5].iter().all(|&g| g == 0.0));
        }
        assert_eq!(views.proj_w[unit], 0.0);
    }
    // Kept units still learn.
    let kept = (0..5).find(|u| !mask.dropped().contains(u)).unwrap();
    assert_ne!(views.proj_w[kept], 0.0);
}

#[test]
fn test_batch_gradient_is_sum_of_independent_samples() {
    let layout = WeightLayout::new(2, 4);
    let weights = sine_weights(&layout);
    let (inputs, targets) = toy_batch(2);
    let mask = DropoutMask::Drop(vec![2]);

    let mut per_sample = Vec::new();
    for (series, target) in inputs.iter().zip(&targets) {
        let mut single = per_sample_gradients(
            &weights,
            &layout,
            &mask,
            std::slice::from_ref(series),
            std::slice::from_ref(target),
            &MseLoss,
            8,
        )
        .unwrap();
        per_sample.push(single.remove(0));
    }
    let from_samples = reduce_gradients(&layout, &mask, &per_sample).unwrap();
    let batch = gradient(&weights, &layout, &mask, &inputs, &targets, &MseLoss, 8).unwrap();
    assert_eq!(from_samples, batch);
}

#[test]
fn test_uniform_scale_matches_manual_scaling() {
    let layout = WeightLayout::new(1, 4);
    let weights = sine_weights(&layout);
    let inputs = vec![Series::univariate(vec![0.3, -0.2, 0.5])];

    let mut manual = weights.clone();
    {
        let mut views = layout.views_mut(&mut manual).unwrap();
        for gate in Gate::ALL {
            views.gate_mut(gate).r.iter_mut().for_each(|v| *v *= 0.75);
        }
        views.proj_w.iter_mut().for_each(|v| *v *= 0.75);
    }

    let scaled = predict(&weights, &layout, &DropoutMask::Scale(0.75), &inputs).unwrap();
    let expected = predict(&manual, &layout, &DropoutMask::Keep, &inputs).unwrap();
    assert_eq!(scaled, expected);
}

#[test]
fn test_model_uses_inverted_scale_for_evaluation() {
    let config = LstmConfig::new(1, 4).with_dropout(1);
    let weights = sine_weights(&config.layout());
    let model = Lstm::new(config, weights.clone()).unwrap();
    let inputs = vec![Series::univariate(vec![0.1, 0.4, -0.3])];

    assert_eq!(model.eval_policy(), DropoutPolicy::UniformScale(0.75));
    let expected = predict(&weights, model.layout(), &DropoutMask::Scale(0.75), &inputs).unwrap();
    assert_eq!(model.predict(&inputs).unwrap(), expected);
}

#[test]
fn test_seeded_training_draws_are_reproducible() {
    let config = LstmConfig::new(2, 6).with_dropout(2);
    let weights = sine_weights(&config.layout());
    let model = Lstm::new(config, weights).unwrap();
    let (inputs, targets) = toy_batch(2);

    let a = model
        .gradient(&inputs, &targets, &MseLoss, &mut StdRng::seed_from_u64(42))
        .unwrap();
    let b = model
        .gradient(&inputs, &targets, &MseLoss, &mut StdRng::seed_from_u64(42))
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_invalid_masks_are_rejected() {
    let layout = WeightLayout::new(1, 3);
    let weights = sine_weights(&layout);
    let mut rng = StdRng::seed_from_u64(0);

    assert!(matches!(
        DropoutPolicy::RandomMasking(3).draw(3, &mut rng),
        Err(LstmError::InvalidDropoutCount { requested: 3, n_hid: 3 })
    ));
    assert!(masked_copy(&weights, &layout, &DropoutMask::Drop(vec![5])).is_err());
    assert!(matches!(
        masked_copy(&weights, &layout, &DropoutMask::Drop(vec![1, 1])),
        Err(LstmError::InvalidConfig(_))
    ));
    assert!(matches!(
        masked_copy(&weights, &layout, &DropoutMask::Scale(f64::NAN)),
        Err(LstmError::InvalidConfig(_))
    ));
    assert!(LstmConfig::new(1, 3).with_dropout(3).validate().is_err());
}
