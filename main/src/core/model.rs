use crate::api::config::LstmConfig;
use crate::api::dropout::{DropoutMask, DropoutPolicy};
use crate::api::error::LstmResult;
use crate::api::loss::LossStrategy;
use crate::api::scalar::Scalar;
use crate::api::types::{CellTrace, Series};
use crate::core::engine;
use crate::core::init::initial_weights;
use crate::core::layout::WeightLayout;
use rand::Rng;

/// Single-layer LSTM with one sigmoid output, owning its flat parameter vector.
///
/// Training calls mask `n_dropout` random hidden units; evaluation calls scale
/// the same blocks by the kept fraction instead. Masking always happens on a
/// per-call copy, so the stored weights only change through `weights_mut`.
#[derive(Debug, Clone)]
pub struct Lstm {
    config: LstmConfig,
    layout: WeightLayout,
    weights: Vec<f64>,
}

impl Lstm {
    /// Wrap an existing parameter vector. Its length must match the config.
    pub fn new(config: LstmConfig, weights: Vec<f64>) -> LstmResult<Self> {
        config.validate()?;
        let layout = config.layout();
        layout.check(weights.len())?;
        Ok(Self {
            config,
            layout,
            weights,
        })
    }

    /// Sample initial weights as described by `config.init` and `config.forget_bias`.
    pub fn init<R: Rng + ?Sized>(config: LstmConfig, rng: &mut R) -> LstmResult<Self> {
        config.validate()?;
        let layout = config.layout();
        let weights = initial_weights(&layout, &config.init, config.forget_bias, rng)?;
        Ok(Self {
            config,
            layout,
            weights,
        })
    }

    pub fn config(&self) -> &LstmConfig {
        &self.config
    }

    pub fn layout(&self) -> &WeightLayout {
        &self.layout
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Mutable access for an optimizer. The length is fixed.
    pub fn weights_mut(&mut self) -> &mut [f64] {
        &mut self.weights
    }

    pub fn into_weights(self) -> Vec<f64> {
        self.weights
    }

    /// Policy used by [`Lstm::gradient`].
    pub fn training_policy(&self) -> DropoutPolicy {
        if self.config.n_dropout == 0 {
            DropoutPolicy::NoDropouts
        } else {
            DropoutPolicy::RandomMasking(self.config.n_dropout)
        }
    }

    /// Policy used by the prediction methods.
    pub fn eval_policy(&self) -> DropoutPolicy {
        DropoutPolicy::inverted_scale(self.config.n_hid, self.config.n_dropout)
    }

    fn eval_mask(&self) -> DropoutMask {
        match self.eval_policy() {
            DropoutPolicy::UniformScale(factor) => DropoutMask::Scale(factor),
            DropoutPolicy::NoDropouts | DropoutPolicy::RandomMasking(_) => DropoutMask::Keep,
        }
    }

    /// One prediction per timestep per series (fast path).
    pub fn predict(&self, inputs: &[Series<f64>]) -> LstmResult<Vec<Vec<f64>>> {
        engine::predict(&self.weights, &self.layout, &self.eval_mask(), inputs)
    }

    /// Predictions through the generic path, e.g. with dual-number inputs.
    pub fn predict_generic<T: Scalar>(&self, inputs: &[Series<T>]) -> LstmResult<Vec<Vec<T>>> {
        engine::predict_generic(&self.weights, &self.layout, &self.eval_mask(), inputs, None)
    }

    /// Cell state of every timestep of every series: `[series][step][unit]`.
    pub fn cell_states(&self, inputs: &[Series<f64>]) -> LstmResult<CellTrace<f64>> {
        let mut trace = Vec::new();
        engine::predict_generic(
            &self.weights,
            &self.layout,
            &self.eval_mask(),
            inputs,
            Some(&mut trace),
        )?;
        Ok(trace)
    }

    /// Descent direction for one training step.
    ///
    /// Draws one dropout mask from the training policy and uses it for both
    /// the forward pass and the gradient.
    pub fn gradient<L, R>(
        &self,
        inputs: &[Series<f64>],
        targets: &[Vec<f64>],
        loss: &L,
        rng: &mut R,
    ) -> LstmResult<Vec<f64>>
    where
        L: LossStrategy + ?Sized,
        R: Rng + ?Sized,
    {
        let mask = self.training_policy().draw(self.config.n_hid, rng)?;
        engine::gradient(
            &self.weights,
            &self.layout,
            &mask,
            inputs,
            targets,
            loss,
            self.config.parallel_threshold,
        )
    }

    /// Summed loss of a batch under the evaluation policy.
    pub fn loss<L: LossStrategy + ?Sized>(
        &self,
        inputs: &[Series<f64>],
        targets: &[Vec<f64>],
        loss: &L,
    ) -> LstmResult<f64> {
        engine::batch_loss(
            &self.weights,
            &self.layout,
            &self.eval_mask(),
            inputs,
            targets,
            loss,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::LstmError;
    use crate::core::loss::mse::MseLoss;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn new_checks_weight_length() {
        let config = LstmConfig::new(1, 2);
        assert!(matches!(
            Lstm::new(config.clone(), vec![0.0; 34]),
            Err(LstmError::ShapeMismatch { expected: 35, got: 34, .. })
        ));
        assert!(Lstm::new(config, vec![0.0; 35]).is_ok());
    }

    #[test]
    fn policies_follow_dropout_count() {
        let mut rng = StdRng::seed_from_u64(4);
        let plain = Lstm::init(LstmConfig::new(1, 4), &mut rng).unwrap();
        assert_eq!(plain.training_policy(), DropoutPolicy::NoDropouts);
        assert_eq!(plain.eval_policy(), DropoutPolicy::NoDropouts);

        let dropped = Lstm::init(LstmConfig::new(1, 4).with_dropout(2), &mut rng).unwrap();
        assert_eq!(dropped.training_policy(), DropoutPolicy::RandomMasking(2));
        assert_eq!(dropped.eval_policy(), DropoutPolicy::UniformScale(0.5));
    }

    #[test]
    fn eval_mask_is_fixed_by_config() {
        let weights = LstmConfig::new(1, 4).layout().zeros();
        let plain = Lstm::new(LstmConfig::new(1, 4), weights.clone()).unwrap();
        assert_eq!(plain.eval_mask(), DropoutMask::Keep);

        let dropped = Lstm::new(LstmConfig::new(1, 4).with_dropout(1), weights).unwrap();
        assert_eq!(dropped.eval_mask(), DropoutMask::Scale(0.75));
        assert_eq!(dropped.eval_mask(), dropped.eval_mask());
    }

    #[test]
    fn gradient_leaves_weights_intact() {
        let mut rng = StdRng::seed_from_u64(5);
        let model = Lstm::init(LstmConfig::new(2, 4).with_dropout(1), &mut rng).unwrap();
        let before = model.weights().to_vec();
        let inputs = vec![Series::from_rows(vec![vec![0.1, 0.2], vec![0.3, 0.4]]).unwrap()];
        let grad = model.gradient(&inputs, &[vec![0.5, 0.6]], &MseLoss, &mut rng).unwrap();
        assert_eq!(grad.len(), model.layout().param_count());
        assert_eq!(model.weights(), &before[..]);
    }

    #[test]
    fn cell_states_cover_every_step() {
        let mut rng = StdRng::seed_from_u64(6);
        let model = Lstm::init(LstmConfig::new(1, 3), &mut rng).unwrap();
        let trace = model
            .cell_states(&[Series::univariate(vec![0.1, 0.2, 0.3, 0.4])])
            .unwrap();
        assert_eq!(trace.len(), 1);
        assert_eq!(trace[0].len(), 4);
        assert_eq!(trace[0][0].len(), 3);
    }
}
