use crate::api::error::{LstmError, LstmResult};
use crate::core::layout::WeightLayout;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Distribution the initial weights are drawn from.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(tag = "distribution", rename_all = "snake_case")]
pub enum WeightInit {
    /// Zero-mean normal with standard deviation `std`.
    Normal { std: f64 },
    /// Uniform on `[-limit, limit)`.
    Uniform { limit: f64 },
}

impl Default for WeightInit {
    fn default() -> Self {
        WeightInit::Normal { std: 0.1 }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LstmConfig {
    /// Input features per timestep.
    pub n_var: usize,
    /// Hidden units.
    pub n_hid: usize,
    /// Hidden units masked per training call. 0 disables dropout.
    #[serde(default)]
    pub n_dropout: usize,
    /// Fixed value for the forget-gate bias block at initialization.
    #[serde(default)]
    pub forget_bias: Option<f64>,
    #[serde(default)]
    pub init: WeightInit,
    /// Batches with at least this many series are differentiated on the rayon pool.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

fn default_parallel_threshold() -> usize { 8 }

impl LstmConfig {
    pub fn new(n_var: usize, n_hid: usize) -> Self {
        Self {
            n_var,
            n_hid,
            n_dropout: 0,
            forget_bias: None,
            init: WeightInit::default(),
            parallel_threshold: default_parallel_threshold(),
        }
    }

    pub fn with_dropout(mut self, n_dropout: usize) -> Self {
        self.n_dropout = n_dropout;
        self
    }

    pub fn with_forget_bias(mut self, bias: f64) -> Self {
        self.forget_bias = Some(bias);
        self
    }

    pub fn with_init(mut self, init: WeightInit) -> Self {
        self.init = init;
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Load and validate a JSON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> LstmResult<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let config: LstmConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> LstmResult<Self> {
        let config: LstmConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn layout(&self) -> WeightLayout {
        WeightLayout::new(self.n_var, self.n_hid)
    }

    pub fn validate(&self) -> LstmResult<()> {
        if self.n_var == 0 {
            return Err(LstmError::InvalidConfig("n_var must be > 0".into()));
        }
        if self.n_hid == 0 {
            return Err(LstmError::InvalidConfig("n_hid must be > 0".into()));
        }
        if self.n_dropout >= self.n_hid {
            return Err(LstmError::InvalidDropoutCount {
                requested: self.n_dropout,
                n_hid: self.n_hid,
            });
        }
        if let Some(bias) = self.forget_bias {
            if !bias.is_finite() {
                return Err(LstmError::InvalidConfig(format!(
                    "forget_bias must be finite, got {}",
                    bias
                )));
            }
        }
        match self.init {
            WeightInit::Normal { std } if !(std.is_finite() && std > 0.0) => {
                return Err(LstmError::InvalidConfig(format!(
                    "normal init std must be finite and > 0, got {}",
                    std
                )));
            }
            WeightInit::Uniform { limit } if !(limit.is_finite() && limit > 0.0) => {
                return Err(LstmError::InvalidConfig(format!(
                    "uniform init limit must be finite and > 0, got {}",
                    limit
                )));
            }
            _ => {}
        }
        Ok(())
    }
}
