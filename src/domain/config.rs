//! Engine configuration and validation.
//!
//! Everything is read through [`ConfigPort`] and validated before an engine
//! is constructed; an invalid value never reaches the bar loop.

use chrono::NaiveDate;
use std::path::PathBuf;

use crate::domain::error::EngineError;
use crate::domain::gate::{AlwaysPermit, EntryGate, ProbabilityGate};
use crate::domain::indicator::{check_period, IndicatorType, MovingAverageKind};
use crate::domain::signal::PolicyConfig;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_TREND_PERIOD: usize = 15;
pub const DEFAULT_ATR_PERIOD: usize = 14;
pub const DEFAULT_DECLINE_BARS: usize = 3;
pub const DEFAULT_HOLD_BARS: usize = 5;
pub const DEFAULT_ATR_ENTER_BELOW: f64 = 2.0;
pub const DEFAULT_ATR_EXIT_ABOVE: f64 = 2.2;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub trend_kind: MovingAverageKind,
    pub trend_period: usize,
    pub atr_period: usize,
    pub policy: PolicyConfig,
    /// Chance that a valid entry goes ahead; 1.0 disables the gate.
    pub entry_probability: f64,
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            trend_kind: MovingAverageKind::Simple,
            trend_period: DEFAULT_TREND_PERIOD,
            atr_period: DEFAULT_ATR_PERIOD,
            policy: PolicyConfig::Trend,
            entry_probability: 1.0,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        check_period(self.trend_period, "trend")?;
        check_period(self.atr_period, "ATR")?;
        if !(0.0..=1.0).contains(&self.entry_probability) {
            return Err(EngineError::configuration(format!(
                "entry_probability must be within [0, 1], got {}",
                self.entry_probability
            )));
        }
        self.policy.build()?;
        Ok(())
    }

    pub fn trend_indicator(&self) -> IndicatorType {
        self.trend_kind.indicator_type(self.trend_period)
    }

    pub fn volatility_indicator(&self) -> IndicatorType {
        IndicatorType::Atr(self.atr_period)
    }

    pub fn build_gate(&self) -> Result<Box<dyn EntryGate>, EngineError> {
        if self.entry_probability >= 1.0 {
            return Ok(Box::new(AlwaysPermit));
        }
        let gate = match self.seed {
            Some(seed) => ProbabilityGate::seeded(self.entry_probability, seed)?,
            None => ProbabilityGate::from_entropy(self.entry_probability)?,
        };
        Ok(Box::new(gate))
    }
}

/// Where bars come from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataConfig {
    pub path: Option<PathBuf>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub fn build_engine_config(config: &dyn ConfigPort) -> Result<EngineConfig, EngineError> {
    let trend_kind = match config.get_string("indicators", "trend") {
        Some(name) => MovingAverageKind::parse(&name)?,
        None => MovingAverageKind::Simple,
    };
    let trend_period = read_period(config, "indicators", "trend_period", DEFAULT_TREND_PERIOD)?;
    let atr_period = read_period(config, "indicators", "atr_period", DEFAULT_ATR_PERIOD)?;

    let policy_name = config
        .get_string("signal", "policy")
        .unwrap_or_else(|| "trend".to_string());
    let policy = match policy_name.trim().to_lowercase().as_str() {
        "trend" => PolicyConfig::Trend,
        "decline_hold" => PolicyConfig::DeclineThenHold {
            decline_bars: read_period(config, "signal", "decline_bars", DEFAULT_DECLINE_BARS)?,
            hold_bars: read_period(config, "signal", "hold_bars", DEFAULT_HOLD_BARS)?,
        },
        "volatility" => PolicyConfig::VolatilityBand {
            enter_below: read_double(config, "signal", "atr_enter_below", DEFAULT_ATR_ENTER_BELOW)?,
            exit_above: read_double(config, "signal", "atr_exit_above", DEFAULT_ATR_EXIT_ABOVE)?,
        },
        other => {
            return Err(EngineError::configuration(format!(
                "unknown signal policy '{}' (expected trend, decline_hold or volatility)",
                other
            )));
        }
    };

    let entry_probability = read_double(config, "signal", "entry_probability", 1.0)?;
    let seed = config
        .get_uint("signal", "seed")
        .map_err(|reason| invalid("signal", "seed", reason))?;

    let engine = EngineConfig {
        trend_kind,
        trend_period,
        atr_period,
        policy,
        entry_probability,
        seed,
    };
    engine.validate()?;
    Ok(engine)
}

pub fn build_data_config(config: &dyn ConfigPort) -> Result<DataConfig, EngineError> {
    let data = DataConfig {
        path: config
            .get_string("data", "path")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from),
        start_date: read_date(config, "data", "start_date")?,
        end_date: read_date(config, "data", "end_date")?,
    };
    if let (Some(start), Some(end)) = (data.start_date, data.end_date) {
        if start > end {
            return Err(EngineError::ConfigInvalid {
                section: "data".into(),
                key: "start_date".into(),
                reason: "start_date must not be after end_date".into(),
            });
        }
    }
    Ok(data)
}

fn invalid(section: &str, key: &str, reason: String) -> EngineError {
    EngineError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}

/// Positive integer; non-numeric or non-positive values are errors.
pub fn read_period(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, EngineError> {
    let Some(value) = config
        .get_int(section, key)
        .map_err(|reason| invalid(section, key, reason))?
    else {
        return Ok(default);
    };
    if value <= 0 {
        return Err(EngineError::configuration(format!(
            "[{}] {} must be positive, got {}",
            section, key, value
        )));
    }
    Ok(value as usize)
}

pub fn read_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, EngineError> {
    config
        .get_double(section, key)
        .map(|value| value.unwrap_or(default))
        .map_err(|reason| invalid(section, key, reason))
}

fn read_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<NaiveDate>, EngineError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| EngineError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: "invalid date format (expected YYYY-MM-DD)".into(),
            }),
    }
}
