//! Signal evaluation.
//!
//! A [`SignalPolicy`] turns the current bar's inputs into exactly one
//! [`Signal`]. Policies are pure: they read a [`SignalContext`] and never
//! mutate anything, so evaluating twice on the same context yields the same
//! signal. Not-ready indicators arrive as `None` and always resolve to `Hold`.
//!
//! Only [`TrendFilter`] is the default; [`DeclineThenHold`] and
//! [`VolatilityBand`] are alternative rule sets selectable from config.

use std::fmt;

use crate::domain::error::EngineError;
use crate::domain::gate::EntryGate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Enter,
    Exit,
    Hold,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Enter => write!(f, "ENTER"),
            Signal::Exit => write!(f, "EXIT"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}

/// Inputs for one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct SignalContext<'a> {
    pub bar_index: usize,
    pub close: f64,
    /// Trend line (moving average) value, `None` during warm-up.
    pub trend: Option<f64>,
    /// ATR value, `None` during warm-up.
    pub volatility: Option<f64>,
    /// Most recent closes, oldest first, current bar last.
    pub recent_closes: &'a [f64],
    pub in_market: bool,
    pub last_executed_bar: Option<usize>,
}

pub trait SignalPolicy {
    fn name(&self) -> &'static str;

    /// Closes the policy wants in `recent_closes`.
    fn lookback(&self) -> usize {
        1
    }

    fn evaluate(&self, ctx: &SignalContext<'_>) -> Signal;
}

/// Long-only trend filter: buy above the trend line, sell below it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendFilter;

impl SignalPolicy for TrendFilter {
    fn name(&self) -> &'static str {
        "trend"
    }

    fn evaluate(&self, ctx: &SignalContext<'_>) -> Signal {
        let Some(trend) = ctx.trend else {
            return Signal::Hold;
        };
        if !ctx.in_market && ctx.close > trend {
            Signal::Enter
        } else if ctx.in_market && ctx.close < trend {
            Signal::Exit
        } else {
            Signal::Hold
        }
    }
}

/// Buy after `decline_bars` strictly falling closes, sell `hold_bars` bars
/// after the last execution.
#[derive(Debug, Clone, Copy)]
pub struct DeclineThenHold {
    decline_bars: usize,
    hold_bars: usize,
}

impl DeclineThenHold {
    pub fn new(decline_bars: usize, hold_bars: usize) -> Result<Self, EngineError> {
        if decline_bars < 2 {
            return Err(EngineError::configuration(
                "decline_bars must be at least 2",
            ));
        }
        if hold_bars == 0 {
            return Err(EngineError::configuration("hold_bars must be positive"));
        }
        Ok(DeclineThenHold {
            decline_bars,
            hold_bars,
        })
    }
}

impl SignalPolicy for DeclineThenHold {
    fn name(&self) -> &'static str {
        "decline_hold"
    }

    fn lookback(&self) -> usize {
        self.decline_bars
    }

    fn evaluate(&self, ctx: &SignalContext<'_>) -> Signal {
        if ctx.in_market {
            return match ctx.last_executed_bar {
                Some(bar) if ctx.bar_index >= bar + self.hold_bars => Signal::Exit,
                _ => Signal::Hold,
            };
        }

        let closes = ctx.recent_closes;
        if closes.len() < self.decline_bars {
            return Signal::Hold;
        }
        let window = &closes[closes.len() - self.decline_bars..];
        if window.windows(2).all(|pair| pair[1] < pair[0]) {
            Signal::Enter
        } else {
            Signal::Hold
        }
    }
}

/// Buy when ATR is calm, sell when it spikes.
#[derive(Debug, Clone, Copy)]
pub struct VolatilityBand {
    enter_below: f64,
    exit_above: f64,
}

impl VolatilityBand {
    pub fn new(enter_below: f64, exit_above: f64) -> Result<Self, EngineError> {
        if !enter_below.is_finite() || !exit_above.is_finite() {
            return Err(EngineError::configuration(
                "volatility thresholds must be finite",
            ));
        }
        if enter_below > exit_above {
            return Err(EngineError::configuration(format!(
                "atr_enter_below ({}) must not exceed atr_exit_above ({})",
                enter_below, exit_above
            )));
        }
        Ok(VolatilityBand {
            enter_below,
            exit_above,
        })
    }
}

impl SignalPolicy for VolatilityBand {
    fn name(&self) -> &'static str {
        "volatility"
    }

    fn evaluate(&self, ctx: &SignalContext<'_>) -> Signal {
        let Some(atr) = ctx.volatility else {
            return Signal::Hold;
        };
        if !ctx.in_market && atr < self.enter_below {
            Signal::Enter
        } else if ctx.in_market && atr > self.exit_above {
            Signal::Exit
        } else {
            Signal::Hold
        }
    }
}

/// Which policy to build, with its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PolicyConfig {
    Trend,
    DeclineThenHold { decline_bars: usize, hold_bars: usize },
    VolatilityBand { enter_below: f64, exit_above: f64 },
}

impl PolicyConfig {
    pub fn build(&self) -> Result<Box<dyn SignalPolicy>, EngineError> {
        Ok(match *self {
            PolicyConfig::Trend => Box::new(TrendFilter),
            PolicyConfig::DeclineThenHold {
                decline_bars,
                hold_bars,
            } => Box::new(DeclineThenHold::new(decline_bars, hold_bars)?),
            PolicyConfig::VolatilityBand {
                enter_below,
                exit_above,
            } => Box::new(VolatilityBand::new(enter_below, exit_above)?),
        })
    }
}

/// Result of passing a raw signal through the entry gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatedSignal {
    pub signal: Signal,
    /// True when the gate turned an `Enter` into `Hold`.
    pub suppressed: bool,
}

/// Consult `gate` for `Enter` only; other signals pass untouched.
pub fn apply_gate(signal: Signal, gate: &mut dyn EntryGate) -> GatedSignal {
    if signal == Signal::Enter && !gate.permit() {
        GatedSignal {
            signal: Signal::Hold,
            suppressed: true,
        }
    } else {
        GatedSignal {
            signal,
            suppressed: false,
        }
    }
}
