//! Fallback coding strategies for residual categorical cells
//!
//! A [`FallbackChain`] holds an ordered list of [`CodingStrategy`]
//! implementations. Each one either produces a numeric code for a text cell
//! or reports why it cannot; the chain takes the first success.

use crate::error::StrategyError;
use sfr_artifact::CategoricalEncoders;
use std::fmt::Debug;

/// Everything a strategy may look at when coding one cell
#[derive(Debug, Clone, Copy)]
pub struct CodingContext<'a> {
    /// Column being coded
    pub column: &'a str,
    /// Text value of the cell
    pub value: &'a str,
    /// All values of this column in the current batch, in row order
    pub column_values: &'a [&'a str],
    /// Encoder artifact, if loaded
    pub encoders: Option<&'a CategoricalEncoders>,
}

/// Converts a text cell to a numeric code
pub trait CodingStrategy: Send + Sync + Debug {
    /// Strategy name (for logging and reports)
    fn name(&self) -> &'static str;

    /// Produce a code or explain the failure
    ///
    /// # Errors
    /// Returns [`StrategyError`] when this strategy cannot code the cell
    fn code(&self, ctx: &CodingContext<'_>) -> Result<f64, StrategyError>;
}

/// Encode with the column's own label encoder; unseen values fail
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnEncoderStrategy;

impl CodingStrategy for ColumnEncoderStrategy {
    fn name(&self) -> &'static str {
        "column_encoder"
    }

    fn code(&self, ctx: &CodingContext<'_>) -> Result<f64, StrategyError> {
        let encoder = ctx
            .encoders
            .and_then(|e| e.column(ctx.column))
            .ok_or_else(|| StrategyError::NoEncoder(ctx.column.to_string()))?;
        Ok(encoder.transform(ctx.value)? as f64)
    }
}

/// Code by order of first appearance among the column's values
///
/// With a single row every value codes to 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstSeenStrategy;

impl CodingStrategy for FirstSeenStrategy {
    fn name(&self) -> &'static str {
        "first_seen"
    }

    fn code(&self, ctx: &CodingContext<'_>) -> Result<f64, StrategyError> {
        let mut distinct: Vec<&str> = Vec::new();
        for v in ctx.column_values {
            if !distinct.contains(v) {
                distinct.push(*v);
            }
        }
        distinct
            .iter()
            .position(|v| *v == ctx.value)
            .map(|i| i as f64)
            .ok_or_else(|| StrategyError::NotInColumn(ctx.value.to_string()))
    }
}

/// Outcome of running the chain on one cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// Numeric code
    pub code: f64,
    /// Strategy that produced it; `None` means every strategy failed and the
    /// default code was used
    pub strategy: Option<&'static str>,
}

/// Ordered list of strategies, tried until one succeeds
#[derive(Debug)]
pub struct FallbackChain {
    strategies: Vec<Box<dyn CodingStrategy>>,
    default_code: f64,
}

impl FallbackChain {
    /// Create empty chain that always yields `default_code`
    #[inline]
    #[must_use]
    pub fn new(default_code: f64) -> Self {
        Self {
            strategies: Vec::new(),
            default_code,
        }
    }

    /// Column encoder, then first-seen order, then code 0
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(0.0)
            .with(ColumnEncoderStrategy)
            .with(FirstSeenStrategy)
    }

    /// Append a strategy
    #[must_use]
    pub fn with(mut self, strategy: impl CodingStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Strategy names in try order
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Code one cell
    #[must_use]
    pub fn resolve(&self, ctx: &CodingContext<'_>) -> Resolution {
        for strategy in &self.strategies {
            match strategy.code(ctx) {
                Ok(code) => {
                    return Resolution {
                        code,
                        strategy: Some(strategy.name()),
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        column = ctx.column,
                        strategy = strategy.name(),
                        "Coding strategy failed: {}",
                        e
                    );
                }
            }
        }
        Resolution {
            code: self.default_code,
            strategy: None,
        }
    }
}

impl Default for FallbackChain {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use sfr_artifact::LabelEncoder;

    fn ctx<'a>(
        column: &'a str,
        value: &'a str,
        column_values: &'a [&'a str],
        encoders: Option<&'a CategoricalEncoders>,
    ) -> CodingContext<'a> {
        CodingContext {
            column,
            value,
            column_values,
            encoders,
        }
    }

    fn soil_encoders() -> CategoricalEncoders {
        let mut encoders = IndexMap::new();
        encoders.insert("Soil_Type".to_string(), LabelEncoder::new(["Clay", "Loamy", "Sandy"]));
        CategoricalEncoders::Columns { encoders }
    }

    #[test]
    fn default_chain_order() {
        assert_eq!(FallbackChain::with_defaults().names(), vec!["column_encoder", "first_seen"]);
    }

    #[test]
    fn encoder_wins_when_value_known() {
        let encoders = soil_encoders();
        let values = ["Sandy"];
        let res = FallbackChain::with_defaults().resolve(&ctx("Soil_Type", "Sandy", &values, Some(&encoders)));
        assert_eq!(
            res,
            Resolution {
                code: 2.0,
                strategy: Some("column_encoder")
            }
        );
    }

    #[test]
    fn first_seen_when_no_encoder() {
        let values = ["Kerala"];
        let res = FallbackChain::with_defaults().resolve(&ctx("Region", "Kerala", &values, None));
        assert_eq!(res.code, 0.0);
        assert_eq!(res.strategy, Some("first_seen"));
    }

    #[test]
    fn first_seen_orders_distinct_values() {
        let values = ["b", "a", "b", "c"];
        let s = FirstSeenStrategy;
        assert_eq!(s.code(&ctx("x", "a", &values, None)), Ok(1.0));
        assert_eq!(s.code(&ctx("x", "c", &values, None)), Ok(2.0));
    }

    #[test]
    fn exhausted_chain_uses_default() {
        let chain = FallbackChain::new(0.0).with(ColumnEncoderStrategy);
        let res = chain.resolve(&ctx("Region", "Kerala", &[], None));
        assert_eq!(
            res,
            Resolution {
                code: 0.0,
                strategy: None
            }
        );
    }
}
