//! Test Input
//!
//! The four raw counts every analysis starts from. Validation happens once, at
//! construction, so both engines can rely on `visitors > 0` and
//! `conversions <= visitors` for each variant.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One side of the test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    /// Control (baseline)
    A,
    /// Variant (treatment)
    B,
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Variant::A => write!(f, "A"),
            Variant::B => write!(f, "B"),
        }
    }
}

/// Visitor and conversion counts for both variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTestInput")]
pub struct TestInput {
    visitors_a: u64,
    conversions_a: u64,
    visitors_b: u64,
    conversions_b: u64,
}

/// Unvalidated counts, used to route deserialization through [`TestInput::new`]
#[derive(Deserialize)]
struct RawTestInput {
    visitors_a: u64,
    conversions_a: u64,
    visitors_b: u64,
    conversions_b: u64,
}

impl TryFrom<RawTestInput> for TestInput {
    type Error = InputError;

    fn try_from(raw: RawTestInput) -> Result<Self, Self::Error> {
        TestInput::new(
            raw.visitors_a,
            raw.conversions_a,
            raw.visitors_b,
            raw.conversions_b,
        )
    }
}

/// Errors from validating raw counts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("variant {variant} has no visitors; a conversion rate needs at least one")]
    ZeroVisitors { variant: Variant },

    #[error(
        "variant {variant} has {conversions} conversions but only {visitors} visitors"
    )]
    ConversionsExceedVisitors {
        variant: Variant,
        conversions: u64,
        visitors: u64,
    },
}

impl TestInput {
    /// Validate and build a test input
    pub fn new(
        visitors_a: u64,
        conversions_a: u64,
        visitors_b: u64,
        conversions_b: u64,
    ) -> Result<Self, InputError> {
        check_variant(Variant::A, visitors_a, conversions_a)?;
        check_variant(Variant::B, visitors_b, conversions_b)?;

        Ok(Self {
            visitors_a,
            conversions_a,
            visitors_b,
            conversions_b,
        })
    }

    /// Visitor count for a variant
    pub fn visitors(&self, variant: Variant) -> u64 {
        match variant {
            Variant::A => self.visitors_a,
            Variant::B => self.visitors_b,
        }
    }

    /// Conversion count for a variant
    pub fn conversions(&self, variant: Variant) -> u64 {
        match variant {
            Variant::A => self.conversions_a,
            Variant::B => self.conversions_b,
        }
    }

    /// Observed conversion rate for a variant
    pub fn conversion_rate(&self, variant: Variant) -> f64 {
        self.conversions(variant) as f64 / self.visitors(variant) as f64
    }

    /// Conversion rate of A
    pub fn control_cr(&self) -> f64 {
        self.conversion_rate(Variant::A)
    }

    /// Conversion rate of B
    pub fn variant_cr(&self) -> f64 {
        self.conversion_rate(Variant::B)
    }

    /// Relative uplift of B over A: `variant_cr / control_cr - 1`
    ///
    /// `None` when A never converted, since the ratio has no value there.
    pub fn relative_difference(&self) -> Option<f64> {
        let control_cr = self.control_cr();
        if control_cr > 0.0 {
            Some(self.variant_cr() / control_cr - 1.0)
        } else {
            None
        }
    }

    /// Total visitors across both variants
    ///
    /// Summed as `f64`: two valid `u64` counts can exceed `u64::MAX` together.
    pub fn total_visitors(&self) -> f64 {
        self.visitors_a as f64 + self.visitors_b as f64
    }

    /// Total conversions across both variants
    pub fn total_conversions(&self) -> f64 {
        self.conversions_a as f64 + self.conversions_b as f64
    }
}

fn check_variant(variant: Variant, visitors: u64, conversions: u64) -> Result<(), InputError> {
    if visitors == 0 {
        return Err(InputError::ZeroVisitors { variant });
    }
    if conversions > visitors {
        return Err(InputError::ConversionsExceedVisitors {
            variant,
            conversions,
            visitors,
        });
    }
    Ok(())
}
