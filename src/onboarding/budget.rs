//! Budget split across necessities, wants and savings.
//!
//! Only necessities and wants are user inputs. Savings is always derived as
//! the remainder, so the three percentages sum to exactly 100 after any
//! sequence of edits.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The whole a budget split must add up to.
pub const BUDGET_TOTAL: u8 = 100;

/// Percentages of monthly income assigned to each spending bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SliderValues")]
pub struct BudgetAllocation {
    necessities: u8,
    wants: u8,
    savings: u8,
}

/// Wire shape for an incoming allocation. A client-sent `savings` key is
/// ignored like any other unknown field; it is always recomputed.
#[derive(Debug, Deserialize)]
struct SliderValues {
    necessities: u8,
    wants: u8,
}

impl From<SliderValues> for BudgetAllocation {
    fn from(s: SliderValues) -> Self {
        Self::from_sliders(s.necessities, s.wants)
    }
}

impl Default for BudgetAllocation {
    fn default() -> Self {
        Self::from_sliders(50, 30)
    }
}

impl BudgetAllocation {
    /// Build an allocation from the two slider values.
    ///
    /// Necessities takes priority: it is capped at 100, then wants is capped
    /// at whatever necessities leaves over. Savings gets the remainder.
    pub fn from_sliders(necessities: u8, wants: u8) -> Self {
        let necessities = necessities.min(BUDGET_TOTAL);
        let wants = wants.min(BUDGET_TOTAL - necessities);
        Self {
            necessities,
            wants,
            savings: BUDGET_TOTAL - necessities - wants,
        }
    }

    /// Move the necessities slider. Shrinks wants if the two no longer fit.
    pub fn set_necessities(&mut self, necessities: u8) {
        *self = Self::from_sliders(necessities, self.wants);
    }

    /// Move the wants slider. Capped at `100 - necessities`.
    pub fn set_wants(&mut self, wants: u8) {
        *self = Self::from_sliders(self.necessities, wants);
    }

    pub fn necessities(&self) -> u8 {
        self.necessities
    }

    pub fn wants(&self) -> u8 {
        self.wants
    }

    pub fn savings(&self) -> u8 {
        self.savings
    }

    /// Split a monthly income into currency amounts per bucket.
    ///
    /// Necessities and wants are rounded to cents; savings takes the exact
    /// remainder so the three amounts always add back up to `income`.
    pub fn amounts(&self, income: Decimal) -> BudgetAmounts {
        let hundred = Decimal::from(BUDGET_TOTAL);
        let necessities = (income * Decimal::from(self.necessities) / hundred).round_dp(2);
        let wants = (income * Decimal::from(self.wants) / hundred).round_dp(2);
        BudgetAmounts {
            necessities,
            wants,
            savings: income - necessities - wants,
        }
    }
}

/// Monthly currency amounts for each budget bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BudgetAmounts {
    pub necessities: Decimal,
    pub wants: Decimal,
    pub savings: Decimal,
}
