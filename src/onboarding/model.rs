//! Financial profile and the catalogs its fields draw from.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::budget::BudgetAllocation;

/// How much investment risk the user is willing to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskAppetite {
    Low,
    Medium,
    High,
}

impl Default for RiskAppetite {
    fn default() -> Self {
        Self::Medium
    }
}

impl RiskAppetite {
    pub const ALL: [RiskAppetite; 3] = [Self::Low, Self::Medium, Self::High];

    /// Label shown next to the radio option.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Conservative",
            Self::Medium => "Moderate",
            Self::High => "Aggressive",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Prioritize preserving capital over growth",
            Self::Medium => "Balance between stability and growth",
            Self::High => "Maximize growth potential with higher risk",
        }
    }
}

impl std::fmt::Display for RiskAppetite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

impl std::str::FromStr for RiskAppetite {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(Self::Low),
            "Medium" => Ok(Self::Medium),
            "High" => Ok(Self::High),
            _ => Err(format!("Unknown risk appetite: {}", s)),
        }
    }
}

/// An asset class from the fixed investment catalog.
///
/// Ordering follows declaration order so a `BTreeSet<Investment>` iterates
/// in catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Investment {
    Stocks,
    Bonds,
    Crypto,
    RealEstate,
    MutualFunds,
    #[serde(rename = "ETFs")]
    Etfs,
}

impl Investment {
    pub const CATALOG: [Investment; 6] = [
        Self::Stocks,
        Self::Bonds,
        Self::Crypto,
        Self::RealEstate,
        Self::MutualFunds,
        Self::Etfs,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Stocks => "Stocks",
            Self::Bonds => "Bonds",
            Self::Crypto => "Cryptocurrency",
            Self::RealEstate => "Real Estate",
            Self::MutualFunds => "Mutual Funds",
            Self::Etfs => "ETFs",
        }
    }
}

impl std::fmt::Display for Investment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Stocks => "Stocks",
            Self::Bonds => "Bonds",
            Self::Crypto => "Crypto",
            Self::RealEstate => "RealEstate",
            Self::MutualFunds => "MutualFunds",
            Self::Etfs => "ETFs",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Investment {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::CATALOG
            .into_iter()
            .find(|i| i.to_string() == s)
            .ok_or_else(|| format!("Unknown investment type: {}", s))
    }
}

/// The financial profile collected during onboarding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub age: u8,
    pub monthly_income: Decimal,
    pub budget_allocation: BudgetAllocation,
    pub risk_appetite: RiskAppetite,
    pub investments: BTreeSet<Investment>,
    /// Set when the final step is submitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: String::new(),
            age: 0,
            monthly_income: Decimal::ZERO,
            budget_allocation: BudgetAllocation::default(),
            risk_appetite: RiskAppetite::default(),
            investments: BTreeSet::new(),
            completed_at: None,
        }
    }
}

/// A subset of profile fields produced by one step.
///
/// `None` means "leave the current value alone".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_income: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_allocation: Option<BudgetAllocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_appetite: Option<RiskAppetite>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investments: Option<BTreeSet<Investment>>,
}

impl PartialProfile {
    /// Names of the fields this partial carries, in profile order.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name");
        }
        if self.age.is_some() {
            fields.push("age");
        }
        if self.monthly_income.is_some() {
            fields.push("monthlyIncome");
        }
        if self.budget_allocation.is_some() {
            fields.push("budgetAllocation");
        }
        if self.risk_appetite.is_some() {
            fields.push("riskAppetite");
        }
        if self.investments.is_some() {
            fields.push("investments");
        }
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.field_names().is_empty()
    }
}

/// Settings keys used for profile persistence.
pub mod settings_keys {
    /// Key for the Profile JSON blob in the settings table.
    pub const FINANCIAL_PROFILE: &str = "financial_profile";
    /// Session used when the binary runs single-user.
    pub const DEFAULT_SESSION: &str = "default";
}
