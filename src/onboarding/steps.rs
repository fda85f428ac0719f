//! Step forms — the input schema and validation rules for each step.
//!
//! Validation is pure: a form never touches the profile. On success it
//! yields a [`PartialProfile`] holding exactly the fields its step owns.
//! Every field is checked, and all failures come back together.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ValidationError, ValidationErrors};

use super::budget::{BudgetAllocation, BUDGET_TOTAL};
use super::model::{Investment, PartialProfile, RiskAppetite};
use super::state::Step;

const NAME_MIN_CHARS: usize = 2;
const AGE_MIN: i64 = 18;
const AGE_MAX: i64 = 120;

/// Validation contract shared by the three step forms.
pub trait StepForm {
    /// The step this form belongs to.
    const STEP: Step;

    /// Check every field and build the partial update, or report all
    /// failing fields.
    fn validate(&self) -> Result<PartialProfile, ValidationErrors>;
}

fn finish(
    errors: Vec<ValidationError>,
    partial: impl FnOnce() -> PartialProfile,
) -> Result<PartialProfile, ValidationErrors> {
    if errors.is_empty() {
        Ok(partial())
    } else {
        Err(ValidationErrors(errors))
    }
}

// ── Numeric input ───────────────────────────────────────────────────

/// Number types a form field can hold.
pub trait FieldNumber: Sized {
    /// Parse the text of a JSON number or a numeric string.
    fn parse_field(text: &str) -> Option<Self>;
}

impl FieldNumber for i64 {
    fn parse_field(text: &str) -> Option<Self> {
        text.parse().ok().or_else(|| {
            // Whole floats such as `34.0` still name an integer.
            let f: f64 = text.parse().ok()?;
            (f.fract() == 0.0 && f.abs() < 9.0e15).then_some(f as i64)
        })
    }
}

impl FieldNumber for Decimal {
    fn parse_field(text: &str) -> Option<Self> {
        text.parse()
            .ok()
            .or_else(|| Decimal::from_scientific(text).ok())
    }
}

/// A number as typed into a form field.
///
/// JSON numbers and numeric strings (`34`, `"34"`, `34.0`) are accepted.
/// Anything else is kept verbatim so it is reported as a field error
/// together with every other failing field instead of rejecting the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumberField<T = i64> {
    Value(T),
    Invalid(String),
}

impl<T> From<T> for NumberField<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

impl<T: FieldNumber> NumberField<T> {
    fn from_json(value: serde_json::Value) -> Self {
        use serde_json::Value as J;
        let parsed = match &value {
            J::Number(n) => T::parse_field(&n.to_string()),
            J::String(s) => T::parse_field(s.trim()),
            _ => None,
        };
        match (parsed, value) {
            (Some(n), _) => Self::Value(n),
            (None, J::String(s)) => Self::Invalid(s),
            (None, other) => Self::Invalid(other.to_string()),
        }
    }
}

impl<T: Copy> NumberField<T> {
    /// The number, or a pushed `"{label} must be a number."` error.
    fn number(
        &self,
        field: &'static str,
        label: &str,
        errors: &mut Vec<ValidationError>,
    ) -> Option<T> {
        match self {
            Self::Value(n) => Some(*n),
            Self::Invalid(_) => {
                errors.push(ValidationError::new(field, format!("{label} must be a number.")));
                None
            }
        }
    }
}

impl<T: Serialize> Serialize for NumberField<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(n) => n.serialize(serializer),
            Self::Invalid(raw) => serializer.serialize_str(raw),
        }
    }
}

impl<'de, T: FieldNumber> Deserialize<'de> for NumberField<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from_json)
    }
}

// ── Personal ────────────────────────────────────────────────────────

/// Step 1: who the user is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: Option<NumberField>,
}

impl PersonalInfo {
    pub fn new(name: impl Into<String>, age: i64) -> Self {
        Self {
            name: name.into(),
            age: Some(age.into()),
        }
    }
}

impl StepForm for PersonalInfo {
    const STEP: Step = Step::Personal;

    fn validate(&self) -> Result<PartialProfile, ValidationErrors> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.chars().count() < NAME_MIN_CHARS {
            errors.push(ValidationError::new(
                "name",
                "Name must be at least 2 characters.",
            ));
        }

        let age = match &self.age {
            None => {
                errors.push(ValidationError::new("age", "Age is required."));
                None
            }
            Some(raw) => raw.number("age", "Age", &mut errors),
        };
        let age = match age {
            None => None,
            Some(age) if age < AGE_MIN => {
                errors.push(ValidationError::new(
                    "age",
                    "You must be at least 18 years old.",
                ));
                None
            }
            Some(age) if age > AGE_MAX => {
                errors.push(ValidationError::new("age", "Please enter a valid age."));
                None
            }
            // 18..=120 always fits in a u8.
            Some(age) => u8::try_from(age).ok(),
        };

        finish(errors, || PartialProfile {
            name: Some(name.to_string()),
            age,
            ..Default::default()
        })
    }
}

// ── Financial ───────────────────────────────────────────────────────

/// Raw slider positions as submitted. Savings is not an input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetSliders {
    pub necessities: NumberField,
    pub wants: NumberField,
}

impl Default for BudgetSliders {
    fn default() -> Self {
        let b = BudgetAllocation::default();
        Self {
            necessities: i64::from(b.necessities()).into(),
            wants: i64::from(b.wants()).into(),
        }
    }
}

/// Step 2: cash flow and how it is split.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialInfo {
    #[serde(default)]
    pub monthly_income: Option<NumberField<Decimal>>,
    #[serde(default)]
    pub budget_allocation: BudgetSliders,
}

impl FinancialInfo {
    pub fn new(monthly_income: Decimal, necessities: i64, wants: i64) -> Self {
        Self {
            monthly_income: Some(monthly_income.into()),
            budget_allocation: BudgetSliders {
                necessities: necessities.into(),
                wants: wants.into(),
            },
        }
    }
}

fn percent(
    field: &'static str,
    label: &str,
    raw: &NumberField,
    errors: &mut Vec<ValidationError>,
) -> Option<u8> {
    let value = raw.number(field, label, errors)?;
    if (0..=i64::from(BUDGET_TOTAL)).contains(&value) {
        u8::try_from(value).ok()
    } else {
        errors.push(ValidationError::new(
            field,
            format!("{label} must be between 0 and 100."),
        ));
        None
    }
}

impl StepForm for FinancialInfo {
    const STEP: Step = Step::Financial;

    fn validate(&self) -> Result<PartialProfile, ValidationErrors> {
        let mut errors = Vec::new();

        let income = match &self.monthly_income {
            Some(raw) => raw.number("monthlyIncome", "Monthly income", &mut errors),
            None => Some(Decimal::ZERO),
        };
        let income = match income {
            Some(income) if income > Decimal::ZERO => Some(income),
            Some(_) => {
                errors.push(ValidationError::new(
                    "monthlyIncome",
                    "Monthly income must be greater than 0.",
                ));
                None
            }
            None => None,
        };

        let sliders = &self.budget_allocation;
        let necessities = percent(
            "budgetAllocation.necessities",
            "Necessities",
            &sliders.necessities,
            &mut errors,
        );
        let wants = percent(
            "budgetAllocation.wants",
            "Wants",
            &sliders.wants,
            &mut errors,
        );

        finish(errors, || PartialProfile {
            monthly_income: income,
            budget_allocation: necessities
                .zip(wants)
                .map(|(n, w)| BudgetAllocation::from_sliders(n, w)),
            ..Default::default()
        })
    }
}

// ── Investment ──────────────────────────────────────────────────────

/// Step 3: risk profile and asset classes of interest.
///
/// Values arrive as catalog names so unknown entries can be reported as
/// field errors instead of failing deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentInfo {
    #[serde(default)]
    pub risk_appetite: Option<String>,
    #[serde(default)]
    pub investments: Vec<String>,
}

impl InvestmentInfo {
    pub fn new(risk: RiskAppetite, investments: impl IntoIterator<Item = Investment>) -> Self {
        Self {
            risk_appetite: Some(risk.to_string()),
            investments: investments.into_iter().map(|i| i.to_string()).collect(),
        }
    }
}

impl StepForm for InvestmentInfo {
    const STEP: Step = Step::Investment;

    fn validate(&self) -> Result<PartialProfile, ValidationErrors> {
        let mut errors = Vec::new();

        let risk = match self.risk_appetite.as_deref() {
            None => {
                errors.push(ValidationError::new(
                    "riskAppetite",
                    "Select a risk appetite.",
                ));
                None
            }
            Some(raw) => match raw.parse::<RiskAppetite>() {
                Ok(risk) => Some(risk),
                Err(e) => {
                    errors.push(ValidationError::new("riskAppetite", e));
                    None
                }
            },
        };

        let mut investments = BTreeSet::new();
        let mut unknown = Vec::new();
        for raw in &self.investments {
            match raw.parse::<Investment>() {
                Ok(inv) => {
                    investments.insert(inv);
                }
                Err(_) => unknown.push(raw.as_str()),
            }
        }
        if !unknown.is_empty() {
            errors.push(ValidationError::new(
                "investments",
                format!("Unknown investment type: {}", unknown.join(", ")),
            ));
        } else if investments.is_empty() {
            errors.push(ValidationError::new(
                "investments",
                "Select at least one investment type.",
            ));
        }

        finish(errors, || PartialProfile {
            risk_appetite: risk,
            investments: Some(investments),
            ..Default::default()
        })
    }
}

// ── Tagged submission ───────────────────────────────────────────────

/// A submission for any step, tagged by step id on the wire:
/// `{"step": "personal", "name": "Ada", "age": 34}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepSubmission {
    Personal(PersonalInfo),
    Financial(FinancialInfo),
    Investment(InvestmentInfo),
}

impl StepSubmission {
    pub fn step(&self) -> Step {
        match self {
            Self::Personal(_) => PersonalInfo::STEP,
            Self::Financial(_) => FinancialInfo::STEP,
            Self::Investment(_) => InvestmentInfo::STEP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn owned_fields<F: StepForm>(form: &F) -> Vec<&'static str> {
        form.validate().unwrap().field_names()
    }

    #[test]
    fn valid_forms_touch_only_their_own_fields() {
        let personal = PersonalInfo::new("Ada", 34);
        assert_eq!(owned_fields(&personal), Step::Personal.fields());

        let financial = FinancialInfo::new(dec!(5000), 60, 25);
        assert_eq!(owned_fields(&financial), Step::Financial.fields());

        let investment =
            InvestmentInfo::new(RiskAppetite::Medium, [Investment::Stocks, Investment::Etfs]);
        assert_eq!(owned_fields(&investment), Step::Investment.fields());
    }

    #[test]
    fn personal_reports_every_bad_field() {
        let errors = PersonalInfo::new("", 17).validate().unwrap_err();
        assert_eq!(errors.fields(), vec!["name", "age"]);
        assert_eq!(errors.0[1].reason, "You must be at least 18 years old.");
    }

    #[test]
    fn personal_age_bounds() {
        assert!(PersonalInfo::new("Ada", 18).validate().is_ok());
        assert!(PersonalInfo::new("Ada", 120).validate().is_ok());

        let errors = PersonalInfo::new("Ada", 121).validate().unwrap_err();
        assert_eq!(errors.0[0].reason, "Please enter a valid age.");

        let missing = PersonalInfo {
            name: "Ada".to_string(),
            age: None,
        };
        assert!(missing.validate().unwrap_err().has_field("age"));
    }

    #[test]
    fn personal_name_is_trimmed() {
        assert!(PersonalInfo::new("  A  ", 30).validate().is_err());

        let partial = PersonalInfo::new("  Ada ", 30).validate().unwrap();
        assert_eq!(partial.name.as_deref(), Some("Ada"));
        assert_eq!(partial.age, Some(30));
    }

    #[test]
    fn financial_derives_savings() {
        let partial = FinancialInfo::new(dec!(5000), 60, 25).validate().unwrap();
        let budget = partial.budget_allocation.unwrap();
        assert_eq!(budget.savings(), 15);
        assert_eq!(partial.monthly_income, Some(dec!(5000)));

        let partial = FinancialInfo::new(dec!(100), 80, 30).validate().unwrap();
        let budget = partial.budget_allocation.unwrap();
        assert_eq!((budget.wants(), budget.savings()), (20, 0));
    }

    #[test]
    fn financial_reports_every_bad_field() {
        let errors = FinancialInfo::new(dec!(0), 101, -5).validate().unwrap_err();
        assert_eq!(
            errors.fields(),
            vec![
                "monthlyIncome",
                "budgetAllocation.necessities",
                "budgetAllocation.wants"
            ]
        );

        let errors = FinancialInfo::default().validate().unwrap_err();
        assert_eq!(errors.fields(), vec!["monthlyIncome"]);
    }

    #[test]
    fn investment_requires_a_selection() {
        let errors = InvestmentInfo::new(RiskAppetite::Low, Vec::new())
            .validate()
            .unwrap_err();
        assert_eq!(errors.0[0].reason, "Select at least one investment type.");

        let errors = InvestmentInfo::default().validate().unwrap_err();
        assert_eq!(errors.fields(), vec!["riskAppetite", "investments"]);
    }

    #[test]
    fn investment_rejects_unknown_catalog_values() {
        let form = InvestmentInfo {
            risk_appetite: Some("Extreme".to_string()),
            investments: vec!["Stocks".to_string(), "Gold".to_string()],
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.fields(), vec!["riskAppetite", "investments"]);
        assert!(errors.0[1].reason.contains("Gold"));
    }

    #[test]
    fn investment_deduplicates() {
        let form = InvestmentInfo::new(
            RiskAppetite::High,
            [Investment::Crypto, Investment::Crypto, Investment::Bonds],
        );
        let partial = form.validate().unwrap();
        assert_eq!(partial.investments.unwrap().len(), 2);
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let sub: StepSubmission = serde_json::from_value(serde_json::json!({
            "step": "personal", "name": "Ada", "age": " 34 "
        }))
        .unwrap();
        let StepSubmission::Personal(info) = sub else {
            panic!("expected personal submission");
        };
        assert_eq!(info.validate().unwrap().age, Some(34));

        let info: FinancialInfo = serde_json::from_value(serde_json::json!({
            "monthlyIncome": "5000",
            "budgetAllocation": {"necessities": "60", "wants": 25.0}
        }))
        .unwrap();
        let budget = info.validate().unwrap().budget_allocation.unwrap();
        assert_eq!((budget.wants(), budget.savings()), (25, 15));
    }

    #[test]
    fn non_numeric_input_is_a_field_error() {
        let sub: StepSubmission = serde_json::from_value(serde_json::json!({
            "step": "personal", "name": "", "age": "seventeen"
        }))
        .unwrap();
        let StepSubmission::Personal(info) = sub else {
            panic!("expected personal submission");
        };
        let errors = info.validate().unwrap_err();
        assert_eq!(errors.fields(), vec!["name", "age"]);
        assert_eq!(errors.0[1].reason, "Age must be a number.");

        let info: FinancialInfo = serde_json::from_value(serde_json::json!({
            "monthlyIncome": "lots",
            "budgetAllocation": {"necessities": true, "wants": 10}
        }))
        .unwrap();
        let errors = info.validate().unwrap_err();
        assert_eq!(
            errors.fields(),
            vec!["monthlyIncome", "budgetAllocation.necessities"]
        );
        assert_eq!(errors.0[0].reason, "Monthly income must be a number.");
    }

    #[test]
    fn submission_is_tagged_by_step() {
        let sub: StepSubmission = serde_json::from_value(serde_json::json!({
            "step": "financial",
            "monthlyIncome": 5000,
            "budgetAllocation": {"necessities": 60, "wants": 25}
        }))
        .unwrap();
        assert_eq!(sub.step(), Step::Financial);
        match sub {
            StepSubmission::Financial(info) => {
                assert_eq!(info.monthly_income, Some(NumberField::Value(dec!(5000))));
                assert_eq!(info.budget_allocation.wants, NumberField::Value(25));
            }
            other => panic!("expected financial submission, got {other:?}"),
        }
    }
}
