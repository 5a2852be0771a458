//! Project domain model and its read-only child records.
//!
//! # Responsibility
//! - Define the records exchanged between menu, service and repository.
//! - Fix the decimal scale used for hours and costs.
//!
//! # Invariants
//! - `project_id` is assigned by the store and never changes afterwards.
//! - Child collections are empty vectors unless loaded by a detail fetch.
//! - Materials, steps and categories are projections; nothing here creates
//!   or mutates them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-generated project identity.
pub type ProjectId = i64;

/// Scale of every fixed-point column (`estimated_hours`, `actual_hours`,
/// `cost`).
pub const DECIMAL_SCALE: u32 = 2;

/// Rescales `value` to [`DECIMAL_SCALE`] places, rounding any dropped digits.
///
/// Values whose integer part already fills the 96-bit mantissa keep a smaller
/// scale; callers that need the exact scale check [`Decimal::scale`].
pub fn to_fixed_scale(value: Decimal) -> Decimal {
    let mut scaled = value;
    scaled.rescale(DECIMAL_SCALE);
    scaled
}

/// The five mutable project fields, as collected before the store assigns an
/// identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub project_name: String,
    pub estimated_hours: Decimal,
    pub actual_hours: Decimal,
    /// Expected 1-5. Not validated.
    pub difficulty: i32,
    pub notes: Option<String>,
}

impl NewProject {
    /// Attaches the store-assigned identity. Child collections start empty.
    pub fn into_project(self, project_id: ProjectId) -> Project {
        Project {
            project_id,
            project_name: self.project_name,
            estimated_hours: self.estimated_hours,
            actual_hours: self.actual_hours,
            difficulty: self.difficulty,
            notes: self.notes,
            materials: Vec::new(),
            steps: Vec::new(),
            categories: Vec::new(),
        }
    }
}

/// Persisted project row plus, on detail fetches, its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: ProjectId,
    pub project_name: String,
    pub estimated_hours: Decimal,
    pub actual_hours: Decimal,
    pub difficulty: i32,
    pub notes: Option<String>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Project {
    /// Whether any child collection was populated.
    pub fn has_details(&self) -> bool {
        !(self.materials.is_empty() && self.steps.is_empty() && self.categories.is_empty())
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.project_id, self.project_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub material_id: i64,
    pub project_id: ProjectId,
    pub material_name: String,
    pub num_required: Option<i32>,
    pub cost: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub step_id: i64,
    pub project_id: ProjectId,
    pub step_text: String,
    pub step_order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub category_id: i64,
    pub category_name: String,
}

#[cfg(test)]
mod tests {
    use super::{to_fixed_scale, NewProject};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn to_fixed_scale_pads_and_rounds() {
        assert_eq!(to_fixed_scale(Decimal::from(10)).to_string(), "10.00");
        assert_eq!(
            to_fixed_scale(Decimal::from_str("1.006").unwrap()).to_string(),
            "1.01"
        );
        assert_eq!(
            to_fixed_scale(Decimal::from_str("2.5").unwrap()).to_string(),
            "2.50"
        );
    }

    #[test]
    fn to_fixed_scale_stops_short_for_mantissa_sized_values() {
        assert_eq!(to_fixed_scale(Decimal::MAX).scale(), 0);
    }

    #[test]
    fn into_project_keeps_fields_and_starts_without_children() {
        let project = NewProject {
            project_name: "Build shed".to_string(),
            estimated_hours: Decimal::from(10),
            actual_hours: Decimal::ZERO,
            difficulty: 3,
            notes: None,
        }
        .into_project(7);

        assert_eq!(project.project_id, 7);
        assert_eq!(project.project_name, "Build shed");
        assert!(!project.has_details());
        assert_eq!(project.to_string(), "7: Build shed");
    }
}
