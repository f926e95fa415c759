use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LboModelError;
use crate::types::*;
use crate::LboModelResult;

/// Evaluated 2-way sensitivity grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityOutput<T> {
    pub variable_1_name: String,
    pub variable_2_name: String,
    pub variable_1_values: Vec<Decimal>,
    pub variable_2_values: Vec<Decimal>,
    /// cells[i][j] = output when variable_1 = variable_1_values[i], variable_2 = variable_2_values[j]
    pub cells: Vec<Vec<T>>,
    /// Position of the base case in the grid (row, col)
    pub base_case_position: (usize, usize),
}

/// A sweep of `base - step, base, base + step`.
pub fn centered_variable(
    name: &str,
    base: Decimal,
    step: Decimal,
) -> LboModelResult<SensitivityVariable> {
    let out_of_range = || LboModelError::InvalidInput {
        field: format!("variable:{name}"),
        reason: format!("{base} +/- {step} is outside the decimal range"),
    };
    Ok(SensitivityVariable {
        name: name.to_string(),
        min: base.checked_sub(step).ok_or_else(out_of_range)?,
        max: base.checked_add(step).ok_or_else(out_of_range)?,
        step,
    })
}

/// Generate the sweep values for a sensitivity variable from min to max with step.
pub fn generate_sweep_values(var: &SensitivityVariable) -> LboModelResult<Vec<Decimal>> {
    if var.step <= Decimal::ZERO {
        return Err(LboModelError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: "Step must be positive".into(),
        });
    }
    if var.min > var.max {
        return Err(LboModelError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: "Min must be <= max".into(),
        });
    }

    let mut values = Vec::new();
    let mut current = var.min;
    while current <= var.max {
        values.push(current);
        let next = match current.checked_add(var.step) {
            Some(next) => next,
            None => break,
        };
        if next == current {
            return Err(LboModelError::InvalidInput {
                field: format!("variable:{}", var.name),
                reason: format!("Step {} is below the precision of {current}", var.step),
            });
        }
        current = next;
    }
    // Ensure max is included if step doesn't land exactly on it
    if let Some(&last) = values.last() {
        if last < var.max {
            values.push(var.max);
        }
    }

    if values.is_empty() {
        values.push(var.min);
    }

    Ok(values)
}

/// Find the closest index to a target value in a sorted list.
fn closest_index(values: &[Decimal], target: Decimal) -> usize {
    values
        .iter()
        .enumerate()
        .min_by_key(|(_, v)| (**v - target).abs())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Evaluate a 2-way sensitivity grid using a provided computation function.
///
/// The `eval_fn` receives (variable_1_value, variable_2_value). The first
/// failing cell aborts the whole grid.
pub fn evaluate_grid<T, F>(
    variable_1: &SensitivityVariable,
    variable_2: &SensitivityVariable,
    mut eval_fn: F,
) -> LboModelResult<SensitivityOutput<T>>
where
    F: FnMut(Decimal, Decimal) -> LboModelResult<T>,
{
    let v1_values = generate_sweep_values(variable_1)?;
    let v2_values = generate_sweep_values(variable_2)?;

    let mut cells = Vec::with_capacity(v1_values.len());
    for v1 in &v1_values {
        let mut row = Vec::with_capacity(v2_values.len());
        for v2 in &v2_values {
            row.push(eval_fn(*v1, *v2)?);
        }
        cells.push(row);
    }

    let mid1 = variable_1.min / dec!(2) + variable_1.max / dec!(2);
    let mid2 = variable_2.min / dec!(2) + variable_2.max / dec!(2);
    let base_row = closest_index(&v1_values, mid1);
    let base_col = closest_index(&v2_values, mid2);

    Ok(SensitivityOutput {
        variable_1_name: variable_1.name.clone(),
        variable_2_name: variable_2.name.clone(),
        variable_1_values: v1_values,
        variable_2_values: v2_values,
        cells,
        base_case_position: (base_row, base_col),
    })
}
