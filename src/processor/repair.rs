//! Validate → repair → validate, bounded.
//!
//! The repair itself (a model call in production) sits behind
//! [`PlanRepairer`]; this module only drives the loop.

use anyhow::{Context, Result};
use serde_json::Value;

use crate::processor::constraints::enforce_hard_constraints;
use crate::processor::validator::run_validator;

/// Produces a new plan from the current one and the validator's report.
pub trait PlanRepairer {
    fn repair(&mut self, plan: &Value, report: &str) -> Result<Value>;
}

impl<F> PlanRepairer for F
where
    F: FnMut(&Value, &str) -> Result<Value>,
{
    fn repair(&mut self, plan: &Value, report: &str) -> Result<Value> {
        self(plan, report)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepairOutcome {
    pub plan: Value,
    /// Validator passes actually run.
    pub passes: usize,
    /// `true` only if the returned plan passed the validator.
    pub clean: bool,
    /// Report that triggered the last repair, when the loop ran out.
    pub last_report: Option<String>,
}

/// Run up to `max_loops` validator passes, repairing after each failing one.
///
/// When the budget runs out the last repaired plan is returned as is (it has
/// not been validated again) together with the report that produced it.
pub fn run_with_validation<R>(mut plan: Value, repairer: &mut R, max_loops: usize) -> Result<RepairOutcome>
where
    R: PlanRepairer + ?Sized,
{
    enforce_hard_constraints(&mut plan);

    let mut last_report = None;
    for pass in 1..=max_loops {
        log::info!("Validator pass {pass}/{max_loops}");

        let Some(report) = run_validator(&plan) else {
            log::info!("Validator pass {pass} clean");
            return Ok(RepairOutcome {
                plan,
                passes: pass,
                clean: true,
                last_report: None,
            });
        };

        log::info!("Validator pass {pass} found problems, repairing:\n{report}");
        plan = repairer
            .repair(&plan, &report)
            .with_context(|| format!("Repairing plan after validator pass {pass}"))?;
        enforce_hard_constraints(&mut plan);
        last_report = Some(report);
    }

    log::warn!(
        "Validator budget of {max_loops} passes used up; keeping the last repaired plan"
    );
    Ok(RepairOutcome {
        plan,
        passes: max_loops,
        clean: false,
        last_report,
    })
}
