use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use smokesim_game::SimRules;
use smokesim_game::constants::{STAT_MAX, STAT_MIN};
use smokesim_game::numbers::{i64_to_f64, u64_to_f64, usize_to_f64};

use super::policy::LifestylePolicy;
use super::simulation::{LifeRecord, RunPlan, run_life};

/// Aggregate of every life one lifestyle played across seeds and iterations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyReport {
    pub policy: LifestylePolicy,
    pub passed: bool,
    pub lives_run: usize,
    pub lives_ended: usize,
    pub mean_real_age_years: f64,
    pub mean_bio_age_years: f64,
    pub mean_years_lost: f64,
    pub max_years_lost: i64,
    pub mean_units: f64,
    pub mean_collapses: f64,
    pub mean_refusals: f64,
    pub causes: BTreeMap<String, usize>,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
}

impl PolicyReport {
    fn from_records(policy: LifestylePolicy, records: &[LifeRecord], durations: &[Duration]) -> Self {
        let mut causes = BTreeMap::new();
        let mut failures = Vec::new();
        for record in records {
            *causes
                .entry(record.summary.cause_name().to_string())
                .or_insert(0) += 1;
            if let Some(err) = evaluate_expectations(policy, record) {
                failures.push(format!(
                    "seed {} ({}ms, real {}y bio {}y, {}): {err}",
                    record.seed,
                    record.elapsed_ms,
                    record.summary.real_age_years,
                    record.summary.bio_age_years,
                    record.summary.cause_name()
                ));
            }
        }

        let average_duration = if durations.is_empty() {
            Duration::ZERO
        } else {
            durations.iter().sum::<Duration>() / u32::try_from(durations.len()).unwrap_or(1)
        };

        Self {
            policy,
            passed: failures.is_empty(),
            lives_run: records.len(),
            lives_ended: records.iter().filter(|r| r.ended()).count(),
            mean_real_age_years: mean(records, |r| i64_to_f64(r.summary.real_age_years)),
            mean_bio_age_years: mean(records, |r| i64_to_f64(r.summary.bio_age_years)),
            mean_years_lost: mean(records, |r| i64_to_f64(r.summary.years_lost)),
            max_years_lost: records
                .iter()
                .map(|r| r.summary.years_lost)
                .max()
                .unwrap_or(0),
            mean_units: mean(records, |r| u64_to_f64(r.summary.units_consumed)),
            mean_collapses: mean(records, |r| f64::from(r.tally.collapses)),
            mean_refusals: mean(records, |r| f64::from(r.tally.refusals)),
            causes,
            failures,
            average_duration,
        }
    }
}

fn mean(records: &[LifeRecord], value: impl Fn(&LifeRecord) -> f64) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().map(value).sum::<f64>() / usize_to_f64(records.len())
}

/// Runs every lifestyle against a seed list and checks the outcome.
pub struct LifeTester {
    rules: SimRules,
    verbose: bool,
    decision_interval_ms: Option<i64>,
    limit_ms: Option<i64>,
}

impl LifeTester {
    #[must_use]
    pub const fn new(rules: SimRules, verbose: bool) -> Self {
        Self {
            rules,
            verbose,
            decision_interval_ms: None,
            limit_ms: None,
        }
    }

    #[must_use]
    pub const fn with_decision_interval(mut self, decision_interval_ms: Option<i64>) -> Self {
        self.decision_interval_ms = decision_interval_ms;
        self
    }

    #[must_use]
    pub const fn with_limit(mut self, limit_ms: Option<i64>) -> Self {
        self.limit_ms = limit_ms;
        self
    }

    fn plan(&self, policy: LifestylePolicy, seed: u64) -> RunPlan {
        let plan = RunPlan::new(policy, seed);
        plan.with_limits(
            self.decision_interval_ms.unwrap_or(plan.decision_interval_ms),
            self.limit_ms.unwrap_or(plan.limit_ms),
        )
    }

    pub fn run_policy(
        &self,
        policy: LifestylePolicy,
        seeds: &[u64],
        iterations: usize,
    ) -> (PolicyReport, Vec<LifeRecord>) {
        let mut records = Vec::new();
        let mut durations = Vec::new();

        for &seed in seeds {
            if self.verbose {
                println!(
                    "🚬 Lifestyle: {} (seed: {})",
                    policy.label().bright_white(),
                    seed
                );
            }
            for i in 0..iterations {
                let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));
                let started = Instant::now();
                let record = run_life(&self.rules, &self.plan(policy, iteration_seed));
                let duration = started.elapsed();
                durations.push(duration);

                if self.verbose {
                    let line = format!(
                        "  Iteration {}/{} ({duration:?}) real {}y bio {}y cause: {}",
                        i + 1,
                        iterations,
                        record.summary.real_age_years,
                        record.summary.bio_age_years,
                        record.summary.cause_name()
                    );
                    if evaluate_expectations(policy, &record).is_some() {
                        println!("{}", line.red());
                    } else {
                        println!("{line}");
                    }
                }
                records.push(record);
            }
        }

        let report = PolicyReport::from_records(policy, &records, &durations);
        (report, records)
    }
}

fn evaluate_expectations(policy: LifestylePolicy, record: &LifeRecord) -> Option<String> {
    let state = &record.final_state;
    let stats = [
        ("stamina", state.stamina),
        ("toxicity", state.toxicity_level),
        ("addiction", state.addiction_level),
        ("hunger", state.hunger_level),
        ("sedentary", state.sedentary_level),
    ];
    for (name, value) in stats {
        if !(STAT_MIN..=STAT_MAX).contains(&value) {
            return Some(format!("{name} out of range: {value}"));
        }
    }
    if state.is_terminal != state.terminal_cause.is_some() {
        return Some("terminal flag and cause disagree".to_string());
    }
    if !record.ended() {
        return Some(format!("still alive after {}ms", record.elapsed_ms));
    }

    match policy {
        LifestylePolicy::Abstainer => {
            if record.summary.units_consumed != 0 {
                return Some(format!("smoked {} units", record.summary.units_consumed));
            }
            if record.summary.years_lost > 1 {
                return Some(format!("lost {} years", record.summary.years_lost));
            }
        }
        LifestylePolicy::ChainSmoker => {
            if record.summary.units_consumed == 0 {
                return Some("never smoked".to_string());
            }
        }
        LifestylePolicy::Balanced | LifestylePolicy::Random => {}
    }
    None
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_micros().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let micros = u128::deserialize(deserializer)?;
        Ok(Duration::from_micros(u64::try_from(micros).unwrap_or(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abstainer_report_passes() {
        let tester = LifeTester::new(SimRules::default(), false);
        let (report, records) = tester.run_policy(LifestylePolicy::Abstainer, &[1, 2], 1);
        assert_eq!(report.lives_run, 2);
        assert_eq!(records.len(), 2);
        assert!(report.passed, "{:?}", report.failures);
        assert_eq!(report.causes.values().sum::<usize>(), 2);
        assert!(report.mean_units.abs() < f64::EPSILON);
    }

    #[test]
    fn short_limit_fails_expectations() {
        let tester = LifeTester::new(SimRules::default(), false).with_limit(Some(5_000));
        let (report, _) = tester.run_policy(LifestylePolicy::Balanced, &[7], 1);
        assert!(!report.passed);
        assert!(report.failures[0].contains("still alive"));
        assert_eq!(report.causes.get("alive"), Some(&1));
    }

    #[test]
    fn chain_smoker_loses_more_years_than_abstainer() {
        let tester = LifeTester::new(SimRules::default(), false);
        let (clean, _) = tester.run_policy(LifestylePolicy::Abstainer, &[3], 1);
        let (smoker, _) = tester.run_policy(LifestylePolicy::ChainSmoker, &[3], 1);
        assert!(smoker.mean_years_lost > clean.mean_years_lost);
        assert!(smoker.mean_units > 0.0);
    }

    #[test]
    fn durations_serialize_as_micros() {
        let report = PolicyReport::from_records(
            LifestylePolicy::Random,
            &[],
            &[Duration::from_micros(10), Duration::from_micros(30)],
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["average_duration"], 20);
        assert_eq!(json["policy"], "random");
    }
}
