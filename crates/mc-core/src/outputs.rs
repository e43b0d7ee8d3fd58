//! Cohort-level outputs: per-patient samples, summary statistics, and the
//! survival curve.
//!
//! Empty samples are legitimate (a short horizon can leave every patient
//! censored). [`SummaryStat::estimate`] reports them as `EmptySample` and
//! [`SummaryStat::report`] turns them into a "no data" row, so nothing here
//! produces NaN.

use mc_common::{CohortId, Error, Result, Therapy, SCHEMA_VERSION};
use mc_math::{
    max_value, mean, min_value, percentile_interval, sample_stdev, t_confidence_interval, Interval,
};
use serde::Serialize;

use crate::parameters::ParameterKind;
use crate::patient::Patient;

/// Point estimates and intervals for one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` for a single observation.
    pub stdev: Option<f64>,
    pub min: f64,
    pub max: f64,
    /// Student-t interval on the mean; `None` for a single observation.
    pub confidence_interval: Option<Interval>,
    pub percentile_interval: Option<Interval>,
}

/// Named sample with summary statistics at significance level `alpha`.
#[derive(Debug, Clone)]
pub struct SummaryStat {
    name: String,
    values: Vec<f64>,
    alpha: f64,
}

impl SummaryStat {
    pub fn new(name: impl Into<String>, values: Vec<f64>, alpha: f64) -> Self {
        Self {
            name: name.into(),
            values,
            alpha,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn count(&self) -> usize {
        self.values.len()
    }

    pub fn estimate(&self) -> Result<Estimate> {
        if self.values.is_empty() {
            return Err(Error::EmptySample {
                metric: self.name.clone(),
            });
        }
        let v = &self.values;
        let stdev = (v.len() >= 2).then(|| sample_stdev(v));
        Ok(Estimate {
            count: v.len(),
            mean: mean(v),
            stdev,
            min: min_value(v),
            max: max_value(v),
            confidence_interval: t_confidence_interval(v, self.alpha),
            percentile_interval: percentile_interval(v, self.alpha),
        })
    }

    /// Report row; every statistic is `None` for an empty sample.
    pub fn report(&self) -> MetricReport {
        let estimate = self.estimate().ok();
        MetricReport {
            metric: self.name.clone(),
            count: self.values.len(),
            alpha: self.alpha,
            mean: estimate.as_ref().map(|e| e.mean),
            stdev: estimate.as_ref().and_then(|e| e.stdev),
            min: estimate.as_ref().map(|e| e.min),
            max: estimate.as_ref().map(|e| e.max),
            confidence_interval: estimate.as_ref().and_then(|e| e.confidence_interval),
            percentile_interval: estimate.as_ref().and_then(|e| e.percentile_interval),
        }
    }
}

/// Serializable summary of one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricReport {
    pub metric: String,
    pub count: usize,
    pub alpha: f64,
    pub mean: Option<f64>,
    pub stdev: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub confidence_interval: Option<Interval>,
    pub percentile_interval: Option<Interval>,
}

impl MetricReport {
    pub fn has_data(&self) -> bool {
        self.mean.is_some()
    }
}

/// One step of the survival curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub time: f64,
    pub alive: usize,
}

/// Number of patients alive over time, as a right-continuous step function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurvivalCurve {
    points: Vec<CurvePoint>,
}

impl SurvivalCurve {
    /// Build from the initial population and the recorded death times.
    ///
    /// Deaths at the same time collapse into one step.
    pub fn from_deaths(initial: usize, death_times: &[f64]) -> Self {
        let mut times = death_times.to_vec();
        times.sort_by(|a, b| a.total_cmp(b));

        let mut points = vec![CurvePoint {
            time: 0.0,
            alive: initial,
        }];
        let mut alive = initial;
        for t in times {
            alive = alive.saturating_sub(1);
            match points.last_mut() {
                Some(last) if last.time == t => last.alive = alive,
                _ => points.push(CurvePoint { time: t, alive }),
            }
        }
        Self { points }
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// Patients alive at time `t` (after any deaths recorded at `t`).
    pub fn alive_at(&self, t: f64) -> usize {
        let idx = self.points.partition_point(|p| p.time <= t);
        match idx {
            0 => self.points.first().map(|p| p.alive).unwrap_or(0),
            i => self.points[i - 1].alive,
        }
    }

    pub fn initial(&self) -> usize {
        self.points.first().map(|p| p.alive).unwrap_or(0)
    }
}

/// Immutable outputs of one simulated cohort.
#[derive(Debug, Clone)]
pub struct CohortOutputs {
    cohort_id: CohortId,
    therapy: Therapy,
    population_size: usize,
    horizon: f64,
    alpha: f64,
    psa: bool,
    survival_times: Vec<f64>,
    times_to_event: Vec<f64>,
    costs: Vec<f64>,
    utilities: Vec<f64>,
    survival_stat: SummaryStat,
    time_to_event_stat: SummaryStat,
    cost_stat: SummaryStat,
    utility_stat: SummaryStat,
    survival_curve: SurvivalCurve,
}

impl CohortOutputs {
    /// Reduce simulated patients into cohort outputs.
    ///
    /// Censored patients contribute to cost and utility but not to survival
    /// or time-to-event samples.
    pub fn from_patients(
        cohort_id: CohortId,
        therapy: Therapy,
        horizon: f64,
        alpha: f64,
        patients: &[Patient],
    ) -> Self {
        let mut survival_times = Vec::new();
        let mut times_to_event = Vec::new();
        let mut costs = Vec::with_capacity(patients.len());
        let mut utilities = Vec::with_capacity(patients.len());

        for patient in patients {
            if let Some(t) = patient.survival_time() {
                survival_times.push(t);
            }
            if let Some(t) = patient.time_to_event() {
                times_to_event.push(t);
            }
            costs.push(patient.total_discounted_cost());
            utilities.push(patient.total_discounted_utility());
        }

        let psa = patients
            .first()
            .map(|p| matches!(p.parameters().kind(), ParameterKind::Probabilistic { .. }))
            .unwrap_or(false);

        let survival_curve = SurvivalCurve::from_deaths(patients.len(), &survival_times);

        Self {
            cohort_id,
            therapy,
            population_size: patients.len(),
            horizon,
            alpha,
            psa,
            survival_stat: SummaryStat::new("survival time", survival_times.clone(), alpha),
            time_to_event_stat: SummaryStat::new("time to stroke", times_to_event.clone(), alpha),
            cost_stat: SummaryStat::new("discounted cost", costs.clone(), alpha),
            utility_stat: SummaryStat::new("discounted utility", utilities.clone(), alpha),
            survival_times,
            times_to_event,
            costs,
            utilities,
            survival_curve,
        }
    }

    pub fn cohort_id(&self) -> CohortId {
        self.cohort_id
    }

    pub fn therapy(&self) -> Therapy {
        self.therapy
    }

    pub fn population_size(&self) -> usize {
        self.population_size
    }

    /// Survival times of patients absorbed within the horizon.
    pub fn survival_times(&self) -> &[f64] {
        &self.survival_times
    }

    /// Times to first stroke of patients who had one.
    pub fn times_to_event(&self) -> &[f64] {
        &self.times_to_event
    }

    pub fn costs(&self) -> &[f64] {
        &self.costs
    }

    pub fn utilities(&self) -> &[f64] {
        &self.utilities
    }

    /// Patients still alive at the horizon.
    pub fn censored(&self) -> usize {
        self.population_size - self.survival_times.len()
    }

    pub fn survival_stat(&self) -> &SummaryStat {
        &self.survival_stat
    }

    pub fn time_to_event_stat(&self) -> &SummaryStat {
        &self.time_to_event_stat
    }

    pub fn cost_stat(&self) -> &SummaryStat {
        &self.cost_stat
    }

    pub fn utility_stat(&self) -> &SummaryStat {
        &self.utility_stat
    }

    pub fn survival_curve(&self) -> &SurvivalCurve {
        &self.survival_curve
    }

    pub fn report(&self) -> CohortReport {
        CohortReport {
            schema_version: SCHEMA_VERSION.to_string(),
            cohort_id: self.cohort_id,
            therapy: self.therapy,
            population_size: self.population_size,
            horizon: self.horizon,
            alpha: self.alpha,
            psa: self.psa,
            censored: self.censored(),
            events: self.times_to_event.len(),
            metrics: vec![
                self.survival_stat.report(),
                self.time_to_event_stat.report(),
                self.cost_stat.report(),
                self.utility_stat.report(),
            ],
            survival_curve: self.survival_curve.points().to_vec(),
            survival_times: self.survival_times.clone(),
            times_to_event: self.times_to_event.clone(),
        }
    }
}

/// JSON-serializable cohort report.
#[derive(Debug, Clone, Serialize)]
pub struct CohortReport {
    pub schema_version: String,
    pub cohort_id: CohortId,
    pub therapy: Therapy,
    pub population_size: usize,
    pub horizon: f64,
    pub alpha: f64,
    pub psa: bool,
    pub censored: usize,
    pub events: usize,
    pub metrics: Vec<MetricReport>,
    pub survival_curve: Vec<CurvePoint>,
    pub survival_times: Vec<f64>,
    pub times_to_event: Vec<f64>,
}

impl CohortReport {
    /// Markdown table of the metrics.
    pub fn to_markdown(&self) -> String {
        let confidence = (1.0 - self.alpha) * 100.0;
        let mut out = format!(
            "## Cohort {} ({})\n\n{} patients, horizon {} years, {} censored, {} strokes\n\n",
            self.cohort_id, self.therapy, self.population_size, self.horizon, self.censored, self.events
        );
        out.push_str(&format!(
            "| metric | n | mean | {:.0}% CI | {:.0}% PI |\n|---|---|---|---|---|\n",
            confidence, confidence
        ));
        for m in &self.metrics {
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                m.metric,
                m.count,
                fmt_opt(m.mean),
                fmt_interval(m.confidence_interval),
                fmt_interval(m.percentile_interval)
            ));
        }
        out
    }

    /// One-line summary.
    pub fn summary_line(&self) -> String {
        let parts: Vec<String> = self
            .metrics
            .iter()
            .map(|m| format!("{}={}", m.metric.replace(' ', "_"), fmt_opt(m.mean)))
            .collect();
        format!(
            "cohort={} therapy={} n={} censored={} {}",
            self.cohort_id,
            self.therapy,
            self.population_size,
            self.censored,
            parts.join(" ")
        )
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| format!("{:.4}", x))
        .unwrap_or_else(|| "no data".to_string())
}

fn fmt_interval(ci: Option<Interval>) -> String {
    ci.map(|i| format!("[{:.4}, {:.4}]", i.lower, i.upper))
        .unwrap_or_else(|| "-".to_string())
}
