//! Detail view assembly: labelled series for the selected units and period, with
//! prior-year and budget comparisons.

use salesboard_domain::{
    AggregateResult, DetailView, Granularity, Metric, PeriodRequest, ResolvedPeriod, Series,
    SeriesDeltas, SeriesKind, UnitSelection, VatMode, MONTH_NAMES,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregation::Aggregation;
use crate::budget::BudgetPlan;
use crate::calendar::CalendarModel;
use crate::comparison::compare_series;
use crate::error::CoreError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetailQuery {
    pub year: i32,
    pub granularity: Granularity,
    pub metric: Metric,
    #[serde(default)]
    pub vat: VatMode,
    pub selections: Vec<UnitSelection>,
    #[serde(default)]
    pub period: PeriodRequest,
    #[serde(default)]
    pub compare_prior_year: bool,
    #[serde(default)]
    pub compare_budget: bool,
}

impl DetailQuery {
    /// All-groups query over the granularity's default period, gross amounts, no comparisons.
    pub fn new(year: i32, granularity: Granularity, metric: Metric) -> Self {
        Self {
            year,
            granularity,
            metric,
            vat: VatMode::Gross,
            selections: vec![UnitSelection::AllGroups],
            period: PeriodRequest::Default,
            compare_prior_year: false,
            compare_budget: false,
        }
    }

    pub fn with_selections(mut self, selections: Vec<UnitSelection>) -> Self {
        self.selections = selections;
        self
    }

    pub fn with_period(mut self, period: PeriodRequest) -> Self {
        self.period = period;
        self
    }

    pub fn with_vat(mut self, vat: VatMode) -> Self {
        self.vat = vat;
        self
    }

    pub fn with_prior_year(mut self) -> Self {
        self.compare_prior_year = true;
        self
    }

    pub fn with_budget(mut self) -> Self {
        self.compare_budget = true;
        self
    }

    /// Whether the query needs the prior year's aggregate.
    pub fn needs_prior_year(&self) -> bool {
        match self.granularity {
            Granularity::Yearly => true,
            Granularity::Weekly | Granularity::Monthly => self.compare_prior_year,
            Granularity::Daily => false,
        }
    }

    pub fn needs_budget(&self) -> bool {
        self.compare_budget
            && self.metric.supports_budget()
            && matches!(self.granularity, Granularity::Weekly | Granularity::Monthly)
    }
}

/// Aggregates a detail view is derived from.
#[derive(Debug, Clone, Copy)]
pub struct DetailInputs<'a> {
    pub current: &'a Aggregation,
    pub prior: Option<&'a Aggregation>,
    pub budget: Option<&'a BudgetPlan>,
}

/// All Groups first, then units in request order, without duplicates.
pub fn normalize_selections(selections: &[UnitSelection]) -> Vec<UnitSelection> {
    let mut ordered = Vec::with_capacity(selections.len());
    if selections.iter().any(UnitSelection::is_all_groups) {
        ordered.push(UnitSelection::AllGroups);
    }
    for selection in selections {
        if !selection.is_all_groups() && !ordered.contains(selection) {
            ordered.push(selection.clone());
        }
    }
    ordered
}

fn result_for(
    aggregation: &Aggregation,
    selection: &UnitSelection,
    metric: Metric,
) -> Result<AggregateResult, CoreError> {
    match selection {
        UnitSelection::AllGroups => Ok(aggregation.all_groups(metric)),
        UnitSelection::Unit(name) => aggregation
            .unit(name)
            .map(|entry| entry.metric(metric))
            .ok_or_else(|| CoreError::UnknownBusinessUnit(name.clone())),
    }
}

fn slice_of(result: &AggregateResult, start: usize, end: usize) -> Result<Vec<f64>, CoreError> {
    let dense = result
        .dense()
        .ok_or_else(|| CoreError::Validation("expected bucketed values".into()))?;
    dense
        .get(start..=end)
        .map(<[f64]>::to_vec)
        .ok_or_else(|| CoreError::InvalidRange(format!("{start}..={end}")))
}

fn short_year(year: i32) -> String {
    format!("'{:02}", year.rem_euclid(100))
}

pub fn build_detail_view(
    calendar: &CalendarModel,
    query: &DetailQuery,
    period: &ResolvedPeriod,
    inputs: DetailInputs<'_>,
) -> Result<DetailView, CoreError> {
    if inputs.current.granularity != query.granularity {
        return Err(CoreError::Validation(format!(
            "aggregation is {} but the query asks for {}",
            inputs.current.granularity, query.granularity
        )));
    }
    let selections = normalize_selections(&query.selections);
    if selections.is_empty() {
        return Err(CoreError::Validation("no unit selected".into()));
    }

    let mut view = DetailView {
        year: query.year,
        granularity: query.granularity,
        metric: query.metric,
        vat: query.vat,
        labels: Vec::new(),
        series: Vec::new(),
        deltas: Vec::new(),
    };

    match (query.granularity, period) {
        (Granularity::Weekly | Granularity::Monthly, ResolvedPeriod::Indices { start, end }) => {
            view.labels = (*start..=*end)
                .map(|index| match query.granularity {
                    Granularity::Monthly => MONTH_NAMES
                        .get(index)
                        .map(|name| name.to_string())
                        .unwrap_or_default(),
                    _ => calendar.week_label(query.year, index),
                })
                .collect();
            let prior = if query.compare_prior_year {
                inputs.prior
            } else {
                None
            };
            let budget = if query.needs_budget() { inputs.budget } else { None };
            for selection in &selections {
                indexed_series(
                    &mut view,
                    calendar,
                    query,
                    selection,
                    (*start, *end),
                    inputs.current,
                    prior,
                    budget,
                )?;
            }
        }
        (Granularity::Daily, ResolvedPeriod::Days(days)) => {
            if query.compare_prior_year || query.compare_budget {
                debug!("comparisons are not available in the daily view");
            }
            view.labels = days.iter().map(|day| day.format("%Y-%m-%d").to_string()).collect();
            for selection in &selections {
                let result = result_for(inputs.current, selection, query.metric)?;
                let values = days
                    .iter()
                    .map(|day| result.daily_value(*day).unwrap_or(0.0))
                    .collect();
                view.series.push(Series {
                    label: selection.label().to_string(),
                    selection: selection.clone(),
                    kind: SeriesKind::Current,
                    values,
                });
            }
        }
        (Granularity::Yearly, ResolvedPeriod::Years { prior, current }) => {
            let prior_aggregation = inputs.prior.ok_or_else(|| {
                CoreError::Validation("the yearly view needs the prior year aggregate".into())
            })?;
            view.labels = vec![prior.to_string(), current.to_string()];
            for selection in &selections {
                let before = result_for(prior_aggregation, selection, query.metric)?.total();
                let now = result_for(inputs.current, selection, query.metric)?.total();
                view.series.push(Series {
                    label: selection.label().to_string(),
                    selection: selection.clone(),
                    kind: SeriesKind::Current,
                    values: vec![before, now],
                });
            }
        }
        (granularity, other) => {
            return Err(CoreError::InvalidRange(format!(
                "{other:?} does not fit the {granularity} view"
            )))
        }
    }

    Ok(view)
}

#[allow(clippy::too_many_arguments)]
fn indexed_series(
    view: &mut DetailView,
    calendar: &CalendarModel,
    query: &DetailQuery,
    selection: &UnitSelection,
    (start, end): (usize, usize),
    current: &Aggregation,
    prior: Option<&Aggregation>,
    budget: Option<&BudgetPlan>,
) -> Result<(), CoreError> {
    let label = selection.label();
    let values = slice_of(&result_for(current, selection, query.metric)?, start, end)?;
    view.series.push(Series {
        label: format!("{label} {}", short_year(query.year)),
        selection: selection.clone(),
        kind: SeriesKind::Current,
        values: values.clone(),
    });

    let mut deltas = SeriesDeltas {
        selection: selection.clone(),
        vs_prior_year: None,
        vs_budget: None,
    };

    if let Some(prior) = prior {
        if prior.granularity != query.granularity {
            return Err(CoreError::Validation(
                "prior year aggregate has a different granularity".into(),
            ));
        }
        let reference = slice_of(&result_for(prior, selection, query.metric)?, start, end)?;
        deltas.vs_prior_year = Some(compare_series(&values, &reference));
        view.series.push(Series {
            label: format!("{label} {}", short_year(query.year - 1)),
            selection: selection.clone(),
            kind: SeriesKind::PriorYear,
            values: reference,
        });
    }

    if let Some(plan) = budget {
        let map = calendar.week_month_map();
        let full: Vec<f64> = match (query.granularity, selection) {
            (Granularity::Monthly, UnitSelection::AllGroups) => plan.all_groups_monthly().to_vec(),
            (Granularity::Monthly, UnitSelection::Unit(name)) => plan
                .monthly(name)
                .map(|buckets| buckets.to_vec())
                .ok_or_else(|| CoreError::UnknownBusinessUnit(name.clone()))?,
            (_, UnitSelection::AllGroups) => plan.all_groups_weekly(map).to_vec(),
            (_, UnitSelection::Unit(name)) => plan
                .weekly(name, map)
                .map(|buckets| buckets.to_vec())
                .ok_or_else(|| CoreError::UnknownBusinessUnit(name.clone()))?,
        };
        let reference = full
            .get(start..=end)
            .map(<[f64]>::to_vec)
            .ok_or_else(|| CoreError::InvalidRange(format!("{start}..={end}")))?;
        deltas.vs_budget = Some(compare_series(&values, &reference));
        view.series.push(Series {
            label: format!("{label} Budget"),
            selection: selection.clone(),
            kind: SeriesKind::Budget,
            values: reference,
        });
    }

    if deltas.vs_prior_year.is_some() || deltas.vs_budget.is_some() {
        view.deltas.push(deltas);
    }
    Ok(())
}
