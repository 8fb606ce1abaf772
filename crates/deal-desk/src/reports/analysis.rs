use super::metric::{formula, money_m, pct, whole_pct, MetricBuilder};
use super::schema::validate;
use super::views::{
    Adjustment, AdjustmentStatus, AgingBucket, AnalysisView, ConcentrationPoint, Metric, OpexSlice,
};
use super::ReportError;
use crate::synthesis::noise::round_to;
use crate::synthesis::{DealContext, DealSnapshot, ScenarioParams, Severity};

/// Tilt above which the last adjustment is still only proposed.
const PROPOSED_TILT: f64 = 0.58;

fn count_metric(
    id: &'static str,
    label: &'static str,
    formula: &'static str,
    count: usize,
    (amber, red): (usize, usize),
) -> Metric {
    MetricBuilder::new(id, label, formula)
        .value(count.to_string())
        .severity(Severity::from_count(count, amber, red))
        .build()
}

fn rounded_count(value: f64) -> usize {
    value.round().max(0.0) as usize
}

fn recurring_revenue_pct(params: &ScenarioParams, multiplier: f64) -> f64 {
    (params.recurring_revenue_pct - params.risk_tilt * 6.0 + (multiplier - 1.0) * 6.0)
        .clamp(45.0, 92.0)
}

fn gross_margin_pct(params: &ScenarioParams) -> f64 {
    ((1.0 - (0.56 - params.reported_margin * 0.42)) * 100.0).clamp(28.0, 72.0)
}

fn qoe_metrics(snapshot: &DealSnapshot) -> Vec<Metric> {
    let ltm = &snapshot.ltm;
    let recurring = (84.0 - ltm.adjustment_pct).clamp(58.0, 92.0);
    let high_risk = rounded_count(ltm.adjustment_pct / 2.6).max(1);

    vec![
        MetricBuilder::new("qoe-reported-ebitda", "Reported EBITDA", formula::EBITDA)
            .value(money_m(ltm.reported_ebitda_ltm))
            .build(),
        MetricBuilder::new("qoe-adjusted-ebitda", "Adjusted EBITDA", formula::ADJUSTED_EBITDA)
            .value(money_m(ltm.adjusted_ebitda_ltm))
            .build(),
        MetricBuilder::new("qoe-adjustment-pct", "Adjustment %", formula::ADJUSTMENT_PCT)
            .value(pct(ltm.adjustment_pct))
            .build(),
        MetricBuilder::new(
            "qoe-rec-vs-non",
            "Recurring vs Non-recurring %",
            formula::ADJUSTED_EBITDA,
        )
        .value(format!("{} / {}", whole_pct(recurring), whole_pct(100.0 - recurring)))
        .build(),
        count_metric(
            "qoe-highrisk",
            "High-risk addbacks",
            formula::ADJUSTMENT_PCT,
            high_risk,
            (2, 4),
        ),
        MetricBuilder::new("qoe-margin", "Adj EBITDA margin", formula::GROSS_MARGIN)
            .value(pct(ltm.adjusted_margin_pct()))
            .build(),
        MetricBuilder::new("qoe-count", "Addback count", formula::ADJUSTED_EBITDA)
            .value(rounded_count(ltm.adjustment_pct * 1.5).max(8).to_string())
            .build(),
    ]
}

fn revenue_metrics(snapshot: &DealSnapshot) -> Vec<Metric> {
    let ltm = &snapshot.ltm;
    let params = &snapshot.profile.params;
    let top10 = snapshot.top10_concentration();
    let top1 = snapshot.top1_concentration();
    let top3 = (top10 * 0.6).clamp(14.0, 50.0);
    let top5 = (top10 * 0.8).clamp(20.0, 65.0);
    let eom_flags = rounded_count(params.discount_risk * 4.0 - 0.8);

    vec![
        MetricBuilder::new(
            "rev-reported-norm",
            "Reported vs Normalized revenue",
            formula::REVENUE,
        )
        .value(format!(
            "{} / {}",
            money_m(ltm.revenue_ltm),
            money_m(ltm.revenue_ltm * 0.986)
        ))
        .build(),
        MetricBuilder::new("rev-growth", "Growth %", formula::REVENUE)
            .value(pct(snapshot.trend.window_growth_pct()))
            .build(),
        MetricBuilder::new("rev-recurring", "Recurring revenue %", formula::REVENUE)
            .value(pct(recurring_revenue_pct(params, snapshot.multiplier)))
            .build(),
        MetricBuilder::new("rev-top1", "Concentration (Top 1/3/5/10)", formula::REVENUE)
            .value(format!(
                "{} / {} / {} / {}",
                whole_pct(top1),
                whole_pct(top3),
                whole_pct(top5),
                whole_pct(top10)
            ))
            .build(),
        MetricBuilder::new("rev-vol", "Volatility", formula::REVENUE)
            .value(pct((4.2 + params.volatility_amp * 120.0).clamp(2.8, 16.5)))
            .build(),
        count_metric("rev-eom", "EOM spike flags", formula::DISCOUNT, eom_flags, (1, 3)),
    ]
}

fn margin_metrics(snapshot: &DealSnapshot) -> Vec<Metric> {
    let ltm = &snapshot.ltm;
    let params = &snapshot.profile.params;
    let gross = gross_margin_pct(params);
    let spikes = rounded_count(params.risk_tilt * 5.0 - 1.0);

    vec![
        MetricBuilder::new("margin-gross", "Gross margin %", formula::GROSS_MARGIN)
            .value(pct(gross))
            .build(),
        MetricBuilder::new("margin-ebitda", "EBITDA margin %", formula::EBITDA)
            .value(pct(ltm.reported_margin_pct()))
            .build(),
        MetricBuilder::new("margin-opex", "Opex % of revenue", formula::EBITDA)
            .value(pct(
                (21.0 + params.risk_tilt * 8.0 + ltm.adjustment_pct * 0.12).clamp(16.0, 40.0),
            ))
            .build(),
        MetricBuilder::new("margin-cogs", "COGS % revenue", formula::GROSS_MARGIN)
            .value(pct(100.0 - gross))
            .build(),
        MetricBuilder::new("margin-onetime", "One-time costs", formula::ADJUSTED_EBITDA)
            .value(money_m((ltm.adjustments * 0.36).max(0.2)))
            .build(),
        count_metric("margin-spikes", "Cost spike flags", formula::GROSS_MARGIN, spikes, (1, 3)),
        MetricBuilder::new("margin-payroll", "Payroll % of opex", formula::GROSS_MARGIN)
            .value(pct((30.0 + params.risk_tilt * 14.0).clamp(20.0, 54.0)))
            .build(),
    ]
}

fn working_capital_metrics(snapshot: &DealSnapshot) -> Vec<Metric> {
    let ltm = &snapshot.ltm;
    let tilt = snapshot.profile.params.risk_tilt;

    let dso = (ltm.avg_nwc / (ltm.revenue_ltm / 12.0).max(0.1) * 29.0).clamp(24.0, 63.0);
    let dpo = (dso * (0.66 + tilt * 0.18)).clamp(16.0, 49.0);
    let dio = (dso * (1.05 + tilt * 0.26)).clamp(18.0, 72.0);
    let ccc = dso + dio - dpo;

    let ar60 = (4.4 + tilt * 11.0).clamp(2.0, 22.0);
    let ar60_severity = if ar60 > 12.0 {
        Severity::Red
    } else if ar60 > 8.0 {
        Severity::Amber
    } else {
        Severity::Green
    };
    let ap60 = (3.6 + tilt * 8.0).clamp(2.0, 20.0);
    let ap60_severity = if ap60 > 10.0 {
        Severity::Amber
    } else {
        Severity::Green
    };

    vec![
        MetricBuilder::new("wc-avg", "Avg NWC", formula::NWC)
            .value(money_m(ltm.avg_nwc))
            .build(),
        MetricBuilder::new("wc-peg", "Peg", formula::PEG)
            .value(money_m(ltm.nwc_peg()))
            .build(),
        MetricBuilder::new("wc-dso", "DSO/DPO/DIO/CCC", formula::CCC)
            .value(format!("{dso:.0} / {dpo:.0} / {dio:.0} / {ccc:.0}"))
            .build(),
        MetricBuilder::new("wc-ar60", "AR>60d%", formula::DSO)
            .value(pct(ar60))
            .severity(ar60_severity)
            .build(),
        MetricBuilder::new("wc-ap60", "AP>60d%", formula::DPO)
            .value(pct(ap60))
            .severity(ap60_severity)
            .build(),
    ]
}

fn cash_metrics(snapshot: &DealSnapshot) -> Vec<Metric> {
    let ltm = &snapshot.ltm;
    let tilt = snapshot.profile.params.risk_tilt;
    let capex = (ltm.revenue_ltm * (0.028 + tilt * 0.01)).max(0.8);
    let runway = (24.0 - tilt * 14.0 + ltm.avg_cash_conversion / 10.0).clamp(3.0, 30.0);

    vec![
        MetricBuilder::new("cash-ocf", "OCF (LTM)", formula::CASH_CONVERSION)
            .value(money_m(ltm.ocf_ltm))
            .build(),
        MetricBuilder::new("cash-conv", "Conversion %", formula::CASH_CONVERSION)
            .value(whole_pct(ltm.avg_cash_conversion))
            .build(),
        MetricBuilder::new("cash-capex", "Capex", formula::FREE_CASH_FLOW)
            .value(money_m(capex))
            .build(),
        MetricBuilder::new("cash-fcf", "FCF", formula::FREE_CASH_FLOW)
            .value(money_m(ltm.ocf_ltm - capex))
            .build(),
        MetricBuilder::new("cash-runway", "Runway", formula::RUNWAY)
            .value(format!("{} months", runway.round()))
            .build(),
        MetricBuilder::new("cash-wcdrag", "WC drag", formula::NWC)
            .value(money_m((ltm.avg_nwc * (0.08 + tilt * 0.06)).max(0.2)))
            .build(),
        count_metric(
            "cash-neg",
            "Negative OCF months",
            formula::CASH_CONVERSION,
            snapshot.trend.negative_ocf_months(),
            (1, 3),
        ),
    ]
}

const ADJUSTMENT_TEMPLATES: [(&str, &str, &str); 4] = [
    ("ADJ-001", "One-time Legal", "Settlement expense normalization"),
    ("ADJ-004", "Owner Compensation", "Excess compensation normalization"),
    ("ADJ-009", "Non-operating", "FX one-time impact"),
    ("ADJ-014", "Restructuring", "Post-close duplication costs"),
];

/// Proposed QoE adjustments sized off the LTM adjustment pool.
pub fn adjustments(snapshot: &DealSnapshot) -> Vec<Adjustment> {
    let tilt = snapshot.profile.params.risk_tilt;
    ADJUSTMENT_TEMPLATES
        .iter()
        .enumerate()
        .map(|(idx, (id, category, description))| {
            let share = 0.16 + idx as f64 * 0.12;
            let amount = (snapshot.ltm.adjustments * 1_000_000.0 * share * (0.8 + tilt * 0.6)).round();
            let status = match idx {
                0 | 1 => AdjustmentStatus::Accepted,
                3 if tilt > PROPOSED_TILT => AdjustmentStatus::Proposed,
                _ => AdjustmentStatus::Reviewed,
            };
            Adjustment {
                id: (*id).to_string(),
                category: (*category).to_string(),
                description: (*description).to_string(),
                amount,
                status,
            }
        })
        .collect()
}

fn concentration(snapshot: &DealSnapshot) -> Vec<ConcentrationPoint> {
    let top10 = snapshot.top10_concentration();
    [
        ("Top 1", snapshot.top1_concentration()),
        ("Top 3", top10 * 0.6),
        ("Top 5", top10 * 0.8),
        ("Top 10", top10),
    ]
    .into_iter()
    .map(|(label, value)| ConcentrationPoint {
        label: label.to_string(),
        value: round_to(value, 1),
    })
    .collect()
}

fn aging(tilt: f64) -> Vec<AgingBucket> {
    let bucket = |bucket: &str, ar: f64, ap: f64| AgingBucket {
        bucket: bucket.to_string(),
        ar: round_to(ar, 1),
        ap: round_to(ap, 1),
    };
    vec![
        bucket(
            "0-30",
            (58.0 - tilt * 12.0).clamp(30.0, 80.0),
            (52.0 - tilt * 8.0).clamp(24.0, 78.0),
        ),
        bucket(
            "31-60",
            (27.0 + tilt * 7.0).clamp(12.0, 40.0),
            (31.0 + tilt * 8.0).clamp(14.0, 45.0),
        ),
        bucket(
            "61-90",
            (10.0 + tilt * 4.0).clamp(3.0, 20.0),
            (11.0 + tilt * 4.0).clamp(3.0, 20.0),
        ),
        bucket(
            "90+",
            (5.0 + tilt * 3.0).clamp(1.0, 16.0),
            (6.0 + tilt * 3.0).clamp(1.0, 16.0),
        ),
    ]
}

fn opex_mix(tilt: f64) -> Vec<OpexSlice> {
    let payroll = 30.0 + tilt * 12.0;
    let general = 19.0 + tilt * 4.0;
    let sales = 18.0 + (1.0 - tilt) * 3.0;
    let it = 9.0 + (1.0 - tilt) * 5.0;
    let other = 100.0 - payroll - general - sales - it;

    [
        ("Payroll", payroll.clamp(20.0, 52.0)),
        ("G&A", general.clamp(12.0, 28.0)),
        ("Sales", sales.clamp(12.0, 28.0)),
        ("IT", it.clamp(6.0, 22.0)),
        ("Other", other.clamp(4.0, 18.0)),
    ]
    .into_iter()
    .map(|(name, value)| OpexSlice {
        name: name.to_string(),
        value: round_to(value, 1),
    })
    .collect()
}

/// Financial analysis workspace: QoE, revenue, margin, working capital, and cash.
pub fn build_analysis(ctx: &DealContext) -> AnalysisView {
    let snapshot = DealSnapshot::compute(ctx);
    let tilt = snapshot.profile.params.risk_tilt;

    AnalysisView {
        last_updated: ctx.timestamp(),
        qoe_metrics: qoe_metrics(&snapshot),
        revenue_metrics: revenue_metrics(&snapshot),
        margin_metrics: margin_metrics(&snapshot),
        wc_metrics: working_capital_metrics(&snapshot),
        cash_metrics: cash_metrics(&snapshot),
        adjustments: adjustments(&snapshot),
        concentration: concentration(&snapshot),
        aging: aging(tilt),
        opex_mix: opex_mix(tilt),
        trend: snapshot.trend,
    }
}

pub fn analysis_report(ctx: &DealContext) -> Result<AnalysisView, ReportError> {
    Ok(validate(build_analysis(ctx))?)
}
