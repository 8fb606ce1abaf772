use super::schema::validate;
use super::views::{RegisterStatus, RiskRegisterRow, RiskView};
use super::ReportError;
use crate::synthesis::{count_status, DealContext, DealSnapshot, Severity, TieOutRow, TieOutStatus};

struct RegisterTemplate {
    id: &'static str,
    risk: &'static str,
    impact_area: &'static str,
    evidence: &'static str,
}

const REGISTER: [RegisterTemplate; 4] = [
    RegisterTemplate {
        id: "R-01",
        risk: "Unsupported one-off addbacks",
        impact_area: "QoE",
        evidence: "ADJ-009 lacks memo evidence",
    },
    RegisterTemplate {
        id: "R-02",
        risk: "Revenue timing cut-off variance",
        impact_area: "Revenue QoE",
        evidence: "EOM spikes in Dec-25 and Feb-26",
    },
    RegisterTemplate {
        id: "R-03",
        risk: "AP aging mismatch",
        impact_area: "Working Capital",
        evidence: "AP>60d balance not fully reconciled",
    },
    RegisterTemplate {
        id: "R-04",
        risk: "Entity mapping drift",
        impact_area: "Data Integrity",
        evidence: "Latest mapping dictionary signed off",
    },
];

fn exposure_range(severity: Severity) -> &'static str {
    match severity {
        Severity::Red => "$0.5M-$1.0M",
        Severity::Amber => "$0.2M-$0.6M",
        Severity::Green => "<$0.2M",
    }
}

/// Register severities escalate with the number of failing and warning tie-outs.
pub fn risk_register(tie_outs: &[TieOutRow]) -> Vec<RiskRegisterRow> {
    let fails = count_status(tie_outs, TieOutStatus::Fail);
    let warns = count_status(tie_outs, TieOutStatus::Warn);

    REGISTER
        .iter()
        .enumerate()
        .map(|(idx, template)| {
            let severity = if idx < fails {
                Severity::Red
            } else if idx < fails + warns + 1 {
                Severity::Amber
            } else {
                Severity::Green
            };
            let status = match severity {
                Severity::Green => RegisterStatus::Mitigated,
                _ => RegisterStatus::Open,
            };

            RiskRegisterRow {
                id: template.id.to_string(),
                risk: template.risk.to_string(),
                severity,
                impact_area: template.impact_area.to_string(),
                exposure_range: exposure_range(severity).to_string(),
                status,
                evidence: template.evidence.to_string(),
            }
        })
        .collect()
}

pub fn build_risk(ctx: &DealContext) -> RiskView {
    let snapshot = DealSnapshot::compute(ctx);
    let tie_outs = snapshot.tie_outs();

    RiskView {
        last_updated: ctx.timestamp(),
        dimensions: snapshot.dimensions(),
        register: risk_register(&tie_outs),
        tie_outs,
        risk_score: snapshot.displayed_risk_score(),
    }
}

pub fn risk_report(ctx: &DealContext) -> Result<RiskView, ReportError> {
    Ok(validate(build_risk(ctx))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: TieOutStatus) -> TieOutRow {
        TieOutRow {
            name: "Cash <-> Bank".to_string(),
            expected: 100.0,
            observed: 99.0,
            diff: -1.0,
            variance_pct: 1.0,
            tolerance_pct: 0.5,
            status,
        }
    }

    #[test]
    fn register_escalates_with_failures() {
        let rows = vec![
            row(TieOutStatus::Fail),
            row(TieOutStatus::Warn),
            row(TieOutStatus::Pass),
        ];
        let register = risk_register(&rows);
        let severities: Vec<_> = register.iter().map(|row| row.severity).collect();
        assert_eq!(
            severities,
            vec![Severity::Red, Severity::Amber, Severity::Amber, Severity::Green]
        );
        assert_eq!(register[0].exposure_range, "$0.5M-$1.0M");
        assert_eq!(register[3].status, RegisterStatus::Mitigated);
    }

    #[test]
    fn clean_tie_outs_still_flag_one_amber_row() {
        let register = risk_register(&[row(TieOutStatus::Pass)]);
        assert_eq!(register[0].severity, Severity::Amber);
        assert_eq!(register[0].status, RegisterStatus::Open);
        assert!(register[1..].iter().all(|row| row.severity == Severity::Green));
    }
}
