use accord_oci::CaseEntry;
use accord_runner::{RunReport, StepKind, StepStatus};

/// One line per known case.
pub fn render_cases(cases: &[CaseEntry]) -> String {
    let width = cases.iter().map(|c| c.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for case in cases {
        out.push_str(&format!("{:width$}  {}\n", case.name, case.description, width = width));
    }
    out
}

/// Render a run report as human-readable text.
pub fn render_report(report: &RunReport) -> String {
    let mut out = format!(
        "case {} ({})\nrun  {}\n\n",
        report.case, report.target, report.run_id
    );

    for step in &report.steps {
        let mark = match step.status {
            StepStatus::Passed => "ok  ",
            StepStatus::Failed => "FAIL",
        };
        let kind = match step.kind {
            StepKind::Apply => "apply",
            StepKind::Import { .. } => "import",
        };
        out.push_str(&format!(
            "  [{}] {}. {:<6} {} ({} ms)",
            mark, step.index, kind, step.description, step.duration_ms
        ));
        if let Some(id) = &step.target_id {
            out.push_str(&format!(" id={}", id));
        }
        out.push('\n');
        if let Some(failure) = &step.failure {
            for line in failure.lines() {
                out.push_str(&format!("         {}\n", line));
            }
        }
    }

    match &report.teardown {
        Some(t) => {
            let verified = match t.verified {
                Some(n) => format!("{} verified gone", n),
                None => "not verified".to_string(),
            };
            let destroyed = if t.destroyed { "destroyed" } else { "destroy failed" };
            out.push_str(&format!("\n  teardown: {}, {}\n", destroyed, verified));
            if let Some(failure) = &t.failure {
                out.push_str(&format!("         {}\n", failure));
            }
        }
        None => out.push_str("\n  teardown: skipped\n"),
    }

    out.push_str(if report.passed { "\nPASSED\n" } else { "\nFAILED\n" });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_config::HarnessSettings;
    use accord_runner::{StepRecord, TeardownRecord};

    fn record(report: &RunReport, index: usize, status: StepStatus, failure: Option<&str>) -> StepRecord {
        let mut r = report.steps[0].clone();
        r.index = index;
        r.status = status;
        r.failure = failure.map(str::to_string);
        r
    }

    fn report() -> RunReport {
        let case = accord_oci::subnet_case(&HarnessSettings::default()).unwrap();
        let mut report = RunReport::new(&case);
        report.steps.push(StepRecord {
            index: 1,
            description: "create with required attributes".into(),
            kind: StepKind::Apply,
            fingerprint: String::new(),
            started_at: report.started_at,
            duration_ms: 12,
            target_id: Some("ocid1.subnet.a".into()),
            identity: None,
            status: StepStatus::Passed,
            failure: None,
        });
        report
    }

    #[test]
    fn cases_are_aligned() {
        let text = render_cases(accord_oci::CASES);
        assert!(text.starts_with("core-subnet  oci_core_subnet:"));
    }

    #[test]
    fn passing_report() {
        let mut report = report();
        report.teardown = Some(TeardownRecord {
            destroyed: true,
            verified: Some(1),
            failure: None,
        });
        report.passed = true;

        let text = render_report(&report);
        assert!(text.contains("  [ok  ] 1. apply  create with required attributes (12 ms) id=ocid1.subnet.a\n"));
        assert!(text.contains("teardown: destroyed, 1 verified gone"));
        assert!(text.ends_with("PASSED\n"));
    }

    #[test]
    fn failures_are_indented_under_their_step() {
        let mut report = report();
        let failed = record(&report, 2, StepStatus::Failed, Some("2 check(s) failed:\n  - a\n  - b"));
        report.steps.push(failed);

        let text = render_report(&report);
        assert!(text.contains("[FAIL] 2."));
        assert!(text.contains("         2 check(s) failed:\n           - a\n"));
        assert!(text.contains("teardown: skipped"));
        assert!(text.ends_with("FAILED\n"));
    }
}
