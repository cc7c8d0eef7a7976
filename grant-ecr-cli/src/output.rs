use colored::Colorize;
use grant_ecr_policy::{ConfirmationRequest, GrantMode, GrantReport, PolicyChange, Progress};
use log::debug;
use std::io::{self, Write};

pub(crate) fn note(msg: &str) {
    let _ = writeln!(io::stderr(), "grant-ecr: {msg}");
}

pub(crate) fn error(msg: &str) {
    let _ = writeln!(io::stderr(), "{} {}", "grant-ecr (error):".red(), msg);
}

pub(crate) fn missing_flag(msg: &str) {
    let _ = writeln!(io::stderr(), "{}", msg.red());
}

pub(crate) fn print_confirmation(request: &ConfirmationRequest) {
    let stderr = io::stderr();
    let mut w = stderr.lock();
    let (verb, direction) = match request.mode {
        GrantMode::Grant => ("add", "to"),
        GrantMode::Revoke => ("remove", "from"),
    };
    let _ = writeln!(w);
    let _ = writeln!(w, "    Press {} to {verb} the user:", "ENTER".green());
    let _ = writeln!(
        w,
        "    {} (more specifically: {})",
        request.principal_arn.red(),
        request.target_root_arn.yellow()
    );
    let _ = writeln!(
        w,
        "    {direction} ALL ECR repositories of the currently authenticated user:"
    );
    let _ = writeln!(w, "    {}", request.caller_arn.red());
    let _ = writeln!(w, "    in the region: {}", request.region);
    let _ = writeln!(w);
    let _ = w.flush();
}

pub(crate) fn print_progress(progress: Progress) {
    let line = match progress {
        Progress::FetchingPolicies { repositories } => {
            debug!("Fetching policies of {repositories} repositories");
            "Fetching policies...".yellow()
        }
        Progress::PoliciesFetched => "Policies fetched!".green(),
        Progress::UpdatingPolicies => "Updating policies...".yellow(),
        Progress::PoliciesUpdated => "Policies updated!".green(),
    };
    let _ = writeln!(io::stderr(), "{line}");
}

pub(crate) fn print_report(report: &GrantReport) {
    let stderr = io::stderr();
    let mut w = stderr.lock();

    for outcome in &report.outcomes {
        let name = &outcome.repository.name;
        match &outcome.result {
            Ok(PolicyChange::Updated { statements }) => {
                let _ = writeln!(
                    w,
                    "  {} {name} ({statements} statements)",
                    "updated".green()
                );
            }
            Ok(PolicyChange::Deleted) => {
                let _ = writeln!(w, "  {} {name} (policy removed)", "deleted".green());
            }
            Ok(PolicyChange::Unchanged) => {
                let _ = writeln!(w, "  {} {name} (no policy)", "skipped".normal());
            }
            Err(e) => {
                let _ = writeln!(w, "  {} {name}: {e}", "failed".red());
            }
        }
    }

    let succeeded = report.succeeded().count();
    let failed = report.failed().count();
    let _ = writeln!(w);
    if failed == 0 {
        let _ = writeln!(
            w,
            "{}",
            format!("{succeeded} repositories processed").green()
        );
    } else {
        let _ = writeln!(
            w,
            "{}",
            format!("{succeeded} repositories processed, {failed} failed").red()
        );
    }
}
