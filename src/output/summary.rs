//! End-of-run report
//!
//! Renders a `CrawlReport` as the plain-text block printed after a crawl.

use crate::crawler::CrawlReport;

/// Formats a crawl report for the terminal
///
/// # Arguments
///
/// * `report` - The finished run's report
///
/// # Returns
///
/// A multi-line string ending in a newline
pub fn format_report(report: &CrawlReport) -> String {
    let mut out = String::new();

    out.push_str("=== Crawl Report ===\n\n");

    match &report.plan {
        Some(plan) => {
            out.push_str(&format!("Target: {}\n", plan.base_url));
            out.push_str(&format!(
                "Pages: {}..={} of {}{}\n",
                plan.start_page,
                plan.end_page(),
                report.total_pages,
                if report.pagination_fallback {
                    " (pagination unavailable)"
                } else {
                    ""
                }
            ));
            out.push_str(&format!("Workers: {}\n", plan.effective_concurrency()));
        }
        None => {
            out.push_str(&format!(
                "Nothing scheduled (target reports {} pages)\n",
                report.total_pages
            ));
        }
    }
    out.push('\n');

    out.push_str("Results:\n");
    out.push_str(&format!("  Pages written: {}\n", report.pages_written.len()));
    out.push_str(&format!(
        "  Pages already on disk: {}\n",
        report.pages_skipped.len()
    ));
    out.push_str(&format!(
        "  Pages without records: {}\n",
        report.pages_empty.len()
    ));
    out.push_str(&format!("  Pages failed: {}\n", report.page_failures.len()));
    out.push_str(&format!("  Records written: {}\n", report.records_written));
    out.push_str(&format!(
        "  Listings skipped: {}\n",
        report.listing_failures.len()
    ));
    out.push_str(&format!("  Distinct listing URLs: {}\n", report.links.len()));
    out.push_str(&format!(
        "  Elapsed: {:.1}s\n",
        report.elapsed.as_secs_f64()
    ));

    if !report.page_failures.is_empty() {
        out.push_str("\nFailed Pages:\n");
        for failure in &report.page_failures {
            out.push_str(&format!("  - page {}: {}\n", failure.page, failure.reason));
        }
    }

    let retry = report.pages_to_retry();
    if !retry.is_empty() {
        let pages: Vec<String> = retry.iter().map(u32::to_string).collect();
        out.push_str(&format!("\nRerun to retry pages: {}\n", pages.join(", ")));
    }

    out
}

/// Prints a crawl report to stdout
pub fn print_report(report: &CrawlReport) {
    print!("{}", format_report(report));
}
