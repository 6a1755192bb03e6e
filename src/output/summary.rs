//! Run summary printed after a crawl

use crate::crawler::CrawlReport;

/// Formats a finished run for the terminal
pub fn format_report(report: &CrawlReport) -> String {
    let scraped = report.records.len();
    let success_rate = if report.target_count > 0 {
        (scraped as f64 / report.target_count as f64) * 100.0
    } else {
        0.0
    };

    let mut out = String::new();
    out.push_str("=== Catalog Crawl Summary ===\n\n");
    out.push_str(&format!("Product pages: {}\n", report.target_count));
    out.push_str(&format!("Scraped: {}\n", scraped));
    out.push_str(&format!("Failed: {}\n", report.failures.len()));
    out.push_str(&format!(
        "Success Rate: {:.1}% ({} / {} pages)\n",
        success_rate, scraped, report.target_count
    ));
    out.push_str(&format!("Elapsed: {:.2}s\n", report.elapsed.as_secs_f64()));

    if !report.failures.is_empty() {
        out.push_str(&format!("\nFailed Pages ({}):\n", report.failures.len()));
        for (url, error) in &report.failures {
            out.push_str(&format!("  - {}: {}\n", url, error));
        }
    }

    out.push_str(&format!("\nExport: {}\n", report.export_path.display()));
    out
}

/// Prints the run summary to stdout
pub fn print_report(report: &CrawlReport) {
    print!("{}", format_report(report));
}
