use std::io::{self, Write};

use crate::pipeline::BatchReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Write the report to `out` in the requested format. Output is
/// deterministic: fixed section order, fixed row order within sections.
pub fn render<W: Write>(report: &BatchReport, format: OutputFormat, out: &mut W) -> io::Result<()> {
    match format {
        OutputFormat::Text => render_text(report, out),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report).map_err(io::Error::from)?;
            writeln!(out)
        }
    }
}

/// Tab-separated tables, one section per query, skipped lines last.
fn render_text<W: Write>(report: &BatchReport, out: &mut W) -> io::Result<()> {
    writeln!(out, "total_requests\t{}", report.total_requests)?;

    writeln!(out)?;
    writeln!(out, "requests_by_status")?;
    for row in &report.requests_by_status {
        writeln!(out, "{}\t{}", row.status, row.count)?;
    }

    writeln!(out)?;
    writeln!(out, "top_urls")?;
    for row in &report.top_urls {
        writeln!(out, "{}\t{}", row.url, row.count)?;
    }

    writeln!(out)?;
    writeln!(out, "top_user_agents")?;
    for row in &report.top_user_agents {
        writeln!(out, "{}\t{}", row.user_agent, row.count)?;
    }

    writeln!(out)?;
    writeln!(out, "failed_ips")?;
    for row in &report.failed_ips {
        writeln!(out, "{}\t{}", row.ip, row.count)?;
    }

    writeln!(out)?;
    writeln!(out, "requests_over_time")?;
    for row in &report.requests_over_time {
        writeln!(out, "{}\t{}", row.minute, row.count)?;
    }

    if !report.skipped.is_empty() {
        writeln!(out)?;
        writeln!(out, "skipped_lines")?;
        for skipped in &report.skipped {
            writeln!(out, "{}\t{}", skipped.line, skipped.error)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Pipeline, PipelineConfig};

    fn scenario_report() -> BatchReport {
        Pipeline::new(PipelineConfig::default()).run([
            "1.1.1.1,2024-02-25 12:34:56,/home,200,UA1",
            "1.1.1.2,2024-02-25 12:35:10,/home,500,UA2",
            "1.1.1.2,2024-02-25 12:36:10,/login,404,UA2",
            "1.1.1.2,2024-02-25 12:37:10,/login,404,UA2",
            "bad line",
        ])
    }

    #[test]
    fn text_output_lists_every_section_in_order() {
        let mut out = Vec::new();
        render(&scenario_report(), OutputFormat::Text, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "total_requests\t4\n\
             \n\
             requests_by_status\n\
             200\t1\n\
             404\t2\n\
             500\t1\n\
             \n\
             top_urls\n\
             /home\t2\n\
             /login\t2\n\
             \n\
             top_user_agents\n\
             UA2\t3\n\
             UA1\t1\n\
             \n\
             failed_ips\n\
             \n\
             requests_over_time\n\
             2024-02-25 12:34\t1\n\
             2024-02-25 12:35\t1\n\
             2024-02-25 12:36\t1\n\
             2024-02-25 12:37\t1\n\
             \n\
             skipped_lines\n\
             5\texpected 5 fields, got 1\n"
        );
    }

    #[test]
    fn json_output_carries_all_six_tables() {
        let mut out = Vec::new();
        render(&scenario_report(), OutputFormat::Json, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["total_requests"], 4);
        assert_eq!(value["requests_by_status"].as_array().unwrap().len(), 3);
        assert_eq!(value["top_urls"][0]["url"], "/home");
        assert_eq!(value["top_user_agents"][0]["user_agent"], "UA2");
        assert_eq!(value["failed_ips"].as_array().unwrap().len(), 0);
        assert_eq!(value["requests_over_time"][0]["minute"], "2024-02-25 12:34");
        assert_eq!(value["skipped"][0]["line"], 5);
    }
}
