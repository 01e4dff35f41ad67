use anyhow::{Context, Result};
use chrono::Local;
use csv::WriterBuilder;
use serde_json::to_string_pretty;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::analysis::summarize;
use crate::types::*;

/// Supported report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Html,
    Csv,
    Json,
    Tsv,
    All,
}

/// Writes screening results to timestamped report files
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(output_dir: &Path) -> Result<Self> {
        if !output_dir.exists() {
            fs::create_dir_all(output_dir).with_context(|| {
                format!("Failed to create output directory {}", output_dir.display())
            })?;
        }

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Generate reports in the requested format(s), returning the written paths
    pub fn generate(
        &self,
        results: &[ScreeningResult],
        format: ReportFormat,
    ) -> Result<Vec<PathBuf>> {
        let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S-%3f").to_string();

        let written = match format {
            ReportFormat::Html => vec![self.generate_html_report(results, &timestamp)?],
            ReportFormat::Csv => vec![self.generate_delimited_report(results, &timestamp, b',', "csv")?],
            ReportFormat::Json => vec![self.generate_json_report(results, &timestamp)?],
            ReportFormat::Tsv => vec![self.generate_delimited_report(results, &timestamp, b'\t', "tsv")?],
            ReportFormat::All => vec![
                self.generate_html_report(results, &timestamp)?,
                self.generate_delimited_report(results, &timestamp, b',', "csv")?,
                self.generate_json_report(results, &timestamp)?,
                self.generate_delimited_report(results, &timestamp, b'\t', "tsv")?,
            ],
        };

        for path in &written {
            info!("Wrote report {}", path.display());
        }

        Ok(written)
    }

    // Never overwrites: runs in the same millisecond get a numeric suffix.
    fn report_path(&self, timestamp: &str, extension: &str) -> PathBuf {
        let path = self
            .output_dir
            .join(format!("screening_{}.{}", timestamp, extension));
        if !path.exists() {
            return path;
        }

        (1..)
            .map(|n| {
                self.output_dir
                    .join(format!("screening_{}_{}.{}", timestamp, n, extension))
            })
            .find(|candidate| !candidate.exists())
            .unwrap_or(path)
    }

    fn generate_html_report(&self, results: &[ScreeningResult], timestamp: &str) -> Result<PathBuf> {
        let filename = self.report_path(timestamp, "html");

        let html_content = self.create_html_content(results);
        fs::write(&filename, html_content)
            .with_context(|| format!("Failed to write HTML report to {}", filename.display()))?;

        Ok(filename)
    }

    fn create_html_content(&self, results: &[ScreeningResult]) -> String {
        let generated = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let counts = summarize(results);

        let mut rows = String::new();
        for result in results {
            let messages: Vec<String> = result
                .assessment
                .messages
                .iter()
                .map(|m| escape_html(m))
                .collect();

            rows.push_str(&format!(
                "<tr class=\"risk-{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                result.assessment.status,
                escape_html(&result.candidate_id),
                escape_html(&result.source_file),
                result.assessment.status,
                if result.can_unblur_photos { "yes" } else { "no" },
                messages.join("<br>")
            ));
        }

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Compatibility Screening Report</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 40px; background-color: #f5f5f5; }}
        .container {{ max-width: 1200px; margin: 0 auto; background-color: white; padding: 30px; border-radius: 10px; }}
        table {{ width: 100%; border-collapse: collapse; margin: 20px 0; }}
        th, td {{ border: 1px solid #ddd; padding: 12px; text-align: left; vertical-align: top; }}
        th {{ background-color: #2c3e50; color: white; }}
        .risk-safe {{ background-color: #d4edda; }}
        .risk-caution {{ background-color: #fff3cd; }}
        .risk-danger {{ background-color: #f8d7da; }}
    </style>
</head>
<body>
    <div class="container">
        <h1>Compatibility Screening Report</h1>
        <p>Generated on: {}</p>
        <p>{} candidates: {} safe, {} caution, {} danger</p>
        <table>
            <tr><th>Candidate</th><th>Source</th><th>Status</th><th>Photos</th><th>Findings</th></tr>
{}        </table>
    </div>
</body>
</html>"#,
            generated,
            results.len(),
            counts[&RiskLevel::Green],
            counts[&RiskLevel::Amber],
            counts[&RiskLevel::Red],
            rows
        )
    }

    fn generate_delimited_report(
        &self,
        results: &[ScreeningResult],
        timestamp: &str,
        delimiter: u8,
        extension: &str,
    ) -> Result<PathBuf> {
        let filename = self.report_path(timestamp, extension);

        let mut wtr = WriterBuilder::new()
            .delimiter(delimiter)
            .from_path(&filename)
            .with_context(|| format!("Failed to create writer for {}", filename.display()))?;

        wtr.write_record([
            "candidate",
            "source",
            "status",
            "can_unblur_photos",
            "messages",
        ])?;

        for result in results {
            wtr.write_record([
                result.candidate_id.as_str(),
                result.source_file.as_str(),
                result.assessment.status.as_str(),
                if result.can_unblur_photos { "true" } else { "false" },
                result.assessment.messages.join(" | ").as_str(),
            ])?;
        }

        wtr.flush()?;
        Ok(filename)
    }

    fn generate_json_report(&self, results: &[ScreeningResult], timestamp: &str) -> Result<PathBuf> {
        let filename = self.report_path(timestamp, "json");

        let json_content =
            to_string_pretty(results).with_context(|| "Failed to serialize results to JSON")?;

        fs::write(&filename, json_content)
            .with_context(|| format!("Failed to write JSON report to {}", filename.display()))?;

        Ok(filename)
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_results() -> Vec<ScreeningResult> {
        vec![
            ScreeningResult {
                candidate_id: "Tunde".into(),
                source_file: "candidates/tunde.json".into(),
                candidate_role: PartnerRole::Paternal,
                assessment: RiskAssessment {
                    status: RiskLevel::Red,
                    messages: vec![
                        "CRITICAL: Genetic incompatibility. Both partners carry traits (AS + SS). High risk of Sickle Cell Disease.".into(),
                    ],
                },
                can_unblur_photos: false,
            },
            ScreeningResult {
                candidate_id: "Femi".into(),
                source_file: "candidates/femi.toml".into(),
                candidate_role: PartnerRole::Paternal,
                assessment: RiskAssessment {
                    status: RiskLevel::Green,
                    messages: vec!["Genotype compatibility: Safe.".into()],
                },
                can_unblur_photos: true,
            },
        ]
    }

    #[test]
    fn test_generate_all_formats() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let generator = ReportGenerator::new(&temp_dir.path().join("reports"))?;

        let written = generator.generate(&sample_results(), ReportFormat::All)?;
        assert_eq!(written.len(), 4);
        assert!(written.iter().all(|p| p.exists()));

        let html = fs::read_to_string(&written[0])?;
        assert!(html.contains("risk-danger"));
        assert!(html.contains("1 safe, 0 caution, 1 danger"));

        let tsv = fs::read_to_string(&written[3])?;
        let header = tsv.lines().next().unwrap_or_default();
        assert_eq!(header, "candidate\tsource\tstatus\tcan_unblur_photos\tmessages");
        assert!(tsv.contains("Femi\tcandidates/femi.toml\tsafe\ttrue"));

        Ok(())
    }

    #[test]
    fn test_json_report_round_trips() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let generator = ReportGenerator::new(temp_dir.path())?;

        let written = generator.generate(&sample_results(), ReportFormat::Json)?;
        let parsed: Vec<ScreeningResult> = serde_json::from_str(&fs::read_to_string(&written[0])?)?;
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].assessment.status, RiskLevel::Red);
        assert!(!parsed[0].can_unblur_photos);

        Ok(())
    }

    #[test]
    fn test_back_to_back_runs_keep_both_reports() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let generator = ReportGenerator::new(temp_dir.path())?;

        let first = generator.generate(&sample_results(), ReportFormat::Json)?;
        let second = generator.generate(&sample_results()[1..], ReportFormat::Json)?;
        assert_ne!(first[0], second[0]);
        assert!(first[0].exists() && second[0].exists());

        let kept: Vec<ScreeningResult> = serde_json::from_str(&fs::read_to_string(&first[0])?)?;
        assert_eq!(kept.len(), 2);
        Ok(())
    }

    #[test]
    fn test_same_timestamp_gets_suffix() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let generator = ReportGenerator::new(temp_dir.path())?;

        let taken = generator.report_path("2026-01-01_00-00-00-000", "csv");
        fs::write(&taken, "")?;
        let next = generator.report_path("2026-01-01_00-00-00-000", "csv");
        assert_eq!(
            next.file_name().and_then(|n| n.to_str()),
            Some("screening_2026-01-01_00-00-00-000_1.csv")
        );
        Ok(())
    }

    #[test]
    fn test_html_escapes_candidate_names() {
        assert_eq!(escape_html("<b>&\"</b>"), "&lt;b&gt;&amp;&quot;&lt;/b&gt;");
    }
}
