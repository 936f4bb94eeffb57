//! Text, JSON and Markdown renderings of an audit report.

use anyhow::Result;
use colored::*;
use std::fmt::Write;
use vigil_auditor::{AuditReport, Severity, Vulnerability};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

pub fn render(
    report: &AuditReport,
    format: OutputFormat,
    include_transcript: bool,
) -> Result<String> {
    match format {
        OutputFormat::Text => generate_text_output(report, include_transcript),
        OutputFormat::Json => generate_json_output(report),
        OutputFormat::Markdown => generate_markdown_output(report, include_transcript),
    }
}

/// Vulnerabilities grouped by severity, most severe first. Unrecognized
/// severities share the last group, in transcript order.
fn grouped(report: &AuditReport) -> Vec<(Severity, Vec<&Vulnerability>)> {
    let mut ordered: Vec<&Vulnerability> = report.vulnerabilities.iter().collect();
    ordered.sort_by_key(|v| std::cmp::Reverse(v.severity.rank()));

    let mut groups: Vec<(Severity, Vec<&Vulnerability>)> = Vec::new();
    for vulnerability in ordered {
        match groups.last_mut() {
            Some((severity, members)) if severity.rank() == vulnerability.severity.rank() => {
                members.push(vulnerability)
            }
            _ => groups.push((vulnerability.severity.clone(), vec![vulnerability])),
        }
    }
    groups
}

fn severity_label(severity: &Severity) -> ColoredString {
    match severity {
        Severity::Critical => "CRITICAL".red().bold(),
        Severity::High => "HIGH".bright_red(),
        Severity::Medium => "MEDIUM".yellow(),
        Severity::Low => "LOW".bright_yellow(),
        Severity::Unrecognized(_) => "UNRATED".bright_black(),
    }
}

fn score_bar(score: u8, max: u8) -> ColoredString {
    let text = format!("{}/{}", score, max);
    let ratio = f64::from(score) / f64::from(max.max(1));
    if ratio >= 0.7 {
        text.red().bold()
    } else if ratio >= 0.4 {
        text.yellow()
    } else {
        text.green()
    }
}

fn generate_text_output(report: &AuditReport, include_transcript: bool) -> Result<String> {
    let mut output = String::new();

    writeln!(&mut output, "\n{}", "════════════════════════════════════════".bright_blue())?;
    writeln!(&mut output, "{}", "     SMART CONTRACT AUDIT REPORT".bright_blue().bold())?;
    writeln!(&mut output, "{}", "════════════════════════════════════════".bright_blue())?;

    writeln!(&mut output, "\n📄 Contract: {}", report.contract_name.bright_white().bold())?;
    writeln!(&mut output, "🕒 Audited: {}", report.timestamp.format("%Y-%m-%d %H:%M:%S UTC"))?;
    if let Some(model) = &report.model {
        writeln!(&mut output, "🤖 Model: {}", model)?;
    }
    writeln!(&mut output, "⚠️  Severity score: {}", score_bar(report.severity_score, 10))?;
    // Quality is good when high, so the colors run the other way.
    let quality = format!("{}/100", report.code_quality_score);
    let quality = match report.code_quality_score {
        80..=100 => quality.green(),
        50..=79 => quality.yellow(),
        _ => quality.red(),
    };
    writeln!(&mut output, "🧹 Code quality: {}", quality)?;
    if let Some(risk) = &report.risk_level {
        writeln!(&mut output, "🎯 Risk level: {}", severity_label(risk))?;
    }

    if let Some(summary) = &report.executive_summary {
        writeln!(&mut output, "\n{}", "Executive Summary".bright_cyan().bold())?;
        writeln!(&mut output, "{}", summary)?;
    }

    if !report.has_findings() {
        writeln!(&mut output, "\n{}", "✨ No findings reported".green())?;
    }

    for (severity, members) in grouped(report) {
        writeln!(
            &mut output,
            "\n{} {} Issues ({})",
            "▶".bright_white(),
            severity_label(&severity),
            members.len()
        )?;
        writeln!(&mut output, "{}", "─".repeat(40).bright_black())?;

        for vulnerability in members {
            writeln!(
                &mut output,
                "\n  {} {}",
                "•".bright_white(),
                vulnerability.vuln_type.bright_white().bold()
            )?;
            let severity = &vulnerability.severity;
            if !severity.is_recognized() && !severity.as_str().is_empty() {
                writeln!(&mut output, "    Reported severity: {}", vulnerability.severity)?;
            }
            if !vulnerability.description.is_empty() {
                writeln!(&mut output, "    {}", vulnerability.description.bright_black())?;
            }
            if !vulnerability.recommendation.is_empty() {
                writeln!(&mut output, "    {} {}", "Fix:".green(), vulnerability.recommendation)?;
            }
        }
    }

    if !report.gas_optimizations.is_empty() {
        writeln!(
            &mut output,
            "\n{} {} ({})",
            "▶".bright_white(),
            "GAS OPTIMIZATIONS".bright_cyan(),
            report.gas_optimizations.len()
        )?;
        writeln!(&mut output, "{}", "─".repeat(40).bright_black())?;
        for optimization in &report.gas_optimizations {
            writeln!(
                &mut output,
                "\n  {} {}",
                "•".bright_white(),
                optimization.issue.bright_white().bold()
            )?;
            if !optimization.location.is_empty() {
                writeln!(&mut output, "    📍 {}", optimization.location)?;
            }
            if !optimization.technique.is_empty() {
                writeln!(&mut output, "    Technique: {}", optimization.technique)?;
            }
            if !optimization.estimated_savings.is_empty() {
                writeln!(&mut output, "    Savings: {}", optimization.estimated_savings.green())?;
            }
        }
    }

    if !report.recommendations.is_empty() {
        writeln!(&mut output, "\n{}", "Recommendations".bright_cyan().bold())?;
        for (i, recommendation) in report.recommendations.iter().enumerate() {
            writeln!(&mut output, "  {}. {}", i + 1, recommendation)?;
        }
    }

    if !report.stage_timings.is_empty() {
        writeln!(&mut output, "\n{}", "Stage timings".bright_black())?;
        for timing in &report.stage_timings {
            writeln!(&mut output, "  {:<22} {:>7} ms", timing.stage.title(), timing.elapsed_ms)?;
        }
    }

    if include_transcript {
        writeln!(&mut output, "\n{}", "═══════════════════════════════".bright_blue())?;
        writeln!(&mut output, "{}", "     FULL TRANSCRIPT".bright_blue().bold())?;
        writeln!(&mut output, "{}", "═══════════════════════════════".bright_blue())?;
        writeln!(&mut output, "{}", report.detailed_report)?;
    }

    Ok(output)
}

fn generate_json_output(report: &AuditReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

fn generate_markdown_output(report: &AuditReport, include_transcript: bool) -> Result<String> {
    let mut output = String::new();

    writeln!(&mut output, "# Smart Contract Audit Report")?;
    writeln!(&mut output, "\n**Contract:** `{}`", report.contract_name)?;
    writeln!(&mut output, "**Date:** {}", report.timestamp.format("%Y-%m-%d %H:%M:%S UTC"))?;
    if let Some(model) = &report.model {
        writeln!(&mut output, "**Model:** {}", model)?;
    }

    writeln!(&mut output, "\n## Summary")?;
    writeln!(&mut output, "\n| Metric | Value |")?;
    writeln!(&mut output, "|--------|-------|")?;
    writeln!(&mut output, "| Severity score | {}/10 |", report.severity_score)?;
    writeln!(&mut output, "| Code quality | {}/100 |", report.code_quality_score)?;
    if let Some(risk) = &report.risk_level {
        writeln!(&mut output, "| Risk level | {} |", risk)?;
    }
    for (severity, members) in grouped(report) {
        if severity.is_recognized() {
            writeln!(&mut output, "| {} findings | {} |", severity, members.len())?;
        }
    }

    if let Some(summary) = &report.executive_summary {
        writeln!(&mut output, "\n{}", summary)?;
    }

    writeln!(&mut output, "\n## Vulnerabilities")?;
    if report.vulnerabilities.is_empty() {
        writeln!(&mut output, "\nNo vulnerabilities reported.")?;
    }
    for (i, vulnerability) in report.vulnerabilities.iter().enumerate() {
        let severity = &vulnerability.severity;
        let label = match severity {
            Severity::Unrecognized(raw) if raw.is_empty() => "UNRATED".to_string(),
            Severity::Unrecognized(raw) => raw.clone(),
            known => known.as_str().to_uppercase(),
        };
        let badge = format!("{} **{}**", severity.emoji(), label);
        writeln!(&mut output, "\n### {}. {} {}", i + 1, badge, vulnerability.vuln_type)?;
        if !vulnerability.description.is_empty() {
            writeln!(&mut output, "\n**Description:**\n{}", vulnerability.description)?;
        }
        if !vulnerability.recommendation.is_empty() {
            writeln!(&mut output, "\n**Fix:**\n{}", vulnerability.recommendation)?;
        }
    }

    if !report.gas_optimizations.is_empty() {
        writeln!(&mut output, "\n## Gas Optimizations")?;
        writeln!(&mut output, "\n| Issue | Location | Technique | Savings |")?;
        writeln!(&mut output, "|-------|----------|-----------|---------|")?;
        for optimization in &report.gas_optimizations {
            writeln!(
                &mut output,
                "| {} | {} | {} | {} |",
                table_cell(&optimization.issue),
                table_cell(&optimization.location),
                table_cell(&optimization.technique),
                table_cell(&optimization.estimated_savings)
            )?;
        }
    }

    if !report.recommendations.is_empty() {
        writeln!(&mut output, "\n## Recommendations\n")?;
        for (i, recommendation) in report.recommendations.iter().enumerate() {
            writeln!(&mut output, "{}. {}", i + 1, recommendation)?;
        }
    }

    if include_transcript {
        writeln!(&mut output, "\n## Full Transcript\n")?;
        writeln!(&mut output, "```text\n{}\n```", report.detailed_report)?;
    }

    Ok(output)
}

fn table_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_auditor::{parse, ReportAssembler};

    const TRANSCRIPT: &str = "VULNERABILITY 1: Reentrancy - Critical
Description: External call before state update.
Fix: Use checks-effects-interactions.

VULNERABILITY 2: Weird - Spicy
Description: odd severity

OPTIMIZATION 1: Cache length
Location: loop | body
Technique: memory
Savings: 100 gas

QUALITY SCORE: 85

RECOMMENDATIONS:
1. Add reentrancy guard";

    fn report() -> AuditReport {
        ReportAssembler::assemble("Vault", parse(TRANSCRIPT), TRANSCRIPT)
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_grouping_orders_by_severity() {
        let report = report();
        let groups = grouped(&report);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, Severity::Critical);
        assert!(!groups[1].0.is_recognized());
    }

    #[test]
    fn test_grouping_merges_unrecognized_severities() {
        let transcript = "VULNERABILITY 1: Odd - Spicy
Description: a

VULNERABILITY 2: Overflow - Low
Description: b

VULNERABILITY 3: Other - Mild
Description: c

VULNERABILITY 4: Reentrancy - High
Description: d";
        let report = ReportAssembler::assemble("Vault", parse(transcript), transcript);
        let groups = grouped(&report);

        let sizes: Vec<usize> = groups.iter().map(|(_, members)| members.len()).collect();
        assert_eq!(sizes, vec![1, 1, 2]);
        assert_eq!(groups[0].0, Severity::High);
        assert_eq!(groups[1].0, Severity::Low);
        assert_eq!(groups[2].1[0].vuln_type, "Odd");
        assert_eq!(groups[2].1[1].vuln_type, "Other");
    }

    #[test]
    fn test_json_round_trips_report_fields() {
        let json = render(&report(), OutputFormat::Json, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["contract_name"], "Vault");
        assert_eq!(value["code_quality_score"], 85);
        assert_eq!(value["vulnerabilities"][0]["type"], "Reentrancy");
        assert_eq!(value["vulnerabilities"][1]["severity"], "Spicy");
    }

    #[test]
    fn test_markdown_escapes_table_cells() {
        let markdown = render(&report(), OutputFormat::Markdown, false).unwrap();
        assert!(markdown.contains("# Smart Contract Audit Report"));
        assert!(markdown.contains("loop \\| body"));
        assert!(markdown.contains("⚪ **Spicy**"));
        assert!(markdown.contains("🔴 **CRITICAL** Reentrancy"));
        assert!(markdown.contains("| Critical findings | 1 |"));
        assert!(!markdown.contains("Full Transcript"));
    }

    #[test]
    fn test_text_includes_transcript_on_request() {
        colored::control::set_override(false);
        let text = render(&report(), OutputFormat::Text, true).unwrap();
        assert!(text.contains("CRITICAL Issues (1)"));
        assert!(text.contains("FULL TRANSCRIPT"));
        assert!(text.contains("Reported severity: Spicy"));
        assert!(!text.contains("No findings reported"));
    }

    #[test]
    fn test_text_without_findings() {
        colored::control::set_override(false);
        let transcript = "QUALITY SCORE: 90";
        let report = ReportAssembler::assemble("Clean", parse(transcript), transcript);
        let text = render(&report, OutputFormat::Text, false).unwrap();
        assert!(text.contains("No findings reported"));
    }
}
