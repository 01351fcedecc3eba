//! Terminal rendering: badges, tables and per-model cards.
//!
//! Everything here returns strings so output can be checked without a TTY.
//! Color is gated on [`RenderConfig::color`] rather than on `colored`'s
//! global override.

use std::fmt;
use std::str::FromStr;

use colored::{Color, Colorize};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use evaldash_core::normalize::{
    display_value, DiscountOutput, RulesOutput, StructureOutput, DEFAULT_RULES_MESSAGE,
};
use evaldash_core::{
    by_category, normalize, Accuracy, Classified, EnrichedResult, EvaluationResult,
    EvaluationRunDetail, LlmSpec, Metrics, ModelOutput, ModelType, RunStatus, Status,
};

use crate::pretty::{pretty_json, PrettyConfig};

/// How detail cards present model outputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum View {
    /// Expected and actual output as colored JSON.
    Dev,
    /// Labeled cards built from the normalized outputs.
    #[default]
    Pm,
}

impl FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" => Ok(Self::Dev),
            "pm" => Ok(Self::Pm),
            other => Err(format!("unknown view '{}' (expected dev or pm)", other)),
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dev => "dev",
            Self::Pm => "pm",
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RenderConfig {
    pub color: bool,
    pub view: View,
    /// Display columns kept of each input in the summary table.
    pub input_width: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            color: true,
            view: View::Pm,
            input_width: 48,
        }
    }
}

impl RenderConfig {
    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    fn pretty(&self) -> PrettyConfig {
        PrettyConfig {
            color: self.color,
            ..PrettyConfig::default()
        }
    }
}

// =============================================================================
// Badges and layout helpers
// =============================================================================

pub fn status_badge(status: Status, config: &RenderConfig) -> String {
    let color = if status.is_pass() { Color::Green } else { Color::Red };
    badge(status.as_str(), color, config)
}

pub fn run_status_badge(status: RunStatus, config: &RenderConfig) -> String {
    let color = match status {
        RunStatus::Pass => Color::Green,
        RunStatus::Fail => Color::Red,
        RunStatus::Partial => Color::Yellow,
        RunStatus::Error => Color::Magenta,
    };
    badge(status.as_str(), color, config)
}

fn badge(label: &str, color: Color, config: &RenderConfig) -> String {
    // Pad before painting so escape codes don't count toward width.
    let text = pad(label, "PARTIAL".len());
    if config.color {
        text.color(color).bold().to_string()
    } else {
        text
    }
}

/// Left-align `s` to `width` display columns.
pub fn pad(s: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(s);
    let mut out = s.to_string();
    out.extend(std::iter::repeat(' ').take(width.saturating_sub(used)));
    out
}

/// Cut `s` to at most `max` display columns, marking the cut with `…`.
pub fn truncate(s: &str, max: usize) -> String {
    let flat: String = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if UnicodeWidthStr::width(flat.as_str()) <= max {
        return flat;
    }

    let mut out = String::new();
    let mut used = 0;
    for c in flat.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

/// Plain-text table with display-width aware columns.
fn table(headers: &[&str], rows: &[Vec<String>], config: &RenderConfig) -> String {
    styled_table(headers, rows, config, |_, _, cell| cell)
}

/// Like [`table`], with `style(row, column, padded_cell)` applied to each
/// body cell after layout so escape codes never count toward widths.
fn styled_table<F>(
    headers: &[&str],
    rows: &[Vec<String>],
    config: &RenderConfig,
    style: F,
) -> String
where
    F: Fn(usize, usize, String) -> String,
{
    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.width());
        }
    }

    let layout = |cells: &[String], paint: &dyn Fn(usize, String) -> String| -> String {
        let last = cells.len().saturating_sub(1);
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let padded = if i == last { cell.clone() } else { pad(cell, widths[i]) };
                paint(i, padded)
            })
            .collect::<Vec<_>>()
            .join("  ")
    };

    let mut out = String::new();
    let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    out.push_str(&config.bold(&layout(header.as_slice(), &|_: usize, cell: String| cell)));
    out.push('\n');
    for (r, row) in rows.iter().enumerate() {
        out.push_str(&layout(row.as_slice(), &|c: usize, cell: String| style(r, c, cell)));
        out.push('\n');
    }
    out
}

// =============================================================================
// Dashboard views
// =============================================================================

const STATUS_COLUMN: usize = 3;

/// Summary table: id, category, style, status badge, truncated input.
pub fn summary_table(rows: &[EnrichedResult<'_>], config: &RenderConfig) -> String {
    if rows.is_empty() {
        return format!("{}\n", config.dim("No results match the current filters."));
    }

    // Badges are painted after layout; the plain badge already pads itself.
    let plain = RenderConfig {
        color: false,
        ..*config
    };
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                row.result.id.clone(),
                row.test_case.category.to_string(),
                row.test_case.style.to_string(),
                status_badge(row.result.status, &plain),
                truncate(&row.test_case.input, config.input_width),
            ]
        })
        .collect();

    styled_table(
        &["ID", "CATEGORY", "STYLE", "STATUS", "INPUT"],
        &cells,
        config,
        |r, c, cell| match c {
            STATUS_COLUMN => status_badge(rows[r].result.status, config),
            _ => cell,
        },
    )
}

/// One-line header above a table: count, active filters and accuracy.
pub fn summary_line<T: Classified>(
    title: &str,
    rows: &[T],
    filter: &evaldash_core::FilterState,
    config: &RenderConfig,
) -> String {
    let accuracy = Accuracy::tally(rows);
    format!(
        "{} {} shown, accuracy {} ({} passed, {} failed), filter: {}",
        config.bold(title),
        rows.len(),
        config.bold(&accuracy.label()),
        accuracy.passed,
        accuracy.failed,
        filter
    )
}

/// Expanded card for one row: the test case, then expected and actual output.
pub fn detail(row: &EnrichedResult<'_>, config: &RenderConfig) -> String {
    let model_type = row.result.model_type;
    let mut out = format!(
        "{} {} {} {}\n",
        config.paint("▶", Color::Blue),
        config.bold(&row.result.id),
        config.dim(&format!("({} / test case {})", model_type.label(), row.test_case.id)),
        status_badge(row.result.status, config).trim_end(),
    );
    out.push_str(&format!("  {}: {}\n", config.dim("Input"), row.test_case.input));
    if let Some(kind) = &row.test_case.adversarial_type {
        out.push_str(&format!("  {}: {}\n", config.dim("Adversarial"), kind));
    }

    let sections = [
        ("Expected", row.test_case.expected_for(model_type)),
        ("Actual", Some(&row.result.actual_output)),
    ];
    for (title, value) in sections {
        out.push_str(&format!("  {}\n", config.paint(&format!("{}:", title), Color::Yellow)));
        let body = match value {
            None => config.dim("(no expected output)"),
            Some(value) => match config.view {
                View::Dev => pretty_json(value, &config.pretty()),
                View::Pm => card(&normalize(model_type, value), config),
            },
        };
        out.push_str(&indent(&body, "    "));
    }
    out
}

/// Semantically labeled lines for a normalized output.
pub fn card(output: &ModelOutput, config: &RenderConfig) -> String {
    let mut lines: Vec<String> = Vec::new();

    match output {
        ModelOutput::Structure(StructureOutput::Rejected) => {
            lines.push(config.paint("Rejected input", Color::Red));
        }
        ModelOutput::Structure(StructureOutput::Structured {
            structure_type,
            steps,
        }) => {
            lines.push(format!("{} {}", config.dim("Type:"), structure_type.label()));
            for (i, step) in steps.iter().enumerate() {
                let mut line = format!("{} {}", config.dim(&format!("Step {}:", i + 1)), step.label);
                if !step.hints.is_empty() {
                    line.push_str(&config.dim(&format!(" [{}]", step.hints.join(", "))));
                }
                lines.push(line);
            }
        }
        ModelOutput::Discount(DiscountOutput::Configured { mode: None, .. }) => {
            lines.push(config.dim("No discount"));
        }
        ModelOutput::Discount(DiscountOutput::Configured {
            mode: Some(mode),
            rules,
        }) => {
            lines.push(format!("{} {}", config.dim("Mode:"), mode.label()));
            for rule in rules {
                let qualifier = rule.qualifier.as_ref().map_or("Threshold", |q| q.label());
                lines.push(format!(
                    "- {} {}: {}",
                    qualifier,
                    display_value(&rule.threshold),
                    display_value(&rule.discount)
                ));
            }
        }
        ModelOutput::Rules(RulesOutput::Rules { rules }) if rules.is_empty() => {
            lines.push(config.dim(DEFAULT_RULES_MESSAGE));
        }
        ModelOutput::Rules(RulesOutput::Rules { rules }) => {
            for rule in rules {
                let qualifier = rule.qualifier.as_ref().map_or("Value", |q| q.label());
                let mut line = format!(
                    "- {} {} {}",
                    qualifier,
                    rule.condition_label(),
                    display_value(&rule.value)
                );
                if let Some(step) = rule.step_index {
                    line.push_str(&config.dim(&format!(" (step {})", step.saturating_add(1))));
                }
                lines.push(line);
            }
        }
        ModelOutput::Structure(StructureOutput::Raw { value })
        | ModelOutput::Discount(DiscountOutput::Raw { value })
        | ModelOutput::Rules(RulesOutput::Raw { value }) => {
            lines.push(config.paint("Unrecognized output", Color::Magenta));
            lines.extend(pretty_json(value, &config.pretty()).lines().map(str::to_string));
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn indent(text: &str, prefix: &str) -> String {
    let mut out = String::new();
    for line in text.lines() {
        out.push_str(prefix);
        out.push_str(line);
        out.push('\n');
    }
    out
}

// =============================================================================
// Metrics and LLM specs
// =============================================================================

/// Backend metrics per model type. Accuracy is recomputed from the counts.
pub fn metrics_table(metrics: &Metrics, config: &RenderConfig) -> String {
    let rows: Vec<Vec<String>> = ModelType::ALL
        .into_iter()
        .filter_map(|model_type| {
            let m = metrics.for_model(model_type)?;
            let accuracy = Accuracy {
                passed: m.passed,
                failed: m.failed,
            };
            Some(vec![
                model_type.label().to_string(),
                m.total.to_string(),
                m.passed.to_string(),
                m.failed.to_string(),
                accuracy.label(),
            ])
        })
        .collect();

    if rows.is_empty() {
        return format!("{}\n", config.dim("No metrics reported."));
    }
    table(&["MODEL", "TOTAL", "PASSED", "FAILED", "ACCURACY"], &rows, config)
}

pub fn specs_table(specs: &[LlmSpec], config: &RenderConfig) -> String {
    if specs.is_empty() {
        return format!("{}\n", config.dim("No LLM specs reported."));
    }

    let dash = || "-".to_string();
    let rows: Vec<Vec<String>> = specs
        .iter()
        .map(|spec| {
            vec![
                spec.model_type.map_or_else(dash, |m| m.label().to_string()),
                spec.model.clone(),
                spec.provider.clone().unwrap_or_else(dash),
                spec.temperature.map_or_else(dash, |t| t.to_string()),
                spec.prompt_version.clone().unwrap_or_else(dash),
            ]
        })
        .collect();
    table(&["MODEL TYPE", "LLM", "PROVIDER", "TEMPERATURE", "PROMPT"], &rows, config)
}

// =============================================================================
// Evaluation run
// =============================================================================

/// Latest-run view over already filtered `results`.
pub fn run_view(
    run: &EvaluationRunDetail,
    results: &[&EvaluationResult],
    config: &RenderConfig,
) -> String {
    let accuracy = Accuracy::tally(results);
    let mut out = format!(
        "{} {}  {}\n",
        config.bold("Run"),
        run.run_id,
        config.dim(&format!("started {}", run.started_at.format("%Y-%m-%d %H:%M UTC")))
    );
    out.push_str(&format!(
        "Accuracy {} ({} passed, {} failed of {})\n",
        config.bold(&accuracy.label()),
        config.paint(&accuracy.passed.to_string(), Color::Green),
        config.paint(&accuracy.failed.to_string(), Color::Red),
        accuracy.total()
    ));

    let breakdown = by_category(results);
    if !breakdown.is_empty() {
        out.push('\n');
        let rows: Vec<Vec<String>> = breakdown
            .iter()
            .map(|b| {
                vec![
                    b.category.to_string(),
                    b.accuracy.passed.to_string(),
                    b.accuracy.failed.to_string(),
                    b.accuracy.label(),
                ]
            })
            .collect();
        out.push_str(&table(&["CATEGORY", "PASSED", "FAILED", "ACCURACY"], &rows, config));
    }

    out.push('\n');
    if results.is_empty() {
        out.push_str(&config.dim("No results match the current filters."));
        out.push('\n');
        return out;
    }

    for result in results {
        let badge = match result.status {
            Some(recorded) => run_status_badge(recorded, config),
            None => status_badge(result.status(), config),
        };
        out.push_str(&format!(
            "{} {} {} {}\n",
            badge,
            config.dim(&format!("{}/{}", result.category, result.style)),
            result
                .test_case_id
                .as_deref()
                .map(|id| format!("#{}", id))
                .unwrap_or_default(),
            truncate(&result.text, config.input_width)
        ));
        if !result.rules_result.matched {
            if let Some(explanation) = &result.rules_result.explanation {
                out.push_str(&format!("        {}\n", config.paint(explanation, Color::Yellow)));
            }
        }
    }
    out
}
