use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::models::{Scenario, Trend};
use crate::predict::format_gpa;

const BAR_WIDTH: usize = 40;

/// Renders ordered (label, value) pairs as horizontal bars. The scale runs to
/// the larger of the highest value and 10.0, the top of the GPA range, so a
/// full-width bar always means a perfect score.
pub fn render_bar_chart(entries: &[(String, f64)]) -> String {
    if entries.is_empty() {
        return String::from("(nothing to chart)\n");
    }

    let scale = entries
        .iter()
        .map(|(_, value)| *value)
        .fold(10.0_f64, f64::max);
    let label_width = entries
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);

    let mut output = String::new();
    for (label, value) in entries {
        let filled = ((value / scale) * BAR_WIDTH as f64).round().max(0.0) as usize;
        let filled = filled.min(BAR_WIDTH);
        let _ = writeln!(
            output,
            "{label:<label_width$} | {bar:<BAR_WIDTH$} {gpa}",
            bar = "#".repeat(filled),
            gpa = format_gpa(*value),
        );
    }
    output
}

pub fn summarize_trends(scenarios: &[&Scenario]) -> Vec<(Trend, usize)> {
    let mut counts = [
        (Trend::Increase, 0usize),
        (Trend::Decrease, 0usize),
        (Trend::Stable, 0usize),
    ];

    for scenario in scenarios {
        for entry in counts.iter_mut() {
            if entry.0 == scenario.prediction.trend {
                entry.1 += 1;
            }
        }
    }

    let mut counts: Vec<(Trend, usize)> = counts.into_iter().filter(|(_, n)| *n > 0).collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Builds the markdown report over the saved scenarios, newest first.
pub fn build_report(scenarios: &[&Scenario], generated: DateTime<Utc>) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# CGPA Prediction Report");
    let _ = writeln!(
        output,
        "Generated {} over {} saved scenario(s)",
        generated.format("%Y-%m-%d %H:%M UTC"),
        scenarios.len()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Trend Mix");

    let trends = summarize_trends(scenarios);
    if trends.is_empty() {
        let _ = writeln!(output, "No scenarios saved yet.");
    } else {
        for (trend, count) in trends {
            let _ = writeln!(output, "- {trend}: {count} scenario(s)");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Saved Scenarios");

    if scenarios.is_empty() {
        let _ = writeln!(output, "No scenarios saved yet.");
    } else {
        let _ = writeln!(
            output,
            "| Name | Saved | Current | Expected | Predicted | Change | Trend |"
        );
        let _ = writeln!(output, "| --- | --- | --- | --- | --- | --- | --- |");
        for scenario in scenarios {
            let _ = writeln!(
                output,
                "| {} | {} | {} | {} | {} | {} | {} |",
                scenario.name,
                scenario.timestamp.format("%Y-%m-%d %H:%M"),
                format_gpa(scenario.input.current_cgpa),
                format_gpa(scenario.input.upcoming_sgpa),
                format_gpa(scenario.prediction.new_cgpa),
                format_signed(scenario.prediction.difference),
                scenario.prediction.trend,
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Predicted CGPA Comparison");

    if scenarios.is_empty() {
        let _ = writeln!(output, "No scenarios saved yet.");
    } else {
        let entries: Vec<(String, f64)> = scenarios
            .iter()
            .map(|s| (s.name.clone(), s.prediction.new_cgpa))
            .collect();
        let _ = writeln!(output, "```");
        output.push_str(&render_bar_chart(&entries));
        let _ = writeln!(output, "```");
    }

    output
}

/// Difference with an explicit sign, as the scenario list shows it.
pub fn format_signed(value: f64) -> String {
    if value > 0.0 {
        format!("+{}", format_gpa(value))
    } else {
        format_gpa(value)
    }
}
