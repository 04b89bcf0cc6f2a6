use crate::models::{Prediction, ScenarioInput, Trend};

/// Which validation rule applies to a raw text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldClass {
    /// GPA on the closed interval [0, 10].
    GpaRange,
    /// Strictly positive number (credit counts).
    PositiveNumber,
}

pub fn validate_field(class: FieldClass, raw: &str) -> bool {
    match class {
        FieldClass::GpaRange => is_valid_gpa(raw),
        FieldClass::PositiveNumber => is_positive_number(raw),
    }
}

/// Accepts exactly the closed interval [0, 10]. Unparsable text is invalid,
/// never an error.
pub fn is_valid_gpa(raw: &str) -> bool {
    match raw.trim().parse::<f64>() {
        Ok(value) => value.is_finite() && (0.0..=10.0).contains(&value),
        Err(_) => false,
    }
}

/// Accepts any parseable value strictly greater than zero.
pub fn is_positive_number(raw: &str) -> bool {
    match raw.trim().parse::<f64>() {
        Ok(value) => value.is_finite() && value > 0.0,
        Err(_) => false,
    }
}

/// Round to two decimal places, half away from zero.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Predicts the cumulative GPA after the upcoming term.
///
/// Pure and total over pre-validated input; out-of-range values are not
/// re-checked here and propagate into an out-of-range result. With full
/// credit information the new CGPA is the credit-weighted average of prior
/// points and the upcoming term; otherwise it falls back to the plain mean
/// of current CGPA and expected SGPA.
pub fn predict(input: &ScenarioInput) -> Prediction {
    // Weighted only when all three credit fields are supplied and nonzero.
    // Last-semester credits gate the branch but never enter the arithmetic;
    // kept as-is for parity with the original calculator.
    let weighted = match (
        input.total_credits,
        input.last_sem_credits,
        input.upcoming_sem_credits,
    ) {
        (Some(total), Some(last), Some(upcoming)) => {
            total > 0.0 && last != 0.0 && upcoming != 0.0
        }
        _ => false,
    };

    let new_cgpa = if weighted {
        let total = input.total_credits.unwrap_or(0.0);
        let upcoming = input.upcoming_sem_credits.unwrap_or(0.0);
        let prior_points = input.current_cgpa * total;
        let new_total_points = prior_points + input.upcoming_sgpa * upcoming;
        new_total_points / (total + upcoming)
    } else {
        (input.current_cgpa + input.upcoming_sgpa) / 2.0
    };

    let new_cgpa = round2(new_cgpa);
    let difference = round2(new_cgpa - input.current_cgpa);
    let trend = if difference > 0.0 {
        Trend::Increase
    } else if difference < 0.0 {
        Trend::Decrease
    } else {
        Trend::Stable
    };

    Prediction {
        new_cgpa,
        difference,
        trend,
    }
}

/// Fixed-point rendering with exactly two decimal places.
pub fn format_gpa(value: f64) -> String {
    format!("{value:.2}")
}

/// Raw text fields as collected from the command line, before any parsing.
#[derive(Debug, Clone, Copy)]
pub struct RawFields<'a> {
    pub current_cgpa: &'a str,
    pub last_sgpa: Option<&'a str>,
    pub upcoming_sgpa: &'a str,
    pub total_credits: Option<&'a str>,
    pub last_sem_credits: Option<&'a str>,
    pub upcoming_sem_credits: Option<&'a str>,
}

/// Validates and parses raw fields into a `ScenarioInput`.
///
/// All field errors are collected rather than stopping at the first, so the
/// user sees every problem at once. A current CGPA or expected SGPA of zero
/// counts as missing, matching the required-field behavior of the original
/// form. Supplying any credit field makes total credits and upcoming-term
/// credits mandatory.
pub fn parse_inputs(raw: &RawFields) -> Result<ScenarioInput, Vec<String>> {
    let mut errors = Vec::new();

    let gpa_field = |errors: &mut Vec<String>, label: &str, text: &str| -> f64 {
        if text.trim().is_empty() {
            return 0.0;
        }
        if !validate_field(FieldClass::GpaRange, text) {
            errors.push(format!("{label}: please enter a valid GPA (0-10)"));
            return 0.0;
        }
        text.trim().parse().unwrap_or(0.0)
    };

    let credit_field =
        |errors: &mut Vec<String>, label: &str, text: Option<&str>| -> Option<f64> {
            let text = text?.trim();
            if text.is_empty() {
                return None;
            }
            if !validate_field(FieldClass::PositiveNumber, text) {
                errors.push(format!("{label}: please enter a positive number"));
                return None;
            }
            text.parse().ok()
        };

    let current_cgpa = gpa_field(&mut errors, "current-cgpa", raw.current_cgpa);
    let last_sgpa = raw
        .last_sgpa
        .map(|text| gpa_field(&mut errors, "last-sgpa", text))
        .unwrap_or(0.0);
    let upcoming_sgpa = gpa_field(&mut errors, "upcoming-sgpa", raw.upcoming_sgpa);

    let total_credits = credit_field(&mut errors, "total-credits", raw.total_credits);
    let last_sem_credits = credit_field(&mut errors, "last-sem-credits", raw.last_sem_credits);
    let upcoming_sem_credits =
        credit_field(&mut errors, "upcoming-sem-credits", raw.upcoming_sem_credits);

    if current_cgpa == 0.0 && !errors.iter().any(|e| e.starts_with("current-cgpa")) {
        errors.push("current-cgpa: current CGPA is required".to_string());
    }
    if upcoming_sgpa == 0.0 && !errors.iter().any(|e| e.starts_with("upcoming-sgpa")) {
        errors.push("upcoming-sgpa: expected SGPA is required".to_string());
    }

    let any_credit_supplied = [raw.total_credits, raw.last_sem_credits, raw.upcoming_sem_credits]
        .iter()
        .any(|field| field.map_or(false, |text| !text.trim().is_empty()));

    if any_credit_supplied {
        if raw.total_credits.map_or(true, |text| text.trim().is_empty()) {
            errors.push(
                "total-credits: total credits is required for the weighted calculation"
                    .to_string(),
            );
        }
        if raw
            .upcoming_sem_credits
            .map_or(true, |text| text.trim().is_empty())
        {
            errors.push("upcoming-sem-credits: upcoming semester credits is required".to_string());
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ScenarioInput {
        current_cgpa,
        last_sgpa,
        upcoming_sgpa,
        total_credits,
        last_sem_credits,
        upcoming_sem_credits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_input(current: f64, upcoming: f64) -> ScenarioInput {
        ScenarioInput {
            current_cgpa: current,
            last_sgpa: 0.0,
            upcoming_sgpa: upcoming,
            total_credits: None,
            last_sem_credits: None,
            upcoming_sem_credits: None,
        }
    }

    #[test]
    fn gpa_validator_accepts_closed_interval() {
        assert!(is_valid_gpa("0"));
        assert!(is_valid_gpa("10"));
        assert!(is_valid_gpa("7.25"));
        assert!(!is_valid_gpa("10.01"));
        assert!(!is_valid_gpa("-0.01"));
        assert!(!is_valid_gpa("abc"));
        assert!(!is_valid_gpa(""));
    }

    #[test]
    fn positive_validator_requires_strictly_positive() {
        assert!(is_positive_number("0.5"));
        assert!(is_positive_number("120"));
        assert!(!is_positive_number("0"));
        assert!(!is_positive_number("-5"));
        assert!(!is_positive_number("abc"));
        assert!(!is_positive_number(""));
    }

    #[test]
    fn validate_field_dispatches_by_class() {
        assert!(validate_field(FieldClass::GpaRange, "10"));
        assert!(!validate_field(FieldClass::PositiveNumber, "0"));
    }

    #[test]
    fn simple_branch_averages_current_and_upcoming() {
        let result = predict(&simple_input(8.0, 9.0));
        assert_eq!(result.new_cgpa, 8.5);
        assert_eq!(result.difference, 0.5);
        assert_eq!(result.trend, Trend::Increase);
    }

    #[test]
    fn weighted_branch_matches_worked_example() {
        let input = ScenarioInput {
            current_cgpa: 7.0,
            last_sgpa: 0.0,
            upcoming_sgpa: 9.0,
            total_credits: Some(60.0),
            last_sem_credits: Some(20.0),
            upcoming_sem_credits: Some(20.0),
        };
        let result = predict(&input);
        // 420 prior points + 180 upcoming points over 80 credits
        assert_eq!(result.new_cgpa, 7.5);
        assert_eq!(result.difference, 0.5);
        assert_eq!(result.trend, Trend::Increase);
    }

    #[test]
    fn weighted_branch_conserves_credit_points() {
        let cases = [
            (6.4, 8.1, 90.0, 24.0, 22.0),
            (9.9, 2.0, 30.0, 15.0, 18.0),
            (5.0, 5.0, 120.0, 20.0, 20.0),
        ];
        for (current, upcoming_sgpa, total, last, upcoming) in cases {
            let input = ScenarioInput {
                current_cgpa: current,
                last_sgpa: 0.0,
                upcoming_sgpa,
                total_credits: Some(total),
                last_sem_credits: Some(last),
                upcoming_sem_credits: Some(upcoming),
            };
            let result = predict(&input);
            let points = result.new_cgpa * (total + upcoming);
            let expected = current * total + upcoming_sgpa * upcoming;
            assert!(
                (points - expected).abs() < 0.005 * (total + upcoming),
                "points {points} vs {expected}"
            );
        }
    }

    #[test]
    fn zero_total_credits_falls_back_to_simple_branch() {
        let input = ScenarioInput {
            current_cgpa: 8.0,
            last_sgpa: 7.5,
            upcoming_sgpa: 9.0,
            total_credits: Some(0.0),
            last_sem_credits: Some(0.0),
            upcoming_sem_credits: Some(0.0),
        };
        let result = predict(&input);
        assert_eq!(result.new_cgpa, 8.5);
        assert_eq!(result.difference, 0.5);
        assert_eq!(result.trend, Trend::Increase);
    }

    #[test]
    fn missing_last_sem_credits_falls_back_to_simple_branch() {
        let input = ScenarioInput {
            current_cgpa: 6.0,
            last_sgpa: 0.0,
            upcoming_sgpa: 8.0,
            total_credits: Some(60.0),
            last_sem_credits: None,
            upcoming_sem_credits: Some(20.0),
        };
        assert_eq!(predict(&input).new_cgpa, 7.0);
    }

    #[test]
    fn trend_agrees_with_difference_sign() {
        let down = predict(&simple_input(9.0, 5.0));
        assert!(down.difference < 0.0);
        assert_eq!(down.trend, Trend::Decrease);

        let flat = predict(&simple_input(7.0, 7.0));
        assert_eq!(flat.difference, 0.0);
        assert_eq!(flat.trend, Trend::Stable);

        let up = predict(&simple_input(5.0, 9.0));
        assert!(up.difference > 0.0);
        assert_eq!(up.trend, Trend::Increase);
    }

    #[test]
    fn results_round_to_two_decimals() {
        // (7.777 + 8.0) / 2 = 7.8885 -> 7.89
        let result = predict(&simple_input(7.777, 8.0));
        assert_eq!(result.new_cgpa, 7.89);
        assert_eq!(result.difference, 0.11);
    }

    #[test]
    fn predict_is_deterministic() {
        let input = simple_input(6.33, 8.67);
        let first = predict(&input);
        let second = predict(&input);
        assert_eq!(first.new_cgpa.to_bits(), second.new_cgpa.to_bits());
        assert_eq!(first.difference.to_bits(), second.difference.to_bits());
        assert_eq!(first.trend, second.trend);
    }

    #[test]
    fn format_gpa_uses_fixed_two_decimals() {
        assert_eq!(format_gpa(8.5), "8.50");
        assert_eq!(format_gpa(10.0), "10.00");
        assert_eq!(format_gpa(0.0), "0.00");
    }

    #[test]
    fn parse_inputs_accepts_minimal_fields() {
        let raw = RawFields {
            current_cgpa: "8.0",
            last_sgpa: Some("7.5"),
            upcoming_sgpa: "9.0",
            total_credits: None,
            last_sem_credits: None,
            upcoming_sem_credits: None,
        };
        let input = parse_inputs(&raw).expect("valid input");
        assert_eq!(input.current_cgpa, 8.0);
        assert_eq!(input.last_sgpa, 7.5);
        assert_eq!(input.total_credits, None);
    }

    #[test]
    fn parse_inputs_collects_every_field_error() {
        let raw = RawFields {
            current_cgpa: "11",
            last_sgpa: None,
            upcoming_sgpa: "abc",
            total_credits: Some("-5"),
            last_sem_credits: None,
            upcoming_sem_credits: None,
        };
        let errors = parse_inputs(&raw).unwrap_err();
        assert!(errors.iter().any(|e| e.starts_with("current-cgpa")));
        assert!(errors.iter().any(|e| e.starts_with("upcoming-sgpa")));
        assert!(errors.iter().any(|e| e.starts_with("total-credits")));
        // supplying any credit field makes upcoming-sem-credits mandatory
        assert!(errors.iter().any(|e| e.starts_with("upcoming-sem-credits")));
    }

    #[test]
    fn parse_inputs_treats_zero_required_fields_as_missing() {
        let raw = RawFields {
            current_cgpa: "0",
            last_sgpa: None,
            upcoming_sgpa: "0",
            total_credits: None,
            last_sem_credits: None,
            upcoming_sem_credits: None,
        };
        let errors = parse_inputs(&raw).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("required"));
        assert!(errors[1].contains("required"));
    }

    #[test]
    fn parse_inputs_requires_credit_pair_once_any_credit_given() {
        let raw = RawFields {
            current_cgpa: "7.0",
            last_sgpa: None,
            upcoming_sgpa: "8.0",
            total_credits: None,
            last_sem_credits: Some("20"),
            upcoming_sem_credits: None,
        };
        let errors = parse_inputs(&raw).unwrap_err();
        assert!(errors.iter().any(|e| e.starts_with("total-credits")));
        assert!(errors.iter().any(|e| e.starts_with("upcoming-sem-credits")));
    }
}
