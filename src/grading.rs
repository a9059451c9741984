use crate::currency::{round2, EUR};
use crate::types::{GradedPrice, GradingInfo};

/// Map (grading company, grade) to a price multiplier. Ordered threshold
/// cascade per company; unknown companies and unparseable grades fall
/// through to 1.
pub fn multiplier(company: &str, grade: &str) -> f64 {
    let Ok(grade) = grade.trim().parse::<f64>() else {
        return 1.0;
    };

    match company.trim().to_ascii_uppercase().as_str() {
        "PSA" => {
            if grade >= 10.0 {
                15.0
            } else if grade >= 9.0 {
                5.0
            } else if grade >= 8.0 {
                2.5
            } else if grade >= 7.0 {
                1.5
            } else {
                1.0
            }
        }
        "BGS" => {
            if grade >= 9.5 {
                12.0
            } else if grade >= 9.0 {
                4.0
            } else if grade >= 8.5 {
                2.0
            } else {
                1.0
            }
        }
        "CGC" | "SGC" => {
            if grade >= 9.5 {
                10.0
            } else if grade >= 9.0 {
                4.0
            } else if grade >= 8.5 {
                2.0
            } else {
                1.0
            }
        }
        _ => 1.0,
    }
}

/// Estimate the value of a graded copy from the ungraded average. Only
/// meaningful for a positive average; otherwise no estimate is produced.
pub fn graded_price(raw_avg: f64, grading: &GradingInfo) -> Option<GradedPrice> {
    if raw_avg <= 0.0 {
        return None;
    }
    let multiplier = multiplier(&grading.company, &grading.grade);
    Some(GradedPrice {
        estimated: round2(raw_avg * multiplier),
        multiplier,
        currency: EUR.to_string(),
    })
}
