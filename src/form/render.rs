// src/form/render.rs
use crate::inference::Prediction;

/// Plain-text result shown after the form is submitted.
pub fn render_prediction(prediction: &Prediction, echo_input: bool) -> String {
    let mut out = String::new();

    if echo_input && !prediction.input.is_empty() {
        out.push_str("Input:\n");
        for (field, value) in prediction.input.iter() {
            out.push_str(&format!("  {}: {}\n", field, value));
        }
        out.push('\n');
    }

    if !prediction.issues.is_empty() {
        out.push_str("Warnings:\n");
        for issue in &prediction.issues {
            out.push_str(&format!("  - {}\n", issue));
        }
        out.push('\n');
    }

    out.push_str(&format!("Predicted Stock Status: {}", prediction.status));
    if let Some(confidence) = prediction.confidence {
        out.push_str(&format!(" (confidence {:.1}%)", confidence * 100.0));
    }
    out.push('\n');
    out
}
