//! Text report sinks for predictions and the confusion matrix.

use std::io::{self, Write};

use crate::forest::ConfusionMatrix;

/// Sentinel printed for samples that were never out-of-bag.
pub const UNDEFINED_PREDICTION: &str = "NA";

/// Write the prediction report: a header line, then one predicted class
/// per input row. Undefined entries print [`UNDEFINED_PREDICTION`].
pub fn write_predictions<W: Write>(
    writer: &mut W,
    predictions: &[Option<f64>],
) -> io::Result<()> {
    writeln!(writer, "Predictions: ")?;
    for prediction in predictions {
        match prediction {
            Some(value) => writeln!(writer, "{value}")?,
            None => writeln!(writer, "{UNDEFINED_PREDICTION}")?,
        }
    }
    Ok(())
}

/// Write the confusion report: the overall OOB error, then a table of
/// counts with true classes as columns and one `predicted <c>` row per
/// class.
pub fn write_confusion<W: Write>(
    writer: &mut W,
    overall_error: f64,
    confusion: &ConfusionMatrix,
) -> io::Result<()> {
    writeln!(
        writer,
        "Overall OOB prediction error (Fraction missclassified): {overall_error}"
    )?;
    writeln!(writer)?;
    writeln!(writer, "Class specific prediction errors:")?;

    write!(writer, "           ")?;
    for class_value in confusion.class_values() {
        write!(writer, "     {class_value}")?;
    }
    writeln!(writer)?;

    for (predicted_id, predicted_value) in confusion.class_values().iter().enumerate() {
        write!(writer, "predicted {predicted_value}     ")?;
        for true_id in 0..confusion.num_classes() {
            let count = confusion.count(true_id, predicted_id);
            write!(writer, "{count}{}", padding_for(count))?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

// Fixed-width columns up to five digits: padding narrows as counts grow.
fn padding_for(count: usize) -> &'static str {
    match count {
        0..=9 => "     ",
        10..=99 => "    ",
        100..=999 => "   ",
        1000..=9999 => "  ",
        10000..=99999 => " ",
        _ => "",
    }
}
