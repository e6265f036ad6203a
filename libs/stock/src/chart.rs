use anyhow::{Error, ensure};
use charming::{
    Chart, ImageFormat, ImageRenderer,
    component::{Axis, Title},
    element::{AxisType, LineStyle, Symbol, TextStyle},
    series::Line,
};

use crate::quote_client::MonthLog;

const WIDTH: u32 = 1200;
const HEIGHT: u32 = 600;

/// Render the month's closing prices as a PNG trend chart. The maximum,
/// minimum and most recent closes carry highlighted markers.
pub fn render_trend(month: &MonthLog) -> Result<Vec<u8>, Error> {
    let closes = month.closes()?;
    ensure!(!closes.is_empty(), "no trading days to draw");

    let labels: Vec<String> = month
        .days
        .iter()
        .map(|day| day_label(&day.date).to_string())
        .collect();
    let marks = extreme_mask(&closes);

    let chart = Chart::new()
        .title(
            Title::new()
                .text(format!(
                    "Stock Pricing Trend - {}",
                    month_label(&month.days[0].date)
                ))
                .left("center")
                .top("2%")
                .text_style(TextStyle::new().font_size(14)),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(Axis::new().type_(AxisType::Value).scale(true))
        .series(
            Line::new()
                .name("Closing Price")
                .data(closes)
                .symbol(Symbol::Circle)
                .line_style(LineStyle::new().width(2).color("#5470c6")),
        )
        .series(
            Line::new()
                .name("High/Low/Last")
                .data(marks)
                .symbol(Symbol::Circle)
                .line_style(LineStyle::new().width(0).color("#d62728")),
        );

    let mut renderer = ImageRenderer::new(WIDTH, HEIGHT);
    let png_bytes = renderer.render_format(ImageFormat::Png, &chart)?;
    Ok(png_bytes)
}

/// Day-of-month part of an exchange date like "107/12/03".
fn day_label(date: &str) -> &str {
    date.get(7..).unwrap_or(date)
}

/// Year/month prefix of an exchange date like "107/12/03".
fn month_label(date: &str) -> &str {
    date.get(..6).unwrap_or(date)
}

/// NaN everywhere except the maximum, minimum and last close, so the
/// overlay series draws markers on just those points.
fn extreme_mask(closes: &[f64]) -> Vec<f64> {
    if closes.is_empty() {
        return Vec::new();
    }

    let mut max_idx = 0;
    let mut min_idx = 0;
    for (i, &value) in closes.iter().enumerate() {
        if value > closes[max_idx] {
            max_idx = i;
        }
        if value < closes[min_idx] {
            min_idx = i;
        }
    }

    let mut mask = vec![f64::NAN; closes.len()];
    mask[max_idx] = closes[max_idx];
    mask[min_idx] = closes[min_idx];

    let last_idx = closes.len() - 1;
    mask[last_idx] = closes[last_idx];

    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_split_exchange_dates() {
        assert_eq!(day_label("107/12/03"), "03");
        assert_eq!(month_label("107/12/03"), "107/12");
    }

    #[test]
    fn odd_dates_fall_back_to_the_whole_string() {
        assert_eq!(day_label("today"), "today");
        assert_eq!(month_label("today"), "today");
    }

    #[test]
    fn mask_marks_max_min_and_last() {
        let mask = extreme_mask(&[2.0, 9.0, 1.0, 5.0]);

        assert!(mask[0].is_nan());
        assert_eq!(mask[1], 9.0);
        assert_eq!(mask[2], 1.0);
        assert_eq!(mask[3], 5.0);
    }

    #[test]
    fn mask_of_empty_input_is_empty() {
        assert!(extreme_mask(&[]).is_empty());
    }
}
