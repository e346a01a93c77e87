use std::path::Path;

use anyhow::{bail, Context, Result};
use plotters::prelude::*;
use tracing::{debug, info};

use crate::aggregate::{AmountSeries, DashboardSeries, QuantitySeries};

const PANEL_SIZE: (u32, u32) = (640, 420);

const BG: RGBColor = RGBColor(20, 20, 20);
const TEXT: RGBColor = RGBColor(200, 200, 200);
const GRID: RGBColor = RGBColor(60, 60, 60);
const ACCENT: RGBColor = RGBColor(0, 191, 255);

/// Slice colors for the proportion chart, cycled when categories exceed it.
const PALETTE: &[RGBColor] = &[
    RGBColor(0, 191, 255),
    RGBColor(255, 165, 0),
    RGBColor(50, 205, 50),
    RGBColor(220, 20, 60),
    RGBColor(186, 85, 211),
    RGBColor(255, 215, 0),
    RGBColor(64, 224, 208),
    RGBColor(250, 128, 114),
];

/// One rendered chart, as referenced from the dashboard page.
#[derive(Debug, Clone)]
pub struct Panel {
    pub file: &'static str,
    pub title: String,
}

/// Render all five panels into `out_dir`, one SVG per derived series.
pub fn render_all(series: &DashboardSeries, top_n: usize, out_dir: &Path) -> Result<Vec<Panel>> {
    let panels = vec![
        Panel {
            file: "monthly_totals.svg",
            title: "Total sales by month".to_string(),
        },
        Panel {
            file: "category_shares.svg",
            title: "Sales by category".to_string(),
        },
        Panel {
            file: "daily_quantities.svg",
            title: "Units sold by date".to_string(),
        },
        Panel {
            file: "monthly_totals_area.svg",
            title: "Monthly sales".to_string(),
        },
        Panel {
            file: "top_products.svg",
            title: format!("Top {top_n} products by units sold"),
        },
    ];

    bar_chart(
        &out_dir.join(panels[0].file),
        &panels[0].title,
        &series.monthly_totals,
    )?;
    pie_chart(
        &out_dir.join(panels[1].file),
        &panels[1].title,
        &series.category_shares,
    )?;
    line_chart(
        &out_dir.join(panels[2].file),
        &panels[2].title,
        &series.daily_quantities,
    )?;
    area_chart(
        &out_dir.join(panels[3].file),
        &panels[3].title,
        &series.monthly_totals_area,
    )?;
    hbar_chart(
        &out_dir.join(panels[4].file),
        &panels[4].title,
        &series.top_products,
    )?;

    info!(count = panels.len(), dir = %out_dir.display(), "rendered chart panels");
    Ok(panels)
}

/// Vertical bars, one per month.
pub fn bar_chart(path: &Path, title: &str, series: &AmountSeries) -> Result<()> {
    let (labels, values) = split_amounts(title, series)?;
    let y_max = axis_max(&values);

    let root = SVGBackend::new(path, PANEL_SIZE).into_drawing_area();
    root.fill(&BG)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 22).into_font().color(&TEXT))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0usize..labels.len()).into_segmented(), 0f64..y_max)?;

    let label_fmt = |x: &SegmentValue<usize>| segment_label(x, &labels);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .light_line_style(ShapeStyle::from(&GRID).stroke_width(1))
        .bold_line_style(ShapeStyle::from(&GRID).stroke_width(1))
        .axis_style(ShapeStyle::from(&GRID).stroke_width(1))
        .x_label_style(("sans-serif", 13).into_font().color(&TEXT))
        .y_label_style(("sans-serif", 13).into_font().color(&TEXT))
        .x_labels(labels.len().min(12))
        .x_label_formatter(&label_fmt)
        .draw()?;

    chart.draw_series(values.iter().enumerate().map(|(i, v)| {
        Rectangle::new(
            [
                (SegmentValue::Exact(i), 0.0),
                (SegmentValue::Exact(i + 1), *v),
            ],
            ACCENT.filled(),
        )
    }))?;

    root.present().with_context(|| format!("writing {}", path.display()))?;
    debug!(path = %path.display(), "bar chart written");
    Ok(())
}

/// Proportion chart, one slice per category.
pub fn pie_chart(path: &Path, title: &str, series: &AmountSeries) -> Result<()> {
    let (labels, values) = split_amounts(title, series)?;
    if values.iter().sum::<f64>() <= 0.0 {
        bail!("cannot render '{title}': all slice values are zero");
    }

    let root = SVGBackend::new(path, PANEL_SIZE).into_drawing_area();
    root.fill(&BG)?;
    let root = root.titled(title, ("sans-serif", 22).into_font().color(&TEXT))?;

    let (w, h) = (PANEL_SIZE.0 as i32, PANEL_SIZE.1 as i32);
    let center = (w / 2, h / 2 + 10);
    let radius = (w.min(h) as f64) * 0.32;
    let colors: Vec<RGBColor> = (0..values.len())
        .map(|i| PALETTE[i % PALETTE.len()])
        .collect();

    let mut pie = Pie::new(&center, &radius, &values, &colors, &labels);
    pie.label_style(("sans-serif", 14).into_font().color(&TEXT));
    pie.percentages(("sans-serif", 13).into_font().color(&BG));
    root.draw(&pie)?;

    root.present().with_context(|| format!("writing {}", path.display()))?;
    debug!(path = %path.display(), "pie chart written");
    Ok(())
}

/// Day-by-day line, one point per calendar day.
pub fn line_chart(path: &Path, title: &str, series: &QuantitySeries) -> Result<()> {
    let (labels, values) = split_quantities(title, series)?;
    let y_max = axis_max(&values);

    let root = SVGBackend::new(path, PANEL_SIZE).into_drawing_area();
    root.fill(&BG)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 22).into_font().color(&TEXT))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0usize..(labels.len() - 1).max(1), 0f64..y_max)?;

    let label_fmt = |x: &usize| labels.get(*x).cloned().unwrap_or_default();
    chart
        .configure_mesh()
        .light_line_style(ShapeStyle::from(&GRID).stroke_width(1))
        .bold_line_style(ShapeStyle::from(&GRID).stroke_width(1))
        .axis_style(ShapeStyle::from(&GRID).stroke_width(1))
        .x_label_style(("sans-serif", 13).into_font().color(&TEXT))
        .y_label_style(("sans-serif", 13).into_font().color(&TEXT))
        .x_labels(labels.len().min(10))
        .x_label_formatter(&label_fmt)
        .draw()?;

    chart.draw_series(LineSeries::new(
        values.iter().enumerate().map(|(i, v)| (i, *v)),
        ShapeStyle::from(&ACCENT).stroke_width(3),
    ))?;

    root.present().with_context(|| format!("writing {}", path.display()))?;
    debug!(path = %path.display(), "line chart written");
    Ok(())
}

/// Filled month-by-month trend; same series as the bar panel.
pub fn area_chart(path: &Path, title: &str, series: &AmountSeries) -> Result<()> {
    let (labels, values) = split_amounts(title, series)?;
    let y_max = axis_max(&values);

    let root = SVGBackend::new(path, PANEL_SIZE).into_drawing_area();
    root.fill(&BG)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 22).into_font().color(&TEXT))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0usize..(labels.len() - 1).max(1), 0f64..y_max)?;

    let label_fmt = |x: &usize| labels.get(*x).cloned().unwrap_or_default();
    chart
        .configure_mesh()
        .light_line_style(ShapeStyle::from(&GRID).stroke_width(1))
        .bold_line_style(ShapeStyle::from(&GRID).stroke_width(1))
        .axis_style(ShapeStyle::from(&GRID).stroke_width(1))
        .x_label_style(("sans-serif", 13).into_font().color(&TEXT))
        .y_label_style(("sans-serif", 13).into_font().color(&TEXT))
        .x_labels(labels.len().min(12))
        .x_label_formatter(&label_fmt)
        .draw()?;

    chart.draw_series(
        AreaSeries::new(
            values.iter().enumerate().map(|(i, v)| (i, *v)),
            0.0,
            ACCENT.mix(0.35),
        )
        .border_style(ShapeStyle::from(&ACCENT).stroke_width(2)),
    )?;

    root.present().with_context(|| format!("writing {}", path.display()))?;
    debug!(path = %path.display(), "area chart written");
    Ok(())
}

/// Horizontal bars, largest sum on top.
pub fn hbar_chart(path: &Path, title: &str, series: &QuantitySeries) -> Result<()> {
    let (labels, values) = split_quantities(title, series)?;
    let x_max = axis_max(&values);
    let rows = labels.len();

    let root = SVGBackend::new(path, PANEL_SIZE).into_drawing_area();
    root.fill(&BG)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 22).into_font().color(&TEXT))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(110)
        .build_cartesian_2d(0f64..x_max, (0usize..rows).into_segmented())?;

    // series rows are descending; segment 0 sits at the bottom, so flip
    let label_fmt = |y: &SegmentValue<usize>| {
        segment_label_with(y, |i| {
            rows.checked_sub(1 + i)
                .and_then(|flipped| labels.get(flipped).cloned())
                .unwrap_or_default()
        })
    };
    chart
        .configure_mesh()
        .disable_y_mesh()
        .light_line_style(ShapeStyle::from(&GRID).stroke_width(1))
        .bold_line_style(ShapeStyle::from(&GRID).stroke_width(1))
        .axis_style(ShapeStyle::from(&GRID).stroke_width(1))
        .x_label_style(("sans-serif", 13).into_font().color(&TEXT))
        .y_label_style(("sans-serif", 13).into_font().color(&TEXT))
        .y_labels(rows)
        .y_label_formatter(&label_fmt)
        .draw()?;

    chart.draw_series(values.iter().enumerate().map(|(i, v)| {
        let row = rows - 1 - i;
        Rectangle::new(
            [
                (0.0, SegmentValue::Exact(row)),
                (*v, SegmentValue::Exact(row + 1)),
            ],
            ACCENT.filled(),
        )
    }))?;

    root.present().with_context(|| format!("writing {}", path.display()))?;
    debug!(path = %path.display(), "horizontal bar chart written");
    Ok(())
}

fn split_amounts(title: &str, series: &AmountSeries) -> Result<(Vec<String>, Vec<f64>)> {
    if series.is_empty() {
        bail!("cannot render '{title}' with an empty series");
    }
    Ok(series.iter().map(|(k, v)| (k.clone(), *v)).unzip())
}

fn split_quantities(title: &str, series: &QuantitySeries) -> Result<(Vec<String>, Vec<f64>)> {
    if series.is_empty() {
        bail!("cannot render '{title}' with an empty series");
    }
    Ok(series.iter().map(|(k, v)| (k.clone(), *v as f64)).unzip())
}

/// Upper axis bound with headroom; degenerate all-zero series still get a
/// drawable range.
fn axis_max(values: &[f64]) -> f64 {
    let max = values.iter().cloned().fold(0.0f64, f64::max);
    if max <= 0.0 {
        1.0
    } else {
        max * 1.1
    }
}

fn segment_label(seg: &SegmentValue<usize>, labels: &[String]) -> String {
    segment_label_with(seg, |i| labels.get(i).cloned().unwrap_or_default())
}

fn segment_label_with<F>(seg: &SegmentValue<usize>, get: F) -> String
where
    F: Fn(usize) -> String,
{
    match seg {
        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => get(*i),
        SegmentValue::Last => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn amounts() -> AmountSeries {
        vec![
            ("2024-01".to_string(), 100.0),
            ("2024-02".to_string(), 60.0),
        ]
    }

    fn quantities() -> QuantitySeries {
        vec![
            ("Bread".to_string(), 15),
            ("Juice".to_string(), 7),
            ("Milk".to_string(), 7),
        ]
    }

    #[test]
    fn every_renderer_writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        bar_chart(&dir.path().join("bar.svg"), "bar", &amounts()).unwrap();
        pie_chart(&dir.path().join("pie.svg"), "pie", &amounts()).unwrap();
        line_chart(&dir.path().join("line.svg"), "line", &quantities()).unwrap();
        area_chart(&dir.path().join("area.svg"), "area", &amounts()).unwrap();
        hbar_chart(&dir.path().join("hbar.svg"), "hbar", &quantities()).unwrap();

        for name in ["bar.svg", "pie.svg", "line.svg", "area.svg", "hbar.svg"] {
            let content = fs::read_to_string(dir.path().join(name)).unwrap();
            assert!(content.contains("<svg"), "{name} is not an SVG");
        }
    }

    #[test]
    fn single_point_series_still_renders() {
        let dir = tempfile::tempdir().unwrap();
        let one = vec![("2024-01".to_string(), 42.0)];
        bar_chart(&dir.path().join("one.svg"), "one", &one).unwrap();
        area_chart(&dir.path().join("one-area.svg"), "one", &one).unwrap();
    }

    #[test]
    fn empty_series_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(bar_chart(&dir.path().join("x.svg"), "x", &Vec::new()).is_err());
        assert!(line_chart(&dir.path().join("y.svg"), "y", &Vec::new()).is_err());
    }

    #[test]
    fn render_all_produces_five_panels() {
        let dir = tempfile::tempdir().unwrap();
        let series = DashboardSeries {
            monthly_totals: amounts(),
            category_shares: amounts(),
            daily_quantities: quantities(),
            monthly_totals_area: amounts(),
            top_products: quantities(),
        };
        let panels = render_all(&series, 5, dir.path()).unwrap();
        assert_eq!(panels.len(), 5);
        for panel in &panels {
            assert!(dir.path().join(panel.file).exists(), "{} missing", panel.file);
        }
    }
}
