use std::path::Path;

use maud::{html, Markup, PreEscaped, DOCTYPE};
use plotly::Plot;

use crate::error::{FareError, Result};
use crate::metrics::RegressionMetrics;
use crate::pipeline::TrainingOutcome;
use crate::report::plots::{plot_cost_history, plot_weights};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

/// A titled block of HTML content and plots.
pub struct ReportSection {
    title: String,
    content: Vec<Markup>,
}

impl ReportSection {
    pub fn new(title: &str) -> Self {
        ReportSection {
            title: title.to_string(),
            content: Vec::new(),
        }
    }

    pub fn add_content(&mut self, markup: Markup) {
        self.content.push(markup);
    }

    pub fn add_plot(&mut self, plot: Plot) {
        let div_id = format!(
            "plot-{}-{}",
            self.title.to_ascii_lowercase().replace(' ', "-"),
            self.content.len()
        );
        self.content
            .push(PreEscaped(plot.to_inline_html(Some(div_id.as_str()))));
    }

    fn render(&self) -> Markup {
        html! {
            section {
                h2 { (self.title) }
                @for block in &self.content {
                    div class="block" { (block) }
                }
            }
        }
    }
}

/// A standalone HTML page made of sections.
pub struct Report {
    title: String,
    subtitle: String,
    sections: Vec<ReportSection>,
}

impl Report {
    pub fn new(title: &str, subtitle: &str) -> Self {
        Report {
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            sections: Vec::new(),
        }
    }

    pub fn add_section(&mut self, section: ReportSection) {
        self.sections.push(section);
    }

    pub fn render(&self) -> Markup {
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="utf-8";
                    title { (self.title) }
                    script src=(PLOTLY_CDN) {}
                    style { "body { font-family: sans-serif; margin: 2em; } table { border-collapse: collapse; } td, th { border: 1px solid #ccc; padding: 4px 8px; }" }
                }
                body {
                    h1 { (self.title) }
                    p { (self.subtitle) }
                    @for section in &self.sections {
                        (section.render())
                    }
                }
            }
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.render().into_string()).map_err(|source| FareError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Build the training report (schema, cost curve, weights and optional metrics)
/// and write it to `path`.
pub fn write_training_report<P: AsRef<Path>>(
    path: P,
    outcome: &TrainingOutcome,
    metrics: Option<&RegressionMetrics>,
) -> Result<()> {
    let bundle = &outcome.bundle;
    let schema = &bundle.schema;
    let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let mut report = Report::new(
        "Rideshare Fare Model",
        &format!("Generated {}", generated),
    );

    let mut schema_section = ReportSection::new("Schema");
    schema_section.add_content(html! {
        table {
            tr { th { "Feature" } th { "Mean" } th { "Std" } }
            tr { td { "distance" } td { (format!("{:.4}", schema.feature_means[0])) } td { (format!("{:.4}", schema.feature_stds[0])) } }
            tr { td { "surge_multiplier" } td { (format!("{:.4}", schema.feature_means[1])) } td { (format!("{:.4}", schema.feature_stds[1])) } }
        }
        p { "Cab types: " (schema.cab_vocabulary.join(", ")) }
        p { "Ride names: " (schema.ride_vocabulary.join(", ")) }
    });
    report.add_section(schema_section);

    let mut training_section = ReportSection::new("Training");
    training_section.add_content(html! {
        p {
            "Bias: " (format!("{:.4}", bundle.bias))
            @if let Some(cost) = outcome.final_cost() {
                " | Final cost: " (format!("{:.4}", cost))
            }
        }
    });
    training_section.add_plot(plot_cost_history(&outcome.cost_history, "Training cost"));
    training_section.add_plot(plot_weights(&bundle.feature_names, &bundle.weights, "Weights"));
    report.add_section(training_section);

    if let Some(m) = metrics {
        let mut eval_section = ReportSection::new("Evaluation");
        eval_section.add_content(html! {
            table {
                tr { th { "Trips" } th { "RMSE" } th { "MAE" } th { "R²" } }
                tr {
                    td { (m.n) }
                    td { (format!("{:.4}", m.rmse)) }
                    td { (format!("{:.4}", m.mae)) }
                    td { (format!("{:.4}", m.r2)) }
                }
            }
        });
        report.add_section(eval_section);
    }

    report.save_to_file(&path)?;
    log::info!("Report saved to {}", path.as_ref().display());
    Ok(())
}
