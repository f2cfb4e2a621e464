use plotly::common::Mode;
use plotly::layout::{Axis, Layout};
use plotly::{Bar, Plot, Scatter};

use crate::models::CostSample;

/// Line chart of the sampled training cost against iteration.
pub fn plot_cost_history(history: &[CostSample], title: &str) -> Plot {
    let iterations: Vec<f64> = history.iter().map(|s| s.iteration as f64).collect();
    let costs: Vec<f64> = history.iter().map(|s| s.cost).collect();

    let trace = Scatter::new(iterations, costs)
        .mode(Mode::Lines)
        .name("Cost");

    let layout = Layout::new()
        .title(title)
        .x_axis(Axis::new().title("Iteration"))
        .y_axis(Axis::new().title("Regularised cost"));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(layout);
    plot
}

/// Bar chart of the learned weight for every encoded feature.
pub fn plot_weights(feature_names: &[String], weights: &[f64], title: &str) -> Plot {
    assert_eq!(
        feature_names.len(),
        weights.len(),
        "Feature names and weights must have the same length"
    );
    let trace = Bar::new(feature_names.to_vec(), weights.to_vec()).name("Weight");

    let layout = Layout::new()
        .title(title)
        .x_axis(Axis::new().title("Feature"))
        .y_axis(Axis::new().title("Weight"));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(layout);
    plot
}
