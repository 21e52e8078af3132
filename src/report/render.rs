use std::path::Path;

use itertools::Itertools;
use log::info;
use plotly::common::{
    ColorScale,
    ColorScalePalette,
    Marker,
    Mode,
    Title,
};
use plotly::layout::{
    Axis,
    BarMode,
    GridPattern,
    Layout,
    LayoutGrid,
};
use plotly::{
    Bar,
    BoxPlot,
    HeatMap,
    Histogram,
    ImageFormat,
    Plot,
    Scatter,
};

use crate::data_structs::enums::Context;
use crate::io::report::ReportType;
use crate::report::summary::{
    coverage_cutoff_counts,
    MethylationSummary,
};

/// Share threshold (percent) above which a cytosine counts as methylated in
/// the per-sample methylation share panel.
const METHYLATED_THRESHOLD: f64 = 1.0;

const SAMPLE_COLOR: &str = "#0077b3";
const JOINED_COLOR: &str = "#cccccc";

/// Axis label like "CpG count" for the session context.
fn count_label(context: Context) -> String {
    let name = context.to_string();
    format!("{}p{} count", &name[0..1], &name[1..2])
}

/// Renders the multi-panel methylation report and saves it as a PNG.
///
/// Panels: per-sample and joined cytosine counts, counts per chromosome,
/// methylated share, percent-methylation histogram and box plot, pairwise
/// Pearson heatmap, PCA scree and PC1/PC2 scatter.
pub fn render_report(
    summary: &MethylationSummary,
    context: Context,
    path: &Path,
) -> anyhow::Result<()> {
    let names = summary.sample_names().to_vec();
    let mut plot = Plot::new();

    // panel 1: cytosine counts per sample and after the cross-sample join
    let mut count_labels = names.clone();
    count_labels.push("covered in all samples".to_string());
    let mut counts = summary.per_sample_counts().to_vec();
    counts.push(summary.joined_count());
    let mut colors = vec![SAMPLE_COLOR; names.len()];
    colors.push(JOINED_COLOR);
    plot.add_trace(
        Bar::new(count_labels, counts)
            .marker(Marker::new().color_array(colors))
            .show_legend(false)
            .x_axis("x")
            .y_axis("y"),
    );

    // panel 2: cytosine counts per chromosome
    let (chrom_labels, chrom_counts): (Vec<String>, Vec<usize>) =
        summary.chromosome_counts()?.into_iter().unzip();
    plot.add_trace(
        Bar::new(chrom_labels, chrom_counts)
            .show_legend(false)
            .x_axis("x2")
            .y_axis("y2"),
    );

    // panel 3: share of cytosines bearing methylation
    plot.add_trace(
        Bar::new(
            names.clone(),
            summary.methylated_share(METHYLATED_THRESHOLD)?,
        )
        .show_legend(false)
        .x_axis("x3")
        .y_axis("y3"),
    );

    // panels 4 and 5: per-sample methylation distributions
    for (name, values) in names.iter().zip(summary.percent_columns()?) {
        plot.add_trace(
            Histogram::new(values.clone())
                .name(name)
                .n_bins_x(50)
                .opacity(0.6)
                .x_axis("x4")
                .y_axis("y4"),
        );
        plot.add_trace(
            BoxPlot::new(values)
                .name(name)
                .show_legend(false)
                .x_axis("x5")
                .y_axis("y5"),
        );
    }

    // panel 6: pairwise Pearson correlation
    plot.add_trace(
        HeatMap::new(
            names.clone(),
            names.clone(),
            summary.pearson_matrix()?,
        )
        .zmin(0.0)
        .zmax(1.0)
        .color_scale(ColorScale::Palette(ColorScalePalette::YlGnBu))
        .x_axis("x6")
        .y_axis("y6"),
    );

    // panels 7 and 8: PCA scree and first two components
    let pca = summary.pca()?;
    let pc_labels = (1..=names.len())
        .map(|idx| format!("PC{}", idx))
        .collect_vec();
    plot.add_trace(
        Bar::new(pc_labels, pca.explained_variance_percent)
            .show_legend(false)
            .x_axis("x7")
            .y_axis("y7"),
    );

    let (pc1, pc2): (Vec<f64>, Vec<f64>) = pca
        .scores
        .iter()
        .map(|score| (score[0], score[1]))
        .unzip();
    plot.add_trace(
        Scatter::new(pc1, pc2)
            .mode(Mode::MarkersText)
            .text_array(names.clone())
            .show_legend(false)
            .x_axis("x8")
            .y_axis("y8"),
    );

    let layout = Layout::new()
        .grid(
            LayoutGrid::new()
                .rows(3)
                .columns(3)
                .pattern(GridPattern::Independent),
        )
        .bar_mode(BarMode::Overlay)
        .title(Title::with_text("BScope methylation report"))
        .y_axis(Axis::new().title(Title::with_text(count_label(context))))
        .x_axis2(Axis::new().title(Title::with_text("Chromosomes")))
        .y_axis2(Axis::new().title(Title::with_text(count_label(context))))
        .y_axis3(
            Axis::new()
                .title(Title::with_text("Percent bearing methylation"))
                .range(vec![0.0, 100.0]),
        )
        .x_axis4(
            Axis::new()
                .title(Title::with_text("Percent methylation"))
                .range(vec![0.0, 100.0]),
        )
        .y_axis4(Axis::new().title(Title::with_text(count_label(context))))
        .y_axis5(
            Axis::new()
                .title(Title::with_text("Percent methylation"))
                .range(vec![0.0, 105.0]),
        )
        .x_axis7(Axis::new().title(Title::with_text("Principal components")))
        .y_axis7(Axis::new().title(Title::with_text("Percent of variance")))
        .x_axis8(Axis::new().title(Title::with_text("PC1")))
        .y_axis8(Axis::new().title(Title::with_text("PC2")));
    plot.set_layout(layout);

    plot.write_image(path, ImageFormat::PNG, 1500, 1500, 1.0);
    info!("Methylation report saved at {}", path.display());
    Ok(())
}

/// Renders per-sample coverage-cutoff panels and saves them as a PNG.
///
/// One bar panel per sample, counting cytosines that pass each minimum
/// coverage cutoff in `lims`; both strands are counted for BS-SNPer input.
pub fn render_coverage_plot(
    samples: &[(polars::prelude::DataFrame, String)],
    report_type: ReportType,
    lims: (u32, u32),
    path: &Path,
) -> anyhow::Result<()> {
    let mut plot = Plot::new();

    for (idx, (df, name)) in samples.iter().enumerate() {
        let counts = coverage_cutoff_counts(df, report_type, lims)?;
        let cutoffs = (lims.0..=lims.1).collect_vec();
        let axis_ref = if idx == 0 {
            "x".to_string()
        } else {
            format!("x{}", idx + 1)
        };
        let y_ref = if idx == 0 {
            "y".to_string()
        } else {
            format!("y{}", idx + 1)
        };
        plot.add_trace(
            Bar::new(cutoffs, counts)
                .name(name)
                .x_axis(axis_ref)
                .y_axis(y_ref),
        );
    }

    let layout = Layout::new()
        .grid(
            LayoutGrid::new()
                .rows(1)
                .columns(samples.len())
                .pattern(GridPattern::Independent),
        )
        .title(Title::with_text("Cytosine count per coverage cut-off"))
        .x_axis(Axis::new().title(Title::with_text("min read coverage cut-off")))
        .y_axis(Axis::new().title(Title::with_text("Cytosines count")));
    plot.set_layout(layout);

    plot.write_image(path, ImageFormat::PNG, 500 * samples.len(), 500, 1.0);
    info!("Coverage plot saved at {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_label_from_context() {
        assert_eq!(count_label(Context::CG), "CpG count");
        assert_eq!(count_label(Context::CHG), "CpH count");
        assert_eq!(count_label(Context::CHH), "CpH count");
    }
}
