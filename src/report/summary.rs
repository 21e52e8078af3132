use std::fmt::Display;
use std::ops::Div;

use anyhow::bail;
use itertools::Itertools;
use log::debug;
use nalgebra::DMatrix;
use polars::prelude::*;

use crate::io::report::{
    OutputType,
    ReportType,
};
use crate::utils::pearson_r;

/// Percent-methylated values of every sample, aligned on the cytosines
/// covered in all of them.
///
/// Built from converted tables; the alignment is an inner join on
/// (chr, pos), so a cytosine missing a value in any sample is excluded
/// from every downstream panel.
pub struct MethylationSummary {
    data: DataFrame,
    sample_names: Vec<String>,
    per_sample_counts: Vec<usize>,
}

impl MethylationSummary {
    /// Builds the summary from converted tables and their sample names.
    ///
    /// Fails when fewer than two samples are given or when no cytosine is
    /// covered in all samples, since the correlation and PCA panels are
    /// undefined in both cases.
    pub fn try_new(
        tables: &[(DataFrame, String)],
        output_type: OutputType,
    ) -> anyhow::Result<Self> {
        if tables.len() < 2 {
            bail!(
                "a methylation report needs at least two samples, got {}",
                tables.len()
            );
        }

        let percent = match output_type {
            // DSS tables carry counts only
            OutputType::Dss => {
                col("X").cast(DataType::Float64).div(col("N")) * lit(100.0)
            },
            OutputType::MethylKit => col("freq_Meth"),
        };

        let mut joined: Option<LazyFrame> = None;
        for (df, name) in tables {
            let lf = df.clone().lazy().select([
                col("chr"),
                col("pos"),
                percent.clone().alias(name.as_str()),
            ]);
            joined = Some(match joined {
                None => lf,
                Some(acc) => {
                    acc.join(
                        lf,
                        [col("chr"), col("pos")],
                        [col("chr"), col("pos")],
                        JoinArgs::new(JoinType::Inner),
                    )
                },
            });
        }

        let data = joined
            .expect("at least two tables")
            .drop_nulls(None)
            .collect()?
            .sort(
                ["chr", "pos"],
                SortMultipleOptions::default().with_order_descending(false),
            )?;

        debug!(
            "Methylation summary holds {} cytosines covered in all {} \
             samples",
            data.height(),
            tables.len()
        );

        if data.height() == 0 {
            bail!(
                "no cytosine is covered in all {} samples; nothing to report",
                tables.len()
            );
        }

        Ok(Self {
            data,
            sample_names: tables.iter().map(|(_, name)| name.clone()).collect(),
            per_sample_counts: tables.iter().map(|(df, _)| df.height()).collect(),
        })
    }

    pub fn sample_names(&self) -> &[String] {
        &self.sample_names
    }

    /// Cytosine count of each sample before the cross-sample join.
    pub fn per_sample_counts(&self) -> &[usize] {
        &self.per_sample_counts
    }

    /// Cytosine count surviving the cross-sample join.
    pub fn joined_count(&self) -> usize {
        self.data.height()
    }

    /// Percent-methylated values per sample, aligned on the shared index.
    pub fn percent_columns(&self) -> anyhow::Result<Vec<Vec<f64>>> {
        self.sample_names
            .iter()
            .map(|name| {
                Ok(self
                    .data
                    .column(name)?
                    .f64()?
                    .into_no_null_iter()
                    .collect())
            })
            .collect()
    }

    /// Cytosine counts per chromosome, ordered numerically then by letter.
    ///
    /// Labels longer than two characters that are not M/X/Y are unassembled
    /// contigs and are discarded.
    pub fn chromosome_counts(&self) -> anyhow::Result<Vec<(String, usize)>> {
        let mut counts = std::collections::BTreeMap::new();
        for chr in self.data.column("chr")?.str()?.into_iter().flatten() {
            if let Some(label) = ChromLabel::parse(chr) {
                *counts.entry(label).or_insert(0usize) += 1;
            }
        }
        Ok(counts
            .into_iter()
            .map(|(label, count)| (label.to_string(), count))
            .collect())
    }

    /// Share of cytosines (percent) with methylation above `threshold`, per
    /// sample.
    pub fn methylated_share(
        &self,
        threshold: f64,
    ) -> anyhow::Result<Vec<f64>> {
        let total = self.joined_count() as f64;
        Ok(self
            .percent_columns()?
            .iter()
            .map(|values| {
                values.iter().filter(|&&v| v > threshold).count() as f64
                    / total
                    * 100.0
            })
            .collect())
    }

    /// Pairwise Pearson correlation of percent-methylated values, including
    /// self-pairs.
    pub fn pearson_matrix(&self) -> anyhow::Result<Vec<Vec<f64>>> {
        let columns = self.percent_columns()?;
        Ok(columns
            .iter()
            .map(|a| columns.iter().map(|b| pearson_r(a, b)).collect())
            .collect())
    }

    /// Principal component analysis with samples as observations and
    /// cytosines as features.
    ///
    /// The eigendecomposition runs on the sample-by-sample Gram matrix of
    /// the feature-centered data, which is equivalent to the covariance
    /// decomposition but sized by sample count rather than cytosine count.
    pub fn pca(&self) -> anyhow::Result<PcaAnalysis> {
        let columns = self.percent_columns()?;
        let n_samples = columns.len();
        let n_features = self.joined_count();

        let mut matrix = DMatrix::zeros(n_samples, n_features);
        for (row, values) in columns.iter().enumerate() {
            for (column, value) in values.iter().enumerate() {
                matrix[(row, column)] = *value;
            }
        }

        // center each feature over the samples
        for column in 0..n_features {
            let mean =
                matrix.column(column).iter().sum::<f64>() / n_samples as f64;
            for row in 0..n_samples {
                matrix[(row, column)] -= mean;
            }
        }

        let gram = &matrix * matrix.transpose();
        let eigen = gram.symmetric_eigen();

        // order components by descending eigenvalue; numerical noise can
        // push null eigenvalues slightly below zero
        let order = (0..n_samples)
            .sorted_by(|&a, &b| {
                eigen.eigenvalues[b]
                    .partial_cmp(&eigen.eigenvalues[a])
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .collect_vec();
        let eigenvalues = order
            .iter()
            .map(|&idx| eigen.eigenvalues[idx].max(0.0))
            .collect_vec();
        let total: f64 = eigenvalues.iter().sum();

        let explained_variance_percent = eigenvalues
            .iter()
            .map(|&value| {
                if total > 0.0 {
                    value / total * 100.0
                } else {
                    0.0
                }
            })
            .collect_vec();

        let scores = (0..n_samples)
            .map(|sample| {
                order
                    .iter()
                    .zip(eigenvalues.iter())
                    .map(|(&component, &eigenvalue)| {
                        eigen.eigenvectors[(sample, component)]
                            * eigenvalue.sqrt()
                    })
                    .collect_vec()
            })
            .collect_vec();

        Ok(PcaAnalysis {
            explained_variance_percent,
            scores,
        })
    }
}

/// PCA decomposition of the methylation summary.
pub struct PcaAnalysis {
    /// Explained variance per component, in percent, descending.
    pub explained_variance_percent: Vec<f64>,
    /// Component scores per sample, one row per sample.
    pub scores: Vec<Vec<f64>>,
}

/// A chromosome label admitted into the per-chromosome panel.
///
/// Assembled chromosomes are numbers of at most two digits; the only
/// admitted letters are the mitochondrial and sex chromosomes. Everything
/// else (unassembled contigs, scaffolds) is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum ChromLabel {
    Assembled(u8),
    Sex(char),
}

impl ChromLabel {
    pub(crate) fn parse(raw: &str) -> Option<Self> {
        let name = raw.strip_prefix("chr").unwrap_or(raw);
        if name.parse::<u8>().is_ok() && name.len() <= 2 {
            return Some(ChromLabel::Assembled(name.parse().ok()?));
        }
        match name {
            "M" | "X" | "Y" => {
                Some(ChromLabel::Sex(name.chars().next().unwrap()))
            },
            _ => None,
        }
    }
}

impl Display for ChromLabel {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            ChromLabel::Assembled(num) => write!(f, "{}", num),
            ChromLabel::Sex(letter) => write!(f, "{}", letter),
        }
    }
}

/// Cytosine counts passing each coverage cutoff in `lims`, for the coverage
/// diagnostic panels. For BS-SNPer input both strands are counted.
pub fn coverage_cutoff_counts(
    df: &DataFrame,
    report_type: ReportType,
    lims: (u32, u32),
) -> anyhow::Result<Vec<usize>> {
    let coverage_columns: Vec<&str> = match report_type {
        ReportType::BsSnper => vec!["cov_watson", "cov_crick"],
        ReportType::BismarkCov => vec!["coverage"],
    };

    let coverages: Vec<Vec<u32>> = coverage_columns
        .iter()
        .map(|name| {
            Ok(df
                .column(name)?
                .u32()?
                .into_iter()
                .flatten()
                .collect())
        })
        .collect::<anyhow::Result<_>>()?;

    Ok((lims.0..=lims.1)
        .map(|cutoff| {
            coverages
                .iter()
                .map(|values| {
                    values.iter().filter(|&&cov| cov >= cutoff).count()
                })
                .sum()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    fn dss_table(
        chrs: Vec<&str>,
        positions: Vec<u64>,
        n: Vec<u32>,
        x: Vec<u32>,
    ) -> DataFrame {
        df![
            "chr" => chrs,
            "pos" => positions,
            "N" => n,
            "X" => x,
        ]
        .unwrap()
    }

    fn two_sample_summary() -> MethylationSummary {
        let s1 = dss_table(
            vec!["chr1", "chr1", "chr2"],
            vec![100, 200, 300],
            vec![10, 10, 20],
            vec![5, 0, 16],
        );
        // chr1:200 is absent here, so the join must drop it everywhere
        let s2 = dss_table(
            vec!["chr1", "chr2"],
            vec![100, 300],
            vec![20, 10],
            vec![10, 1],
        );
        MethylationSummary::try_new(
            &[(s1, "s1".to_string()), (s2, "s2".to_string())],
            OutputType::Dss,
        )
        .unwrap()
    }

    #[test]
    fn join_keeps_shared_cytosines_only() {
        let summary = two_sample_summary();
        assert_eq!(summary.joined_count(), 2);
        assert_eq!(summary.per_sample_counts(), &[3, 2]);

        let columns = summary.percent_columns().unwrap();
        assert_eq!(columns[0], vec![50.0, 80.0]);
        assert_eq!(columns[1], vec![50.0, 10.0]);
    }

    #[test]
    fn summary_requires_two_samples() {
        let s1 = dss_table(vec!["chr1"], vec![100], vec![10], vec![5]);
        let err = MethylationSummary::try_new(
            &[(s1, "s1".to_string())],
            OutputType::Dss,
        )
        .unwrap_err();
        assert!(err.to_string().contains("at least two samples"));
    }

    #[test]
    fn summary_fails_on_empty_intersection() {
        let s1 = dss_table(vec!["chr1"], vec![100], vec![10], vec![5]);
        let s2 = dss_table(vec!["chr2"], vec![100], vec![10], vec![5]);
        let err = MethylationSummary::try_new(
            &[(s1, "s1".to_string()), (s2, "s2".to_string())],
            OutputType::Dss,
        )
        .unwrap_err();
        assert!(err.to_string().contains("no cytosine"));
    }

    #[test]
    fn pearson_self_pairs_equal_one() {
        let summary = two_sample_summary();
        let matrix = summary.pearson_matrix().unwrap();
        for (idx, row) in matrix.iter().enumerate() {
            assert_approx_eq!(row[idx], 1.0);
        }
    }

    #[test]
    fn methylated_share_threshold() {
        let summary = two_sample_summary();
        // every aligned value exceeds 1%
        let share = summary.methylated_share(1.0).unwrap();
        assert_eq!(share, vec![100.0, 100.0]);
        let share_high = summary.methylated_share(40.0).unwrap();
        assert_eq!(share_high, vec![100.0, 50.0]);
    }

    #[test]
    fn chrom_label_parsing() {
        assert_eq!(ChromLabel::parse("chr1"), Some(ChromLabel::Assembled(1)));
        assert_eq!(ChromLabel::parse("10"), Some(ChromLabel::Assembled(10)));
        assert_eq!(ChromLabel::parse("chrX"), Some(ChromLabel::Sex('X')));
        assert_eq!(ChromLabel::parse("M"), Some(ChromLabel::Sex('M')));
        // unassembled contigs are discarded
        assert_eq!(ChromLabel::parse("KI270728.1"), None);
        assert_eq!(ChromLabel::parse("chr100"), None);
        assert_eq!(ChromLabel::parse("Un"), None);
    }

    #[test]
    fn chrom_label_ordering() {
        let mut labels = vec![
            ChromLabel::Sex('X'),
            ChromLabel::Assembled(10),
            ChromLabel::Sex('M'),
            ChromLabel::Assembled(2),
        ];
        labels.sort();
        assert_eq!(labels, vec![
            ChromLabel::Assembled(2),
            ChromLabel::Assembled(10),
            ChromLabel::Sex('M'),
            ChromLabel::Sex('X'),
        ]);
    }

    #[test]
    fn pca_explained_variance_sums_to_hundred() {
        let summary = two_sample_summary();
        let pca = summary.pca().unwrap();
        let total: f64 = pca.explained_variance_percent.iter().sum();
        assert_approx_eq!(total, 100.0);
        assert_eq!(pca.scores.len(), 2);
        assert_eq!(pca.scores[0].len(), 2);
    }

    #[test]
    fn coverage_cutoff_counts_both_strands() {
        let df = df![
            "cov_watson" => [Some(5u32), Some(15), None],
            "cov_crick" => [10u32, 2, 8],
        ]
        .unwrap();
        let counts =
            coverage_cutoff_counts(&df, ReportType::BsSnper, (1, 3)).unwrap();
        // cutoff 1: 2 watson + 3 crick, cutoffs 2 and 3: 2 + 3 and 2 + 2
        assert_eq!(counts, vec![5, 5, 4]);
    }
}
