//! Customer segmentation
//!
//! KMeans over the standardized per-customer feature matrix, with the
//! cluster count chosen by silhouette score across candidate values of k.
//! The RNG is seeded from configuration, so the same input always yields
//! the same assignments.

use linfa::metrics::SilhouetteScore;
use linfa::traits::{Fit, Predict};
use linfa::DatasetBase;
use linfa_clustering::KMeans;
use ndarray::Array2;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use serde::Serialize;
use tracing::debug;

use salesdash_common::config::SegmentationConfig;
use salesdash_common::{Error, Result};

use super::aggregate::{round2, safe_div, CustomerFeatures};

/// A single customer's cluster assignment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerSegment {
    pub customer: String,
    pub cluster: usize,
}

/// Mean raw features of one cluster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentSummary {
    pub cluster: usize,
    pub customer_count: u64,
    pub avg_revenue: f64,
    pub avg_order_frequency: f64,
    pub avg_order_value: f64,
    pub avg_markup_percent: f64,
}

/// The full segmentation result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segmentation {
    /// Chosen cluster count
    pub k: usize,
    /// Silhouette score of the chosen model
    pub silhouette: f64,
    pub assignments: Vec<CustomerSegment>,
    pub segments: Vec<SegmentSummary>,
}

/// Segment customers by their standardized behavioral features.
///
/// Tries every k from 2 up to the configured maximum (never more than
/// `n - 1` for n customers) and keeps the model with the best silhouette
/// score; ties keep the smaller k. Fewer than three customers cannot
/// support two scoreable clusters and yield [`Error::DegenerateInput`].
pub fn segment_customers(
    features: &[CustomerFeatures],
    config: &SegmentationConfig,
) -> Result<Segmentation> {
    let n = features.len();
    if n < 3 {
        return Err(Error::DegenerateInput(format!(
            "segmentation needs at least 3 customers, got {n}"
        )));
    }

    let mut matrix = Array2::zeros((n, 4));
    for (i, f) in features.iter().enumerate() {
        matrix[[i, 0]] = f.standardized.total_revenue;
        matrix[[i, 1]] = f.standardized.order_frequency;
        matrix[[i, 2]] = f.standardized.avg_order_value;
        matrix[[i, 3]] = f.standardized.avg_markup_percent;
    }

    let max_k = config.max_clusters.min(n - 1).max(2);
    let mut best: Option<(usize, f64, Vec<usize>)> = None;
    for k in 2..=max_k {
        let rng = Xoshiro256Plus::seed_from_u64(config.seed);
        let dataset = DatasetBase::from(matrix.clone());
        let model = KMeans::params_with_rng(k, rng)
            .fit(&dataset)
            .map_err(|e| Error::Internal(format!("k-means fit failed for k={k}: {e}")))?;
        let clustered = model.predict(dataset);
        let score = clustered
            .silhouette_score()
            .map_err(|e| Error::Internal(format!("silhouette score failed for k={k}: {e}")))?;
        debug!(k, score, "evaluated candidate cluster count");
        // strict > keeps the smallest k on score ties
        if best.as_ref().map_or(true, |(_, s, _)| score > *s) {
            best = Some((k, score, clustered.targets().iter().copied().collect()));
        }
    }

    // max_k >= 2 guarantees at least one candidate was evaluated
    let (k, silhouette, labels) = best.ok_or_else(|| {
        Error::Internal("no candidate cluster count could be evaluated".to_string())
    })?;

    let assignments: Vec<CustomerSegment> = features
        .iter()
        .zip(&labels)
        .map(|(f, cluster)| CustomerSegment {
            customer: f.customer.clone(),
            cluster: *cluster,
        })
        .collect();

    let mut segments = Vec::with_capacity(k);
    for cluster in 0..k {
        let members: Vec<&CustomerFeatures> = features
            .iter()
            .zip(&labels)
            .filter(|(_, l)| **l == cluster)
            .map(|(f, _)| f)
            .collect();
        let count = members.len() as f64;
        segments.push(SegmentSummary {
            cluster,
            customer_count: members.len() as u64,
            avg_revenue: round2(safe_div(
                members.iter().map(|f| f.total_revenue).sum(),
                count,
            )),
            avg_order_frequency: round2(safe_div(
                members.iter().map(|f| f.order_frequency as f64).sum(),
                count,
            )),
            avg_order_value: round2(safe_div(
                members.iter().map(|f| f.avg_order_value).sum(),
                count,
            )),
            avg_markup_percent: round2(safe_div(
                members.iter().map(|f| f.avg_markup_percent).sum(),
                count,
            )),
        });
    }

    Ok(Segmentation {
        k,
        silhouette,
        assignments,
        segments,
    })
}
