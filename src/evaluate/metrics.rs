// Evaluation metrics for fitted topic models.
//
// Each metric scores one fitted model. Some are "higher is better" (likelihood,
// coherence) and some are "lower is better" (topic similarity, divergence), so
// every metric carries its own direction and the selector ranks accordingly.
//
//   loglikelihood         final joint log-likelihood of the sampler
//   cao_juan_2009         mean pairwise cosine similarity between topics
//   arun_2010             symmetric KL between two topic "spectra"
//   coherence_mimno_2011  UMass-style co-document coherence of top words
//   griffiths_2004        harmonic-mean estimate of the marginal likelihood

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::linalg::singular_values;
use super::params::LdaParams;
use crate::data::dtm::DocumentTermMatrix;
use crate::topics::model::FittedModel;

/// A named evaluation metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "loglikelihood")]
    Loglikelihood,
    #[serde(rename = "cao_juan_2009")]
    CaoJuan2009,
    #[serde(rename = "arun_2010")]
    Arun2010,
    #[serde(rename = "coherence_mimno_2011")]
    CoherenceMimno2011,
    #[serde(rename = "griffiths_2004")]
    Griffiths2004,
}

/// Whether larger or smaller scores indicate a better model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Maximize,
    Minimize,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Loglikelihood,
        Metric::CaoJuan2009,
        Metric::Arun2010,
        Metric::CoherenceMimno2011,
        Metric::Griffiths2004,
    ];

    /// Metrics computed when none are requested explicitly.
    pub fn defaults() -> Vec<Metric> {
        vec![
            Metric::Loglikelihood,
            Metric::CaoJuan2009,
            Metric::Arun2010,
            Metric::CoherenceMimno2011,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Loglikelihood => "loglikelihood",
            Metric::CaoJuan2009 => "cao_juan_2009",
            Metric::Arun2010 => "arun_2010",
            Metric::CoherenceMimno2011 => "coherence_mimno_2011",
            Metric::Griffiths2004 => "griffiths_2004",
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Metric::CaoJuan2009 | Metric::Arun2010 => Direction::Minimize,
            Metric::Loglikelihood | Metric::CoherenceMimno2011 | Metric::Griffiths2004 => {
                Direction::Maximize
            }
        }
    }

    /// Whether score `a` is better than score `b` under this metric.
    pub fn is_better(&self, a: f64, b: f64) -> bool {
        match self.direction() {
            Direction::Maximize => a > b,
            Direction::Minimize => a < b,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Metric::ALL
            .into_iter()
            .find(|m| m.name() == s.trim())
            .ok_or_else(|| {
                let known: Vec<&str> = Metric::ALL.iter().map(|m| m.name()).collect();
                anyhow::anyhow!("Unknown metric '{s}'. Known metrics: {}", known.join(", "))
            })
    }
}

/// Parse a comma-separated metric list.
pub fn parse_metrics(list: &str) -> Result<Vec<Metric>> {
    let mut metrics = Vec::new();
    for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let m: Metric = name.parse()?;
        if !metrics.contains(&m) {
            metrics.push(m);
        }
    }
    if metrics.is_empty() {
        anyhow::bail!("No metrics given");
    }
    Ok(metrics)
}

/// Tunables for individual metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricOptions {
    /// Top words per topic used by the coherence metric
    pub coherence_top_n: usize,
    /// Smoothing constant added to co-document counts
    pub coherence_eps: f64,
    /// Iterations discarded before the harmonic-mean estimate
    pub griffiths_burnin: usize,
}

impl Default for MetricOptions {
    fn default() -> Self {
        Self {
            coherence_top_n: 20,
            coherence_eps: 1e-12,
            griffiths_burnin: 50,
        }
    }
}

/// Compute one metric for a fitted model.
pub fn compute(
    metric: Metric,
    model: &FittedModel,
    dtm: &DocumentTermMatrix,
    params: &LdaParams,
    opts: &MetricOptions,
) -> Result<f64> {
    match metric {
        Metric::Loglikelihood => model
            .loglikelihood()
            .ok_or_else(|| anyhow::anyhow!("Model has no log-likelihood trace")),
        Metric::CaoJuan2009 => Ok(cao_juan_2009(model)),
        Metric::Arun2010 => arun_2010(model, &dtm.doc_lengths()),
        Metric::CoherenceMimno2011 => Ok(coherence_mimno_2011(
            model,
            dtm,
            opts.coherence_top_n,
            opts.coherence_eps,
        )),
        Metric::Griffiths2004 => {
            let burnin = opts.griffiths_burnin / params.refresh.max(1);
            if burnin >= model.loglikelihoods.len() {
                anyhow::bail!(
                    "griffiths_2004 burn-in of {} iterations leaves no log-likelihood samples \
                     (only {} recorded every {} iterations)",
                    opts.griffiths_burnin,
                    model.loglikelihoods.len(),
                    params.refresh
                );
            }
            Ok(griffiths_2004(&model.loglikelihoods[burnin..]))
        }
    }
}

/// Mean cosine similarity over all pairs of topic-word rows (Cao Juan et al., 2009).
///
/// Lower means more distinct topics. Zero for fewer than two topics.
pub fn cao_juan_2009(model: &FittedModel) -> f64 {
    let rows: Vec<&[f64]> = model.topic_word.rows().collect();
    let norms: Vec<f64> = rows
        .iter()
        .map(|r| r.iter().map(|v| v * v).sum::<f64>().sqrt())
        .collect();

    let k = rows.len();
    if k < 2 {
        return 0.0;
    }

    let mut total = 0.0;
    for i in 0..k {
        for j in (i + 1)..k {
            let dot: f64 = rows[i].iter().zip(rows[j]).map(|(a, b)| a * b).sum();
            let denom = norms[i] * norms[j];
            if denom > 0.0 {
                total += dot / denom;
            }
        }
    }
    total / (k * (k - 1) / 2) as f64
}

/// Symmetric KL divergence between the singular values of the topic-word
/// matrix and the length-weighted topic mass (Arun et al., 2010).
///
/// Neither vector is normalized to a probability distribution. Requires no
/// more topics than vocabulary terms.
pub fn arun_2010(model: &FittedModel, doc_lengths: &[u64]) -> Result<f64> {
    let k = model.n_topics();
    if k > model.topic_word.n_cols {
        anyhow::bail!(
            "arun_2010 needs n_topics ({k}) <= vocabulary size ({})",
            model.topic_word.n_cols
        );
    }
    if doc_lengths.len() != model.doc_topic.n_rows {
        anyhow::bail!(
            "arun_2010 got {} document lengths for {} documents",
            doc_lengths.len(),
            model.doc_topic.n_rows
        );
    }

    let cm1 = singular_values(&model.topic_word);

    let l_norm = doc_lengths
        .iter()
        .map(|&l| (l as f64).powi(2))
        .sum::<f64>()
        .sqrt();
    let mut cm2 = vec![0.0; k];
    for (row, &len) in model.doc_topic.rows().zip(doc_lengths) {
        for (acc, &p) in cm2.iter_mut().zip(row) {
            *acc += len as f64 * p;
        }
    }
    if l_norm > 0.0 {
        for v in &mut cm2 {
            *v /= l_norm;
        }
    }

    Ok(cm1
        .iter()
        .zip(&cm2)
        .map(|(&a, &b)| a * (a / b).ln() + b * (b / a).ln())
        .sum())
}

/// Mean topic coherence over each topic's `top_n` words (Mimno et al., 2011).
///
/// For the words v_1..v_N of a topic, sums log((D(v_m, v_l) + eps) / D(v_l))
/// over all pairs l < m, where D counts documents containing the words. The
/// per-topic sum is divided by N(N-1). Higher is better.
pub fn coherence_mimno_2011(
    model: &FittedModel,
    dtm: &DocumentTermMatrix,
    top_n: usize,
    eps: f64,
) -> f64 {
    let top_n = top_n.min(model.topic_word.n_cols);
    let k = model.n_topics();
    if k == 0 || top_n < 2 {
        return 0.0;
    }
    let df = dtm.doc_frequencies();

    let mut total = 0.0;
    for t in 0..k {
        let top: Vec<usize> = model
            .topic_word
            .top_n_in_row(t, top_n)
            .into_iter()
            .map(|(w, _)| w)
            .collect();

        let mut c_t = 0.0;
        for m in 1..top.len() {
            for l in 0..m {
                let codf = dtm.codoc_frequency(top[m], top[l]) as f64;
                let df_l = df[top[l]].max(1) as f64;
                c_t += ((codf + eps) / df_l).ln();
            }
        }
        total += c_t / (top_n * (top_n - 1)) as f64;
    }
    total / k as f64
}

/// Harmonic-mean estimate of log p(w) from sampled log-likelihoods
/// (Griffiths & Steyvers, 2004), computed in log space.
pub fn griffiths_2004(logliks: &[f64]) -> f64 {
    if logliks.is_empty() {
        return f64::NAN;
    }
    let mut sorted = logliks.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    let median = if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    };

    // log(mean(exp(median - ll))) via log-sum-exp
    let xs: Vec<f64> = logliks.iter().map(|ll| median - ll).collect();
    let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let lse = max + xs.iter().map(|x| (x - max).exp()).sum::<f64>().ln();
    median - (lse - (n as f64).ln())
}
