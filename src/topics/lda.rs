// Latent Dirichlet Allocation fitted by collapsed Gibbs sampling.
//
// The sampler keeps three count tables (topic×word, document×topic and
// per-topic totals) and resamples the topic of every token in turn from
//
//     p(z = k | rest) ∝ (n_kw + η) / (n_k + Vη) · (n_dk + α)
//
// Initial assignments are deterministic (token i gets topic i mod K) and all
// randomness comes from a ChaCha8 stream seeded with `random_state`, so the
// same parameters on the same matrix always produce the same model.

use anyhow::Result;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use super::model::{DenseMatrix, FittedModel};
use super::special::ln_gamma;
use super::traits::TopicModel;
use crate::data::dtm::DocumentTermMatrix;
use crate::evaluate::params::LdaParams;

/// Collapsed Gibbs sampler for LDA.
pub struct GibbsLda {
    params: LdaParams,
}

impl GibbsLda {
    pub fn new(params: LdaParams) -> Self {
        Self { params }
    }

    fn check_params(&self) -> Result<()> {
        let p = &self.params;
        if p.n_topics == 0 {
            anyhow::bail!("n_topics must be at least 1");
        }
        if p.n_iter == 0 {
            anyhow::bail!("n_iter must be at least 1");
        }
        if p.refresh == 0 {
            anyhow::bail!("refresh must be at least 1");
        }
        if !(p.alpha > 0.0 && p.alpha.is_finite()) {
            anyhow::bail!("alpha must be a positive number, got {}", p.alpha);
        }
        if !(p.eta > 0.0 && p.eta.is_finite()) {
            anyhow::bail!("eta must be a positive number, got {}", p.eta);
        }
        Ok(())
    }
}

impl TopicModel for GibbsLda {
    fn fit(&self, dtm: &DocumentTermMatrix) -> Result<FittedModel> {
        self.check_params()?;
        if dtm.total_tokens() == 0 {
            anyhow::bail!("Document-term matrix contains no tokens");
        }

        let p = &self.params;
        let mut state = SamplerState::initialize(dtm, p.n_topics);
        let mut rng = ChaCha8Rng::seed_from_u64(p.random_state);
        let mut loglikelihoods = Vec::with_capacity(p.n_iter / p.refresh + 2);

        for it in 0..p.n_iter {
            if it % p.refresh == 0 {
                let ll = state.loglikelihood(p.alpha, p.eta);
                debug!(n_topics = p.n_topics, iteration = it, loglikelihood = ll, "Gibbs sampler progress");
                loglikelihoods.push(ll);
            }
            state.sweep(&mut rng, p.alpha, p.eta);
        }

        let ll = state.loglikelihood(p.alpha, p.eta);
        loglikelihoods.push(ll);
        info!(n_topics = p.n_topics, n_iter = p.n_iter, loglikelihood = ll, "Fitted LDA model");

        Ok(state.into_model(p.alpha, p.eta, loglikelihoods))
    }
}

/// Token assignments and count tables for one sampling run.
struct SamplerState {
    n_topics: usize,
    n_terms: usize,
    /// Word index of each token
    ws: Vec<u32>,
    /// Document index of each token
    ds: Vec<u32>,
    /// Topic assignment of each token
    zs: Vec<u32>,
    /// Topic-word counts (`n_topics` × `n_terms`)
    nzw: Vec<u32>,
    /// Document-topic counts (`n_docs` × `n_topics`)
    ndz: Vec<u32>,
    /// Tokens per topic
    nz: Vec<u32>,
    /// Tokens per document
    nd: Vec<u32>,
    /// Scratch buffer for the cumulative sampling distribution
    cumulative: Vec<f64>,
}

impl SamplerState {
    fn initialize(dtm: &DocumentTermMatrix, n_topics: usize) -> Self {
        let n_docs = dtm.n_docs();
        let n_terms = dtm.n_terms();
        let n_tokens = dtm.total_tokens() as usize;

        let mut ws = Vec::with_capacity(n_tokens);
        let mut ds = Vec::with_capacity(n_tokens);
        for d in 0..n_docs {
            for &(w, c) in dtm.row(d) {
                for _ in 0..c {
                    ws.push(w);
                    ds.push(d as u32);
                }
            }
        }

        let mut state = Self {
            n_topics,
            n_terms,
            zs: Vec::with_capacity(n_tokens),
            nzw: vec![0; n_topics * n_terms],
            ndz: vec![0; n_docs * n_topics],
            nz: vec![0; n_topics],
            nd: vec![0; n_docs],
            cumulative: vec![0.0; n_topics],
            ws,
            ds,
        };

        for i in 0..state.ws.len() {
            let (w, d) = (state.ws[i] as usize, state.ds[i] as usize);
            let z = i % n_topics;
            state.zs.push(z as u32);
            state.nzw[z * n_terms + w] += 1;
            state.ndz[d * n_topics + z] += 1;
            state.nz[z] += 1;
            state.nd[d] += 1;
        }
        state
    }

    /// Resample the topic of every token once.
    fn sweep(&mut self, rng: &mut ChaCha8Rng, alpha: f64, eta: f64) {
        let k_topics = self.n_topics;
        let eta_sum = eta * self.n_terms as f64;

        for i in 0..self.ws.len() {
            let w = self.ws[i] as usize;
            let d = self.ds[i] as usize;
            let z = self.zs[i] as usize;

            self.nzw[z * self.n_terms + w] -= 1;
            self.ndz[d * k_topics + z] -= 1;
            self.nz[z] -= 1;

            let mut total = 0.0;
            for k in 0..k_topics {
                total += (self.nzw[k * self.n_terms + w] as f64 + eta)
                    / (self.nz[k] as f64 + eta_sum)
                    * (self.ndz[d * k_topics + k] as f64 + alpha);
                self.cumulative[k] = total;
            }

            let r = rng.random::<f64>() * total;
            let z_new = self
                .cumulative
                .partition_point(|&c| c <= r)
                .min(k_topics - 1);

            self.zs[i] = z_new as u32;
            self.nzw[z_new * self.n_terms + w] += 1;
            self.ndz[d * k_topics + z_new] += 1;
            self.nz[z_new] += 1;
        }
    }

    /// Full joint log-likelihood log p(w, z | α, η) of the current state.
    fn loglikelihood(&self, alpha: f64, eta: f64) -> f64 {
        let k_topics = self.n_topics;
        let v = self.n_terms as f64;
        let lgamma_eta = ln_gamma(eta);
        let lgamma_alpha = ln_gamma(alpha);

        let mut ll = k_topics as f64 * ln_gamma(eta * v);
        for k in 0..k_topics {
            ll -= ln_gamma(eta * v + self.nz[k] as f64);
            for &n in &self.nzw[k * self.n_terms..(k + 1) * self.n_terms] {
                if n > 0 {
                    ll += ln_gamma(eta + n as f64) - lgamma_eta;
                }
            }
        }

        let alpha_sum = alpha * k_topics as f64;
        for (d, &len) in self.nd.iter().enumerate() {
            ll += ln_gamma(alpha_sum) - ln_gamma(alpha_sum + len as f64);
            for &n in &self.ndz[d * k_topics..(d + 1) * k_topics] {
                if n > 0 {
                    ll += ln_gamma(alpha + n as f64) - lgamma_alpha;
                }
            }
        }
        ll
    }

    fn into_model(self, alpha: f64, eta: f64, loglikelihoods: Vec<f64>) -> FittedModel {
        let n_docs = self.nd.len();

        let mut topic_word = DenseMatrix::zeros(self.n_topics, self.n_terms);
        for k in 0..self.n_topics {
            let counts = &self.nzw[k * self.n_terms..(k + 1) * self.n_terms];
            for (dst, &n) in topic_word.row_mut(k).iter_mut().zip(counts) {
                *dst = n as f64 + eta;
            }
        }
        topic_word.normalize_rows();

        let mut doc_topic = DenseMatrix::zeros(n_docs, self.n_topics);
        for d in 0..n_docs {
            let counts = &self.ndz[d * self.n_topics..(d + 1) * self.n_topics];
            for (dst, &n) in doc_topic.row_mut(d).iter_mut().zip(counts) {
                *dst = n as f64 + alpha;
            }
        }
        doc_topic.normalize_rows();

        FittedModel {
            topic_word,
            doc_topic,
            loglikelihoods,
        }
    }
}
