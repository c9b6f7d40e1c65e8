//! Batch generation.
//!
//! Runs many independent requests on the rayon pool. Requests share only
//! the encoder, which is read-only, so no coordination is needed.

use rayon::prelude::*;
use tracing::info;

use super::pipeline::generate;
use super::synth::SynthParams;
use crate::encode::RasterEncoder;
use crate::error::Result;
use crate::types::{EncodedArtifact, GenerationRequest};

/// Generates one artifact per request, in parallel.
///
/// Results are returned in request order. A failing request does not
/// affect the others.
pub fn generate_batch(
    requests: &[GenerationRequest],
    encoder: &dyn RasterEncoder,
    params: &SynthParams,
) -> Vec<Result<EncodedArtifact>> {
    info!(count = requests.len(), "starting batch");

    requests
        .par_iter()
        .map(|request| generate(request, encoder, params))
        .collect()
}

/// Expands one request into `count` requests.
///
/// With a seed, request `i` uses `seed + i` so the batch is reproducible
/// but every image differs.
pub fn expand_request(request: &GenerationRequest, count: usize) -> Vec<GenerationRequest> {
    (0..count as u64)
        .map(|i| GenerationRequest {
            seed: request.seed.map(|s| s.wrapping_add(i)),
            ..request.clone()
        })
        .collect()
}
