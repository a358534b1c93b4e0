//! Grammar-id backfill for candidates committed without a conversion pass.

use henkan_core::request::{ConversionRequestBuilder, RequestOptions, RequestType};
use henkan_core::segments::{Candidate, Segments};
use henkan_core::settings::settings;
use tracing::{debug, error};

use crate::lattice::LatticeConverter;

/// Resolve unset POS ids of `candidate`.
///
/// The ids default to the general noun class. The candidate's own key is then
/// re-converted in prediction mode with a widening candidate cap; the first
/// result with the same value donates its ids and costs.
pub(super) fn complete_pos_ids(lattice: &dyn LatticeConverter, candidate: &mut Candidate) {
    if candidate.value.is_empty() || candidate.key.is_empty() {
        return;
    }
    if candidate.has_pos_ids() {
        return;
    }

    let general_noun = settings().pos.general_noun_id;
    candidate.left_id = general_noun;
    candidate.right_id = general_noun;

    let completion = &settings().completion;
    let mut size = completion.expand_size_start;
    while size < completion.expand_size_max {
        let mut segments = Segments::new();
        segments.set_conversion_key(&candidate.key);
        let request = ConversionRequestBuilder::new()
            .set_options(RequestOptions {
                request_type: RequestType::Prediction,
                max_conversion_candidates_size: size,
                ..RequestOptions::default()
            })
            .set_key(candidate.key.clone())
            .build();
        if !lattice.convert_for_request(&request, &mut segments) {
            error!(key = %candidate.key, "lattice conversion failed while completing POS ids");
            return;
        }

        let found = segments
            .segment(0)
            .and_then(|seg| seg.candidates.iter().find(|c| c.value == candidate.value));
        if let Some(reference) = found {
            candidate.left_id = reference.left_id;
            candidate.right_id = reference.right_id;
            candidate.cost = reference.cost;
            candidate.word_cost = reference.word_cost;
            candidate.structure_cost = reference.structure_cost;
            debug!(lid = candidate.left_id, rid = candidate.right_id, "completed POS ids");
            return;
        }
        size += completion.expand_size_step;
    }
    debug!(
        key = %candidate.key,
        value = %candidate.value,
        lid = candidate.left_id,
        "no POS ids found, keeping general noun"
    );
}
