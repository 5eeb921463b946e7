// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Batch extraction with per-element failure isolation

use crate::error::Result;
use crate::quantity::{QuantityRecord, QuantityResolver};
use ifc_qto_model::Element;

/// Storey lookup used during extraction
pub type StoreyFn<'f> = dyn Fn(&Element) -> Result<Option<String>> + 'f;

/// Resolve every element, keeping input order
///
/// Elements that cannot be resolved are logged and dropped. A failed storey
/// lookup only clears that element's storey.
pub fn extract_batch(
    resolver: &QuantityResolver<'_>,
    elements: &[Element],
    storey_of: Option<&StoreyFn<'_>>,
) -> Vec<QuantityRecord> {
    let records: Vec<QuantityRecord> = elements
        .iter()
        .filter_map(|element| {
            let storey = storey_of.and_then(|lookup| match lookup(element) {
                Ok(storey) => storey,
                Err(e) => {
                    log::debug!("Storey lookup failed for {}: {}", element.id, e);
                    None
                }
            });
            match resolver.resolve(element, storey) {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!("Skipping element {}: {}", element.id, e);
                    None
                }
            }
        })
        .collect();

    log::info!(
        "Extracted quantities for {} of {} elements",
        records.len(),
        elements.len()
    );
    records
}
