// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Best-effort material and storey lookups
//!
//! Source failures are logged and read as "unknown".

use ifc_qto_model::{ElementSource, EntityId};

/// First named material associated with an element
pub fn first_material(source: &dyn ElementSource, id: EntityId) -> Option<String> {
    match source.materials(id) {
        Ok(names) => names.into_iter().find(|name| !name.trim().is_empty()),
        Err(e) => {
            log::debug!("Material lookup failed for {}: {}", id, e);
            None
        }
    }
}

/// Name of the storey containing an element
pub fn storey_name(source: &dyn ElementSource, id: EntityId) -> Option<String> {
    match source.containing_storey(id) {
        Ok(name) => name.filter(|name| !name.trim().is_empty()),
        Err(e) => {
            log::debug!("Storey lookup failed for {}: {}", id, e);
            None
        }
    }
}
