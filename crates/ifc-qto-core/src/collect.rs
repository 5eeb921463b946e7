// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element collection and filtering

use crate::config::QtoConfig;
use ifc_qto_model::{Element, ElementSource, IfcType};
use std::collections::HashSet;

/// Gathers the physical elements to take off
pub struct ElementCollector {
    element_types: Vec<IfcType>,
    excluded_types: Vec<IfcType>,
    /// Lowercase name/tag fragments
    excluded_keywords: Vec<String>,
}

impl ElementCollector {
    pub fn new(config: &QtoConfig) -> Self {
        Self {
            element_types: config.element_ifc_types(),
            excluded_types: config.excluded_ifc_types(),
            excluded_keywords: config
                .excluded_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
        }
    }

    /// Elements of every configured type, each at most once, in type order
    pub fn collect(&self, source: &dyn ElementSource) -> Vec<Element> {
        let mut seen = HashSet::new();
        let mut elements = Vec::new();

        for ifc_type in &self.element_types {
            let found = match source.elements_by_type(ifc_type) {
                Ok(found) => found,
                Err(e) => {
                    log::warn!("Cannot enumerate {}: {}", ifc_type, e);
                    continue;
                }
            };
            let total = found.len();
            let before = elements.len();
            for element in found {
                if self.is_excluded(&element) || !seen.insert(element.id) {
                    continue;
                }
                elements.push(element);
            }
            log::debug!(
                "{}: {} found, {} kept",
                ifc_type,
                total,
                elements.len() - before
            );
        }

        log::info!("Collected {} elements", elements.len());
        elements
    }

    /// Non-physical elements: excluded classes, or a name or tag mentioning
    /// an excluded keyword
    pub fn is_excluded(&self, element: &Element) -> bool {
        if self
            .excluded_types
            .iter()
            .any(|excluded| element.ifc_type.is_a(excluded))
        {
            return true;
        }
        [element.name.as_deref(), element.tag.as_deref()]
            .into_iter()
            .flatten()
            .map(str::to_lowercase)
            .any(|text| self.excluded_keywords.iter().any(|k| text.contains(k.as_str())))
    }
}
