// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Collaborator traits between the take-off core and a building model
//!
//! The core never touches STEP entities; it reads elements, their property
//! and quantity sets, measured shapes and a few project facts through
//! [`ElementSource`].

use crate::{EntityId, IfcType, PropertySet, QuantitySet, Result, ShapeGeometry, UnitDescriptor};
use serde::{Deserialize, Serialize};

/// A physical building element as seen by the take-off
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Entity id, unique within one document
    pub id: EntityId,
    /// Concrete class, e.g. `IfcWallStandardCase`
    pub ifc_type: IfcType,
    /// IFC GlobalId, stable across exports
    pub global_id: Option<String>,
    pub name: Option<String>,
    pub tag: Option<String>,
    /// Raw PredefinedType enum, e.g. `FLOOR`
    pub predefined_type: Option<String>,
}

impl Element {
    /// Element with only identity and class set
    pub fn new(id: EntityId, ifc_type: IfcType) -> Self {
        Self {
            id,
            ifc_type,
            global_id: None,
            name: None,
            tag: None,
            predefined_type: None,
        }
    }
}

/// Project and building facts used in the report header
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Schema identifier from the header, e.g. `IFC4`
    pub schema: String,
    pub project_name: Option<String>,
    pub project_id: Option<String>,
    pub building_name: Option<String>,
    pub building_id: Option<String>,
}

/// Read access to a building model
///
/// # Example
///
/// ```ignore
/// use ifc_qto_model::{ElementSource, IfcType};
///
/// for wall in source.elements_by_type(&IfcType::IfcWall)? {
///     for qset in source.quantity_sets(wall.id)? {
///         println!("{}: {} quantities", qset.name, qset.quantities.len());
///     }
/// }
/// ```
pub trait ElementSource: Send + Sync {
    /// Elements of the given class, known subtypes included, in document order
    fn elements_by_type(&self, ifc_type: &IfcType) -> Result<Vec<Element>>;

    /// Quantity sets attached to an element
    fn quantity_sets(&self, id: EntityId) -> Result<Vec<QuantitySet>>;

    /// Property sets attached to an element
    fn property_sets(&self, id: EntityId) -> Result<Vec<PropertySet>>;

    /// Measured body geometry, `None` when the element has no measurable shape
    fn shape(&self, id: EntityId) -> Result<Option<Box<dyn ShapeGeometry + '_>>>;

    /// Material names associated with an element, most specific first
    fn materials(&self, id: EntityId) -> Result<Vec<String>>;

    /// Name of the storey containing an element
    fn containing_storey(&self, id: EntityId) -> Result<Option<String>>;

    /// Units declared by the project
    fn unit_metadata(&self) -> Result<Vec<UnitDescriptor>>;

    /// Project and building identification
    fn project_metadata(&self) -> ProjectMetadata;
}
