// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for IFC data representation
//!
//! Entity identifiers, the known entity classes, decoded attribute values and
//! document level metadata.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type-safe entity identifier
///
/// Wraps the raw STEP instance name (e.g., #123 becomes EntityId(123))
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize, Default,
)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        EntityId(id)
    }
}

impl From<EntityId> for u32 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Declares [`IfcType`] together with its STEP keyword table.
///
/// `name()` yields the schema spelling (`IfcWall`), `parse()` accepts the
/// STEP keyword (`IFCWALL`) in any case.
macro_rules! ifc_types {
    ($( $group:literal => [ $( $variant:ident = $keyword:literal ),* $(,)? ] )*) => {
        /// IFC entity class
        ///
        /// Covers the classes the take-off reads. Anything else is kept as
        /// [`IfcType::Unknown`] with its upper-case STEP keyword.
        #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
        pub enum IfcType {
            $( $( $variant, )* )*
            /// Unknown type with original keyword
            Unknown(String),
        }

        impl IfcType {
            /// Parse a STEP keyword or schema name into an IfcType
            pub fn parse(s: &str) -> Self {
                match s {
                    $( $( $keyword => IfcType::$variant, )* )*
                    _ if s.bytes().any(|b| b.is_ascii_lowercase()) => {
                        Self::parse(&s.to_ascii_uppercase())
                    }
                    _ => IfcType::Unknown(s.to_string()),
                }
            }

            /// Schema spelling of the class, e.g. `IfcWallStandardCase`
            pub fn name(&self) -> &str {
                match self {
                    $( $( IfcType::$variant => stringify!($variant), )* )*
                    IfcType::Unknown(s) => s,
                }
            }

            /// Group the class belongs to, used in debug output
            pub fn group(&self) -> &'static str {
                match self {
                    $( $( IfcType::$variant => $group, )* )*
                    IfcType::Unknown(_) => "unknown",
                }
            }
        }
    };
}

ifc_types! {
    "spatial" => [
        IfcProject = "IFCPROJECT",
        IfcSite = "IFCSITE",
        IfcBuilding = "IFCBUILDING",
        IfcBuildingStorey = "IFCBUILDINGSTOREY",
        IfcSpace = "IFCSPACE",
    ]
    "element" => [
        IfcWall = "IFCWALL",
        IfcWallStandardCase = "IFCWALLSTANDARDCASE",
        IfcWallElementedCase = "IFCWALLELEMENTEDCASE",
        IfcCurtainWall = "IFCCURTAINWALL",
        IfcSlab = "IFCSLAB",
        IfcSlabStandardCase = "IFCSLABSTANDARDCASE",
        IfcSlabElementedCase = "IFCSLABELEMENTEDCASE",
        IfcRoof = "IFCROOF",
        IfcBeam = "IFCBEAM",
        IfcBeamStandardCase = "IFCBEAMSTANDARDCASE",
        IfcColumn = "IFCCOLUMN",
        IfcColumnStandardCase = "IFCCOLUMNSTANDARDCASE",
        IfcMember = "IFCMEMBER",
        IfcMemberStandardCase = "IFCMEMBERSTANDARDCASE",
        IfcPlate = "IFCPLATE",
        IfcPlateStandardCase = "IFCPLATESTANDARDCASE",
        IfcDoor = "IFCDOOR",
        IfcWindow = "IFCWINDOW",
        IfcStair = "IFCSTAIR",
        IfcStairFlight = "IFCSTAIRFLIGHT",
        IfcRamp = "IFCRAMP",
        IfcRailing = "IFCRAILING",
        IfcCovering = "IFCCOVERING",
        IfcFooting = "IFCFOOTING",
        IfcPile = "IFCPILE",
        IfcBuildingElementProxy = "IFCBUILDINGELEMENTPROXY",
        IfcOpeningElement = "IFCOPENINGELEMENT",
        IfcOpeningStandardCase = "IFCOPENINGSTANDARDCASE",
        IfcAnnotation = "IFCANNOTATION",
        IfcGrid = "IFCGRID",
    ]
    "relationship" => [
        IfcRelAggregates = "IFCRELAGGREGATES",
        IfcRelContainedInSpatialStructure = "IFCRELCONTAINEDINSPATIALSTRUCTURE",
        IfcRelDefinesByProperties = "IFCRELDEFINESBYPROPERTIES",
        IfcRelDefinesByType = "IFCRELDEFINESBYTYPE",
        IfcRelAssociatesMaterial = "IFCRELASSOCIATESMATERIAL",
    ]
    "property" => [
        IfcPropertySet = "IFCPROPERTYSET",
        IfcPropertySingleValue = "IFCPROPERTYSINGLEVALUE",
        IfcElementQuantity = "IFCELEMENTQUANTITY",
        IfcQuantityLength = "IFCQUANTITYLENGTH",
        IfcQuantityArea = "IFCQUANTITYAREA",
        IfcQuantityVolume = "IFCQUANTITYVOLUME",
        IfcQuantityCount = "IFCQUANTITYCOUNT",
        IfcQuantityWeight = "IFCQUANTITYWEIGHT",
        IfcQuantityTime = "IFCQUANTITYTIME",
    ]
    "material" => [
        IfcMaterial = "IFCMATERIAL",
        IfcMaterialList = "IFCMATERIALLIST",
        IfcMaterialLayer = "IFCMATERIALLAYER",
        IfcMaterialLayerSet = "IFCMATERIALLAYERSET",
        IfcMaterialLayerSetUsage = "IFCMATERIALLAYERSETUSAGE",
        IfcMaterialProfile = "IFCMATERIALPROFILE",
        IfcMaterialProfileSet = "IFCMATERIALPROFILESET",
        IfcMaterialProfileSetUsage = "IFCMATERIALPROFILESETUSAGE",
        IfcMaterialConstituent = "IFCMATERIALCONSTITUENT",
        IfcMaterialConstituentSet = "IFCMATERIALCONSTITUENTSET",
    ]
    "unit" => [
        IfcUnitAssignment = "IFCUNITASSIGNMENT",
        IfcSIUnit = "IFCSIUNIT",
        IfcConversionBasedUnit = "IFCCONVERSIONBASEDUNIT",
        IfcContextDependentUnit = "IFCCONTEXTDEPENDENTUNIT",
        IfcMeasureWithUnit = "IFCMEASUREWITHUNIT",
    ]
    "geometry" => [
        IfcProductDefinitionShape = "IFCPRODUCTDEFINITIONSHAPE",
        IfcShapeRepresentation = "IFCSHAPEREPRESENTATION",
        IfcExtrudedAreaSolid = "IFCEXTRUDEDAREASOLID",
        IfcFacetedBrep = "IFCFACETEDBREP",
        IfcClosedShell = "IFCCLOSEDSHELL",
        IfcFace = "IFCFACE",
        IfcFaceBound = "IFCFACEBOUND",
        IfcFaceOuterBound = "IFCFACEOUTERBOUND",
        IfcPolyLoop = "IFCPOLYLOOP",
        IfcTriangulatedFaceSet = "IFCTRIANGULATEDFACESET",
        IfcCartesianPointList3D = "IFCCARTESIANPOINTLIST3D",
        IfcMappedItem = "IFCMAPPEDITEM",
        IfcRepresentationMap = "IFCREPRESENTATIONMAP",
        IfcBooleanResult = "IFCBOOLEANRESULT",
        IfcBooleanClippingResult = "IFCBOOLEANCLIPPINGRESULT",
        IfcRectangleProfileDef = "IFCRECTANGLEPROFILEDEF",
        IfcRectangleHollowProfileDef = "IFCRECTANGLEHOLLOWPROFILEDEF",
        IfcCircleProfileDef = "IFCCIRCLEPROFILEDEF",
        IfcCircleHollowProfileDef = "IFCCIRCLEHOLLOWPROFILEDEF",
        IfcIShapeProfileDef = "IFCISHAPEPROFILEDEF",
        IfcArbitraryClosedProfileDef = "IFCARBITRARYCLOSEDPROFILEDEF",
        IfcArbitraryProfileDefWithVoids = "IFCARBITRARYPROFILEDEFWITHVOIDS",
        IfcPolyline = "IFCPOLYLINE",
        IfcCartesianPoint = "IFCCARTESIANPOINT",
        IfcDirection = "IFCDIRECTION",
        IfcAxis2Placement2D = "IFCAXIS2PLACEMENT2D",
        IfcAxis2Placement3D = "IFCAXIS2PLACEMENT3D",
    ]
}

impl FromStr for IfcType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl IfcType {
    /// Direct supertype among the known classes, if the class is a
    /// specialised case of another known class
    pub fn supertype(&self) -> Option<IfcType> {
        let parent = match self {
            IfcType::IfcWallStandardCase | IfcType::IfcWallElementedCase => IfcType::IfcWall,
            IfcType::IfcSlabStandardCase | IfcType::IfcSlabElementedCase => IfcType::IfcSlab,
            IfcType::IfcBeamStandardCase => IfcType::IfcBeam,
            IfcType::IfcColumnStandardCase => IfcType::IfcColumn,
            IfcType::IfcMemberStandardCase => IfcType::IfcMember,
            IfcType::IfcPlateStandardCase => IfcType::IfcPlate,
            IfcType::IfcOpeningStandardCase => IfcType::IfcOpeningElement,
            _ => return None,
        };
        Some(parent)
    }

    /// True when the class is `other` or one of its known subtypes
    pub fn is_a(&self, other: &IfcType) -> bool {
        self == other || self.supertype().as_ref() == Some(other)
    }

    /// Check if this type is a spatial structure element
    pub fn is_spatial(&self) -> bool {
        self.group() == "spatial"
    }
}

impl Default for IfcType {
    fn default() -> Self {
        IfcType::Unknown(String::new())
    }
}

impl fmt::Display for IfcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decoded attribute value
///
/// Represents any value that can appear in an IFC entity's attribute list.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum AttributeValue {
    /// Null value ($)
    #[default]
    Null,
    /// Derived value (*)
    Derived,
    /// Entity reference (#123)
    EntityRef(EntityId),
    /// Boolean value
    Bool(bool),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// String value, STEP escapes already decoded
    String(String),
    /// Enumeration value (.VALUE.)
    Enum(String),
    /// List of values
    List(Vec<AttributeValue>),
    /// Typed value like IFCLABEL('text')
    TypedValue(String, Vec<AttributeValue>),
}

impl AttributeValue {
    /// Try to get as entity reference
    pub fn as_entity_ref(&self) -> Option<EntityId> {
        match self {
            AttributeValue::EntityRef(id) => Some(*id),
            _ => None,
        }
    }

    /// Try to get as string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            AttributeValue::TypedValue(_, args) if !args.is_empty() => args[0].as_string(),
            _ => None,
        }
    }

    /// Try to get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Integer(i) => Some(*i as f64),
            AttributeValue::TypedValue(_, args) if !args.is_empty() => args[0].as_float(),
            _ => None,
        }
    }

    /// Try to get as integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(i) => Some(*i),
            AttributeValue::TypedValue(_, args) if !args.is_empty() => args[0].as_integer(),
            _ => None,
        }
    }

    /// Try to get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            AttributeValue::Enum(s) => match s.to_uppercase().as_str() {
                "TRUE" | "T" => Some(true),
                "FALSE" | "F" => Some(false),
                _ => None,
            },
            AttributeValue::TypedValue(_, args) if !args.is_empty() => args[0].as_bool(),
            _ => None,
        }
    }

    /// Try to get as enum string
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            AttributeValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as list
    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::List(list) => Some(list),
            _ => None,
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }
}

/// Decoded IFC entity
///
/// Represents a fully decoded IFC entity with its ID, type, and attribute values.
#[derive(Clone, Debug)]
pub struct DecodedEntity {
    /// Entity ID
    pub id: EntityId,
    /// Entity type
    pub ifc_type: IfcType,
    /// Attribute values in order
    pub attributes: Vec<AttributeValue>,
}

impl DecodedEntity {
    /// Get attribute at index
    pub fn get(&self, index: usize) -> Option<&AttributeValue> {
        self.attributes.get(index)
    }

    /// Get entity reference at index
    pub fn get_ref(&self, index: usize) -> Option<EntityId> {
        self.get(index).and_then(|v| v.as_entity_ref())
    }

    /// Get string at index
    pub fn get_string(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(|v| v.as_string())
    }

    /// Get float at index
    pub fn get_float(&self, index: usize) -> Option<f64> {
        self.get(index).and_then(|v| v.as_float())
    }

    /// Get list at index
    pub fn get_list(&self, index: usize) -> Option<&[AttributeValue]> {
        self.get(index).and_then(|v| v.as_list())
    }

    /// Get boolean at index
    pub fn get_bool(&self, index: usize) -> Option<bool> {
        self.get(index).and_then(|v| v.as_bool())
    }

    /// Get enum string at index
    pub fn get_enum(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(|v| v.as_enum())
    }

    /// Get list of entity references at index
    pub fn get_refs(&self, index: usize) -> Option<Vec<EntityId>> {
        self.get_list(index)
            .map(|list| list.iter().filter_map(|v| v.as_entity_ref()).collect())
    }

    /// Non-empty string at index
    pub fn get_label(&self, index: usize) -> Option<String> {
        self.get_string(index)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// Metadata extracted from the STEP header
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// IFC schema version (e.g., "IFC2X3", "IFC4", "IFC4X3")
    pub schema_version: String,
    /// Originating system (CAD application)
    pub originating_system: Option<String>,
    /// Preprocessor version
    pub preprocessor_version: Option<String>,
    /// File name from header
    pub file_name: Option<String>,
    /// Author
    pub author: Option<String>,
    /// Organization
    pub organization: Option<String>,
    /// Timestamp
    pub timestamp: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keyword_and_schema_spelling() {
        assert_eq!(IfcType::parse("IFCWALL"), IfcType::IfcWall);
        assert_eq!(IfcType::parse("IfcWallStandardCase"), IfcType::IfcWallStandardCase);
        assert_eq!(IfcType::IfcSIUnit.name(), "IfcSIUnit");
        assert_eq!(IfcType::IfcBuildingStorey.to_string(), "IfcBuildingStorey");
    }

    #[test]
    fn test_unknown_keeps_keyword() {
        let ty = IfcType::parse("IFCWALLTYPE");
        assert_eq!(ty, IfcType::Unknown("IFCWALLTYPE".to_string()));
        assert_eq!(ty.name(), "IFCWALLTYPE");
        assert_eq!(ty.group(), "unknown");
    }

    #[test]
    fn test_subtypes() {
        assert!(IfcType::IfcWallStandardCase.is_a(&IfcType::IfcWall));
        assert!(IfcType::IfcWall.is_a(&IfcType::IfcWall));
        assert!(!IfcType::IfcWall.is_a(&IfcType::IfcWallStandardCase));
        assert!(!IfcType::IfcBeam.is_a(&IfcType::IfcColumn));
        assert!(IfcType::IfcBuildingStorey.is_spatial());
    }

    #[test]
    fn test_typed_value_accessors() {
        let value = AttributeValue::TypedValue(
            "IFCLENGTHMEASURE".to_string(),
            vec![AttributeValue::Float(2.5)],
        );
        assert_eq!(value.as_float(), Some(2.5));
        assert_eq!(AttributeValue::Enum("T".into()).as_bool(), Some(true));
    }

    #[test]
    fn test_label_skips_blank() {
        let entity = DecodedEntity {
            id: EntityId(1),
            ifc_type: IfcType::IfcWall,
            attributes: vec![
                AttributeValue::String("  ".into()),
                AttributeValue::String(" Wall-01 ".into()),
            ],
        };
        assert_eq!(entity.get_label(0), None);
        assert_eq!(entity.get_label(1).as_deref(), Some("Wall-01"));
    }
}
