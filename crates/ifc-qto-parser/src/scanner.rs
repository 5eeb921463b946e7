// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fast entity scanner using SIMD-accelerated byte searching
//!
//! Finds entity boundaries in the DATA section without decoding attributes.

use crate::tokenizer::parse_record;
use ifc_qto_model::{AttributeValue, EntityId, IfcType, ModelMetadata};
use memchr::memchr;
use rustc_hash::FxHashMap;

/// Entity index mapping ID to byte offsets
pub type EntityIndex = FxHashMap<u32, (usize, usize)>;

/// Entity type to IDs in file order
pub type TypeIndex = FxHashMap<IfcType, Vec<EntityId>>;

/// Fast entity scanner for STEP files
pub struct EntityScanner<'a> {
    content: &'a str,
    pos: usize,
}

impl<'a> EntityScanner<'a> {
    /// Create a scanner positioned after the `DATA;` marker
    pub fn new(content: &'a str) -> Self {
        let pos = content.find("DATA;").map(|p| p + 5).unwrap_or(0);
        Self { content, pos }
    }

    /// Scan to the next entity
    ///
    /// Returns (id, type_name, start_byte, end_byte)
    pub fn next_entity(&mut self) -> Option<(u32, &'a str, usize, usize)> {
        let bytes = self.content.as_bytes();

        while self.pos < bytes.len() {
            let hash_pos = memchr(b'#', &bytes[self.pos..])?;
            self.pos += hash_pos;

            // Definitions start a line or follow the previous terminator;
            // any other '#' is a reference inside attributes
            let is_entity_start = self.pos == 0
                || matches!(bytes[self.pos - 1], b'\n' | b'\r' | b';');

            if !is_entity_start {
                self.pos += 1;
                continue;
            }

            let start = self.pos;
            self.pos += 1;
            let id_start = self.pos;

            while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
                self.pos += 1;
            }

            if self.pos == id_start {
                continue;
            }

            let id: u32 = self.content[id_start..self.pos].parse().ok()?;

            self.skip_blanks();
            if self.pos >= bytes.len() || bytes[self.pos] != b'=' {
                continue;
            }
            self.pos += 1;
            self.skip_blanks();

            let type_start = self.pos;
            while self.pos < bytes.len()
                && (bytes[self.pos].is_ascii_alphanumeric() || bytes[self.pos] == b'_')
            {
                self.pos += 1;
            }

            if self.pos == type_start {
                continue;
            }

            let type_name = &self.content[type_start..self.pos];
            let end = self.find_entity_end()?;

            return Some((id, type_name, start, end));
        }

        None
    }

    fn skip_blanks(&mut self) {
        let bytes = self.content.as_bytes();
        while self.pos < bytes.len() && (bytes[self.pos] == b' ' || bytes[self.pos] == b'\t') {
            self.pos += 1;
        }
    }

    /// Find the terminating semicolon, skipping quoted strings
    fn find_entity_end(&mut self) -> Option<usize> {
        let bytes = self.content.as_bytes();
        let mut in_string = false;

        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'\'' => {
                    if in_string && bytes.get(self.pos + 1) == Some(&b'\'') {
                        self.pos += 2;
                        continue;
                    }
                    in_string = !in_string;
                }
                b';' if !in_string => {
                    self.pos += 1;
                    return Some(self.pos);
                }
                _ => {}
            }
            self.pos += 1;
        }

        None
    }

    /// Build the offset index and the type index in one pass
    pub fn build_index(content: &'a str) -> (EntityIndex, TypeIndex) {
        let mut scanner = Self::new(content);
        let mut index = EntityIndex::default();
        let mut types = TypeIndex::default();

        while let Some((id, type_name, start, end)) = scanner.next_entity() {
            index.insert(id, (start, end));
            types
                .entry(IfcType::parse(type_name))
                .or_default()
                .push(EntityId(id));
        }

        (index, types)
    }
}

/// Parse the header section into model metadata
///
/// Missing or malformed records leave the corresponding fields empty.
pub fn parse_header(content: &str) -> ModelMetadata {
    let mut meta = ModelMetadata::default();

    let header_start = content.find("HEADER;").unwrap_or(0);
    let header_end = content[header_start..]
        .find("ENDSEC;")
        .map(|p| header_start + p)
        .unwrap_or(content.len());
    let header = &content[header_start..header_end];

    if let Some(args) = header_record(header, "FILE_SCHEMA") {
        if let Some(first) = args
            .first()
            .and_then(AttributeValue::as_list)
            .and_then(|schemas| schemas.first())
            .and_then(AttributeValue::as_string)
        {
            meta.schema_version = first.to_string();
        }
    }

    // FILE_NAME(name, time_stamp, author, organization, preprocessor_version,
    //           originating_system, authorization)
    if let Some(args) = header_record(header, "FILE_NAME") {
        let text = |i: usize| {
            args.get(i)
                .and_then(AttributeValue::as_string)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let first_of_list = |i: usize| {
            args.get(i)
                .and_then(AttributeValue::as_list)
                .and_then(|items| items.iter().find_map(AttributeValue::as_string))
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        meta.file_name = text(0);
        meta.timestamp = text(1);
        meta.author = first_of_list(2);
        meta.organization = first_of_list(3);
        meta.preprocessor_version = text(4);
        meta.originating_system = text(5);
    }

    meta
}

fn header_record(header: &str, keyword: &str) -> Option<Vec<AttributeValue>> {
    let at = header.find(keyword)?;
    match parse_record(&header[at..]) {
        Ok((_, args)) => Some(args),
        Err(e) => {
            log::debug!("Skipping header record {}: {}", keyword, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_IFC: &str = r#"ISO-10303-21;
HEADER;
FILE_DESCRIPTION(('ViewDefinition [CoordinationView]'),'2;1');
FILE_NAME('tower.ifc','2024-01-01T00:00:00',('Site Engineer'),('Acme Build'),'Preprocessor','App','');
FILE_SCHEMA(('IFC2X3'));
ENDSEC;
DATA;
#1=IFCPROJECT('guid',$,'Project',$,$,$,$,$,#2);
#2=IFCUNITASSIGNMENT((#3));
#3=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);
#4=IFCWALL('guid',$,'Wall; north',$,$,#5,#6,$);
#5=IFCWALL('guid2',$,'Wall 2',$,$,$,$,$);
ENDSEC;
END-ISO-10303-21;
"#;

    #[test]
    fn test_scanner_finds_entities() {
        let mut scanner = EntityScanner::new(TEST_IFC);
        let mut entities = Vec::new();

        while let Some((id, type_name, _, _)) = scanner.next_entity() {
            entities.push((id, type_name.to_string()));
        }

        assert_eq!(entities.len(), 5);
        assert_eq!(entities[0], (1, "IFCPROJECT".to_string()));
        assert_eq!(entities[3], (4, "IFCWALL".to_string()));
    }

    #[test]
    fn test_semicolon_inside_string() {
        let (index, _) = EntityScanner::build_index(TEST_IFC);
        let (start, end) = index[&4];
        assert!(TEST_IFC[start..end].ends_with("$);"));
    }

    #[test]
    fn test_type_index_keeps_file_order() {
        let (index, types) = EntityScanner::build_index(TEST_IFC);
        assert_eq!(index.len(), 5);
        assert_eq!(types[&IfcType::IfcWall], vec![EntityId(4), EntityId(5)]);
    }

    #[test]
    fn test_parse_header() {
        let meta = parse_header(TEST_IFC);
        assert_eq!(meta.schema_version, "IFC2X3");
        assert_eq!(meta.file_name.as_deref(), Some("tower.ifc"));
        assert_eq!(meta.author.as_deref(), Some("Site Engineer"));
        assert_eq!(meta.organization.as_deref(), Some("Acme Build"));
        assert_eq!(meta.originating_system.as_deref(), Some("App"));
    }
}
