//! Object placement resolution
//!
//! Type ids become class names through the configured catalogue, property
//! name hashes through the name catalogue. Neither lookup failing is an
//! error: the numeric id or hex hash stands in and a warning is logged.

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::config::ConversionConfig;
use crate::container::{ObjectContainer, Rect, Region};
use crate::error::Result;
use crate::hash::{placeholder, NameCatalogue};
use crate::property::{PropertyType, PropertyValue};

/// 16.16 fixed point, as scene entities store positions
pub fn to_fixed(v: f32) -> i32 {
    (v as f64 * 65536.0) as i32
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProperty {
    pub hash: u32,
    /// Catalogue name, or `0xXXXXXXXX` for unknown hashes
    pub name: String,
    pub known: bool,
    pub raw: String,
    pub value: PropertyValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedObject {
    pub group_id: u32,
    pub type_id: u32,
    pub class_name: Option<String>,
    pub x: f32,
    pub y: f32,
    pub properties: Vec<ResolvedProperty>,
}

impl ResolvedObject {
    /// Class name, or the numeric type id for unknown types
    pub fn label(&self) -> String {
        self.class_name.clone().unwrap_or_else(|| self.type_id.to_string())
    }
}

/// A rectangle batch with its rectangles
#[derive(Debug, Clone, PartialEq)]
pub struct RectGroup {
    pub name: String,
    pub flags: u32,
    pub rects: Vec<Rect>,
}

pub fn resolve_objects(
    objects: &ObjectContainer,
    config: &ConversionConfig,
    names: &NameCatalogue,
) -> Result<Vec<ResolvedObject>> {
    let mut resolved = Vec::with_capacity(objects.objects.len());
    let mut unknown_hashes = 0usize;

    for record in &objects.objects {
        let type_id = record.type_id();
        let class_name = config.object_name(type_id).map(str::to_string);
        if class_name.is_none() {
            warn!(type_id, group_id = record.group_id, "unknown object type");
        }

        if let Some(declared) = objects.declared_property_count(type_id) {
            if declared != record.property_count {
                warn!(type_id, declared, actual = record.property_count, "property count differs from type table");
            }
        }

        let mut properties = Vec::with_capacity(record.property_count as usize);
        for value in objects.properties_of(record) {
            let raw = objects.strings.get(value.string_offset)?;
            let known = names.lookup(value.name_hash);
            if known.is_none() {
                unknown_hashes += 1;
                debug!(hash = %placeholder(value.name_hash), "unknown property name");
            }
            properties.push(ResolvedProperty {
                hash: value.name_hash,
                name: names.resolve(value.name_hash),
                known: known.is_some(),
                value: PropertyValue::infer(&raw),
                raw,
            });
        }

        resolved.push(ResolvedObject {
            group_id: record.group_id,
            type_id,
            class_name,
            x: record.x,
            y: record.y,
            properties,
        });
    }

    if unknown_hashes > 0 {
        warn!(count = unknown_hashes, "property names not in catalogue, kept as hashes");
    }
    Ok(resolved)
}

pub fn resolve_rect_groups(objects: &ObjectContainer, names: &NameCatalogue) -> Vec<RectGroup> {
    objects
        .rect_batches
        .iter()
        .filter_map(|batch| {
            let Some(rects) = objects.batch_rects(batch) else {
                warn!(first = batch.first, count = batch.count, "rectangle batch outside the rectangle table");
                return None;
            };
            Some(RectGroup { name: names.resolve(batch.name_hash), flags: batch.flags, rects: rects.to_vec() })
        })
        .collect()
}

/// Region name, falling back to its hash
pub fn region_name(region: &Region, names: &NameCatalogue) -> String {
    if region.name.is_empty() {
        names.resolve(region.name_hash)
    } else {
        region.name.clone()
    }
}

/// Per-class property columns: one type per property name, in first-seen order.
/// A name seen with different types across the class becomes a string.
pub fn class_schema<'a>(objects: impl IntoIterator<Item = &'a ResolvedObject>) -> IndexMap<String, PropertyType> {
    let mut schema: IndexMap<String, PropertyType> = IndexMap::new();
    for object in objects {
        for property in &object.properties {
            let ty = property.value.property_type();
            match schema.get_mut(&property.name) {
                Some(existing) if *existing != ty => *existing = PropertyType::String,
                Some(_) => {}
                None => {
                    schema.insert(property.name.clone(), ty);
                }
            }
        }
    }
    schema
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(class: &str, props: &[(&str, PropertyValue)]) -> ResolvedObject {
        ResolvedObject {
            group_id: 1,
            type_id: 37,
            class_name: Some(class.to_string()),
            x: 0.0,
            y: 0.0,
            properties: props
                .iter()
                .map(|(name, value)| ResolvedProperty {
                    hash: 0,
                    name: name.to_string(),
                    known: true,
                    raw: value.to_string(),
                    value: value.clone(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_fixed_point() {
        assert_eq!(to_fixed(1.0), 0x10000);
        assert_eq!(to_fixed(-0.5), -0x8000);
        assert_eq!(to_fixed(90.25), 0x5A_4000);
    }

    #[test]
    fn test_label_falls_back_to_id() {
        let mut o = object("Beeto", &[]);
        assert_eq!(o.label(), "Beeto");
        o.class_name = None;
        assert_eq!(o.label(), "37");
    }

    #[test]
    fn test_class_schema_conflicts_become_strings() {
        let objects = [
            object("Beeto", &[("SPEED", PropertyValue::Int32(2)), ("FLIP", PropertyValue::Bool(true))]),
            object("Beeto", &[("SPEED", PropertyValue::String("fast".into())), ("RANGE", PropertyValue::Int32(4))]),
        ];
        let schema = class_schema(&objects);
        assert_eq!(schema.len(), 3);
        assert_eq!(schema["SPEED"], PropertyType::String);
        assert_eq!(schema["FLIP"], PropertyType::Bool);
        assert_eq!(schema.get_index(2).map(|(k, _)| k.as_str()), Some("RANGE"));
    }
}
