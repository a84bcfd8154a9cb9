use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

/// A typed value attached to a game object; never interpreted by the compiler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Byte(u8),
    Short(i16),
    Int(i32),
    Float(f32),
    Angle(f64),
    Text(String),
}

type ObjectProperties = IndexMap<String, PropertyValue>;

/// Out-of-band game data keyed by object type name, object index and property name, kept in
/// insertion order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GameObjectProperties {
    objects: IndexMap<String, IndexMap<u32, ObjectProperties>>,
}

impl GameObjectProperties {
    pub fn set(&mut self, object_type: &str, index: u32, property: &str, value: PropertyValue) {
        let previous = self
            .objects
            .entry(object_type.to_owned())
            .or_insert_with(IndexMap::new)
            .entry(index)
            .or_insert_with(IndexMap::new)
            .insert(property.to_owned(), value);
        if let Some(previous) = previous {
            debug!(
                "Overwrote {}[{}].{} (was {:?}).",
                object_type, index, property, previous
            );
        }
    }

    pub fn get(&self, object_type: &str, index: u32, property: &str) -> Option<&PropertyValue> {
        self.objects
            .get(object_type)
            .and_then(|objects| objects.get(&index))
            .and_then(|properties| properties.get(property))
    }

    pub fn object(&self, object_type: &str, index: u32) -> Option<&ObjectProperties> {
        self.objects
            .get(object_type)
            .and_then(|objects| objects.get(&index))
    }

    pub fn object_types(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(|name| &name[..])
    }

    pub fn len(&self) -> usize {
        self.objects
            .values()
            .flat_map(|objects| objects.values())
            .map(|properties| properties.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod test {
    use super::{GameObjectProperties, PropertyValue};

    #[test]
    fn test_properties_keep_order_and_overwrite() {
        let mut properties = GameObjectProperties::default();
        properties.set("thing", 3, "type", PropertyValue::Int(3004));
        properties.set("sector", 1, "special", PropertyValue::Short(9));
        properties.set("thing", 3, "angle", PropertyValue::Angle(90.0));
        properties.set("thing", 3, "type", PropertyValue::Int(9));

        assert_eq!(properties.len(), 3);
        assert_eq!(
            properties.get("thing", 3, "type"),
            Some(&PropertyValue::Int(9))
        );
        assert_eq!(properties.get("thing", 4, "type"), None);
        assert_eq!(
            properties.object_types().collect::<Vec<_>>(),
            vec!["thing", "sector"]
        );
        let thing = properties.object("thing", 3).expect("test: missing thing");
        assert_eq!(thing.keys().collect::<Vec<_>>(), vec!["type", "angle"]);
    }
}
