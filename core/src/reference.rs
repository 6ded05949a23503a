use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Symbolic pointer to another object in the dump, e.g.
/// `{"ObjectName": "BlueprintGeneratedClass'BP_Ammo_9mm_C'", "ObjectPath": "Vein/Content/Vein/Items/Ammo/BP_Ammo_9mm.0"}`.
///
/// Two references are the same reference when they point at the same path;
/// the object name only serves as a kind hint and graph key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectReference {
    #[serde(rename = "ObjectName")]
    pub object_name: String,
    #[serde(rename = "ObjectPath", default)]
    pub object_path: String,
}

impl ObjectReference {
    pub fn new(object_name: impl Into<String>, object_path: impl Into<String>) -> Self {
        Self {
            object_name: object_name.into(),
            object_path: object_path.into(),
        }
    }

    /// `Kind` part of `Kind'Name'`.
    pub fn kind_hint(&self) -> Option<&str> {
        split_object_name(&self.object_name).map(|(kind, _)| kind)
    }

    /// `Name` part of `Kind'Name'`, or the whole object name when it is unquoted.
    pub fn name(&self) -> &str {
        split_object_name(&self.object_name)
            .map(|(_, name)| name)
            .unwrap_or(&self.object_name)
    }
}

impl PartialEq for ObjectReference {
    fn eq(&self, other: &Self) -> bool {
        self.object_path == other.object_path
    }
}

impl Eq for ObjectReference {}

impl Hash for ObjectReference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.object_path.hash(state);
    }
}

fn split_object_name(object_name: &str) -> Option<(&str, &str)> {
    let (kind, rest) = object_name.split_once('\'')?;
    let name = rest.strip_suffix('\'')?;
    Some((kind, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_reference_parts() {
        let reference = ObjectReference::new(
            "BlueprintGeneratedClass'BP_Ammo_9mm_C'",
            "Vein/Content/Vein/Items/Ammo/BP_Ammo_9mm.0",
        );
        assert_eq!(reference.kind_hint(), Some("BlueprintGeneratedClass"));
        assert_eq!(reference.name(), "BP_Ammo_9mm_C");

        let bare = ObjectReference::new("None", "");
        assert_eq!(bare.kind_hint(), None);
        assert_eq!(bare.name(), "None");
    }

    #[test]
    fn test_reference_identity_is_the_path() {
        let a = ObjectReference::new("ItemType'IT_Bullet'", "Vein/Content/Vein/ItemTypes/IT_Bullet.0");
        let b = ObjectReference::new("IT_Bullet", "Vein/Content/Vein/ItemTypes/IT_Bullet.0");
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(!set.insert(b));
    }

    #[test]
    fn test_reference_deserializes_dump_shape() {
        let reference: ObjectReference = serde_json::from_str(
            r#"{"ObjectName": "Tool'T_Screwdriver'", "ObjectPath": "Vein/Content/Vein/Tools/T_Screwdriver.0"}"#,
        )
        .unwrap();
        assert_eq!(reference.name(), "T_Screwdriver");
    }
}
