use std::collections::HashMap;

use rgb::RGB8;

use crate::Position;

/// A placed, typed object. The class reference is a weak name lookup so
/// classes can be edited or reordered without touching placed objects.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Object {
    pub position: Position,
    pub name: String,
    pub class_name: String,
    pub fields: HashMap<String, String>,
}

impl Object {
    pub fn new(class_name: impl Into<String>, position: Position) -> Self {
        Object {
            position,
            name: String::new(),
            class_name: class_name.into(),
            fields: HashMap::new(),
        }
    }

    /// Field value, or the empty default when the object doesn't carry it.
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map_or("", String::as_str)
    }
}

/// One field of an object-class schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassField {
    pub name: String,
    pub type_tag: String,
}

impl Default for ClassField {
    fn default() -> Self {
        ClassField {
            name: String::new(),
            type_tag: "U".to_string(),
        }
    }
}

/// An object-class schema: macro identifier, display color and ordered
/// field definitions.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectClass {
    pub name: String,
    pub macro_name: String,
    pub color: RGB8,
    pub fields: Vec<ClassField>,
}

impl ObjectClass {
    pub fn new(name: impl Into<String>) -> Self {
        ObjectClass {
            name: name.into(),
            macro_name: String::new(),
            color: RGB8 { r: 255, g: 255, b: 255 },
            fields: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&ClassField> {
        self.fields.iter().find(|field| field.name == name)
    }
}
