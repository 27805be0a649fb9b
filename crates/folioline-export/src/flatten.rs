//! Nested record → flat row, driven by a column table

use serde_json::Value;

use crate::entity::Column;

/// Ordered `(column, cell)` pairs for one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatRow {
    cells: Vec<(String, String)>,
}

impl FlatRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a cell, or overwrite it if the column already exists
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(n, _)| *n == name) {
            Some(cell) => cell.1 = value,
            None => self.cells.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Walk a dotted path through nested objects
pub fn lookup<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(record, |node, key| node.get(key))
}

/// Cell text: strings as-is, scalars as JSON text, structures as compact
/// JSON, null and missing as empty.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(v @ (Value::Array(_) | Value::Object(_))) => v.to_string(),
    }
}

/// Flatten one record to exactly `columns`, in table order.
pub fn flatten(record: &Value, columns: &[Column]) -> FlatRow {
    let mut row = FlatRow::new();
    for column in columns {
        row.set(column.name, cell_text(lookup(record, column.path)));
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use serde_json::json;

    #[test]
    fn user_without_personal_or_metadata() {
        let user = json!({"id": "u1", "username": "jdoe", "active": true});
        let row = flatten(&user, Entity::Users.columns());

        assert_eq!(row.len(), Entity::Users.columns().len());
        assert_eq!(row.get("id"), Some("u1"));
        assert_eq!(row.get("active"), Some("true"));
        assert_eq!(row.get("personal.lastName"), Some(""));
        assert_eq!(row.get("metadata.createdDate"), Some(""));
    }

    #[test]
    fn nested_paths_resolve() {
        let user = json!({
            "id": "u1",
            "personal": {"lastName": "Núñez", "firstName": "Ana"},
            "metadata": {"createdByUserId": "admin"}
        });
        let row = flatten(&user, Entity::Users.columns());
        assert_eq!(row.get("personal.lastName"), Some("Núñez"));
        assert_eq!(row.get("metadata.createdByUserId"), Some("admin"));
    }

    #[test]
    fn structures_become_compact_json() {
        let sp = json!({
            "id": "sp1",
            "holdShelfExpiryPeriod": {"duration": 3, "intervalId": "Days"},
            "staffSlips": [{"id": "s1", "printByDefault": true}],
            "shelvingLagTime": 10
        });
        let row = flatten(&sp, Entity::ServicePoints.columns());
        assert_eq!(
            row.get("holdShelfExpiryPeriod"),
            Some(r#"{"duration":3,"intervalId":"Days"}"#)
        );
        assert_eq!(
            row.get("staffSlips"),
            Some(r#"[{"id":"s1","printByDefault":true}]"#)
        );
        assert_eq!(row.get("shelvingLagTime"), Some("10"));
        assert_eq!(row.get("description"), Some(""));
    }

    #[test]
    fn path_through_scalar_is_missing() {
        let record = json!({"personal": "not an object"});
        assert_eq!(lookup(&record, "personal.lastName"), None);
        assert_eq!(cell_text(lookup(&record, "personal.lastName")), "");
    }

    #[test]
    fn flatten_is_stable() {
        let user = json!({"id": "u1", "personal": {"email": "a@b.c"}});
        let once = flatten(&user, Entity::Users.columns());
        let twice = flatten(&user, Entity::Users.columns());
        assert_eq!(once, twice);
        let names: Vec<&str> = once.names().collect();
        let expected: Vec<&str> = Entity::Users.columns().iter().map(|c| c.name).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn set_overwrites_existing_cell() {
        let mut row = FlatRow::new();
        row.set("a", "1");
        row.set("b", "2");
        row.set("a", "3");
        assert_eq!(row.get("a"), Some("3"));
        assert_eq!(row.len(), 2);
    }
}
