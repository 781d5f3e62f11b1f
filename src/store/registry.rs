//! Editing operations on a `FormSchema` while it is being designed.
use super::types::*;
use chrono::Utc;
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Field '{0}' does not exist in this schema")]
    UnknownField(String),
    #[error("Position {index} is out of range for {len} fields")]
    IndexOutOfRange { index: usize, len: usize },
}

impl FormSchema {
    /// Creates an empty schema with a fresh id and creation time.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            fields: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Appends a field and returns the id it was stored under.
    ///
    /// A colliding id gets a numeric suffix (`price`, `price_1`, `price_2`, ...).
    /// The field's `order` is set to its position.
    pub fn add_field(&mut self, mut field: FieldDefinition) -> String {
        let used: HashSet<&str> = self.fields.iter().map(|f| f.id.as_str()).collect();

        let original_id = field.id.clone();
        let mut candidate = original_id.clone();
        let mut counter = 1;
        while used.contains(candidate.as_str()) {
            candidate = format!("{}_{}", original_id, counter);
            counter += 1;
        }
        if candidate != original_id {
            debug!(requested = %original_id, assigned = %candidate, "field id already taken");
        }

        field.id = candidate.clone();
        field.order = self.fields.len() as u32;
        self.fields.push(field);
        candidate
    }

    /// Applies `edit` to the field with the given id. The id itself is not editable.
    pub fn update_field<F>(&mut self, id: &str, edit: F) -> Result<(), SchemaError>
    where
        F: FnOnce(&mut FieldDefinition),
    {
        let field = self
            .fields
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| SchemaError::UnknownField(id.to_string()))?;
        edit(field);
        field.id = id.to_string();
        Ok(())
    }

    /// Replaces the parent list of a field.
    pub fn set_parent_fields(&mut self, id: &str, parents: Vec<String>) -> Result<(), SchemaError> {
        self.update_field(id, |f| f.parent_field_ids = parents)
    }

    /// Removes a field and drops it from every parent list that referenced it.
    pub fn remove_field(&mut self, id: &str) -> Result<FieldDefinition, SchemaError> {
        let index = self
            .fields
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| SchemaError::UnknownField(id.to_string()))?;
        let removed = self.fields.remove(index);

        for field in &mut self.fields {
            field.parent_field_ids.retain(|p| p != id);
        }
        self.renumber();
        Ok(removed)
    }

    /// Moves the field at `from` to position `to`, then renumbers `order`.
    pub fn reorder_fields(&mut self, from: usize, to: usize) -> Result<(), SchemaError> {
        let len = self.fields.len();
        if from >= len {
            return Err(SchemaError::IndexOutOfRange { index: from, len });
        }
        if to >= len {
            return Err(SchemaError::IndexOutOfRange { index: to, len });
        }
        let field = self.fields.remove(from);
        self.fields.insert(to, field);
        self.renumber();
        Ok(())
    }

    /// The copy that gets persisted: same fields, new name, fresh timestamp.
    pub fn frozen_copy(&self, name: impl Into<String>) -> FormSchema {
        FormSchema {
            name: name.into(),
            created_at: Utc::now(),
            ..self.clone()
        }
    }

    fn renumber(&mut self) {
        for (i, field) in self.fields.iter_mut().enumerate() {
            field.order = i as u32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(id: &str) -> FieldDefinition {
        FieldDefinition::new(id, FieldType::Text, id.to_uppercase())
    }

    #[test]
    fn test_add_field_enforces_unique_ids() {
        let mut schema = FormSchema::new("Signup");
        assert_eq!(schema.add_field(text("name")), "name");
        assert_eq!(schema.add_field(text("name")), "name_1");
        assert_eq!(schema.add_field(text("name")), "name_2");

        let orders: Vec<u32> = schema.fields.iter().map(|f| f.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn test_update_field_keeps_id() {
        let mut schema = FormSchema::new("Signup");
        schema.add_field(text("name"));
        schema
            .update_field("name", |f| {
                f.label = "Full name".into();
                f.id = "hijacked".into();
            })
            .unwrap();

        let field = schema.field("name").unwrap();
        assert_eq!(field.label, "Full name");
        assert!(schema.field("hijacked").is_none());

        let err = schema.update_field("missing", |_| {}).unwrap_err();
        assert_eq!(err, SchemaError::UnknownField("missing".into()));
    }

    #[test]
    fn test_remove_field_prunes_parent_references() {
        let mut schema = FormSchema::new("Order");
        schema.add_field(FieldDefinition::new("price", FieldType::Number, "Price"));
        schema.add_field(FieldDefinition::new("qty", FieldType::Number, "Qty"));
        schema.add_field(
            FieldDefinition::new("total", FieldType::Number, "Total").derived(["price", "qty"], "price * qty"),
        );

        schema.remove_field("qty").unwrap();

        let total = schema.field("total").unwrap();
        assert_eq!(total.parent_field_ids, vec!["price".to_string()]);
        assert_eq!(total.order, 1);
    }

    #[test]
    fn test_reorder_renumbers_orders() {
        let mut schema = FormSchema::new("Survey");
        for id in ["a", "b", "c"] {
            schema.add_field(text(id));
        }
        schema.reorder_fields(0, 2).unwrap();

        let ids: Vec<&str> = schema.fields.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
        assert!(schema.fields.iter().enumerate().all(|(i, f)| f.order == i as u32));

        assert_eq!(
            schema.reorder_fields(3, 0),
            Err(SchemaError::IndexOutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    fn test_frozen_copy_renames_and_keeps_fields() {
        let mut schema = FormSchema::new("");
        schema.add_field(text("name"));
        let saved = schema.frozen_copy("Contact");

        assert_eq!(saved.name, "Contact");
        assert_eq!(saved.id, schema.id);
        assert_eq!(saved.fields, schema.fields);
        assert!(saved.created_at >= schema.created_at);
    }
}
