//! Sparse partial-update command builder.
//!
//! A patch is a list of optional fields: `Some(v)` means "set to v", `None` means
//! "do not touch". The builder turns it into a typed, ordered list of
//! `(column, value)` assignments and a predicate whose *last* condition is always
//! the caller's ownership key.
//!
//! Values never end up inside the SQL text. `to_sql()` only renders column names
//! (compile-time `&'static str`) and `$n` placeholders; `arguments()` yields the
//! values in placeholder order for parameter binding.
use std::fmt::Write as _;

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum PatchValue {
    Text(String),
    Int(i32),
    BigInt(i64),
    Uuid(Uuid),
}

impl PatchValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PatchValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<String> for PatchValue {
    fn from(v: String) -> Self {
        PatchValue::Text(v)
    }
}

impl From<&str> for PatchValue {
    fn from(v: &str) -> Self {
        PatchValue::Text(v.to_string())
    }
}

impl From<i32> for PatchValue {
    fn from(v: i32) -> Self {
        PatchValue::Int(v)
    }
}

impl From<i64> for PatchValue {
    fn from(v: i64) -> Self {
        PatchValue::BigInt(v)
    }
}

impl From<Uuid> for PatchValue {
    fn from(v: Uuid) -> Self {
        PatchValue::Uuid(v)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("patch does not set any field")]
    Empty,
}

#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: &'static str,
    assignments: Vec<(&'static str, PatchValue)>,
    filters: Vec<(&'static str, PatchValue)>,
}

impl UpdateBuilder {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            assignments: Vec::new(),
            filters: Vec::new(),
        }
    }

    /// Include `column = value` only when the caller supplied the field.
    pub fn set<T: Into<PatchValue>>(mut self, column: &'static str, value: Option<T>) -> Self {
        if let Some(v) = value {
            self.assignments.push((column, v.into()));
        }
        self
    }

    /// Narrow the target row (e.g. `menu_id`). Evaluated before the ownership key.
    pub fn filter<T: Into<PatchValue>>(mut self, column: &'static str, value: T) -> Self {
        self.filters.push((column, value.into()));
        self
    }

    /// Finish with the ownership constraint. Fails if no field was supplied.
    pub fn owned_by(
        self,
        owner_column: &'static str,
        owner: Uuid,
    ) -> Result<UpdateCommand, PatchError> {
        if self.assignments.is_empty() {
            return Err(PatchError::Empty);
        }

        Ok(UpdateCommand {
            table: self.table,
            assignments: self.assignments,
            filters: self.filters,
            owner: (owner_column, PatchValue::Uuid(owner)),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateCommand {
    table: &'static str,
    assignments: Vec<(&'static str, PatchValue)>,
    filters: Vec<(&'static str, PatchValue)>,
    owner: (&'static str, PatchValue),
}

impl UpdateCommand {
    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn assignments(&self) -> &[(&'static str, PatchValue)] {
        &self.assignments
    }

    pub fn filters(&self) -> &[(&'static str, PatchValue)] {
        &self.filters
    }

    pub fn columns(&self) -> Vec<&'static str> {
        self.assignments.iter().map(|(c, _)| *c).collect()
    }

    /// Ownership column and value (always the last predicate).
    pub fn owner(&self) -> (&'static str, &PatchValue) {
        (self.owner.0, &self.owner.1)
    }

    fn predicates(&self) -> impl Iterator<Item = &(&'static str, PatchValue)> {
        self.filters.iter().chain(std::iter::once(&self.owner))
    }

    /// `name = $1, address = $2`
    pub fn set_clause(&self) -> String {
        let mut out = String::new();
        for (i, (column, _)) in self.assignments.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "{} = ${}", column, i + 1);
        }
        out
    }

    /// `menu_id = $3 AND merchant_id = $4`
    pub fn predicate(&self) -> String {
        let offset = self.assignments.len();
        let mut out = String::new();
        for (i, (column, _)) in self.predicates().enumerate() {
            if i > 0 {
                out.push_str(" AND ");
            }
            let _ = write!(out, "{} = ${}", column, offset + i + 1);
        }
        out
    }

    pub fn to_sql(&self) -> String {
        format!(
            "UPDATE {} SET {} WHERE {}",
            self.table,
            self.set_clause(),
            self.predicate()
        )
    }

    /// Values in placeholder order: assignments, row filters, ownership key.
    pub fn arguments(&self) -> impl Iterator<Item = &PatchValue> {
        self.assignments
            .iter()
            .chain(self.predicates())
            .map(|(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_supplied_fields_are_touched() {
        let owner = Uuid::new_v4();
        let cmd = UpdateBuilder::new("merchants")
            .set("name", Some("Foo"))
            .set::<String>("address", None)
            .set::<String>("category", None)
            .set::<String>("description", None)
            .owned_by("user_id", owner)
            .unwrap();

        assert_eq!(cmd.columns(), vec!["name"]);
        assert_eq!(cmd.to_sql(), "UPDATE merchants SET name = $1 WHERE user_id = $2");
        let args: Vec<_> = cmd.arguments().cloned().collect();
        assert_eq!(
            args,
            vec![PatchValue::Text("Foo".into()), PatchValue::Uuid(owner)]
        );
    }

    #[test]
    fn declaration_order_is_preserved() {
        let owner = Uuid::new_v4();
        let cmd = UpdateBuilder::new("menus")
            .set("name", Some("Nasi Goreng"))
            .set("price", Some(25_000i64))
            .set::<String>("category", None)
            .set("description", Some(""))
            .set("stock", Some(0i32))
            .filter("menu_id", Uuid::nil())
            .owned_by("merchant_id", owner)
            .unwrap();

        assert_eq!(
            cmd.to_sql(),
            "UPDATE menus SET name = $1, price = $2, description = $3, stock = $4 \
             WHERE menu_id = $5 AND merchant_id = $6"
        );
        assert_eq!(cmd.arguments().count(), 6);
        assert_eq!(cmd.owner(), ("merchant_id", &PatchValue::Uuid(owner)));
    }

    #[test]
    fn explicit_zero_values_are_kept() {
        let cmd = UpdateBuilder::new("menus")
            .set("stock", Some(0i32))
            .owned_by("merchant_id", Uuid::new_v4())
            .unwrap();
        assert_eq!(cmd.assignments()[0], ("stock", PatchValue::Int(0)));
    }

    #[test]
    fn empty_patch_is_rejected() {
        let err = UpdateBuilder::new("drivers")
            .set::<String>("name", None)
            .owned_by("driver_id", Uuid::new_v4())
            .unwrap_err();
        assert_eq!(err, PatchError::Empty);
    }

    #[test]
    fn values_never_appear_in_sql_text() {
        let hostile = "x'; DROP TABLE users; --";
        let cmd = UpdateBuilder::new("drivers")
            .set("name", Some(hostile))
            .owned_by("driver_id", Uuid::new_v4())
            .unwrap();
        assert!(!cmd.to_sql().contains("DROP"));
        assert_eq!(cmd.arguments().next().unwrap().as_text(), Some(hostile));
    }

    #[test]
    fn same_input_yields_identical_command() {
        let owner = Uuid::new_v4();
        let build = || {
            UpdateBuilder::new("drivers")
                .set("name", Some("Budi"))
                .set("area", Some("Jakarta"))
                .owned_by("driver_id", owner)
                .unwrap()
        };
        assert_eq!(build(), build());
        assert_eq!(build().to_sql(), build().to_sql());
    }
}
