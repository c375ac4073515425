use rusqlite::types::Value;

/// One column condition. Column names are compile-time constants, never
/// caller input; values are always bound as parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Case-sensitive substring match.
    Contains {
        column: &'static str,
        needle: String,
    },
    Equals {
        column: &'static str,
        value: Value,
    },
    /// Inclusive lower bound.
    AtLeast { column: &'static str, bound: i64 },
    /// Inclusive upper bound.
    AtMost { column: &'static str, bound: i64 },
}

/// Conjunction of conditions. An empty predicate matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    conditions: Vec<Condition>,
}

impl Predicate {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn contains(mut self, column: &'static str, needle: impl Into<String>) -> Self {
        self.conditions.push(Condition::Contains {
            column,
            needle: needle.into(),
        });
        self
    }

    pub fn equals(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Equals {
            column,
            value: value.into(),
        });
        self
    }

    pub fn at_least(mut self, column: &'static str, bound: i64) -> Self {
        self.conditions.push(Condition::AtLeast { column, bound });
        self
    }

    pub fn at_most(mut self, column: &'static str, bound: i64) -> Self {
        self.conditions.push(Condition::AtMost { column, bound });
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Render as a `WHERE` clause (empty when unconstrained) plus bind values.
    pub(crate) fn to_sql(&self) -> (String, Vec<Value>) {
        if self.conditions.is_empty() {
            return (String::new(), Vec::new());
        }

        let mut clauses = Vec::with_capacity(self.conditions.len());
        let mut values = Vec::with_capacity(self.conditions.len());

        for condition in &self.conditions {
            let position = values.len() + 1;
            match condition {
                // instr() is case-sensitive and needs no LIKE escaping.
                Condition::Contains { column, needle } => {
                    clauses.push(format!("instr({column}, ?{position}) > 0"));
                    values.push(Value::Text(needle.clone()));
                }
                Condition::Equals { column, value } => {
                    clauses.push(format!("{column} = ?{position}"));
                    values.push(value.clone());
                }
                Condition::AtLeast { column, bound } => {
                    clauses.push(format!("{column} >= ?{position}"));
                    values.push(Value::Integer(*bound));
                }
                Condition::AtMost { column, bound } => {
                    clauses.push(format!("{column} <= ?{position}"));
                    values.push(Value::Integer(*bound));
                }
            }
        }

        (format!(" WHERE {}", clauses.join(" AND ")), values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_predicate_renders_no_clause() {
        let (sql, values) = Predicate::all().to_sql();
        assert!(sql.is_empty());
        assert!(values.is_empty());
    }

    #[test]
    fn conditions_are_joined_with_and_in_order() {
        let predicate = Predicate::all()
            .contains("title", "Harry")
            .equals("language", "en".to_string())
            .at_least("pages", 100)
            .at_most("pages", 300);

        let (sql, values) = predicate.to_sql();
        assert_eq!(
            sql,
            " WHERE instr(title, ?1) > 0 AND language = ?2 AND pages >= ?3 AND pages <= ?4"
        );
        assert_eq!(
            values,
            vec![
                Value::Text("Harry".to_string()),
                Value::Text("en".to_string()),
                Value::Integer(100),
                Value::Integer(300),
            ]
        );
    }
}
