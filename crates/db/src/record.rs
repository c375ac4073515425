use rusqlite::types::Value;
use rusqlite::Row;

/// A row kind persisted by the store.
///
/// `COLUMNS` lists the table columns in the order `values()` produces and
/// `from_row()` reads them; the first column is the primary key.
pub trait Record: Sized {
    /// Table name, also used as the record kind in logs and errors.
    const KIND: &'static str;
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> &str;

    fn values(&self) -> Vec<Value>;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Shape checks run before every write. The message names the offending field.
    fn validate(&self) -> Result<(), String> {
        if self.id().trim().is_empty() {
            return Err("field 'id' must not be empty".to_string());
        }
        Ok(())
    }
}

pub(crate) fn id_column<R: Record>() -> &'static str {
    R::COLUMNS[0]
}

pub(crate) fn select_sql<R: Record>() -> String {
    format!("SELECT {} FROM {}", R::COLUMNS.join(", "), R::KIND)
}

pub(crate) fn upsert_sql<R: Record>() -> String {
    let placeholders: Vec<String> = (1..=R::COLUMNS.len()).map(|n| format!("?{n}")).collect();
    let assignments: Vec<String> = R::COLUMNS[1..]
        .iter()
        .map(|column| format!("{column} = excluded.{column}"))
        .collect();

    let conflict_action = if assignments.is_empty() {
        "DO NOTHING".to_string()
    } else {
        format!("DO UPDATE SET {}", assignments.join(", "))
    };

    format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT({}) {}",
        R::KIND,
        R::COLUMNS.join(", "),
        placeholders.join(", "),
        id_column::<R>(),
        conflict_action
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tag {
        id: String,
        label: String,
    }

    impl Record for Tag {
        const KIND: &'static str = "tags";
        const COLUMNS: &'static [&'static str] = &["id", "label"];

        fn id(&self) -> &str {
            &self.id
        }

        fn values(&self) -> Vec<Value> {
            vec![
                Value::Text(self.id.clone()),
                Value::Text(self.label.clone()),
            ]
        }

        fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
            Ok(Self {
                id: row.get(0)?,
                label: row.get(1)?,
            })
        }
    }

    #[test]
    fn upsert_overwrites_every_non_key_column() {
        assert_eq!(
            upsert_sql::<Tag>(),
            "INSERT INTO tags (id, label) VALUES (?1, ?2) ON CONFLICT(id) DO UPDATE SET label = excluded.label"
        );
    }

    #[test]
    fn select_lists_columns_in_order() {
        assert_eq!(select_sql::<Tag>(), "SELECT id, label FROM tags");
    }

    #[test]
    fn default_validation_rejects_blank_id() {
        let tag = Tag {
            id: "  ".to_string(),
            label: "x".to_string(),
        };
        assert!(tag.validate().is_err());
        let tag = Tag {
            id: "t1".to_string(),
            label: String::new(),
        };
        assert!(tag.validate().is_ok());
    }
}
