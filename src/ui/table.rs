use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Table")]
    pub metric: String,
    #[tabled(rename = "Rows")]
    pub value: String,
}

/// Two-column label/value table, used for statistics
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Render report rows; empty input renders as an empty string
pub fn render<T: Tabled>(rows: &[T]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::TeamGoals;

    #[test]
    fn test_empty_builder_renders_nothing() {
        assert_eq!(TableBuilder::new().build(), "");
        assert_eq!(render::<TeamGoals>(&[]), "");
    }

    #[test]
    fn test_render_uses_column_names() {
        let rows = vec![TeamGoals {
            team: "Rockers".to_string(),
            total_goals: 2,
        }];
        let table = render(&rows);
        assert!(table.contains("Team"));
        assert!(table.contains("Goals"));
        assert!(table.contains("Rockers"));
    }
}
