use tabled::{
    Table,
    settings::{
        Alignment, Modify, Style,
        format::Format,
        object::{Columns, Rows},
    },
};

/// Renders boolean columns in words
pub struct FlagFormatter;

impl FlagFormatter {
    pub fn format(value: bool) -> String {
        if value { "yes" } else { "no" }.to_string()
    }
}

/// Table styling shared by every listing
pub struct TableTheme;

impl TableTheme {
    /// Rounded borders, uppercase headers, left aligned cells
    pub fn apply_default(mut table: Table) -> Table {
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Format::content(|s| s.to_uppercase())))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));
        table
    }
}
