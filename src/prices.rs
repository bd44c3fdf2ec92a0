use std::{
    collections::{BTreeMap, HashSet},
    fs::File,
    io::Read,
    path::Path,
};

use csv::{ReaderBuilder, Trim};

use crate::{prelude::*, quantity::parse_finite};

pub const NAME: &str = "name";

/// Cents per kWh.
pub const VARIABLE: &str = "variable";

/// Cents per day.
pub const FIXED: &str = "fixed";

/// Older spelling of [`FIXED`].
pub const DAILY: &str = "daily";

/// Percent added on top of the subtotal.
pub const SURCHARGE: &str = "surcharge";

/// Cents taken off the total.
pub const BONUS: &str = "bonus";

/// Pricing parameters of one plan.
///
/// Fields are kept as they appear in the table: a missing or empty cell is absent,
/// which is not the same as an explicit zero.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceRow {
    pub name: String,
    fields: BTreeMap<String, f64>,
}

impl PriceRow {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), fields: BTreeMap::new() }
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: f64) -> Self {
        self.fields.insert(field.into(), value);
        self
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<f64> {
        self.fields.get(field).copied()
    }

    pub fn require(&self, field: &'static str) -> Result<f64, Error> {
        self.get(field).ok_or_else(|| Error::MissingField { plan: self.name.clone(), field })
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }
}

#[derive(Debug, Default)]
pub struct PriceTable {
    rows: Vec<PriceRow>,
}

impl PriceTable {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let file = File::open(path).map_err(|source| Error::Open { path: path.into(), source })?;
        Self::from_reader(file, path)
    }

    /// Parse an already opened table. `path` only labels errors.
    pub fn from_reader(reader: impl Read, path: &Path) -> Result<Self, Error> {
        let mut reader = ReaderBuilder::new().has_headers(true).trim(Trim::All).from_reader(reader);
        let headers = reader.headers().map_err(|source| Error::from_csv(path, source))?.clone();
        if !headers.iter().any(|header| header == NAME) {
            return Err(Error::MissingColumn { path: path.into(), column: NAME });
        }

        let mut rows = Vec::new();
        let mut seen = HashSet::new();
        for record in reader.records() {
            let record = record.map_err(|source| Error::from_csv(path, source))?;
            let line = record.position().map_or(0, csv::Position::line);
            let mut cells: BTreeMap<String, String> =
                record.deserialize(Some(&headers)).map_err(|source| Error::from_csv(path, source))?;

            let name = cells.remove(NAME).unwrap_or_default();
            if name.is_empty() {
                return Err(Error::MissingName { path: path.into(), line });
            }
            if !seen.insert(name.clone()) {
                return Err(Error::DuplicatePlan { path: path.into(), line, name });
            }

            let mut row = PriceRow::new(name);
            for (field, value) in cells.into_iter().filter(|(_, value)| !value.is_empty()) {
                let Some(number) = parse_finite(&value) else {
                    return Err(Error::InvalidNumber { path: path.into(), line, field, value });
                };
                row = row.with(field, number);
            }
            rows.push(row);
        }

        Ok(Self { rows })
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PriceRow> {
        self.rows.iter().find(|row| row.name == name)
    }

    /// Like [`PriceTable::get`], but a missing plan is an error.
    pub fn require(&self, name: &str) -> Result<&PriceRow, Error> {
        self.get(name).ok_or_else(|| Error::UnknownPlan(name.to_string()))
    }

    /// Rows in table order.
    pub fn iter(&self) -> impl Iterator<Item = &PriceRow> {
        self.rows.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn parse(body: &str) -> Result<PriceTable, Error> {
        PriceTable::from_reader(Cursor::new(body), Path::new("prices.csv"))
    }

    #[test]
    fn absent_is_not_zero() -> Result {
        let table = parse(
            "name, variable, fixed, surcharge, bonus, offpeak\n\
             Flat, 20, 100, , 0,\n\
             GenesisEV, 30.5, 150, 10, , 12\n",
        )?;
        assert_eq!(table.len(), 2);

        let flat = table.get("Flat").context("missing plan")?;
        assert_eq!(flat.get(VARIABLE), Some(20.0));
        assert_eq!(flat.get(SURCHARGE), None);
        assert_eq!(flat.get(BONUS), Some(0.0));
        assert!(!flat.contains("offpeak"));

        let genesis = table.get("GenesisEV").context("missing plan")?;
        assert_eq!(genesis.get("offpeak"), Some(12.0));
        assert_eq!(genesis.get(BONUS), None);
        Ok(())
    }

    #[test]
    fn keeps_table_order() -> Result {
        let table = parse("name,variable,fixed\nB,1,1\nA,2,2\nC,3,3\n")?;
        let names: Vec<_> = table.iter().map(|row| row.name.as_str()).collect();
        assert_eq!(names, ["B", "A", "C"]);
        Ok(())
    }

    #[test]
    fn require_reports_plan_and_field() {
        let row = PriceRow::new("Flat").with(VARIABLE, 20.0);
        match row.require(FIXED) {
            Err(Error::MissingField { plan, field }) => assert_eq!((plan.as_str(), field), ("Flat", FIXED)),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicate_names() {
        let result = parse("name,variable,fixed\nFlat,1,1\nFlat,2,2\n");
        assert!(matches!(result, Err(Error::DuplicatePlan { line: 3, ref name, .. }) if name == "Flat"));
    }

    #[test]
    fn rejects_non_numeric_value() {
        let result = parse("name,variable,fixed\nFlat,twenty,1\n");
        assert!(matches!(result, Err(Error::InvalidNumber { line: 2, ref field, .. }) if field == VARIABLE));
    }

    #[test]
    fn rejects_non_finite_values() {
        let result = parse("name,variable,fixed\nFlat,NaN,100\n");
        assert!(matches!(result, Err(Error::InvalidNumber { line: 2, ref value, .. }) if value == "NaN"));

        let result = parse("name,variable,fixed\nFlat,20,100\nFlatInf,inf,100\n");
        assert!(matches!(result, Err(Error::InvalidNumber { line: 3, ref field, .. }) if field == VARIABLE));
    }

    #[test]
    fn require_unknown_plan_fails() -> Result {
        let table = parse("name,variable,fixed\nFlat,20,100\n")?;
        assert_eq!(table.require("Flat")?.get(FIXED), Some(100.0));
        assert!(matches!(table.require("Mercury"), Err(Error::UnknownPlan(ref name)) if name == "Mercury"));
        Ok(())
    }

    #[test]
    fn missing_file_fails_to_open() {
        let result = PriceTable::load(Path::new("does/not/exist/prices.csv"));
        assert!(matches!(
            result,
            Err(Error::Open { ref source, .. }) if source.kind() == std::io::ErrorKind::NotFound
        ));
    }

    #[test]
    fn rejects_missing_name_column() {
        assert!(matches!(parse("plan,variable\nFlat,1\n"), Err(Error::MissingColumn { .. })));
    }

    #[test]
    fn rejects_empty_name() {
        assert!(matches!(parse("name,variable\n,1\n"), Err(Error::MissingName { line: 2, .. })));
    }

    #[test]
    fn rejects_ragged_row() {
        let result = parse("name,variable,fixed\nFlat,1\n");
        assert!(matches!(result, Err(Error::FieldCount { line: 2, expected: 3, actual: 2, .. })));
    }
}
