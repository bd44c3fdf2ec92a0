use std::cmp::Ordering;

use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{plan::Plan, prelude::*, prices::PriceTable, quantity::Cost, usage::Usage};

const DAYS_PER_YEAR: f64 = 365.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub name: String,
    pub is_custom: bool,

    /// Period total, bonus taken off.
    pub cost: Cost,

    /// One-off bonus already included in `cost`.
    pub bonus: Cost,
}

/// Plans ordered from cheapest to most expensive.
#[derive(Debug)]
pub struct Ranking {
    entries: Vec<Entry>,
    covered_days: f64,
}

impl Ranking {
    /// Sorts by cost. Equal costs keep their original order.
    #[must_use]
    pub fn new(mut entries: Vec<Entry>, covered_days: f64) -> Self {
        entries.sort_by(|lhs, rhs| lhs.cost.partial_cmp(&rhs.cost).unwrap_or(Ordering::Equal));
        Self { entries, covered_days }
    }

    /// Price every plan in the table. The first failure aborts the whole ranking.
    pub fn try_compute(prices: &PriceTable, usage: &Usage) -> Result<Self, Error> {
        let entries = prices
            .iter()
            .map(|row| -> Result<Entry, Error> {
                let plan = Plan::try_new(row)?;
                let bill = plan.bill(usage)?;
                let cost = bill.total();
                debug!(plan = plan.name(), strategy = ?plan.strategy(), %cost, "priced");
                Ok(Entry {
                    name: plan.name().to_string(),
                    is_custom: plan.is_custom(),
                    cost,
                    bonus: bill.bonus,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(entries, usage.covered_days()))
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub const fn covered_days(&self) -> f64 {
        self.covered_days
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Scale the charges over the covered period to a full year, then take the bonus off once.
    #[must_use]
    pub fn annualise(&self, entry: &Entry) -> Cost {
        (entry.cost + entry.bonus) * (DAYS_PER_YEAR / self.covered_days) - entry.bonus
    }

    /// Ranked table, with a difference column when `baseline` is given.
    #[must_use]
    pub fn table(&self, baseline: Option<&Entry>) -> Table {
        let mut header = vec![
            Cell::new("#"),
            Cell::new("Plan"),
            Cell::new("Cost").set_alignment(CellAlignment::Right),
            Cell::new("Per year").set_alignment(CellAlignment::Right),
        ];
        if let Some(baseline) = baseline {
            header.push(
                Cell::new(format!("vs {}", baseline.name)).set_alignment(CellAlignment::Right),
            );
        }

        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL_CONDENSED)
            .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
            .set_header(header);

        for (rank, entry) in (1_usize..).zip(&self.entries) {
            let name = if entry.is_custom { format!("{}*", entry.name) } else { entry.name.clone() };
            let mut name = Cell::new(name);
            if rank == 1 {
                name = name.fg(Color::Green).add_attribute(Attribute::Bold);
            }
            if baseline.is_some_and(|baseline| baseline.name == entry.name) {
                name = name.add_attribute(Attribute::Underlined);
            }

            let mut row = vec![
                Cell::new(rank).add_attribute(Attribute::Dim),
                name,
                Cell::new(entry.cost).set_alignment(CellAlignment::Right),
                Cell::new(self.annualise(entry)).set_alignment(CellAlignment::Right),
            ];
            if let Some(baseline) = baseline {
                let difference = entry.cost - baseline.cost;
                row.push(Cell::new(difference).set_alignment(CellAlignment::Right).fg(
                    if difference < Cost::ZERO {
                        Color::Green
                    } else if difference > Cost::ZERO {
                        Color::Red
                    } else {
                        Color::Reset
                    },
                ));
            }
            table.add_row(row);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use std::{io::Cursor, path::Path};

    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::usage::tests::{day_row, parse};

    fn entry(name: &str, cost: f64) -> Entry {
        Entry { name: name.to_string(), is_custom: false, cost: Cost(cost), bonus: Cost::ZERO }
    }

    #[test]
    fn ties_keep_table_order() {
        let ranking = Ranking::new(
            vec![entry("C", 500.0), entry("A", 300.0), entry("B", 300.0), entry("D", 100.0)],
            1.0,
        );
        let names: Vec<_> = ranking.entries().iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, ["D", "A", "B", "C"]);
    }

    #[test]
    fn zero_costs_of_either_sign_tie() {
        let ranking = Ranking::new(vec![entry("A", 0.0), entry("B", -0.0), entry("C", -1.0)], 1.0);
        let names: Vec<_> = ranking.entries().iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, ["C", "A", "B"]);
    }

    #[test]
    fn annualise_scales_to_a_year() {
        let ranking = Ranking::new(vec![], 73.0);
        assert_abs_diff_eq!(ranking.annualise(&entry("Flat", 1000.0)).cents(), 5000.0);
    }

    #[test]
    fn annualise_takes_bonus_off_once() -> Result {
        // 30 days at 1 kWh every half hour.
        let body: String = (1..=30).map(|day| day_row(&format!("{day:02}/04/2024"), 1.0)).collect();
        let usage = parse(&body)?;
        let prices = PriceTable::from_reader(
            Cursor::new("name,variable,fixed,bonus\nFlatBonus,20,100,5000\n"),
            Path::new("prices.csv"),
        )?;
        let ranking = Ranking::try_compute(&prices, &usage)?;
        let entry = ranking.find("FlatBonus").context("missing plan")?;

        let charges = 30.0 * 1060.0;
        assert_abs_diff_eq!(entry.cost.cents(), charges - 5000.0);
        assert_abs_diff_eq!(entry.bonus.cents(), 5000.0);
        assert_abs_diff_eq!(
            ranking.annualise(entry).cents(),
            charges * 365.0 / 30.0 - 5000.0,
            epsilon = 1e-6
        );
        Ok(())
    }

    #[test]
    fn computes_every_plan() -> Result {
        let usage = parse(&day_row("01/03/2024", 1.0))?;
        let prices = PriceTable::from_reader(
            Cursor::new(
                "name,variable,fixed,surcharge,bonus\n\
                 FlatSurcharge,20,100,10,\n\
                 Flat,20,100,,\n\
                 FlatBonus,20,100,,50\n",
            ),
            Path::new("prices.csv"),
        )?;
        let ranking = Ranking::try_compute(&prices, &usage)?;

        let names: Vec<_> = ranking.entries().iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, ["FlatBonus", "Flat", "FlatSurcharge"]);
        assert_abs_diff_eq!(ranking.entries()[0].cost.cents(), 1010.0);
        assert_abs_diff_eq!(ranking.entries()[2].cost.cents(), 1166.0, epsilon = 1e-9);

        let flat = ranking.find("Flat").context("missing plan")?;
        let table = ranking.table(Some(flat)).to_string();
        assert!(table.contains("vs Flat"));
        assert!(table.contains("$10.60"));
        assert!(table.contains("-$0.50"));
        Ok(())
    }

    #[test]
    fn any_failing_plan_fails_the_ranking() -> Result {
        let usage = parse(&day_row("01/03/2024", 1.0))?;
        let prices = PriceTable::from_reader(
            Cursor::new("name,variable,fixed\nFlat,20,100\nBroken,20,\n"),
            Path::new("prices.csv"),
        )?;
        let result = Ranking::try_compute(&prices, &usage);
        assert!(matches!(result, Err(Error::MissingField { ref plan, .. }) if plan == "Broken"));
        Ok(())
    }

    #[test]
    fn marks_custom_plans() {
        let mut custom = entry("GenesisEV", 900.0);
        custom.is_custom = true;
        let table = Ranking::new(vec![custom, entry("Flat", 1000.0)], 1.0).table(None).to_string();
        assert!(table.contains("GenesisEV*"));
        assert!(!table.contains("Flat*"));
    }
}
