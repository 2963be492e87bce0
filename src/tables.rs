use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{core::planner::Plan, quantity::Cost};

#[must_use]
pub fn build_plan_table(plan: &Plan) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table.set_header(vec!["Start", "End", "Days", "Cost", "Utility"]);
    for scored in &plan.periods {
        table.add_row(vec![
            Cell::new(scored.period.start_date().format("%a %Y-%m-%d")),
            Cell::new(scored.period.end_date().format("%a %Y-%m-%d")).add_attribute(Attribute::Dim),
            Cell::new(scored.period.duration()).set_alignment(CellAlignment::Right),
            Cell::new(scored.cost)
                .set_alignment(CellAlignment::Right)
                .fg(if scored.cost == Cost::ZERO { Color::Green } else { Color::Reset }),
            Cell::new(scored.utility).set_alignment(CellAlignment::Right),
        ]);
    }
    let n_days: u32 = plan.periods.iter().map(|scored| scored.period.duration()).sum();
    table.add_row(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(n_days).set_alignment(CellAlignment::Right).add_attribute(Attribute::Bold),
        Cell::new(plan.total_cost()).set_alignment(CellAlignment::Right).add_attribute(Attribute::Bold),
        Cell::new(plan.total_utility())
            .set_alignment(CellAlignment::Right)
            .add_attribute(Attribute::Bold),
    ]);
    table
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        core::{period::HolidayPeriod, planner::ScoredPeriod},
        quantity::Utility,
    };

    #[test]
    fn plan_table_ok() {
        let plan = Plan {
            periods: vec![ScoredPeriod {
                period: HolidayPeriod::new(NaiveDate::from_ymd_opt(2025, 1, 9).unwrap(), 4),
                cost: Cost(2),
                utility: Utility::new(5.5),
            }],
        };
        let table = build_plan_table(&plan);
        assert_eq!(table.row_count(), 2);
        let rendered = table.to_string();
        assert!(rendered.contains("2025-01-09"), "{rendered}");
        assert!(rendered.contains("2025-01-12"), "{rendered}");
        assert!(rendered.contains("5.50"), "{rendered}");
    }
}
