use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};
use powercard_history::{EntityAverages, HourlyBreakdown, Snapshot, Watts};

use crate::{board::PowerEntity, fmt::FormattedPower, states::EntityStates};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

/// Right-aligned power cell: dimmed when missing, green when flowing back.
fn power_cell(power: Option<Watts>) -> Cell {
    let cell = Cell::new(FormattedPower(power)).set_alignment(CellAlignment::Right);
    match power {
        None => cell.add_attribute(Attribute::Dim),
        Some(power) if power < Watts::ZERO => cell.fg(Color::Green),
        Some(_) => cell,
    }
}

pub fn build_board_table(
    entities: &[PowerEntity<'_>],
    states: &EntityStates,
    snapshot: &Snapshot,
) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("Name"),
        Cell::new("Entity"),
        Cell::new("Now").set_alignment(CellAlignment::Right),
        Cell::new("This\nhour").set_alignment(CellAlignment::Right),
        Cell::new("Last\nhour").set_alignment(CellAlignment::Right),
        Cell::new("Today").set_alignment(CellAlignment::Right),
    ]);
    for entity in entities {
        let averages = snapshot.get(entity.entity_id);
        table.add_row(vec![
            Cell::new(&entity.name),
            Cell::new(entity.entity_id).add_attribute(Attribute::Dim),
            power_cell(states.power(entity.entity_id)),
            power_cell(averages.and_then(|averages| averages.current_hour)),
            power_cell(averages.and_then(|averages| averages.last_hour)),
            power_cell(averages.and_then(|averages| averages.daily_average)),
        ]);
    }
    table
}

pub fn build_averages_table(entity_id: &str, averages: &EntityAverages) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Entity", "This hour", "Last hour", "Today"]);
    table.add_row(vec![
        Cell::new(entity_id),
        power_cell(averages.current_hour),
        power_cell(averages.last_hour),
        power_cell(averages.daily_average),
    ]);
    table
}

pub fn build_breakdown_table(breakdown: &HourlyBreakdown) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("Date"),
        Cell::new("Hour").set_alignment(CellAlignment::Right),
        Cell::new("Average").set_alignment(CellAlignment::Right),
    ]);
    for hour in breakdown {
        table.add_row(vec![
            Cell::new(hour.hour_start.as_datetime().format("%b %d")).add_attribute(Attribute::Dim),
            Cell::new(&hour.hour).set_alignment(CellAlignment::Right),
            power_cell(hour.average),
        ]);
    }
    table
}
