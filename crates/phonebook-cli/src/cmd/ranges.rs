use crate::output::{print_json, print_table};
use phonebook_core::filter::AGE_RANGES;

pub fn run(json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&AGE_RANGES);
    }
    let rows = AGE_RANGES
        .iter()
        .map(|r| vec![r.label.to_string(), r.filter_text()])
        .collect();
    print_table(&["RANGE", "FILTER"], rows);
    Ok(())
}
