use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, ContentArrangement, Table};

use crate::analysis::{BatchSummary, VolumeExplanation};
use crate::models::{SpeciesRecord, TreeEstimate};
use crate::volume::VolumeEstimate;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn title(output: &mut String, text: &str, width: usize) {
    output.push_str(&format!("\n{}\n", text.bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(width)));
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:.precision$}"),
        None => "n/a".to_string(),
    }
}

fn push_errors(output: &mut String, errors: &[String]) {
    for e in errors {
        output.push_str(&format!("  {} {}\n", "!".yellow().bold(), e.yellow()));
    }
}

/// Format every biomass component of one tree, plus volume when present.
pub fn format_tree_estimate(est: &TreeEstimate, label: &str, precision: usize) -> String {
    let mut output = String::new();
    title(&mut output, &format!("Tree Estimate: {label}"), 50);

    let mut table = new_table(vec!["Component", "Value", "Unit"]);
    let rows = [
        ("Total above-ground", est.total_ag_lbs),
        ("Stem wood", est.stem_lbs),
        ("Stem bark", est.bark_lbs),
        ("Bole (wood + bark)", est.bole_lbs),
        ("Foliage", est.foliage_lbs),
        ("Stump", est.stump_lbs),
        ("Top and branches", est.top_lbs),
        ("Coarse roots", est.root_lbs),
    ];
    for (name, value) in rows {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(fmt_opt(value, precision)),
            Cell::new("lb"),
        ]);
    }
    if est.gross_volume_cuft.is_some() {
        table.add_row(vec![
            Cell::new("Gross volume"),
            Cell::new(fmt_opt(est.gross_volume_cuft, precision)),
            Cell::new("cu ft"),
        ]);
    }

    output.push_str(&format!("{table}\n"));
    if let Some(eq) = &est.volume_equation {
        output.push_str(&format!("  Volume equation: {}\n", eq.cyan()));
    }
    push_errors(&mut output, &est.errors);
    output
}

/// Format a single volume evaluation.
pub fn format_volume_estimate(est: &VolumeEstimate, precision: usize) -> String {
    let mut output = String::new();
    title(&mut output, "Gross Volume", 50);

    let mut table = new_table(vec!["Field", "Value"]);
    table.add_row(vec![Cell::new("Region"), Cell::new(&est.region)]);
    table.add_row(vec![Cell::new("Region table"), Cell::new(est.table.to_string())]);
    table.add_row(vec![
        Cell::new("Effective species"),
        Cell::new(est.eff_species_cd.to_string()),
    ]);
    table.add_row(vec![Cell::new("Equation"), Cell::new(est.rule)]);
    table.add_row(vec![Cell::new("Form"), Cell::new(&est.form)]);
    table.add_row(vec![
        Cell::new("Gross volume (cu ft)"),
        Cell::new(format!("{:.precision$}", est.gross_volume_cuft)),
    ]);
    output.push_str(&format!("{table}\n"));
    output
}

/// Format which equation row a tree is routed to.
pub fn format_volume_explanation(ex: &VolumeExplanation) -> String {
    let mut output = String::new();
    title(&mut output, "Volume Equation Selection", 50);

    let mut table = new_table(vec!["Field", "Value"]);
    table.add_row(vec![Cell::new("Region"), Cell::new(&ex.region)]);
    table.add_row(vec![Cell::new("Region table"), Cell::new(ex.table.to_string())]);
    table.add_row(vec![Cell::new("Species"), Cell::new(ex.species_cd.to_string())]);
    table.add_row(vec![
        Cell::new("Effective species"),
        Cell::new(ex.eff_species_cd.to_string()),
    ]);
    table.add_row(vec![Cell::new("Equation"), Cell::new(ex.rule)]);
    table.add_row(vec![Cell::new("Form"), Cell::new(&ex.form)]);
    table.add_row(vec![
        Cell::new("Required inputs"),
        Cell::new(ex.required_inputs.join(", ")),
    ]);
    table.add_row(vec![
        Cell::new("Coefficients"),
        Cell::new(ex.coefficients.join(", ")),
    ]);
    table.add_row(vec![Cell::new("Floor"), Cell::new(ex.floor.to_string())]);
    output.push_str(&format!("{table}\n"));
    output
}

/// Format a species record's coefficients.
pub fn format_species_record(sp: &SpeciesRecord) -> String {
    let mut output = String::new();
    title(&mut output, &format!("Species {}", sp.label()), 50);

    let mut table = new_table(vec!["Coefficient", "Value"]);
    let values = [
        sp.jenkins_total_b1,
        sp.jenkins_total_b2,
        sp.jenkins_stem_wood_ratio_b1,
        sp.jenkins_stem_wood_ratio_b2,
        sp.jenkins_stem_bark_ratio_b1,
        sp.jenkins_stem_bark_ratio_b2,
        sp.jenkins_foliage_ratio_b1,
        sp.jenkins_foliage_ratio_b2,
        sp.jenkins_root_ratio_b1,
        sp.jenkins_root_ratio_b2,
        sp.raile_stump_dob_b1,
        sp.raile_stump_dib_b1,
        sp.raile_stump_dib_b2,
        sp.wood_spgr_greenvol_drywt,
        sp.bark_spgr_greenvol_drywt,
    ];
    // COLUMNS starts with species_cd and common_name.
    for (name, value) in SpeciesRecord::COLUMNS[2..].iter().zip(values) {
        let cell = match value {
            Some(v) => Cell::new(v.to_string()),
            None => Cell::new("missing".dimmed().to_string()),
        };
        table.add_row(vec![Cell::new(*name), cell]);
    }
    output.push_str(&format!("{table}\n"));
    output
}

/// Format one row per tree of a batch.
pub fn format_estimates_table(estimates: &[TreeEstimate], precision: usize) -> String {
    let mut output = String::new();
    title(&mut output, "Batch Estimates", 70);

    let mut table = new_table(vec![
        "Tree",
        "Species",
        "Region",
        "Total AG (lb)",
        "Bole (lb)",
        "Roots (lb)",
        "Volume (cu ft)",
        "Status",
    ]);
    for est in estimates {
        let status = if est.is_complete() {
            Cell::new("ok".green().to_string())
        } else {
            Cell::new(format!("{} error(s)", est.errors.len()).red().to_string())
        };
        table.add_row(vec![
            Cell::new(est.tree_id.to_string()),
            Cell::new(est.species_cd.to_string()),
            Cell::new(est.region.as_deref().unwrap_or("-")),
            Cell::new(fmt_opt(est.total_ag_lbs, precision)),
            Cell::new(fmt_opt(est.bole_lbs, precision)),
            Cell::new(fmt_opt(est.root_lbs, precision)),
            Cell::new(fmt_opt(est.gross_volume_cuft, precision)),
            status,
        ]);
    }
    output.push_str(&format!("{table}\n"));
    output
}

/// Format batch totals.
pub fn format_batch_summary(summary: &BatchSummary, precision: usize) -> String {
    let mut output = String::new();
    title(&mut output, "Batch Summary", 50);
    output.push_str(&format!(
        "{}\n",
        format!(
            "Trees: {} | Complete: {} | With errors: {} ({} messages)",
            summary.trees, summary.complete, summary.with_errors, summary.error_count
        )
        .dimmed()
    ));

    let mut table = new_table(vec!["Quantity", "Total", "Unit"]);
    let rows = [
        ("Total above-ground biomass", summary.total_ag_lbs, "lb"),
        ("Bole biomass", summary.bole_lbs, "lb"),
        ("Root biomass", summary.root_lbs, "lb"),
        ("Gross volume", summary.gross_volume_cuft, "cu ft"),
    ];
    for (name, value, unit) in rows {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(format!("{value:.precision$}")),
            Cell::new(unit),
        ]);
    }
    output.push_str(&format!("{table}\n"));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::RegionTable;

    fn sample_estimate() -> TreeEstimate {
        TreeEstimate {
            tree_id: 3,
            species_cd: 746,
            region: Some("S22LMT".to_string()),
            total_ag_lbs: Some(232.8154),
            stem_lbs: Some(120.0),
            gross_volume_cuft: Some(4.25),
            volume_equation: Some("Aspen (Edminster)".to_string()),
            errors: vec!["stump: Not implemented: stump adjustment".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_tree_estimate_shows_values_and_errors() {
        let output = format_tree_estimate(&sample_estimate(), "746 quaking aspen", 2);
        assert!(output.contains("Tree Estimate: 746 quaking aspen"));
        assert!(output.contains("232.82"));
        assert!(output.contains("n/a"));
        assert!(output.contains("Aspen (Edminster)"));
        assert!(output.contains("Not implemented"));
    }

    #[test]
    fn test_volume_estimate_precision() {
        let est = VolumeEstimate {
            region: "S33".to_string(),
            eff_species_cd: 131,
            table: RegionTable::South,
            rule: "Table 2 Row 1",
            form: "power".to_string(),
            gross_volume_cuft: 12.34567,
        };
        let output = format_volume_estimate(&est, 3);
        assert!(output.contains("12.346"));
        assert!(output.contains("Table 2 Row 1"));
    }

    #[test]
    fn test_species_record_marks_missing() {
        let sp = SpeciesRecord {
            species_cd: 746,
            jenkins_total_b1: Some(-2.2094),
            ..Default::default()
        };
        let output = format_species_record(&sp);
        assert!(output.contains("jenkins_total_b1"));
        assert!(output.contains("-2.2094"));
        assert!(output.contains("missing"));
        assert!(!output.contains("common_name"));
    }

    #[test]
    fn test_estimates_table_rows() {
        let output = format_estimates_table(&[sample_estimate()], 1);
        assert!(output.contains("Total AG (lb)"));
        assert!(output.contains("S22LMT"));
        assert!(output.contains("1 error(s)"));
    }

    #[test]
    fn test_batch_summary_counts() {
        let summary = BatchSummary::from_estimates(&[sample_estimate()]);
        let output = format_batch_summary(&summary, 2);
        assert!(output.contains("Trees: 1"));
        assert!(output.contains("With errors: 1"));
        assert!(output.contains("232.82"));
    }
}
