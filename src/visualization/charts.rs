use colored::Colorize;

use crate::models::TreeEstimate;

/// Format a text bar chart of how total above-ground biomass splits into
/// its components.
pub fn format_biomass_chart(est: &TreeEstimate) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Biomass Composition".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(60)));

    let total = match est.total_ag_lbs {
        Some(t) if t > 0.0 => t,
        _ => {
            output.push_str("  No data available.\n");
            return output;
        }
    };

    let parts = [
        ("Stem wood", est.stem_lbs),
        ("Stem bark", est.bark_lbs),
        ("Foliage", est.foliage_lbs),
        ("Stump", est.stump_lbs),
        ("Top", est.top_lbs),
    ];
    let bar_width = 40;

    output.push_str(&format!("  {:<10}  {:>6}  Share\n", "Component", "%"));
    output.push_str(&format!("  {}\n", "-".repeat(60)));

    for (name, value) in parts {
        let Some(v) = value else {
            output.push_str(&format!("  {name:<10}  {:>6}\n", "n/a".dimmed()));
            continue;
        };
        let share = (v / total).max(0.0);
        let bar_len = (share * bar_width as f64).round() as usize;
        output.push_str(&format!(
            "  {name:<10}  {:>5.1}%  {}\n",
            share * 100.0,
            "\u{2588}".repeat(bar_len.min(bar_width)).green()
        ));
    }

    output.push('\n');
    output
}
