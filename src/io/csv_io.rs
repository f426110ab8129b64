use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EstimatorError;
use crate::models::{SpeciesRecord, TreeEstimate, TreeRecord, VolumeCoefficients};
use crate::store::RegionSpeciesMapping;

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(true).flexible(true).trim(csv::Trim::All);
    builder
}

fn parse_tree_records<R: Read>(rdr: &mut csv::Reader<R>) -> Result<Vec<TreeRecord>, EstimatorError> {
    let mut trees = Vec::new();
    for result in rdr.deserialize() {
        let mut tree: TreeRecord = result?;
        tree.region = tree.region.filter(|r| !r.trim().is_empty());
        trees.push(tree);
    }
    Ok(trees)
}

/// Read tree records from a CSV file. Columns: `tree_id`, `species_cd`, and
/// optionally `region`, `dbh`, `height`, `basal_area`, `site_index`,
/// `stems`, `drc`, `bole_height`.
///
/// Values are not range-checked here; each tree is validated when estimated.
pub fn read_trees_csv(path: impl AsRef<Path>) -> Result<Vec<TreeRecord>, EstimatorError> {
    let mut rdr = reader_builder().from_path(path.as_ref())?;
    parse_tree_records(&mut rdr)
}

pub fn read_trees_csv_from_bytes(data: &[u8]) -> Result<Vec<TreeRecord>, EstimatorError> {
    let mut rdr = reader_builder().from_reader(data);
    parse_tree_records(&mut rdr)
}

/// Flat CSV row for a tree estimate; errors are joined with `"; "`.
#[derive(Debug, Serialize)]
struct EstimateRow<'a> {
    tree_id: u32,
    species_cd: i64,
    region: Option<&'a str>,
    total_ag_lbs: Option<f64>,
    stem_lbs: Option<f64>,
    bark_lbs: Option<f64>,
    bole_lbs: Option<f64>,
    foliage_lbs: Option<f64>,
    root_lbs: Option<f64>,
    stump_lbs: Option<f64>,
    top_lbs: Option<f64>,
    gross_volume_cuft: Option<f64>,
    volume_equation: Option<&'a str>,
    errors: String,
}

impl<'a> From<&'a TreeEstimate> for EstimateRow<'a> {
    fn from(e: &'a TreeEstimate) -> Self {
        Self {
            tree_id: e.tree_id,
            species_cd: e.species_cd,
            region: e.region.as_deref(),
            total_ag_lbs: e.total_ag_lbs,
            stem_lbs: e.stem_lbs,
            bark_lbs: e.bark_lbs,
            bole_lbs: e.bole_lbs,
            foliage_lbs: e.foliage_lbs,
            root_lbs: e.root_lbs,
            stump_lbs: e.stump_lbs,
            top_lbs: e.top_lbs,
            gross_volume_cuft: e.gross_volume_cuft,
            volume_equation: e.volume_equation.as_deref(),
            errors: e.errors.join("; "),
        }
    }
}

pub fn write_estimates_csv(
    estimates: &[TreeEstimate],
    path: impl AsRef<Path>,
) -> Result<(), EstimatorError> {
    let mut wtr = csv::Writer::from_path(path.as_ref())?;
    for est in estimates {
        wtr.serialize(EstimateRow::from(est))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render estimates as CSV text.
pub fn estimates_to_csv_string(estimates: &[TreeEstimate]) -> Result<String, EstimatorError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for est in estimates {
        wtr.serialize(EstimateRow::from(est))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| EstimatorError::Io(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| EstimatorError::ValidationError(format!("Invalid UTF-8 in CSV output: {e}")))
}

/// Species reference rows; headers match the `species` relation.
pub fn read_species_csv(path: impl AsRef<Path>) -> Result<Vec<SpeciesRecord>, EstimatorError> {
    let mut rdr = reader_builder().from_path(path.as_ref())?;
    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let record: SpeciesRecord = result?;
        rows.push(record);
    }
    Ok(rows)
}

/// Region species mapping rows. Without a `seq` column, file order decides
/// which duplicate wins.
pub fn read_config_csv(path: impl AsRef<Path>) -> Result<Vec<RegionSpeciesMapping>, EstimatorError> {
    #[derive(Deserialize)]
    struct ConfigRow {
        species_cd: i64,
        region: String,
        eff_species_cd: i64,
        seq: Option<i64>,
    }

    let mut rdr = reader_builder().from_path(path.as_ref())?;
    let mut rows = Vec::new();
    for (index, result) in rdr.deserialize().enumerate() {
        let row: ConfigRow = result?;
        rows.push(RegionSpeciesMapping {
            species_cd: row.species_cd,
            region: row.region,
            eff_species_cd: row.eff_species_cd,
            seq: row.seq.unwrap_or(index as i64),
        });
    }
    Ok(rows)
}

/// Volume coefficient rows: `region`, `eff_species_cd`, then any of `b0`..`b19`.
pub fn read_coefficients_csv(
    path: impl AsRef<Path>,
) -> Result<Vec<VolumeCoefficients>, EstimatorError> {
    let mut rdr = reader_builder().from_path(path.as_ref())?;
    let headers = rdr.headers()?.clone();
    let region_idx = column_index(&headers, "region")?;
    let species_idx = column_index(&headers, "eff_species_cd")?;

    let mut slots = Vec::new();
    for (col, name) in headers.iter().enumerate() {
        if let Some(n) = name.strip_prefix('b').and_then(|n| n.parse::<usize>().ok()) {
            if n < crate::models::NUM_COEFFICIENTS {
                slots.push((col, n));
            }
        }
    }

    let mut rows = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result?;
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();
        let eff_species_cd: i64 = field(species_idx).parse().map_err(|_| {
            EstimatorError::ValidationError(format!(
                "row {}: eff_species_cd must be an integer, got '{}'",
                line + 1,
                field(species_idx)
            ))
        })?;
        let mut coefs = VolumeCoefficients::new(field(region_idx), eff_species_cd);
        for &(col, n) in &slots {
            let raw = field(col);
            if raw.is_empty() {
                continue;
            }
            let value: f64 = raw.parse().map_err(|_| {
                EstimatorError::ValidationError(format!(
                    "row {}: b{n} must be a number, got '{raw}'",
                    line + 1
                ))
            })?;
            coefs.b[n] = Some(value);
        }
        rows.push(coefs);
    }
    Ok(rows)
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize, EstimatorError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| EstimatorError::ValidationError(format!("missing column '{name}'")))
}
