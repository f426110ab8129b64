use std::path::Path;

use rusqlite::{params, params_from_iter, Connection, OpenFlags, OptionalExtension, Row, ToSql};
use serde::Serialize;
use tracing::{debug, trace};

use super::{
    check_species_code, coefficients_not_found, mapping_not_found, species_not_found,
    CoefficientStore, MemoryStore, RegionSpeciesMapping,
};
use crate::error::EstimatorError;
use crate::models::{SpeciesRecord, VolumeCoefficients, NUM_COEFFICIENTS};
use crate::volume::normalize_region;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS species (
    species_cd INTEGER PRIMARY KEY,
    common_name TEXT,
    jenkins_total_b1 REAL,
    jenkins_total_b2 REAL,
    jenkins_stem_wood_ratio_b1 REAL,
    jenkins_stem_wood_ratio_b2 REAL,
    jenkins_stem_bark_ratio_b1 REAL,
    jenkins_stem_bark_ratio_b2 REAL,
    jenkins_foliage_ratio_b1 REAL,
    jenkins_foliage_ratio_b2 REAL,
    jenkins_root_ratio_b1 REAL,
    jenkins_root_ratio_b2 REAL,
    raile_stump_dob_b1 REAL,
    raile_stump_dib_b1 REAL,
    raile_stump_dib_b2 REAL,
    wood_spgr_greenvol_drywt REAL,
    bark_spgr_greenvol_drywt REAL
);

CREATE TABLE IF NOT EXISTS config (
    species_cd INTEGER NOT NULL,
    region TEXT NOT NULL,
    eff_species_cd INTEGER NOT NULL,
    seq INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_config_species_region ON config (species_cd, region);

CREATE TABLE IF NOT EXISTS volume_coefficients (
    region TEXT NOT NULL,
    eff_species_cd INTEGER NOT NULL,
    b0 REAL, b1 REAL, b2 REAL, b3 REAL, b4 REAL,
    b5 REAL, b6 REAL, b7 REAL, b8 REAL, b9 REAL,
    b10 REAL, b11 REAL, b12 REAL, b13 REAL, b14 REAL,
    b15 REAL, b16 REAL, b17 REAL, b18 REAL, b19 REAL,
    PRIMARY KEY (region, eff_species_cd)
);

CREATE VIEW IF NOT EXISTS volume_coefficient_view AS
SELECT DISTINCT v.*
FROM config c
JOIN volume_coefficients v
  ON v.region = c.region AND v.eff_species_cd = c.eff_species_cd;
";

/// Row counts written by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportCounts {
    pub species: usize,
    pub config: usize,
    pub coefficients: usize,
}

/// Coefficient store backed by a SQLite database.
///
/// One connection per store; open one store per thread.
pub struct SqliteStore {
    conn: Connection,
}

fn coefficient_columns() -> String {
    (0..NUM_COEFFICIENTS)
        .map(|i| format!("b{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn species_from_row(row: &Row<'_>) -> rusqlite::Result<SpeciesRecord> {
    Ok(SpeciesRecord {
        species_cd: row.get(0)?,
        common_name: row.get(1)?,
        jenkins_total_b1: row.get(2)?,
        jenkins_total_b2: row.get(3)?,
        jenkins_stem_wood_ratio_b1: row.get(4)?,
        jenkins_stem_wood_ratio_b2: row.get(5)?,
        jenkins_stem_bark_ratio_b1: row.get(6)?,
        jenkins_stem_bark_ratio_b2: row.get(7)?,
        jenkins_foliage_ratio_b1: row.get(8)?,
        jenkins_foliage_ratio_b2: row.get(9)?,
        jenkins_root_ratio_b1: row.get(10)?,
        jenkins_root_ratio_b2: row.get(11)?,
        raile_stump_dob_b1: row.get(12)?,
        raile_stump_dib_b1: row.get(13)?,
        raile_stump_dib_b2: row.get(14)?,
        wood_spgr_greenvol_drywt: row.get(15)?,
        bark_spgr_greenvol_drywt: row.get(16)?,
    })
}

fn coefficients_from_row(row: &Row<'_>) -> rusqlite::Result<VolumeCoefficients> {
    let mut coefs = VolumeCoefficients::new(row.get::<_, String>(0)?, row.get(1)?);
    for (i, slot) in coefs.b.iter_mut().enumerate() {
        *slot = row.get(i + 2)?;
    }
    Ok(coefs)
}

impl SqliteStore {
    /// Open (creating if needed) a database file and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, EstimatorError> {
        let conn = Connection::open(path.as_ref())?;
        let store = Self { conn };
        store.create_schema()?;
        debug!(path = %path.as_ref().display(), "opened coefficient database");
        Ok(store)
    }

    /// Open an existing database without write access.
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self, EstimatorError> {
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        debug!(path = %path.as_ref().display(), "opened coefficient database (read-only)");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, EstimatorError> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.create_schema()?;
        Ok(store)
    }

    pub fn create_schema(&self) -> Result<(), EstimatorError> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    pub fn insert_species(&self, sp: &SpeciesRecord) -> Result<(), EstimatorError> {
        insert_species(&self.conn, sp)
    }

    pub fn insert_mapping(&self, mapping: &RegionSpeciesMapping) -> Result<(), EstimatorError> {
        insert_mapping(&self.conn, mapping)
    }

    pub fn insert_coefficients(&self, row: &VolumeCoefficients) -> Result<(), EstimatorError> {
        insert_coefficients(&self.conn, row)
    }

    /// Write every row of an in-memory reference set in one transaction.
    pub fn import(&mut self, data: &MemoryStore) -> Result<ImportCounts, EstimatorError> {
        let tx = self.conn.transaction()?;
        for sp in &data.species {
            insert_species(&tx, sp)?;
        }
        for mapping in &data.config {
            insert_mapping(&tx, mapping)?;
        }
        for row in &data.coefficients {
            insert_coefficients(&tx, row)?;
        }
        tx.commit()?;
        let counts = ImportCounts {
            species: data.species.len(),
            config: data.config.len(),
            coefficients: data.coefficients.len(),
        };
        debug!(?counts, "imported reference data");
        Ok(counts)
    }

    /// Number of rows in each relation.
    pub fn counts(&self) -> Result<ImportCounts, EstimatorError> {
        let count = |table: &str| -> Result<usize, EstimatorError> {
            let n: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?;
            Ok(n as usize)
        };
        Ok(ImportCounts {
            species: count("species")?,
            config: count("config")?,
            coefficients: count("volume_coefficients")?,
        })
    }

    /// Every species row, ordered by code.
    pub fn all_species(&self) -> Result<Vec<SpeciesRecord>, EstimatorError> {
        let sql = format!(
            "SELECT {} FROM species ORDER BY species_cd",
            SpeciesRecord::COLUMNS.join(", ")
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], species_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

fn insert_species(conn: &Connection, sp: &SpeciesRecord) -> Result<(), EstimatorError> {
    let placeholders = (1..=SpeciesRecord::COLUMNS.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT OR REPLACE INTO species ({}) VALUES ({placeholders})",
        SpeciesRecord::COLUMNS.join(", ")
    );
    conn.execute(
        &sql,
        params![
            sp.species_cd,
            sp.common_name,
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
        ],
    )?;
    Ok(())
}

fn insert_mapping(conn: &Connection, mapping: &RegionSpeciesMapping) -> Result<(), EstimatorError> {
    conn.execute(
        "INSERT INTO config (species_cd, region, eff_species_cd, seq) VALUES (?1, ?2, ?3, ?4)",
        params![
            mapping.species_cd,
            normalize_region(&mapping.region),
            mapping.eff_species_cd,
            mapping.seq
        ],
    )?;
    Ok(())
}

fn insert_coefficients(conn: &Connection, row: &VolumeCoefficients) -> Result<(), EstimatorError> {
    let placeholders = (3..NUM_COEFFICIENTS + 3)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT OR REPLACE INTO volume_coefficients (region, eff_species_cd, {}) \
         VALUES (?1, ?2, {placeholders})",
        coefficient_columns()
    );
    let mut values: Vec<Box<dyn ToSql>> = vec![
        Box::new(normalize_region(&row.region)),
        Box::new(row.eff_species_cd),
    ];
    values.extend(row.b.iter().map(|b| Box::new(*b) as Box<dyn ToSql>));
    conn.execute(&sql, params_from_iter(values.iter()))?;
    Ok(())
}

impl CoefficientStore for SqliteStore {
    fn species(&self, species_cd: i64) -> Result<SpeciesRecord, EstimatorError> {
        check_species_code(species_cd)?;
        trace!(species = species_cd, "species lookup (sqlite)");
        let sql = format!(
            "SELECT {} FROM species WHERE species_cd = ?1",
            SpeciesRecord::COLUMNS.join(", ")
        );
        self.conn
            .query_row(&sql, params![species_cd], species_from_row)
            .optional()?
            .ok_or_else(|| species_not_found(species_cd))
    }

    fn region_species(&self, species_cd: i64, region: &str) -> Result<i64, EstimatorError> {
        check_species_code(species_cd)?;
        self.conn
            .query_row(
                "SELECT eff_species_cd FROM config \
                 WHERE species_cd = ?1 AND region = ?2 \
                 ORDER BY seq, rowid LIMIT 1",
                params![species_cd, region],
                |r| r.get(0),
            )
            .optional()?
            .ok_or_else(|| mapping_not_found(species_cd, region))
    }

    fn volume_coefficients(
        &self,
        eff_species_cd: i64,
        region: &str,
    ) -> Result<VolumeCoefficients, EstimatorError> {
        let sql = format!(
            "SELECT region, eff_species_cd, {} FROM volume_coefficient_view \
             WHERE eff_species_cd = ?1 AND region = ?2 LIMIT 1",
            coefficient_columns()
        );
        self.conn
            .query_row(&sql, params![eff_species_cd, region], coefficients_from_row)
            .optional()?
            .ok_or_else(|| coefficients_not_found(eff_species_cd, region))
    }
}
