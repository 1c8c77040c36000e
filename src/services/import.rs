/*!
 * Bulk CSV import
 *
 * Input columns: `Store, Listed By, Date, Flavor, Season?, Quantity`. Every distinct store
 * and employee name becomes a new row (no matching against existing rows), and each
 * inventory row is linked to the ids created for its names. A blank name links to nothing.
 */

use crate::entities::inventory::NewInventory;
use crate::entities::{employee, store};
use crate::errors::ServiceError;
use crate::repositories::{DirectoryRepository, InventoryRepository};
use crate::services::directory::DirectoryService;
use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

/// Accepted spellings of the `Date` column
pub const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Counts reported after an import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImportSummary {
    pub stores_created: usize,
    pub employees_created: usize,
    pub inventory_created: u64,
    /// Rows whose store name was blank and were stored without a store
    pub unresolved_store_refs: usize,
    /// Rows whose employee name was blank and were stored without an employee
    pub unresolved_employee_refs: usize,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Store", default)]
    store: String,
    #[serde(rename = "Listed By", default)]
    listed_by: String,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Flavor")]
    flavor: String,
    #[serde(rename = "Season?", default)]
    season: String,
    #[serde(rename = "Quantity")]
    quantity: i32,
}

/// A decoded input row, names not yet resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    pub store: Option<String>,
    pub employee: Option<String>,
    pub date: NaiveDate,
    pub flavor: String,
    pub is_season_flavor: bool,
    pub quantity: i32,
}

fn non_blank(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn parse_date(raw: &str, line: usize) -> Result<NaiveDate, ServiceError> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .ok_or_else(|| {
            ServiceError::ValidationError(format!("line {}: invalid date '{}'", line, raw))
        })
}

/// Decode CSV input. Any undecodable row fails the whole import.
pub fn parse_rows<R: Read>(input: R) -> Result<Vec<ImportRow>, ServiceError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    let mut rows = Vec::new();
    for (index, record) in reader.deserialize::<CsvRow>().enumerate() {
        let record = record?;
        // header is line 1
        let line = index + 2;
        rows.push(ImportRow {
            store: non_blank(record.store),
            employee: non_blank(record.listed_by),
            date: parse_date(&record.date, line)?,
            flavor: record.flavor,
            is_season_flavor: record.season == "Yes",
            quantity: record.quantity,
        });
    }
    Ok(rows)
}

/// Distinct values in first-appearance order
pub fn distinct_names<'a, I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

#[derive(Clone)]
pub struct ImportService {
    db: Arc<DatabaseConnection>,
    stores: DirectoryRepository<store::Entity>,
    employees: DirectoryRepository<employee::Entity>,
    directory: DirectoryService,
}

impl ImportService {
    pub fn new(db: Arc<DatabaseConnection>, directory: DirectoryService) -> Self {
        Self {
            stores: DirectoryRepository::new(db.clone()),
            employees: DirectoryRepository::new(db.clone()),
            db,
            directory,
        }
    }

    /// Import the CSV file at `path`
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn import_path(&self, path: &Path) -> Result<ImportSummary, ServiceError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            warn!(error = %e, "Import source unavailable");
            ServiceError::ImportError(format!("cannot read {}: {}", path.display(), e))
        })?;
        self.import_reader(bytes.as_slice()).await
    }

    /// Import CSV from any reader; all rows land in one transaction or none do
    pub async fn import_reader<R: Read>(&self, input: R) -> Result<ImportSummary, ServiceError> {
        let rows = parse_rows(input)?;

        let store_names = distinct_names(rows.iter().filter_map(|row| row.store.as_deref()));
        let employee_names = distinct_names(rows.iter().filter_map(|row| row.employee.as_deref()));

        let txn = self.db.begin().await?;
        let store_ids = self.stores.insert_names(&txn, &store_names).await?;
        let employee_ids = self.employees.insert_names(&txn, &employee_names).await?;

        let mut summary = ImportSummary {
            stores_created: store_ids.len(),
            employees_created: employee_ids.len(),
            ..Default::default()
        };

        let records: Vec<NewInventory> = rows
            .into_iter()
            .map(|row| {
                let store_id = row.store.as_ref().and_then(|name| store_ids.get(name).copied());
                let employee_id = row
                    .employee
                    .as_ref()
                    .and_then(|name| employee_ids.get(name).copied());
                if store_id.is_none() {
                    summary.unresolved_store_refs += 1;
                }
                if employee_id.is_none() {
                    summary.unresolved_employee_refs += 1;
                }
                NewInventory {
                    store_id,
                    employee_id,
                    date: row.date,
                    flavor: row.flavor,
                    is_season_flavor: row.is_season_flavor,
                    quantity: row.quantity,
                }
            })
            .collect();

        summary.inventory_created = InventoryRepository::insert_batch(&txn, records).await?;
        txn.commit().await?;

        self.directory.invalidate().await;
        info!(?summary, "CSV import finished");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Store,Date,Flavor,Season?,Quantity,Listed By
Downtown,2023-06-01,Vanilla,Yes,10,Ann
Uptown,06/02/2023,Chocolate,No,5,Bob
Downtown,2023-06-03,Mint, Yes ,7,
";

    #[test]
    fn rows_decode_with_either_date_format() {
        let rows = parse_rows(SAMPLE.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].date, NaiveDate::from_ymd_opt(2023, 6, 2).unwrap());
        assert!(rows[0].is_season_flavor);
        assert!(!rows[1].is_season_flavor);
        // trimmed before comparison
        assert!(rows[2].is_season_flavor);
        assert_eq!(rows[2].employee, None);
    }

    #[test]
    fn bad_date_names_the_line() {
        let input = "Store,Listed By,Date,Flavor,Season?,Quantity\nA,B,June 1,Vanilla,No,1\n";
        match parse_rows(input.as_bytes()) {
            Err(ServiceError::ValidationError(message)) => assert!(message.contains("line 2")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn non_numeric_quantity_is_rejected() {
        let input = "Store,Listed By,Date,Flavor,Season?,Quantity\nA,B,2023-06-01,Vanilla,No,lots\n";
        assert!(matches!(
            parse_rows(input.as_bytes()),
            Err(ServiceError::ValidationError(_))
        ));
    }

    #[test]
    fn distinct_names_keep_first_appearance() {
        let names = distinct_names(["b", "a", "b", "c", "a"]);
        assert_eq!(names, vec!["b", "a", "c"]);
    }
}
