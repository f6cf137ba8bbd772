//! Deduplicated in-memory collection of PPR sales

use crate::ingestion::errors::{SaleError, SaleResult};
use crate::ingestion::normalize::clean_for_comparison;
use crate::ingestion::parse::read_ppr_rows;
use crate::ingestion::types::{Sale, SaleHash, SaleRecord, WriteStats};
use crate::ingestion::write::{remove_duplicates, write_sales_csv};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, error, info};

/// Whether filter predicates use containment or equality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    #[default]
    Partial,
    Exact,
}

/// Sales in load order, unique by [`Sale::hash`]
#[derive(Debug, Clone, Default)]
pub struct Sales {
    data: Vec<Sale>,
    hashes: HashSet<SaleHash>,
}

impl Sales {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sale> {
        self.data.iter()
    }

    /// Append unless a sale with the same identity is already present.
    /// Returns whether the sale was added.
    pub fn append(&mut self, sale: Sale) -> bool {
        let hash = sale.hash();
        if !self.hashes.insert(hash) {
            debug!("Skipping duplicate sale {} at {}", hash, sale.address());
            return false;
        }

        self.data.push(sale);
        true
    }

    pub fn contains(&self, sale: &Sale) -> bool {
        self.hashes.contains(&sale.hash())
    }

    pub fn serialise(&self) -> Vec<SaleRecord> {
        self.data.iter().map(Sale::serialise).collect()
    }

    /// Sales matching every given predicate. A `None` (or empty) address or
    /// county is no constraint. An address that cleans down to nothing
    /// matches no sale.
    ///
    /// Addresses compare in their normalised comparison form on both sides.
    /// The county compares the lowercased argument against the stored county
    /// as-is, without the address repairs.
    pub fn filter(&self, address: Option<&str>, county: Option<&str>, mode: MatchMode) -> Sales {
        let needle = match address.filter(|a| !a.is_empty()) {
            Some(address) => match clean_for_comparison(address) {
                Some(needle) => Some(needle),
                None => return Sales::new(),
            },
            None => None,
        };
        let lower_county = county.filter(|c| !c.is_empty()).map(str::to_lowercase);

        let mut results = Sales::new();

        for sale in &self.data {
            if let Some(needle) = needle.as_deref() {
                let matched = match clean_for_comparison(sale.address()) {
                    Some(haystack) => match mode {
                        MatchMode::Partial => haystack.contains(needle),
                        MatchMode::Exact => haystack == needle,
                    },
                    None => false,
                };
                if !matched {
                    continue;
                }
            }

            if let Some(lower_county) = lower_county.as_deref() {
                let matched = match mode {
                    MatchMode::Partial => sale.county().contains(lower_county),
                    MatchMode::Exact => sale.county() == lower_county,
                };
                if !matched {
                    continue;
                }
            }

            results.append(Sale::from_record(sale));
        }

        results
    }

    /// Analyst lookup: every substring must appear in the cleaned address,
    /// and only one sale per distinct address and date is kept. No
    /// substrings, or one that cleans down to nothing, finds nothing.
    pub fn search(&self, address_substrs: &[String], county: Option<&str>) -> Sales {
        let Some(needles) = address_substrs
            .iter()
            .map(|s| clean_for_comparison(s))
            .collect::<Option<Vec<String>>>()
        else {
            return Sales::new();
        };
        let Some(first) = needles.first() else {
            return Sales::new();
        };

        let candidates = self.filter(Some(first.as_str()), county, MatchMode::Partial);

        let mut seen_dates: HashMap<&str, Vec<chrono::NaiveDateTime>> = HashMap::new();
        let mut results = Sales::new();

        for sale in candidates.iter() {
            let Some(cleaned) = clean_for_comparison(sale.address()) else {
                continue;
            };
            if !needles.iter().all(|needle| cleaned.contains(needle.as_str())) {
                continue;
            }

            let dates = seen_dates.entry(sale.address()).or_default();
            if dates.contains(&sale.date()) {
                continue;
            }
            dates.push(sale.date());

            results.append(Sale::from_record(sale));
        }

        results
    }

    /// Save to the canonical file. Rows are deduplicated a second time on
    /// (date, address, price, county) before writing.
    pub fn save(&self, path: &Path) -> SaleResult<WriteStats> {
        let records = self.serialise();
        let total = records.len();

        let unique = remove_duplicates(records, |r| {
            (r.date, r.address.clone(), r.price.normalize(), r.county.clone())
        });

        let written = write_sales_csv(path, &unique)?;
        let stats = WriteStats {
            written,
            duplicates_dropped: total - unique.len(),
        };

        info!("Saved PPR data to {:?} ({})", path, stats);

        Ok(stats)
    }

    /// Load a canonical (or freshly downloaded) PPR file. Any bad row
    /// aborts the whole load.
    pub fn load(path: &Path) -> SaleResult<Sales> {
        info!("Getting PPR data from {:?}", path);

        let rows = read_ppr_rows(path)?;
        let mut sales = Sales::new();

        for (idx, row) in rows.into_iter().enumerate() {
            let sale = Sale::from_row(row).map_err(|e: SaleError| {
                // +2: one for the skipped header, one for 1-based lines
                error!(line = idx + 2, "Failed to parse PPR row: {}", e);
                e
            })?;
            sales.append(sale);
        }

        info!("Got PPR data: {} sales", sales.len());

        Ok(sales)
    }
}

impl PartialEq for Sales {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl FromIterator<Sale> for Sales {
    fn from_iter<I: IntoIterator<Item = Sale>>(iter: I) -> Self {
        let mut sales = Sales::new();
        for sale in iter {
            sales.append(sale);
        }
        sales
    }
}

impl Extend<Sale> for Sales {
    fn extend<I: IntoIterator<Item = Sale>>(&mut self, iter: I) {
        for sale in iter {
            self.append(sale);
        }
    }
}

impl<'a> IntoIterator for &'a Sales {
    type Item = &'a Sale;
    type IntoIter = std::slice::Iter<'a, Sale>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl IntoIterator for Sales {
    type Item = Sale;
    type IntoIter = std::vec::IntoIter<Sale>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}
