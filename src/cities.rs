//! Province → district directory built from the historical sales dataset.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;

use log::info;
use serde::Serialize;

use crate::error::{ApiError, LoadError, LoadResult};

pub const PROVINCE_FIELD: &str = "il";
pub const DISTRICT_FIELD: &str = "Ilce";

/// Provinces in order, each with its districts sorted and de-duplicated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CityDistrictIndex(BTreeMap<String, Vec<String>>);

impl CityDistrictIndex {
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> LoadResult<Self> {
        let reader = csv::Reader::from_path(path)?;
        Self::from_csv(reader)
    }

    pub fn from_reader<R: Read>(rdr: R) -> LoadResult<Self> {
        Self::from_csv(csv::Reader::from_reader(rdr))
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> LoadResult<Self> {
        let headers = reader.headers()?.clone();
        let province_idx = column_index(&headers, PROVINCE_FIELD)?;
        let district_idx = column_index(&headers, DISTRICT_FIELD)?;

        let mut grouped: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for record in reader.records() {
            let record = record?;
            let province = record.get(province_idx).unwrap_or("").trim();
            let district = record.get(district_idx).unwrap_or("").trim();
            if province.is_empty() || district.is_empty() {
                continue;
            }
            grouped
                .entry(province.to_string())
                .or_default()
                .insert(district.to_string());
        }

        Ok(Self(
            grouped
                .into_iter()
                .map(|(province, districts)| (province, districts.into_iter().collect()))
                .collect(),
        ))
    }

    pub fn districts(&self, province: &str) -> Option<&[String]> {
        self.0.get(province).map(Vec::as_slice)
    }

    pub fn provinces(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn column_index(headers: &csv::StringRecord, name: &str) -> LoadResult<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| LoadError::MissingColumn {
            column: name.to_string(),
        })
}

/// Serves the index, or reports it missing when the dataset never loaded.
#[derive(Debug, Clone, Default)]
pub struct CityDirectory {
    index: Option<CityDistrictIndex>,
}

impl CityDirectory {
    pub fn new(index: Option<CityDistrictIndex>) -> Self {
        Self { index }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> LoadResult<Self> {
        let index = CityDistrictIndex::from_csv_path(path)?;
        info!("city directory loaded with {} provinces", index.len());
        Ok(Self::new(Some(index)))
    }

    pub fn list(&self) -> Result<&CityDistrictIndex, ApiError> {
        self.index.as_ref().ok_or(ApiError::CitiesUnavailable)
    }
}
