/// External car catalog client (api-ninjas proxy).
use serde::Deserialize;

use crate::config::CatalogConfig;
use crate::error::{AppError, Result};
use crate::models::CatalogCar;

/// Query passed through to the upstream catalog API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogQuery {
    pub year: Option<i32>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub limit: Option<u32>,
}

/// Displacement arrives in cc; clients expect liters to one decimal.
fn cc_to_liters(cc: f64) -> f64 {
    (cc / 1000.0 * 10.0).round() / 10.0
}

pub struct CatalogClient {
    http: reqwest::Client,
    config: CatalogConfig,
}

impl CatalogClient {
    pub fn new(config: CatalogConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Look up catalog entries upstream. Failures surface to the caller
    /// as upstream errors; there are no retries.
    pub async fn search(&self, query: &CatalogQuery) -> Result<Vec<CatalogCar>> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(year) = query.year {
            params.push(("year", year.to_string()));
        }
        if let Some(make) = &query.make {
            params.push(("make", make.clone()));
        }
        if let Some(model) = &query.model {
            params.push(("model", model.clone()));
        }
        params.push(("limit", query.limit.unwrap_or(10).to_string()));

        let response = self
            .http
            .get(&self.config.base_url)
            .header("X-Api-Key", &self.config.api_key)
            .query(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Car catalog responded with status {}",
                response.status()
            )));
        }

        let mut cars: Vec<CatalogCar> = response.json().await?;
        for car in &mut cars {
            car.displacement = car.displacement.map(cc_to_liters);
        }

        Ok(cars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displacement_converts_to_liters_at_one_decimal() {
        assert_eq!(cc_to_liters(1298.0), 1.3);
        assert_eq!(cc_to_liters(1997.0), 2.0);
        assert_eq!(cc_to_liters(6162.0), 6.2);
    }
}
