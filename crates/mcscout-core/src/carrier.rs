use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// A carrier registration record assembled from the snapshot and
/// registration pages for one MC number.
///
/// Every field other than `identifier` is a plain string where empty means
/// "not found on the page". Serialized names follow the column names the
/// downstream exporters already use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierRecord {
    /// The MC number this record was requested for.
    #[serde(rename = "mc_number")]
    pub identifier: u64,
    /// USDOT number found on the snapshot page.
    #[serde(rename = "usdot_number")]
    pub alternate_identifier: String,
    pub legal_name: String,
    /// Whitespace-collapsed, single-line address.
    pub physical_address: String,
    pub phone_number: String,
    pub email: String,
    pub entity_type: String,
    #[serde(rename = "usdot_status")]
    pub operating_status: String,
    /// Empty means in service.
    pub out_of_service_date: String,
    pub operating_authority_status: String,
    /// SMS results page discovered on the snapshot; only used to drive
    /// enrichment.
    #[serde(skip)]
    pub enrichment_url: Option<String>,
}

impl CarrierRecord {
    #[must_use]
    pub fn new(identifier: u64) -> Self {
        Self {
            identifier,
            ..Self::default()
        }
    }

    /// Visits every free-text field, used by the extractor's final cleanup pass.
    pub fn text_fields_mut(&mut self) -> [&mut String; 9] {
        [
            &mut self.alternate_identifier,
            &mut self.legal_name,
            &mut self.physical_address,
            &mut self.phone_number,
            &mut self.email,
            &mut self.entity_type,
            &mut self.operating_status,
            &mut self.out_of_service_date,
            &mut self.operating_authority_status,
        ]
    }
}

/// Entity-type filter a scan is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Carrier,
    Broker,
    Shipper,
}

impl EntityType {
    /// Lowercase keyword matched against a record's entity-type text.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            EntityType::Carrier => "carrier",
            EntityType::Broker => "broker",
            EntityType::Shipper => "shipper",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for EntityType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "carrier" => Ok(EntityType::Carrier),
            "broker" => Ok(EntityType::Broker),
            "shipper" => Ok(EntityType::Shipper),
            _ => Err(CoreError::InvalidEntityType(s.to_string())),
        }
    }
}

/// Caller-supplied parameters for one acquisition session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionRequest {
    /// First MC number to check, inclusive.
    pub start_identifier: u64,
    /// Last MC number to check, inclusive. `None` scans upward until stopped.
    pub end_identifier: Option<u64>,
    pub entity_type: EntityType,
}

impl AcquisitionRequest {
    /// Builds a request, rejecting a bounded range whose end precedes its start.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRange`] when `end < start`.
    pub fn new(
        start_identifier: u64,
        end_identifier: Option<u64>,
        entity_type: EntityType,
    ) -> Result<Self, CoreError> {
        let request = Self {
            start_identifier,
            end_identifier,
            entity_type,
        };
        request.validate()?;
        Ok(request)
    }

    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRange`] when `end < start`.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self.end_identifier {
            Some(end) if end < self.start_identifier => Err(CoreError::InvalidRange {
                start: self.start_identifier,
                end,
            }),
            _ => Ok(()),
        }
    }

    /// Whether `identifier` is still inside the requested range.
    #[must_use]
    pub fn includes(&self, identifier: u64) -> bool {
        identifier >= self.start_identifier
            && self.end_identifier.is_none_or(|end| identifier <= end)
    }
}
