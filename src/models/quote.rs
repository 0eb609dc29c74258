use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::utils::AdminError;

/// Business state of a quote.
///
/// Quotes move forward only: `lead -> pending -> approved | rejected`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    #[default]
    Lead,
    Pending,
    Approved,
    Rejected,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Final advisor decisions; the only values a status change may set
    pub fn is_decision(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    pub fn can_transition_to(&self, next: QuoteStatus) -> bool {
        matches!(
            (self, next),
            (Self::Lead, Self::Pending)
                | (Self::Pending, Self::Approved)
                | (Self::Pending, Self::Rejected)
        )
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for QuoteStatus {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lead" => Ok(Self::Lead),
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(AdminError::ValidationError(format!(
                "Unknown quote status '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UseType {
    Personal,
    Others,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub has_plate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plate: Option<String>,
    pub document_number: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInfo {
    pub year: u16,
    pub brand: String,
    pub model: String,
    pub use_type: UseType,
}

/// A vehicle-insurance quote as exchanged with the quotes API.
///
/// Timestamps are kept exactly as the server sent them. Fields this client
/// does not know about are carried in `extra` so a full-payload update sends
/// them back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: String,
    pub client_info: ClientInfo,
    pub vehicle_info: VehicleInfo,
    #[serde(default)]
    pub status: QuoteStatus,

    // Pricing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_premium: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_premium: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    // Advisor-entered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insured_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advisor_notes: Option<String>,

    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Quote {
    /// Whether the quote still awaits pricing by an advisor
    pub fn is_lead(&self) -> bool {
        self.status == QuoteStatus::Lead
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_status_transitions_only_move_forward() {
        use QuoteStatus::*;
        assert!(Lead.can_transition_to(Pending));
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));

        assert!(!Lead.can_transition_to(Approved));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Lead));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("APPROVED".parse::<QuoteStatus>().unwrap(), QuoteStatus::Approved);
        assert!("archived".parse::<QuoteStatus>().is_err());
    }

    #[test]
    fn test_local_shape_deserializes_as_lead() {
        // The early mock records had no status or pricing at all
        let quote: Quote = serde_json::from_value(json!({
            "id": "1",
            "clientInfo": {
                "hasPlate": false,
                "documentNumber": "12345678",
                "phoneNumber": "999888777"
            },
            "vehicleInfo": {
                "year": 2019,
                "brand": "Kia",
                "model": "Rio",
                "useType": "others"
            },
            "createdAt": "2024-03-20T10:30:00"
        }))
        .unwrap();

        assert!(quote.is_lead());
        assert_eq!(quote.client_info.plate, None);
        assert_eq!(quote.vehicle_info.use_type, UseType::Others);
        assert!(quote.extra.is_empty());
    }

    #[test]
    fn test_unknown_fields_survive_a_round_trip() {
        let source = json!({
            "id": "q-9",
            "clientInfo": {
                "hasPlate": true,
                "plate": "XYZ987",
                "documentNumber": "87654321",
                "phoneNumber": "911222333"
            },
            "vehicleInfo": {
                "year": 2021,
                "brand": "Honda",
                "model": "Civic",
                "useType": "personal"
            },
            "status": "pending",
            "finalPremium": 640.5,
            "createdAt": "2024-05-01T08:00:00Z",
            "channel": "web",
            "advisorId": 42
        });

        let quote: Quote = serde_json::from_value(source.clone()).unwrap();
        assert_eq!(quote.extra.get("channel"), Some(&json!("web")));
        assert_eq!(serde_json::to_value(&quote).unwrap(), source);
    }
}
