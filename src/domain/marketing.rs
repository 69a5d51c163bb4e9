use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "campaign_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Draft,
    Active,
    Paused,
    Finished,
}

impl CampaignStatus {
    /// Allowed lifecycle transitions; anything else is a caller error.
    pub fn can_transition_to(&self, next: CampaignStatus) -> bool {
        matches!(
            (self, next),
            (CampaignStatus::Draft, CampaignStatus::Active)
                | (CampaignStatus::Active, CampaignStatus::Paused)
                | (CampaignStatus::Active, CampaignStatus::Finished)
                | (CampaignStatus::Paused, CampaignStatus::Active)
                | (CampaignStatus::Paused, CampaignStatus::Finished)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Campaign {
    pub id: i64,
    pub name: String,
    pub campaign_type: String,
    pub channel: Option<String>,
    pub budget: Decimal,
    pub spent: Decimal,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub status: CampaignStatus,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "lead_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    New,
    Contacted,
    Converted,
    Lost,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Lead {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub source: Option<String>,
    pub campaign_id: Option<i64>,
    pub status: LeadStatus,
    pub converted_student_id: Option<i64>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ad_position", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AdPosition {
    HomeBanner,
    Popup,
    Sidebar,
}

impl AdPosition {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "home_banner" => Some(AdPosition::HomeBanner),
            "popup" => Some(AdPosition::Popup),
            "sidebar" => Some(AdPosition::Sidebar),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ad_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AdStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Advertisement {
    pub id: i64,
    pub title: String,
    pub image_url: String,
    pub link_url: Option<String>,
    pub position: AdPosition,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: AdStatus,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn campaign_transitions_follow_lifecycle() {
        assert!(CampaignStatus::Draft.can_transition_to(CampaignStatus::Active));
        assert!(CampaignStatus::Active.can_transition_to(CampaignStatus::Paused));
        assert!(CampaignStatus::Paused.can_transition_to(CampaignStatus::Active));
        assert!(CampaignStatus::Active.can_transition_to(CampaignStatus::Finished));
        assert!(CampaignStatus::Paused.can_transition_to(CampaignStatus::Finished));

        assert!(!CampaignStatus::Draft.can_transition_to(CampaignStatus::Paused));
        assert!(!CampaignStatus::Draft.can_transition_to(CampaignStatus::Finished));
        assert!(!CampaignStatus::Finished.can_transition_to(CampaignStatus::Active));
        assert!(!CampaignStatus::Active.can_transition_to(CampaignStatus::Draft));
    }

    #[test]
    fn ad_position_parse_accepts_known_slots() {
        assert_eq!(AdPosition::parse("home_banner"), Some(AdPosition::HomeBanner));
        assert_eq!(AdPosition::parse("popup"), Some(AdPosition::Popup));
        assert_eq!(AdPosition::parse("sidebar"), Some(AdPosition::Sidebar));
        assert_eq!(AdPosition::parse("footer"), None);
    }
}
