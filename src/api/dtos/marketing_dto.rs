use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::common::{default_page, default_page_size, enum_str, PaginationParams};
use crate::domain::{Advertisement, Campaign, Lead};
use crate::infrastructure::repositories::CampaignFunnel;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaignRequest {
    pub name: Option<String>,
    pub campaign_type: Option<String>,
    pub channel: Option<String>,
    pub budget: Option<Decimal>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCampaignRequest {
    pub name: Option<String>,
    pub campaign_type: Option<String>,
    pub channel: Option<String>,
    pub budget: Option<Decimal>,
    pub spent: Option<Decimal>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    pub status: Option<String>,
}

impl CampaignListQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignResponse {
    pub id: i64,
    pub name: String,
    pub campaign_type: String,
    pub channel: Option<String>,
    pub budget: Decimal,
    pub spent: Decimal,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub status: String,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&Campaign> for CampaignResponse {
    fn from(campaign: &Campaign) -> Self {
        Self {
            id: campaign.id,
            name: campaign.name.clone(),
            campaign_type: campaign.campaign_type.clone(),
            channel: campaign.channel.clone(),
            budget: campaign.budget,
            spent: campaign.spent,
            start_time: campaign.start_time,
            end_time: campaign.end_time,
            description: campaign.description.clone(),
            status: enum_str(&campaign.status),
            created_by: campaign.created_by,
            created_at: campaign.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignStatsResponse {
    pub campaign_id: i64,
    pub name: String,
    pub budget: Decimal,
    pub spent: Decimal,
    pub lead_count: i64,
    pub converted_count: i64,
}

impl From<&CampaignFunnel> for CampaignStatsResponse {
    fn from(row: &CampaignFunnel) -> Self {
        Self {
            campaign_id: row.campaign_id,
            name: row.name.clone(),
            budget: row.budget,
            spent: row.spent,
            lead_count: row.lead_count,
            converted_count: row.converted_count,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub campaign_id: Option<i64>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub campaign_id: Option<i64>,
    pub status: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertLeadRequest {
    pub student_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    pub search: Option<String>,
    pub status: Option<String>,
    pub campaign_id: Option<i64>,
}

impl LeadListQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadResponse {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub source: Option<String>,
    pub campaign_id: Option<i64>,
    pub status: String,
    pub converted_student_id: Option<i64>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Lead> for LeadResponse {
    fn from(lead: &Lead) -> Self {
        Self {
            id: lead.id,
            name: lead.name.clone(),
            phone: lead.phone.clone(),
            source: lead.source.clone(),
            campaign_id: lead.campaign_id,
            status: enum_str(&lead.status),
            converted_student_id: lead.converted_student_id,
            note: lead.note.clone(),
            created_at: lead.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdRequest {
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub position: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdRequest {
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub position: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    pub position: Option<String>,
    pub status: Option<String>,
}

impl AdListQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdResponse {
    pub id: i64,
    pub title: String,
    pub image_url: String,
    pub link_url: Option<String>,
    pub position: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&Advertisement> for AdResponse {
    fn from(ad: &Advertisement) -> Self {
        Self {
            id: ad.id,
            title: ad.title.clone(),
            image_url: ad.image_url.clone(),
            link_url: ad.link_url.clone(),
            position: enum_str(&ad.position),
            start_time: ad.start_time,
            end_time: ad.end_time,
            status: enum_str(&ad.status),
            created_by: ad.created_by,
            created_at: ad.created_at,
        }
    }
}
