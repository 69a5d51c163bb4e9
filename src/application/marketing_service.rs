use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

use crate::api::dtos::{
    AdListQuery, AdResponse, CampaignListQuery, CampaignResponse, CampaignStatsResponse,
    ConvertLeadRequest, CreateAdRequest, CreateCampaignRequest, CreateLeadRequest, LeadListQuery,
    LeadResponse, Paged, UpdateAdRequest, UpdateCampaignRequest, UpdateLeadRequest,
};
use crate::domain::{
    is_valid_cn_mobile, AdPosition, AdStatus, Advertisement, Campaign, CampaignStatus, Lead,
    LeadStatus,
};
use crate::error::{AppError, AppResult};
use crate::infrastructure::repositories::{
    AdvertisementRepository, CampaignRepository, LeadRepository, LeadSearchParams,
    StudentRepository,
};

#[derive(Clone)]
pub struct MarketingService {
    campaign_repo: Arc<dyn CampaignRepository>,
    lead_repo: Arc<dyn LeadRepository>,
    ad_repo: Arc<dyn AdvertisementRepository>,
    student_repo: Arc<dyn StudentRepository>,
}

impl MarketingService {
    pub fn new(
        campaign_repo: Arc<dyn CampaignRepository>,
        lead_repo: Arc<dyn LeadRepository>,
        ad_repo: Arc<dyn AdvertisementRepository>,
        student_repo: Arc<dyn StudentRepository>,
    ) -> Self {
        Self {
            campaign_repo,
            lead_repo,
            ad_repo,
            student_repo,
        }
    }

    pub async fn create_campaign(
        &self,
        request: CreateCampaignRequest,
        created_by: i64,
    ) -> AppResult<CampaignResponse> {
        let name = request
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| AppError::MissingFields("活动名称不能为空".to_string()))?;
        let campaign_type = request
            .campaign_type
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::MissingFields("活动类型不能为空".to_string()))?;
        validate_time_window(request.start_time, request.end_time)?;

        let now = Utc::now();
        let campaign = Campaign {
            id: 0,
            name,
            campaign_type,
            channel: request.channel,
            budget: request.budget.unwrap_or(Decimal::ZERO),
            spent: Decimal::ZERO,
            start_time: request.start_time,
            end_time: request.end_time,
            description: request.description,
            status: CampaignStatus::Draft,
            created_by,
            created_at: now,
            updated_at: now,
        };

        let created = self.campaign_repo.create(&campaign).await?;
        info!(campaign_id = created.id, "campaign created");
        Ok(CampaignResponse::from(&created))
    }

    pub async fn get_campaign(&self, id: i64) -> AppResult<CampaignResponse> {
        let campaign = self.require_campaign(id).await?;
        Ok(CampaignResponse::from(&campaign))
    }

    pub async fn list_campaigns(
        &self,
        query: &CampaignListQuery,
    ) -> AppResult<Paged<CampaignResponse>> {
        let status = match query.status.as_deref() {
            Some(value) => Some(parse_campaign_status(value)?),
            None => None,
        };

        let pagination = query.pagination();
        let (limit, offset) = pagination.limit_offset();
        let campaigns = self.campaign_repo.list(status, limit, offset).await?;
        let total = self.campaign_repo.count(status).await?;

        let items = campaigns.iter().map(CampaignResponse::from).collect();
        Ok(Paged::new(items, total, &pagination))
    }

    pub async fn update_campaign(
        &self,
        id: i64,
        request: UpdateCampaignRequest,
    ) -> AppResult<CampaignResponse> {
        let mut campaign = self.require_campaign(id).await?;

        if let Some(name) = request.name {
            if name.trim().is_empty() {
                return Err(AppError::BadRequest("活动名称不能为空".to_string()));
            }
            campaign.name = name;
        }
        if let Some(campaign_type) = request.campaign_type {
            campaign.campaign_type = campaign_type;
        }
        if let Some(channel) = request.channel {
            campaign.channel = Some(channel);
        }
        if let Some(budget) = request.budget {
            campaign.budget = budget;
        }
        if let Some(spent) = request.spent {
            campaign.spent = spent;
        }
        if let Some(start_time) = request.start_time {
            campaign.start_time = Some(start_time);
        }
        if let Some(end_time) = request.end_time {
            campaign.end_time = Some(end_time);
        }
        validate_time_window(campaign.start_time, campaign.end_time)?;
        if let Some(description) = request.description {
            campaign.description = Some(description);
        }

        let updated = self.campaign_repo.update(&campaign).await?;
        Ok(CampaignResponse::from(&updated))
    }

    pub async fn update_campaign_status(&self, id: i64, status: &str) -> AppResult<CampaignResponse> {
        let mut campaign = self.require_campaign(id).await?;
        let next = parse_campaign_status(status)?;
        if !campaign.status.can_transition_to(next) {
            return Err(AppError::BadRequest("活动状态流转无效".to_string()));
        }
        self.campaign_repo.update_status(id, next).await?;
        campaign.status = next;
        info!(campaign_id = id, status = %status, "campaign status changed");
        Ok(CampaignResponse::from(&campaign))
    }

    /// Clones a campaign back to draft with a "副本" suffix on the name.
    pub async fn duplicate_campaign(&self, id: i64, created_by: i64) -> AppResult<CampaignResponse> {
        let source = self.require_campaign(id).await?;

        let now = Utc::now();
        let copy = Campaign {
            id: 0,
            name: format!("{}副本", source.name),
            campaign_type: source.campaign_type.clone(),
            channel: source.channel.clone(),
            budget: source.budget,
            spent: Decimal::ZERO,
            start_time: source.start_time,
            end_time: source.end_time,
            description: source.description.clone(),
            status: CampaignStatus::Draft,
            created_by,
            created_at: now,
            updated_at: now,
        };

        let created = self.campaign_repo.create(&copy).await?;
        info!(campaign_id = id, copy_id = created.id, "campaign duplicated");
        Ok(CampaignResponse::from(&created))
    }

    pub async fn delete_campaign(&self, id: i64) -> AppResult<()> {
        self.require_campaign(id).await?;
        self.campaign_repo.delete(id).await?;
        Ok(())
    }

    pub async fn campaign_stats(&self) -> AppResult<Vec<CampaignStatsResponse>> {
        let funnel = self.campaign_repo.funnel().await?;
        Ok(funnel.iter().map(CampaignStatsResponse::from).collect())
    }

    pub async fn create_lead(&self, request: CreateLeadRequest) -> AppResult<LeadResponse> {
        let name = request
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| AppError::MissingFields("姓名不能为空".to_string()))?;
        let phone = request
            .phone
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| AppError::MissingFields("电话不能为空".to_string()))?;
        if !is_valid_cn_mobile(&phone) {
            return Err(AppError::BadRequest("手机号格式无效".to_string()));
        }
        if let Some(campaign_id) = request.campaign_id {
            self.require_campaign(campaign_id).await?;
        }

        let now = Utc::now();
        let lead = Lead {
            id: 0,
            name,
            phone,
            source: request.source,
            campaign_id: request.campaign_id,
            status: LeadStatus::New,
            converted_student_id: None,
            note: request.note,
            created_at: now,
            updated_at: now,
        };

        let created = self.lead_repo.create(&lead).await?;
        Ok(LeadResponse::from(&created))
    }

    pub async fn get_lead(&self, id: i64) -> AppResult<LeadResponse> {
        let lead = self.require_lead(id).await?;
        Ok(LeadResponse::from(&lead))
    }

    pub async fn list_leads(&self, query: &LeadListQuery) -> AppResult<Paged<LeadResponse>> {
        let params = LeadSearchParams {
            search: query.search.clone().filter(|s| !s.is_empty()),
            status: match query.status.as_deref() {
                Some(value) => Some(parse_lead_status(value)?),
                None => None,
            },
            campaign_id: query.campaign_id,
        };

        let pagination = query.pagination();
        let (limit, offset) = pagination.limit_offset();
        let leads = self.lead_repo.list(&params, limit, offset).await?;
        let total = self.lead_repo.count(&params).await?;

        let items = leads.iter().map(LeadResponse::from).collect();
        Ok(Paged::new(items, total, &pagination))
    }

    pub async fn update_lead(&self, id: i64, request: UpdateLeadRequest) -> AppResult<LeadResponse> {
        let mut lead = self.require_lead(id).await?;

        if let Some(name) = request.name {
            lead.name = name;
        }
        if let Some(phone) = request.phone {
            if !is_valid_cn_mobile(&phone) {
                return Err(AppError::BadRequest("手机号格式无效".to_string()));
            }
            lead.phone = phone;
        }
        if let Some(source) = request.source {
            lead.source = Some(source);
        }
        if let Some(campaign_id) = request.campaign_id {
            self.require_campaign(campaign_id).await?;
            lead.campaign_id = Some(campaign_id);
        }
        if let Some(ref status) = request.status {
            lead.status = parse_lead_status(status)?;
        }
        if let Some(note) = request.note {
            lead.note = Some(note);
        }

        let updated = self.lead_repo.update(&lead).await?;
        Ok(LeadResponse::from(&updated))
    }

    /// Links a lead to the student record it converted into.
    pub async fn convert_lead(
        &self,
        id: i64,
        request: ConvertLeadRequest,
    ) -> AppResult<LeadResponse> {
        let mut lead = self.require_lead(id).await?;
        if lead.status == LeadStatus::Converted {
            return Err(AppError::Conflict("该线索已转化".to_string()));
        }

        let student_id = request
            .student_id
            .ok_or_else(|| AppError::MissingFields("学生ID不能为空".to_string()))?;
        if self.student_repo.find_by_id(student_id).await?.is_none() {
            return Err(AppError::BadRequest("学生不存在".to_string()));
        }

        lead.status = LeadStatus::Converted;
        lead.converted_student_id = Some(student_id);
        let updated = self.lead_repo.update(&lead).await?;
        info!(lead_id = id, student_id, "lead converted");
        Ok(LeadResponse::from(&updated))
    }

    pub async fn delete_lead(&self, id: i64) -> AppResult<()> {
        self.require_lead(id).await?;
        self.lead_repo.delete(id).await?;
        Ok(())
    }

    pub async fn create_ad(&self, request: CreateAdRequest, created_by: i64) -> AppResult<AdResponse> {
        let title = request
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::MissingFields("广告标题不能为空".to_string()))?;
        let image_url = request
            .image_url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| AppError::MissingFields("广告图片不能为空".to_string()))?;
        let position = parse_ad_position(
            request
                .position
                .as_deref()
                .ok_or_else(|| AppError::MissingFields("广告位置不能为空".to_string()))?,
        )?;
        let start_time = request
            .start_time
            .ok_or_else(|| AppError::MissingFields("开始时间不能为空".to_string()))?;
        let end_time = request
            .end_time
            .ok_or_else(|| AppError::MissingFields("结束时间不能为空".to_string()))?;
        if end_time <= start_time {
            return Err(AppError::BadRequest(
                "结束时间必须晚于开始时间".to_string(),
            ));
        }

        let now = Utc::now();
        let ad = Advertisement {
            id: 0,
            title,
            image_url,
            link_url: request.link_url,
            position,
            start_time,
            end_time,
            status: AdStatus::Active,
            created_by,
            created_at: now,
            updated_at: now,
        };

        let created = self.ad_repo.create(&ad).await?;
        Ok(AdResponse::from(&created))
    }

    pub async fn list_ads(&self, query: &AdListQuery) -> AppResult<Paged<AdResponse>> {
        let position = match query.position.as_deref() {
            Some(value) => Some(parse_ad_position(value)?),
            None => None,
        };
        let status = match query.status.as_deref() {
            Some("active") => Some(AdStatus::Active),
            Some("inactive") => Some(AdStatus::Inactive),
            Some(_) => return Err(AppError::BadRequest("状态无效".to_string())),
            None => None,
        };

        let pagination = query.pagination();
        let (limit, offset) = pagination.limit_offset();
        let ads = self.ad_repo.list(position, status, limit, offset).await?;
        let total = self.ad_repo.count(position, status).await?;

        let items = ads.iter().map(AdResponse::from).collect();
        Ok(Paged::new(items, total, &pagination))
    }

    /// Ads currently within their display window, for the public surface.
    pub async fn live_ads(&self, position: &str) -> AppResult<Vec<AdResponse>> {
        let position = parse_ad_position(position)?;
        let ads = self.ad_repo.list_live(position, Utc::now()).await?;
        Ok(ads.iter().map(AdResponse::from).collect())
    }

    pub async fn update_ad(&self, id: i64, request: UpdateAdRequest) -> AppResult<AdResponse> {
        let mut ad = self
            .ad_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("广告不存在".to_string()))?;

        if let Some(title) = request.title {
            ad.title = title;
        }
        if let Some(image_url) = request.image_url {
            ad.image_url = image_url;
        }
        if let Some(link_url) = request.link_url {
            ad.link_url = Some(link_url);
        }
        if let Some(ref position) = request.position {
            ad.position = parse_ad_position(position)?;
        }
        if let Some(start_time) = request.start_time {
            ad.start_time = start_time;
        }
        if let Some(end_time) = request.end_time {
            ad.end_time = end_time;
        }
        if ad.end_time <= ad.start_time {
            return Err(AppError::BadRequest(
                "结束时间必须晚于开始时间".to_string(),
            ));
        }
        if let Some(ref status) = request.status {
            ad.status = match status.as_str() {
                "active" => AdStatus::Active,
                "inactive" => AdStatus::Inactive,
                _ => return Err(AppError::BadRequest("状态无效".to_string())),
            };
        }

        let updated = self.ad_repo.update(&ad).await?;
        Ok(AdResponse::from(&updated))
    }

    pub async fn delete_ad(&self, id: i64) -> AppResult<()> {
        if self.ad_repo.find_by_id(id).await?.is_none() {
            return Err(AppError::NotFound("广告不存在".to_string()));
        }
        self.ad_repo.delete(id).await?;
        Ok(())
    }

    async fn require_campaign(&self, id: i64) -> AppResult<Campaign> {
        self.campaign_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("营销活动不存在".to_string()))
    }

    async fn require_lead(&self, id: i64) -> AppResult<Lead> {
        self.lead_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("线索不存在".to_string()))
    }
}

fn validate_time_window(
    start: Option<chrono::DateTime<Utc>>,
    end: Option<chrono::DateTime<Utc>>,
) -> AppResult<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end <= start {
            return Err(AppError::BadRequest(
                "结束时间必须晚于开始时间".to_string(),
            ));
        }
    }
    Ok(())
}

fn parse_campaign_status(value: &str) -> AppResult<CampaignStatus> {
    match value {
        "draft" => Ok(CampaignStatus::Draft),
        "active" => Ok(CampaignStatus::Active),
        "paused" => Ok(CampaignStatus::Paused),
        "finished" => Ok(CampaignStatus::Finished),
        _ => Err(AppError::BadRequest("活动状态无效".to_string())),
    }
}

fn parse_lead_status(value: &str) -> AppResult<LeadStatus> {
    match value {
        "new" => Ok(LeadStatus::New),
        "contacted" => Ok(LeadStatus::Contacted),
        "converted" => Ok(LeadStatus::Converted),
        "lost" => Ok(LeadStatus::Lost),
        _ => Err(AppError::BadRequest("线索状态无效".to_string())),
    }
}

fn parse_ad_position(value: &str) -> AppResult<AdPosition> {
    AdPosition::parse(value)
        .ok_or_else(|| AppError::BadRequest("广告位置无效".to_string()))
}
