use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::traits::{
    AdvertisementRepository, CampaignFunnel, CampaignRepository, LeadRepository, LeadSearchParams,
};
use super::utils::escape_like_pattern;
use crate::domain::{AdPosition, AdStatus, Advertisement, Campaign, CampaignStatus, Lead};
use crate::error::AppResult;

const CAMPAIGN_COLUMNS: &str = "id, name, campaign_type, channel, budget, spent, start_time, end_time, description, status, created_by, created_at, updated_at";

pub struct CampaignRepositoryImpl {
    pool: PgPool,
}

impl CampaignRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CampaignRepository for CampaignRepositoryImpl {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Campaign>> {
        let campaign = sqlx::query_as::<_, Campaign>(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM marketing_campaigns WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(campaign)
    }

    async fn create(&self, campaign: &Campaign) -> AppResult<Campaign> {
        let created = sqlx::query_as::<_, Campaign>(&format!(
            r#"
            INSERT INTO marketing_campaigns (name, campaign_type, channel, budget, spent, start_time, end_time, description, status, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {CAMPAIGN_COLUMNS}
            "#
        ))
        .bind(&campaign.name)
        .bind(&campaign.campaign_type)
        .bind(&campaign.channel)
        .bind(campaign.budget)
        .bind(campaign.spent)
        .bind(campaign.start_time)
        .bind(campaign.end_time)
        .bind(&campaign.description)
        .bind(campaign.status)
        .bind(campaign.created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update(&self, campaign: &Campaign) -> AppResult<Campaign> {
        let updated = sqlx::query_as::<_, Campaign>(&format!(
            r#"
            UPDATE marketing_campaigns
            SET name = $2, campaign_type = $3, channel = $4, budget = $5, spent = $6,
                start_time = $7, end_time = $8, description = $9, updated_at = NOW()
            WHERE id = $1
            RETURNING {CAMPAIGN_COLUMNS}
            "#
        ))
        .bind(campaign.id)
        .bind(&campaign.name)
        .bind(&campaign.campaign_type)
        .bind(&campaign.channel)
        .bind(campaign.budget)
        .bind(campaign.spent)
        .bind(campaign.start_time)
        .bind(campaign.end_time)
        .bind(&campaign.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn update_status(&self, id: i64, status: CampaignStatus) -> AppResult<()> {
        sqlx::query(
            "UPDATE marketing_campaigns SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM marketing_campaigns WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(
        &self,
        status: Option<CampaignStatus>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Campaign>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM marketing_campaigns WHERE 1=1"
        ));
        if let Some(status) = status {
            builder.push(" AND status = ");
            builder.push_bind(status);
        }
        builder.push(" ORDER BY created_at DESC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let campaigns = builder
            .build_query_as::<Campaign>()
            .fetch_all(&self.pool)
            .await?;
        Ok(campaigns)
    }

    async fn count(&self, status: Option<CampaignStatus>) -> AppResult<i64> {
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM marketing_campaigns WHERE 1=1");
        if let Some(status) = status {
            builder.push(" AND status = ");
            builder.push_bind(status);
        }

        let count: i64 = builder.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn funnel(&self) -> AppResult<Vec<CampaignFunnel>> {
        let rows = sqlx::query_as::<_, CampaignFunnel>(
            r#"
            SELECT c.id AS campaign_id, c.name, c.budget, c.spent,
                   COUNT(l.id) AS lead_count,
                   COUNT(l.id) FILTER (WHERE l.status = 'converted') AS converted_count
            FROM marketing_campaigns c
            LEFT JOIN marketing_leads l ON l.campaign_id = c.id
            GROUP BY c.id, c.name, c.budget, c.spent
            ORDER BY c.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

const LEAD_COLUMNS: &str = "id, name, phone, source, campaign_id, status, converted_student_id, note, created_at, updated_at";

pub struct LeadRepositoryImpl {
    pool: PgPool,
}

impl LeadRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_lead_filters(builder: &mut QueryBuilder<'_, Postgres>, params: &LeadSearchParams) {
    if let Some(ref search) = params.search {
        let pattern = format!("%{}%", escape_like_pattern(search));
        builder.push(" AND (name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR phone LIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }
    if let Some(status) = params.status {
        builder.push(" AND status = ");
        builder.push_bind(status);
    }
    if let Some(campaign_id) = params.campaign_id {
        builder.push(" AND campaign_id = ");
        builder.push_bind(campaign_id);
    }
}

#[async_trait]
impl LeadRepository for LeadRepositoryImpl {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Lead>> {
        let lead = sqlx::query_as::<_, Lead>(&format!(
            "SELECT {LEAD_COLUMNS} FROM marketing_leads WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(lead)
    }

    async fn create(&self, lead: &Lead) -> AppResult<Lead> {
        let created = sqlx::query_as::<_, Lead>(&format!(
            r#"
            INSERT INTO marketing_leads (name, phone, source, campaign_id, status, note)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {LEAD_COLUMNS}
            "#
        ))
        .bind(&lead.name)
        .bind(&lead.phone)
        .bind(&lead.source)
        .bind(lead.campaign_id)
        .bind(lead.status)
        .bind(&lead.note)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update(&self, lead: &Lead) -> AppResult<Lead> {
        let updated = sqlx::query_as::<_, Lead>(&format!(
            r#"
            UPDATE marketing_leads
            SET name = $2, phone = $3, source = $4, campaign_id = $5, status = $6,
                converted_student_id = $7, note = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING {LEAD_COLUMNS}
            "#
        ))
        .bind(lead.id)
        .bind(&lead.name)
        .bind(&lead.phone)
        .bind(&lead.source)
        .bind(lead.campaign_id)
        .bind(lead.status)
        .bind(lead.converted_student_id)
        .bind(&lead.note)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM marketing_leads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(
        &self,
        params: &LeadSearchParams,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Lead>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {LEAD_COLUMNS} FROM marketing_leads WHERE 1=1"
        ));
        push_lead_filters(&mut builder, params);
        builder.push(" ORDER BY created_at DESC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let leads = builder.build_query_as::<Lead>().fetch_all(&self.pool).await?;
        Ok(leads)
    }

    async fn count(&self, params: &LeadSearchParams) -> AppResult<i64> {
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM marketing_leads WHERE 1=1");
        push_lead_filters(&mut builder, params);

        let count: i64 = builder.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count)
    }
}

const AD_COLUMNS: &str = "id, title, image_url, link_url, position, start_time, end_time, status, created_by, created_at, updated_at";

pub struct AdvertisementRepositoryImpl {
    pool: PgPool,
}

impl AdvertisementRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_ad_filters(
    builder: &mut QueryBuilder<'_, Postgres>,
    position: Option<AdPosition>,
    status: Option<AdStatus>,
) {
    if let Some(position) = position {
        builder.push(" AND position = ");
        builder.push_bind(position);
    }
    if let Some(status) = status {
        builder.push(" AND status = ");
        builder.push_bind(status);
    }
}

#[async_trait]
impl AdvertisementRepository for AdvertisementRepositoryImpl {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Advertisement>> {
        let ad = sqlx::query_as::<_, Advertisement>(&format!(
            "SELECT {AD_COLUMNS} FROM advertisements WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(ad)
    }

    async fn create(&self, ad: &Advertisement) -> AppResult<Advertisement> {
        let created = sqlx::query_as::<_, Advertisement>(&format!(
            r#"
            INSERT INTO advertisements (title, image_url, link_url, position, start_time, end_time, status, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {AD_COLUMNS}
            "#
        ))
        .bind(&ad.title)
        .bind(&ad.image_url)
        .bind(&ad.link_url)
        .bind(ad.position)
        .bind(ad.start_time)
        .bind(ad.end_time)
        .bind(ad.status)
        .bind(ad.created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update(&self, ad: &Advertisement) -> AppResult<Advertisement> {
        let updated = sqlx::query_as::<_, Advertisement>(&format!(
            r#"
            UPDATE advertisements
            SET title = $2, image_url = $3, link_url = $4, position = $5, start_time = $6,
                end_time = $7, status = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING {AD_COLUMNS}
            "#
        ))
        .bind(ad.id)
        .bind(&ad.title)
        .bind(&ad.image_url)
        .bind(&ad.link_url)
        .bind(ad.position)
        .bind(ad.start_time)
        .bind(ad.end_time)
        .bind(ad.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM advertisements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(
        &self,
        position: Option<AdPosition>,
        status: Option<AdStatus>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Advertisement>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {AD_COLUMNS} FROM advertisements WHERE 1=1"
        ));
        push_ad_filters(&mut builder, position, status);
        builder.push(" ORDER BY created_at DESC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let ads = builder
            .build_query_as::<Advertisement>()
            .fetch_all(&self.pool)
            .await?;
        Ok(ads)
    }

    async fn count(
        &self,
        position: Option<AdPosition>,
        status: Option<AdStatus>,
    ) -> AppResult<i64> {
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM advertisements WHERE 1=1");
        push_ad_filters(&mut builder, position, status);

        let count: i64 = builder.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn list_live(
        &self,
        position: AdPosition,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Advertisement>> {
        let ads = sqlx::query_as::<_, Advertisement>(&format!(
            r#"
            SELECT {AD_COLUMNS} FROM advertisements
            WHERE position = $1 AND status = 'active' AND start_time <= $2 AND end_time >= $2
            ORDER BY start_time DESC
            "#
        ))
        .bind(position)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(ads)
    }
}
