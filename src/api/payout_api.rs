// ==========================================
// 推广员佣金结算引擎 - 结算 API
// ==========================================
// 职责: 模板/分配/推广员维护 + 活动结算 + 汇总
// 流程: 仓储读取 → TemplateResolver → PayoutRunner → Aggregator
// 并发: run_events 每场活动一个 spawn_blocking 任务
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::ConfigManager;
use crate::config::settings_reader::CommissionSettingsReader;
use crate::config::template_resolver::TemplateResolver;
use crate::domain::attribution::EventActivity;
use crate::domain::commission::{CommissionConfig, CommissionTemplate, EventPromoterAssignment};
use crate::domain::payout::{AggregateRow, EventPayoutReport, PayoutResult};
use crate::domain::promoter::{Promoter, PromoterDirectory};
use crate::domain::types::GroupBy;
use crate::engine::aggregator::Aggregator;
use crate::engine::commission_calculator::CommissionCalculator;
use crate::engine::config_validator::ConfigValidator;
use crate::engine::payout_run::PayoutRunner;
use crate::repository::{AssignmentRepository, CommissionTemplateRepository, PromoterRepository};
use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use rusqlite::Connection;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::{info, instrument};

// ==========================================
// PayoutApi - 结算 API
// ==========================================
pub struct PayoutApi {
    template_repo: Arc<CommissionTemplateRepository>,
    assignment_repo: Arc<AssignmentRepository>,
    promoter_repo: Arc<PromoterRepository>,
    settings: Arc<dyn CommissionSettingsReader>,
    validator: ConfigValidator,
    resolver: TemplateResolver,
    aggregator: Aggregator,
}

impl PayoutApi {
    /// 打开数据库文件并建表
    pub fn open(db_path: &str) -> ApiResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 从已有连接创建（配置读取使用同一连接上的 config_kv）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ApiError::InternalError(format!("锁获取失败: {}", e)))?;
            crate::db::ensure_schema(&guard)
                .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        }

        let settings = Arc::new(ConfigManager::from_connection(conn.clone())?);
        Ok(Self::with_settings(conn, settings))
    }

    /// 使用自定义配置读取器（测试可注入 mock）
    pub fn with_settings(
        conn: Arc<Mutex<Connection>>,
        settings: Arc<dyn CommissionSettingsReader>,
    ) -> Self {
        Self {
            template_repo: Arc::new(CommissionTemplateRepository::from_connection(conn.clone())),
            assignment_repo: Arc::new(AssignmentRepository::from_connection(conn.clone())),
            promoter_repo: Arc::new(PromoterRepository::from_connection(conn)),
            settings,
            validator: ConfigValidator::new(),
            resolver: TemplateResolver::new(),
            aggregator: Aggregator::new(),
        }
    }

    // ==========================================
    // 模板维护
    // ==========================================

    /// 保存模板（先校验，config.id 统一为 template_id）
    ///
    /// created_at 在首次保存时生效，updated_at 每次刷新
    pub fn save_template(&self, mut template: CommissionTemplate) -> ApiResult<CommissionTemplate> {
        template.template_id = template.template_id.trim().to_string();
        if template.template_id.is_empty() {
            return Err(ApiError::InvalidInput("template_id 不能为空".to_string()));
        }
        if template.name.trim().is_empty() {
            return Err(ApiError::InvalidInput("name 不能为空".to_string()));
        }

        template.config.id = template.template_id.clone();
        self.validator.validate(&template.config)?;

        template.updated_at = Utc::now();
        if let Some(existing) = self.template_repo.find_by_id(&template.template_id)? {
            template.created_at = existing.created_at;
        }
        self.template_repo.upsert(&template)?;

        info!(template_id = %template.template_id, "佣金模板已保存");
        Ok(template)
    }

    pub fn get_template(&self, template_id: &str) -> ApiResult<CommissionTemplate> {
        self.template_repo
            .find_by_id(template_id)?
            .ok_or_else(|| ApiError::NotFound(format!("CommissionTemplate(id={})", template_id)))
    }

    pub fn list_templates(&self) -> ApiResult<Vec<CommissionTemplate>> {
        Ok(self.template_repo.list()?)
    }

    /// 删除模板（仍被分配引用时拒绝）
    pub fn delete_template(&self, template_id: &str) -> ApiResult<()> {
        if !self.template_repo.delete(template_id)? {
            return Err(ApiError::NotFound(format!(
                "CommissionTemplate(id={})",
                template_id
            )));
        }
        Ok(())
    }

    // ==========================================
    // 分配与推广员
    // ==========================================

    /// 分配推广员到活动
    ///
    /// 保存前解析并校验生效配置，确保结算时不会因配置失败
    pub fn assign(&self, mut assignment: EventPromoterAssignment) -> ApiResult<CommissionConfig> {
        assignment.event_id = assignment.event_id.trim().to_string();
        assignment.promoter_id = assignment.promoter_id.trim().to_string();
        assignment.template_id = assignment
            .template_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        if assignment.event_id.is_empty() || assignment.promoter_id.is_empty() {
            return Err(ApiError::InvalidInput(
                "event_id 与 promoter_id 不能为空".to_string(),
            ));
        }

        let config = self.resolve_assignment(&assignment)?;
        self.validator.validate(&config)?;
        self.assignment_repo.upsert(&assignment)?;

        info!(
            event_id = %assignment.event_id,
            promoter_id = %assignment.promoter_id,
            config_id = %config.id,
            "推广员分配已保存"
        );
        Ok(config)
    }

    pub fn unassign(&self, event_id: &str, promoter_id: &str) -> ApiResult<bool> {
        Ok(self.assignment_repo.delete(event_id, promoter_id)?)
    }

    /// 保存推广员（拒绝形成上级环）
    pub fn save_promoter(&self, promoter: Promoter) -> ApiResult<()> {
        if promoter.promoter_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("promoter_id 不能为空".to_string()));
        }

        let mut directory = self.promoter_repo.load_directory()?;
        directory.set_parent(
            &promoter.promoter_id,
            promoter.parent_id.as_deref().unwrap_or_default(),
        );
        self.aggregator.ancestors(&promoter.promoter_id, &directory)?;

        self.promoter_repo.upsert(&promoter)?;
        Ok(())
    }

    pub fn list_promoters(&self) -> ApiResult<Vec<Promoter>> {
        Ok(self.promoter_repo.list()?)
    }

    // ==========================================
    // 结算
    // ==========================================

    /// 活动所有分配的生效配置（promoter_id → config）
    pub fn resolve_event_configs(
        &self,
        event_id: &str,
    ) -> ApiResult<BTreeMap<String, CommissionConfig>> {
        let mut configs = BTreeMap::new();
        for assignment in self.assignment_repo.list_by_event(event_id)? {
            let config = self.resolve_assignment(&assignment)?;
            configs.insert(assignment.promoter_id, config);
        }
        Ok(configs)
    }

    /// 单场活动结算
    #[instrument(skip(self, activity), fields(event_id = %activity.event_id))]
    pub async fn calculate_event(&self, activity: &EventActivity) -> ApiResult<EventPayoutReport> {
        let runner = self.build_runner().await?;
        let configs = self.resolve_event_configs(&activity.event_id)?;
        Ok(runner.run_event(activity, &configs)?)
    }

    /// 多场活动并发结算
    ///
    /// 配置在当前任务内解析，计算在阻塞线程池执行；返回顺序与输入一致
    #[instrument(skip(self, activities), fields(event_count = activities.len()))]
    pub async fn run_events(
        &self,
        activities: Vec<EventActivity>,
    ) -> ApiResult<Vec<EventPayoutReport>> {
        let runner = Arc::new(self.build_runner().await?);

        let mut handles = Vec::with_capacity(activities.len());
        for activity in activities {
            let configs = self.resolve_event_configs(&activity.event_id)?;
            let runner = Arc::clone(&runner);
            handles.push(tokio::task::spawn_blocking(move || {
                runner.run_event(&activity, &configs)
            }));
        }

        let mut reports = Vec::with_capacity(handles.len());
        for joined in join_all(handles).await {
            let report = joined
                .map_err(|e| ApiError::InternalError(format!("结算任务失败: {}", e)))??;
            reports.push(report);
        }

        info!(reports = reports.len(), "批量结算完成");
        Ok(reports)
    }

    /// 汇总结算结果（可选活动日期范围）
    ///
    /// PromoterTree 分组时从推广员表加载上下级关系
    pub fn aggregate(
        &self,
        results: &[PayoutResult],
        group_by: GroupBy,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> ApiResult<Vec<AggregateRow>> {
        if let (Some(f), Some(t)) = (from, to) {
            if f > t {
                return Err(ApiError::InvalidInput(format!(
                    "日期范围无效: {} > {}",
                    f, t
                )));
            }
        }

        let directory = match group_by {
            GroupBy::Promoter => PromoterDirectory::new(),
            GroupBy::PromoterTree => self.promoter_repo.load_directory()?,
        };
        Ok(self
            .aggregator
            .aggregate_range(results, group_by, &directory, from, to)?)
    }

    async fn build_runner(&self) -> ApiResult<PayoutRunner> {
        let minor_units = self.settings.get_minor_unit_table().await?;
        let fail_on_unassigned = self.settings.get_fail_on_unassigned().await?;
        Ok(
            PayoutRunner::new(CommissionCalculator::with_minor_units(minor_units))
                .fail_on_unassigned(fail_on_unassigned),
        )
    }

    fn resolve_assignment(&self, assignment: &EventPromoterAssignment) -> ApiResult<CommissionConfig> {
        let template = match assignment.template_id.as_deref() {
            Some(template_id) => Some(self.get_template(template_id)?),
            None => None,
        };

        Ok(self.resolver.resolve(
            template.as_ref(),
            assignment.override_config.as_ref(),
            &assignment.event_id,
            &assignment.promoter_id,
        )?)
    }
}
