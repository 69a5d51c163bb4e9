use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kindergarten_backend::domain::{
    Activity, ActivityCheckIn, ActivityEvaluation, ActivityRegistration, AdPosition, AdStatus,
    Advertisement, AiModelConfig, ApplicationStatus, Campaign, CampaignStatus, ClassUnit,
    EnrollmentApplication, EvaluatorType, FileCategory, Lead, RegistrationStatus, Role,
    StoredFile, Student, SystemConfig, User, UserSession,
};
use kindergarten_backend::error::{AppError, AppResult};
use kindergarten_backend::infrastructure::repositories::{
    ActivityRepository, ActivitySearchParams, AdvertisementRepository, AiModelRepository,
    ApplicationSearchParams, CampaignFunnel, CampaignRepository, CheckInRepository,
    ClassOccupancy, ClassRepository, EnrollmentRepository, EvaluationRepository,
    EvaluationSummary, FileRepository, LeadRepository, LeadSearchParams, MonthlyCount,
    PermissionRepository, RegistrationRepository, SessionRepository, StudentRepository,
    StudentSearchParams, SystemConfigRepository, UserRepository, UserSearchParams,
};
use uuid::Uuid;

fn next_id<T>(items: &[T]) -> i64 {
    items.len() as i64 + 1
}

#[derive(Default)]
pub struct MockUserRepo {
    pub users: Mutex<Vec<User>>,
}

impl MockUserRepo {
    pub fn push(&self, user: User) {
        self.users.lock().expect("users mutex poisoned").push(user);
    }
}

#[async_trait]
impl UserRepository for MockUserRepo {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .expect("users mutex poisoned")
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .expect("users mutex poisoned")
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .expect("users mutex poisoned")
            .iter()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned())
    }

    async fn create(&self, user: &User) -> AppResult<User> {
        let mut users = self.users.lock().expect("users mutex poisoned");
        if users.iter().any(|u| u.username == user.username) {
            return Err(AppError::Conflict("用户名已存在".to_string()));
        }
        if user.email.is_some() && users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("邮箱已被注册".to_string()));
        }
        let mut created = user.clone();
        created.id = next_id(&users);
        users.push(created.clone());
        Ok(created)
    }

    async fn update(&self, user: &User) -> AppResult<User> {
        let mut users = self.users.lock().expect("users mutex poisoned");
        if let Some(existing) = users.iter_mut().find(|u| u.id == user.id) {
            *existing = user.clone();
        }
        Ok(user.clone())
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> AppResult<()> {
        let mut users = self.users.lock().expect("users mutex poisoned");
        if let Some(existing) = users.iter_mut().find(|u| u.id == id) {
            existing.password_hash = password_hash.to_string();
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.users
            .lock()
            .expect("users mutex poisoned")
            .retain(|u| u.id != id);
        Ok(())
    }

    async fn list(
        &self,
        _params: &UserSearchParams,
        _limit: i64,
        _offset: i64,
    ) -> AppResult<Vec<User>> {
        Ok(self.users.lock().expect("users mutex poisoned").clone())
    }

    async fn count(&self, _params: &UserSearchParams) -> AppResult<i64> {
        Ok(self.users.lock().expect("users mutex poisoned").len() as i64)
    }
}

#[derive(Default)]
pub struct MockSessionRepo {
    pub sessions: Mutex<Vec<UserSession>>,
}

#[async_trait]
impl SessionRepository for MockSessionRepo {
    async fn create(&self, session: &UserSession) -> AppResult<UserSession> {
        self.sessions
            .lock()
            .expect("sessions mutex poisoned")
            .push(session.clone());
        Ok(session.clone())
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> AppResult<Option<UserSession>> {
        Ok(self
            .sessions
            .lock()
            .expect("sessions mutex poisoned")
            .iter()
            .find(|s| s.refresh_token_hash == token_hash)
            .cloned())
    }

    async fn touch(&self, id: Uuid) -> AppResult<()> {
        let mut sessions = self.sessions.lock().expect("sessions mutex poisoned");
        if let Some(session) = sessions.iter_mut().find(|s| s.id == id) {
            session.last_seen_at = Some(chrono::Utc::now());
        }
        Ok(())
    }

    async fn revoke(&self, id: Uuid, reason: &str, replaced_by: Option<Uuid>) -> AppResult<()> {
        let mut sessions = self.sessions.lock().expect("sessions mutex poisoned");
        if let Some(session) = sessions.iter_mut().find(|s| s.id == id) {
            session.revoked_at = Some(chrono::Utc::now());
            session.revoked_reason = Some(reason.to_string());
            session.replaced_by = replaced_by;
        }
        Ok(())
    }

    async fn revoke_family(&self, family_id: Uuid, reason: &str) -> AppResult<u64> {
        let mut sessions = self.sessions.lock().expect("sessions mutex poisoned");
        let mut revoked = 0;
        for session in sessions
            .iter_mut()
            .filter(|s| s.family_id == family_id && s.revoked_at.is_none())
        {
            session.revoked_at = Some(chrono::Utc::now());
            session.revoked_reason = Some(reason.to_string());
            revoked += 1;
        }
        Ok(revoked)
    }

    async fn revoke_all_for_user(&self, user_id: i64, reason: &str) -> AppResult<u64> {
        let mut sessions = self.sessions.lock().expect("sessions mutex poisoned");
        let mut revoked = 0;
        for session in sessions
            .iter_mut()
            .filter(|s| s.user_id == user_id && s.revoked_at.is_none())
        {
            session.revoked_at = Some(chrono::Utc::now());
            session.revoked_reason = Some(reason.to_string());
            revoked += 1;
        }
        Ok(revoked)
    }

    async fn delete_expired(&self) -> AppResult<u64> {
        let mut sessions = self.sessions.lock().expect("sessions mutex poisoned");
        let before = sessions.len();
        let now = chrono::Utc::now();
        sessions.retain(|s| s.expires_at > now);
        Ok((before - sessions.len()) as u64)
    }
}

pub struct MockPermissionRepo {
    pub grants: Mutex<Vec<(Role, String)>>,
}

impl Default for MockPermissionRepo {
    fn default() -> Self {
        Self {
            grants: Mutex::new(vec![
                (Role::Teacher, "student:read".to_string()),
                (Role::Teacher, "class:read".to_string()),
                (Role::Teacher, "activity:checkin".to_string()),
                (Role::Teacher, "dashboard:read".to_string()),
            ]),
        }
    }
}

#[async_trait]
impl PermissionRepository for MockPermissionRepo {
    async fn codes_for_role(&self, role: Role) -> AppResult<Vec<String>> {
        Ok(self
            .grants
            .lock()
            .expect("grants mutex poisoned")
            .iter()
            .filter(|(r, _)| *r == role)
            .map(|(_, code)| code.clone())
            .collect())
    }
}

fn student_matches(student: &Student, params: &StudentSearchParams) -> bool {
    params
        .search
        .as_deref()
        .is_none_or(|s| student.name.contains(s) || student.parent_name.contains(s))
        && params.class_id.is_none_or(|id| student.class_id == Some(id))
        && params
            .born_on_or_before
            .is_none_or(|date| student.birth_date <= date)
        && params.born_after.is_none_or(|date| student.birth_date > date)
        && params.status.is_none_or(|status| student.status == status)
}

#[derive(Default)]
pub struct MockStudentRepo {
    pub students: Mutex<Vec<Student>>,
}

impl MockStudentRepo {
    pub fn push(&self, student: Student) {
        self.students
            .lock()
            .expect("students mutex poisoned")
            .push(student);
    }
}

#[async_trait]
impl StudentRepository for MockStudentRepo {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Student>> {
        Ok(self
            .students
            .lock()
            .expect("students mutex poisoned")
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn create(&self, student: &Student) -> AppResult<Student> {
        let mut students = self.students.lock().expect("students mutex poisoned");
        let mut created = student.clone();
        created.id = next_id(&students);
        students.push(created.clone());
        Ok(created)
    }

    async fn update(&self, student: &Student) -> AppResult<Student> {
        let mut students = self.students.lock().expect("students mutex poisoned");
        if let Some(existing) = students.iter_mut().find(|s| s.id == student.id) {
            *existing = student.clone();
        }
        Ok(student.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.students
            .lock()
            .expect("students mutex poisoned")
            .retain(|s| s.id != id);
        Ok(())
    }

    async fn list(
        &self,
        params: &StudentSearchParams,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Student>> {
        Ok(self
            .students
            .lock()
            .expect("students mutex poisoned")
            .iter()
            .filter(|s| student_matches(s, params))
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self, params: &StudentSearchParams) -> AppResult<i64> {
        Ok(self
            .students
            .lock()
            .expect("students mutex poisoned")
            .iter()
            .filter(|s| student_matches(s, params))
            .count() as i64)
    }

    async fn count_in_class(&self, class_id: i64) -> AppResult<i64> {
        Ok(self
            .students
            .lock()
            .expect("students mutex poisoned")
            .iter()
            .filter(|s| s.class_id == Some(class_id))
            .count() as i64)
    }
}

#[derive(Default)]
pub struct MockClassRepo {
    pub classes: Mutex<Vec<ClassUnit>>,
}

impl MockClassRepo {
    pub fn push(&self, class: ClassUnit) {
        self.classes
            .lock()
            .expect("classes mutex poisoned")
            .push(class);
    }
}

#[async_trait]
impl ClassRepository for MockClassRepo {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<ClassUnit>> {
        Ok(self
            .classes
            .lock()
            .expect("classes mutex poisoned")
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn create(&self, class: &ClassUnit) -> AppResult<ClassUnit> {
        let mut classes = self.classes.lock().expect("classes mutex poisoned");
        if classes.iter().any(|c| c.name == class.name) {
            return Err(AppError::Conflict("班级名称已存在".to_string()));
        }
        let mut created = class.clone();
        created.id = next_id(&classes);
        classes.push(created.clone());
        Ok(created)
    }

    async fn update(&self, class: &ClassUnit) -> AppResult<ClassUnit> {
        let mut classes = self.classes.lock().expect("classes mutex poisoned");
        if let Some(existing) = classes.iter_mut().find(|c| c.id == class.id) {
            *existing = class.clone();
        }
        Ok(class.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.classes
            .lock()
            .expect("classes mutex poisoned")
            .retain(|c| c.id != id);
        Ok(())
    }

    async fn list(&self, _limit: i64, _offset: i64) -> AppResult<Vec<ClassUnit>> {
        Ok(self.classes.lock().expect("classes mutex poisoned").clone())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.classes.lock().expect("classes mutex poisoned").len() as i64)
    }

    async fn occupancy(&self) -> AppResult<Vec<ClassOccupancy>> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
pub struct MockActivityRepo {
    pub activities: Mutex<Vec<Activity>>,
}

impl MockActivityRepo {
    pub fn push(&self, activity: Activity) {
        self.activities
            .lock()
            .expect("activities mutex poisoned")
            .push(activity);
    }
}

#[async_trait]
impl ActivityRepository for MockActivityRepo {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Activity>> {
        Ok(self
            .activities
            .lock()
            .expect("activities mutex poisoned")
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn create(&self, activity: &Activity) -> AppResult<Activity> {
        let mut activities = self.activities.lock().expect("activities mutex poisoned");
        let mut created = activity.clone();
        created.id = next_id(&activities);
        activities.push(created.clone());
        Ok(created)
    }

    async fn update(&self, activity: &Activity) -> AppResult<Activity> {
        let mut activities = self.activities.lock().expect("activities mutex poisoned");
        if let Some(existing) = activities.iter_mut().find(|a| a.id == activity.id) {
            *existing = activity.clone();
        }
        Ok(activity.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.activities
            .lock()
            .expect("activities mutex poisoned")
            .retain(|a| a.id != id);
        Ok(())
    }

    async fn list(
        &self,
        _params: &ActivitySearchParams,
        _limit: i64,
        _offset: i64,
    ) -> AppResult<Vec<Activity>> {
        Ok(self
            .activities
            .lock()
            .expect("activities mutex poisoned")
            .clone())
    }

    async fn count(&self, _params: &ActivitySearchParams) -> AppResult<i64> {
        Ok(self
            .activities
            .lock()
            .expect("activities mutex poisoned")
            .len() as i64)
    }
}

#[derive(Default)]
pub struct MockRegistrationRepo {
    pub registrations: Mutex<Vec<ActivityRegistration>>,
}

impl MockRegistrationRepo {
    pub fn push(&self, registration: ActivityRegistration) {
        self.registrations
            .lock()
            .expect("registrations mutex poisoned")
            .push(registration);
    }
}

#[async_trait]
impl RegistrationRepository for MockRegistrationRepo {
    async fn create(
        &self,
        registration: &ActivityRegistration,
    ) -> AppResult<ActivityRegistration> {
        let mut registrations = self
            .registrations
            .lock()
            .expect("registrations mutex poisoned");
        if registrations.iter().any(|r| {
            r.activity_id == registration.activity_id && r.student_id == registration.student_id
        }) {
            return Err(AppError::Conflict("该学生已报名此活动".to_string()));
        }
        let mut created = registration.clone();
        created.id = next_id(&registrations);
        registrations.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<ActivityRegistration>> {
        Ok(self
            .registrations
            .lock()
            .expect("registrations mutex poisoned")
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn find_by_activity_and_student(
        &self,
        activity_id: i64,
        student_id: i64,
    ) -> AppResult<Option<ActivityRegistration>> {
        Ok(self
            .registrations
            .lock()
            .expect("registrations mutex poisoned")
            .iter()
            .find(|r| r.activity_id == activity_id && r.student_id == student_id)
            .cloned())
    }

    async fn list_by_activity(&self, activity_id: i64) -> AppResult<Vec<ActivityRegistration>> {
        Ok(self
            .registrations
            .lock()
            .expect("registrations mutex poisoned")
            .iter()
            .filter(|r| r.activity_id == activity_id)
            .cloned()
            .collect())
    }

    async fn update_status(&self, id: i64, status: RegistrationStatus) -> AppResult<()> {
        let mut registrations = self
            .registrations
            .lock()
            .expect("registrations mutex poisoned");
        if let Some(existing) = registrations.iter_mut().find(|r| r.id == id) {
            existing.status = status;
        }
        Ok(())
    }

    async fn count_active(&self, activity_id: i64) -> AppResult<i64> {
        Ok(self
            .registrations
            .lock()
            .expect("registrations mutex poisoned")
            .iter()
            .filter(|r| {
                r.activity_id == activity_id
                    && matches!(
                        r.status,
                        RegistrationStatus::Pending
                            | RegistrationStatus::Confirmed
                            | RegistrationStatus::Attended
                    )
            })
            .count() as i64)
    }
}

#[derive(Default)]
pub struct MockCheckInRepo {
    pub checkins: Mutex<Vec<ActivityCheckIn>>,
}

impl MockCheckInRepo {
    pub fn push(&self, checkin: ActivityCheckIn) {
        self.checkins
            .lock()
            .expect("checkins mutex poisoned")
            .push(checkin);
    }
}

#[async_trait]
impl CheckInRepository for MockCheckInRepo {
    async fn create(&self, checkin: &ActivityCheckIn) -> AppResult<ActivityCheckIn> {
        let mut checkins = self.checkins.lock().expect("checkins mutex poisoned");
        if checkins
            .iter()
            .any(|c| c.activity_id == checkin.activity_id && c.student_id == checkin.student_id)
        {
            return Err(AppError::Conflict("该学生已签到".to_string()));
        }
        let mut created = checkin.clone();
        created.id = next_id(&checkins);
        checkins.push(created.clone());
        Ok(created)
    }

    async fn exists(&self, activity_id: i64, student_id: i64) -> AppResult<bool> {
        Ok(self
            .checkins
            .lock()
            .expect("checkins mutex poisoned")
            .iter()
            .any(|c| c.activity_id == activity_id && c.student_id == student_id))
    }

    async fn list_by_activity(&self, activity_id: i64) -> AppResult<Vec<ActivityCheckIn>> {
        Ok(self
            .checkins
            .lock()
            .expect("checkins mutex poisoned")
            .iter()
            .filter(|c| c.activity_id == activity_id)
            .cloned()
            .collect())
    }

    async fn count_by_activity(&self, activity_id: i64) -> AppResult<i64> {
        Ok(self
            .checkins
            .lock()
            .expect("checkins mutex poisoned")
            .iter()
            .filter(|c| c.activity_id == activity_id)
            .count() as i64)
    }
}

#[derive(Default)]
pub struct MockEvaluationRepo {
    pub evaluations: Mutex<Vec<ActivityEvaluation>>,
}

impl MockEvaluationRepo {
    pub fn push(&self, evaluation: ActivityEvaluation) {
        self.evaluations
            .lock()
            .expect("evaluations mutex poisoned")
            .push(evaluation);
    }
}

#[async_trait]
impl EvaluationRepository for MockEvaluationRepo {
    async fn create(&self, evaluation: &ActivityEvaluation) -> AppResult<ActivityEvaluation> {
        let mut evaluations = self.evaluations.lock().expect("evaluations mutex poisoned");
        if evaluations.iter().any(|e| {
            e.activity_id == evaluation.activity_id && e.created_by == evaluation.created_by
        }) {
            return Err(AppError::Conflict("您已评价过该活动".to_string()));
        }
        let mut created = evaluation.clone();
        created.id = next_id(&evaluations);
        evaluations.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<ActivityEvaluation>> {
        Ok(self
            .evaluations
            .lock()
            .expect("evaluations mutex poisoned")
            .iter()
            .find(|e| e.id == id)
            .cloned())
    }

    async fn update(&self, evaluation: &ActivityEvaluation) -> AppResult<ActivityEvaluation> {
        let mut evaluations = self.evaluations.lock().expect("evaluations mutex poisoned");
        if let Some(existing) = evaluations.iter_mut().find(|e| e.id == evaluation.id) {
            *existing = evaluation.clone();
        }
        Ok(evaluation.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.evaluations
            .lock()
            .expect("evaluations mutex poisoned")
            .retain(|e| e.id != id);
        Ok(())
    }

    async fn list_by_activity(
        &self,
        activity_id: i64,
        evaluator_type: Option<EvaluatorType>,
    ) -> AppResult<Vec<ActivityEvaluation>> {
        Ok(self
            .evaluations
            .lock()
            .expect("evaluations mutex poisoned")
            .iter()
            .filter(|e| {
                e.activity_id == activity_id
                    && evaluator_type.map(|t| e.evaluator_type == t).unwrap_or(true)
            })
            .cloned()
            .collect())
    }

    async fn update_reply(&self, id: i64, reply: &str) -> AppResult<ActivityEvaluation> {
        let mut evaluations = self.evaluations.lock().expect("evaluations mutex poisoned");
        let existing = evaluations
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| AppError::NotFound("评价不存在".to_string()))?;
        existing.reply = Some(reply.to_string());
        Ok(existing.clone())
    }

    async fn summary(&self, activity_id: i64) -> AppResult<EvaluationSummary> {
        let evaluations = self.evaluations.lock().expect("evaluations mutex poisoned");
        let count = evaluations
            .iter()
            .filter(|e| e.activity_id == activity_id)
            .count() as i64;
        Ok(EvaluationSummary {
            evaluation_count: count,
            average_overall: None,
            average_content: None,
            average_organization: None,
            average_environment: None,
            average_service: None,
        })
    }

    async fn rating_distribution(&self, activity_id: i64) -> AppResult<Vec<(i32, i64)>> {
        let evaluations = self.evaluations.lock().expect("evaluations mutex poisoned");
        let mut distribution = Vec::new();
        for rating in 1..=5 {
            let count = evaluations
                .iter()
                .filter(|e| e.activity_id == activity_id && e.overall_rating == rating)
                .count() as i64;
            distribution.push((rating, count));
        }
        Ok(distribution)
    }
}

#[derive(Default)]
pub struct MockEnrollmentRepo {
    pub applications: Mutex<Vec<EnrollmentApplication>>,
}

impl MockEnrollmentRepo {
    pub fn push(&self, application: EnrollmentApplication) {
        self.applications
            .lock()
            .expect("applications mutex poisoned")
            .push(application);
    }
}

#[async_trait]
impl EnrollmentRepository for MockEnrollmentRepo {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<EnrollmentApplication>> {
        Ok(self
            .applications
            .lock()
            .expect("applications mutex poisoned")
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn create(
        &self,
        application: &EnrollmentApplication,
    ) -> AppResult<EnrollmentApplication> {
        let mut applications = self
            .applications
            .lock()
            .expect("applications mutex poisoned");
        if applications.iter().any(|a| {
            a.student_name == application.student_name
                && a.parent_phone == application.parent_phone
        }) {
            return Err(AppError::Conflict("该学生已提交报名申请".to_string()));
        }
        let mut created = application.clone();
        created.id = next_id(&applications);
        applications.push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        application: &EnrollmentApplication,
    ) -> AppResult<EnrollmentApplication> {
        let mut applications = self
            .applications
            .lock()
            .expect("applications mutex poisoned");
        if let Some(existing) = applications.iter_mut().find(|a| a.id == application.id) {
            *existing = application.clone();
        }
        Ok(application.clone())
    }

    async fn list(
        &self,
        params: &ApplicationSearchParams,
        _limit: i64,
        _offset: i64,
    ) -> AppResult<Vec<EnrollmentApplication>> {
        Ok(self
            .applications
            .lock()
            .expect("applications mutex poisoned")
            .iter()
            .filter(|a| params.status.map(|s| a.status == s).unwrap_or(true))
            .cloned()
            .collect())
    }

    async fn count(&self, params: &ApplicationSearchParams) -> AppResult<i64> {
        Ok(self
            .applications
            .lock()
            .expect("applications mutex poisoned")
            .iter()
            .filter(|a| params.status.map(|s| a.status == s).unwrap_or(true))
            .count() as i64)
    }

    async fn count_by_status(&self, status: ApplicationStatus) -> AppResult<i64> {
        Ok(self
            .applications
            .lock()
            .expect("applications mutex poisoned")
            .iter()
            .filter(|a| a.status == status)
            .count() as i64)
    }

    async fn monthly_totals(&self, _months: i64) -> AppResult<Vec<MonthlyCount>> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
pub struct MockCampaignRepo {
    pub campaigns: Mutex<Vec<Campaign>>,
}

impl MockCampaignRepo {
    pub fn push(&self, campaign: Campaign) {
        self.campaigns
            .lock()
            .expect("campaigns mutex poisoned")
            .push(campaign);
    }
}

#[async_trait]
impl CampaignRepository for MockCampaignRepo {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Campaign>> {
        Ok(self
            .campaigns
            .lock()
            .expect("campaigns mutex poisoned")
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn create(&self, campaign: &Campaign) -> AppResult<Campaign> {
        let mut campaigns = self.campaigns.lock().expect("campaigns mutex poisoned");
        let mut created = campaign.clone();
        created.id = next_id(&campaigns);
        campaigns.push(created.clone());
        Ok(created)
    }

    async fn update(&self, campaign: &Campaign) -> AppResult<Campaign> {
        let mut campaigns = self.campaigns.lock().expect("campaigns mutex poisoned");
        if let Some(existing) = campaigns.iter_mut().find(|c| c.id == campaign.id) {
            *existing = campaign.clone();
        }
        Ok(campaign.clone())
    }

    async fn update_status(&self, id: i64, status: CampaignStatus) -> AppResult<()> {
        let mut campaigns = self.campaigns.lock().expect("campaigns mutex poisoned");
        if let Some(existing) = campaigns.iter_mut().find(|c| c.id == id) {
            existing.status = status;
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.campaigns
            .lock()
            .expect("campaigns mutex poisoned")
            .retain(|c| c.id != id);
        Ok(())
    }

    async fn list(
        &self,
        status: Option<CampaignStatus>,
        _limit: i64,
        _offset: i64,
    ) -> AppResult<Vec<Campaign>> {
        Ok(self
            .campaigns
            .lock()
            .expect("campaigns mutex poisoned")
            .iter()
            .filter(|c| status.map(|s| c.status == s).unwrap_or(true))
            .cloned()
            .collect())
    }

    async fn count(&self, status: Option<CampaignStatus>) -> AppResult<i64> {
        Ok(self
            .campaigns
            .lock()
            .expect("campaigns mutex poisoned")
            .iter()
            .filter(|c| status.map(|s| c.status == s).unwrap_or(true))
            .count() as i64)
    }

    async fn funnel(&self) -> AppResult<Vec<CampaignFunnel>> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
pub struct MockLeadRepo {
    pub leads: Mutex<Vec<Lead>>,
}

impl MockLeadRepo {
    pub fn push(&self, lead: Lead) {
        self.leads.lock().expect("leads mutex poisoned").push(lead);
    }
}

#[async_trait]
impl LeadRepository for MockLeadRepo {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Lead>> {
        Ok(self
            .leads
            .lock()
            .expect("leads mutex poisoned")
            .iter()
            .find(|l| l.id == id)
            .cloned())
    }

    async fn create(&self, lead: &Lead) -> AppResult<Lead> {
        let mut leads = self.leads.lock().expect("leads mutex poisoned");
        let mut created = lead.clone();
        created.id = next_id(&leads);
        leads.push(created.clone());
        Ok(created)
    }

    async fn update(&self, lead: &Lead) -> AppResult<Lead> {
        let mut leads = self.leads.lock().expect("leads mutex poisoned");
        if let Some(existing) = leads.iter_mut().find(|l| l.id == lead.id) {
            *existing = lead.clone();
        }
        Ok(lead.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.leads
            .lock()
            .expect("leads mutex poisoned")
            .retain(|l| l.id != id);
        Ok(())
    }

    async fn list(
        &self,
        _params: &LeadSearchParams,
        _limit: i64,
        _offset: i64,
    ) -> AppResult<Vec<Lead>> {
        Ok(self.leads.lock().expect("leads mutex poisoned").clone())
    }

    async fn count(&self, _params: &LeadSearchParams) -> AppResult<i64> {
        Ok(self.leads.lock().expect("leads mutex poisoned").len() as i64)
    }
}

#[derive(Default)]
pub struct MockAdRepo {
    pub ads: Mutex<Vec<Advertisement>>,
}

impl MockAdRepo {
    pub fn push(&self, ad: Advertisement) {
        self.ads.lock().expect("ads mutex poisoned").push(ad);
    }
}

#[async_trait]
impl AdvertisementRepository for MockAdRepo {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Advertisement>> {
        Ok(self
            .ads
            .lock()
            .expect("ads mutex poisoned")
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn create(&self, ad: &Advertisement) -> AppResult<Advertisement> {
        let mut ads = self.ads.lock().expect("ads mutex poisoned");
        let mut created = ad.clone();
        created.id = next_id(&ads);
        ads.push(created.clone());
        Ok(created)
    }

    async fn update(&self, ad: &Advertisement) -> AppResult<Advertisement> {
        let mut ads = self.ads.lock().expect("ads mutex poisoned");
        if let Some(existing) = ads.iter_mut().find(|a| a.id == ad.id) {
            *existing = ad.clone();
        }
        Ok(ad.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.ads
            .lock()
            .expect("ads mutex poisoned")
            .retain(|a| a.id != id);
        Ok(())
    }

    async fn list(
        &self,
        position: Option<AdPosition>,
        status: Option<AdStatus>,
        _limit: i64,
        _offset: i64,
    ) -> AppResult<Vec<Advertisement>> {
        Ok(self
            .ads
            .lock()
            .expect("ads mutex poisoned")
            .iter()
            .filter(|a| position.map(|p| a.position == p).unwrap_or(true))
            .filter(|a| status.map(|s| a.status == s).unwrap_or(true))
            .cloned()
            .collect())
    }

    async fn count(
        &self,
        position: Option<AdPosition>,
        status: Option<AdStatus>,
    ) -> AppResult<i64> {
        Ok(self.list(position, status, i64::MAX, 0).await?.len() as i64)
    }

    async fn list_live(
        &self,
        position: AdPosition,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Advertisement>> {
        Ok(self
            .ads
            .lock()
            .expect("ads mutex poisoned")
            .iter()
            .filter(|a| {
                a.position == position
                    && a.status == AdStatus::Active
                    && a.start_time <= now
                    && a.end_time >= now
            })
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MockConfigRepo {
    pub configs: Mutex<Vec<SystemConfig>>,
}

impl MockConfigRepo {
    pub fn push(&self, config: SystemConfig) {
        self.configs
            .lock()
            .expect("configs mutex poisoned")
            .push(config);
    }
}

#[async_trait]
impl SystemConfigRepository for MockConfigRepo {
    async fn find_by_key(&self, config_key: &str) -> AppResult<Option<SystemConfig>> {
        Ok(self
            .configs
            .lock()
            .expect("configs mutex poisoned")
            .iter()
            .find(|c| c.config_key == config_key)
            .cloned())
    }

    async fn create(&self, config: &SystemConfig) -> AppResult<SystemConfig> {
        let mut configs = self.configs.lock().expect("configs mutex poisoned");
        if configs.iter().any(|c| c.config_key == config.config_key) {
            return Err(AppError::Conflict("配置键已存在".to_string()));
        }
        let mut created = config.clone();
        created.id = next_id(&configs);
        configs.push(created.clone());
        Ok(created)
    }

    async fn update(&self, config: &SystemConfig) -> AppResult<SystemConfig> {
        let mut configs = self.configs.lock().expect("configs mutex poisoned");
        if let Some(existing) = configs
            .iter_mut()
            .find(|c| c.config_key == config.config_key)
        {
            *existing = config.clone();
        }
        Ok(config.clone())
    }

    async fn delete_by_key(&self, config_key: &str) -> AppResult<()> {
        self.configs
            .lock()
            .expect("configs mutex poisoned")
            .retain(|c| c.config_key != config_key);
        Ok(())
    }

    async fn list(&self, config_group: Option<&str>) -> AppResult<Vec<SystemConfig>> {
        Ok(self
            .configs
            .lock()
            .expect("configs mutex poisoned")
            .iter()
            .filter(|c| config_group.map(|g| c.config_group == g).unwrap_or(true))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MockAiModelRepo {
    pub models: Mutex<Vec<AiModelConfig>>,
}

impl MockAiModelRepo {
    pub fn push(&self, model: AiModelConfig) {
        self.models
            .lock()
            .expect("models mutex poisoned")
            .push(model);
    }
}

#[async_trait]
impl AiModelRepository for MockAiModelRepo {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<AiModelConfig>> {
        Ok(self
            .models
            .lock()
            .expect("models mutex poisoned")
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn find_default(&self) -> AppResult<Option<AiModelConfig>> {
        Ok(self
            .models
            .lock()
            .expect("models mutex poisoned")
            .iter()
            .find(|m| m.is_default)
            .cloned())
    }

    async fn create(&self, config: &AiModelConfig) -> AppResult<AiModelConfig> {
        let mut models = self.models.lock().expect("models mutex poisoned");
        let mut created = config.clone();
        created.id = next_id(&models);
        models.push(created.clone());
        Ok(created)
    }

    async fn update(&self, config: &AiModelConfig) -> AppResult<AiModelConfig> {
        let mut models = self.models.lock().expect("models mutex poisoned");
        if let Some(existing) = models.iter_mut().find(|m| m.id == config.id) {
            *existing = config.clone();
        }
        Ok(config.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.models
            .lock()
            .expect("models mutex poisoned")
            .retain(|m| m.id != id);
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<AiModelConfig>> {
        Ok(self.models.lock().expect("models mutex poisoned").clone())
    }

    async fn clear_default(&self) -> AppResult<()> {
        for model in self
            .models
            .lock()
            .expect("models mutex poisoned")
            .iter_mut()
        {
            model.is_default = false;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MockFileRepo {
    pub files: Mutex<Vec<StoredFile>>,
}

impl MockFileRepo {
    pub fn push(&self, file: StoredFile) {
        self.files.lock().expect("files mutex poisoned").push(file);
    }
}

#[async_trait]
impl FileRepository for MockFileRepo {
    async fn create(&self, file: &StoredFile) -> AppResult<StoredFile> {
        let mut files = self.files.lock().expect("files mutex poisoned");
        let mut created = file.clone();
        created.id = next_id(&files);
        files.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<StoredFile>> {
        Ok(self
            .files
            .lock()
            .expect("files mutex poisoned")
            .iter()
            .find(|f| f.id == id)
            .cloned())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.files
            .lock()
            .expect("files mutex poisoned")
            .retain(|f| f.id != id);
        Ok(())
    }

    async fn list_by_user(
        &self,
        user_id: i64,
        category: Option<FileCategory>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<StoredFile>> {
        Ok(self
            .files
            .lock()
            .expect("files mutex poisoned")
            .iter()
            .filter(|f| f.uploaded_by == user_id)
            .filter(|f| category.is_none_or(|c| f.category == c))
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count_by_user(&self, user_id: i64, category: Option<FileCategory>) -> AppResult<i64> {
        Ok(self
            .files
            .lock()
            .expect("files mutex poisoned")
            .iter()
            .filter(|f| f.uploaded_by == user_id)
            .filter(|f| category.is_none_or(|c| f.category == c))
            .count() as i64)
    }

    async fn total_size_for_user(&self, user_id: i64) -> AppResult<i64> {
        Ok(self
            .files
            .lock()
            .expect("files mutex poisoned")
            .iter()
            .filter(|f| f.uploaded_by == user_id)
            .map(|f| f.size_bytes)
            .sum())
    }
}
