//! Tenant service request workflow

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use validator::Validate;

use crate::{
    config::RequestsConfig,
    error::{AppError, AppResult},
    models::{
        new_id,
        notification::{NewNotification, NotificationLevel},
        permission::Permission,
        request::{
            AttachDocument, CreateRequest, Request, RequestComment, RequestDocument, RequestQuery,
            RequestStatus, UpdateRequest,
        },
        user::Actor,
    },
    repository::Repository,
};

use super::notifications::{notify, NotificationSink};

#[derive(Clone)]
pub struct RequestsService {
    repository: Repository,
    config: RequestsConfig,
    notifier: Arc<dyn NotificationSink>,
}

impl RequestsService {
    pub fn new(
        repository: Repository,
        config: RequestsConfig,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            repository,
            config,
            notifier,
        }
    }

    fn ensure_visible(actor: &Actor, request: &Request) -> AppResult<()> {
        if request.submitter_id == actor.user_id || actor.has(Permission::RequestsViewAll) {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "You can only view your own requests".to_string(),
            ))
        }
    }

    /// Submitter holding `requests.create`, or anyone with `requests.edit`
    fn ensure_can_edit(actor: &Actor, request: &Request) -> AppResult<()> {
        let own = request.submitter_id == actor.user_id && actor.has(Permission::RequestsCreate);
        if own || actor.has(Permission::RequestsEdit) {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "You can only modify your own requests".to_string(),
            ))
        }
    }

    /// Check size and extension limits of an attachment
    fn check_document(&self, data: &AttachDocument) -> AppResult<()> {
        if data.size > self.config.max_document_bytes {
            return Err(AppError::Validation(format!(
                "{} exceeds the {} byte limit",
                data.name, self.config.max_document_bytes
            )));
        }
        let extension = data
            .name
            .rfind('.')
            .map(|i| data.name[i..].to_lowercase())
            .unwrap_or_default();
        let accepted = self
            .config
            .accepted_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(&extension));
        if extension.is_empty() || !accepted {
            return Err(AppError::Validation(format!(
                "{} has an unsupported file type (accepted: {})",
                data.name,
                self.config.accepted_extensions.join(" ")
            )));
        }
        Ok(())
    }

    fn notify_submitter(&self, request: &Request, level: NotificationLevel, title: &str, message: String) {
        notify(
            self.notifier.as_ref(),
            NewNotification::request(&request.submitter_id, &request.id, level, title, message),
        );
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// List requests; without `requests.view.all` only the caller's own
    pub fn list(&self, actor: &Actor, mut query: RequestQuery) -> AppResult<Vec<Request>> {
        if !actor.has(Permission::RequestsViewAll) {
            query.submitter_id = Some(actor.user_id.clone());
        }
        self.repository.requests.list(&query)
    }

    pub fn get(&self, actor: &Actor, id: &str) -> AppResult<Request> {
        let request = self.repository.requests.get(id)?;
        Self::ensure_visible(actor, &request)?;
        Ok(request)
    }

    // -----------------------------------------------------------------------
    // Submitter operations
    // -----------------------------------------------------------------------

    /// New requests are submitted straight away unless `draft` is set
    pub fn create(&self, actor: &Actor, data: CreateRequest) -> AppResult<Request> {
        data.validate()?;
        let title = data.title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }

        let now = Utc::now();
        let request = Request {
            id: new_id("req"),
            request_type: data.request_type,
            title: title.to_string(),
            description: data.description,
            priority: data.priority,
            status: if data.draft {
                RequestStatus::Draft
            } else {
                RequestStatus::Submitted
            },
            submitter_id: actor.user_id.clone(),
            submitter_name: actor.name.clone(),
            assigned_to: None,
            reviewed_by: None,
            reviewed_at: None,
            approved_by: None,
            approved_at: None,
            rejection_reason: None,
            completed_at: None,
            due_date: data.due_date,
            estimated_cost: data.estimated_cost,
            actual_cost: None,
            location: data.location,
            documents: Vec::new(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        tracing::info!(
            request_id = %request.id,
            submitter = %request.submitter_id,
            status = %request.status,
            "Request created"
        );
        self.repository.requests.insert(request)
    }

    pub fn update(&self, actor: &Actor, id: &str, data: &UpdateRequest) -> AppResult<Request> {
        data.validate()?;
        self.repository.requests.update(id, |r| {
            Self::ensure_can_edit(actor, r)?;
            r.apply(data, Utc::now())
        })
    }

    pub fn submit(&self, actor: &Actor, id: &str) -> AppResult<Request> {
        let request = self.repository.requests.update(id, |r| {
            Self::ensure_can_edit(actor, r)?;
            r.submit(Utc::now())
        })?;
        tracing::info!(request_id = %id, "Request submitted");
        Ok(request)
    }

    /// Back to draft
    pub fn withdraw(&self, actor: &Actor, id: &str) -> AppResult<Request> {
        let request = self.repository.requests.update(id, |r| {
            Self::ensure_can_edit(actor, r)?;
            r.withdraw(Utc::now())
        })?;
        tracing::info!(request_id = %id, "Request withdrawn");
        Ok(request)
    }

    pub fn attach_document(
        &self,
        actor: &Actor,
        id: &str,
        data: AttachDocument,
    ) -> AppResult<RequestDocument> {
        data.validate()?;
        self.check_document(&data)?;

        let now = Utc::now();
        let document = RequestDocument {
            id: new_id("doc"),
            name: data.name,
            url: data.url,
            content_type: data.content_type,
            size: data.size,
            uploaded_at: now,
        };
        self.repository.requests.update(id, |r| {
            Self::ensure_can_edit(actor, r)?;
            r.attach_document(document.clone(), now)
        })?;
        tracing::info!(request_id = %id, document_id = %document.id, "Document attached");
        Ok(document)
    }

    pub fn remove_document(&self, actor: &Actor, id: &str, document_id: &str) -> AppResult<()> {
        self.repository.requests.update(id, |r| {
            Self::ensure_can_edit(actor, r)?;
            r.remove_document(document_id, Utc::now()).map(|_| ())
        })?;
        tracing::info!(request_id = %id, document_id = %document_id, "Document removed");
        Ok(())
    }

    /// Anyone who can see the request may comment on it
    pub fn add_comment(&self, actor: &Actor, id: &str, content: &str) -> AppResult<RequestComment> {
        let mut comment = None;
        self.repository.requests.update(id, |r| {
            Self::ensure_visible(actor, r)?;
            comment = Some(r.add_comment(&actor.user_id, &actor.name, content, Utc::now())?);
            Ok(())
        })?;
        comment.ok_or_else(|| AppError::Internal("Comment was not recorded".to_string()))
    }

    // -----------------------------------------------------------------------
    // Reviewer operations
    // -----------------------------------------------------------------------

    pub fn start_review(&self, actor: &Actor, id: &str) -> AppResult<Request> {
        let request = self
            .repository
            .requests
            .update(id, |r| r.start_review(&actor.user_id, Utc::now()))?;
        tracing::info!(request_id = %id, reviewer = %actor.user_id, "Request under review");
        Ok(request)
    }

    pub fn approve(&self, actor: &Actor, id: &str, comment: Option<&str>) -> AppResult<Request> {
        let request = self.repository.requests.update(id, |r| {
            r.approve(&actor.user_id, &actor.name, comment, Utc::now())
        })?;
        tracing::info!(request_id = %id, approver = %actor.user_id, "Request approved");

        self.notify_submitter(
            &request,
            NotificationLevel::Success,
            "Request approved",
            format!("Your request \"{}\" has been approved.", request.title),
        );
        Ok(request)
    }

    pub fn reject(&self, actor: &Actor, id: &str, reason: &str) -> AppResult<Request> {
        let request = self
            .repository
            .requests
            .update(id, |r| r.reject(&actor.user_id, reason, Utc::now()))?;
        tracing::info!(request_id = %id, reviewer = %actor.user_id, "Request rejected");

        self.notify_submitter(
            &request,
            NotificationLevel::Error,
            "Request rejected",
            format!(
                "Your request \"{}\" was rejected. Reason: {}",
                request.title,
                request.rejection_reason.as_deref().unwrap_or_default()
            ),
        );
        Ok(request)
    }

    pub fn complete(
        &self,
        actor: &Actor,
        id: &str,
        actual_cost: Option<Decimal>,
    ) -> AppResult<Request> {
        let request = self
            .repository
            .requests
            .update(id, |r| r.complete(actual_cost, Utc::now()))?;
        tracing::info!(request_id = %id, by = %actor.user_id, "Request completed");

        self.notify_submitter(
            &request,
            NotificationLevel::Success,
            "Request completed",
            format!("Your request \"{}\" has been completed.", request.title),
        );
        Ok(request)
    }

    pub fn delete(&self, id: &str) -> AppResult<()> {
        self.repository.requests.delete(id)?;
        tracing::info!(request_id = %id, "Request deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::request::{RequestPriority, RequestType},
        models::user::Role,
        services::notifications::MockNotificationSink,
    };

    fn actor(id: &str, role: Role) -> Actor {
        Actor {
            user_id: id.into(),
            name: format!("{} name", id),
            role,
        }
    }

    fn service(sink: MockNotificationSink) -> RequestsService {
        RequestsService::new(Repository::new(), RequestsConfig::default(), Arc::new(sink))
    }

    fn create(draft: bool) -> CreateRequest {
        CreateRequest {
            request_type: RequestType::Maintenance,
            title: "Broken light".into(),
            description: "Hallway light flickers".into(),
            priority: RequestPriority::Low,
            due_date: None,
            estimated_cost: None,
            location: None,
            draft,
        }
    }

    fn document(name: &str, size: u64) -> AttachDocument {
        AttachDocument {
            name: name.into(),
            url: format!("/files/{}", name),
            content_type: "application/octet-stream".into(),
            size,
        }
    }

    #[test]
    fn created_requests_are_submitted_unless_draft() {
        let service = service(MockNotificationSink::new());
        let tenant = actor("tenant-1", Role::Tenant);
        assert_eq!(
            service.create(&tenant, create(false)).unwrap().status,
            RequestStatus::Submitted
        );
        let draft = service.create(&tenant, create(true)).unwrap();
        assert_eq!(draft.status, RequestStatus::Draft);
        assert_eq!(draft.submitter_name, "tenant-1 name");
        assert_eq!(
            service.submit(&tenant, &draft.id).unwrap().status,
            RequestStatus::Submitted
        );
    }

    #[test]
    fn approve_records_comment_and_notifies() {
        let mut sink = MockNotificationSink::new();
        sink.expect_deliver()
            .withf(|n| {
                n.user_id == "tenant-1"
                    && n.level == NotificationLevel::Success
                    && n.related_request_id.is_some()
            })
            .times(1)
            .returning(|_| Ok(()));
        let service = service(sink);
        let mgmt = actor("mgmt-1", Role::Mgmt);

        let request = service
            .create(&actor("tenant-1", Role::Tenant), create(false))
            .unwrap();
        service.start_review(&mgmt, &request.id).unwrap();
        let approved = service
            .approve(&mgmt, &request.id, Some("Electrician on Friday"))
            .unwrap();

        assert_eq!(approved.status, RequestStatus::Approved);
        assert_eq!(approved.reviewed_by.as_deref(), Some("mgmt-1"));
        assert_eq!(approved.comments.len(), 1);
        assert_eq!(approved.comments[0].user_name, "mgmt-1 name");
    }

    #[test]
    fn reject_needs_reason() {
        let mut sink = MockNotificationSink::new();
        sink.expect_deliver()
            .withf(|n| n.message.contains("Not our responsibility"))
            .times(1)
            .returning(|_| Ok(()));
        let service = service(sink);
        let mgmt = actor("mgmt-1", Role::Mgmt);
        let request = service
            .create(&actor("tenant-1", Role::Tenant), create(false))
            .unwrap();

        assert!(matches!(
            service.reject(&mgmt, &request.id, ""),
            Err(AppError::Validation(_))
        ));
        let rejected = service
            .reject(&mgmt, &request.id, "Not our responsibility")
            .unwrap();
        assert_eq!(rejected.status, RequestStatus::Rejected);
    }

    #[test]
    fn other_tenants_cannot_see_or_edit() {
        let service = service(MockNotificationSink::new());
        let request = service
            .create(&actor("tenant-1", Role::Tenant), create(true))
            .unwrap();
        let stranger = actor("tenant-2", Role::Tenant);

        assert!(matches!(
            service.get(&stranger, &request.id),
            Err(AppError::Authorization(_))
        ));
        assert!(matches!(
            service.submit(&stranger, &request.id),
            Err(AppError::Authorization(_))
        ));
        assert!(matches!(
            service.add_comment(&stranger, &request.id, "hello"),
            Err(AppError::Authorization(_))
        ));
        assert!(service.list(&stranger, RequestQuery::default()).unwrap().is_empty());
    }

    #[test]
    fn documents_respect_size_and_type() {
        let service = service(MockNotificationSink::new());
        let tenant = actor("tenant-1", Role::Tenant);
        let request = service.create(&tenant, create(false)).unwrap();

        assert!(matches!(
            service.attach_document(&tenant, &request.id, document("virus.exe", 10)),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            service.attach_document(&tenant, &request.id, document("plan.pdf", 6 * 1024 * 1024)),
            Err(AppError::Validation(_))
        ));

        let doc = service
            .attach_document(&tenant, &request.id, document("Photo.JPG", 1024))
            .unwrap();
        assert_eq!(service.get(&tenant, &request.id).unwrap().documents.len(), 1);

        service
            .remove_document(&tenant, &request.id, &doc.id)
            .unwrap();
        assert!(service.get(&tenant, &request.id).unwrap().documents.is_empty());
    }

    #[test]
    fn comments_keep_their_order() {
        let service = service(MockNotificationSink::new());
        let tenant = actor("tenant-1", Role::Tenant);
        let mgmt = actor("mgmt-1", Role::Mgmt);
        let request = service.create(&tenant, create(false)).unwrap();

        service.add_comment(&tenant, &request.id, "one").unwrap();
        service.add_comment(&mgmt, &request.id, "two").unwrap();
        service.add_comment(&tenant, &request.id, "three").unwrap();

        let contents: Vec<String> = service
            .get(&tenant, &request.id)
            .unwrap()
            .comments
            .into_iter()
            .map(|c| c.content)
            .collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
    }
}
