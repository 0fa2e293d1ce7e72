use anyhow::Context as _;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder,
};
use uuid::Uuid;

use fixlane_core::sea_ext::Paginate;
use fixlane_domain::pagination::Sort;
use fixlane_domain::request::RequestStatus;
use fixlane_marketplace_schema::{service_request_images, service_requests};

use crate::domain::repository::RequestRepository;
use crate::domain::types::{RequestFilter, RequestImage, ServiceRequest};
use crate::error::MarketplaceError;

use super::parse_column;

#[derive(Clone)]
pub struct DbRequestRepository {
    pub db: DatabaseConnection,
}

impl RequestRepository for DbRequestRepository {
    async fn create(&self, request: &ServiceRequest) -> Result<(), MarketplaceError> {
        service_requests::ActiveModel {
            id: Set(request.id),
            owner_id: Set(request.owner_id),
            vehicle_id: Set(request.vehicle_id),
            title: Set(request.title.clone()),
            description: Set(request.description.clone()),
            urgency: Set(request.urgency.as_str().to_owned()),
            status: Set(request.status.as_str().to_owned()),
            created_at: Set(request.created_at),
            updated_at: Set(request.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create service request")?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ServiceRequest>, MarketplaceError> {
        let model = service_requests::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find service request by id")?;
        Ok(model.map(request_from_model).transpose()?)
    }

    async fn list(&self, filter: &RequestFilter) -> Result<Vec<ServiceRequest>, MarketplaceError> {
        let statuses = filter.statuses();
        let mut query = service_requests::Entity::find().filter(
            service_requests::Column::Status.is_in(statuses.iter().map(|s| s.as_str())),
        );
        if let Some(owner_id) = filter.owner_id() {
            query = query.filter(service_requests::Column::OwnerId.eq(owner_id));
        }
        query = match filter.sort {
            Sort::Newest => query.order_by_desc(service_requests::Column::CreatedAt),
            Sort::Oldest => query.order_by_asc(service_requests::Column::CreatedAt),
        };
        let models = query
            .page_by(filter.page)
            .all(&self.db)
            .await
            .context("list service requests")?;
        Ok(models
            .into_iter()
            .map(request_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn update_details(&self, request: &ServiceRequest) -> Result<bool, MarketplaceError> {
        let result = service_requests::Entity::update_many()
            .col_expr(
                service_requests::Column::Title,
                Expr::value(request.title.clone()),
            )
            .col_expr(
                service_requests::Column::Description,
                Expr::value(request.description.clone()),
            )
            .col_expr(
                service_requests::Column::Urgency,
                Expr::value(request.urgency.as_str()),
            )
            .col_expr(
                service_requests::Column::UpdatedAt,
                Expr::value(request.updated_at),
            )
            .filter(service_requests::Column::Id.eq(request.id))
            .filter(
                service_requests::Column::Status
                    .is_in(RequestStatus::QUOTABLE.iter().map(|s| s.as_str())),
            )
            .exec(&self.db)
            .await
            .context("update service request")?;
        Ok(result.rows_affected > 0)
    }

    async fn transition(
        &self,
        id: Uuid,
        from: &[RequestStatus],
        to: RequestStatus,
    ) -> Result<bool, MarketplaceError> {
        let result = service_requests::Entity::update_many()
            .col_expr(service_requests::Column::Status, Expr::value(to.as_str()))
            .col_expr(service_requests::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(service_requests::Column::Id.eq(id))
            .filter(service_requests::Column::Status.is_in(from.iter().map(|s| s.as_str())))
            .exec(&self.db)
            .await
            .context("transition service request")?;
        Ok(result.rows_affected > 0)
    }

    async fn list_images(&self, request_id: Uuid) -> Result<Vec<RequestImage>, MarketplaceError> {
        let models = service_request_images::Entity::find()
            .filter(service_request_images::Column::RequestId.eq(request_id))
            .order_by_asc(service_request_images::Column::CreatedAt)
            .order_by_asc(service_request_images::Column::Id)
            .all(&self.db)
            .await
            .context("list request images")?;
        Ok(models.into_iter().map(image_from_model).collect())
    }

    async fn add_images(&self, images: &[RequestImage]) -> Result<(), MarketplaceError> {
        if images.is_empty() {
            return Ok(());
        }
        let models = images.iter().map(|image| service_request_images::ActiveModel {
            id: Set(image.id),
            request_id: Set(image.request_id),
            url: Set(image.url.clone()),
            created_at: Set(image.created_at),
        });
        service_request_images::Entity::insert_many(models)
            .exec_without_returning(&self.db)
            .await
            .context("add request images")?;
        Ok(())
    }

    async fn delete_image(
        &self,
        request_id: Uuid,
        image_id: Uuid,
    ) -> Result<bool, MarketplaceError> {
        let result = service_request_images::Entity::delete_many()
            .filter(service_request_images::Column::Id.eq(image_id))
            .filter(service_request_images::Column::RequestId.eq(request_id))
            .exec(&self.db)
            .await
            .context("delete request image")?;
        Ok(result.rows_affected > 0)
    }
}

pub(super) fn request_from_model(model: service_requests::Model) -> anyhow::Result<ServiceRequest> {
    Ok(ServiceRequest {
        id: model.id,
        owner_id: model.owner_id,
        vehicle_id: model.vehicle_id,
        title: model.title,
        description: model.description,
        urgency: parse_column("service_requests.urgency", &model.urgency)?,
        status: parse_column("service_requests.status", &model.status)?,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn image_from_model(model: service_request_images::Model) -> RequestImage {
    RequestImage {
        id: model.id,
        request_id: model.request_id,
        url: model.url,
        created_at: model.created_at,
    }
}
