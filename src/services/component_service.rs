use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::dto::components::{ComponentList, CreateComponentRequest, UpdateComponentRequest};
use crate::{
    audit::log_audit,
    entity::components::{ActiveModel, Column, Entity as Components, Model as ComponentModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Component,
    response::{ApiResponse, Meta},
    routes::params::{ComponentQuery, ComponentSortBy, SortOrder},
    state::AppState,
};

/// The eight build slots a customer fills at checkout.
pub const CATEGORIES: [&str; 8] = [
    "processor",
    "graphics",
    "memory",
    "storage",
    "cooling",
    "power",
    "motherboard",
    "case",
];

pub fn validate_category(category: &str) -> Result<(), AppError> {
    if CATEGORIES.contains(&category) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "unknown component category '{category}'"
        )))
    }
}

pub async fn list_components(
    state: &AppState,
    query: ComponentQuery,
) -> AppResult<ApiResponse<ComponentList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    if let Some(category) = query.category.as_ref().filter(|s| !s.is_empty()) {
        validate_category(category)?;
        condition = condition.add(Column::Category.eq(category.clone()));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    let sort_by = query.sort_by.unwrap_or(ComponentSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ComponentSortBy::CreatedAt => Column::CreatedAt,
        ComponentSortBy::Price => Column::Price,
        ComponentSortBy::Name => Column::Name,
    };

    let mut finder = Components::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(component_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    let data = ComponentList { items };
    Ok(ApiResponse::success("Components", data, Some(meta)))
}

pub async fn get_component(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Component>> {
    let result = Components::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(component_from_entity);
    let result = match result {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Component", result, None))
}

pub async fn create_component(
    state: &AppState,
    user: &AuthUser,
    payload: CreateComponentRequest,
) -> AppResult<ApiResponse<Component>> {
    ensure_admin(user)?;
    validate_category(&payload.category)?;
    if payload.price < 0 {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    if payload.stock < 0 {
        return Err(AppError::BadRequest("stock must not be negative".into()));
    }

    let id = Uuid::new_v4();
    let active = ActiveModel {
        id: Set(id),
        category: Set(payload.category),
        name: Set(payload.name),
        description: Set(Some(payload.description)),
        price: Set(payload.price),
        stock: Set(payload.stock),
        created_at: NotSet,
    };
    let component = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "component_create",
        Some("components"),
        Some(serde_json::json!({ "component_id": component.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Component created",
        component_from_entity(component),
        Some(Meta::empty()),
    ))
}

pub async fn update_component(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateComponentRequest,
) -> AppResult<ApiResponse<Component>> {
    ensure_admin(user)?;
    let existing = Components::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        if price < 0 {
            return Err(AppError::BadRequest("price must not be negative".into()));
        }
        active.price = Set(price);
    }
    if let Some(stock) = payload.stock {
        if stock < 0 {
            return Err(AppError::BadRequest("stock must not be negative".into()));
        }
        active.stock = Set(stock);
    }

    let component = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "component_update",
        Some("components"),
        Some(serde_json::json!({ "component_id": component.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Updated",
        component_from_entity(component),
        Some(Meta::empty()),
    ))
}

pub async fn delete_component(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Components::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "component_delete",
        Some("components"),
        Some(serde_json::json!({ "component_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub fn component_from_entity(model: ComponentModel) -> Component {
    Component {
        id: model.id,
        category: model.category,
        name: model.name,
        description: model.description,
        price: model.price,
        stock: model.stock,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
