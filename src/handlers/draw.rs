use crate::error::AppError;
use crate::models::*;
use crate::services::DrawService;
use crate::utils::LimitOffsetParams;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError, Result, web};

/// 从请求扩展中获取用户ID（中间件在鉴权后注入）
fn get_user_id_from_request(req: &HttpRequest) -> Option<i64> {
    req.extensions().get::<i64>().copied()
}

#[utoipa::path(
    get,
    path = "/draws",
    tag = "draws",
    params(DrawListQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "本餐厅的抽奖列表", body = [DrawSummaryResponse]),
        (status = 400, description = "status 参数无效"),
        (status = 401, description = "未授权"),
        (status = 403, description = "非餐厅账号或未绑定餐厅")
    )
)]
/// 列出当前餐厅的抽奖（按创建时间倒序）
pub async fn list_draws(
    service: web::Data<DrawService>,
    req: HttpRequest,
    query: web::Query<DrawListQuery>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    match service.list_draws(user_id, &query.into_inner()).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/draws",
    tag = "draws",
    request_body = CreateDrawRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "抽奖创建成功", body = DrawResponse),
        (status = 400, description = "参数校验失败"),
        (status = 401, description = "未授权"),
        (status = 403, description = "非餐厅账号或未绑定餐厅")
    )
)]
/// 创建抽奖，初始状态为 active
pub async fn create_draw(
    service: web::Data<DrawService>,
    req: HttpRequest,
    body: web::Json<CreateDrawRequest>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    match service.create_draw(user_id, body.into_inner()).await {
        Ok(draw) => Ok(HttpResponse::Created().json(ApiResponse::success(draw))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/draws/{id}",
    tag = "draws",
    params(
        ("id" = i64, Path, description = "抽奖ID")
    ),
    security(
        (),
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "抽奖详情", body = DrawDetailResponse),
        (status = 400, description = "ID 无效"),
        (status = 401, description = "非进行中的抽奖需要登录"),
        (status = 403, description = "无权查看"),
        (status = 404, description = "抽奖不存在")
    )
)]
/// 获取抽奖详情；进行中的抽奖可匿名访问
pub async fn get_draw(
    service: web::Data<DrawService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    match service.get_draw(path.into_inner(), user_id).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(ApiResponse::success(detail))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/draws/{id}",
    tag = "draws",
    params(
        ("id" = i64, Path, description = "抽奖ID")
    ),
    request_body = UpdateDrawRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "修改成功", body = DrawResponse),
        (status = 400, description = "参数无效或抽奖已有参与者"),
        (status = 401, description = "未授权"),
        (status = 403, description = "不是该抽奖的所有者"),
        (status = 404, description = "抽奖不存在")
    )
)]
/// 部分更新抽奖，已有参与者时拒绝
pub async fn update_draw(
    service: web::Data<DrawService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdateDrawRequest>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    match service
        .update_draw(path.into_inner(), user_id, body.into_inner())
        .await
    {
        Ok(draw) => Ok(HttpResponse::Ok().json(ApiResponse::success(draw))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/draws/{id}",
    tag = "draws",
    params(
        ("id" = i64, Path, description = "抽奖ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除成功"),
        (status = 400, description = "抽奖已有参与者"),
        (status = 401, description = "未授权"),
        (status = 403, description = "不是该抽奖的所有者"),
        (status = 404, description = "抽奖不存在")
    )
)]
pub async fn delete_draw(
    service: web::Data<DrawService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    match service.delete_draw(path.into_inner(), user_id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::ok())),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/draws/{id}/participants",
    tag = "draws",
    params(
        ("id" = i64, Path, description = "抽奖ID"),
        LimitOffsetParams
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "参与者列表", body = ParticipantListResponse),
        (status = 401, description = "未授权"),
        (status = 403, description = "不是该抽奖的所有者"),
        (status = 404, description = "抽奖不存在")
    )
)]
/// 分页获取参与者（按参与时间倒序）
pub async fn list_participants(
    service: web::Data<DrawService>,
    req: HttpRequest,
    path: web::Path<i64>,
    query: web::Query<LimitOffsetParams>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    match service
        .list_participants(path.into_inner(), user_id, &query)
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/draws/{id}/participate",
    tag = "draws",
    params(
        ("id" = i64, Path, description = "抽奖ID")
    ),
    request_body = ParticipateRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "参与成功", body = ParticipationResponse),
        (status = 400, description = "未接受条款或抽奖不可参与"),
        (status = 401, description = "未授权"),
        (status = 403, description = "仅普通用户可参与"),
        (status = 404, description = "抽奖不存在"),
        (status = 409, description = "已参与过该抽奖")
    )
)]
/// 参与抽奖：
/// 1. 必须接受条款
/// 2. 抽奖必须处于 active
/// 3. 每个用户只能参与一次
pub async fn participate(
    service: web::Data<DrawService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<ParticipateRequest>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    match service
        .participate(path.into_inner(), user_id, body.into_inner())
        .await
    {
        Ok(participation) => Ok(HttpResponse::Created().json(ApiResponse::success(participation))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn method_not_allowed() -> HttpResponse {
    AppError::MethodNotAllowed.error_response()
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|_, _| AppError::ValidationError("Invalid draw ID".to_string()).into())
}

/// 路由配置
pub fn draw_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/draws")
            .app_data(path_config())
            .service(
                web::resource("")
                    .route(web::get().to(list_draws))
                    .route(web::post().to(create_draw))
                    .default_service(web::to(method_not_allowed)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_draw))
                    .route(web::patch().to(update_draw))
                    .route(web::delete().to(delete_draw))
                    .default_service(web::to(method_not_allowed)),
            )
            .service(
                web::resource("/{id}/participants")
                    .route(web::get().to(list_participants))
                    .default_service(web::to(method_not_allowed)),
            )
            .service(
                web::resource("/{id}/participate")
                    .route(web::post().to(participate))
                    .default_service(web::to(method_not_allowed)),
            ),
    );
}
