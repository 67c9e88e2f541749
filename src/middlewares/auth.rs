use crate::error::AppError;
use crate::utils::JwtService;
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Public,
    /// token 可选：有效则注入用户ID，否则匿名继续
    Optional,
    Protected,
}

// 路径访问策略
//
// API 路径上 token 可选: 路由与参数校验先于鉴权执行 (405 / 400),
// 是否需要登录由各 service 决定.
struct PublicPaths {
    exact_paths: Vec<&'static str>,
    prefix_paths: Vec<&'static str>,
    optional_prefixes: Vec<&'static str>,
}

impl PublicPaths {
    fn new() -> Self {
        Self {
            exact_paths: vec!["/swagger-ui", "/swagger-ui/", "/api-docs/openapi.json"],
            prefix_paths: vec!["/swagger-ui/", "/api-docs/"],
            optional_prefixes: vec!["/api/v1/"],
        }
    }

    fn access_for(&self, method: &Method, path: &str) -> Access {
        // 放行所有 CORS 预检请求
        if method == Method::OPTIONS {
            return Access::Public;
        }

        if self.exact_paths.contains(&path)
            || self
                .prefix_paths
                .iter()
                .any(|&prefix| path.starts_with(prefix))
        {
            return Access::Public;
        }

        if self
            .optional_prefixes
            .iter()
            .any(|&prefix| path.starts_with(prefix))
        {
            return Access::Optional;
        }

        Access::Protected
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
            public_paths: PublicPaths::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
    public_paths: PublicPaths,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let access = self.public_paths.access_for(req.method(), req.path());
        if access == Access::Public {
            return Box::pin(self.service.call(req));
        }

        let verified = bearer_token(&req).map(|token| {
            self.jwt_service
                .verify_access_token(token)
                .and_then(|claims| claims.user_id())
        });

        match (verified, access) {
            (Some(Ok(user_id)), _) => {
                // 将用户ID添加到请求扩展中
                req.extensions_mut().insert(user_id);
                Box::pin(self.service.call(req))
            }
            (Some(Err(e)), Access::Optional) => {
                log::debug!("Ignoring invalid token on {}: {e}", req.path());
                Box::pin(self.service.call(req))
            }
            (None, Access::Optional) => Box::pin(self.service.call(req)),
            (Some(Err(_)), _) => {
                let error = AppError::AuthError("Invalid access token".to_string());
                Box::pin(async move { Err(error.into()) })
            }
            (None, _) => {
                let error = AppError::AuthError("Missing access token".to_string());
                Box::pin(async move { Err(error.into()) })
            }
        }
    }
}
