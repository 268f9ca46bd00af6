use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage, HttpRequest, HttpResponse,
};
use chrono::{DateTime, Utc};
use futures_util::{future::LocalBoxFuture, FutureExt};
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use std::{
    future::{ready, Ready},
    rc::Rc,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::configuration::JwtSettings;
use crate::token::{decode_token, Claims, TokenPurpose};

/// Guards a route behind a bearer access token. The resolved [`User`] is
/// stored in the request extensions as `Rc<User>`.
pub struct Authentication {
    db_pool: PgPool,
    jwt: JwtSettings,
    require_admin: bool,
}

impl Authentication {
    pub fn new(db_pool: PgPool, jwt: JwtSettings) -> Self {
        Authentication {
            db_pool,
            jwt,
            require_admin: false,
        }
    }

    /// Same as [`Authentication::new`], but only lets admins through.
    pub fn admin(db_pool: PgPool, jwt: JwtSettings) -> Self {
        Authentication {
            db_pool,
            jwt,
            require_admin: true,
        }
    }
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Token from an `Authorization: Bearer ...` header, if any.
pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Claims of a valid access token on the request, without touching the
/// database. Used by public routes that only show more to signed-in users.
pub fn access_claims(req: &HttpRequest, jwt: &JwtSettings) -> Option<Claims> {
    let token = bearer_token(req)?;
    decode_token(&token, TokenPurpose::Access, jwt).ok()
}

impl<S, B> Transform<S, ServiceRequest> for Authentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthenticationMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthenticationMiddleware {
            service: Rc::new(service),
            db_pool: self.db_pool.clone(),
            jwt: self.jwt.clone(),
            require_admin: self.require_admin,
        }))
    }
}

pub struct AuthenticationMiddleware<S> {
    service: Rc<S>,
    db_pool: PgPool,
    jwt: JwtSettings,
    require_admin: bool,
}

fn reject<B>(req: ServiceRequest, http_res: HttpResponse) -> ServiceResponse<EitherBody<B>> {
    let (http_req, _) = req.into_parts();
    ServiceResponse::new(http_req, http_res).map_into_right_body()
}

impl<S, B> Service<ServiceRequest> for AuthenticationMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Error = Error;
    type Response = ServiceResponse<EitherBody<B>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let query_span = tracing::info_span!("Authentication middleware");

        let token = match bearer_token(req.request()) {
            Some(token) => token,
            None => {
                tracing::error!("No bearer token found in request");
                let http_res = HttpResponse::Unauthorized().json(json!({
                    "error" : "Missing bearer token"
                }));
                return (async move { Ok(reject(req, http_res)) }).boxed_local();
            }
        };

        let claims = match decode_token(&token, TokenPurpose::Access, &self.jwt) {
            Ok(claims) => claims,
            Err(err) => {
                tracing::error!("Rejected access token: {}", err);
                let http_res = HttpResponse::Unauthorized().json(json!({
                    "error" : "Invalid or expired token"
                }));
                return (async move { Ok(reject(req, http_res)) }).boxed_local();
            }
        };

        let db_connection = self.db_pool.clone();
        let service = self.service.clone();
        let require_admin = self.require_admin;
        async move {
            let query_result = sqlx::query_as::<_, User>(
                r#"
                    SELECT id, name, email, role, is_verified, created_at, updated_at
                    FROM users WHERE id = $1
                "#,
            )
            .bind(claims.sub)
            .fetch_optional(&db_connection)
            .instrument(query_span)
            .await;

            let user = match query_result {
                Ok(Some(user)) => user,
                Ok(None) => {
                    tracing::error!("Token subject {} not found in database", claims.sub);
                    let http_res = HttpResponse::Unauthorized().json(json!({
                        "error" : "user not found"
                    }));
                    return Ok(reject(req, http_res));
                }
                Err(err) => {
                    tracing::error!("Error getting user from database {}", err);
                    let http_res = HttpResponse::InternalServerError().json(json!({
                        "error" : "database error"
                    }));
                    return Ok(reject(req, http_res));
                }
            };

            if require_admin && !user.is_admin() {
                tracing::error!("User {} is not an admin", user.id);
                let http_res = HttpResponse::Forbidden().json(json!({
                    "error" : "Unauthorized"
                }));
                return Ok(reject(req, http_res));
            }

            req.extensions_mut().insert::<Rc<User>>(Rc::new(user));
            let fut = service.call(req);
            let res: ServiceResponse<B> = fut.await?;
            Ok(res.map_into_left_body())
        }
        .boxed_local()
    }
}
