use crate::{auth, db::Db, errors::ApiError};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct RegisterReq {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
struct UserResp {
    message: String,
    user_id: String,
}

pub async fn register(
    db: web::Data<Db>,
    body: web::Json<RegisterReq>,
) -> Result<HttpResponse, ApiError> {
    let username = body.username.trim();
    if username.is_empty() || body.password.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "username and password are required".into(),
        ));
    }

    let hash = auth::hash_password(&body.password)?;
    let user = db.create_user(username, &hash).await?;

    Ok(HttpResponse::Created().json(UserResp {
        message: "user registered".into(),
        user_id: user.id,
    }))
}

#[derive(Deserialize)]
pub struct LoginReq {
    pub username: String,
    pub password: String,
}

pub async fn login(
    db: web::Data<Db>,
    body: web::Json<LoginReq>,
) -> Result<HttpResponse, ApiError> {
    let user = db
        .find_user_by_name(&body.username)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !auth::verify_password(&user.password_hash, &body.password) {
        return Err(ApiError::Unauthorized);
    }

    Ok(HttpResponse::Ok().json(UserResp {
        message: "login ok".into(),
        user_id: user.id,
    }))
}
