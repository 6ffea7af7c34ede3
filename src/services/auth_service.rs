use crate::{
    database::MongoDB,
    models::{AuthResponse, LoginRequest, RegisterRequest, User, UserResponse},
    utils::error::AppError,
};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::{doc, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token lifetime: one hour from issuance, no refresh, no revocation.
const TOKEN_TTL_SECS: i64 = 3600;

lazy_static::lazy_static! {
    // Process-wide signing secret, loaded once at startup. Never logged.
    static ref JWT_SECRET: String = std::env::var("JWT_SECRET")
        .unwrap_or_else(|_| "default-secret-change-me".to_string());
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user id
    pub iat: usize,  // issued at
    pub exp: usize,  // expiration
    pub jti: String, // token id
}

/// Issues a signed bearer token carrying the user identity claim.
pub fn generate_jwt(user_id: &str) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::seconds(TOKEN_TTL_SECS)).timestamp() as usize,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_ref()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
}

/// Verifies signature and expiry. Malformed, expired and badly signed
/// tokens all fail the same way; the reason is never surfaced to callers.
pub fn verify_token(token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is exact: a token is invalid the second its hour is up.
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(JWT_SECRET.as_ref()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Authentication("Invalid token".to_string()))
}

/// Registers a new user: uniqueness check on the trimmed email, bcrypt
/// digest of the password, then insert. Fails with Conflict on a
/// duplicate email before anything is written.
pub async fn register(db: &MongoDB, request: &RegisterRequest) -> Result<UserResponse, AppError> {
    let collection = db.collection::<User>("users");
    let email = request.email.trim().to_string();

    let existing = collection.find_one(doc! { "email": &email }).await?;
    if existing.is_some() {
        return Err(AppError::Conflict("Email already exists".to_string()));
    }

    let hashed_password = hash(&request.password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

    let mut new_user = User {
        id: None,
        first_name: request.first_name.trim().to_string(),
        last_name: request.last_name.trim().to_string(),
        email,
        password: hashed_password,
        created_at: Some(BsonDateTime::now()),
        updated_at: Some(BsonDateTime::now()),
    };

    let result = collection.insert_one(&new_user).await?;
    new_user.id = result.inserted_id.as_object_id();

    log::info!("✅ User registered successfully: {}", new_user.email);

    Ok(UserResponse::from(&new_user))
}

/// Authenticates an email/password pair. Unknown email and wrong password
/// answer identically, so login cannot be used to enumerate accounts.
pub async fn login(db: &MongoDB, request: &LoginRequest) -> Result<AuthResponse, AppError> {
    let collection = db.collection::<User>("users");
    let email = request.email.trim();

    let user = collection
        .find_one(doc! { "email": email })
        .await?
        .ok_or_else(|| AppError::Authentication("Invalid credentials".to_string()))?;

    let valid = verify(&request.password, &user.password)
        .map_err(|e| AppError::Internal(format!("Password verification error: {}", e)))?;

    if !valid {
        return Err(AppError::Authentication("Invalid credentials".to_string()));
    }

    let user_id = user
        .id
        .map(|oid| oid.to_hex())
        .ok_or_else(|| AppError::Internal("Stored user has no id".to_string()))?;

    let token = generate_jwt(&user_id)?;

    log::info!("✅ Login successful: {}", user.email);

    Ok(AuthResponse {
        message: "Login successful".to_string(),
        token,
    })
}
