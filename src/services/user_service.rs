use crate::{
    database::MongoDB,
    models::{UpdateUserRequest, User, UserResponse},
    utils::error::AppError,
    utils::validate::parse_entity_id,
};
use bcrypt::{hash, DEFAULT_COST};
use futures::TryStreamExt;
use mongodb::bson::{doc, DateTime as BsonDateTime, Document};

pub async fn get_user(db: &MongoDB, id: &str) -> Result<UserResponse, AppError> {
    let oid = parse_entity_id(id, "User")?;
    let collection = db.collection::<User>("users");

    let user = collection
        .find_one(doc! { "_id": oid })
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(UserResponse::from(&user))
}

pub async fn list_users(db: &MongoDB) -> Result<Vec<UserResponse>, AppError> {
    let collection = db.collection::<User>("users");

    let users: Vec<User> = collection.find(doc! {}).await?.try_collect().await?;

    Ok(users.iter().map(UserResponse::from).collect())
}

/// Partial merge: only supplied fields are written, and a supplied
/// password is re-hashed before it is stored.
pub async fn update_user(
    db: &MongoDB,
    id: &str,
    request: &UpdateUserRequest,
) -> Result<UserResponse, AppError> {
    let oid = parse_entity_id(id, "User")?;
    let collection = db.collection::<User>("users");

    let mut set = Document::new();
    if let Some(first_name) = &request.first_name {
        set.insert("first_name", first_name.trim());
    }
    if let Some(last_name) = &request.last_name {
        set.insert("last_name", last_name.trim());
    }
    if let Some(email) = &request.email {
        set.insert("email", email.trim());
    }
    if let Some(password) = &request.password {
        let hashed = hash(password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        set.insert("password", hashed);
    }
    set.insert("updated_at", BsonDateTime::now());

    let updated = collection
        .find_one_and_update(doc! { "_id": oid }, doc! { "$set": set })
        .return_document(mongodb::options::ReturnDocument::After)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    log::info!("✅ User updated: {}", id);

    Ok(UserResponse::from(&updated))
}

/// No cascade: orders referencing the user are left in place.
pub async fn delete_user(db: &MongoDB, id: &str) -> Result<(), AppError> {
    let oid = parse_entity_id(id, "User")?;
    let collection = db.collection::<User>("users");

    let result = collection.delete_one(doc! { "_id": oid }).await?;
    if result.deleted_count == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    log::info!("🗑️ User deleted: {}", id);
    Ok(())
}
