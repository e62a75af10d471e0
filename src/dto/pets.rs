use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Pet;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePetRequest {
    pub category_id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub stock: i32,
    pub gender: Option<String>,
    pub city: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePetRequest {
    pub category_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<i32>,
    pub gender: Option<String>,
    pub city: Option<String>,
    pub images: Option<Vec<String>>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct PetList {
    #[schema(value_type = Vec<Pet>)]
    pub items: Vec<Pet>,
}
